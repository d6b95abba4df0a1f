pub mod memory;

#[cfg(feature = "ssr")]
pub mod db;

#[cfg(feature = "ssr")]
mod backend;

#[cfg(feature = "ssr")]
pub use backend::Backend;
