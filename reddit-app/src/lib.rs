pub mod application;
pub mod config;
pub mod domain;
pub mod repository;

#[cfg(any(test, feature = "ssr"))]
pub mod infrastructure;

#[cfg(feature = "ssr")]
mod app_context;

#[cfg(feature = "ssr")]
pub use app_context::AppContext;
