mod error_display;
mod post_feed;
mod post_item;
mod post_loader;
mod recommendations;

pub use error_display::ErrorDisplay;
pub use post_feed::{use_vote_handler, PostFeed};
pub use post_item::PostItem;
pub use post_loader::PostLoader;
pub use recommendations::Recommendations;
