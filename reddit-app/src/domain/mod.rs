mod community;
mod post;
mod user;
mod vote;

pub use community::{Community, CommunitySnippet};
pub use post::Post;
pub use user::{User, Viewer};
pub use vote::{PostVote, VoteValue};
