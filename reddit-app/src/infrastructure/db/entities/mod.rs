pub mod community;
pub mod community_snippet;
pub mod post;
pub mod post_vote;

pub use community::Entity as Community;
pub use community_snippet::Entity as CommunitySnippet;
pub use post::Entity as Post;
pub use post_vote::Entity as PostVote;
