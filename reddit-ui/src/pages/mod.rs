mod community;
mod home;
mod post;

pub use community::CommunityPage;
pub use home::HomePage;
pub use post::PostPage;
