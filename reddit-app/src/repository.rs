use crate::domain::{Community, CommunitySnippet, Post, PostVote};
use reddit_errors::AppError;

/// Data access used by the feed controller.
///
/// Implemented by the database and in-memory backends on the server and by
/// the server-function client in the browser, so feed logic never touches a
/// query builder directly.
#[allow(async_fn_in_trait)]
pub trait PostRepository {
    /// Posts from any of `community_ids`, newest first.
    async fn list_by_community(
        &self,
        community_ids: &[String],
        limit: u64,
    ) -> Result<Vec<Post>, AppError>;

    /// Posts across all communities, highest score first.
    async fn list_top_voted(&self, limit: u64) -> Result<Vec<Post>, AppError>;

    /// The user's votes restricted to `post_ids`.
    async fn list_user_votes(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<Vec<PostVote>, AppError>;

    /// Communities ordered by member count, largest first.
    async fn list_top_communities(&self, limit: u64) -> Result<Vec<Community>, AppError>;

    async fn list_user_snippets(&self, user_id: &str) -> Result<Vec<CommunitySnippet>, AppError>;

    async fn find_post(&self, post_id: &str) -> Result<Option<Post>, AppError>;

    /// Creates the vote, or overwrites the stored value when the id exists.
    async fn save_vote(&self, user_id: &str, vote: &PostVote) -> Result<(), AppError>;

    async fn remove_vote(&self, user_id: &str, vote_id: &str) -> Result<(), AppError>;

    /// Adds `delta` to the post's cached score and returns the new score.
    async fn adjust_vote_status(&self, post_id: &str, delta: i64) -> Result<i64, AppError>;

    async fn delete_post(&self, post: &Post) -> Result<(), AppError>;
}
