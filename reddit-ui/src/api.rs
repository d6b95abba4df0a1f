//! Server functions and the repository the browser-side controller uses.

use leptos::prelude::*;
use reddit_app::application::FeedController;
use reddit_app::domain::{Community, CommunitySnippet, Post, PostVote, User};
use reddit_app::repository::PostRepository;
use reddit_errors::AppError;
use server_fn::ServerFnError;

/// Session key holding the signed-in [`User`].
pub const SESSION_USER_KEY: &str = "user";

pub type UiController = FeedController<ServerFnRepository>;

#[cfg(feature = "ssr")]
mod ssr_support {
    use super::SESSION_USER_KEY;
    use leptos::prelude::*;
    use reddit_app::domain::User;
    use reddit_app::infrastructure::Backend;
    use reddit_app::AppContext;
    use reddit_errors::AppError;
    use server_fn::ServerFnError;
    use tower_sessions::Session;

    /// Upper bound on any list a client may request.
    const MAX_LIST_SIZE: u64 = 100;

    pub fn context() -> Result<AppContext, ServerFnError> {
        use_context::<AppContext>().ok_or_else(|| ServerFnError::new("AppContext missing"))
    }

    pub fn backend() -> Result<Backend, ServerFnError> {
        context().map(|ctx| ctx.backend)
    }

    pub fn clamp(requested: u64, configured: u64) -> u64 {
        requested.min(configured).min(MAX_LIST_SIZE)
    }

    pub async fn session_user() -> Result<Option<User>, ServerFnError> {
        let session: Session = leptos_axum::extract().await?;
        session
            .get::<User>(SESSION_USER_KEY)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))
    }

    pub async fn require_user() -> Result<User, ServerFnError> {
        session_user().await?.ok_or_else(|| to_server_error(AppError::Unauthenticated))
    }

    pub fn to_server_error(e: AppError) -> ServerFnError {
        ServerFnError::new(e.to_string())
    }
}

#[server(GetCurrentUserFn, "/api", endpoint = "current_user")]
pub async fn get_current_user() -> Result<Option<User>, ServerFnError> {
    ssr_support::session_user().await
}

#[server(ListPostsByCommunityFn, "/api", endpoint = "posts_by_community")]
pub async fn list_posts_by_community(
    community_ids: Vec<String>,
    limit: u64,
) -> Result<Vec<Post>, ServerFnError> {
    use ssr_support::*;

    let ctx = context()?;
    ctx.backend
        .list_by_community(&community_ids, clamp(limit, ctx.config.page_size))
        .await
        .map_err(to_server_error)
}

#[server(ListTopVotedFn, "/api", endpoint = "top_voted_posts")]
pub async fn list_top_voted_posts(limit: u64) -> Result<Vec<Post>, ServerFnError> {
    use ssr_support::*;

    let ctx = context()?;
    ctx.backend
        .list_top_voted(clamp(limit, ctx.config.page_size))
        .await
        .map_err(to_server_error)
}

#[server(ListUserPostVotesFn, "/api", endpoint = "user_post_votes")]
pub async fn list_user_post_votes(post_ids: Vec<String>) -> Result<Vec<PostVote>, ServerFnError> {
    use ssr_support::*;

    let user = require_user().await?;
    backend()?
        .list_user_votes(&user.id, &post_ids)
        .await
        .map_err(to_server_error)
}

#[server(ListTopCommunitiesFn, "/api", endpoint = "top_communities")]
pub async fn list_top_communities(limit: u64) -> Result<Vec<Community>, ServerFnError> {
    use ssr_support::*;

    let ctx = context()?;
    ctx.backend
        .list_top_communities(clamp(limit, ctx.config.recommendation_count))
        .await
        .map_err(to_server_error)
}

#[server(ListUserSnippetsFn, "/api", endpoint = "user_snippets")]
pub async fn list_user_snippets() -> Result<Vec<CommunitySnippet>, ServerFnError> {
    use ssr_support::*;

    let user = require_user().await?;
    backend()?
        .list_user_snippets(&user.id)
        .await
        .map_err(to_server_error)
}

#[server(FindPostFn, "/api", endpoint = "find_post")]
pub async fn find_post(post_id: String) -> Result<Option<Post>, ServerFnError> {
    use ssr_support::*;

    backend()?.find_post(&post_id).await.map_err(to_server_error)
}

#[server(SavePostVoteFn, "/api", endpoint = "save_post_vote")]
pub async fn save_post_vote(vote: PostVote) -> Result<(), ServerFnError> {
    use ssr_support::*;

    let user = require_user().await?;
    backend()?.save_vote(&user.id, &vote).await.map_err(to_server_error)
}

#[server(RemovePostVoteFn, "/api", endpoint = "remove_post_vote")]
pub async fn remove_post_vote(vote_id: String) -> Result<(), ServerFnError> {
    use ssr_support::*;

    let user = require_user().await?;
    backend()?
        .remove_vote(&user.id, &vote_id)
        .await
        .map_err(to_server_error)
}

#[server(AdjustVoteStatusFn, "/api", endpoint = "adjust_vote_status")]
pub async fn adjust_post_vote_status(post_id: String, delta: i64) -> Result<i64, ServerFnError> {
    use ssr_support::*;

    require_user().await?;
    // A single click moves a score by at most two.
    if !(-2..=2).contains(&delta) || delta == 0 {
        return Err(to_server_error(AppError::InvalidVote(delta)));
    }
    backend()?
        .adjust_vote_status(&post_id, delta)
        .await
        .map_err(to_server_error)
}

#[server(DeletePostFn, "/api", endpoint = "delete_post")]
pub async fn delete_post_by_id(post_id: String) -> Result<(), ServerFnError> {
    use ssr_support::*;

    let user = require_user().await?;
    let backend = backend()?;
    let post = backend
        .find_post(&post_id)
        .await
        .map_err(to_server_error)?
        .ok_or_else(|| to_server_error(AppError::NotFound))?;

    if post.creator_id != user.id {
        tracing::warn!("User {} tried to delete post {} of {}", user.id, post.id, post.creator_id);
        return Err(to_server_error(AppError::Forbidden));
    }
    backend.delete_post(&post).await.map_err(to_server_error)
}

/// Recovers the [`AppError`] a server function failed with.
pub fn into_app_error(e: ServerFnError) -> AppError {
    match e {
        ServerFnError::ServerError(message) => message
            .parse()
            .unwrap_or_else(|never: std::convert::Infallible| match never {}),
        other => AppError::Internal(other.to_string()),
    }
}

/// [`PostRepository`] backed by the server functions above. The server
/// resolves the acting user from the session, so user ids passed here are
/// not sent over the wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFnRepository;

impl PostRepository for ServerFnRepository {
    async fn list_by_community(
        &self,
        community_ids: &[String],
        limit: u64,
    ) -> Result<Vec<Post>, AppError> {
        list_posts_by_community(community_ids.to_vec(), limit)
            .await
            .map_err(into_app_error)
    }

    async fn list_top_voted(&self, limit: u64) -> Result<Vec<Post>, AppError> {
        list_top_voted_posts(limit).await.map_err(into_app_error)
    }

    async fn list_user_votes(
        &self,
        _user_id: &str,
        post_ids: &[String],
    ) -> Result<Vec<PostVote>, AppError> {
        list_user_post_votes(post_ids.to_vec())
            .await
            .map_err(into_app_error)
    }

    async fn list_top_communities(&self, limit: u64) -> Result<Vec<Community>, AppError> {
        list_top_communities(limit).await.map_err(into_app_error)
    }

    async fn list_user_snippets(&self, _user_id: &str) -> Result<Vec<CommunitySnippet>, AppError> {
        list_user_snippets().await.map_err(into_app_error)
    }

    async fn find_post(&self, post_id: &str) -> Result<Option<Post>, AppError> {
        find_post(post_id.to_string()).await.map_err(into_app_error)
    }

    async fn save_vote(&self, _user_id: &str, vote: &PostVote) -> Result<(), AppError> {
        save_post_vote(vote.clone()).await.map_err(into_app_error)
    }

    async fn remove_vote(&self, _user_id: &str, vote_id: &str) -> Result<(), AppError> {
        remove_post_vote(vote_id.to_string())
            .await
            .map_err(into_app_error)
    }

    async fn adjust_vote_status(&self, post_id: &str, delta: i64) -> Result<i64, AppError> {
        adjust_post_vote_status(post_id.to_string(), delta)
            .await
            .map_err(into_app_error)
    }

    async fn delete_post(&self, post: &Post) -> Result<(), AppError> {
        delete_post_by_id(post.id.clone())
            .await
            .map_err(into_app_error)
    }
}
