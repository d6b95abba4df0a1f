use super::db::SeaOrmRepository;
use super::memory::MemoryRepository;
use crate::domain::{Community, CommunitySnippet, Post, PostVote};
use crate::repository::PostRepository;
use reddit_errors::AppError;
use std::sync::Arc;

/// Storage the server reads and writes through.
#[derive(Clone)]
pub enum Backend {
    Database(SeaOrmRepository),
    Memory(Arc<MemoryRepository>),
}

impl Backend {
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

impl PostRepository for Backend {
    async fn list_by_community(
        &self,
        community_ids: &[String],
        limit: u64,
    ) -> Result<Vec<Post>, AppError> {
        match self {
            Self::Database(repo) => repo.list_by_community(community_ids, limit).await,
            Self::Memory(repo) => repo.list_by_community(community_ids, limit).await,
        }
    }

    async fn list_top_voted(&self, limit: u64) -> Result<Vec<Post>, AppError> {
        match self {
            Self::Database(repo) => repo.list_top_voted(limit).await,
            Self::Memory(repo) => repo.list_top_voted(limit).await,
        }
    }

    async fn list_user_votes(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<Vec<PostVote>, AppError> {
        match self {
            Self::Database(repo) => repo.list_user_votes(user_id, post_ids).await,
            Self::Memory(repo) => repo.list_user_votes(user_id, post_ids).await,
        }
    }

    async fn list_top_communities(&self, limit: u64) -> Result<Vec<Community>, AppError> {
        match self {
            Self::Database(repo) => repo.list_top_communities(limit).await,
            Self::Memory(repo) => repo.list_top_communities(limit).await,
        }
    }

    async fn list_user_snippets(&self, user_id: &str) -> Result<Vec<CommunitySnippet>, AppError> {
        match self {
            Self::Database(repo) => repo.list_user_snippets(user_id).await,
            Self::Memory(repo) => repo.list_user_snippets(user_id).await,
        }
    }

    async fn find_post(&self, post_id: &str) -> Result<Option<Post>, AppError> {
        match self {
            Self::Database(repo) => repo.find_post(post_id).await,
            Self::Memory(repo) => repo.find_post(post_id).await,
        }
    }

    async fn save_vote(&self, user_id: &str, vote: &PostVote) -> Result<(), AppError> {
        match self {
            Self::Database(repo) => repo.save_vote(user_id, vote).await,
            Self::Memory(repo) => repo.save_vote(user_id, vote).await,
        }
    }

    async fn remove_vote(&self, user_id: &str, vote_id: &str) -> Result<(), AppError> {
        match self {
            Self::Database(repo) => repo.remove_vote(user_id, vote_id).await,
            Self::Memory(repo) => repo.remove_vote(user_id, vote_id).await,
        }
    }

    async fn adjust_vote_status(&self, post_id: &str, delta: i64) -> Result<i64, AppError> {
        match self {
            Self::Database(repo) => repo.adjust_vote_status(post_id, delta).await,
            Self::Memory(repo) => repo.adjust_vote_status(post_id, delta).await,
        }
    }

    async fn delete_post(&self, post: &Post) -> Result<(), AppError> {
        match self {
            Self::Database(repo) => repo.delete_post(post).await,
            Self::Memory(repo) => repo.delete_post(post).await,
        }
    }
}
