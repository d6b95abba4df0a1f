use super::entities::{community, community_snippet, post, post_vote};
use super::entities::{Community, CommunitySnippet, Post, PostVote};
use crate::domain;
use crate::repository::PostRepository;
use reddit_errors::AppError;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use std::sync::Arc;

fn query_failed(e: DbErr) -> AppError {
    AppError::QueryFailed(e.to_string())
}

fn write_failed(e: DbErr) -> AppError {
    AppError::WriteFailed(e.to_string())
}

#[derive(Clone)]
pub struct SeaOrmRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }
}

impl PostRepository for SeaOrmRepository {
    async fn list_by_community(
        &self,
        community_ids: &[String],
        limit: u64,
    ) -> Result<Vec<domain::Post>, AppError> {
        let posts = Post::find()
            .filter(post::Column::CommunityId.is_in(community_ids.iter().cloned()))
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(query_failed)?;

        Ok(posts.into_iter().map(Into::into).collect())
    }

    async fn list_top_voted(&self, limit: u64) -> Result<Vec<domain::Post>, AppError> {
        let posts = Post::find()
            .order_by_desc(post::Column::VoteStatus)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(query_failed)?;

        Ok(posts.into_iter().map(Into::into).collect())
    }

    async fn list_user_votes(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<Vec<domain::PostVote>, AppError> {
        let votes = PostVote::find()
            .filter(post_vote::Column::UserId.eq(user_id))
            .filter(post_vote::Column::PostId.is_in(post_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(query_failed)?;

        Ok(votes
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                domain::PostVote::try_from(model)
                    .inspect_err(|e| tracing::warn!("Skipping vote {}: {}", id, e))
                    .ok()
            })
            .collect())
    }

    async fn list_top_communities(&self, limit: u64) -> Result<Vec<domain::Community>, AppError> {
        let communities = Community::find()
            .order_by_desc(community::Column::NumberOfMembers)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(query_failed)?;

        Ok(communities.into_iter().map(Into::into).collect())
    }

    async fn list_user_snippets(
        &self,
        user_id: &str,
    ) -> Result<Vec<domain::CommunitySnippet>, AppError> {
        let snippets = CommunitySnippet::find()
            .filter(community_snippet::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(query_failed)?;

        Ok(snippets.into_iter().map(Into::into).collect())
    }

    async fn find_post(&self, post_id: &str) -> Result<Option<domain::Post>, AppError> {
        let found = Post::find_by_id(post_id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(query_failed)?;
        Ok(found.map(Into::into))
    }

    async fn save_vote(&self, user_id: &str, vote: &domain::PostVote) -> Result<(), AppError> {
        let existing = PostVote::find_by_id(vote.id.clone())
            .filter(post_vote::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(query_failed)?;

        match existing {
            Some(model) => {
                let mut active: post_vote::ActiveModel = model.into();
                active.vote_value = Set(vote.vote_value.as_i64());
                active.update(self.db.as_ref()).await.map_err(write_failed)?;
            }
            None => {
                let active = post_vote::ActiveModel {
                    id: Set(vote.id.clone()),
                    user_id: Set(user_id.to_string()),
                    post_id: Set(vote.post_id.clone()),
                    community_id: Set(vote.community_id.clone()),
                    vote_value: Set(vote.vote_value.as_i64()),
                };
                active.insert(self.db.as_ref()).await.map_err(write_failed)?;
            }
        }
        Ok(())
    }

    async fn remove_vote(&self, user_id: &str, vote_id: &str) -> Result<(), AppError> {
        PostVote::delete_many()
            .filter(post_vote::Column::Id.eq(vote_id))
            .filter(post_vote::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(write_failed)?;
        Ok(())
    }

    async fn adjust_vote_status(&self, post_id: &str, delta: i64) -> Result<i64, AppError> {
        // Single UPDATE so concurrent voters cannot overwrite each other.
        let result = Post::update_many()
            .col_expr(
                post::Column::VoteStatus,
                Expr::col(post::Column::VoteStatus).add(delta),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(write_failed)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        let post = Post::find_by_id(post_id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(query_failed)?
            .ok_or(AppError::NotFound)?;
        Ok(post.vote_status)
    }

    async fn delete_post(&self, target: &domain::Post) -> Result<(), AppError> {
        let result = Post::delete_by_id(target.id.clone())
            .exec(self.db.as_ref())
            .await
            .map_err(write_failed)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
