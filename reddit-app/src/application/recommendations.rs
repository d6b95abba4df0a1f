use crate::domain::Community;
use crate::repository::PostRepository;
use std::sync::Arc;

/// Loads the "top communities" sidebar list.
pub struct RecommendationFetcher<R> {
    repo: Arc<R>,
    count: u64,
}

impl<R> Clone for RecommendationFetcher<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            count: self.count,
        }
    }
}

impl<R: PostRepository> RecommendationFetcher<R> {
    pub fn new(repo: Arc<R>, count: u64) -> Self {
        Self { repo, count }
    }

    /// Largest communities first. A failed load is logged and shows an
    /// empty widget; it is not retried.
    pub async fn fetch(&self) -> Vec<Community> {
        match self.repo.list_top_communities(self.count).await {
            Ok(communities) => communities,
            Err(e) => {
                tracing::error!("Failed to load community recommendations: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{MemoryRepository, RecordedQuery};

    #[tokio::test]
    async fn fetches_the_five_largest_communities() {
        let repo = Arc::new(MemoryRepository::seeded());
        let fetcher = RecommendationFetcher::new(Arc::clone(&repo), 5);

        let communities = fetcher.fetch().await;
        assert_eq!(communities.len(), 5);
        assert!(communities
            .windows(2)
            .all(|pair| pair[0].number_of_members >= pair[1].number_of_members));
        assert_eq!(
            repo.recorded_queries(),
            vec![RecordedQuery::TopCommunities { limit: 5 }]
        );
    }

    #[tokio::test]
    async fn failure_yields_an_empty_list() {
        let repo = Arc::new(MemoryRepository::seeded());
        repo.set_fail_queries(true);

        let fetcher = RecommendationFetcher::new(repo, 5);
        assert!(fetcher.fetch().await.is_empty());
    }
}
