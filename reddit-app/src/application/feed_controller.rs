use super::feed_query::{FeedKind, FeedQuery};
use super::post_store::{AppliedVote, PostStore};
use super::recommendations::RecommendationFetcher;
use super::vote_change::VoteChange;
use crate::config::FeedConfig;
use crate::domain::{CommunitySnippet, Post, User, Viewer, VoteValue};
use crate::repository::PostRepository;
use reddit_errors::AppError;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

type ChangeListener = Arc<dyn Fn(&PostStore) + Send + Sync>;

/// What the home page knows about the viewer so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Resolving,
    Anonymous,
    SignedIn {
        user: User,
        /// `None` until the membership list has been fetched successfully.
        membership: Option<Vec<CommunitySnippet>>,
    },
}

impl SessionState {
    pub fn viewer(&self) -> Viewer {
        match self {
            Self::SignedIn { user, .. } => Viewer::User(user.clone()),
            Self::Resolving | Self::Anonymous => Viewer::Anonymous,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Applied { kind: FeedKind, count: usize },
    /// A newer feed request was issued while this one was in flight.
    Stale,
    Failed(AppError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VotesOutcome {
    Applied(usize),
    Skipped,
    Stale,
    Failed(AppError),
}

/// Delete button state of a single post item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteState {
    pub loading: bool,
    pub error: bool,
}

impl DeleteState {
    pub fn started() -> Self {
        Self {
            loading: true,
            error: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub state: DeleteState,
    /// Where to navigate after a successful delete from a single-post page.
    pub redirect: Option<String>,
}

/// Owns the [`PostStore`] and performs every mutation on it.
pub struct FeedController<R> {
    repo: Arc<R>,
    config: FeedConfig,
    store: Arc<RwLock<PostStore>>,
    listener: Option<ChangeListener>,
}

impl<R> Clone for FeedController<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            config: self.config,
            store: Arc::clone(&self.store),
            listener: self.listener.clone(),
        }
    }
}

impl<R> FeedController<R> {
    pub fn new(repo: R, config: FeedConfig) -> Self {
        Self::from_shared(Arc::new(repo), config)
    }

    pub fn from_shared(repo: Arc<R>, config: FeedConfig) -> Self {
        Self {
            repo,
            config,
            store: Arc::new(RwLock::new(PostStore::default())),
            listener: None,
        }
    }

    /// Registers a callback that receives the store after every mutation.
    pub fn on_change(mut self, listener: impl Fn(&PostStore) + Send + Sync + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn config(&self) -> FeedConfig {
        self.config
    }

    pub fn snapshot(&self) -> PostStore {
        self.read().clone()
    }

    pub fn with_store<T>(&self, f: impl FnOnce(&PostStore) -> T) -> T {
        f(&self.read())
    }

    /// Marks `post` as the one being viewed and returns its page path.
    pub fn select_post(&self, post: &Post) -> String {
        self.mutate(|store| store.select_post(post.clone()));
        post.permalink()
    }

    /// Drops the vote map, e.g. when the signed-in user changes.
    pub fn clear_votes(&self) {
        self.mutate(PostStore::clear_votes);
    }

    fn read(&self) -> RwLockReadGuard<'_, PostStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut PostStore) -> T) -> T {
        let (out, snapshot) = {
            let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
            let out = f(&mut store);
            (out, self.listener.as_ref().map(|_| store.clone()))
        };
        if let (Some(listener), Some(snapshot)) = (&self.listener, snapshot) {
            listener(&snapshot);
        }
        out
    }
}

impl<R: PostRepository> FeedController<R> {
    pub fn recommendations(&self) -> RecommendationFetcher<R> {
        RecommendationFetcher::new(Arc::clone(&self.repo), self.config.recommendation_count)
    }

    /// Loads the community memberships of a signed-in user.
    pub async fn resolve_session(&self, user: Option<User>) -> SessionState {
        let Some(user) = user else {
            return SessionState::Anonymous;
        };

        let membership = match self.repo.list_user_snippets(&user.id).await {
            Ok(snippets) => Some(snippets),
            Err(e) => {
                tracing::error!("Failed to load communities of {}: {}", user.id, e);
                None
            }
        };
        SessionState::SignedIn { user, membership }
    }

    /// Rebuilds the home feed once enough is known about the viewer.
    pub async fn refresh_for_session(&self, session: &SessionState) -> Option<FeedOutcome> {
        match session {
            SessionState::Resolving => None,
            SessionState::SignedIn {
                membership: None, ..
            } => None,
            SessionState::Anonymous => {
                self.clear_votes();
                Some(self.build_home_feed(&Viewer::Anonymous, &[]).await)
            }
            SessionState::SignedIn {
                user,
                membership: Some(snippets),
            } => Some(
                self.build_home_feed(&Viewer::User(user.clone()), snippets)
                    .await,
            ),
        }
    }

    pub async fn build_home_feed(
        &self,
        viewer: &Viewer,
        snippets: &[CommunitySnippet],
    ) -> FeedOutcome {
        let query = FeedQuery::for_viewer(viewer, snippets, self.config.page_size);
        let fetch = async {
            match &query {
                FeedQuery::Membership {
                    community_ids,
                    limit,
                } => self.repo.list_by_community(community_ids, *limit).await,
                FeedQuery::TopVoted { limit } => self.repo.list_top_voted(*limit).await,
            }
        };
        self.run_feed(query.kind(), fetch).await
    }

    /// Replaces the feed with one community's newest posts.
    pub async fn load_community_feed(&self, community_id: &str) -> FeedOutcome {
        let community_ids = [community_id.to_string()];
        let fetch = self
            .repo
            .list_by_community(&community_ids, self.config.page_size);
        self.run_feed(FeedKind::Community, fetch).await
    }

    async fn run_feed<F>(&self, kind: FeedKind, fetch: F) -> FeedOutcome
    where
        F: Future<Output = Result<Vec<Post>, AppError>>,
    {
        let ticket = self.mutate(PostStore::begin_feed);
        let result = fetch.await;

        self.mutate(|store| {
            let outcome = match result {
                Ok(posts) => {
                    let count = posts.len();
                    if store.apply_feed(ticket, posts) {
                        tracing::debug!("Loaded {:?} feed with {} posts", kind, count);
                        FeedOutcome::Applied { kind, count }
                    } else {
                        tracing::warn!("Discarding stale {:?} feed response", kind);
                        FeedOutcome::Stale
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to load {:?} feed: {}", kind, e);
                    FeedOutcome::Failed(e)
                }
            };
            store.finish_feed(ticket);
            outcome
        })
    }

    /// Fetches the viewer's votes on the loaded posts and replaces the vote map.
    pub async fn annotate_votes(&self, viewer: &Viewer) -> VotesOutcome {
        let Some(user) = viewer.user() else {
            self.clear_votes();
            return VotesOutcome::Skipped;
        };

        let pending = self.mutate(|store| {
            if store.posts().is_empty() && store.selected_post().is_none() {
                store.clear_votes();
                None
            } else {
                Some(store.begin_vote_fetch())
            }
        });
        let Some((ticket, post_ids)) = pending else {
            return VotesOutcome::Skipped;
        };

        match self.repo.list_user_votes(&user.id, &post_ids).await {
            Ok(votes) => self.mutate(|store| {
                if store.apply_votes(ticket, votes) {
                    VotesOutcome::Applied(store.vote_count())
                } else {
                    tracing::warn!("Discarding votes fetched for a previous feed");
                    VotesOutcome::Stale
                }
            }),
            Err(e) => {
                tracing::error!("Failed to load votes of {}: {}", user.id, e);
                VotesOutcome::Failed(e)
            }
        }
    }

    /// Applies a vote click locally, then persists it.
    ///
    /// A failed write is logged and the local change is kept.
    pub async fn vote(
        &self,
        viewer: &Viewer,
        post: &Post,
        value: VoteValue,
        community_id: &str,
    ) -> Result<VoteChange, AppError> {
        let user = viewer.user().ok_or(AppError::Unauthenticated)?;
        let applied = self.mutate(|store| store.apply_vote(&post.id, community_id, value))?;

        if let Err(e) = self.write_vote(&user.id, &post.id, &applied).await {
            tracing::warn!("Vote on post {} was not saved: {}", post.id, e);
        }
        Ok(applied.change)
    }

    async fn write_vote(
        &self,
        user_id: &str,
        post_id: &str,
        applied: &AppliedVote,
    ) -> Result<(), AppError> {
        match (&applied.previous, &applied.next) {
            (_, Some(vote)) => self.repo.save_vote(user_id, vote).await?,
            (Some(previous), None) => self.repo.remove_vote(user_id, &previous.id).await?,
            (None, None) => return Ok(()),
        }
        let score = self
            .repo
            .adjust_vote_status(post_id, applied.change.delta)
            .await?;
        tracing::debug!("Post {} score is now {}", post_id, score);
        Ok(())
    }

    /// Returns whether the post was deleted.
    pub async fn delete_post(&self, post: &Post) -> bool {
        match self.repo.delete_post(post).await {
            Ok(()) => {
                self.mutate(|store| store.remove_post(&post.id));
                tracing::info!("Deleted post {}", post.id);
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete post {}: {}", post.id, e);
                false
            }
        }
    }

    /// Delete triggered from a post item; the item shows `state` afterwards.
    pub async fn delete_from_item(&self, post: &Post, single_post_page: bool) -> DeleteOutcome {
        let deleted = self.delete_post(post).await;
        DeleteOutcome {
            state: DeleteState {
                loading: false,
                error: !deleted,
            },
            redirect: (deleted && single_post_page).then(|| post.community_path()),
        }
    }

    /// The post for a single-post page, reusing the selected post when it matches.
    pub async fn load_post(&self, post_id: &str) -> Result<Post, AppError> {
        let selected =
            self.with_store(|store| store.selected_post().filter(|p| p.id == post_id).cloned());
        if let Some(post) = selected {
            return Ok(post);
        }

        let post = self.repo.find_post(post_id).await?.ok_or(AppError::NotFound)?;
        self.mutate(|store| store.select_post(post.clone()));
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Community, PostVote};
    use crate::infrastructure::memory::{MemoryRepository, RecordedQuery};
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn alice() -> User {
        User::new("alice", "Alice")
    }

    fn fixture() -> (Arc<MemoryRepository>, FeedController<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        let now = Utc::now();
        for (id, members) in [("A", 10), ("B", 20), ("C", 30)] {
            repo.insert_community(Community::new(id, "founder", members));
        }
        for (i, community) in ["A", "B", "C", "A", "B"].into_iter().enumerate() {
            let id = format!("{}{}", community.to_lowercase(), i);
            repo.insert_post(
                Post::new(id, community, "bob", "title")
                    .with_vote_status(i as i64)
                    .with_created_at(now - Duration::minutes(i as i64)),
            );
        }
        repo.insert_post(
            Post::new("c-top", "C", "bob", "popular")
                .with_vote_status(500)
                .with_created_at(now - Duration::days(2)),
        );

        let controller = FeedController::from_shared(Arc::clone(&repo), FeedConfig::default());
        (repo, controller)
    }

    fn feed_queries(repo: &MemoryRepository) -> Vec<FeedQuery> {
        repo.recorded_queries()
            .into_iter()
            .filter_map(|query| match query {
                RecordedQuery::Feed(feed) => Some(feed),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn anonymous_home_page_uses_the_global_top_voted_query() {
        let (repo, controller) = fixture();

        let session = controller.resolve_session(None).await;
        let outcome = controller.refresh_for_session(&session).await;

        assert_eq!(
            outcome,
            Some(FeedOutcome::Applied {
                kind: FeedKind::TopVoted,
                count: 6
            })
        );
        assert_eq!(feed_queries(&repo), vec![FeedQuery::TopVoted { limit: 10 }]);
        assert_eq!(controller.snapshot().posts()[0].id, "c-top");
    }

    #[tokio::test]
    async fn member_home_page_queries_exactly_the_joined_communities() {
        let (repo, controller) = fixture();
        repo.join("alice", CommunitySnippet::member("A"));
        repo.join("alice", CommunitySnippet::member("B"));

        let session = controller.resolve_session(Some(alice())).await;
        controller.refresh_for_session(&session).await;

        let queries = feed_queries(&repo);
        assert_eq!(
            queries,
            vec![FeedQuery::Membership {
                community_ids: vec!["A".to_string(), "B".to_string()],
                limit: 10,
            }]
        );
        let store = controller.snapshot();
        assert_eq!(store.posts().len(), 4);
        assert!(store
            .posts()
            .iter()
            .all(|post| post.community_id == "A" || post.community_id == "B"));
        assert!(store
            .posts()
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn member_without_communities_gets_the_global_feed() {
        let (repo, controller) = fixture();

        let session = controller.resolve_session(Some(alice())).await;
        controller.refresh_for_session(&session).await;

        assert_eq!(feed_queries(&repo), vec![FeedQuery::TopVoted { limit: 10 }]);
    }

    #[tokio::test]
    async fn nothing_is_fetched_until_membership_is_known() {
        let (repo, controller) = fixture();

        assert_eq!(controller.refresh_for_session(&SessionState::Resolving).await, None);
        let unknown = SessionState::SignedIn {
            user: alice(),
            membership: None,
        };
        assert_eq!(controller.refresh_for_session(&unknown).await, None);
        assert!(feed_queries(&repo).is_empty());
    }

    #[tokio::test]
    async fn failed_membership_fetch_leaves_membership_unknown() {
        let (repo, controller) = fixture();
        repo.set_fail_queries(true);

        let session = controller.resolve_session(Some(alice())).await;
        assert_eq!(
            session,
            SessionState::SignedIn {
                user: alice(),
                membership: None
            }
        );
    }

    #[tokio::test]
    async fn failed_query_keeps_the_previous_feed_and_clears_loading() {
        let (repo, controller) = fixture();
        controller.build_home_feed(&Viewer::Anonymous, &[]).await;
        let before = controller.snapshot().posts().to_vec();

        repo.set_fail_queries(true);
        let outcome = controller.build_home_feed(&Viewer::Anonymous, &[]).await;

        assert!(matches!(outcome, FeedOutcome::Failed(AppError::QueryFailed(_))));
        let store = controller.snapshot();
        assert_eq!(store.posts(), before.as_slice());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn votes_are_annotated_only_for_loaded_posts() {
        let (repo, controller) = fixture();
        repo.insert_vote("alice", PostVote::new("c-top", "C", VoteValue::Up));
        repo.insert_vote("alice", PostVote::new("not-loaded", "C", VoteValue::Down));
        let viewer = Viewer::User(alice());
        controller.build_home_feed(&viewer, &[]).await;

        let outcome = controller.annotate_votes(&viewer).await;

        assert_eq!(outcome, VotesOutcome::Applied(1));
        let store = controller.snapshot();
        assert_eq!(store.user_vote("c-top"), Some(VoteValue::Up));
        assert!(store
            .post_votes()
            .all(|vote| store.posts().iter().any(|post| post.id == vote.post_id)));
    }

    #[tokio::test]
    async fn annotation_is_skipped_for_anonymous_viewers_and_empty_feeds() {
        let (repo, controller) = fixture();
        assert_eq!(controller.annotate_votes(&Viewer::User(alice())).await, VotesOutcome::Skipped);

        controller.build_home_feed(&Viewer::Anonymous, &[]).await;
        assert_eq!(controller.annotate_votes(&Viewer::Anonymous).await, VotesOutcome::Skipped);
        assert!(!repo
            .recorded_queries()
            .iter()
            .any(|query| matches!(query, RecordedQuery::UserVotes { .. })));
    }

    #[tokio::test]
    async fn repeating_a_vote_removes_it_everywhere() {
        let (repo, controller) = fixture();
        let viewer = Viewer::User(alice());
        controller.build_home_feed(&viewer, &[]).await;
        let post = controller.snapshot().posts()[0].clone();
        let start = post.vote_status;

        controller.vote(&viewer, &post, VoteValue::Up, "C").await.unwrap();
        let change = controller.vote(&viewer, &post, VoteValue::Up, "C").await.unwrap();

        assert_eq!(change.delta, -1);
        assert_eq!(change.next, None);
        let store = controller.snapshot();
        assert_eq!(store.posts()[0].vote_status, start);
        assert_eq!(store.user_vote(&post.id), None);
        assert_eq!(repo.post(&post.id).map(|p| p.vote_status), Some(start));
        assert!(repo.votes_of("alice").is_empty());
    }

    #[tokio::test]
    async fn flipping_a_vote_moves_the_score_by_the_difference() {
        let (repo, controller) = fixture();
        let viewer = Viewer::User(alice());
        controller.build_home_feed(&viewer, &[]).await;
        let post = controller.snapshot().posts()[0].clone();
        let start = post.vote_status;

        controller.vote(&viewer, &post, VoteValue::Down, "C").await.unwrap();
        let change = controller.vote(&viewer, &post, VoteValue::Up, "C").await.unwrap();

        assert_eq!(change.delta, 2);
        assert_eq!(controller.snapshot().posts()[0].vote_status, start + 1);
        assert_eq!(repo.post(&post.id).map(|p| p.vote_status), Some(start + 1));
        let stored = repo.votes_of("alice");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].vote_value, VoteValue::Up);
    }

    #[tokio::test]
    async fn anonymous_vote_is_rejected_without_touching_the_store() {
        let (_repo, controller) = fixture();
        controller.build_home_feed(&Viewer::Anonymous, &[]).await;
        let before = controller.snapshot();
        let post = before.posts()[0].clone();

        let result = controller.vote(&Viewer::Anonymous, &post, VoteValue::Up, "C").await;

        assert_eq!(result, Err(AppError::Unauthenticated));
        assert_eq!(controller.snapshot(), before);
    }

    #[tokio::test]
    async fn failed_vote_write_keeps_the_local_change() {
        let (repo, controller) = fixture();
        let viewer = Viewer::User(alice());
        controller.build_home_feed(&viewer, &[]).await;
        let post = controller.snapshot().posts()[0].clone();
        repo.set_fail_writes(true);

        let change = controller.vote(&viewer, &post, VoteValue::Up, "C").await.unwrap();

        assert_eq!(change.delta, 1);
        assert_eq!(controller.snapshot().user_vote(&post.id), Some(VoteValue::Up));
        assert_eq!(repo.post(&post.id).map(|p| p.vote_status), Some(post.vote_status));
    }

    #[tokio::test]
    async fn failed_delete_reports_an_error_and_keeps_the_post() {
        let (repo, controller) = fixture();
        controller.build_home_feed(&Viewer::Anonymous, &[]).await;
        let post = controller.snapshot().posts()[0].clone();
        repo.set_fail_writes(true);

        let outcome = controller.delete_from_item(&post, true).await;

        assert_eq!(
            outcome,
            DeleteOutcome {
                state: DeleteState {
                    loading: false,
                    error: true
                },
                redirect: None,
            }
        );
        assert!(controller.snapshot().posts().iter().any(|p| p.id == post.id));
    }

    #[tokio::test]
    async fn delete_on_a_single_post_page_redirects_to_the_community() {
        let (repo, controller) = fixture();
        let post = controller.load_post("a0").await.unwrap();

        let outcome = controller.delete_from_item(&post, true).await;

        assert_eq!(outcome.redirect.as_deref(), Some("/r/A"));
        assert_eq!(outcome.state, DeleteState::default());
        assert!(repo.post("a0").is_none());
        assert!(controller.snapshot().selected_post().is_none());
    }

    #[tokio::test]
    async fn delete_from_the_feed_stays_on_the_page() {
        let (_repo, controller) = fixture();
        controller.build_home_feed(&Viewer::Anonymous, &[]).await;
        let post = controller.snapshot().posts()[0].clone();

        let outcome = controller.delete_from_item(&post, false).await;

        assert_eq!(outcome.redirect, None);
        assert!(!outcome.state.error);
        assert!(!controller.snapshot().posts().iter().any(|p| p.id == post.id));
    }

    #[tokio::test]
    async fn selected_post_is_reused_by_the_post_page() {
        let (repo, controller) = fixture();
        controller.build_home_feed(&Viewer::Anonymous, &[]).await;
        let post = controller.snapshot().posts()[1].clone();

        let path = controller.select_post(&post);
        repo.set_fail_queries(true);

        assert_eq!(path, post.permalink());
        assert_eq!(controller.load_post(&post.id).await, Ok(post));
        assert!(matches!(
            controller.load_post("missing").await,
            Err(AppError::QueryFailed(_))
        ));
    }

    #[tokio::test]
    async fn community_feed_lists_only_that_community() {
        let (repo, controller) = fixture();

        let outcome = controller.load_community_feed("B").await;

        assert_eq!(
            outcome,
            FeedOutcome::Applied {
                kind: FeedKind::Community,
                count: 2
            }
        );
        assert!(controller
            .snapshot()
            .posts()
            .iter()
            .all(|post| post.community_id == "B"));
        assert_eq!(
            feed_queries(&repo),
            vec![FeedQuery::Membership {
                community_ids: vec!["B".to_string()],
                limit: 10
            }]
        );
    }

    #[tokio::test]
    async fn listener_sees_loading_then_the_loaded_feed() {
        let (repo, _) = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen_loading = Arc::new(AtomicUsize::new(0));
        let controller = FeedController::from_shared(repo, FeedConfig::default()).on_change({
            let calls = Arc::clone(&calls);
            let seen_loading = Arc::clone(&seen_loading);
            move |store: &PostStore| {
                calls.fetch_add(1, Ordering::SeqCst);
                if store.is_loading() {
                    seen_loading.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        controller.build_home_feed(&Viewer::Anonymous, &[]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(seen_loading.load(Ordering::SeqCst), 1);
        assert!(!controller.snapshot().is_loading());
    }

    #[tokio::test]
    async fn recommendations_use_the_configured_count() {
        let (repo, _) = fixture();
        let config = FeedConfig {
            recommendation_count: 2,
            ..FeedConfig::default()
        };
        let controller = FeedController::from_shared(repo, config);

        let communities = controller.recommendations().fetch().await;

        let ids: Vec<&str> = communities.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "B"]);
    }

    #[tokio::test]
    async fn logging_out_rebuilds_the_feed_without_votes() {
        let (repo, controller) = fixture();
        repo.insert_vote("alice", PostVote::new("c-top", "C", VoteValue::Up));
        let viewer = Viewer::User(alice());
        controller.build_home_feed(&viewer, &[]).await;
        controller.annotate_votes(&viewer).await;
        assert_eq!(controller.snapshot().vote_count(), 1);

        controller.refresh_for_session(&SessionState::Anonymous).await;

        assert_eq!(controller.snapshot().vote_count(), 0);
    }
}
