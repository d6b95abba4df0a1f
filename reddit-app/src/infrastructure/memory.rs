use crate::application::FeedQuery;
use crate::domain::{Community, CommunitySnippet, Post, PostVote, User, VoteValue};
use crate::repository::PostRepository;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use reddit_errors::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// A read served by [`MemoryRepository`], in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedQuery {
    Feed(FeedQuery),
    UserVotes { user_id: String, post_ids: Vec<String> },
    TopCommunities { limit: u64 },
    Snippets { user_id: String },
    Post { post_id: String },
}

/// Process-local backend used by tests and when no database is configured.
#[derive(Default)]
pub struct MemoryRepository {
    posts: DashMap<String, Post>,
    votes: DashMap<String, Vec<PostVote>>,
    communities: DashMap<String, Community>,
    snippets: DashMap<String, Vec<CommunitySnippet>>,
    query_log: Mutex<Vec<RecordedQuery>>,
    fail_queries: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_post(&self, post: Post) {
        self.posts.insert(post.id.clone(), post);
    }

    pub fn insert_community(&self, community: Community) {
        self.communities.insert(community.id.clone(), community);
    }

    pub fn join(&self, user_id: &str, snippet: CommunitySnippet) {
        self.snippets.entry(user_id.to_string()).or_default().push(snippet);
    }

    pub fn insert_vote(&self, user_id: &str, vote: PostVote) {
        self.votes.entry(user_id.to_string()).or_default().push(vote);
    }

    pub fn post(&self, post_id: &str) -> Option<Post> {
        self.posts.get(post_id).map(|entry| entry.value().clone())
    }

    pub fn votes_of(&self, user_id: &str) -> Vec<PostVote> {
        self.votes
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.query_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, query: RecordedQuery) -> Result<(), AppError> {
        self.query_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(AppError::QueryFailed("in-memory backend unavailable".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::WriteFailed("in-memory backend is read-only".to_string()));
        }
        Ok(())
    }

    /// The user that `/auth/demo` signs in as.
    pub fn demo_user() -> User {
        User::new("demo-user", "demo_user")
    }

    /// A few communities and posts to browse without a database.
    pub fn seeded() -> Self {
        let repo = Self::new();
        let now = Utc::now();

        for (id, members) in [
            ("rust", 1840),
            ("webdev", 960),
            ("gaming", 2210),
            ("cooking", 410),
            ("photography", 720),
            ("books", 305),
        ] {
            repo.insert_community(Community::new(id, "founder", members));
        }

        let posts = [
            ("p1", "rust", "ferris", "Borrow checker finally clicked for me", 42, 3),
            ("p2", "webdev", "tim", "Server functions are underrated", 17, 5),
            ("p3", "gaming", "nova", "Speedrun route for the first dungeon", 88, 9),
            ("p4", "cooking", "marco", "Weeknight ramen that takes 20 minutes", 12, 20),
            ("p5", "rust", "ana", "Show r/rust: a tiny key-value store", 31, 26),
            ("p6", "photography", "lee", "Golden hour over the harbor", 54, 30),
            ("p7", "books", "sam", "What are you reading this month?", 7, 45),
            ("p8", "gaming", "kai", "Patch notes discussion thread", 23, 50),
        ];
        for (id, community, creator, title, score, hours_ago) in posts {
            repo.insert_post(
                Post::new(id, community, creator, title)
                    .with_vote_status(score)
                    .with_created_at(now - Duration::hours(hours_ago)),
            );
        }

        let demo = Self::demo_user();
        repo.join(&demo.id, CommunitySnippet::member("rust"));
        repo.join(&demo.id, CommunitySnippet::member("gaming"));
        repo.insert_vote(&demo.id, PostVote::new("p3", "gaming", VoteValue::Up));

        repo
    }
}

impl PostRepository for MemoryRepository {
    async fn list_by_community(
        &self,
        community_ids: &[String],
        limit: u64,
    ) -> Result<Vec<Post>, AppError> {
        self.record(RecordedQuery::Feed(FeedQuery::Membership {
            community_ids: community_ids.to_vec(),
            limit,
        }))?;

        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| community_ids.contains(&entry.community_id))
            .map(|entry| entry.value().clone())
            .collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn list_top_voted(&self, limit: u64) -> Result<Vec<Post>, AppError> {
        self.record(RecordedQuery::Feed(FeedQuery::TopVoted { limit }))?;

        let mut posts: Vec<Post> = self.posts.iter().map(|entry| entry.value().clone()).collect();
        posts.sort_by(|a, b| {
            b.vote_status
                .cmp(&a.vote_status)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn list_user_votes(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<Vec<PostVote>, AppError> {
        self.record(RecordedQuery::UserVotes {
            user_id: user_id.to_string(),
            post_ids: post_ids.to_vec(),
        })?;

        Ok(self
            .votes_of(user_id)
            .into_iter()
            .filter(|vote| post_ids.contains(&vote.post_id))
            .collect())
    }

    async fn list_top_communities(&self, limit: u64) -> Result<Vec<Community>, AppError> {
        self.record(RecordedQuery::TopCommunities { limit })?;

        let mut communities: Vec<Community> = self
            .communities
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        communities.sort_by(|a, b| {
            b.number_of_members
                .cmp(&a.number_of_members)
                .then_with(|| a.id.cmp(&b.id))
        });
        communities.truncate(limit as usize);
        Ok(communities)
    }

    async fn list_user_snippets(&self, user_id: &str) -> Result<Vec<CommunitySnippet>, AppError> {
        self.record(RecordedQuery::Snippets {
            user_id: user_id.to_string(),
        })?;

        Ok(self
            .snippets
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn find_post(&self, post_id: &str) -> Result<Option<Post>, AppError> {
        self.record(RecordedQuery::Post {
            post_id: post_id.to_string(),
        })?;
        Ok(self.post(post_id))
    }

    async fn save_vote(&self, user_id: &str, vote: &PostVote) -> Result<(), AppError> {
        self.check_writable()?;
        let mut votes = self.votes.entry(user_id.to_string()).or_default();
        match votes.iter_mut().find(|existing| existing.id == vote.id) {
            Some(existing) => *existing = vote.clone(),
            None => votes.push(vote.clone()),
        }
        Ok(())
    }

    async fn remove_vote(&self, user_id: &str, vote_id: &str) -> Result<(), AppError> {
        self.check_writable()?;
        if let Some(mut votes) = self.votes.get_mut(user_id) {
            votes.retain(|vote| vote.id != vote_id);
        }
        Ok(())
    }

    async fn adjust_vote_status(&self, post_id: &str, delta: i64) -> Result<i64, AppError> {
        self.check_writable()?;
        let mut post = self.posts.get_mut(post_id).ok_or(AppError::NotFound)?;
        post.vote_status += delta;
        Ok(post.vote_status)
    }

    async fn delete_post(&self, post: &Post) -> Result<(), AppError> {
        self.check_writable()?;
        self.posts
            .remove(&post.id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }
}
