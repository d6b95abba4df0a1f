use super::vote_change::{resolve_vote, VoteChange};
use crate::domain::{Post, PostVote, VoteValue};
use reddit_errors::AppError;
use std::collections::{HashMap, HashSet};

/// Identifies one feed request; only the most recent one may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTicket(u64);

/// Identifies one vote fetch and the post generation it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTicket {
    request: u64,
    generation: u64,
}

/// A vote applied to the store, with the records the backend write needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedVote {
    pub change: VoteChange,
    pub previous: Option<PostVote>,
    pub next: Option<PostVote>,
}

/// Loaded feed plus the viewing user's votes on it.
///
/// The vote map only ever holds votes for posts that are loaded (the feed or
/// the selected post), and it is emptied whenever the feed is replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostStore {
    posts: Vec<Post>,
    post_votes: HashMap<String, PostVote>,
    selected_post: Option<Post>,
    /// Clicks made since the last vote fetch began; they win over its result.
    local_votes: HashMap<String, Option<PostVote>>,
    loading: bool,
    generation: u64,
    feed_requests: u64,
    vote_requests: u64,
}

impl PostStore {
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post_votes(&self) -> impl Iterator<Item = &PostVote> {
        self.post_votes.values()
    }

    pub fn vote_count(&self) -> usize {
        self.post_votes.len()
    }

    pub fn user_vote(&self, post_id: &str) -> Option<VoteValue> {
        self.post_votes.get(post_id).map(|vote| vote.vote_value)
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.selected_post.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Bumped every time the post sequence is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin_feed(&mut self) -> FeedTicket {
        self.feed_requests += 1;
        self.loading = true;
        FeedTicket(self.feed_requests)
    }

    /// Replaces the post sequence wholesale. Returns `false` and leaves the
    /// store untouched when a newer feed request has been issued since.
    pub fn apply_feed(&mut self, ticket: FeedTicket, posts: Vec<Post>) -> bool {
        if ticket.0 != self.feed_requests {
            return false;
        }
        self.posts = posts;
        self.generation += 1;
        self.clear_votes();
        true
    }

    /// Clears the loading flag if `ticket` is the latest feed request.
    pub fn finish_feed(&mut self, ticket: FeedTicket) {
        if ticket.0 == self.feed_requests {
            self.loading = false;
        }
    }

    /// Drops every vote and invalidates vote fetches still in flight.
    pub fn clear_votes(&mut self) {
        self.post_votes.clear();
        self.local_votes.clear();
        self.vote_requests += 1;
    }

    pub fn begin_vote_fetch(&mut self) -> (VoteTicket, Vec<String>) {
        self.clear_votes();
        let ticket = VoteTicket {
            request: self.vote_requests,
            generation: self.generation,
        };
        (ticket, self.loaded_post_ids())
    }

    /// Replaces the vote map with `votes`, keeping only votes on loaded posts.
    /// Clicks applied after `ticket` was issued override the fetched records.
    pub fn apply_votes(&mut self, ticket: VoteTicket, votes: Vec<PostVote>) -> bool {
        if ticket.request != self.vote_requests || ticket.generation != self.generation {
            return false;
        }
        let loaded: HashSet<String> = self.loaded_post_ids().into_iter().collect();
        let mut post_votes: HashMap<String, PostVote> = votes
            .into_iter()
            .filter(|vote| loaded.contains(&vote.post_id))
            .map(|vote| (vote.post_id.clone(), vote))
            .collect();
        for (post_id, local) in self.local_votes.drain() {
            match local {
                Some(vote) => post_votes.insert(post_id, vote),
                None => post_votes.remove(&post_id),
            };
        }
        self.post_votes = post_votes;
        true
    }

    /// Applies a vote click to the cached score and the vote map together.
    pub fn apply_vote(
        &mut self,
        post_id: &str,
        community_id: &str,
        requested: VoteValue,
    ) -> Result<AppliedVote, AppError> {
        let in_feed = self.posts.iter().any(|post| post.id == post_id);
        let selected = self
            .selected_post
            .as_ref()
            .is_some_and(|post| post.id == post_id);
        if !in_feed && !selected {
            return Err(AppError::NotFound);
        }

        let previous = self.post_votes.get(post_id).cloned();
        let change = resolve_vote(previous.as_ref().map(|vote| vote.vote_value), requested);

        for post in self.posts.iter_mut().filter(|post| post.id == post_id) {
            post.vote_status += change.delta;
        }
        if let Some(post) = self.selected_post.as_mut().filter(|post| post.id == post_id) {
            post.vote_status += change.delta;
        }

        let next = match change.next {
            None => {
                self.post_votes.remove(post_id);
                None
            }
            Some(value) => {
                let vote = match previous.clone() {
                    Some(existing) => PostVote {
                        vote_value: value,
                        ..existing
                    },
                    None => PostVote::new(post_id, community_id, value),
                };
                self.post_votes.insert(post_id.to_string(), vote.clone());
                Some(vote)
            }
        };

        self.local_votes.insert(post_id.to_string(), next.clone());

        Ok(AppliedVote {
            change,
            previous,
            next,
        })
    }

    pub fn remove_post(&mut self, post_id: &str) {
        self.posts.retain(|post| post.id != post_id);
        self.post_votes.remove(post_id);
        self.local_votes.remove(post_id);
        if self.selected_post.as_ref().is_some_and(|post| post.id == post_id) {
            self.selected_post = None;
        }
    }

    pub fn select_post(&mut self, post: Post) {
        self.selected_post = Some(post);
    }

    fn loaded_post_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.posts.iter().map(|post| post.id.clone()).collect();
        if let Some(selected) = &self.selected_post {
            if !ids.contains(&selected.id) {
                ids.push(selected.id.clone());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, score: i64) -> Post {
        Post::new(id, "rust", "alice", format!("Post {id}")).with_vote_status(score)
    }

    fn vote(post_id: &str, value: VoteValue) -> PostVote {
        PostVote::new(post_id, "rust", value)
    }

    fn loaded(posts: Vec<Post>) -> PostStore {
        let mut store = PostStore::default();
        let ticket = store.begin_feed();
        assert!(store.apply_feed(ticket, posts));
        store.finish_feed(ticket);
        store
    }

    #[test]
    fn newer_feed_request_wins_over_a_slow_older_one() {
        let mut store = PostStore::default();
        let slow = store.begin_feed();
        let fast = store.begin_feed();

        assert!(store.apply_feed(fast, vec![post("new", 0)]));
        store.finish_feed(fast);
        assert!(!store.is_loading());

        assert!(!store.apply_feed(slow, vec![post("old", 0)]));
        store.finish_feed(slow);
        assert_eq!(store.posts()[0].id, "new");
        assert!(!store.is_loading());
    }

    #[test]
    fn stale_request_finishing_does_not_clear_loading_for_the_newer_one() {
        let mut store = PostStore::default();
        let first = store.begin_feed();
        let _second = store.begin_feed();

        store.finish_feed(first);
        assert!(store.is_loading());
    }

    #[test]
    fn replacing_the_feed_drops_votes() {
        let mut store = loaded(vec![post("a", 1)]);
        let (ticket, ids) = store.begin_vote_fetch();
        assert_eq!(ids, vec!["a".to_string()]);
        assert!(store.apply_votes(ticket, vec![vote("a", VoteValue::Up)]));
        assert_eq!(store.user_vote("a"), Some(VoteValue::Up));

        let feed = store.begin_feed();
        assert!(store.apply_feed(feed, vec![post("a", 1)]));
        assert_eq!(store.vote_count(), 0);
    }

    #[test]
    fn votes_for_unloaded_posts_are_not_kept() {
        let mut store = loaded(vec![post("a", 0), post("b", 0)]);
        let (ticket, _) = store.begin_vote_fetch();
        let votes = vec![vote("a", VoteValue::Up), vote("zzz", VoteValue::Down)];

        assert!(store.apply_votes(ticket, votes));
        assert_eq!(store.vote_count(), 1);
        assert!(store
            .post_votes()
            .all(|v| store.posts().iter().any(|p| p.id == v.post_id)));
    }

    #[test]
    fn vote_fetch_for_a_previous_feed_is_discarded() {
        let mut store = loaded(vec![post("a", 0)]);
        let (ticket, _) = store.begin_vote_fetch();

        let feed = store.begin_feed();
        store.apply_feed(feed, vec![post("a", 0)]);

        assert!(!store.apply_votes(ticket, vec![vote("a", VoteValue::Up)]));
        assert_eq!(store.user_vote("a"), None);
    }

    #[test]
    fn clearing_votes_invalidates_in_flight_fetches() {
        let mut store = loaded(vec![post("a", 0)]);
        let (ticket, _) = store.begin_vote_fetch();
        store.clear_votes();
        assert!(!store.apply_votes(ticket, vec![vote("a", VoteValue::Up)]));
    }

    #[test]
    fn score_and_vote_map_agree_through_a_sequence_of_clicks() {
        let mut store = loaded(vec![post("a", 10)]);

        store.apply_vote("a", "rust", VoteValue::Up).unwrap();
        assert_eq!((store.posts()[0].vote_status, store.user_vote("a")), (11, Some(VoteValue::Up)));

        let flipped = store.apply_vote("a", "rust", VoteValue::Down).unwrap();
        assert_eq!(flipped.change.delta, -2);
        assert_eq!((store.posts()[0].vote_status, store.user_vote("a")), (9, Some(VoteValue::Down)));
        assert_eq!(flipped.previous.as_ref().map(|v| &v.id), flipped.next.as_ref().map(|v| &v.id));

        let removed = store.apply_vote("a", "rust", VoteValue::Down).unwrap();
        assert_eq!(removed.change.delta, 1);
        assert!(removed.next.is_none());
        assert_eq!((store.posts()[0].vote_status, store.user_vote("a")), (10, None));
    }

    #[test]
    fn click_during_a_vote_fetch_survives_its_result() {
        let mut store = loaded(vec![post("a", 10)]);
        let (ticket, _) = store.begin_vote_fetch();

        store.apply_vote("a", "rust", VoteValue::Up).unwrap();
        assert!(store.apply_votes(ticket, vec![]));
        assert_eq!((store.posts()[0].vote_status, store.user_vote("a")), (11, Some(VoteValue::Up)));

        let second = store.apply_vote("a", "rust", VoteValue::Up).unwrap();
        assert_eq!(second.change.delta, -1);
        assert_eq!((store.posts()[0].vote_status, store.user_vote("a")), (10, None));
    }

    #[test]
    fn fetched_votes_merge_with_clicks_made_while_loading() {
        let mut store = loaded(vec![post("a", 5), post("b", 5)]);
        let (ticket, _) = store.begin_vote_fetch();

        store.apply_vote("a", "rust", VoteValue::Up).unwrap();
        store.apply_vote("a", "rust", VoteValue::Up).unwrap();
        let fetched = vec![vote("a", VoteValue::Down), vote("b", VoteValue::Up)];

        assert!(store.apply_votes(ticket, fetched));
        assert_eq!(store.user_vote("a"), None);
        assert_eq!(store.user_vote("b"), Some(VoteValue::Up));
        assert_eq!(store.posts()[0].vote_status, 5);
    }

    #[test]
    fn voting_updates_the_selected_post_copy() {
        let mut store = loaded(vec![post("a", 3)]);
        store.select_post(post("a", 3));

        store.apply_vote("a", "rust", VoteValue::Up).unwrap();
        assert_eq!(store.selected_post().map(|p| p.vote_status), Some(4));
        assert_eq!(store.posts()[0].vote_status, 4);
    }

    #[test]
    fn voting_on_an_unknown_post_changes_nothing() {
        let mut store = loaded(vec![post("a", 3)]);
        let before = store.clone();

        assert_eq!(store.apply_vote("b", "rust", VoteValue::Up), Err(AppError::NotFound));
        assert_eq!(store, before);
    }

    #[test]
    fn removing_a_post_drops_its_vote_and_selection() {
        let mut store = loaded(vec![post("a", 0), post("b", 0)]);
        store.select_post(post("a", 0));
        store.apply_vote("a", "rust", VoteValue::Up).unwrap();

        store.remove_post("a");
        assert_eq!(store.posts().len(), 1);
        assert_eq!(store.user_vote("a"), None);
        assert!(store.selected_post().is_none());
    }
}
