mod feed_controller;
mod feed_query;
mod post_store;
mod recommendations;
mod vote_change;

pub use feed_controller::{
    DeleteOutcome, DeleteState, FeedController, FeedOutcome, SessionState, VotesOutcome,
};
pub use feed_query::{FeedKind, FeedQuery, PostField, SortDirection};
pub use post_store::{AppliedVote, FeedTicket, PostStore, VoteTicket};
pub use recommendations::RecommendationFetcher;
pub use vote_change::{resolve_vote, VoteChange};
