use crate::domain::{CommunitySnippet, Viewer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostField {
    CreatedAt,
    VoteStatus,
}

impl PostField {
    pub fn name(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::VoteStatus => "voteStatus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Which posts the home feed shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedQuery {
    /// Newest posts from the communities the viewer joined.
    Membership { community_ids: Vec<String>, limit: u64 },
    /// Highest scored posts across every community.
    TopVoted { limit: u64 },
}

impl FeedQuery {
    pub fn for_viewer(viewer: &Viewer, snippets: &[CommunitySnippet], limit: u64) -> Self {
        match viewer {
            Viewer::User(_) if !snippets.is_empty() => Self::Membership {
                community_ids: snippets.iter().map(|s| s.community_id.clone()).collect(),
                limit,
            },
            _ => Self::TopVoted { limit },
        }
    }

    pub fn order_by(&self) -> (PostField, SortDirection) {
        match self {
            Self::Membership { .. } => (PostField::CreatedAt, SortDirection::Descending),
            Self::TopVoted { .. } => (PostField::VoteStatus, SortDirection::Descending),
        }
    }

    pub fn limit(&self) -> u64 {
        match self {
            Self::Membership { limit, .. } | Self::TopVoted { limit } => *limit,
        }
    }

    pub fn kind(&self) -> FeedKind {
        match self {
            Self::Membership { .. } => FeedKind::Membership,
            Self::TopVoted { .. } => FeedKind::TopVoted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Membership,
    TopVoted,
    Community,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;

    fn signed_in() -> Viewer {
        Viewer::User(User::new("u1", "alice"))
    }

    #[test]
    fn joined_communities_restrict_the_feed_to_exactly_that_set() {
        let snippets = vec![CommunitySnippet::member("A"), CommunitySnippet::member("B")];
        let query = FeedQuery::for_viewer(&signed_in(), &snippets, 10);

        assert_eq!(
            query,
            FeedQuery::Membership {
                community_ids: vec!["A".to_string(), "B".to_string()],
                limit: 10,
            }
        );
        assert_eq!(query.order_by(), (PostField::CreatedAt, SortDirection::Descending));
        assert_eq!(query.order_by().0.name(), "createdAt");
    }

    #[test]
    fn no_memberships_falls_back_to_top_voted() {
        let query = FeedQuery::for_viewer(&signed_in(), &[], 10);
        assert_eq!(query, FeedQuery::TopVoted { limit: 10 });
        assert_eq!(query.order_by().0.name(), "voteStatus");
    }

    #[test]
    fn anonymous_viewers_never_get_the_membership_query() {
        let snippets = vec![CommunitySnippet::member("A")];
        let query = FeedQuery::for_viewer(&Viewer::Anonymous, &snippets, 10);
        assert_eq!(query.kind(), FeedKind::TopVoted);
        assert_eq!(query.limit(), 10);
    }
}
