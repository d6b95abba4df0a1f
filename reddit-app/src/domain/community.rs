use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub creator_id: String,
    pub number_of_members: i64,
    pub privacy_type: String,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Community {
    pub fn new(id: impl Into<String>, creator_id: impl Into<String>, number_of_members: i64) -> Self {
        Self {
            id: id.into(),
            creator_id: creator_id.into(),
            number_of_members,
            privacy_type: "public".to_string(),
            image_url: None,
            created_at: None,
        }
    }
}

/// Membership record linking the viewing user to a joined community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunitySnippet {
    pub community_id: String,
    pub is_moderator: bool,
    pub image_url: Option<String>,
}

impl CommunitySnippet {
    pub fn member(community_id: impl Into<String>) -> Self {
        Self {
            community_id: community_id.into(),
            is_moderator: false,
            image_url: None,
        }
    }
}
