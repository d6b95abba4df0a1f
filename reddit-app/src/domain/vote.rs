use reddit_errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.as_i64()
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(AppError::InvalidVote(other)),
        }
    }
}

/// The viewing user's vote on a single post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostVote {
    pub id: String,
    pub post_id: String,
    pub community_id: String,
    pub vote_value: VoteValue,
}

impl PostVote {
    pub fn new(
        post_id: impl Into<String>,
        community_id: impl Into<String>,
        vote_value: VoteValue,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            post_id: post_id.into(),
            community_id: community_id.into(),
            vote_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unit_values_are_votes() {
        assert_eq!(VoteValue::try_from(1), Ok(VoteValue::Up));
        assert_eq!(VoteValue::try_from(-1), Ok(VoteValue::Down));
        assert_eq!(VoteValue::try_from(0), Err(AppError::InvalidVote(0)));
        assert_eq!(VoteValue::try_from(2), Err(AppError::InvalidVote(2)));
    }
}
