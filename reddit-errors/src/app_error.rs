use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Invalid vote value: {0}")]
    InvalidVote(i64),

    #[error("Record not found")]
    NotFound,

    #[error("Sign in required")]
    Unauthenticated,

    #[error("Not allowed")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FromStr for AppError {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("Query failed: ") {
            Ok(AppError::QueryFailed(rest.to_string()))
        } else if let Some(rest) = s.strip_prefix("Write failed: ") {
            Ok(AppError::WriteFailed(rest.to_string()))
        } else if let Some(value) = s
            .strip_prefix("Invalid vote value: ")
            .and_then(|v| v.trim().parse().ok())
        {
            Ok(AppError::InvalidVote(value))
        } else if s.contains("Record not found") {
            Ok(AppError::NotFound)
        } else if s.contains("Sign in required") {
            Ok(AppError::Unauthenticated)
        } else if s.contains("Not allowed") {
            Ok(AppError::Forbidden)
        } else if let Some(rest) = s.strip_prefix("Internal error: ") {
            Ok(AppError::Internal(rest.to_string()))
        } else {
            Ok(AppError::Internal(s.to_string()))
        }
    }
}

impl AppError {
    pub fn user_message(&self) -> &str {
        match self {
            Self::QueryFailed(_) => "Could not load posts. Try again later.",
            Self::WriteFailed(_) => "Could not save your change. Try again.",
            Self::InvalidVote(_) => "That vote is not valid.",
            Self::NotFound => "This post does not exist anymore.",
            Self::Unauthenticated => "Log in to vote and manage posts.",
            Self::Forbidden => "You can only change your own posts.",
            Self::Internal(_) => "Something went wrong on our end.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_parses_back_into_the_same_variant() {
        let errors = [
            AppError::QueryFailed("timeout".to_string()),
            AppError::WriteFailed("conflict".to_string()),
            AppError::InvalidVote(3),
            AppError::NotFound,
            AppError::Unauthenticated,
            AppError::Forbidden,
            AppError::Internal("boom".to_string()),
        ];

        for error in errors {
            let parsed: AppError = error.to_string().parse().unwrap();
            assert_eq!(parsed, error);
        }
    }

    #[test]
    fn unknown_text_becomes_internal() {
        let parsed: AppError = "socket closed".parse().unwrap();
        assert_eq!(parsed, AppError::Internal("socket closed".to_string()));
    }
}
