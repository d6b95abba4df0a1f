use std::env;

const DEFAULT_PAGE_SIZE: u64 = 10;
const DEFAULT_RECOMMENDATION_COUNT: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    pub page_size: u64,
    pub recommendation_count: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            recommendation_count: DEFAULT_RECOMMENDATION_COUNT,
        }
    }
}

impl FeedConfig {
    /// Reads `FEED_PAGE_SIZE` and `RECOMMENDATION_COUNT`, keeping the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            page_size: read_positive("FEED_PAGE_SIZE").unwrap_or(defaults.page_size),
            recommendation_count: read_positive("RECOMMENDATION_COUNT")
                .unwrap_or(defaults.recommendation_count),
        }
    }
}

fn read_positive(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!("Ignoring {}={:?}, expected a positive integer", key, raw);
            None
        }
    }
}
