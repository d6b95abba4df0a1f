use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub community_id: String,
    pub creator_id: String,
    pub creator_display_name: String,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    /// Net score cached on the post; adjusted locally when the viewer votes.
    pub vote_status: i64,
    pub number_of_comments: i64,
    pub created_at: DateTime<Utc>,
    pub community_image_url: Option<String>,
}

impl Post {
    pub fn new(
        id: impl Into<String>,
        community_id: impl Into<String>,
        creator_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let creator_id = creator_id.into();
        Self {
            id: id.into(),
            community_id: community_id.into(),
            creator_display_name: creator_id.clone(),
            creator_id,
            title: title.into(),
            body: String::new(),
            link: None,
            image_url: None,
            vote_status: 0,
            number_of_comments: 0,
            created_at: Utc::now(),
            community_image_url: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_vote_status(mut self, vote_status: i64) -> Self {
        self.vote_status = vote_status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn with_creator_display_name(mut self, name: impl Into<String>) -> Self {
        self.creator_display_name = name.into();
        self
    }

    pub fn community_path(&self) -> String {
        format!("/r/{}", self.community_id)
    }

    pub fn permalink(&self) -> String {
        format!("/r/{}/comments/{}", self.community_id, self.id)
    }

    /// File name offered by the "Save" action; `None` when there is no image.
    pub fn image_download_name(&self) -> Option<String> {
        let url = self.image_url.as_deref()?;
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let name = path.rsplit('/').next().unwrap_or_default();
        if name.contains('.') {
            Some(name.to_string())
        } else {
            Some("image.jpg".to_string())
        }
    }

    /// Relative age shown next to the creator name ("3 hours ago").
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.created_at);
        let (amount, unit) = if elapsed.num_seconds() < 45 {
            return "just now".to_string();
        } else if elapsed.num_minutes() < 60 {
            (elapsed.num_minutes().max(1), "minute")
        } else if elapsed.num_hours() < 24 {
            (elapsed.num_hours(), "hour")
        } else if elapsed.num_days() < 30 {
            (elapsed.num_days(), "day")
        } else if elapsed.num_days() < 365 {
            (elapsed.num_days() / 30, "month")
        } else {
            (elapsed.num_days() / 365, "year")
        };

        if amount == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{amount} {unit}s ago")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn age_label_picks_the_largest_whole_unit() {
        let now = Utc::now();
        let post = Post::new("p1", "rust", "alice", "Hello");

        let at = |ago: Duration| post.clone().with_created_at(now - ago).age_label(now);

        assert_eq!(at(Duration::seconds(10)), "just now");
        assert_eq!(at(Duration::seconds(50)), "1 minute ago");
        assert_eq!(at(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(at(Duration::hours(1)), "1 hour ago");
        assert_eq!(at(Duration::days(3)), "3 days ago");
        assert_eq!(at(Duration::days(65)), "2 months ago");
        assert_eq!(at(Duration::days(800)), "2 years ago");
    }

    #[test]
    fn paths_point_at_the_owning_community() {
        let post = Post::new("p1", "rust", "alice", "Hello");
        assert_eq!(post.community_path(), "/r/rust");
        assert_eq!(post.permalink(), "/r/rust/comments/p1");
    }

    #[test]
    fn save_is_only_offered_for_posts_with_an_image() {
        let post = Post::new("p1", "rust", "alice", "Hello");
        assert_eq!(post.image_download_name(), None);

        let named = post
            .clone()
            .with_image_url(Some("https://cdn.example.com/u/crab.png?w=640".to_string()));
        assert_eq!(named.image_download_name().as_deref(), Some("crab.png"));

        let opaque = post.with_image_url(Some("https://cdn.example.com/media/8f3a".to_string()));
        assert_eq!(opaque.image_download_name().as_deref(), Some("image.jpg"));
    }
}
