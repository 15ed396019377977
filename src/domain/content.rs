//! Content Entity
//!
//! A titled, categorized markdown document record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// A content record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Monotonically increasing, process-local id
    pub id: u32,
    pub title: String,
    /// Foreign key into the category registry
    pub category: String,
    /// Markdown source
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    pub fn new(id: u32, title: String, category: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            category,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Human-readable age of the record relative to `now`.
    pub fn relative_age(&self, now: DateTime<Utc>) -> String {
        let diff = now.signed_duration_since(self.created_at);
        let mins = diff.num_minutes();
        let hours = diff.num_hours();
        let days = diff.num_days();

        if mins < 1 {
            "방금 전".to_string()
        } else if mins < 60 {
            format!("{}분 전", mins)
        } else if hours < 24 {
            format!("{}시간 전", hours)
        } else if days < 7 {
            format!("{}일 전", days)
        } else if days < 30 {
            format!("{}주 전", days / 7)
        } else if days < 365 {
            format!("{}개월 전", days / 30)
        } else {
            format!("{}년 전", days / 365)
        }
    }
}

impl Entity for Content {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_age_buckets() {
        let content = Content::new(1, "A".to_string(), "blog".to_string(), "# hi".to_string());
        let t0 = content.created_at;

        assert_eq!(content.relative_age(t0 + Duration::seconds(30)), "방금 전");
        assert_eq!(content.relative_age(t0 + Duration::minutes(5)), "5분 전");
        assert_eq!(content.relative_age(t0 + Duration::hours(3)), "3시간 전");
        assert_eq!(content.relative_age(t0 + Duration::days(2)), "2일 전");
        assert_eq!(content.relative_age(t0 + Duration::days(14)), "2주 전");
        assert_eq!(content.relative_age(t0 + Duration::days(90)), "3개월 전");
        assert_eq!(content.relative_age(t0 + Duration::days(800)), "2년 전");
    }

    #[test]
    fn test_content_round_trips_through_json() {
        let content = Content::new(7, "A".to_string(), "blog".to_string(), "# hi".to_string());
        let json = serde_json::to_string(&content).unwrap();
        let back: Content = serde_json::from_str(&json).unwrap();
        assert_eq!(back, content);
        assert_eq!(back.created_at.timestamp_millis(), content.created_at.timestamp_millis());
    }
}
