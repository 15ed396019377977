//! Category Entity
//!
//! Categories are labeled, colored tags used to group content records.
//! Each category carries a keyword set for legacy text-based matching.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Category every orphaned content record falls back to.
pub const FALLBACK_CATEGORY: &str = "projects";

/// Color used when a category id cannot be resolved.
pub const FALLBACK_COLOR: &str = "#28a745";

/// Palette assigned to new categories before falling back to random HSL.
pub const COLOR_PALETTE: [&str; 10] = [
    "#007bff", "#28a745", "#dc3545", "#ffc107", "#6f42c1",
    "#fd7e14", "#20c997", "#6c757d", "#e83e8c", "#17a2b8",
];

/// A category grouping content records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier, immutable once created
    pub id: String,
    /// Emoji-prefixed display label
    pub name: String,
    /// Hex or hsl() color
    pub color: String,
    /// Case-insensitive match terms for legacy filtering
    pub keywords: Vec<String>,
    /// Seed categories cannot be edited or deleted
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: String, name: String, color: String, keywords: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            color,
            keywords,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display label with the leading emoji stripped.
    pub fn label(&self) -> String {
        crate::slug::strip_emoji(&self.name)
    }
}

impl Entity for Category {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

fn default_category(id: &str, name: &str, color: &str, keywords: &[&str]) -> Category {
    // Fixed epoch so default records serialize identically everywhere
    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        is_default: true,
        created_at: epoch,
        updated_at: epoch,
    }
}

/// The four seed categories, in display order.
pub fn default_categories() -> Vec<Category> {
    vec![
        default_category("all", "📚 전체", "#6c757d", &["전체", "all"]),
        default_category(
            "projects",
            "💻 프로젝트",
            "#007bff",
            &["프로젝트", "project", "개발", "dev"],
        ),
        default_category("blog", "📝 블로그", "#dc3545", &["블로그", "blog", "포스팅", "post"]),
        default_category("study", "📖 스터디", "#ffc107", &["스터디", "study", "공부", "학습"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_seeded_in_order() {
        let defaults = default_categories();
        let ids: Vec<&str> = defaults.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["all", "projects", "blog", "study"]);
        assert!(defaults.iter().all(|c| c.is_default));
    }

    #[test]
    fn test_label_strips_emoji() {
        let defaults = default_categories();
        assert_eq!(defaults[1].label(), "프로젝트");
    }

    #[test]
    fn test_category_serializes_camel_case() {
        let cat = Category::new(
            "event".to_string(),
            "🎉 이벤트".to_string(),
            "#112233".to_string(),
            vec!["이벤트".to_string()],
        );
        let json = serde_json::to_value(&cat).unwrap();
        assert!(json.get("isDefault").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["isDefault"], serde_json::json!(false));
    }
}
