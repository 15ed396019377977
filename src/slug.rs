//! Category id and keyword derivation.
//!
//! Ids are slugs derived from the display name: emoji are stripped, known
//! Korean terms are transliterated through a fixed lookup table, and the
//! remainder is normalized to `[a-z0-9_]`. Collisions with existing ids or
//! reserved words are resolved with a numeric suffix.

use std::sync::OnceLock;

use regex::Regex;

/// Ids that can never be assigned to a category.
pub const RESERVED_IDS: [&str; 7] = ["all", "new", "add", "edit", "delete", "admin", "category"];

/// Korean terms replaced before slugging a name into an id.
const TRANSLITERATIONS: [(&str, &str); 14] = [
    ("프로젝트", "project"),
    ("블로그", "blog"),
    ("스터디", "study"),
    ("개발", "dev"),
    ("디자인", "design"),
    ("마케팅", "marketing"),
    ("기획", "planning"),
    ("분석", "analysis"),
    ("리뷰", "review"),
    ("튜토리얼", "tutorial"),
    ("가이드", "guide"),
    ("팁", "tips"),
    ("뉴스", "news"),
    ("이벤트", "event"),
];

/// English synonyms mixed into the keyword set of a category name.
const TRANSLATIONS: [(&str, &[&str]); 13] = [
    ("프로젝트", &["project", "proj"]),
    ("블로그", &["blog", "post"]),
    ("스터디", &["study", "learn"]),
    ("개발", &["dev", "development"]),
    ("디자인", &["design", "ui", "ux"]),
    ("마케팅", &["marketing", "promo"]),
    ("기획", &["planning", "plan"]),
    ("분석", &["analysis", "analytics"]),
    ("리뷰", &["review", "feedback"]),
    ("튜토리얼", &["tutorial", "guide"]),
    ("팁", &["tips", "tip"]),
    ("뉴스", &["news", "update"]),
    ("이벤트", &["event", "activity"]),
];

static EMOJI_RE: OnceLock<Regex> = OnceLock::new();

fn emoji_re() -> &'static Regex {
    EMOJI_RE.get_or_init(|| {
        // Pictographs plus the joiners/selectors emoji sequences are built from.
        // Deliberately not \p{Emoji}: that property also covers ASCII digits.
        Regex::new(
            r"[\p{Emoji_Presentation}\p{Extended_Pictographic}\p{Emoji_Modifier}\p{Emoji_Modifier_Base}\u{FE0F}\u{200D}\u{20E3}]",
        )
        .expect("emoji pattern is valid")
    })
}

/// Remove emoji (and emoji joiners) from a display name.
pub fn strip_emoji(name: &str) -> String {
    emoji_re().replace_all(name, "").trim().to_string()
}

/// Whether an id belongs to the reserved word set.
pub fn is_reserved(id: &str) -> bool {
    RESERVED_IDS.contains(&id)
}

/// Slug an id candidate out of a display name, without uniqueness handling.
pub fn base_id(name: &str) -> String {
    let mut clean = strip_emoji(name);
    for (korean, english) in TRANSLITERATIONS {
        if clean.contains(korean) {
            clean = clean.replace(korean, english);
        }
    }

    let mut slug = String::with_capacity(clean.len());
    for ch in clean.to_lowercase().chars() {
        if ch.is_whitespace() {
            slug.push('_');
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch);
        }
    }

    // Collapse runs of underscores and trim the ends
    let mut collapsed = String::with_capacity(slug.len());
    for ch in slug.chars() {
        if ch == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(ch);
    }
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        "category".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive a unique id for `name`. `is_taken` reports ids already present in
/// the registry; reserved words count as taken. Collisions append `_1`, `_2`, …
pub fn unique_id(name: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let base = base_id(name);
    let mut candidate = base.clone();
    let mut counter = 1u32;
    while is_taken(&candidate) || is_reserved(&candidate) {
        candidate = format!("{}_{}", base, counter);
        counter += 1;
    }
    candidate
}

/// Derive the keyword set for a category name: the cleaned lowercase name,
/// its words longer than one character, and translated synonyms. Order is
/// preserved, duplicates dropped.
pub fn keywords(name: &str) -> Vec<String> {
    let clean = strip_emoji(name);
    let mut result = Vec::new();

    push_unique(&mut result, clean.to_lowercase());

    for word in clean.split_whitespace() {
        if word.chars().count() > 1 {
            push_unique(&mut result, word.to_lowercase());
        }
    }

    for (korean, synonyms) in TRANSLATIONS {
        if clean.contains(korean) {
            for synonym in synonyms {
                push_unique(&mut result, synonym.to_string());
            }
        }
    }

    result
}

fn push_unique(keywords: &mut Vec<String>, keyword: String) {
    if !keyword.is_empty() && !keywords.contains(&keyword) {
        keywords.push(keyword);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_id_transliterates_korean() {
        assert_eq!(base_id("🎉 이벤트"), "event");
        assert_eq!(base_id("💻 프로젝트"), "project");
        assert_eq!(base_id("개발 노트"), "dev");
    }

    #[test]
    fn test_base_id_normalizes_ascii() {
        assert_eq!(base_id("My  Cool   Stuff"), "my_cool_stuff");
        assert_eq!(base_id("Rust & Go!"), "rust_go");
    }

    #[test]
    fn test_base_id_falls_back_when_nothing_survives() {
        assert_eq!(base_id("🎉"), "category");
        assert_eq!(base_id("한글만"), "category");
        assert_eq!(base_id(""), "category");
    }

    #[test]
    fn test_unique_id_avoids_taken_and_reserved() {
        let taken = ["event".to_string(), "event_1".to_string()];
        let id = unique_id("🎉 이벤트", |c| taken.contains(&c.to_string()));
        assert_eq!(id, "event_2");

        // "admin" is reserved even when nothing is taken
        let id = unique_id("admin", |_| false);
        assert_eq!(id, "admin_1");
    }

    #[test]
    fn test_unique_id_plain_when_free() {
        assert_eq!(unique_id("🎉 이벤트", |_| false), "event");
    }

    #[test]
    fn test_keywords_for_event_scenario() {
        let kw = keywords("🎉 이벤트");
        assert!(kw.contains(&"이벤트".to_string()));
        assert!(kw.contains(&"event".to_string()));
        assert!(kw.contains(&"activity".to_string()));
    }

    #[test]
    fn test_keywords_split_and_dedupe() {
        let kw = keywords("📝 개발 블로그");
        assert_eq!(kw[0], "개발 블로그");
        assert!(kw.contains(&"개발".to_string()));
        assert!(kw.contains(&"블로그".to_string()));
        assert!(kw.contains(&"dev".to_string()));
        assert!(kw.contains(&"post".to_string()));
        // no duplicates
        let mut sorted = kw.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), kw.len());
    }

    #[test]
    fn test_single_char_words_are_skipped() {
        let kw = keywords("A b cd");
        assert!(kw.contains(&"a b cd".to_string()));
        assert!(!kw.contains(&"a".to_string()));
        assert!(!kw.contains(&"b".to_string()));
        assert!(kw.contains(&"cd".to_string()));
    }
}