//! Storage Layer
//!
//! Key-value persistence abstraction mirroring the source app's string
//! storage: each key holds one JSON document. Backends are unsynchronized
//! across processes; concurrent writers are last-write-wins.

mod backend;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};

/// Key holding the category registry payload.
pub const CATEGORY_SETTINGS_KEY: &str = "category_settings";

/// Key holding the content store payload.
pub const CONTENTS_KEY: &str = "portfolio_contents";

/// Version tag written into every persisted payload. Payloads without the
/// tag are treated as legacy and migrated at load time.
pub const FORMAT_VERSION: &str = "2.0";

/// Coerce a JSON date string from a persisted payload into a timestamp,
/// defaulting to now when absent or unparsable.
pub(crate) fn coerce_date(value: Option<&serde_json::Value>) -> chrono::DateTime<chrono::Utc> {
    value
        .and_then(serde_json::Value::as_str)
        .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(chrono::Utc::now)
}
