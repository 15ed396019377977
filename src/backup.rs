//! Whole-Application Backup
//!
//! Wraps every module's persisted payload in a single export document:
//! `{ metadata: { exportDate, version, modules }, data: { module: payload } }`.
//! Import validates the metadata before any destructive replace and then
//! writes the raw payloads back under their storage keys.

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{DomainError, DomainResult};
use crate::storage::{StorageBackend, CATEGORY_SETTINGS_KEY, CONTENTS_KEY, FORMAT_VERSION};

/// Module name → storage key, in export order.
pub const MODULES: [(&str, &str); 2] = [
    ("category", CATEGORY_SETTINGS_KEY),
    ("content", CONTENTS_KEY),
];

#[derive(Debug, Serialize, Deserialize)]
struct BackupMetadata {
    #[serde(rename = "exportDate")]
    export_date: String,
    version: String,
    modules: Vec<String>,
}

/// Export every module's stored payload into one backup document.
pub fn export_backup(storage: &dyn StorageBackend) -> DomainResult<String> {
    let metadata = BackupMetadata {
        export_date: Utc::now().to_rfc3339(),
        version: FORMAT_VERSION.to_string(),
        modules: MODULES.iter().map(|(name, _)| name.to_string()).collect(),
    };

    let mut data = serde_json::Map::new();
    for (name, key) in MODULES {
        let Some(raw) = storage.get(key)? else {
            continue;
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(payload) => {
                data.insert(name.to_string(), payload);
            }
            Err(e) => warn!("skipping module {} with corrupt payload: {}", name, e),
        }
    }

    let document = json!({
        "metadata": metadata,
        "data": Value::Object(data),
    });
    serde_json::to_string_pretty(&document)
        .map_err(|e| DomainError::Storage(format!("backup export failed: {}", e)))
}

/// Restore module payloads from a backup document. The document is
/// validated before anything is overwritten; unknown modules are skipped.
/// Returns how many modules were restored.
pub fn import_backup(storage: &dyn StorageBackend, json: &str) -> DomainResult<usize> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| DomainError::InvalidInput(format!("backup is not valid JSON: {}", e)))?;

    if !is_valid_backup(&document) {
        return Err(DomainError::InvalidInput("backup document is malformed".to_string()));
    }

    let data = document
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| DomainError::InvalidInput("backup document is malformed".to_string()))?;

    let mut restored = 0;
    for (name, key) in MODULES {
        let Some(payload) = data.get(name) else {
            continue;
        };
        let raw = serde_json::to_string(payload)
            .map_err(|e| DomainError::Storage(format!("backup import failed: {}", e)))?;
        storage.set(key, &raw)?;
        restored += 1;
    }

    info!("restored {} modules from backup", restored);
    Ok(restored)
}

/// `metadata.exportDate` must be a string and `metadata.modules` an array.
fn is_valid_backup(document: &Value) -> bool {
    let Some(metadata) = document.get("metadata") else {
        return false;
    };
    metadata.get("exportDate").map_or(false, Value::is_string)
        && metadata.get("modules").map_or(false, Value::is_array)
        && document.get("data").map_or(false, Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_export_includes_present_modules_only() {
        let storage = MemoryStorage::new();
        storage.set(CATEGORY_SETTINGS_KEY, r#"{"version":"2.0"}"#).unwrap();

        let document: Value = serde_json::from_str(&export_backup(&storage).unwrap()).unwrap();
        assert!(document["metadata"]["exportDate"].is_string());
        assert_eq!(document["metadata"]["version"], "2.0");
        assert_eq!(document["metadata"]["modules"], json!(["category", "content"]));
        assert!(document["data"].get("category").is_some());
        assert!(document["data"].get("content").is_none());
    }

    #[test]
    fn test_round_trip_restores_payloads() {
        let source = MemoryStorage::new();
        source.set(CATEGORY_SETTINGS_KEY, r#"{"version":"2.0","categories":[]}"#).unwrap();
        source.set(CONTENTS_KEY, r#"{"version":"2.0","contents":[],"nextId":7}"#).unwrap();
        let backup = export_backup(&source).unwrap();

        let target = MemoryStorage::new();
        let restored = import_backup(&target, &backup).unwrap();
        assert_eq!(restored, 2);

        let contents: Value =
            serde_json::from_str(&target.get(CONTENTS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(contents["nextId"], 7);
    }

    #[test]
    fn test_import_rejects_malformed_documents() {
        let storage = MemoryStorage::new();

        for bad in [
            "not json",
            r#"{"data":{}}"#,
            r#"{"metadata":{"modules":[]},"data":{}}"#,
            r#"{"metadata":{"exportDate":123,"modules":[]},"data":{}}"#,
            r#"{"metadata":{"exportDate":"2026-01-01","modules":"nope"},"data":{}}"#,
            r#"{"metadata":{"exportDate":"2026-01-01","modules":[]}}"#,
        ] {
            assert!(
                matches!(import_backup(&storage, bad), Err(DomainError::InvalidInput(_))),
                "accepted: {}",
                bad
            );
        }
        // Nothing was written
        assert!(storage.get(CATEGORY_SETTINGS_KEY).unwrap().is_none());
        assert!(storage.get(CONTENTS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_unknown_modules_are_skipped() {
        let storage = MemoryStorage::new();
        let document = json!({
            "metadata": { "exportDate": "2026-08-29T00:00:00Z", "modules": ["banner"] },
            "data": { "banner": { "slides": [] } }
        });
        let restored = import_backup(&storage, &document.to_string()).unwrap();
        assert_eq!(restored, 0);
    }
}
