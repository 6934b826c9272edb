use std::sync::Arc;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::StorageConfig;

pub mod memory;
pub mod sqlite;

// ── Keys ────────────────────────────────────────────────────────────

pub const POSTS_KEY: &str = "blogs";
pub const CONTACTS_KEY: &str = "contacts";
pub const THEME_KEY: &str = "darkMode";

/// Comments live under one key per post: `comments_<post_id>`.
pub fn comments_key(post_id: i64) -> String {
    format!("comments_{}", post_id)
}

fn seq_key(collection_key: &str) -> String {
    format!("{}:seq", collection_key)
}

/// Key/value access to the persistent store.
/// Implementations: `SqliteStorage` (rusqlite/r2d2) and `MemoryStorage`.
///
/// Each call is independent; there are no transactions. Values are JSON text.
pub trait Storage: Send + Sync {
    // ── Backend primitives ──────────────────────────────────────────
    fn get_raw(&self, key: &str) -> Option<String>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;

    // ── JSON layer ──────────────────────────────────────────────────

    /// Malformed JSON is treated as absent.
    fn get(&self, key: &str) -> Option<Value> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring malformed value under '{}': {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), String> {
        let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
        self.set_raw(key, &raw)
    }

    fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s == "true" || s == "1",
            _ => false,
        }
    }

    /// Allocate the next identifier for a collection from a persisted counter.
    /// A missing counter resumes after the highest `id` already stored.
    fn next_id(&self, collection_key: &str) -> Result<i64, String> {
        let key = seq_key(collection_key);
        let last = match self.get(&key).and_then(|v| v.as_i64()) {
            Some(n) => n,
            None => max_stored_id(self.get(collection_key).as_ref()),
        };
        let next = last + 1;
        self.set(&key, &Value::from(next))?;
        Ok(next)
    }
}

/// Create the configured storage backend, running migrations where needed.
pub fn open(config: &StorageConfig) -> Result<Arc<dyn Storage>, String> {
    match config.backend.as_str() {
        "memory" => {
            let storage = match config.quota_bytes {
                Some(q) => memory::MemoryStorage::with_quota(q),
                None => memory::MemoryStorage::new(),
            };
            Ok(Arc::new(storage) as Arc<dyn Storage>)
        }
        "sqlite" => {
            let storage = sqlite::SqliteStorage::new_at(&config.path)?;
            storage.run_migrations()?;
            Ok(Arc::new(storage) as Arc<dyn Storage>)
        }
        other => Err(format!("Unknown storage backend: {}", other)),
    }
}

fn max_stored_id(collection: Option<&Value>) -> i64 {
    collection
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id").and_then(|id| id.as_i64()))
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0)
}

/// Read and deserialize a typed value. Shape mismatches count as absent.
pub fn load<T: DeserializeOwned>(store: &dyn Storage, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Stored value under '{}' has unexpected shape: {}", key, e);
            None
        }
    }
}

pub fn save<T: Serialize + ?Sized>(store: &dyn Storage, key: &str, value: &T) -> Result<(), String> {
    let value = serde_json::to_value(value).map_err(|e| e.to_string())?;
    store.set(key, &value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStorage;
    use crate::store::sqlite::SqliteStorage;
    use serde_json::json;

    /// Create a fresh in-memory SqliteStorage with migrations applied.
    fn test_store() -> SqliteStorage {
        let manager = r2d2_sqlite::SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("Failed to create in-memory pool");
        let store = SqliteStorage::new(pool);
        store.run_migrations().expect("migrations failed");
        store
    }

    // ── Raw access ──────────────────────────────────────────────────

    #[test]
    fn test_get_set_roundtrip() {
        let s = test_store();
        assert!(s.get("missing").is_none());
        s.set("k", &json!({"a": 1})).unwrap();
        assert_eq!(s.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_set_overwrites() {
        let s = test_store();
        s.set("k", &json!(1)).unwrap();
        s.set("k", &json!(2)).unwrap();
        assert_eq!(s.get("k"), Some(json!(2)));
    }

    #[test]
    fn test_malformed_json_is_absent() {
        let s = test_store();
        s.set_raw("broken", "{not json").unwrap();
        assert!(s.get("broken").is_none());
    }

    #[test]
    fn test_remove() {
        let s = test_store();
        s.set("k", &json!("v")).unwrap();
        s.remove("k").unwrap();
        assert!(s.get_raw("k").is_none());
    }

    #[test]
    fn test_get_bool() {
        let s = MemoryStorage::new();
        s.set("flag_bool", &json!(true)).unwrap();
        s.set("flag_str", &json!("true")).unwrap();
        s.set("flag_off", &json!("false")).unwrap();
        assert!(s.get_bool("flag_bool"));
        assert!(s.get_bool("flag_str"));
        assert!(!s.get_bool("flag_off"));
        assert!(!s.get_bool("missing"));
    }

    // ── Typed helpers ───────────────────────────────────────────────

    #[test]
    fn test_load_wrong_shape_is_absent() {
        let s = MemoryStorage::new();
        s.set("nums", &json!({"not": "a list"})).unwrap();
        let loaded: Option<Vec<i64>> = load(&s, "nums");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let s = MemoryStorage::new();
        save(&s, "nums", &vec![1, 2, 3]).unwrap();
        let loaded: Option<Vec<i64>> = load(&s, "nums");
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    // ── Id counters ─────────────────────────────────────────────────

    #[test]
    fn test_next_id_starts_at_one() {
        let s = test_store();
        assert_eq!(s.next_id("contacts").unwrap(), 1);
        assert_eq!(s.next_id("contacts").unwrap(), 2);
    }

    #[test]
    fn test_next_id_resumes_after_existing_items() {
        let s = MemoryStorage::new();
        s.set("comments_3", &json!([{"id": 1}, {"id": 7}])).unwrap();
        assert_eq!(s.next_id("comments_3").unwrap(), 8);
    }

    #[test]
    fn test_next_id_counters_are_per_collection() {
        let s = MemoryStorage::new();
        s.next_id("comments_1").unwrap();
        s.next_id("comments_1").unwrap();
        assert_eq!(s.next_id("comments_2").unwrap(), 1);
    }

    #[test]
    fn test_open_backends() {
        let cfg = StorageConfig {
            backend: "memory".into(),
            ..StorageConfig::default()
        };
        let s = open(&cfg).unwrap();
        s.set("k", &json!(1)).unwrap();
        assert_eq!(s.get("k"), Some(json!(1)));

        let cfg = StorageConfig {
            backend: "redis".into(),
            ..StorageConfig::default()
        };
        assert!(open(&cfg).is_err());
    }

    #[test]
    fn test_comments_key_format() {
        assert_eq!(comments_key(42), "comments_42");
    }
}
