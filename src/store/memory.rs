use std::collections::HashMap;
use std::sync::Mutex;

use super::Storage;

/// Process-local storage. An optional byte quota reproduces the
/// "storage full" failure of browser local storage.
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            entries: Mutex::new(HashMap::new()),
            quota: None,
        }
    }

    pub fn with_quota(bytes: usize) -> Self {
        MemoryStorage {
            entries: Mutex::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    fn used_bytes(map: &HashMap<String, String>) -> usize {
        map.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        let map = self.entries.lock().ok()?;
        map.get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), String> {
        let mut map = self.entries.lock().map_err(|e| e.to_string())?;
        if let Some(quota) = self.quota {
            let current = map.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let after = Self::used_bytes(&map) - current + key.len() + value.len();
            if after > quota {
                return Err(format!(
                    "Storage quota exceeded ({} of {} bytes)",
                    after, quota
                ));
            }
        }
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let mut map = self.entries.lock().map_err(|e| e.to_string())?;
        map.remove(key);
        Ok(())
    }
}
