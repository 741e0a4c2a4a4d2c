use crate::traits::KeyValueStore;
use crate::{ResultSet, ReviewError};
use tracing::{debug, warn};

pub const RESULT_KEY_PREFIX: &str = "parse_result_";

pub fn cache_key(result_id: u64) -> String {
    format!("{RESULT_KEY_PREFIX}{result_id}")
}

pub struct ResultCache<S> {
    store: S,
}

impl<S: KeyValueStore> ResultCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn try_get(&self, result_id: u64) -> Result<Option<ResultSet>, ReviewError> {
        let key = cache_key(result_id);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|error| ReviewError::MalformedCache {
                key,
                details: error.to_string(),
            })
    }

    pub fn get(&self, result_id: u64) -> Option<ResultSet> {
        match self.try_get(result_id) {
            Ok(entry) => entry,
            Err(error) => {
                warn!(result_id, %error, "ignoring unreadable cache entry");
                None
            }
        }
    }

    pub fn try_put(&self, result_id: u64, result: &ResultSet) -> Result<(), ReviewError> {
        let payload = serde_json::to_string(result)?;
        self.store.set(&cache_key(result_id), &payload)?;
        debug!(result_id, records = result.records.len(), "cached result");
        Ok(())
    }

    pub fn put(&self, result_id: u64, result: &ResultSet) {
        if let Err(error) = self.try_put(result_id, result) {
            warn!(result_id, %error, "failed to cache result");
        }
    }

    pub fn evict(&self, result_id: u64) {
        if let Err(error) = self.store.delete(&cache_key(result_id)) {
            warn!(result_id, %error, "failed to evict cached result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{record, result_set};
    use crate::stores::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn put_then_get_returns_same_result() {
        let cache = ResultCache::new(MemoryStore::new());
        let result = result_set("old.pdf", vec![record("roof", 1, None)]);

        cache.put(42, &result);
        assert_eq!(cache.get(42), Some(result));
        assert!(cache.store().get("parse_result_42").ok().flatten().is_some());
    }

    #[test]
    fn malformed_entry_is_a_miss() -> Result<(), Box<dyn std::error::Error>> {
        let cache = ResultCache::new(MemoryStore::new());
        cache.store().set(&cache_key(5), "{not json")?;

        assert_eq!(cache.get(5), None);
        assert!(matches!(
            cache.try_get(5),
            Err(ReviewError::MalformedCache { ref key, .. }) if key == "parse_result_5"
        ));
        Ok(())
    }

    #[test]
    fn summary_shaped_entry_is_not_a_result() -> Result<(), Box<dyn std::error::Error>> {
        let cache = ResultCache::new(MemoryStore::new());
        cache.store().set(
            &cache_key(8),
            r#"{"id":8,"filename":"a.pdf","created_at":"2024-01-01T00:00:00","total_matches":1,"matched_pages":1,"num_pages":1,"parse_time_ms":3}"#,
        )?;
        assert_eq!(cache.get(8), None);
        Ok(())
    }

    #[test]
    fn evict_removes_entry() {
        let cache = ResultCache::new(MemoryStore::new());
        cache.put(3, &result_set("a.pdf", Vec::new()));
        cache.evict(3);
        assert_eq!(cache.get(3), None);
        assert!(cache.store().is_empty());
    }
}
