//! File-backed fallback cache of `{order id → payment status}` hints.
//!
//! The action-link handlers write here after a successful decision; the
//! customer order-list read drains matching entries. The file is a plain JSON
//! object so it stays inspectable. Every failure path degrades to "no hints":
//! an unavailable or corrupt file must never break an order operation.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use log::warn;

use crate::domain::order::PaymentStatus;
use crate::domain::ports::StatusCache;

pub struct FileStatusCache {
    path: PathBuf,
    // Serializes load-modify-store cycles within this process.
    lock: Mutex<()>,
}

impl FileStatusCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> HashMap<String, PaymentStatus> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!("status cache {} is unreadable: {e}", self.path.display());
                return HashMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!("status cache {} is corrupt: {e}", self.path.display());
                HashMap::new()
            }
        }
    }

    fn store(&self, entries: &HashMap<String, PaymentStatus>) -> bool {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("could not serialize status cache: {e}");
                return false;
            }
        };
        if let Err(e) = fs::write(&self.path, raw) {
            warn!("could not write status cache {}: {e}", self.path.display());
            return false;
        }
        true
    }
}

impl StatusCache for FileStatusCache {
    fn record(&self, order_id: &str, status: PaymentStatus) -> bool {
        let _guard = self.lock.lock().expect("status cache lock poisoned");
        let mut entries = self.load();
        entries.insert(order_id.to_string(), status);
        self.store(&entries)
    }

    fn drain(&self, order_ids: &[String]) -> HashMap<String, PaymentStatus> {
        let _guard = self.lock.lock().expect("status cache lock poisoned");
        let mut entries = self.load();
        if entries.is_empty() {
            return HashMap::new();
        }

        let mut drained = HashMap::new();
        for id in order_ids {
            if let Some(status) = entries.remove(id) {
                drained.insert(id.clone(), status);
            }
        }
        if !drained.is_empty() && !self.store(&entries) {
            // The hints were handed out but could not be evicted; better to
            // re-apply a hint later than to lose it.
            warn!("status cache eviction failed; hints may be re-applied");
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_in(dir: &tempfile::TempDir) -> FileStatusCache {
        FileStatusCache::new(dir.path().join("order_status_updates.json"))
    }

    #[test]
    fn record_then_drain_consumes_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);

        assert!(cache.record("order-1", PaymentStatus::Completed));
        let drained = cache.drain(&["order-1".to_string()]);
        assert_eq!(drained.get("order-1"), Some(&PaymentStatus::Completed));

        // Self-cleaning: the second pass finds nothing.
        assert!(cache.drain(&["order-1".to_string()]).is_empty());
    }

    #[test]
    fn drain_only_touches_requested_ids() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache.record("order-1", PaymentStatus::Completed);
        cache.record("order-2", PaymentStatus::Rejected);

        let drained = cache.drain(&["order-1".to_string()]);
        assert_eq!(drained.len(), 1);

        let rest = cache.drain(&["order-2".to_string()]);
        assert_eq!(rest.get("order-2"), Some(&PaymentStatus::Rejected));
    }

    #[test]
    fn drain_of_unknown_ids_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        assert!(cache.drain(&["missing".to_string()]).is_empty());
    }

    #[test]
    fn unavailable_medium_degrades_silently() {
        // A path whose parent does not exist cannot be written.
        let cache = FileStatusCache::new(PathBuf::from(
            "/nonexistent-dir-for-sure/order_status_updates.json",
        ));
        assert!(!cache.record("order-1", PaymentStatus::Completed));
        assert!(cache.drain(&["order-1".to_string()]).is_empty());
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_status_updates.json");
        fs::write(&path, "{not json").unwrap();
        let cache = FileStatusCache::new(path);

        assert!(cache.drain(&["order-1".to_string()]).is_empty());
        // Recording afterwards repairs the file.
        assert!(cache.record("order-1", PaymentStatus::Rejected));
        let drained = cache.drain(&["order-1".to_string()]);
        assert_eq!(drained.get("order-1"), Some(&PaymentStatus::Rejected));
    }

    #[test]
    fn file_format_matches_the_legacy_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_status_updates.json");
        let cache = FileStatusCache::new(path.clone());
        cache.record("7f1e8a9c-0000-0000-0000-000000000000", PaymentStatus::Completed);

        let raw = fs::read_to_string(path).unwrap();
        assert_eq!(
            raw,
            r#"{"7f1e8a9c-0000-0000-0000-000000000000":"completed"}"#
        );
    }
}
