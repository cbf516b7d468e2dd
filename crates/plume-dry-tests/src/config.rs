// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory settings store fake for testing without filesystem I/O.

use plume_app_core::config::{ConfigError, ConfigStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory implementation of [`ConfigStore`].
///
/// Clones share storage, counters and failure switches, so a test can keep
/// one handle while the service under test owns another.
///
/// # Example
///
/// ```
/// use plume_dry_tests::InMemoryConfigStore;
/// use plume_app_core::config::ConfigService;
/// use plume_app_core::settings::{BlogSettings, SettingsPort};
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
///
/// service.save_settings(&BlogSettings::default()).unwrap();
/// assert!(store.contains_key("blog"));
/// assert_eq!(store.save_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    data: HashMap<String, Vec<u8>>,
    load_count: usize,
    save_count: usize,
    fail_on_load: bool,
    fail_on_save: bool,
}

impl InMemoryConfigStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one raw blob.
    pub fn with_blob(key: &str, data: &[u8]) -> Self {
        let store = Self::new();
        store.lock().data.insert(key.to_string(), data.to_vec());
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent `load_raw` fail with [`ConfigError::Unavailable`].
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_on_load = fail;
    }

    /// Make every subsequent `save_raw` fail with [`ConfigError::Unavailable`].
    pub fn set_fail_on_save(&self, fail: bool) {
        self.lock().fail_on_save = fail;
    }

    /// Number of `load_raw` attempts, including failed ones.
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    /// Number of `save_raw` attempts, including failed ones.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Check if a key exists in the store.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().data.contains_key(key)
    }

    /// Raw blob stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().data.get(key).cloned()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.load_count += 1;
        if inner.fail_on_load {
            return Err(ConfigError::Unavailable("simulated load failure".into()));
        }
        inner.data.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.save_count += 1;
        if inner.fail_on_save {
            return Err(ConfigError::Unavailable("simulated save failure".into()));
        }
        inner.data.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_app_core::config::ConfigService;
    use plume_app_core::settings::{BlogSettings, SettingsPort};

    #[test]
    fn load_or_init_writes_defaults_only_when_missing() {
        let store = InMemoryConfigStore::new();
        let service = ConfigService::new(store.clone());
        let settings: BlogSettings = service.load_or_init("blog").unwrap();
        assert_eq!(settings, BlogSettings::default());
        assert_eq!(store.save_count(), 1);

        let _: BlogSettings = service.load_or_init("blog").unwrap();
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn load_failure_is_not_mistaken_for_missing() {
        let store = InMemoryConfigStore::new();
        store.set_fail_on_load(true);
        let service = ConfigService::new(store.clone());
        let err = service.load_or_init::<BlogSettings>("blog").unwrap_err();
        assert!(matches!(err, ConfigError::Unavailable(_)));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn settings_port_round_trips_through_json() {
        let blob = serde_json::to_vec(&serde_json::json!({ "app_name": "Dev Blog" })).unwrap();
        let store = InMemoryConfigStore::with_blob("blog", &blob);
        let service = ConfigService::new(store);
        let loaded = service.load_settings().unwrap();
        assert_eq!(loaded.app_name, "Dev Blog");
        assert_eq!(loaded.api_url, BlogSettings::default().api_url);
    }

    #[test]
    fn failed_save_stores_nothing_but_counts() {
        let store = InMemoryConfigStore::new();
        store.set_fail_on_save(true);
        assert!(store.save_raw("blog", b"{}").is_err());
        assert!(!store.contains_key("blog"));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn clones_share_state() {
        let a = InMemoryConfigStore::new();
        let b = a.clone();
        a.save_raw("k", b"v").unwrap();
        assert_eq!(b.raw("k").as_deref(), Some(&b"v"[..]));
        b.set_fail_on_load(true);
        assert!(a.load_raw("k").is_err());
    }
}
