// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Blog client settings (API endpoint, timeouts, notice limits) and the port
//! UI layers use to read them.

use crate::config::{ConfigError, ConfigService, ConfigStore};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key the blog settings are stored under.
pub const SETTINGS_KEY: &str = "blog";

/// Saved settings for a blog client surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogSettings {
    /// Base URL of the blog API.
    pub api_url: String,
    /// Display name of the application.
    pub app_name: String,
    /// Upper bound for a single like confirmation round trip, in milliseconds.
    pub confirm_timeout_ms: u64,
    /// How long a notice stays visible, in milliseconds.
    pub notice_ttl_ms: u64,
    /// Maximum number of notices kept at once.
    pub notice_capacity: usize,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            app_name: "FSD Blog".to_string(),
            confirm_timeout_ms: 10_000,
            notice_ttl_ms: 4_000,
            notice_capacity: 5,
        }
    }
}

impl BlogSettings {
    /// Confirmation timeout as a [`Duration`].
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    /// Notice time-to-live as a [`Duration`].
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

/// Settings-facing port for UI layers.
pub trait SettingsPort {
    /// Load blog settings (returns None if missing or unreadable).
    fn load_settings(&self) -> Option<BlogSettings>;
    /// Persist blog settings.
    fn save_settings(&self, settings: &BlogSettings) -> Result<(), ConfigError>;
}

impl<S> SettingsPort for ConfigService<S>
where
    S: ConfigStore,
{
    fn load_settings(&self) -> Option<BlogSettings> {
        self.load(SETTINGS_KEY).ok().flatten()
    }

    fn save_settings(&self, settings: &BlogSettings) -> Result<(), ConfigError> {
        self.save(SETTINGS_KEY, settings)
    }
}
