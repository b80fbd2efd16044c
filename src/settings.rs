//! Persistent daemon settings.
//!
//! Settings are stored as JSON in the platform config directory and survive restarts.
//! Every field has a default so a partial file is still valid.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Daemon settings persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the ScrumFlow REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL of the ScrumFlow web client, used when an alert is clicked.
    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,
    /// Bearer token for the authenticated user, if the API requires one.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Seconds between two polls of the notification feed.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// How long an alert stays on screen before it is dismissed.
    #[serde(default = "default_alert_timeout_ms")]
    pub alert_timeout_ms: u64,
    /// Master switch for desktop alerts. When false the platform reports `Denied`.
    #[serde(default = "default_desktop_alerts")]
    pub desktop_alerts: bool,
    /// Notification categories that never raise an alert (e.g. "reminder").
    #[serde(default)]
    pub muted_categories: Vec<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_app_base_url() -> String {
    "http://localhost:5173".into()
}
fn default_poll_interval_secs() -> u64 {
    15
}
fn default_alert_timeout_ms() -> u64 {
    5000
}
fn default_desktop_alerts() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            app_base_url: default_app_base_url(),
            auth_token: None,
            poll_interval_secs: default_poll_interval_secs(),
            alert_timeout_ms: default_alert_timeout_ms(),
            desktop_alerts: default_desktop_alerts(),
            muted_categories: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Returns defaults if file doesn't exist.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse settings file: {} — using defaults", e);
                Self::default()
            }),
            Err(_) => {
                tracing::info!("No settings file found at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file.
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Poll interval, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_millis(self.alert_timeout_ms)
    }
}
