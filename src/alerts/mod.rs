//! Alert delivery: the platform that shows desktop alerts and the navigator
//! that reacts when one is clicked.
//!
//! - **DesktopPlatform**: native notifications via notify-rust
//! - **BrowserNavigator**: opens the ScrumFlow web client on the referenced project
//!
//! The sync engine only talks to the traits, so tests swap in recording fakes.

pub mod desktop;
pub mod live;
pub mod navigation;

use std::time::Duration;

use serde::Serialize;

use crate::error::Result;

pub use desktop::DesktopPlatform;
pub use navigation::{BrowserNavigator, Navigator};

/// Whether the platform lets us show alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Authorization {
    Granted,
    Denied,
    /// The user hasn't decided yet.
    Pending,
}

impl std::fmt::Display for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authorization::Granted => write!(f, "granted"),
            Authorization::Denied => write!(f, "denied"),
            Authorization::Pending => write!(f, "pending"),
        }
    }
}

/// Callback run when the user activates (clicks) an alert.
pub type ActivationHandler = Box<dyn FnOnce() + Send + 'static>;

/// A single alert to show.
pub struct Alert {
    pub title: String,
    pub body: String,
    /// Dedup tag. Platforms that honour tags replace rather than duplicate.
    pub tag: String,
    /// How long the alert stays visible.
    pub timeout: Duration,
    pub on_activate: Option<ActivationHandler>,
}

impl std::fmt::Debug for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alert")
            .field("title", &self.title)
            .field("body", &self.body)
            .field("tag", &self.tag)
            .field("timeout", &self.timeout)
            .field("on_activate", &self.on_activate.is_some())
            .finish()
    }
}

/// The hosting platform's alerting facility.
pub trait AlertPlatform: Send + Sync {
    /// Whether the platform can show alerts at all.
    fn is_supported(&self) -> bool;

    /// Last known authorization state. Never prompts.
    fn authorization_state(&self) -> Authorization;

    /// Ask for permission. Only meaningful while `Pending`; afterwards returns
    /// the settled state without prompting again.
    fn request_authorization(&self) -> Authorization;

    /// Show an alert.
    fn show(&self, alert: Alert) -> Result<()>;

    /// Take down the alert carrying `tag`, if it is still up.
    fn dismiss(&self, tag: &str);

    /// Take down every alert still up. Called once when the engine stops.
    fn shutdown(&self) {}
}
