//! Native desktop alerts via notify-rust.
//!
//! - Linux/BSD: freedesktop D-Bus notifications (tag replacement, click actions)
//! - macOS: NSUserNotificationCenter
//! - Windows: WinRT toast notifications
//!
//! Native apps are not gated behind a browser-style permission prompt, so a
//! `Pending` platform settles on `Granted` the first time it is asked. The user
//! opts out through `Settings::desktop_alerts`, which maps to `Denied`.

use std::sync::{Arc, Mutex};

use notify_rust::{Notification, Timeout};

use crate::alerts::live::LiveAlerts;
use crate::alerts::{Alert, AlertPlatform, Authorization};
use crate::error::{NotifyError, Result};

const APP_NAME: &str = "ScrumFlow";

pub struct DesktopPlatform {
    supported: bool,
    authorization: Mutex<Authorization>,
    /// Alerts still on screen, shared with the click-action wait threads.
    live: Arc<LiveAlerts>,
}

impl DesktopPlatform {
    pub fn new(supported: bool, enabled: bool) -> Self {
        let initial = if enabled {
            Authorization::Pending
        } else {
            Authorization::Denied
        };
        Self {
            supported,
            authorization: Mutex::new(initial),
            live: Arc::new(LiveAlerts::new()),
        }
    }

    /// Check the running session for a notification service.
    pub fn detect(enabled: bool) -> Self {
        Self::new(detect_support(), enabled)
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn deliver(&self, alert: Alert) -> Result<()> {
        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary(&alert.title)
            .body(&alert.body)
            .timeout(timeout_of(&alert));

        if let Some(id) = self.live.server_id(&alert.tag) {
            notification.id(id);
        }
        if alert.on_activate.is_some() {
            notification.action("default", "Open project");
        }

        let handle = notification
            .show()
            .map_err(|e| NotifyError::Alert(e.to_string()))?;
        let server_id = handle.id();

        match alert.on_activate {
            None => {
                self.live
                    .insert(&alert.tag, server_id, Box::new(move || handle.close()));
            }
            Some(on_activate) => {
                // The wait thread owns the handle, so closing goes by server id.
                self.live
                    .insert(&alert.tag, server_id, Box::new(move || close_by_id(server_id)));

                let live = Arc::clone(&self.live);
                let tag = alert.tag;
                std::thread::spawn(move || {
                    // Returns on click, or once the alert is closed by the
                    // server, by `dismiss` or by `shutdown`.
                    handle.wait_for_action(|action| {
                        if action == "default" {
                            on_activate();
                        }
                    });
                    live.forget(&tag, server_id);
                });
            }
        }
        Ok(())
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn deliver(&self, alert: Alert) -> Result<()> {
        Notification::new()
            .appname(APP_NAME)
            .summary(&alert.title)
            .body(&alert.body)
            .timeout(timeout_of(&alert))
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Alert(e.to_string()))
    }
}

impl AlertPlatform for DesktopPlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn authorization_state(&self) -> Authorization {
        *self.authorization.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn request_authorization(&self) -> Authorization {
        let mut state = self.authorization.lock().unwrap_or_else(|e| e.into_inner());
        if *state == Authorization::Pending && self.supported {
            *state = Authorization::Granted;
            tracing::info!("Desktop alerts authorized");
        }
        *state
    }

    fn show(&self, alert: Alert) -> Result<()> {
        if !self.supported {
            return Err(NotifyError::Alert(
                "Desktop notifications are not supported in this session".into(),
            ));
        }
        self.deliver(alert)
    }

    fn dismiss(&self, tag: &str) {
        // Some servers (GNOME Shell) ignore the expire timeout, so close explicitly.
        if self.live.close(tag) {
            tracing::debug!("Dismissed alert {}", tag);
        }
    }

    fn shutdown(&self) {
        let closed = self.live.close_all();
        if closed > 0 {
            tracing::info!("Closed {} alerts still on screen", closed);
        }
    }
}

fn timeout_of(alert: &Alert) -> Timeout {
    let ms = u32::try_from(alert.timeout.as_millis()).unwrap_or(u32::MAX);
    Timeout::Milliseconds(ms)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn close_by_id(server_id: u32) {
    match Notification::new().appname(APP_NAME).id(server_id).show() {
        Ok(handle) => handle.close(),
        Err(e) => tracing::debug!("Failed to close notification {}: {}", server_id, e),
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn detect_support() -> bool {
    match notify_rust::get_server_information() {
        Ok(info) => {
            tracing::info!("Notification server: {} {}", info.name, info.version);
            true
        }
        Err(e) => {
            tracing::warn!("No desktop notification server available: {}", e);
            false
        }
    }
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn detect_support() -> bool {
    true
}

#[cfg(not(any(unix, target_os = "windows")))]
fn detect_support() -> bool {
    false
}
