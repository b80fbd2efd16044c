//! Registry of alerts still on screen, keyed by tag.
//!
//! Each entry carries a closer that takes the alert down. Closing an alert is
//! also what releases anything waiting on it (the freedesktop click-action wait
//! only returns once the server reports the notification closed).

use std::collections::HashMap;
use std::sync::Mutex;

/// Takes one alert off screen.
pub type Closer = Box<dyn FnOnce() + Send + 'static>;

struct LiveAlert {
    server_id: u32,
    close: Closer,
}

#[derive(Default)]
pub struct LiveAlerts {
    entries: Mutex<HashMap<String, LiveAlert>>,
}

impl LiveAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an alert. A previous entry for the same tag is replaced without
    /// being closed: the server reuses its id for the new alert.
    pub fn insert(&self, tag: &str, server_id: u32, close: Closer) {
        self.lock()
            .insert(tag.to_string(), LiveAlert { server_id, close });
    }

    /// Server id of the alert currently shown for `tag`.
    pub fn server_id(&self, tag: &str) -> Option<u32> {
        self.lock().get(tag).map(|a| a.server_id)
    }

    /// Drop the entry without closing, if it still refers to `server_id`.
    /// Used once the server reports the alert gone on its own.
    pub fn forget(&self, tag: &str, server_id: u32) {
        let mut entries = self.lock();
        if entries.get(tag).is_some_and(|a| a.server_id == server_id) {
            entries.remove(tag);
        }
    }

    /// Close the alert for `tag`. Returns false if it was not on screen.
    pub fn close(&self, tag: &str) -> bool {
        // Run the closer outside the lock: it may talk to D-Bus.
        let entry = self.lock().remove(tag);
        match entry {
            Some(alert) => {
                (alert.close)();
                true
            }
            None => false,
        }
    }

    /// Close every alert still on screen. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let entries: Vec<LiveAlert> = self.lock().drain().map(|(_, a)| a).collect();
        let count = entries.len();
        for alert in entries {
            (alert.close)();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, LiveAlert>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
