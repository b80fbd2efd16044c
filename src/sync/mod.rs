//! Notification sync engine: polls the feed and raises at-most-once desktop alerts.
//!
//! Each poll cycle:
//! 1. Fetch the feed (a failure skips the cycle and leaves all bookkeeping untouched)
//! 2. Diff it against the delivery tracker
//! 3. Alert every fresh record, newest first, each with an auto-dismiss timer
//! 4. Remember the feed's ids for the next cycle
//!
//! Cycles never overlap: the tracker lock is held for the whole cycle, fetch
//! included, and a `poll()` that finds it taken returns without doing anything.
//! `stop()` cancels the loop, any in-flight fetch and all pending dismiss timers,
//! then asks the platform to take down whatever is still on screen.

pub mod tracker;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::alerts::{ActivationHandler, Alert, AlertPlatform, Authorization, Navigator};
use crate::feed::{FeedSource, NotificationRecord};
use crate::settings::Settings;

pub use tracker::DeliveryTracker;

/// Engine tuning, usually derived from `Settings`.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub poll_interval: Duration,
    pub alert_timeout: Duration,
    /// Categories that are marked seen without raising an alert.
    pub muted_categories: HashSet<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            alert_timeout: Duration::from_secs(5),
            muted_categories: HashSet::new(),
        }
    }
}

impl From<&Settings> for SyncOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            alert_timeout: settings.alert_timeout(),
            muted_categories: settings.muted_categories.iter().cloned().collect(),
        }
    }
}

/// Engine status for logs and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub running: bool,
    pub supported: bool,
    pub authorization: Authorization,
    /// Alerts actually shown this session.
    pub alerted_count: usize,
    /// Ids alerted, silenced or lost to a failed show.
    pub seen_count: usize,
    /// Ids in the last successful poll.
    pub tracked_count: usize,
    pub unread_count: Option<usize>,
    pub last_poll_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct PollState {
    running: bool,
    alerted_count: usize,
    seen_count: usize,
    tracked_count: usize,
    unread_count: Option<usize>,
    last_poll_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Long-lived engine owning the delivery bookkeeping for one session.
pub struct NotificationSyncEngine<F> {
    source: F,
    platform: Arc<dyn AlertPlatform>,
    navigator: Arc<dyn Navigator>,
    options: SyncOptions,
    tracker: tokio::sync::Mutex<DeliveryTracker>,
    state: Mutex<PollState>,
    cancel: CancellationToken,
}

impl<F: FeedSource + 'static> NotificationSyncEngine<F> {
    pub fn new(
        source: F,
        platform: Arc<dyn AlertPlatform>,
        navigator: Arc<dyn Navigator>,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            platform,
            navigator,
            options,
            tracker: tokio::sync::Mutex::new(DeliveryTracker::new()),
            state: Mutex::new(PollState::default()),
            cancel: CancellationToken::new(),
        }
    }

    /// Spawn the recurring poll loop. The first poll runs immediately.
    ///
    /// Returns `None` if the loop is already running or the engine was stopped.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.cancel.is_cancelled() {
            tracing::warn!("Sync engine already stopped, not starting");
            return None;
        }
        {
            let mut state = self.lock_state();
            if state.running {
                tracing::debug!("Sync engine already running");
                return None;
            }
            state.running = true;
        }

        tracing::info!(
            "Starting notification sync (every {}s)",
            self.options.poll_interval.as_secs()
        );
        let engine = Arc::clone(self);
        Some(tokio::spawn(async move { engine.run().await }))
    }

    async fn run(&self) {
        let mut ticker = tokio::time::interval(self.options.poll_interval);
        // A slow fetch drops the ticks it outlasted instead of bunching them up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll().await;
                }
            }
        }

        self.lock_state().running = false;
        tracing::info!("Notification sync stopped");
    }

    /// Run one poll cycle. Returns the ids alerted during this cycle.
    pub async fn poll(&self) -> Vec<String> {
        if self.cancel.is_cancelled() {
            return Vec::new();
        }
        let Ok(mut tracker) = self.tracker.try_lock() else {
            tracing::debug!("Previous poll still in flight, skipping");
            return Vec::new();
        };

        let fetched = tokio::select! {
            _ = self.cancel.cancelled() => return Vec::new(),
            result = self.source.fetch() => result,
        };
        let feed = match fetched {
            Ok(feed) => feed,
            Err(e) => {
                tracing::warn!("Notification poll failed: {} — retrying next cycle", e);
                self.lock_state().last_error = Some(e.to_string());
                return Vec::new();
            }
        };

        let mut alerted = Vec::new();
        if self.can_alert() {
            let fresh: Vec<NotificationRecord> = tracker
                .fresh(&feed.notifications)
                .into_iter()
                .cloned()
                .collect();

            for record in fresh {
                if self.cancel.is_cancelled() {
                    break;
                }
                // Marked before showing: a failed show is a missed alert, never a repeat.
                tracker.mark_seen(&record.id);

                if self.options.muted_categories.contains(&record.category) {
                    tracing::debug!("Muted {} notification {}", record.category, record.id);
                    continue;
                }

                match self.platform.show(self.alert_for(&record)) {
                    Ok(()) => {
                        tracing::info!("Alerted notification {}: {}", record.id, record.title);
                        if self.cancel.is_cancelled() {
                            // stop() ran while this alert was going up; its shutdown missed it.
                            self.platform.dismiss(&record.id);
                        }
                        self.schedule_dismiss(record.id.clone());
                        alerted.push(record.id);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to show alert for {}: {}", record.id, e);
                    }
                }
            }
        }
        tracker.finish_cycle(&feed.notifications);

        let mut state = self.lock_state();
        state.alerted_count += alerted.len();
        state.seen_count = tracker.seen_count();
        state.tracked_count = tracker.previous_count();
        state.unread_count = Some(feed.unread());
        state.last_poll_at = Some(Utc::now());
        state.last_error = None;

        alerted
    }

    /// Ask the platform for permission to alert.
    ///
    /// Prompts at most once: after the platform settles on granted or denied the
    /// settled state is returned as is.
    pub fn request_authorization(&self) -> Authorization {
        match self.platform.authorization_state() {
            Authorization::Pending if self.platform.is_supported() => {
                let state = self.platform.request_authorization();
                tracing::info!("Desktop alert authorization: {}", state);
                state
            }
            settled => settled,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.platform.authorization_state() == Authorization::Granted
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    /// Stop polling, cancel pending dismiss timers and close alerts still on
    /// screen. Safe to call repeatedly.
    pub fn stop(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        tracing::info!("Stopping notification sync");
        self.cancel.cancel();
        self.platform.shutdown();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn status(&self) -> SyncStatus {
        let state = self.lock_state();
        SyncStatus {
            running: state.running,
            alerted_count: state.alerted_count,
            supported: self.platform.is_supported(),
            authorization: self.platform.authorization_state(),
            seen_count: state.seen_count,
            tracked_count: state.tracked_count,
            unread_count: state.unread_count,
            last_poll_at: state.last_poll_at,
            last_error: state.last_error.clone(),
        }
    }

    fn can_alert(&self) -> bool {
        self.is_supported() && self.is_authorized()
    }

    fn alert_for(&self, record: &NotificationRecord) -> Alert {
        let on_activate = record.project_id().map(|project_id| {
            let navigator = Arc::clone(&self.navigator);
            let project_id = project_id.to_string();
            Box::new(move || {
                if let Err(e) = navigator.open_project(&project_id) {
                    tracing::warn!("Failed to open project {}: {}", project_id, e);
                }
            }) as ActivationHandler
        });

        Alert {
            title: record.title.clone(),
            body: record.message.clone(),
            tag: record.id.clone(),
            timeout: self.options.alert_timeout,
            on_activate,
        }
    }

    fn schedule_dismiss(&self, tag: String) {
        let platform = Arc::clone(&self.platform);
        let cancel = self.cancel.clone();
        let timeout = self.options.alert_timeout;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(timeout) => platform.dismiss(&tag),
            }
        });
    }

    fn lock_state(&self) -> MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
