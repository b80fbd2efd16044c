//! Delivery bookkeeping for the sync engine.
//!
//! Two sets decide whether a record is new:
//! - `seen`: every id ever alerted (or silenced). Grows for the tracker's lifetime.
//! - `previous`: ids present in the last successful poll. Replaced each cycle.
//!
//! A record is fresh when it is in neither set. The first cycle only records a
//! baseline: ids already in the feed at startup never alert, even if they drop
//! out and come back later.

use std::collections::HashSet;

use crate::feed::NotificationRecord;

#[derive(Debug, Default)]
pub struct DeliveryTracker {
    seen: HashSet<String>,
    previous: HashSet<String>,
    /// Ids of the first cycle. `None` until that cycle finishes.
    baseline: Option<HashSet<String>>,
}

impl DeliveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records to alert for this feed, newest first.
    ///
    /// Does not mutate anything: call `mark_seen` per delivered record and
    /// `finish_cycle` once the cycle is over.
    pub fn fresh<'a>(&self, feed: &'a [NotificationRecord]) -> Vec<&'a NotificationRecord> {
        let Some(baseline) = &self.baseline else {
            return Vec::new();
        };

        let mut in_batch = HashSet::new();
        let mut fresh: Vec<&NotificationRecord> = feed
            .iter()
            .filter(|r| !self.previous.contains(&r.id) && !self.seen.contains(&r.id))
            .filter(|r| !baseline.contains(&r.id))
            .filter(|&r| in_batch.insert(r.id.as_str()))
            .collect();
        // sort_by is stable: ties keep feed order.
        fresh.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        fresh
    }

    pub fn mark_seen(&mut self, id: &str) {
        self.seen.insert(id.to_string());
    }

    /// Replace the previous-feed set with the ids of `feed`.
    pub fn finish_cycle(&mut self, feed: &[NotificationRecord]) {
        self.previous = feed.iter().map(|r| r.id.clone()).collect();
        if self.baseline.is_none() {
            self.baseline = Some(self.previous.clone());
        }
    }

    #[cfg(test)]
    fn is_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    #[cfg(test)]
    fn was_in_previous(&self, id: &str) -> bool {
        self.previous.contains(id)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn previous_count(&self) -> usize {
        self.previous.len()
    }

    #[cfg(test)]
    fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }
}
