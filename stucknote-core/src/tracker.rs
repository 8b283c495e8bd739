//! Per-note lifecycle state and the periodic sweep.
//!
//! The tracker maps note keys to the timestamp of their most recent Note On.
//! A key is in the map exactly when the tracker believes that key is still
//! sounding; a `None` value is the explicit "cleared by Note Off" sentinel
//! and is equivalent to absent. The sweep removes cleared entries silently
//! and evicts entries older than the timeout, reporting each eviction once.
//!
//! All operations take timestamps explicitly, so tests drive the clock with
//! plain `Instant` arithmetic instead of sleeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Receives one report per note evicted for a missing Note Off.
///
/// A report is an observation, not an error: the monitor keeps running and
/// the violating key simply goes back to the off state.
pub trait ViolationSink {
    fn missing_note_off(&mut self, key: u8);
}

impl<F: FnMut(u8)> ViolationSink for F {
    fn missing_note_off(&mut self, key: u8) {
        self(key)
    }
}

/// Tracks which notes are currently on and for how long.
///
/// Owned exclusively by the monitor loop; nothing else reads or writes it,
/// which is what makes the whole design lock-free.
pub struct NoteTracker {
    /// key -> last Note On timestamp; `None` means cleared by a Note Off
    /// and awaiting removal at the next sweep.
    notes: HashMap<u8, Option<Instant>>,
    timeout: Duration,
}

impl NoteTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            notes: HashMap::new(),
            timeout,
        }
    }

    /// A Note On (re)arms the key: any prior timestamp is overwritten, so a
    /// re-trigger restarts the deadline rather than counting as a violation.
    pub fn note_on(&mut self, key: u8, now: Instant) {
        self.notes.insert(key, Some(now));
    }

    /// A Note Off clears the key to the sentinel. An Off for a key that was
    /// never on is a no-op, not an error.
    pub fn note_off(&mut self, key: u8) {
        if let Some(state) = self.notes.get_mut(&key) {
            *state = None;
        }
    }

    /// One sweep pass: rebuild the retained map from scratch, dropping
    /// cleared entries silently and reporting entries that aged past the
    /// timeout without an Off. Full replace keeps the invariant simple:
    /// retained entries and evicted entries are disjoint by construction.
    ///
    /// Running the sweep twice with the same `now` and no intervening
    /// packets changes nothing the second time.
    pub fn sweep(&mut self, now: Instant, sink: &mut impl ViolationSink) {
        let mut retained = HashMap::with_capacity(self.notes.len());
        for (&key, &state) in &self.notes {
            let Some(on_at) = state else {
                continue;
            };
            if now.saturating_duration_since(on_at) < self.timeout {
                retained.insert(key, Some(on_at));
            } else {
                sink.missing_note_off(key);
            }
        }
        self.notes = retained;
    }

    /// Whether the tracker currently believes `key` is sounding.
    pub fn is_on(&self, key: u8) -> bool {
        matches!(self.notes.get(&key), Some(Some(_)))
    }

    /// Number of keys believed to be sounding (sentinel entries excluded).
    pub fn active_count(&self) -> usize {
        self.notes.values().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(100);

    fn tracker() -> NoteTracker {
        NoteTracker::new(TIMEOUT)
    }

    fn sweep_collect(tracker: &mut NoteTracker, now: Instant) -> Vec<u8> {
        let mut reported = Vec::new();
        tracker.sweep(now, &mut |key| reported.push(key));
        reported
    }

    #[test]
    fn test_note_on_then_timeout_reports_once_and_evicts() {
        let t0 = Instant::now();
        let mut tk = tracker();
        tk.note_on(60, t0);

        assert_eq!(sweep_collect(&mut tk, t0 + TIMEOUT), vec![60]);
        assert!(!tk.is_on(60));

        // Nothing left to report.
        assert!(sweep_collect(&mut tk, t0 + TIMEOUT * 2).is_empty());
    }

    #[test]
    fn test_note_on_then_off_in_time_reports_nothing() {
        let t0 = Instant::now();
        let mut tk = tracker();
        tk.note_on(60, t0);
        tk.note_off(60);

        assert!(sweep_collect(&mut tk, t0 + TIMEOUT * 2).is_empty());
        assert!(!tk.is_on(60));
    }

    #[test]
    fn test_sweep_before_deadline_retains() {
        let t0 = Instant::now();
        let mut tk = tracker();
        tk.note_on(60, t0);

        assert!(sweep_collect(&mut tk, t0 + TIMEOUT / 2).is_empty());
        assert!(tk.is_on(60));
    }

    #[test]
    fn test_retrigger_restarts_the_deadline() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(80);
        let mut tk = tracker();
        tk.note_on(60, t0);
        tk.note_on(60, t1);

        // Past t0's deadline but not t1's: no violation yet.
        assert!(sweep_collect(&mut tk, t0 + TIMEOUT).is_empty());
        assert!(tk.is_on(60));

        // Past t1's deadline: now it fires.
        assert_eq!(sweep_collect(&mut tk, t1 + TIMEOUT), vec![60]);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let t0 = Instant::now();
        let mut tk = tracker();
        tk.note_on(60, t0);
        tk.note_on(61, t0);

        let now = t0 + TIMEOUT;
        let mut first = sweep_collect(&mut tk, now);
        first.sort_unstable();
        assert_eq!(first, vec![60, 61]);

        assert!(sweep_collect(&mut tk, now).is_empty());
        assert_eq!(tk.active_count(), 0);
    }

    #[test]
    fn test_off_without_on_is_a_noop() {
        let t0 = Instant::now();
        let mut tk = tracker();
        tk.note_off(60);

        assert_eq!(tk.active_count(), 0);
        assert!(sweep_collect(&mut tk, t0 + TIMEOUT).is_empty());
    }

    #[test]
    fn test_independent_keys() {
        let t0 = Instant::now();
        let mut tk = tracker();
        tk.note_on(60, t0);
        tk.note_on(64, t0);
        tk.note_off(64);

        assert_eq!(sweep_collect(&mut tk, t0 + TIMEOUT), vec![60]);
        assert!(!tk.is_on(64));
    }

    #[test]
    fn test_on_after_off_arms_again() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(10);
        let mut tk = tracker();
        tk.note_on(60, t0);
        tk.note_off(60);
        tk.note_on(60, t1);

        assert!(tk.is_on(60));
        assert_eq!(sweep_collect(&mut tk, t1 + TIMEOUT), vec![60]);
    }
}
