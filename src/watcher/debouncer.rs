//! Write-settling for modification events.
//!
//! Editors and copy tools emit bursts of modify events for one logical
//! write. A path only counts as "written" once it has been quiet for the
//! configured duration; platforms that report close-write directly bypass
//! this entirely, as do deletions and moves.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Tracks recently modified paths until they settle.
#[derive(Debug)]
pub struct Debouncer {
    /// Path -> timestamp of the most recent modification.
    pending: HashMap<PathBuf, Instant>,
    /// Quiet period required before a path is released.
    duration: Duration,
}

impl Debouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            duration: Duration::from_millis(debounce_ms),
        }
    }

    /// Note a modification, restarting the quiet period for this path.
    pub fn record(&mut self, path: PathBuf) {
        self.pending.insert(path, Instant::now());
    }

    /// Drop a pending path (it was deleted or the write already completed
    /// via close-write).
    pub fn remove(&mut self, path: &PathBuf) {
        self.pending.remove(path);
    }

    /// Release every path that has been quiet long enough, removing it
    /// from the pending set.
    pub fn take_ready(&mut self) -> Vec<PathBuf> {
        let now = Instant::now();
        let mut ready = Vec::new();

        self.pending.retain(|path, last_change| {
            if now.duration_since(*last_change) >= self.duration {
                ready.push(path.clone());
                false
            } else {
                true
            }
        });

        ready
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn path_is_released_after_the_quiet_period() {
        let mut debouncer = Debouncer::new(40);
        let path = PathBuf::from("/data/report.pdf");

        debouncer.record(path.clone());
        assert!(debouncer.take_ready().is_empty());
        assert!(debouncer.has_pending());

        sleep(Duration::from_millis(50));
        assert_eq!(debouncer.take_ready(), vec![path]);
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn a_new_write_restarts_the_clock() {
        let mut debouncer = Debouncer::new(40);
        let path = PathBuf::from("/data/report.pdf");

        debouncer.record(path.clone());
        sleep(Duration::from_millis(25));
        debouncer.record(path.clone());
        sleep(Duration::from_millis(25));

        // 50ms since the first record, only 25ms since the last.
        assert!(debouncer.take_ready().is_empty());

        sleep(Duration::from_millis(25));
        assert_eq!(debouncer.take_ready(), vec![path]);
    }

    #[test]
    fn paths_settle_independently() {
        let mut debouncer = Debouncer::new(40);
        let first = PathBuf::from("/data/a.txt");
        let second = PathBuf::from("/data/b.txt");

        debouncer.record(first.clone());
        sleep(Duration::from_millis(25));
        debouncer.record(second.clone());

        sleep(Duration::from_millis(20));
        assert_eq!(debouncer.take_ready(), vec![first]);
        assert!(debouncer.has_pending());

        sleep(Duration::from_millis(25));
        assert_eq!(debouncer.take_ready(), vec![second]);
    }

    #[test]
    fn removed_paths_are_never_released() {
        let mut debouncer = Debouncer::new(40);
        let path = PathBuf::from("/data/a.txt");

        debouncer.record(path.clone());
        debouncer.remove(&path);
        assert!(!debouncer.has_pending());

        sleep(Duration::from_millis(50));
        assert!(debouncer.take_ready().is_empty());
    }
}
