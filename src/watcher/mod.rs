//! Filesystem watching and the sequential event loop.
//!
//! ```text
//! FileMonitor
//!   - notify::RecommendedWatcher -> bounded channel
//!   - Debouncer (writes settle before they count)
//!   - Pipeline (classify + plugin chain)
//!   - ActionNotifier (one GET per surviving event)
//! ```
//!
//! Events are processed one at a time, start to finish, before the next
//! one is consumed. The bounded channel is the backpressure: when the
//! loop falls behind, the watch source blocks instead of buffering
//! without limit.

mod debouncer;
mod error;
mod monitor;

pub use debouncer::Debouncer;
pub use error::WatchError;
pub use monitor::{FileMonitor, FileMonitorBuilder};
