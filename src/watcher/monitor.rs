//! The file monitor: watch source glue and the sequential event loop.

use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::event::{Event, EventKind};
use crate::notifier::ActionNotifier;
use crate::pipeline::Pipeline;
use crate::plugin::{ChainError, PluginRegistry};

use super::debouncer::Debouncer;
use super::error::WatchError;

/// How often settled modifications are flushed from the debouncer.
const DEBOUNCE_TICK_MS: u64 = 100;

/// Where a raw watch event goes next.
#[derive(Debug, PartialEq, Eq)]
enum Routed {
    /// A write in progress; wait for it to settle.
    Debounce(std::path::PathBuf),
    /// Ready for the pipeline right now.
    Immediate(Event),
}

/// Translate one raw notify event into routed monitor events.
///
/// Close-write, moves, and removals act immediately; plain modifications
/// and creations go through the debouncer and surface later as
/// close-write events once the file stays quiet.
fn route(raw: notify::Event) -> Vec<Routed> {
    match raw.kind {
        notify::EventKind::Access(AccessKind::Close(AccessMode::Write)) => raw
            .paths
            .into_iter()
            .map(|p| Routed::Immediate(Event::new(p, EventKind::CloseWrite)))
            .collect(),

        notify::EventKind::Modify(ModifyKind::Name(RenameMode::From)) => raw
            .paths
            .into_iter()
            .map(|p| Routed::Immediate(Event::new(p, EventKind::MovedFrom)))
            .collect(),

        notify::EventKind::Modify(ModifyKind::Name(RenameMode::To)) => raw
            .paths
            .into_iter()
            .map(|p| Routed::Immediate(Event::new(p, EventKind::MovedTo)))
            .collect(),

        // Both sides in one event: source first, then destination.
        notify::EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut paths = raw.paths.into_iter();
            let mut routed = Vec::new();
            if let Some(from) = paths.next() {
                routed.push(Routed::Immediate(Event::new(from, EventKind::MovedFrom)));
            }
            if let Some(to) = paths.next() {
                routed.push(Routed::Immediate(Event::new(to, EventKind::MovedTo)));
            }
            routed
        }

        notify::EventKind::Modify(_) | notify::EventKind::Create(_) => {
            raw.paths.into_iter().map(Routed::Debounce).collect()
        }

        notify::EventKind::Remove(_) => raw
            .paths
            .into_iter()
            .map(|p| Routed::Immediate(Event::new(p, EventKind::Delete)))
            .collect(),

        _ => Vec::new(),
    }
}

/// Watches paths and drives every event through the pipeline and the
/// notifier, strictly one at a time.
pub struct FileMonitor {
    pipeline: Pipeline,
    notifier: ActionNotifier,
    debouncer: Debouncer,
    event_rx: mpsc::Receiver<notify::Result<notify::Event>>,
    watcher: RecommendedWatcher,
    cancel: CancellationToken,
    recursive: bool,
}

impl FileMonitor {
    pub fn builder() -> FileMonitorBuilder {
        FileMonitorBuilder::new()
    }

    /// Watch a file or directory (recursively, per config).
    pub fn watch_path(&mut self, path: &Path) -> Result<(), WatchError> {
        let mode = if self.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        self.watcher
            .watch(path, mode)
            .map_err(|e| WatchError::PathWatchFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        crate::log_event!("monitor", "watching", "{}", path.display());
        Ok(())
    }

    /// Watch every path listed in `list`, one per line. Blank lines and
    /// `#` comments are skipped; unwatchable entries are logged and
    /// skipped rather than failing the rest of the list.
    ///
    /// Returns how many paths were added.
    pub fn watch_paths_from_file(&mut self, list: &Path) -> Result<usize, WatchError> {
        let content =
            std::fs::read_to_string(list).map_err(|e| WatchError::WatchListFailed {
                path: list.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut added = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match self.watch_path(Path::new(line)) {
                Ok(()) => added += 1,
                Err(e) => tracing::warn!("{e}"),
            }
        }
        Ok(added)
    }

    /// Run the event loop until cancelled.
    ///
    /// Each event is fully processed (chain plus notifier call) before
    /// the next one is consumed; no two events ever overlap.
    pub async fn watch(mut self) -> Result<(), WatchError> {
        crate::log_event!("monitor", "started");

        loop {
            let tick = sleep(Duration::from_millis(DEBOUNCE_TICK_MS));
            tokio::pin!(tick);

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    crate::log_event!("monitor", "interrupted");
                    return Ok(());
                }

                received = self.event_rx.recv() => {
                    match received.ok_or(WatchError::ChannelClosed)? {
                        Ok(raw) => {
                            for routed in route(raw) {
                                match routed {
                                    Routed::Debounce(path) => self.debouncer.record(path),
                                    Routed::Immediate(event) => {
                                        // Supersedes any pending write for the path.
                                        self.debouncer.remove(&event.path);
                                        if self.process(event).await.is_break() {
                                            return Ok(());
                                        }
                                    }
                                }
                            }
                        }
                        Err(e) => tracing::error!("[monitor] watch error: {e}"),
                    }
                }

                _ = &mut tick => {
                    for path in self.debouncer.take_ready() {
                        let event = Event::new(path, EventKind::CloseWrite);
                        if self.process(event).await.is_break() {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Process one event; `Break` means the loop was interrupted.
    async fn process(&self, event: Event) -> ControlFlow<()> {
        crate::debug_event!("monitor", "event", "{:?} {}", event.kind, event.path.display());

        match self.pipeline.handle(&event) {
            Ok(Some(notification)) => {
                self.notifier
                    .notify(&notification.doc_id, notification.action)
                    .await;
                ControlFlow::Continue(())
            }
            Ok(None) => ControlFlow::Continue(()),
            Err(ChainError::Plugin(e)) => {
                tracing::error!("[monitor] event abandoned: {e}");
                ControlFlow::Continue(())
            }
            Err(ChainError::Cancelled) => ControlFlow::Break(()),
        }
    }
}

/// Builder for [`FileMonitor`].
pub struct FileMonitorBuilder {
    settings: Settings,
    registry: Option<PluginRegistry>,
    cancel: Option<CancellationToken>,
}

impl FileMonitorBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            registry: None,
            cancel: None,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Token that stops the loop; trip it from a signal handler.
    pub fn cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<FileMonitor, WatchError> {
        let settings = self.settings;
        let registry = self.registry.unwrap_or_default();
        let cancel = self.cancel.unwrap_or_default();

        let notifier = ActionNotifier::new(
            settings.api.clone(),
            Duration::from_secs(settings.notifier.timeout_secs),
        )
        .map_err(|e| WatchError::InitFailed {
            reason: e.to_string(),
        })?;

        let (tx, rx) = mpsc::channel(settings.watcher.queue_size.max(1));

        // blocking_send applies backpressure to the watch source when the
        // loop falls behind.
        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.blocking_send(res);
        })?;

        let debouncer = Debouncer::new(settings.watcher.debounce_ms);
        let recursive = settings.watcher.recursive;
        let pipeline = Pipeline::new(settings, registry, cancel.clone());

        Ok(FileMonitor {
            pipeline,
            notifier,
            debouncer,
            event_rx: rx,
            watcher,
            cancel,
            recursive,
        })
    }
}

impl Default for FileMonitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
