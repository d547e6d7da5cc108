pub mod config;
pub mod event;
pub mod logging;
pub mod notifier;
pub mod pipeline;
pub mod plugin;
pub mod watcher;

pub use config::Settings;
pub use event::{Action, Event, EventKind};
pub use notifier::ActionNotifier;
pub use pipeline::{Notification, Pipeline};
pub use plugin::{
    ChainError, ChainOutcome, DataMap, ParameterSet, Plugin, PluginChain, PluginError,
    PluginRegistry,
};
pub use watcher::{FileMonitor, FileMonitorBuilder, WatchError};
