//! Per-event processing: classify, run the chain, decide the notification.
//!
//! This is the seam between the watch source and the downstream call. It
//! owns no I/O of its own, which keeps the event contracts testable
//! without a filesystem or an HTTP server.

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::event::{Action, Event};
use crate::plugin::{ChainError, PluginChain, PluginRegistry};

/// What the notifier should send for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Final document id, after any plugin remapping.
    pub doc_id: String,
    pub action: Action,
}

/// Classifier plus chain runner for incoming events.
pub struct Pipeline {
    settings: Settings,
    registry: PluginRegistry,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(settings: Settings, registry: PluginRegistry, cancel: CancellationToken) -> Self {
        Self {
            settings,
            registry,
            cancel,
        }
    }

    /// Process one event to completion.
    ///
    /// Returns the notification to send, or `None` when a plugin aborted
    /// the chain via `break`. Errors follow the chain contract: plugin
    /// errors only in strict mode, cancellation always.
    pub fn handle(&self, event: &Event) -> Result<Option<Notification>, ChainError> {
        let action = event.kind.classify();
        crate::debug_event!("pipeline", action.endpoint(), "{}", event.path.display());

        let chain = PluginChain::new(
            &self.registry,
            self.settings.raise_plugin_errors,
            self.cancel.clone(),
        );
        let outcome = chain.run(
            &event.path,
            action,
            &self.settings.plugins,
            &self.settings.params,
        )?;

        if outcome.aborted {
            crate::debug_event!("pipeline", "aborted", "{}", event.path.display());
            return Ok(None);
        }

        Ok(Some(Notification {
            doc_id: outcome.params.id().to_string(),
            action,
        }))
    }
}
