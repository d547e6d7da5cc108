//! Ordered plugin execution for one event.
//!
//! The chain resolves each configured name in turn and feeds the parameter
//! set and data map through it. Plugin faults are contained so one broken
//! plugin cannot take the monitor down; only user cancellation (and plugin
//! errors when the operator opted into strict mode) propagate out.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::event::Action;

use super::params::{DataMap, ParameterSet};
use super::registry::PluginRegistry;
use super::PluginError;

/// Errors that abandon the current event's chain.
#[derive(Error, Debug)]
pub enum ChainError {
    /// A plugin failed and `raise_plugin_errors` is set. The event is
    /// dropped without a notifier call; the loop keeps running.
    #[error("plugin chain abandoned: {0}")]
    Plugin(#[from] PluginError),

    /// User-initiated interrupt. Terminates the whole event loop.
    #[error("interrupted")]
    Cancelled,
}

/// Result of a completed chain run.
#[derive(Debug)]
pub struct ChainOutcome {
    /// Final parameters, including the (possibly remapped) document id.
    pub params: ParameterSet,
    /// Whether a plugin stopped the chain via `break`. An aborted event
    /// must not reach the notifier.
    pub aborted: bool,
}

/// Executor for the configured plugin sequence.
pub struct PluginChain<'a> {
    registry: &'a PluginRegistry,
    raise_plugin_errors: bool,
    cancel: CancellationToken,
}

impl<'a> PluginChain<'a> {
    pub fn new(
        registry: &'a PluginRegistry,
        raise_plugin_errors: bool,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            raise_plugin_errors,
            cancel,
        }
    }

    /// Run the configured plugins, in order, over a fresh parameter set.
    ///
    /// `base` is copied, never borrowed into the result: one event's
    /// mutations stay invisible to every other event. The classified
    /// `action` is exposed to plugins through the data map, not the
    /// parameter set, so it cannot leak into the notifier call.
    pub fn run(
        &self,
        path: &Path,
        action: Action,
        names: &[String],
        base: &HashMap<String, Value>,
    ) -> Result<ChainOutcome, ChainError> {
        let mut params = ParameterSet::from_base(base, path);
        let mut data = DataMap::new();
        data.insert(
            "action".to_string(),
            Value::String(action.endpoint().to_string()),
        );

        for name in names {
            if self.cancel.is_cancelled() {
                return Err(ChainError::Cancelled);
            }

            let Some(mut plugin) = self.registry.resolve(name) else {
                // Unresolvable names never abort the chain.
                tracing::warn!("{}", PluginError::Unresolved { name: name.clone() });
                continue;
            };

            crate::debug_event!("chain", "running", "{name}");

            // Clones isolate the invocation: a failing plugin cannot leave
            // half-applied mutations behind.
            match plugin.process(params.clone(), data.clone()) {
                Ok((next_params, next_data)) => {
                    params = next_params;
                    data = next_data;
                }
                Err(e) => {
                    tracing::error!("{e}");
                    if self.raise_plugin_errors {
                        return Err(ChainError::Plugin(e));
                    }
                    // Contained: later plugins still see the pre-failure
                    // parameters and data.
                }
            }

            if params.break_requested() {
                crate::debug_event!("chain", "break", "requested by {name}");
                return Ok(ChainOutcome {
                    params,
                    aborted: true,
                });
            }
        }

        // Honors a break already present in the base configuration, not
        // only one set by a plugin during this run.
        let aborted = params.break_requested();
        Ok(ChainOutcome { params, aborted })
    }
}
