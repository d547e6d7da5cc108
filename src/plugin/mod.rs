//! Plugin system: per-event processing units run in a configured order.
//!
//! A plugin receives the event's [`ParameterSet`] and an auxiliary
//! [`DataMap`], may mutate both, and may request chain abort by setting
//! the `break` parameter. Plugins come in two shapes with one contract:
//! stateful units constructed fresh for every invocation, and plain
//! functions wrapped by an adapter. Both are looked up by name in the
//! [`PluginRegistry`].

mod builtin;
mod chain;
mod params;
mod registry;

use thiserror::Error;

pub use builtin::{exclude_filter, path_mapping};
pub use chain::{ChainError, ChainOutcome, PluginChain};
pub use params::{BREAK_KEY, DataMap, ID_KEY, ParameterSet, is_truthy};
pub use registry::{PluginRegistry, ProcessFn};

/// A named processing unit in the chain.
///
/// `process` takes ownership of the parameter and data maps and returns the
/// (possibly mutated) pair, mirroring a pure transformation even when the
/// plugin keeps internal state across the single call it receives.
pub trait Plugin: Send {
    /// Name used for resolution and logging.
    fn name(&self) -> &str;

    /// Transform the per-event context.
    fn process(
        &mut self,
        params: ParameterSet,
        data: DataMap,
    ) -> Result<(ParameterSet, DataMap), PluginError>;
}

/// Failures tied to a single plugin.
#[derive(Error, Debug)]
pub enum PluginError {
    /// No plugin is registered under the configured name, or the
    /// registration is unusable. Never aborts the chain.
    #[error("no plugin registered under '{name}'")]
    Unresolved { name: String },

    /// The plugin ran and failed. Contained unless the chain is configured
    /// to raise plugin errors.
    #[error("plugin '{name}' failed: {reason}")]
    Execution { name: String, reason: String },
}

impl PluginError {
    /// Convenience constructor for execution failures.
    pub fn execution(name: impl Into<String>, reason: impl ToString) -> Self {
        PluginError::Execution {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}
