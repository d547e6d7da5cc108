//! Name-to-plugin registration table.
//!
//! Plugins are registered once at startup and resolved by the configured
//! name on every chain run. Stateful plugins register a constructor so each
//! invocation gets a fresh instance; stateless ones register a plain
//! function that is wrapped into the [`Plugin`] contract by an adapter.

use std::collections::HashMap;

use super::{DataMap, ParameterSet, Plugin, PluginError, builtin};

/// Signature for stateless plugin functions.
pub type ProcessFn = fn(ParameterSet, DataMap) -> Result<(ParameterSet, DataMap), PluginError>;

type Constructor = Box<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

enum Registration {
    /// Instantiated once per invocation.
    Stateful(Constructor),
    /// Called directly, via the adapter.
    Function(ProcessFn),
}

/// Registry mapping plugin names to their implementations.
pub struct PluginRegistry {
    entries: HashMap<String, Registration>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry pre-populated with the built-in plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_fn("path_mapping", builtin::path_mapping);
        registry.register_fn("exclude_filter", builtin::exclude_filter);
        registry
    }

    /// Register a stateful plugin under `name`.
    ///
    /// The constructor runs once per chain invocation.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        self.entries
            .insert(name.into(), Registration::Stateful(Box::new(constructor)));
    }

    /// Register a stateless plugin function under `name`.
    pub fn register_fn(&mut self, name: impl Into<String>, f: ProcessFn) {
        self.entries.insert(name.into(), Registration::Function(f));
    }

    /// Resolve a configured name to a ready-to-run plugin instance.
    pub fn resolve(&self, name: &str) -> Option<Box<dyn Plugin>> {
        match self.entries.get(name)? {
            Registration::Stateful(constructor) => Some(constructor()),
            Registration::Function(f) => Some(Box::new(FnPlugin {
                name: name.to_string(),
                f: *f,
            })),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, for diagnostics.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Adapter exposing a plain function through the [`Plugin`] contract.
struct FnPlugin {
    name: String,
    f: ProcessFn,
}

impl Plugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(
        &mut self,
        params: ParameterSet,
        data: DataMap,
    ) -> Result<(ParameterSet, DataMap), PluginError> {
        (self.f)(params, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tagger {
        calls: usize,
    }

    impl Plugin for Tagger {
        fn name(&self) -> &str {
            "tagger"
        }

        fn process(
            &mut self,
            mut params: ParameterSet,
            data: DataMap,
        ) -> Result<(ParameterSet, DataMap), PluginError> {
            self.calls += 1;
            params.set("calls", self.calls as i64);
            Ok((params, data))
        }
    }

    fn passthrough(
        params: ParameterSet,
        data: DataMap,
    ) -> Result<(ParameterSet, DataMap), PluginError> {
        Ok((params, data))
    }

    #[test]
    fn unknown_name_does_not_resolve() {
        let registry = PluginRegistry::new();
        assert!(registry.resolve("nope").is_none());
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn stateful_plugins_get_a_fresh_instance_per_resolution() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);

        let mut registry = PluginRegistry::new();
        registry.register("tagger", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(Tagger { calls: 0 })
        });

        let base = HashMap::new();
        for _ in 0..2 {
            let mut plugin = registry.resolve("tagger").unwrap();
            let params = ParameterSet::from_base(&base, Path::new("/p"));
            let (params, _) = plugin.process(params, DataMap::new()).unwrap();
            // Fresh state each time: the call counter never exceeds one.
            assert_eq!(params.get("calls"), Some(&serde_json::json!(1)));
        }
        assert_eq!(constructed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn function_plugins_run_through_the_adapter() {
        let mut registry = PluginRegistry::new();
        registry.register_fn("pass", passthrough);

        let mut plugin = registry.resolve("pass").unwrap();
        assert_eq!(plugin.name(), "pass");

        let params = ParameterSet::from_base(&HashMap::new(), Path::new("/x"));
        let (params, _) = plugin.process(params, DataMap::new()).unwrap();
        assert_eq!(params.id(), "/x");
    }

    #[test]
    fn builtins_are_registered_by_default() {
        let registry = PluginRegistry::default();
        assert!(registry.contains("path_mapping"));
        assert!(registry.contains("exclude_filter"));
    }
}
