//! Per-event parameter set threaded through the plugin chain.
//!
//! Each event gets an independent copy of the configured base parameters,
//! so plugin mutations during one event can never leak into another. The
//! `id` key always holds the document identifier the notifier will use;
//! plugins may overwrite it (path remapping does exactly that).

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

/// Key holding the document identifier sent to the indexing API.
pub const ID_KEY: &str = "id";

/// Key a plugin sets to abort the remaining chain for this event.
pub const BREAK_KEY: &str = "break";

/// Auxiliary payload for plugin-to-plugin communication.
///
/// Unlike the parameter set, nothing in here is ever sent downstream.
pub type DataMap = HashMap<String, Value>;

/// String-keyed parameters for one event's chain run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: HashMap<String, Value>,
}

impl ParameterSet {
    /// Build the parameter set for one event: a deep copy of the base
    /// configuration with `id` set to the event path.
    pub fn from_base(base: &HashMap<String, Value>, path: &Path) -> Self {
        let mut values = base.clone();
        values.insert(
            ID_KEY.to_string(),
            Value::String(path.to_string_lossy().into_owned()),
        );
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String view of a parameter, if it holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The current document identifier.
    ///
    /// Falls back to an empty string if a plugin removed or mistyped `id`;
    /// the invariant is that it equals the event path unless a plugin
    /// deliberately rewrote it.
    pub fn id(&self) -> &str {
        self.get_str(ID_KEY).unwrap_or_default()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.values.insert(ID_KEY.to_string(), Value::String(id.into()));
    }

    /// Whether a plugin asked to abort the chain.
    ///
    /// Plugins should set a plain boolean, but any truthy value is honored
    /// for compatibility with configurations that store strings or counters
    /// under `break`.
    pub fn break_requested(&self) -> bool {
        self.values.get(BREAK_KEY).is_some_and(is_truthy)
    }
}

/// Truthiness in the loosest sense: everything except `null`, `false`,
/// zero, and empty strings/arrays/objects.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_base_sets_id_to_path() {
        let mut base = HashMap::new();
        base.insert("facet".to_string(), json!("documents"));

        let params = ParameterSet::from_base(&base, Path::new("/data/x.txt"));
        assert_eq!(params.id(), "/data/x.txt");
        assert_eq!(params.get_str("facet"), Some("documents"));
    }

    #[test]
    fn copies_are_independent_of_the_base() {
        let mut base = HashMap::new();
        base.insert("facet".to_string(), json!("documents"));

        let mut first = ParameterSet::from_base(&base, Path::new("/data/a"));
        first.set("facet", "mutated");
        first.set("extra", 1);

        let second = ParameterSet::from_base(&base, Path::new("/data/b"));
        assert_eq!(second.get_str("facet"), Some("documents"));
        assert!(second.get("extra").is_none());
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn break_requested_honors_truthiness() {
        let base = HashMap::new();
        let mut params = ParameterSet::from_base(&base, Path::new("/p"));
        assert!(!params.break_requested());

        params.set(BREAK_KEY, false);
        assert!(!params.break_requested());
        params.set(BREAK_KEY, 0);
        assert!(!params.break_requested());
        params.set(BREAK_KEY, "");
        assert!(!params.break_requested());

        params.set(BREAK_KEY, true);
        assert!(params.break_requested());
        params.set(BREAK_KEY, 1);
        assert!(params.break_requested());
        params.set(BREAK_KEY, "yes");
        assert!(params.break_requested());
    }

    #[test]
    fn truthiness_of_containers() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(["x"])));
        assert!(is_truthy(&json!({"k": 1})));
    }
}
