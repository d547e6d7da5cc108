//! Built-in plugins.
//!
//! The two plugins the monitor ships with cover the common deployment
//! needs: remapping local paths to the identifiers the search server knows
//! them by, and skipping paths that must never reach the index.

use glob::Pattern;
use serde_json::Value;

use super::{BREAK_KEY, DataMap, ParameterSet, PluginError};

/// Rewrite the document id by prefix.
///
/// Reads `mapping_from` and `mapping_to` from the parameter set; when the
/// current id starts with `mapping_from`, that prefix is replaced with
/// `mapping_to`. Used when the indexer sees the watched tree under a
/// different mount point (local dir to remote dir mapping).
pub fn path_mapping(
    mut params: ParameterSet,
    data: DataMap,
) -> Result<(ParameterSet, DataMap), PluginError> {
    let from = params
        .get_str("mapping_from")
        .ok_or_else(|| PluginError::execution("path_mapping", "parameter 'mapping_from' not set"))?
        .to_string();
    let to = params
        .get_str("mapping_to")
        .ok_or_else(|| PluginError::execution("path_mapping", "parameter 'mapping_to' not set"))?
        .to_string();

    if let Some(rest) = params.id().strip_prefix(&from) {
        let mapped = format!("{to}{rest}");
        tracing::debug!("[path_mapping] {} -> {}", params.id(), mapped);
        params.set_id(mapped);
    }

    Ok((params, data))
}

/// Abort the chain for denylisted paths.
///
/// Reads `exclude_patterns` (an array of glob strings) from the parameter
/// set and sets `break` when the current id matches any of them, so no
/// later plugin runs and the notifier is never called for the path.
pub fn exclude_filter(
    mut params: ParameterSet,
    data: DataMap,
) -> Result<(ParameterSet, DataMap), PluginError> {
    let patterns = match params.get("exclude_patterns") {
        Some(Value::Array(patterns)) => patterns.clone(),
        Some(other) => {
            return Err(PluginError::execution(
                "exclude_filter",
                format!("parameter 'exclude_patterns' must be an array, got {other}"),
            ));
        }
        // Nothing configured means nothing is excluded.
        None => Vec::new(),
    };

    for raw in &patterns {
        let Some(text) = raw.as_str() else {
            return Err(PluginError::execution(
                "exclude_filter",
                format!("pattern {raw} is not a string"),
            ));
        };
        let pattern = Pattern::new(text)
            .map_err(|e| PluginError::execution("exclude_filter", format!("bad pattern '{text}': {e}")))?;

        if pattern.matches(params.id()) {
            tracing::debug!("[exclude_filter] {} matches '{}'", params.id(), text);
            params.set(BREAK_KEY, true);
            break;
        }
    }

    Ok((params, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::Path;

    fn base_with(entries: &[(&str, Value)]) -> HashMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn path_mapping_rewrites_matching_prefix() {
        let base = base_with(&[
            ("mapping_from", json!("/data")),
            ("mapping_to", json!("file:///mnt/share")),
        ]);
        let params = ParameterSet::from_base(&base, Path::new("/data/docs/a.txt"));

        let (params, _) = path_mapping(params, DataMap::new()).unwrap();
        assert_eq!(params.id(), "file:///mnt/share/docs/a.txt");
    }

    #[test]
    fn path_mapping_leaves_other_paths_alone() {
        let base = base_with(&[
            ("mapping_from", json!("/data")),
            ("mapping_to", json!("/remote")),
        ]);
        let params = ParameterSet::from_base(&base, Path::new("/other/a.txt"));

        let (params, _) = path_mapping(params, DataMap::new()).unwrap();
        assert_eq!(params.id(), "/other/a.txt");
    }

    #[test]
    fn path_mapping_without_config_is_an_execution_error() {
        let params = ParameterSet::from_base(&HashMap::new(), Path::new("/data/a.txt"));
        let err = path_mapping(params, DataMap::new()).unwrap_err();
        assert!(matches!(err, PluginError::Execution { .. }));
    }

    #[test]
    fn exclude_filter_sets_break_on_match() {
        let base = base_with(&[("exclude_patterns", json!(["**/*.tmp", "/data/private/**"]))]);

        let params = ParameterSet::from_base(&base, Path::new("/data/x.tmp"));
        let (params, _) = exclude_filter(params, DataMap::new()).unwrap();
        assert!(params.break_requested());

        let params = ParameterSet::from_base(&base, Path::new("/data/private/secret.txt"));
        let (params, _) = exclude_filter(params, DataMap::new()).unwrap();
        assert!(params.break_requested());
    }

    #[test]
    fn exclude_filter_passes_clean_paths() {
        let base = base_with(&[("exclude_patterns", json!(["**/*.tmp"]))]);
        let params = ParameterSet::from_base(&base, Path::new("/data/x.txt"));

        let (params, _) = exclude_filter(params, DataMap::new()).unwrap();
        assert!(!params.break_requested());
    }

    #[test]
    fn exclude_filter_without_patterns_is_a_no_op() {
        let params = ParameterSet::from_base(&HashMap::new(), Path::new("/data/x.txt"));
        let (params, _) = exclude_filter(params, DataMap::new()).unwrap();
        assert!(!params.break_requested());
    }

    #[test]
    fn exclude_filter_rejects_bad_patterns() {
        let base = base_with(&[("exclude_patterns", json!(["[unclosed"]))]);
        let params = ParameterSet::from_base(&base, Path::new("/data/x.txt"));
        assert!(exclude_filter(params, DataMap::new()).is_err());
    }
}
