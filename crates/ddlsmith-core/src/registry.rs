//! Column type options offered when editing object definitions
//!
//! The registry starts from the base warehouse types and grows with the more
//! precise types discovered on existing objects (e.g. `NUMBER(38,0)`). It is
//! owned by the caller; nothing here is process-global.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Types every registry starts with
pub const BASE_TYPES: &[&str] = &[
    "NUMBER", "VARCHAR", "BOOLEAN", "TIMESTAMP", "DATE", "VARIANT", "FLOAT",
];

/// Set of known column types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRegistry {
    types: BTreeSet<String>,
}

impl TypeRegistry {
    /// Registry holding only the base types
    pub fn new() -> Self {
        Self {
            types: BASE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Registry with base types plus configured extras
    pub fn with_types<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        registry.register_all(extra);
        registry
    }

    /// Add a type; returns `true` when it was not known yet
    pub fn register(&mut self, data_type: &str) -> bool {
        let normalized = data_type.trim();
        if normalized.is_empty() {
            return false;
        }
        self.types.insert(normalized.to_string())
    }

    /// Add several types; returns the ones that were new, in input order
    pub fn register_all<I, S>(&mut self, types: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        types
            .into_iter()
            .filter_map(|t| {
                let t = t.as_ref();
                self.register(t).then(|| t.trim().to_string())
            })
            .collect()
    }

    /// Whether a type is known
    pub fn contains(&self, data_type: &str) -> bool {
        self.types.contains(data_type.trim())
    }

    /// Sorted, de-duplicated options
    pub fn options(&self) -> Vec<&str> {
        self.types.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_base_types() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.len(), BASE_TYPES.len());
        assert!(registry.contains("VARIANT"));
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register("NUMBER(38,0)"));
        assert!(!registry.register("NUMBER(38,0)"));
        assert!(!registry.register("VARCHAR"));
        assert!(!registry.register("   "));
        assert_eq!(registry.len(), BASE_TYPES.len() + 1);
    }

    #[test]
    fn options_are_sorted() {
        let mut registry = TypeRegistry::new();
        let added = registry.register_all(["VARCHAR(16777216)", "NUMBER(38,0)", "NUMBER(38,0)"]);
        assert_eq!(added, vec!["VARCHAR(16777216)", "NUMBER(38,0)"]);

        let options = registry.options();
        let mut sorted = options.clone();
        sorted.sort();
        assert_eq!(options, sorted);
        assert_eq!(options[0], "BOOLEAN");
    }

    #[test]
    fn registries_are_independent() {
        let mut first = TypeRegistry::new();
        let second = TypeRegistry::new();
        first.register("TIMESTAMP_NTZ(9)");
        assert!(!second.contains("TIMESTAMP_NTZ(9)"));
    }
}
