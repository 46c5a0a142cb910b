use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Export name module systems reserve for the default binding.
pub const DEFAULT_EXPORT: &str = "default";

/// Named bindings a loaded script module exposes to its loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleNamespace {
    exports: BTreeMap<String, Value>,
}

impl ModuleNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_export(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.exports.insert(name.into(), value);
    }

    pub fn export(&self, name: &str) -> Option<&Value> {
        self.exports.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// The whole namespace as a single JSON object.
    pub fn as_object(&self) -> Value {
        let entries: Map<String, Value> = self
            .exports
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Value::Object(entries)
    }
}

/// Transcrypt modules usually export a namespace named after the script, or a
/// default binding, or direct names. Picks the preferred export when present,
/// then the default export, then the raw namespace object.
pub fn resolve_namespace(namespace: &ModuleNamespace, preferred: &str) -> Value {
    if let Some(value) = namespace.export(preferred) {
        return value.clone();
    }
    if let Some(value) = namespace.export(DEFAULT_EXPORT) {
        return value.clone();
    }
    namespace.as_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_the_named_export() {
        let namespace = ModuleNamespace::new()
            .with_export("test", json!({"run": true}))
            .with_export(DEFAULT_EXPORT, json!("fallback"));
        assert_eq!(resolve_namespace(&namespace, "test"), json!({"run": true}));
    }

    #[test]
    fn falls_back_to_the_default_export() {
        let namespace = ModuleNamespace::new().with_export(DEFAULT_EXPORT, json!("fallback"));
        assert_eq!(resolve_namespace(&namespace, "test"), json!("fallback"));
    }

    #[test]
    fn falls_back_to_the_raw_namespace() {
        let namespace = ModuleNamespace::new()
            .with_export("alpha", json!(1))
            .with_export("beta", json!(2));
        assert_eq!(
            resolve_namespace(&namespace, "test"),
            json!({"alpha": 1, "beta": 2})
        );
    }

    #[test]
    fn empty_namespace_resolves_to_an_empty_object() {
        assert_eq!(resolve_namespace(&ModuleNamespace::new(), "test"), json!({}));
    }
}
