use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Process-wide namespace mods can be published on for non-module code.
/// Always injected; the loader never reaches for ambient global state.
pub trait ModuleRegistry: Send + Sync {
    fn publish(&self, name: &str, value: Value);

    fn lookup(&self, name: &str) -> Option<Value>;
}

/// In-memory registry. Last publish under a name wins.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModuleRegistry for MemoryRegistry {
    fn publish(&self, name: &str, value: Value) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}
