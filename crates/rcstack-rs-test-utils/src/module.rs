use parking_lot::Mutex;
use rcstack_rs_core::{ConfigError, ModuleLoader};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Module loader serving values from memory and counting evaluations.
#[derive(Debug, Clone, Default)]
pub struct StubModuleLoader {
    values: Arc<Mutex<HashMap<PathBuf, Value>>>,
    evaluations: Arc<Mutex<usize>>,
}

impl StubModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value exported by the module at `path`.
    pub fn export(&self, path: impl Into<PathBuf>, value: Value) {
        self.values.lock().insert(path.into(), value);
    }

    pub fn evaluations(&self) -> usize {
        *self.evaluations.lock()
    }
}

impl ModuleLoader for StubModuleLoader {
    fn load_module(&self, path: &Path) -> Result<Value, ConfigError> {
        *self.evaluations.lock() += 1;
        self.values
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| ConfigError::Module {
                path: path.display().to_string(),
                message: "no export registered".to_string(),
            })
    }
}
