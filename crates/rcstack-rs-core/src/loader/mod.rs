//! Extension-keyed loader registry.
//!
//! Loaders turn a matched file into a JSON value. The registry maps a
//! normalized extension (always with a leading dot) to the loader used for it;
//! the last registration for an extension wins.

mod builtins;
mod module;

use crate::{ConfigError, ConfigFile, ConfigType};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use module::{CommandModuleLoader, ModuleLoader};

/// Translates a file's content into a config value.
pub trait Loader: Send + Sync {
    /// Load `file` on behalf of `config_type`.
    fn load(&self, file: &ConfigFile, config_type: &ConfigType) -> Result<Value, ConfigError>;
}

impl<F> Loader for F
where
    F: Fn(&ConfigFile, &ConfigType) -> Result<Value, ConfigError> + Send + Sync,
{
    fn load(&self, file: &ConfigFile, config_type: &ConfigType) -> Result<Value, ConfigError> {
        self(file, config_type)
    }
}

/// Mapping from normalized extension to loader.
#[derive(Default, Clone)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn Loader>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the JSON, JSON5 and YAML loaders registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register the JSON, JSON5 and YAML loaders.
    pub fn register_builtins(&mut self) {
        self.insert(".json", Arc::new(builtins::load_json));
        self.insert(".json5", Arc::new(builtins::load_json5));
        self.insert(".yaml", Arc::new(builtins::load_yaml));
        self.insert(".yml", Arc::new(builtins::load_yaml));
    }

    /// Route every extension in `extensions` to an executable-module evaluator.
    pub fn register_module_loader(
        &mut self,
        extensions: &[String],
        module_loader: Arc<dyn ModuleLoader>,
    ) -> Result<(), ConfigError> {
        for extension in extensions {
            let evaluator = module_loader.clone();
            self.register(
                extension,
                Arc::new(move |file: &ConfigFile, _: &ConfigType| {
                    evaluator.load_module(&file.path)
                }),
            )?;
        }
        Ok(())
    }

    /// Register `loader` for `extension`, replacing any previous loader.
    pub fn register(
        &mut self,
        extension: &str,
        loader: Arc<dyn Loader>,
    ) -> Result<(), ConfigError> {
        let extension = normalize_extension(extension)?;
        self.insert(&extension, loader);
        Ok(())
    }

    /// Loader registered for `extension`, if any.
    pub fn resolve(&self, extension: &str) -> Option<Arc<dyn Loader>> {
        let extension = normalize_extension(extension).ok()?;
        self.loaders.get(&extension).cloned()
    }

    /// Loader registered for `extension`, or `LoaderNotFound`.
    pub fn require(&self, extension: &str) -> Result<Arc<dyn Loader>, ConfigError> {
        self.resolve(extension)
            .ok_or_else(|| ConfigError::LoaderNotFound {
                extension: extension.to_string(),
            })
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<String> {
        let mut extensions = self.loaders.keys().cloned().collect::<Vec<_>>();
        extensions.sort();
        extensions
    }

    fn insert(&mut self, extension: &str, loader: Arc<dyn Loader>) {
        debug!("registering loader (extension={extension})");
        self.loaders.insert(extension.to_string(), loader);
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

/// Normalize an extension to carry exactly one leading dot.
pub fn normalize_extension(extension: &str) -> Result<String, ConfigError> {
    let trimmed = extension.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() {
        return Err(ConfigError::Validation(
            "expected extname to be a non-empty string".to_string(),
        ));
    }
    Ok(format!(".{bare}"))
}
