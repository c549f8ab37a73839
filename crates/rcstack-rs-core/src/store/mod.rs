//! Config store: type registration, loading and merging.
//!
//! The store owns the registered config types and the loader registry. Loading
//! a type resolves its files, runs each file through the loader for its
//! extension (and the type's transform, when set) and folds mapping results
//! into the type's data. Merging folds the data of several types, in the order
//! requested, into one value.

mod selection;

#[cfg(test)]
mod tests;

use crate::loader::{Loader, LoaderRegistry};
use crate::merge::ValueMerger;
use crate::resolver::{self, GlobService, WalkGlobService};
use crate::types::TypeRecord;
use crate::{ConfigError, ConfigFile, ConfigType, StoreConfig, TypeSettings};
use log::{debug, info};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use selection::TypeSelection;

/// Registry of named config types plus the loaders used to read them.
pub struct ConfigStore {
    config: StoreConfig,
    merger: ValueMerger,
    loaders: LoaderRegistry,
    glob: Arc<dyn GlobService>,
    types: HashMap<String, ConfigType>,
    /// Type names in registration order.
    order: Vec<String>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::with_registry(StoreConfig::default(), LoaderRegistry::with_builtins())
    }
}

impl ConfigStore {
    /// Create a store from store-level settings.
    pub fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        let mut loaders = LoaderRegistry::new();
        if config.builtin_loaders {
            loaders.register_builtins();
        }
        if let Some(module_loader) = &config.module_loader {
            loaders.register_module_loader(&config.module_extensions, module_loader.clone())?;
        }
        Ok(Self::with_registry(config, loaders))
    }

    fn with_registry(config: StoreConfig, loaders: LoaderRegistry) -> Self {
        let glob = config
            .glob_service
            .clone()
            .unwrap_or_else(|| Arc::new(WalkGlobService::new()));
        Self {
            merger: ValueMerger::new(config.array_policy),
            config,
            loaders,
            glob,
            types: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Store-level settings.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Merger used for registration, loading and merging.
    pub fn merger(&self) -> ValueMerger {
        self.merger
    }

    /// Loader registry.
    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// Register `loader` for `extension` (with or without the leading dot).
    pub fn loader<L>(&mut self, extension: &str, loader: L) -> Result<&mut Self, ConfigError>
    where
        L: Loader + 'static,
    {
        self.loaders.register(extension, Arc::new(loader))?;
        Ok(self)
    }

    /// Register or replace the config type `name`.
    ///
    /// The stored record is built by merging, in increasing precedence, the
    /// built-in defaults, the store-level settings and `settings`. Patterns
    /// from the store are unioned with the type's own.
    pub fn set_type(
        &mut self,
        name: &str,
        settings: TypeSettings,
    ) -> Result<&mut Self, ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "expected type to be a non-empty string".to_string(),
            ));
        }

        let defaults = json!({ "patterns": [], "options": {}, "files": [], "data": {} });
        let store_layer = settings_layer(&self.config.patterns, &self.config.options, None)?;
        let type_layer =
            settings_layer(&settings.patterns, &settings.options, settings.data.as_ref())?;
        let merged = self.merger.merge(&defaults, [&store_layer, &type_layer]);
        let mut record: TypeRecord = serde_json::from_value(merged)?;
        record.options.cwd = settings
            .options
            .cwd
            .or_else(|| self.config.options.cwd.clone());

        if record.patterns.is_empty() {
            return Err(ConfigError::Validation(format!(
                "expected patterns for config type \"{name}\" to contain at least one glob"
            )));
        }

        let config_type = ConfigType {
            name: name.to_string(),
            patterns: record.patterns,
            options: record.options,
            filter: settings.filter.or_else(|| self.config.filter.clone()),
            load: settings.load.or_else(|| self.config.load.clone()),
            files: Vec::new(),
            data: record.data.clone(),
            seed: record.data,
        };
        debug!(
            "registered config type (name={}, patterns={})",
            name,
            config_type.patterns.join(", ")
        );

        if !self.types.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.types.insert(name.to_string(), config_type);
        Ok(self)
    }

    /// Registered config type `name`.
    pub fn get_type(&self, name: &str) -> Result<&ConfigType, ConfigError> {
        self.types
            .get(name)
            .ok_or_else(|| ConfigError::UnknownType(name.to_string()))
    }

    /// Register `name` when `settings` is given, then return the stored type.
    pub fn config_type(
        &mut self,
        name: &str,
        settings: Option<TypeSettings>,
    ) -> Result<&ConfigType, ConfigError> {
        if let Some(settings) = settings {
            self.set_type(name, settings)?;
        }
        self.get_type(name)
    }

    /// Registered type names, in registration order.
    pub fn type_names(&self) -> &[String] {
        &self.order
    }

    /// Registered types, in registration order.
    pub fn types(&self) -> impl Iterator<Item = &ConfigType> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    /// Resolve the files currently matched by type `name`.
    pub fn resolve(&self, name: &str) -> Result<Vec<ConfigFile>, ConfigError> {
        let config_type = self.get_type(name)?;
        let files = resolver::resolve_files(config_type, self.glob.as_ref())?;
        debug!("resolved config type (name={}, files={})", name, files.len());
        if let Some(on_resolved) = &self.config.on_resolved {
            on_resolved(name, &files);
        }
        Ok(files)
    }

    /// Resolve and load type `name`, replacing its files and data.
    ///
    /// Data restarts from the registered seed on every call. A failing file
    /// aborts the load; files processed before it stay merged.
    pub fn load_type(&mut self, name: &str) -> Result<&ConfigType, ConfigError> {
        let files = self.resolve(name)?;
        let merger = self.merger;
        let loaders = &self.loaders;
        let config_type = self
            .types
            .get_mut(name)
            .ok_or_else(|| ConfigError::UnknownType(name.to_string()))?;

        config_type.data = config_type.seed.clone();
        config_type.files = files;

        for idx in 0..config_type.files.len() {
            let extension = config_type.files[idx].extname();
            let loader = loaders.require(&extension)?;
            let raw = loader.load(&config_type.files[idx], config_type)?;
            config_type.files[idx].data = raw;

            if let Some(transform) = config_type.load.clone() {
                let transformed = transform(&config_type.files[idx], config_type)?;
                config_type.files[idx].data = transformed;
            }

            let file = &config_type.files[idx];
            if !file.data.is_object() {
                debug!(
                    "skipping non-mapping config value (path={})",
                    file.path.display()
                );
                continue;
            }
            let merged = merger.merge_pair(&config_type.data, &file.data);
            config_type.data = merged;
        }

        info!(
            "loaded config type (name={}, files={})",
            name,
            config_type.files.len()
        );
        Ok(config_type)
    }

    /// Load the selected types, in selection order.
    pub fn load(
        &mut self,
        selection: impl Into<TypeSelection>,
    ) -> Result<LoadedTypes, ConfigError> {
        let names = selection.into().expand(&self.order);
        let mut types = Vec::with_capacity(names.len());
        for name in &names {
            types.push(self.load_type(name)?.clone());
        }
        Ok(LoadedTypes {
            types,
            merger: self.merger,
        })
    }

    /// Load the selected types and merge their data in selection order.
    pub fn merge(&mut self, selection: impl Into<TypeSelection>) -> Result<Value, ConfigError> {
        self.merge_by(selection, |config_type| config_type.data.clone())
    }

    /// Load the selected types and merge `selector(type)` in selection order.
    pub fn merge_by<F>(
        &mut self,
        selection: impl Into<TypeSelection>,
        selector: F,
    ) -> Result<Value, ConfigError>
    where
        F: Fn(&ConfigType) -> Value,
    {
        let loaded = self.load(selection)?;
        let merged = loaded.merge_by(selector);
        info!("merged config types (types={})", loaded.len());
        Ok(merged)
    }

    /// Merge the selected types over `defaults`, which act as the lowest layer.
    pub fn merge_over(
        &mut self,
        selection: impl Into<TypeSelection>,
        defaults: &Value,
    ) -> Result<Value, ConfigError> {
        let merged = self.merge(selection)?;
        Ok(self.merger.merge_pair(defaults, &merged))
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("config", &self.config)
            .field("loaders", &self.loaders)
            .field("types", &self.order)
            .finish()
    }
}

/// Types returned by [`ConfigStore::load`], in the order they were requested.
#[derive(Debug, Clone)]
pub struct LoadedTypes {
    types: Vec<ConfigType>,
    merger: ValueMerger,
}

impl LoadedTypes {
    /// Loaded type `name`, if it was requested.
    pub fn get(&self, name: &str) -> Option<&ConfigType> {
        self.types.iter().find(|config_type| config_type.name == name)
    }

    /// Loaded types in request order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigType> {
        self.types.iter()
    }

    /// Requested names in order.
    pub fn names(&self) -> Vec<&str> {
        self.types.iter().map(|config_type| config_type.name.as_str()).collect()
    }

    /// Number of loaded types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types were loaded.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Merge the data of the loaded types in request order.
    pub fn merge(&self) -> Value {
        self.merge_by(|config_type| config_type.data.clone())
    }

    /// Merge `selector(type)` for the loaded types in request order.
    pub fn merge_by<F>(&self, selector: F) -> Value
    where
        F: Fn(&ConfigType) -> Value,
    {
        self.types
            .iter()
            .fold(Value::Object(Map::new()), |acc, config_type| {
                self.merger.merge_pair(&acc, &selector(config_type))
            })
    }
}

impl<'a> IntoIterator for &'a LoadedTypes {
    type Item = &'a ConfigType;
    type IntoIter = std::slice::Iter<'a, ConfigType>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

/// Build one registration layer; empty patterns are left out so they never
/// shadow a lower layer.
///
/// `cwd` stays out of the layer since paths need not be valid UTF-8; the
/// caller carries it across separately.
fn settings_layer(
    patterns: &[String],
    options: &crate::TypeOptions,
    data: Option<&Value>,
) -> Result<Value, ConfigError> {
    let mut layer = Map::new();
    if !patterns.is_empty() {
        layer.insert("patterns".to_string(), json!(patterns));
    }
    let options = crate::TypeOptions {
        cwd: None,
        ignore: options.ignore.clone(),
        extra: options.extra.clone(),
    };
    layer.insert("options".to_string(), serde_json::to_value(&options)?);
    if let Some(data) = data {
        layer.insert("data".to_string(), data.clone());
    }
    Ok(Value::Object(layer))
}
