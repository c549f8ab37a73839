//! Config type records, registration settings and matched file handles.

use crate::ConfigError;
use crate::merge::ArrayPolicy;
use crate::loader::ModuleLoader;
use crate::resolver::GlobService;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Predicate deciding whether a matched file takes part in a type.
pub type FilterFn = Arc<dyn Fn(&ConfigFile) -> bool + Send + Sync>;

/// Per-type transform whose result replaces the loader output for a file.
pub type TransformFn =
    Arc<dyn Fn(&ConfigFile, &ConfigType) -> Result<Value, ConfigError> + Send + Sync>;

/// Callback invoked with the files resolved for a type.
pub type ResolvedFn = Arc<dyn Fn(&str, &[ConfigFile]) + Send + Sync>;

/// Handle to one matched config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Base directory the file was resolved under.
    pub cwd: PathBuf,
    /// Value produced for this file by the last load (`Null` until loaded).
    pub data: Value,
}

impl ConfigFile {
    /// Create a handle for `path` resolved under `cwd`.
    pub fn new(path: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cwd: cwd.into(),
            data: Value::Null,
        }
    }

    /// Directory containing the file.
    pub fn dirname(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name including extension, e.g. `.cfgrc.json`.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension, e.g. `.cfgrc`.
    pub fn stem(&self) -> String {
        let basename = self.basename();
        let extname = self.extname();
        basename[..basename.len() - extname.len()].to_string()
    }

    /// Extension with its leading dot, or an empty string.
    ///
    /// A leading dot alone does not start an extension, so `.cfgrc` has none.
    pub fn extname(&self) -> String {
        let basename = self.basename();
        match basename.rfind('.') {
            Some(0) | None => String::new(),
            Some(idx) => basename[idx..].to_string(),
        }
    }
}

/// Options controlling where and how a type's patterns are matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeOptions {
    /// Base directory for the patterns; the process cwd when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Globs excluding otherwise matched files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
    /// Free-form options carried through to the glob service.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TypeOptions {
    /// Options rooted at `cwd`.
    pub fn in_dir(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: Some(cwd.as_ref().to_path_buf()),
            ..Self::default()
        }
    }
}

/// Caller-supplied settings for registering a config type.
#[derive(Clone, Default)]
pub struct TypeSettings {
    /// Glob patterns, matched in order.
    pub patterns: Vec<String>,
    /// Matching options; merged over store-level options.
    pub options: TypeOptions,
    /// Data the type starts from before any file is folded in.
    pub data: Option<Value>,
    /// Optional file filter.
    pub filter: Option<FilterFn>,
    /// Optional per-file transform.
    pub load: Option<TransformFn>,
}

impl TypeSettings {
    /// Settings matching a single pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::patterns([pattern])
    }

    /// Settings matching the given patterns in order.
    pub fn patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Resolve patterns under `cwd`.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.options.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Replace the matching options.
    pub fn options(mut self, options: TypeOptions) -> Self {
        self.options = options;
        self
    }

    /// Seed data for the type.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Keep only files accepted by `filter`.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ConfigFile) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Replace each file's loaded value with the output of `load`.
    pub fn load<F>(mut self, load: F) -> Self
    where
        F: Fn(&ConfigFile, &ConfigType) -> Result<Value, ConfigError> + Send + Sync + 'static,
    {
        self.load = Some(Arc::new(load));
        self
    }
}

impl fmt::Debug for TypeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSettings")
            .field("patterns", &self.patterns)
            .field("options", &self.options)
            .field("data", &self.data)
            .field("filter", &self.filter.is_some())
            .field("load", &self.load.is_some())
            .finish()
    }
}

/// Serializable part of a type record, merged layer by layer at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct TypeRecord {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub options: TypeOptions,
    #[serde(default)]
    pub data: Value,
}

/// A named, independently resolvable source of configuration.
#[derive(Clone)]
pub struct ConfigType {
    /// Unique name within the store.
    pub name: String,
    /// Glob patterns, matched in order.
    pub patterns: Vec<String>,
    /// Matching options.
    pub options: TypeOptions,
    /// Optional file filter.
    pub filter: Option<FilterFn>,
    /// Optional per-file transform.
    pub load: Option<TransformFn>,
    /// Files resolved by the last load.
    pub files: Vec<ConfigFile>,
    /// Data merged from the files of the last load.
    pub data: Value,
    /// Data the type was registered with; every load starts from it.
    pub(crate) seed: Value,
}

impl ConfigType {
    /// Base directory used for resolution, falling back to the process cwd.
    ///
    /// The process cwd is only consulted when the type's cwd is relative or unset.
    pub fn base_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(match &self.options.cwd {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => std::env::current_dir()?.join(dir),
            None => std::env::current_dir()?,
        })
    }
}

impl fmt::Debug for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigType")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .field("options", &self.options)
            .field("filter", &self.filter.is_some())
            .field("load", &self.load.is_some())
            .field("files", &self.files)
            .field("data", &self.data)
            .finish()
    }
}

/// Store-level settings applied beneath every registered type.
#[derive(Clone)]
pub struct StoreConfig {
    /// Patterns unioned into every type's patterns.
    pub patterns: Vec<String>,
    /// Options every type's options are merged over.
    pub options: TypeOptions,
    /// Filter used by types that do not set their own.
    pub filter: Option<FilterFn>,
    /// Transform used by types that do not set their own.
    pub load: Option<TransformFn>,
    /// Register the JSON/JSON5/YAML loaders on construction.
    pub builtin_loaders: bool,
    /// Evaluator for executable config modules.
    pub module_loader: Option<Arc<dyn ModuleLoader>>,
    /// Extensions routed to `module_loader`.
    pub module_extensions: Vec<String>,
    /// Array policy used for every merge done by the store.
    pub array_policy: ArrayPolicy,
    /// Glob matching service; the walking globset matcher when unset.
    pub glob_service: Option<Arc<dyn GlobService>>,
    /// Observer notified with each resolved file set.
    pub on_resolved: Option<ResolvedFn>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            options: TypeOptions::default(),
            filter: None,
            load: None,
            builtin_loaders: true,
            module_loader: None,
            module_extensions: [".js", ".cjs", ".mjs"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            array_policy: ArrayPolicy::default(),
            glob_service: None,
            on_resolved: None,
        }
    }
}

impl StoreConfig {
    /// Create a store config with built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every type under `cwd` unless it sets its own.
    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.options.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Union `pattern` into every type's patterns.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Default filter for types without one.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ConfigFile) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Skip registering the built-in loaders.
    pub fn without_builtin_loaders(mut self) -> Self {
        self.builtin_loaders = false;
        self
    }

    /// Evaluate executable config modules with `loader`.
    pub fn with_module_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.module_loader = Some(loader);
        self
    }

    /// Array policy used for every merge.
    pub fn with_array_policy(mut self, policy: ArrayPolicy) -> Self {
        self.array_policy = policy;
        self
    }

    /// Replace the glob matching service.
    pub fn with_glob_service(mut self, service: Arc<dyn GlobService>) -> Self {
        self.glob_service = Some(service);
        self
    }

    /// Observe each resolved file set.
    pub fn on_resolved<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &[ConfigFile]) + Send + Sync + 'static,
    {
        self.on_resolved = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("patterns", &self.patterns)
            .field("options", &self.options)
            .field("builtin_loaders", &self.builtin_loaders)
            .field("module_loader", &self.module_loader.is_some())
            .field("module_extensions", &self.module_extensions)
            .field("array_policy", &self.array_policy)
            .finish_non_exhaustive()
    }
}
