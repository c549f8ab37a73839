//! Error types for config resolution, loading and merging.

use thiserror::Error;

/// Errors returned by the config store and its collaborators.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Registration input violated a contract (empty name, empty patterns, etc).
    #[error("invalid config: {0}")]
    Validation(String),
    /// An operation referenced a config type that was never registered.
    #[error("config type \"{0}\" does not exist")]
    UnknownType(String),
    /// No loader is registered for a matched file's extension.
    #[error("no loaders are registered for: {extension}")]
    LoaderNotFound { extension: String },
    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),
    /// Walking a base directory failed.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a JSON5 config file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Parsing or converting JSON values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// Parsing a YAML config file failed.
    #[error("failed to parse yaml config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Evaluating an executable config module failed.
    #[error("failed to evaluate module {path}: {message}")]
    Module { path: String, message: String },
    /// A custom loader or transform reported a failure.
    #[error("failed to load {path}: {message}")]
    LoaderFailed { path: String, message: String },
}
