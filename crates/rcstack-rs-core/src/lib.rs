//! Multi-source config discovery and deep merging.
//!
//! Config types name a set of glob patterns under a base directory. The store
//! resolves each type's files, parses them with the loader registered for
//! their extension and deep-merges the results, first per type and then across
//! types in the order requested.

mod error;
pub mod loader;
pub mod merge;
pub mod presets;
pub mod resolver;
mod store;
mod types;

/// Public error type returned by resolution, loading and merging.
pub use error::ConfigError;
/// Loader registry and the module-evaluation capability.
pub use loader::{CommandModuleLoader, Loader, LoaderRegistry, ModuleLoader};
/// Deep-merge engine.
pub use merge::{ArrayPolicy, ValueMerger, merge_values};
/// Glob matching seam and its walking implementation.
pub use resolver::{GlobService, WalkGlobService};
/// Store and load results.
pub use store::{ConfigStore, LoadedTypes, TypeSelection};
/// Type records and settings.
pub use types::{
    ConfigFile, ConfigType, FilterFn, ResolvedFn, StoreConfig, TransformFn, TypeOptions,
    TypeSettings,
};
