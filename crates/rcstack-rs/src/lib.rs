//! Public surface for rcstack.
//!
//! Re-exports the config store and its building blocks, plus a helper that
//! merges the conventional rc-file locations of a tool in one call.

pub use rcstack_rs_core as core;
pub use rcstack_rs_core::presets::{self, PresetOptions};
pub use rcstack_rs_core::{
    ArrayPolicy, CommandModuleLoader, ConfigError, ConfigFile, ConfigStore, ConfigType,
    GlobService, LoadedTypes, Loader, LoaderRegistry, ModuleLoader, StoreConfig, TypeOptions,
    TypeSelection, TypeSettings, ValueMerger, WalkGlobService, merge_values,
};

use log::info;
use serde_json::Value;

/// Install `env_logger` as the log backend when built with `logging`.
///
/// Safe to call more than once; without the feature it does nothing.
#[inline]
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

/// Merge the conventional config locations of the tool `name`.
///
/// Sources merge from lowest to highest precedence: global packages, local
/// packages, home, cwd, then the `name` field of the nearest `package.json`.
pub fn load_tool_config(name: &str, options: PresetOptions) -> Result<Value, ConfigError> {
    let mut store = presets::conventional(name, options)?;
    let merged = store.merge(TypeSelection::All)?;
    info!(
        "tool config merged (tool={}, types={})",
        name,
        store.type_names().len()
    );
    Ok(merged)
}
