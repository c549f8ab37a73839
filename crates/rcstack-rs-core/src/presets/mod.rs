//! Conventional config types for package-based tools.
//!
//! A tool named `fixture` reads, from lowest to highest precedence:
//! `fixture-config-*` packages installed globally, the same packages installed
//! in `./node_modules`, `~/.fixturerc.*`, `./.fixturerc.*`, and the `fixture`
//! field of the nearest `package.json`.

mod paths;

use crate::{ConfigError, ConfigStore, StoreConfig, TypeSettings};
use log::debug;
use serde_json::Value;
use std::path::PathBuf;

pub use paths::{PACKAGE_MANIFEST, find_package_json, global_modules_dir, home_dir};

/// Extensions matched by the rc-file patterns.
const RC_EXTENSIONS: &str = "{json,yaml,yml}";

/// Directory overrides for [`conventional`].
#[derive(Debug, Default)]
pub struct PresetOptions {
    /// Working directory; the process cwd when unset.
    pub cwd: Option<PathBuf>,
    /// Home directory; the current user's home when unset.
    pub home: Option<PathBuf>,
    /// Global package directory; derived from the npm prefix when unset.
    pub global: Option<PathBuf>,
    /// Store-level settings for the returned store.
    pub store: StoreConfig,
}

impl PresetOptions {
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_global(mut self, global: impl Into<PathBuf>) -> Self {
        self.global = Some(global.into());
        self
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

/// Build a store with the `global`, `local`, `home`, `cwd` and `package`
/// types registered for the tool `name`, in that order.
///
/// `global` and `home` are skipped when their directory cannot be determined.
pub fn conventional(name: &str, options: PresetOptions) -> Result<ConfigStore, ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "expected a non-empty tool name".to_string(),
        ));
    }

    let process_cwd = std::env::current_dir()?;
    let cwd = match options.cwd {
        Some(dir) if dir.is_relative() => process_cwd.join(dir),
        Some(dir) => dir,
        None => process_cwd,
    };
    let rc_pattern = format!(".{name}rc.{RC_EXTENSIONS}");
    let mut store = ConfigStore::new(options.store)?;

    match options.global.or_else(global_modules_dir) {
        Some(global) => {
            store.set_type(
                "global",
                TypeSettings::pattern(format!("{name}-config-*/*.{RC_EXTENSIONS}")).cwd(global),
            )?;
        }
        None => debug!("global module directory unknown; skipping global type"),
    }

    store.set_type(
        "local",
        TypeSettings::pattern(format!("{name}-config-*/{rc_pattern}"))
            .cwd(cwd.join("node_modules")),
    )?;

    match options.home.or_else(home_dir) {
        Some(home) => {
            store.set_type("home", TypeSettings::pattern(rc_pattern.as_str()).cwd(home))?;
        }
        None => debug!("home directory unknown; skipping home type"),
    }

    store.set_type("cwd", TypeSettings::pattern(rc_pattern.as_str()).cwd(&cwd))?;

    let package_dir = find_package_json(&cwd)
        .and_then(|manifest| manifest.parent().map(PathBuf::from))
        .unwrap_or_else(|| cwd.clone());
    let field = name.to_string();
    store.set_type(
        "package",
        TypeSettings::pattern(PACKAGE_MANIFEST)
            .cwd(package_dir)
            .load(move |file, _| Ok(file.data.get(&field).cloned().unwrap_or(Value::Null))),
    )?;

    Ok(store)
}
