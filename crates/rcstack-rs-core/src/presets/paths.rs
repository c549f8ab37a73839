//! Default directories for the conventional config types.

use directories::UserDirs;
use log::debug;
use std::env;
use std::path::{Path, PathBuf};

/// Manifest file looked up by the package type.
pub const PACKAGE_MANIFEST: &str = "package.json";

#[cfg(unix)]
/// Prefix used for global packages when no override is set on Unix.
const DEFAULT_GLOBAL_PREFIX: &str = "/usr/local";

/// Current user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Directory holding globally installed packages.
///
/// Uses `$NPM_CONFIG_PREFIX` or `$PREFIX` when set; otherwise `%APPDATA%\npm`
/// on Windows and `/usr/local` elsewhere. On Unix the packages live under
/// `lib/node_modules` of the prefix, on Windows under `node_modules`.
pub fn global_modules_dir() -> Option<PathBuf> {
    let prefix = ["NPM_CONFIG_PREFIX", "npm_config_prefix", "PREFIX"]
        .iter()
        .find_map(|key| env::var_os(key).filter(|value| !value.is_empty()))
        .map(PathBuf::from)
        .or_else(default_global_prefix)?;
    Some(modules_under_prefix(&prefix))
}

#[cfg(windows)]
fn default_global_prefix() -> Option<PathBuf> {
    env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join("npm"))
}

#[cfg(unix)]
fn default_global_prefix() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_GLOBAL_PREFIX))
}

#[cfg(not(any(unix, windows)))]
fn default_global_prefix() -> Option<PathBuf> {
    None
}

fn modules_under_prefix(prefix: &Path) -> PathBuf {
    if cfg!(windows) {
        prefix.join("node_modules")
    } else {
        prefix.join("lib").join("node_modules")
    }
}

/// Walk from `start` up to the filesystem root looking for a package manifest.
pub fn find_package_json(start: &Path) -> Option<PathBuf> {
    for ancestor in start.ancestors() {
        let candidate = ancestor.join(PACKAGE_MANIFEST);
        if candidate.is_file() {
            debug!("found package manifest: {}", candidate.display());
            return Some(candidate);
        }
    }
    None
}
