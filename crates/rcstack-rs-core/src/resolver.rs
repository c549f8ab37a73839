//! Resolution of a config type's patterns into matched files.

use crate::{ConfigError, ConfigFile, ConfigType, TypeOptions};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Matches glob patterns under a base directory.
pub trait GlobService: Send + Sync {
    /// Return paths relative to `base_dir` matching `patterns`, in match order.
    fn matches(
        &self,
        patterns: &[String],
        base_dir: &Path,
        options: &TypeOptions,
    ) -> Result<Vec<PathBuf>, ConfigError>;
}

/// Glob service that walks the base directory with `walkdir` and matches with
/// `globset`.
///
/// Patterns are applied in order; within a pattern, entries are visited sorted
/// by file name. A file matched by an earlier pattern is not repeated. `*` and
/// `?` never match a path separator.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkGlobService;

impl WalkGlobService {
    /// Create the walking glob service.
    pub fn new() -> Self {
        Self
    }
}

impl GlobService for WalkGlobService {
    fn matches(
        &self,
        patterns: &[String],
        base_dir: &Path,
        options: &TypeOptions,
    ) -> Result<Vec<PathBuf>, ConfigError> {
        if !base_dir.is_dir() {
            debug!(
                "base directory missing; nothing to match (base_dir={})",
                base_dir.display()
            );
            return Ok(Vec::new());
        }

        let ignore = build_set(&options.ignore)?;
        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for pattern in patterns {
            let matcher = compile(pattern)?.compile_matcher();
            let walker = WalkDir::new(base_dir)
                .follow_links(true)
                .min_depth(1)
                .max_depth(pattern_depth(pattern))
                .sort_by_file_name();
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) if err.loop_ancestor().is_some() => {
                        debug!("skipping symlink loop (path={:?})", err.path());
                        continue;
                    }
                    Err(err)
                        if err
                            .io_error()
                            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) =>
                    {
                        debug!("skipping dangling symlink (path={:?})", err.path());
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                };
                if entry.file_type().is_dir() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(base_dir)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                if !matcher.is_match(&relative) || ignore.is_match(&relative) {
                    continue;
                }
                if seen.insert(relative.clone()) {
                    matches.push(relative);
                }
            }
        }

        Ok(matches)
    }
}

/// Resolve `config_type` into ordered, filtered file handles.
pub fn resolve_files(
    config_type: &ConfigType,
    glob: &dyn GlobService,
) -> Result<Vec<ConfigFile>, ConfigError> {
    let base_dir = config_type.base_dir()?;
    let matches = glob.matches(&config_type.patterns, &base_dir, &config_type.options)?;
    debug!(
        "glob matched (type={}, base_dir={}, matches={})",
        config_type.name,
        base_dir.display(),
        matches.len()
    );

    let mut files = Vec::with_capacity(matches.len());
    for relative in matches {
        let path = if relative.is_absolute() {
            relative
        } else {
            base_dir.join(relative)
        };
        let file = ConfigFile::new(path, &base_dir);
        if config_type
            .filter
            .as_ref()
            .is_some_and(|filter| !filter(&file))
        {
            debug!("filtered out config file (path={})", file.path.display());
            continue;
        }
        files.push(file);
    }
    Ok(files)
}

/// Drop leading `./` segments; walked paths never carry them.
fn strip_current_dir(pattern: &str) -> &str {
    let mut pattern = pattern;
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.trim_start_matches('/');
    }
    pattern
}

fn compile(pattern: &str) -> Result<Glob, ConfigError> {
    Ok(GlobBuilder::new(strip_current_dir(pattern))
        .literal_separator(true)
        .backslash_escape(true)
        .build()?)
}

fn build_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile(pattern)?);
    }
    Ok(builder.build()?)
}

/// Deepest walk needed to match `pattern`; unbounded when it contains `**`.
fn pattern_depth(pattern: &str) -> usize {
    if pattern.contains("**") {
        usize::MAX
    } else {
        strip_current_dir(pattern)
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .count()
    }
}
