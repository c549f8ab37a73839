use parking_lot::Mutex;
use rcstack_rs_core::{ConfigError, GlobService, TypeOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments of one call to [`StaticGlobService::matches`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlobCall {
    pub patterns: Vec<String>,
    pub base_dir: PathBuf,
    pub options: TypeOptions,
}

/// Glob service returning a fixed list of matches and recording its calls.
#[derive(Debug, Clone, Default)]
pub struct StaticGlobService {
    matches: Vec<PathBuf>,
    calls: Arc<Mutex<Vec<GlobCall>>>,
}

impl StaticGlobService {
    pub fn new<I, P>(matches: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            matches: matches.into_iter().map(Into::into).collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<GlobCall> {
        self.calls.lock().clone()
    }
}

impl GlobService for StaticGlobService {
    fn matches(
        &self,
        patterns: &[String],
        base_dir: &Path,
        options: &TypeOptions,
    ) -> Result<Vec<PathBuf>, ConfigError> {
        self.calls.lock().push(GlobCall {
            patterns: patterns.to_vec(),
            base_dir: base_dir.to_path_buf(),
            options: options.clone(),
        });
        Ok(self.matches.clone())
    }
}
