//! Executable config modules.
//!
//! Some tools keep config in a script whose exported value is the config.
//! Evaluating such a file is the embedder's business; the store only needs a
//! [`ModuleLoader`] that turns a path into a value. Every call must observe the
//! file as it is on disk at that moment, so implementations keep no cache.

use crate::ConfigError;
use log::debug;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

/// Script handed to `node -e` to print a module's export as JSON.
const NODE_EXPORT_SCRIPT: &str = "const p = require('path').resolve(process.argv[1]);\
const m = require(p);\
const v = m && m.__esModule && m.default !== undefined ? m.default : m;\
process.stdout.write(JSON.stringify(v === undefined ? null : v));";

/// Capability for evaluating an executable config module.
pub trait ModuleLoader: Send + Sync {
    /// Evaluate the module at `path` and return its exported value.
    fn load_module(&self, path: &Path) -> Result<Value, ConfigError>;
}

/// Evaluates modules by running an interpreter and reading JSON from stdout.
///
/// The module path is appended as the last argument. A fresh process per call
/// keeps results in step with the file on disk.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandModuleLoader {
    program: String,
    args: Vec<String>,
}

impl CommandModuleLoader {
    /// Run `program` with `args`, then the module path.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluate CommonJS modules with `node`.
    pub fn node() -> Self {
        Self::new("node", ["-e", NODE_EXPORT_SCRIPT])
    }
}

impl fmt::Debug for CommandModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandModuleLoader")
            .field("program", &self.program)
            .field("args_len", &self.args.len())
            .finish()
    }
}

impl ModuleLoader for CommandModuleLoader {
    fn load_module(&self, path: &Path) -> Result<Value, ConfigError> {
        debug!(
            "evaluating config module (program={}, path={})",
            self.program,
            path.display()
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConfigError::Module {
                path: path.display().to_string(),
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(stdout.trim())?)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_output_is_parsed_as_json() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("module.sh");
        fs::write(&path, "echo '{\"from\": \"module\"}'").expect("write");

        let loader = CommandModuleLoader::new("sh", Vec::<String>::new());
        assert_eq!(
            loader.load_module(&path).expect("module"),
            json!({ "from": "module" })
        );
    }

    #[test]
    fn each_call_sees_current_contents() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("module.sh");
        let loader = CommandModuleLoader::new("sh", Vec::<String>::new());

        fs::write(&path, "echo '{\"n\": 1}'").expect("write");
        assert_eq!(loader.load_module(&path).expect("first"), json!({ "n": 1 }));

        fs::write(&path, "echo '{\"n\": 2}'").expect("rewrite");
        assert_eq!(loader.load_module(&path).expect("second"), json!({ "n": 2 }));
    }

    #[test]
    fn failing_module_reports_path() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("broken.sh");
        fs::write(&path, "echo boom >&2; exit 3").expect("write");

        let loader = CommandModuleLoader::new("sh", Vec::<String>::new());
        let err = loader.load_module(&path).unwrap_err();
        match err {
            ConfigError::Module { path: reported, message } => {
                assert!(reported.ends_with("broken.sh"));
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
