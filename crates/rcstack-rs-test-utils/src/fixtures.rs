use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory tree for config fixtures, removed on drop.
pub struct FixtureTree {
    dir: TempDir,
}

impl FixtureTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `contents` at `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn write_json(&self, relative: &str, value: &Value) -> PathBuf {
        let contents = serde_json::to_string_pretty(value).expect("serialize fixture");
        self.write(relative, &contents)
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("create fixture dir");
        path
    }
}

impl Default for FixtureTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the rc-file layout of a tool named `tool`:
///
/// - `cwd/`: `.{tool}rc.json`, `.{tool}rc.yml`, `package.json`
/// - `other/`: `.{tool}rc.json`
/// - `cwd/node_modules/{tool}-config-a/`: `.{tool}rc.json`, `.{tool}rc.yml`
/// - `home/`: `.{tool}rc.json`
/// - `global/{tool}-config-b/`: `index.json`, `extra.yaml`
pub fn sample_tree(tool: &str) -> FixtureTree {
    let tree = FixtureTree::new();
    tree.write(
        &format!("cwd/.{tool}rc.json"),
        r#"{ "layout": true, "list": ["one", "two"], "scope": "cwd" }"#,
    );
    tree.write(
        &format!("cwd/.{tool}rc.yml"),
        "list:\n  - two\n  - three\ntags:\n  - a\n  - b\n  - c\n",
    );
    tree.write(
        "cwd/package.json",
        &format!(r#"{{ "name": "sample", "{tool}": {{ "scope": "package", "pkg": true }} }}"#),
    );
    tree.write(
        &format!("other/.{tool}rc.json"),
        r#"{ "list": ["four", "five", "six"], "scope": "other" }"#,
    );
    tree.write(
        &format!("cwd/node_modules/{tool}-config-a/.{tool}rc.json"),
        r#"{ "items": ["four", "five"], "scope": "local" }"#,
    );
    tree.write(
        &format!("cwd/node_modules/{tool}-config-a/.{tool}rc.yml"),
        "items:\n  - six\ncategories: [x, y, z]\n",
    );
    tree.write(
        &format!("home/.{tool}rc.json"),
        r#"{ "home": true, "foo": ["bar", "baz", "qux"], "scope": "home" }"#,
    );
    tree.write(
        &format!("global/{tool}-config-b/index.json"),
        r#"{ "global": true, "ggg": ["aaa", "bbb"], "scope": "global" }"#,
    );
    tree.write(
        &format!("global/{tool}-config-b/extra.yaml"),
        "ggg:\n  - ccc\n",
    );
    tree
}
