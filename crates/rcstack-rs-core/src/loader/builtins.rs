//! Built-in loaders for structured data files.

use crate::{ConfigError, ConfigFile, ConfigType};
use log::debug;
use serde_json::Value;
use std::fs;

/// Parse a strict JSON file.
pub(super) fn load_json(file: &ConfigFile, _config_type: &ConfigType) -> Result<Value, ConfigError> {
    debug!("loading json config (path={})", file.path.display());
    let contents = fs::read_to_string(&file.path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Parse a JSON5 file (comments, trailing commas, unquoted keys).
pub(super) fn load_json5(
    file: &ConfigFile,
    _config_type: &ConfigType,
) -> Result<Value, ConfigError> {
    debug!("loading json5 config (path={})", file.path.display());
    let contents = fs::read_to_string(&file.path)?;
    Ok(json5::from_str(&contents)?)
}

/// Parse a YAML file; an empty document loads as `null`.
pub(super) fn load_yaml(file: &ConfigFile, _config_type: &ConfigType) -> Result<Value, ConfigError> {
    debug!("loading yaml config (path={})", file.path.display());
    let contents = fs::read_to_string(&file.path)?;
    if contents.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_yaml::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn sample_type() -> ConfigType {
        ConfigType {
            name: "sample".to_string(),
            patterns: vec!["*".to_string()],
            options: TypeOptions::default(),
            filter: None,
            load: None,
            files: Vec::new(),
            data: json!({}),
            seed: json!({}),
        }
    }

    fn write(dir: &Path, name: &str, contents: &str) -> ConfigFile {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write");
        ConfigFile::new(path, dir)
    }

    #[test]
    fn json_loader_parses_objects() {
        let temp = TempDir::new().expect("tmp");
        let file = write(temp.path(), "a.json", r#"{ "list": ["one"] }"#);
        let value = load_json(&file, &sample_type()).expect("json");
        assert_eq!(value, json!({ "list": ["one"] }));
    }

    #[test]
    fn json_loader_reports_parse_errors() {
        let temp = TempDir::new().expect("tmp");
        let file = write(temp.path(), "bad.json", "{ nope");
        let err = load_json(&file, &sample_type()).unwrap_err();
        assert!(matches!(err, ConfigError::DecodeFailed(_)));
    }

    #[test]
    fn json5_loader_accepts_relaxed_syntax() {
        let temp = TempDir::new().expect("tmp");
        let file = write(temp.path(), "a.json5", "{ // note\n layout: true, }");
        let value = load_json5(&file, &sample_type()).expect("json5");
        assert_eq!(value, json!({ "layout": true }));
    }

    #[test]
    fn yaml_loader_parses_mappings() {
        let temp = TempDir::new().expect("tmp");
        let file = write(temp.path(), "a.yml", "list:\n  - two\n  - three\ntags: [a]\n");
        let value = load_yaml(&file, &sample_type()).expect("yaml");
        assert_eq!(value, json!({ "list": ["two", "three"], "tags": ["a"] }));
    }

    #[test]
    fn empty_yaml_loads_as_null() {
        let temp = TempDir::new().expect("tmp");
        let file = write(temp.path(), "empty.yaml", "\n");
        assert_eq!(load_yaml(&file, &sample_type()).expect("yaml"), Value::Null);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let file = ConfigFile::new("/definitely/not/here.json", "/");
        let err = load_json(&file, &sample_type()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed(_)));
    }
}
