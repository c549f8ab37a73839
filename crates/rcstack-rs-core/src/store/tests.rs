//! Tests for config type registration, loading and merging.

use super::*;
use crate::ArrayPolicy;
use crate::TypeOptions;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write contents to a path, creating parent directories if needed.
fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Lay out the rc files used by most tests under `root/cwd`.
fn cwd_fixture(root: &Path) {
    write(root, "cwd/.cfgrc.json", r#"{ "list": ["one", "two"] }"#);
    write(
        root,
        "cwd/.cfgrc.yml",
        "list:\n  - two\n  - three\ntags:\n  - a\n",
    );
}

fn rc_type(dir: impl AsRef<Path>) -> TypeSettings {
    TypeSettings::pattern(".cfgrc.{json,yml}").cwd(dir)
}

#[test]
fn set_type_rejects_empty_name() {
    let mut store = ConfigStore::default();
    let err = store.set_type("  ", TypeSettings::pattern("*.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn set_type_rejects_missing_patterns() {
    let mut store = ConfigStore::default();
    let err = store.set_type("empty", TypeSettings::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(store.get_type("empty").is_err());
}

#[test]
fn set_type_layers_store_options_under_type_options() {
    let mut options = TypeOptions::in_dir("/fixtures");
    options.extra.insert("foo".to_string(), json!("bar"));
    let config = StoreConfig {
        options,
        ..StoreConfig::default()
    };
    let mut store = ConfigStore::new(config).expect("store");

    let mut type_options = TypeOptions::default();
    type_options.extra.insert("baz".to_string(), json!("qux"));
    store
        .set_type(
            "cwd",
            TypeSettings::pattern(".foorc.json").options(type_options),
        )
        .expect("set");

    let config_type = store.get_type("cwd").expect("type");
    assert_eq!(config_type.patterns, vec![".foorc.json"]);
    assert_eq!(
        config_type.options.cwd.as_deref(),
        Some(Path::new("/fixtures"))
    );
    assert_eq!(config_type.options.extra.get("foo"), Some(&json!("bar")));
    assert_eq!(config_type.options.extra.get("baz"), Some(&json!("qux")));
    assert!(config_type.files.is_empty());
    assert_eq!(config_type.data, json!({}));
}

#[test]
fn store_patterns_union_with_type_patterns() {
    let config = StoreConfig::new().with_pattern("shared.json");
    let mut store = ConfigStore::new(config).expect("store");
    store
        .set_type("a", TypeSettings::patterns(["a.json", "shared.json"]))
        .expect("set");
    store.set_type("b", TypeSettings::default()).expect("set");

    assert_eq!(
        store.get_type("a").expect("a").patterns,
        vec!["shared.json", "a.json"]
    );
    assert_eq!(store.get_type("b").expect("b").patterns, vec!["shared.json"]);
}

#[test]
fn re_registering_replaces_but_keeps_position() {
    let mut store = ConfigStore::default();
    store.set_type("first", TypeSettings::pattern("1.json")).expect("set");
    store.set_type("second", TypeSettings::pattern("2.json")).expect("set");
    store.set_type("first", TypeSettings::pattern("one.json")).expect("set");

    assert_eq!(store.type_names().to_vec(), vec!["first", "second"]);
    assert_eq!(store.get_type("first").expect("first").patterns, vec!["one.json"]);
}

#[test]
fn config_type_reads_and_writes() {
    let mut store = ConfigStore::default();
    assert!(matches!(
        store.config_type("missing", None),
        Err(ConfigError::UnknownType(name)) if name == "missing"
    ));

    let written = store
        .config_type("cwd", Some(TypeSettings::pattern(".cfgrc.json")))
        .expect("write")
        .patterns
        .clone();
    let read = store.config_type("cwd", None).expect("read").patterns.clone();
    assert_eq!(written, read);
}

#[test]
fn unknown_type_errors_for_every_operation() {
    let mut store = ConfigStore::default();
    assert!(matches!(store.resolve("foo"), Err(ConfigError::UnknownType(_))));
    assert!(matches!(store.load("foo"), Err(ConfigError::UnknownType(_))));
    assert!(matches!(store.merge("foo"), Err(ConfigError::UnknownType(_))));
    let err = store.merge("foo").unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn load_merges_files_in_resolution_order() {
    let temp = TempDir::new().expect("tmp");
    cwd_fixture(temp.path());

    let mut store = ConfigStore::default();
    store.set_type("cwd", rc_type(temp.path().join("cwd"))).expect("set");

    let loaded = store.load("cwd").expect("load");
    let config_type = loaded.get("cwd").expect("cwd");
    let names = config_type
        .files
        .iter()
        .map(ConfigFile::basename)
        .collect::<Vec<_>>();
    assert_eq!(names, vec![".cfgrc.json", ".cfgrc.yml"]);
    assert_eq!(
        config_type.data,
        json!({ "list": ["one", "two", "three"], "tags": ["a"] })
    );
    assert_eq!(config_type.files[0].data, json!({ "list": ["one", "two"] }));
}

#[test]
fn filter_removes_files_and_their_data() {
    let temp = TempDir::new().expect("tmp");
    cwd_fixture(temp.path());

    let mut store = ConfigStore::default();
    store
        .set_type(
            "cwd",
            rc_type(temp.path().join("cwd")).filter(|file| file.extname() != ".yml"),
        )
        .expect("set");

    let config_type = store.load_type("cwd").expect("load");
    assert_eq!(config_type.files.len(), 1);
    assert_eq!(config_type.data, json!({ "list": ["one", "two"] }));
}

#[test]
fn store_filter_applies_to_types_without_one() {
    let temp = TempDir::new().expect("tmp");
    cwd_fixture(temp.path());

    let config = StoreConfig::new().with_filter(|file| file.extname() == ".yml");
    let mut store = ConfigStore::new(config).expect("store");
    store.set_type("cwd", rc_type(temp.path().join("cwd"))).expect("set");

    let files = store.resolve("cwd").expect("resolve");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].basename(), ".cfgrc.yml");
}

#[test]
fn transform_replaces_loader_output() {
    let temp = TempDir::new().expect("tmp");
    write(
        temp.path(),
        "package.json",
        r#"{ "name": "demo", "cfg": { "from": "package" } }"#,
    );

    let mut store = ConfigStore::default();
    store
        .set_type(
            "package",
            TypeSettings::pattern("package.json")
                .cwd(temp.path())
                .load(|file, _| Ok(file.data.get("cfg").cloned().unwrap_or(Value::Null))),
        )
        .expect("set");

    let config_type = store.load_type("package").expect("load");
    assert_eq!(config_type.data, json!({ "from": "package" }));
    assert_eq!(config_type.files[0].data, json!({ "from": "package" }));
}

#[test]
fn scalar_transform_results_are_discarded() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), "package.json", r#"{ "name": "demo" }"#);

    let mut store = ConfigStore::default();
    store
        .set_type(
            "package",
            TypeSettings::pattern("package.json")
                .cwd(temp.path())
                .data(json!({ "seeded": true }))
                .load(|_, _| Ok(json!(42))),
        )
        .expect("set");

    let config_type = store.load_type("package").expect("load");
    assert_eq!(config_type.data, json!({ "seeded": true }));
}

#[test]
fn transform_errors_abort_the_load() {
    let temp = TempDir::new().expect("tmp");
    cwd_fixture(temp.path());

    let mut store = ConfigStore::default();
    store
        .set_type(
            "cwd",
            rc_type(temp.path().join("cwd")).load(|file, _| {
                if file.extname() == ".yml" {
                    return Err(ConfigError::LoaderFailed {
                        path: file.path.display().to_string(),
                        message: "rejected".to_string(),
                    });
                }
                Ok(file.data.clone())
            }),
        )
        .expect("set");

    let err = store.load_type("cwd").unwrap_err();
    assert!(matches!(err, ConfigError::LoaderFailed { .. }));

    let partial = store.get_type("cwd").expect("type");
    assert_eq!(partial.files.len(), 2);
    assert_eq!(partial.data, json!({ "list": ["one", "two"] }));
}

#[test]
fn unregistered_extension_fails_with_loader_not_found() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), "custom.foo", r#"{ "worked": true }"#);

    let mut store = ConfigStore::default();
    store
        .set_type("custom", TypeSettings::pattern("*.foo").cwd(temp.path()))
        .expect("set");

    let err = store.load("custom").unwrap_err();
    match err {
        ConfigError::LoaderNotFound { extension } => assert_eq!(extension, ".foo"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn custom_loader_is_used_for_its_extension() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), "custom.foo", r#"{ "worked": true }"#);

    let mut store = ConfigStore::default();
    store
        .loader("foo", |file: &ConfigFile, _: &ConfigType| -> Result<Value, ConfigError> {
            let contents = fs::read_to_string(&file.path)?;
            Ok(serde_json::from_str(&contents)?)
        })
        .expect("loader")
        .set_type("custom", TypeSettings::pattern("*.foo").cwd(temp.path()))
        .expect("set");

    let loaded = store.load("custom").expect("load");
    let custom = loaded.get("custom").expect("custom");
    assert_eq!(custom.files.len(), 1);
    assert_eq!(custom.files[0].basename(), "custom.foo");
    assert_eq!(custom.data, json!({ "worked": true }));
}

#[test]
fn disabling_builtins_leaves_no_loaders() {
    let store = ConfigStore::new(StoreConfig::new().without_builtin_loaders()).expect("store");
    assert!(store.loaders().extensions().is_empty());
}

#[test]
fn reloading_observes_current_contents() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), ".cfgrc.json", r#"{ "mode": "first", "old": true }"#);

    let mut store = ConfigStore::default();
    store.set_type("cwd", rc_type(temp.path())).expect("set");
    store.load_type("cwd").expect("first load");

    write(temp.path(), ".cfgrc.json", r#"{ "mode": "second" }"#);
    let config_type = store.load_type("cwd").expect("second load");
    assert_eq!(config_type.data, json!({ "mode": "second" }));
}

#[test]
fn merge_order_decides_scalars_but_not_unions() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), "a/.cfgrc.json", r#"{ "foo": "first", "list": ["x"] }"#);
    write(temp.path(), "b/.cfgrc.json", r#"{ "foo": "last", "list": ["y"] }"#);

    let mut store = ConfigStore::default();
    store.set_type("a", rc_type(temp.path().join("a"))).expect("a");
    store.set_type("b", rc_type(temp.path().join("b"))).expect("b");

    let ab = store.merge(["a", "b"]).expect("ab");
    let ba = store.merge(["b", "a"]).expect("ba");
    assert_eq!(ab["foo"], json!("last"));
    assert_eq!(ba["foo"], json!("first"));
    assert_eq!(ab["list"], json!(["x", "y"]));
    assert_eq!(ba["list"], json!(["y", "x"]));
}

#[test]
fn merge_defaults_to_all_types_in_registration_order() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), "a/.cfgrc.json", r#"{ "foo": "a" }"#);
    write(temp.path(), "b/.cfgrc.json", r#"{ "foo": "b", "only_b": 1 }"#);

    let mut store = ConfigStore::default();
    store.set_type("a", rc_type(temp.path().join("a"))).expect("a");
    store.set_type("b", rc_type(temp.path().join("b"))).expect("b");

    let all = store.merge(TypeSelection::All).expect("all");
    assert_eq!(all, json!({ "foo": "b", "only_b": 1 }));
    assert_eq!(store.merge("*").expect("star"), all);
}

#[test]
fn loaded_types_merge_is_scoped_to_requested_names() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), "a/.cfgrc.json", r#"{ "a": true }"#);
    write(temp.path(), "b/.cfgrc.json", r#"{ "b": true }"#);

    let mut store = ConfigStore::default();
    store.set_type("a", rc_type(temp.path().join("a"))).expect("a");
    store.set_type("b", rc_type(temp.path().join("b"))).expect("b");

    let loaded = store.load("b").expect("load");
    assert_eq!(loaded.names(), vec!["b"]);
    assert_eq!(loaded.merge(), json!({ "b": true }));
}

#[test]
fn merge_by_uses_the_selector() {
    let temp = TempDir::new().expect("tmp");
    cwd_fixture(temp.path());

    let mut store = ConfigStore::default();
    store.set_type("cwd", rc_type(temp.path().join("cwd"))).expect("set");

    let merged = store
        .merge_by("cwd", |config_type| json!({ "count": config_type.files.len() }))
        .expect("merge");
    assert_eq!(merged, json!({ "count": 2 }));
}

#[test]
fn merge_over_keeps_defaults_beneath_results() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), ".cfgrc.json", r#"{ "mode": "file" }"#);

    let mut store = ConfigStore::default();
    store.set_type("cwd", rc_type(temp.path())).expect("set");

    let merged = store
        .merge_over("cwd", &json!({ "mode": "default", "level": 1 }))
        .expect("merge");
    assert_eq!(merged, json!({ "mode": "file", "level": 1 }));
}

#[test]
fn array_policy_flows_into_loading() {
    let temp = TempDir::new().expect("tmp");
    cwd_fixture(temp.path());

    let config = StoreConfig::new().with_array_policy(ArrayPolicy::Overwrite);
    let mut store = ConfigStore::new(config).expect("store");
    store.set_type("cwd", rc_type(temp.path().join("cwd"))).expect("set");

    let config_type = store.load_type("cwd").expect("load");
    assert_eq!(config_type.data["list"], json!(["two", "three"]));
}

#[test]
fn resolved_callback_sees_each_resolution() {
    let temp = TempDir::new().expect("tmp");
    cwd_fixture(temp.path());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let config = StoreConfig::new().on_resolved(move |name, files| {
        sink.lock().push((name.to_string(), files.len()));
    });
    let mut store = ConfigStore::new(config).expect("store");
    store.set_type("cwd", rc_type(temp.path().join("cwd"))).expect("set");
    store.load("cwd").expect("load");

    assert_eq!(*seen.lock(), vec![("cwd".to_string(), 2)]);
}

#[test]
fn relative_patterns_use_store_cwd() {
    let temp = TempDir::new().expect("tmp");
    cwd_fixture(temp.path());

    let config = StoreConfig::new().with_cwd(temp.path().join("cwd"));
    let mut store = ConfigStore::new(config).expect("store");
    store
        .set_type("cwd", TypeSettings::pattern(".cfgrc.json"))
        .expect("set");

    let files = store.resolve("cwd").expect("resolve");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].cwd, temp.path().join("cwd"));
    assert!(files[0].path.is_absolute());
}

#[cfg(unix)]
#[test]
fn non_utf8_base_directory_registers_and_loads() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().expect("tmp");
    let dir = temp.path().join(OsStr::from_bytes(b"conf-\xff"));
    fs::create_dir_all(&dir).expect("dir");
    fs::write(dir.join(".cfgrc.json"), r#"{ "a": 1 }"#).expect("write");

    let mut store = ConfigStore::default();
    store
        .set_type("cwd", TypeSettings::pattern(".cfgrc.json").cwd(&dir))
        .expect("set");
    assert_eq!(store.get_type("cwd").expect("type").options.cwd, Some(dir));
    assert_eq!(store.merge("cwd").expect("merge"), json!({ "a": 1 }));
}

#[cfg(unix)]
#[test]
fn symlinked_package_directory_contributes_to_merge() {
    let temp = TempDir::new().expect("tmp");
    write(
        temp.path(),
        ".pnpm/fixture-config-a/.fixturerc.json",
        r#"{ "linked": true }"#,
    );
    fs::create_dir_all(temp.path().join("node_modules")).expect("dir");
    std::os::unix::fs::symlink(
        temp.path().join(".pnpm/fixture-config-a"),
        temp.path().join("node_modules/fixture-config-a"),
    )
    .expect("symlink");

    let mut store = ConfigStore::default();
    store
        .set_type(
            "local",
            TypeSettings::pattern("fixture-config-*/.fixturerc.json")
                .cwd(temp.path().join("node_modules")),
        )
        .expect("set");
    assert_eq!(store.merge("local").expect("merge"), json!({ "linked": true }));
}

#[test]
fn current_dir_prefixed_patterns_match() {
    let temp = TempDir::new().expect("tmp");
    write(temp.path(), "cwd/.cfgrc.json", r#"{ "a": 1 }"#);

    let mut store = ConfigStore::default();
    store
        .set_type(
            "cwd",
            TypeSettings::pattern("./.cfgrc.json").cwd(temp.path().join("cwd")),
        )
        .expect("set");
    assert_eq!(store.merge("cwd").expect("merge"), json!({ "a": 1 }));
}
