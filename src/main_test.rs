use super::*;

fn config_file(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("floorplan-{}-{name}.json", std::process::id()));
    fs::write(&path, body).unwrap();
    path
}

// =============================================================
// load_config
// =============================================================

#[test]
fn no_config_path_gives_defaults() {
    assert_eq!(load_config(None).unwrap(), EditorConfig::default());
}

#[test]
fn partial_config_is_loaded() {
    let path = config_file("partial", r#"{ "history_capacity": 10 }"#);
    let config = load_config(Some(&path)).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(config.history_capacity, 10);
}

#[test]
fn inverted_zoom_range_is_refused() {
    let path = config_file("inverted", r#"{ "min_zoom": 5, "max_zoom": 1 }"#);
    let result = load_config(Some(&path));
    fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(CliError::InvalidConfig { source: ConfigError::ZoomRange { .. }, .. })));
}

#[test]
fn malformed_config_is_refused() {
    let path = config_file("malformed", "{ nope");
    let result = load_config(Some(&path));
    fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(CliError::Config { .. })));
}
