use super::app_log::AppLog;
use crate::models::Settings;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

const LOG_SCOPE: &str = "settings";

pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
    log: AppLog,
}

impl SettingsStore {
    pub fn load(path: PathBuf, log: AppLog) -> Self {
        let raw = match read_document(&path) {
            Ok(raw) => raw,
            Err(e) => {
                log.warn(
                    LOG_SCOPE,
                    "load_failed",
                    Some(json!({ "path": path.display().to_string(), "error": format!("{e:#}") })),
                );
                Map::new()
            }
        };

        let (settings, rejected) = merge_over_defaults(raw);
        if !rejected.is_empty() {
            log.warn(LOG_SCOPE, "invalid_fields_reset", Some(json!({ "fields": rejected })));
        }

        Self {
            path,
            settings,
            log,
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn save(&self) -> bool {
        match write_document(&self.path, &self.settings) {
            Ok(()) => true,
            Err(e) => {
                self.log.error(
                    LOG_SCOPE,
                    "save_failed",
                    Some(json!({ "path": self.path.display().to_string(), "error": format!("{e:#}") })),
                );
                false
            }
        }
    }
}

fn read_document(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes).context("parse settings json")?;
    match value {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("settings root is not an object: {}", type_name(&other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shallow merge over the defaults. Known keys with the wrong shape are reset
/// and returned in the second element.
pub fn merge_over_defaults(loaded: Map<String, Value>) -> (Settings, Vec<String>) {
    let mut merged = match serde_json::to_value(Settings::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, value) in loaded {
        merged.insert(key, value);
    }

    let mut rejected = Vec::new();
    for key in Settings::KNOWN_KEYS {
        let Some(value) = merged.get(key) else {
            continue;
        };
        let mut single = Map::new();
        single.insert(key.to_string(), value.clone());
        if serde_json::from_value::<Settings>(Value::Object(single)).is_err() {
            merged.remove(key);
            rejected.push(key.to_string());
        }
    }
    if merged.get("widgetSettings").is_some_and(|v| !v.is_object()) {
        merged.remove("widgetSettings");
        rejected.push("widgetSettings".to_string());
    }

    let settings = serde_json::from_value(Value::Object(merged)).unwrap_or_default();
    (settings, rejected)
}

fn write_document(path: &Path, settings: &Settings) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let body = serde_json::to_string_pretty(settings).map_err(io::Error::other)?;

    let tmp = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp)?;
    file.write_all(body.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    let _ = fs::remove_file(path);
    fs::rename(tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Corner, Point};

    fn store_in(dir: &Path) -> SettingsStore {
        SettingsStore::load(dir.join(SETTINGS_FILE_NAME), AppLog::new(dir.join("logs")))
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        assert_eq!(store.settings(), &Settings::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_loads_defaults_and_logs() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(SETTINGS_FILE_NAME), b"{ not json").expect("write");

        let store = store_in(dir.path());
        assert_eq!(store.settings(), &Settings::default());

        let records = AppLog::new(dir.path().join("logs"))
            .read(10, None, None)
            .expect("read");
        assert!(records.iter().any(|r| r.message == "load_failed"));
    }

    #[test]
    fn loaded_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            br#"{ "alwaysOnTop": false, "corner": "top-right", "position": { "x": 12, "y": 34 } }"#,
        )
        .expect("write");

        let store = store_in(dir.path());
        let settings = store.settings();
        assert!(!settings.always_on_top);
        assert!(!settings.is_expanded);
        assert_eq!(settings.corner, Corner::TopRight);
        assert_eq!(settings.position, Some(Point::new(12, 34)));
    }

    #[test]
    fn wrong_typed_field_is_reset_without_losing_the_rest() {
        let mut loaded = Map::new();
        loaded.insert("isExpanded".into(), json!("yes"));
        loaded.insert("corner".into(), json!("top-left"));
        loaded.insert("futureFlag".into(), json!(7));

        let (settings, rejected) = merge_over_defaults(loaded);
        assert_eq!(rejected, vec!["isExpanded".to_string()]);
        assert!(!settings.is_expanded);
        assert_eq!(settings.corner, Corner::TopLeft);
        assert_eq!(settings.extra.get("futureFlag"), Some(&json!(7)));
    }

    #[test]
    fn non_object_widget_settings_is_reset() {
        for stored in [Value::Null, json!("x"), json!([1])] {
            let mut loaded = Map::new();
            loaded.insert("widgetSettings".into(), stored);
            loaded.insert("corner".into(), json!("top-right"));

            let (settings, rejected) = merge_over_defaults(loaded);
            assert_eq!(rejected, vec!["widgetSettings".to_string()]);
            assert_eq!(settings.widget_settings, json!({}));
            assert_eq!(settings.corner, Corner::TopRight);
        }
    }

    #[test]
    fn non_object_widget_settings_is_logged_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(SETTINGS_FILE_NAME), br#"{ "widgetSettings": null }"#)
            .expect("write");

        let store = store_in(dir.path());
        assert_eq!(store.settings().widget_settings, json!({}));
        assert!(store.settings().snap_to_taskbar());

        let records = AppLog::new(dir.path().join("logs"))
            .read(10, None, None)
            .expect("read");
        assert!(records.iter().any(|r| r.message == "invalid_fields_reset"));
    }

    #[test]
    fn repeated_save_load_is_byte_stable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(
            &path,
            br#"{"zeta":1,"widgetSettings":{"b":{"y":2,"x":1},"a":true},"corner":"bogus","alpha":[1,2]}"#,
        )
        .expect("write");

        assert!(store_in(dir.path()).save());
        let first = fs::read(&path).expect("read");

        assert!(store_in(dir.path()).save());
        let second = fs::read(&path).expect("read");
        assert_eq!(first, second);

        let reloaded = store_in(dir.path());
        assert_eq!(reloaded.settings().extra.get("zeta"), Some(&json!(1)));
        assert_eq!(reloaded.settings().extra.get("alpha"), Some(&json!([1, 2])));
        assert_eq!(reloaded.settings().corner, Corner::BottomLeft);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempfile::tempdir().expect("tempdir");
        // a directory where the file should be makes the rename fail
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::create_dir_all(path.join("occupied")).expect("mkdir");

        let store = SettingsStore::load(path, AppLog::new(dir.path().join("logs")));
        assert!(!store.save());
    }
}
