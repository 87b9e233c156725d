//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`AgoraSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply `AGORA_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::AgoraSettings;

/// Directory holding the settings file and the default database.
pub fn agora_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".agora")
}

/// Resolve the path to the settings file (`~/.agora/settings.json`).
pub fn settings_path() -> PathBuf {
    agora_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<AgoraSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<AgoraSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Defaults merged with the settings file, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<AgoraSettings> {
    let defaults = serde_json::to_value(AgoraSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            defaults
        } else {
            let user: Value = serde_json::from_str(&content)?;
            deep_merge(defaults, user)
        }
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `AGORA_*` environment variable overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut AgoraSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
///
/// Integers must parse and fall within range; booleans accept
/// `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`. Invalid values are
/// logged and ignored.
pub fn apply_overrides<F>(settings: &mut AgoraSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env.string("AGORA_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.u16("AGORA_PORT", 0, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = env.usize("AGORA_MAX_VIEWERS", 1, 1_000_000) {
        settings.server.max_viewers = v;
    }
    if let Some(v) = env.usize("AGORA_OUTBOUND_QUEUE", 1, 65_536) {
        settings.server.outbound_queue_capacity = v;
    }
    if let Some(v) = env.u64("AGORA_PING_INTERVAL_SECS", 1, 3_600) {
        settings.server.ping_interval_secs = v;
    }
    if let Some(v) = env.u64("AGORA_PONG_TIMEOUT_SECS", 1, 7_200) {
        settings.server.pong_timeout_secs = v;
    }
    if let Some(v) = env.u64("AGORA_SHUTDOWN_TIMEOUT_SECS", 1, 600) {
        settings.server.shutdown_timeout_secs = v;
    }

    // ── Database ────────────────────────────────────────────────────
    if let Some(v) = env.string("AGORA_DB_PATH") {
        settings.database.path = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.string("AGORA_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.bool("AGORA_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Variable readers ────────────────────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.lookup)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = (self.lookup)(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u16 env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.lookup)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }

    fn usize(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        let val = (self.lookup)(name)?;
        let result = parse_usize_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid usize env var, ignoring");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn apply(pairs: &[(&str, &str)]) -> AgoraSettings {
        let vars = vars(pairs);
        let mut settings = AgoraSettings::default();
        apply_overrides(&mut settings, |name| vars.get(name).cloned());
        settings
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_overrides_primitives() {
        let merged = deep_merge(json!({"a": 1, "b": 2}), json!({"b": 3}));
        assert_eq!(merged, json!({"a": 1, "b": 3}));
    }

    #[test]
    fn merge_recurses_into_objects() {
        let target = json!({"server": {"host": "h", "port": 1}});
        let source = json!({"server": {"port": 2}});
        assert_eq!(
            deep_merge(target, source),
            json!({"server": {"host": "h", "port": 2}})
        );
    }

    #[test]
    fn merge_skips_null() {
        let merged = deep_merge(json!({"a": 1}), json!({"a": null}));
        assert_eq!(merged, json!({"a": 1}));
    }

    #[test]
    fn merge_replaces_arrays() {
        let merged = deep_merge(json!({"a": [1, 2, 3]}), json!({"a": [9]}));
        assert_eq!(merged, json!({"a": [9]}));
    }

    #[test]
    fn merge_adds_new_keys() {
        let merged = deep_merge(json!({}), json!({"x": {"y": true}}));
        assert_eq!(merged, json!({"x": {"y": true}}));
    }

    // ── file layer ──────────────────────────────────────────────────

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_file_layer(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.path, "agora.db");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "  \n").unwrap();
        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server": {"port": 9000, "maxViewers": 10}, "logging": {"json": true}}"#,
        )
        .unwrap();
        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.max_viewers, 10);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert!(settings.logging.json);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_file_layer(&path).unwrap_err();
        assert!(matches!(err, crate::SettingsError::Json(_)));
    }

    #[test]
    fn wrong_type_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": "eighty"}}"#).unwrap();
        assert!(load_file_layer(&path).is_err());
    }

    #[test]
    fn settings_path_ends_with_agora_dir() {
        let path = settings_path();
        assert!(path.ends_with(".agora/settings.json"));
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn overrides_apply() {
        let s = apply(&[
            ("AGORA_HOST", "127.0.0.1"),
            ("AGORA_PORT", "3000"),
            ("AGORA_DB_PATH", "/var/lib/agora.db"),
            ("AGORA_LOG_JSON", "yes"),
            ("AGORA_OUTBOUND_QUEUE", "8"),
        ]);
        assert_eq!(s.server.host, "127.0.0.1");
        assert_eq!(s.server.port, 3000);
        assert_eq!(s.database.path, "/var/lib/agora.db");
        assert!(s.logging.json);
        assert_eq!(s.server.outbound_queue_capacity, 8);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let s = apply(&[
            ("AGORA_PORT", "99999"),
            ("AGORA_LOG_JSON", "maybe"),
            ("AGORA_OUTBOUND_QUEUE", "0"),
            ("AGORA_HOST", ""),
        ]);
        let d = AgoraSettings::default();
        assert_eq!(s.server.port, d.server.port);
        assert_eq!(s.logging.json, d.logging.json);
        assert_eq!(s.server.outbound_queue_capacity, d.server.outbound_queue_capacity);
        assert_eq!(s.server.host, d.server.host);
    }

    #[test]
    fn port_zero_is_allowed() {
        assert_eq!(apply(&[("AGORA_PORT", "0")]).server.port, 0);
    }

    // ── parsers ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for v in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["false", "0", "no", "OFF"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        assert_eq!(parse_bool("2"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(parse_u16_range("80", 1, 100), Some(80));
        assert_eq!(parse_u16_range("0", 1, 100), None);
        assert_eq!(parse_u16_range("-1", 0, 100), None);
        assert_eq!(parse_u64_range("600", 1, 600), Some(600));
        assert_eq!(parse_u64_range("601", 1, 600), None);
        assert_eq!(parse_usize_range("abc", 0, 10), None);
        assert_eq!(parse_usize_range("10", 0, 10), Some(10));
    }
}
