//! Configuration loader for Mimic.
//!
//! Sources, lowest precedence first: built-in defaults, `{data_dir}/config.toml`,
//! then `MIMIC_<KEY>` environment variables. A missing or malformed file is
//! not fatal, and every key falls back to its default independently.

use std::collections::BTreeMap;
use std::path::Path;

use mimic_types::config::{CONFIG_KEYS, ConfigFallback, ImpersonateConfig};

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Prefix of the environment variables that override file values.
pub const ENV_PREFIX: &str = "MIMIC_";

/// Environment variable overriding `key`, e.g. `MIMIC_MIN_WORDS`.
pub fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.to_uppercase())
}

/// Load configuration from `{data_dir}/config.toml` and the process environment.
///
/// Rejected values are logged at warn and returned alongside the config.
pub async fn load_config(data_dir: &Path) -> (ImpersonateConfig, Vec<ConfigFallback>) {
    load_config_with(data_dir, |name| std::env::var(name).ok()).await
}

/// Like [`load_config`], reading overrides through `env` instead of the
/// process environment.
pub async fn load_config_with(
    data_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> (ImpersonateConfig, Vec<ConfigFallback>) {
    let mut raw = read_config_file(&data_dir.join(CONFIG_FILE)).await;

    for key in CONFIG_KEYS {
        if let Some(value) = env(&env_var_name(key)) {
            raw.insert((*key).to_string(), value);
        }
    }

    let (config, fallbacks) = ImpersonateConfig::from_raw(&raw);
    for fallback in &fallbacks {
        tracing::warn!("Invalid configuration value {fallback}, using default");
    }
    (config, fallbacks)
}

async fn read_config_file(path: &Path) -> BTreeMap<String, String> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return BTreeMap::new();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return BTreeMap::new();
        }
    };

    let table = match toml::from_str::<toml::Table>(&content) {
        Ok(table) => table,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            return BTreeMap::new();
        }
    };

    table
        .into_iter()
        .filter(|(key, _)| {
            let known = CONFIG_KEYS.contains(&key.as_str());
            if !known {
                tracing::debug!("Ignoring unknown configuration key '{key}'");
            }
            known
        })
        .map(|(key, value)| (key, raw_value(value)))
        .collect()
}

/// Flatten a TOML value into the string form the validators expect.
fn raw_value(value: toml::Value) -> String {
    match value {
        toml::Value::String(s) => s,
        toml::Value::Array(items) => items
            .into_iter()
            .map(raw_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_types::config::Mode;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    async fn write_config(dir: &TempDir, content: &str) {
        tokio::fs::write(dir.path().join(CONFIG_FILE), content)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let (config, fallbacks) = load_config_with(tmp.path(), no_env).await;
        assert_eq!(config, ImpersonateConfig::default());
        assert!(fallbacks.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        write_config(
            &tmp,
            r#"
mode = "train_respond"
min_words = 3
frequency_threshold = 80
case_sensitive = true
bot_aliases = ["polly", "pp"]
unrelated = "ignored"
"#,
        )
        .await;

        let (config, fallbacks) = load_config_with(tmp.path(), no_env).await;
        assert!(fallbacks.is_empty());
        assert_eq!(config.mode, Mode::TrainRespond);
        assert_eq!(config.min_words, 3);
        assert_eq!(config.frequency_threshold, 80);
        assert!(config.case_sensitive);
        assert_eq!(config.bot_aliases, vec!["polly", "pp"]);
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        write_config(&tmp, "this is not { valid toml !!!").await;

        let (config, _) = load_config_with(tmp.path(), no_env).await;
        assert_eq!(config, ImpersonateConfig::default());
    }

    #[tokio::test]
    async fn test_env_overrides_file_values() {
        let tmp = TempDir::new().unwrap();
        write_config(&tmp, "min_words = 3\nmode = \"train\"\n").await;

        let (config, _) = load_config_with(tmp.path(), |name| match name {
            "MIMIC_MODE" => Some("respond".to_string()),
            "MIMIC_BOT_ALIASES" => Some("polly, pp".to_string()),
            _ => None,
        })
        .await;
        assert_eq!(config.mode, Mode::Respond);
        assert_eq!(config.min_words, 3);
        assert_eq!(config.bot_aliases, vec!["polly", "pp"]);
    }

    #[tokio::test]
    async fn test_invalid_values_fall_back_independently() {
        let tmp = TempDir::new().unwrap();
        write_config(&tmp, "frequency_threshold = 150\nmin_words = 4\n").await;

        let (config, fallbacks) = load_config_with(tmp.path(), |name| {
            (name == "MIMIC_MODE").then(|| "sometimes".to_string())
        })
        .await;
        assert_eq!(config.frequency_threshold, 50);
        assert_eq!(config.mode, Mode::Train);
        assert_eq!(config.min_words, 4);

        let keys: Vec<&str> = fallbacks.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"frequency_threshold"));
        assert!(keys.contains(&"mode"));
    }

    #[test]
    fn test_env_var_names_are_upper_case() {
        assert_eq!(env_var_name("min_words"), "MIMIC_MIN_WORDS");
    }
}
