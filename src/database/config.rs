use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::database::{ConfigError, SqlType};

/// Maps column names matching `pattern` to `ty` when nothing better is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameHint {
    pub pattern: String,
    #[serde(rename = "type")]
    pub ty: SqlType,
}

impl NameHint {
    pub fn new(pattern: &str, ty: SqlType) -> Self {
        Self { pattern: pattern.to_string(), ty }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// libpq style connection string or `postgres://` url.
    pub database_url: Option<String>,
    /// Upper bound of sample values returned per parameter.
    pub sample_limit: usize,
    pub sample_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub fetch_samples: bool,
    /// Extra heuristics tried before the built-in ones.
    pub name_hints: Vec<NameHint>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            sample_limit: 10,
            sample_timeout_ms: 2000,
            connect_timeout_ms: 3000,
            fetch_samples: true,
            name_hints: vec![],
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(database_url: &str) -> Self {
        Self {
            database_url: Some(database_url.to_string()),
            ..Default::default()
        }
    }

    /// Catalog only, no statistics lookups.
    pub fn without_samples(database_url: &str) -> Self {
        Self {
            fetch_samples: false,
            ..Self::with_database(database_url)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn sample_timeout(&self) -> Duration {
        Duration::from_millis(self.sample_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::database::{Config, ConfigError, SqlType};

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.sample_limit, 10);
        assert!(config.fetch_samples);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_without_samples() {
        let config = Config::without_samples("postgres://localhost/app");
        assert!(!config.fetch_samples);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/app"));
        assert_eq!(config.sample_limit, 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"sample_limit": 3, "name_hints": [{"pattern": "(?i)sku$", "type": "text"}]}"#).unwrap();
        assert_eq!(config.sample_limit, 3);
        assert_eq!(config.sample_timeout_ms, 2000);
        assert_eq!(config.name_hints[0].ty, SqlType::Text);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"database_url": "postgres://localhost/app", "fetch_samples": false}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/app"));
        assert!(!config.fetch_samples);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("missing.json"));
        match result {
            Err(ConfigError::Io { .. }) => {}
            _ => panic!(),
        }
    }

    #[test]
    fn test_invalid_json() {
        match Config::from_json("{ nope") {
            Err(ConfigError::Json(_)) => {}
            _ => panic!(),
        }
    }
}
