// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;

#[derive(Debug)]
pub enum SettingsError {
    Missing(String),
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Missing(key) => write!(f, "missing required setting: {}", key),
            SettingsError::Parse(msg) => write!(f, "failed to parse setting: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

// String-keyed render configuration, handed to renderers at construction.
#[derive(Debug, Default, Clone)]
pub struct RenderSettings {
    values: HashMap<String, String>,
}

impl RenderSettings {
    pub fn new() -> Self {
        Self { values: HashMap::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn require_int(&self, key: &str) -> Result<i64, SettingsError> {
        match self.values.get(key) {
            Some(v) => v
                .parse::<i64>()
                .map_err(|_| SettingsError::Parse(format!("{} = {:?}", key, v))),
            None => Err(SettingsError::Missing(key.to_string())),
        }
    }

    pub fn int_or(&self, key: &str, default: i64) -> Result<i64, SettingsError> {
        match self.values.get(key) {
            Some(v) => v
                .parse::<i64>()
                .map_err(|_| SettingsError::Parse(format!("{} = {:?}", key, v))),
            None => Ok(default),
        }
    }

    pub fn uint_or(&self, key: &str, default: u64) -> Result<u64, SettingsError> {
        match self.values.get(key) {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| SettingsError::Parse(format!("{} = {:?}", key, v))),
            None => Ok(default),
        }
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    // Explicit seed field; absent means "derive from wall clock".
    pub fn seed(&self) -> Result<Option<u64>, SettingsError> {
        match self.values.get("seed") {
            Some(v) => v
                .parse::<u64>()
                .map(Some)
                .map_err(|_| SettingsError::Parse(format!("seed = {:?}", v))),
            None => Ok(None),
        }
    }
}
