use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::info;

use crate::colors::default_palette;
use crate::dates::DEFAULT_EXPIRY_THRESHOLD_DAYS;
use crate::error::ConfigError;

pub struct Config {
    pub port: u16,
    pub activity_log: PathBuf,
    pub palette: Vec<String>,
    pub expiry_threshold_days: i64,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `load` feeds it the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "FOOD_PORT", "8080")?,
            activity_log: try_load(&lookup, "FOOD_ACTIVITY_LOG", "data/activities.log")?,
            palette: load_palette(&lookup, "FOOD_PALETTE")?,
            expiry_threshold_days: try_load(
                &lookup,
                "FOOD_EXPIRY_THRESHOLD_DAYS",
                &DEFAULT_EXPIRY_THRESHOLD_DAYS.to_string(),
            )?,
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.clone(),
        reason: e.to_string(),
    })
}

fn load_palette<F>(lookup: &F, key: &str) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using the default palette");
        return Ok(default_palette());
    };

    let palette: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if palette.is_empty() {
        return Err(ConfigError::EmptyPalette(key.to_string()));
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.activity_log, PathBuf::from("data/activities.log"));
        assert_eq!(config.palette, default_palette());
        assert_eq!(config.expiry_threshold_days, 7);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("FOOD_PORT", "9000"),
            ("FOOD_ACTIVITY_LOG", "/tmp/food.log"),
            ("FOOD_PALETTE", "#111111, #222222,"),
            ("FOOD_EXPIRY_THRESHOLD_DAYS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.activity_log, PathBuf::from("/tmp/food.log"));
        assert_eq!(config.palette, vec!["#111111", "#222222"]);
        assert_eq!(config.expiry_threshold_days, 3);
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[("FOOD_PORT", "eighty")])).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "FOOD_PORT"));

        let err = Config::from_lookup(lookup(&[("FOOD_PALETTE", " , ")])).err().unwrap();
        assert!(matches!(err, ConfigError::EmptyPalette(_)));
    }
}
