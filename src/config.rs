use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

const DEFAULT_DATA_PATH: &str = "data/league.json";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REFRESH_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub port: u16,
    /// Page auto-refresh interval; zero turns it off.
    pub refresh_secs: u64,
    pub seed_demo: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            refresh_secs: DEFAULT_REFRESH_SECS,
            seed_demo: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_path: lookup("APP_DATA_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            refresh_secs: parse_or(
                "FASTWAY_REFRESH_SECS",
                lookup("FASTWAY_REFRESH_SECS"),
                defaults.refresh_secs,
            ),
            seed_demo: lookup("FASTWAY_SEED_DEMO")
                .map(|raw| is_truthy(&raw))
                .unwrap_or(defaults.seed_demo),
        }
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(config_from(&[]), AppConfig::default());
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = config_from(&[
            ("APP_DATA_PATH", "/tmp/league.json"),
            ("PORT", "9000"),
            ("FASTWAY_REFRESH_SECS", "0"),
            ("FASTWAY_SEED_DEMO", "Yes"),
        ]);
        assert_eq!(config.data_path, PathBuf::from("/tmp/league.json"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.refresh_secs, 0);
        assert!(config.seed_demo);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("FASTWAY_REFRESH_SECS", "-5")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.refresh_secs, DEFAULT_REFRESH_SECS);
    }
}
