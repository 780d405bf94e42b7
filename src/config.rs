use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DetailLevel, Organism};
use crate::error::BiocycError;

pub const DEFAULT_BASE_URL: &str = "https://websvc.biocyc.org";
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(6 * 4 * 7 * 24 * 60 * 60);
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub organism: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub expiry: Option<Value>,
    #[serde(default)]
    pub cache_paths: Vec<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub min_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub organism: Organism,
    pub detail: DetailLevel,
    pub expiry: Duration,
    /// Primary cache root first; the rest are read-only fallbacks.
    pub cache_paths: Vec<Utf8PathBuf>,
    pub base_url: String,
    pub min_interval: Duration,
}

impl ClientConfig {
    pub fn with_cache_root(root: Utf8PathBuf) -> Self {
        Self {
            organism: Organism::default(),
            detail: DetailLevel::default(),
            expiry: DEFAULT_EXPIRY,
            cache_paths: vec![root],
            base_url: DEFAULT_BASE_URL.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }

    pub fn primary_cache(&self) -> Option<&Utf8PathBuf> {
        self.cache_paths.first()
    }
}

pub fn default_cache_root() -> Result<Utf8PathBuf, BiocycError> {
    BaseDirs::new()
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.home_dir().join(".biocyc")).ok())
        .ok_or_else(|| BiocycError::Filesystem("unable to resolve cache directory".to_string()))
}

/// Parses an expiry window such as `26w`, `180d`, `12h`, `30m` or `45s`.
pub fn parse_expiry(value: &str) -> Result<Duration, BiocycError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*([smhdw])\s*$").expect("expiry pattern is valid")
    });
    let captures = pattern
        .captures(value)
        .ok_or_else(|| BiocycError::InvalidExpiry(value.to_string()))?;
    let amount: u64 = captures[1]
        .parse()
        .map_err(|_| BiocycError::InvalidExpiry(value.to_string()))?;
    let unit_secs = match &captures[2] {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => 7 * 24 * 60 * 60,
    };
    amount
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| BiocycError::InvalidExpiry(value.to_string()))
}

fn expiry_from_value(value: &Value) -> Result<Duration, BiocycError> {
    match value {
        Value::String(text) => parse_expiry(text),
        other => Err(BiocycError::InvalidExpiry(other.to_string())),
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ClientConfig, BiocycError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("biocyc.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| BiocycError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| BiocycError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ClientConfig, BiocycError> {
        let cache_paths = if config.cache_paths.is_empty() {
            vec![default_cache_root()?]
        } else {
            config.cache_paths.into_iter().map(Utf8PathBuf::from).collect()
        };
        let mut resolved = ClientConfig::with_cache_root(cache_paths[0].clone());
        resolved.cache_paths = cache_paths;

        if let Some(organism) = config.organism {
            resolved.organism = organism.parse()?;
        }
        if let Some(detail) = config.detail {
            resolved.detail = detail.parse()?;
        }
        if let Some(expiry) = config.expiry.as_ref() {
            resolved.expiry = expiry_from_value(expiry)?;
        }
        if let Some(base_url) = config.base_url {
            Url::parse(&base_url)
                .map_err(|err| BiocycError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
            resolved.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = config.min_interval_ms {
            resolved.min_interval = Duration::from_millis(ms);
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn expiry_units() {
        assert_eq!(parse_expiry("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_expiry("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_expiry("24w").unwrap(), DEFAULT_EXPIRY);
    }

    #[test]
    fn expiry_rejects_non_durations() {
        assert_matches!(parse_expiry("soon"), Err(BiocycError::InvalidExpiry(_)));
        assert_matches!(parse_expiry("12"), Err(BiocycError::InvalidExpiry(_)));
        assert_matches!(
            expiry_from_value(&Value::from(12)),
            Err(BiocycError::InvalidExpiry(_))
        );
    }
}
