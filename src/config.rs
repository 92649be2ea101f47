//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `CRC_WEEKLY_*` environment variables (`__` separates nested keys,
//!    `CRC_WEEKLY_STORAGE_POOLS` is a comma-separated list)
//! 4. the deployment variables `MONGO_URI_STATS`, `MONGO_URI_SUS`,
//!    `MONGO_URI_STORAGE` and `SECRET_KEY`
//!
//! ```toml
//! stats_uri = "https://data.example.org/app/crc/endpoint/data/v1?database=crc"
//! sus_uri = "/var/lib/crc-weekly/export"
//! refresh_secs = 3600
//! storage_pools = ["bgfs", "zfs"]
//!
//! [date]
//! parse = "%m/%d/%y-%H:%M:%S"
//! display = "%m/%d/%y"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::dates::{DEFAULT_DISPLAY_FORMAT, DEFAULT_PARSE_FORMAT};
use crate::data::{DateFormats, TransformConfig, DEFAULT_ROLLING_WINDOW};
use crate::refresh::DEFAULT_INTERVAL;
use crate::source::{self, DocumentStore, Fetcher, Source};

/// Prefix of the structured environment variables.
pub const ENV_PREFIX: &str = "CRC_WEEKLY";

/// Deployment variables and the keys they override.
const LEGACY_VARS: [(&str, &str); 4] = [
    ("MONGO_URI_STATS", "stats_uri"),
    ("MONGO_URI_SUS", "sus_uri"),
    ("MONGO_URI_STORAGE", "storage_uri"),
    ("SECRET_KEY", "secret_key"),
];

/// Environment variables, by name.
pub type EnvMap = config::Map<String, String>;

/// Everything the binary needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Store holding the per-cluster statistics collection.
    pub stats_uri: Option<String>,
    /// Store holding the service-unit collection.
    pub sus_uri: Option<String>,
    /// Store holding the storage collection. Defaults to `sus_uri`.
    pub storage_uri: Option<String>,
    /// API key for HTTP stores.
    pub secret_key: Option<String>,
    pub refresh_secs: u64,
    pub rolling_window: usize,
    /// Cutoffs are written in the display date format.
    pub sus_cutoff: String,
    pub storage_cutoff: String,
    pub sentinel_field: String,
    pub storage_pools: Vec<String>,
    pub date: DateConfig,
    pub collections: CollectionNames,
    /// Dashboard file; stdout when unset.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    pub parse: String,
    pub display: String,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            parse: DEFAULT_PARSE_FORMAT.to_string(),
            display: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }
}

/// Collection read for each source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
    pub statistics: String,
    pub sus: String,
    pub storage: String,
}

impl CollectionNames {
    pub fn get(&self, source: Source) -> &str {
        match source {
            Source::Statistics => &self.statistics,
            Source::ServiceUnits => &self.sus,
            Source::Storage => &self.storage,
        }
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            statistics: Source::Statistics.default_collection().to_string(),
            sus: Source::ServiceUnits.default_collection().to_string(),
            storage: Source::Storage.default_collection().to_string(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stats_uri: None,
            sus_uri: None,
            storage_uri: None,
            secret_key: None,
            refresh_secs: DEFAULT_INTERVAL.as_secs(),
            rolling_window: DEFAULT_ROLLING_WINDOW,
            sus_cutoff: "04/15/19".to_string(),
            storage_cutoff: "04/15/19".to_string(),
            sentinel_field: "smp".to_string(),
            storage_pools: vec!["bgfs".to_string(), "zfs".to_string()],
            date: DateConfig::default(),
            collections: CollectionNames::default(),
            output: None,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from `path` (if any) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`DashboardConfig::load`], reading variables from `env` instead
    /// of the process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<EnvMap>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("storage_pools")
                .source(env.clone()),
        );

        for (var, key) in LEGACY_VARS {
            let value = match &env {
                Some(env) => env.get(var).cloned(),
                None => std::env::var(var).ok(),
            };
            builder = builder.set_override_option(key, value.filter(|v| !v.is_empty()))?;
        }

        let config: DashboardConfig = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        debug!(
            stats = config.stats_uri.is_some(),
            sus = config.sus_uri.is_some(),
            storage = config.storage_uri.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Validated transformation settings.
    pub fn transform_config(&self) -> Result<TransformConfig> {
        let formats = DateFormats::new(&self.date.parse, &self.date.display).ok_or_else(|| {
            anyhow!(
                "Invalid date format (parse {:?}, display {:?})",
                self.date.parse,
                self.date.display
            )
        })?;
        if self.rolling_window == 0 {
            bail!("rolling_window must be at least 1");
        }
        let sus_cutoff = formats
            .parse_cutoff(&self.sus_cutoff)
            .context("Invalid sus_cutoff")?;
        let storage_cutoff = formats
            .parse_cutoff(&self.storage_cutoff)
            .context("Invalid storage_cutoff")?;

        Ok(TransformConfig {
            formats,
            rolling_window: self.rolling_window,
            sus_cutoff,
            storage_cutoff,
            sentinel_field: self.sentinel_field.clone(),
            storage_pools: self.storage_pools.clone(),
        })
    }

    pub fn refresh_interval(&self) -> Result<Duration> {
        if self.refresh_secs == 0 {
            bail!("refresh_secs must be at least 1");
        }
        Ok(Duration::from_secs(self.refresh_secs))
    }

    /// Store URI for each source. Storage falls back to the service-unit store.
    pub fn store_uris(&self) -> Result<Vec<(Source, &str)>> {
        let stats = self
            .stats_uri
            .as_deref()
            .context("stats_uri is not set (MONGO_URI_STATS)")?;
        let sus = self
            .sus_uri
            .as_deref()
            .context("sus_uri is not set (MONGO_URI_SUS)")?;
        let storage = self.storage_uri.as_deref().unwrap_or(sus);
        Ok(vec![
            (Source::Statistics, stats),
            (Source::ServiceUnits, sus),
            (Source::Storage, storage),
        ])
    }

    /// Open every configured store and bind it to its collection.
    ///
    /// Sources sharing a URI share one store.
    pub fn build_fetcher(&self) -> Result<Fetcher> {
        let mut stores: BTreeMap<&str, Arc<dyn DocumentStore>> = BTreeMap::new();
        let mut builder = Fetcher::builder();

        for (source, uri) in self.store_uris()? {
            let store = match stores.get(uri) {
                Some(store) => store.clone(),
                None => {
                    let store = source::open_store(uri, self.secret_key.as_deref())
                        .with_context(|| format!("Failed to open store for {} documents", source))?;
                    stores.insert(uri, store.clone());
                    store
                }
            };
            builder = builder.source(source, store, self.collections.get(source));
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Option<EnvMap> {
        Some(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.refresh_secs, 3600);

        let transform = config.transform_config().unwrap();
        assert_eq!(transform, TransformConfig::default());
    }

    #[test]
    fn test_legacy_variables() {
        let config = DashboardConfig::load_with_env(
            None,
            env(&[
                ("MONGO_URI_STATS", "/data/stats"),
                ("MONGO_URI_SUS", "/data/sus"),
                ("SECRET_KEY", "s3cret"),
            ]),
        )
        .unwrap();

        assert_eq!(config.stats_uri.as_deref(), Some("/data/stats"));
        assert_eq!(config.secret_key.as_deref(), Some("s3cret"));
        let uris = config.store_uris().unwrap();
        assert_eq!(uris[2], (Source::Storage, "/data/sus"));
    }

    #[test]
    fn test_file_then_env_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crc-weekly.toml");
        std::fs::write(
            &path,
            r#"
stats_uri = "/from/file"
rolling_window = 4
sus_cutoff = "01/01/20"

[date]
display = "%Y-%m-%d"
"#,
        )
        .unwrap();

        let config = DashboardConfig::load_with_env(
            Some(path.as_path()),
            env(&[
                ("CRC_WEEKLY_ROLLING_WINDOW", "8"),
                ("CRC_WEEKLY_STORAGE_POOLS", "bgfs,zfs,lustre"),
                ("MONGO_URI_STATS", "/from/env"),
            ]),
        )
        .unwrap();

        assert_eq!(config.stats_uri.as_deref(), Some("/from/env"));
        assert_eq!(config.rolling_window, 8);
        assert_eq!(config.storage_pools, ["bgfs", "zfs", "lustre"]);
        assert_eq!(config.date.display, "%Y-%m-%d");
        assert_eq!(config.date.parse, DEFAULT_PARSE_FORMAT);

        // The cutoff no longer matches the display format.
        assert!(config.transform_config().is_err());
    }

    #[test]
    fn test_nested_env_keys() {
        let config = DashboardConfig::load_with_env(
            None,
            env(&[
                ("CRC_WEEKLY_DATE__DISPLAY", "%d.%m.%Y"),
                ("CRC_WEEKLY_SUS_CUTOFF", "15.04.2019"),
                ("CRC_WEEKLY_STORAGE_CUTOFF", "01.06.2019"),
                ("CRC_WEEKLY_COLLECTIONS__STORAGE", "capacity"),
            ]),
        )
        .unwrap();

        let transform = config.transform_config().unwrap();
        assert_eq!(transform.storage_cutoff, NaiveDate::from_ymd_opt(2019, 6, 1).unwrap());
        assert_eq!(config.collections.get(Source::Storage), "capacity");
    }

    #[test]
    fn test_numeric_env_values_stay_strings() {
        let config = DashboardConfig::load_with_env(
            None,
            env(&[
                ("CRC_WEEKLY_STATS_URI", "2019"),
                ("CRC_WEEKLY_SECRET_KEY", "0042"),
                ("CRC_WEEKLY_STORAGE_POOLS", "bgfs,2024"),
                ("CRC_WEEKLY_REFRESH_SECS", "600"),
            ]),
        )
        .unwrap();

        assert_eq!(config.stats_uri.as_deref(), Some("2019"));
        assert_eq!(config.storage_pools, ["bgfs", "2024"]);
        assert_eq!(config.refresh_secs, 600);
        assert!(config.secret_key.is_some());
    }

    #[test]
    fn test_validation() {
        let config = DashboardConfig {
            rolling_window: 0,
            ..Default::default()
        };
        assert!(config.transform_config().is_err());

        let config = DashboardConfig {
            refresh_secs: 0,
            ..Default::default()
        };
        assert!(config.refresh_interval().is_err());

        let config = DashboardConfig {
            date: DateConfig {
                parse: "%Q".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.transform_config().is_err());
    }

    #[test]
    fn test_missing_uris() {
        let config = DashboardConfig::default();
        let err = config.build_fetcher().unwrap_err();
        assert!(err.to_string().contains("MONGO_URI_STATS"));
    }

    #[test]
    fn test_build_fetcher() {
        let config = DashboardConfig {
            stats_uri: Some("/data/stats".to_string()),
            sus_uri: Some("file:///data/sus".to_string()),
            ..Default::default()
        };
        let fetcher = config.build_fetcher().unwrap();
        assert_eq!(fetcher.sources().collect::<Vec<_>>(), Source::ALL);
    }
}
