//! Run configuration loading and path resolution.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use segpush_core::SegmentPolicy;
use segpush_store::{
    default_store_path, StoreError, DEFAULT_PATH_DB_PATTERN, DEFAULT_TRUST_DB_PATTERN,
};

/// Full configuration of a push run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PushConfig {
    /// Input and infrastructure locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Segment construction policy.
    #[serde(default)]
    pub policy: SegmentPolicy,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the SCION installation.
    #[serde(default = "default_scion_root")]
    pub scion_root: PathBuf,
    /// Trust tree; `<scion_root>/gen` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen: Option<PathBuf>,
    /// Run-time state; `<scion_root>/gen-cache` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_cache: Option<PathBuf>,
    /// Topology description to push.
    #[serde(default = "default_segments_file")]
    pub segments_file: PathBuf,
    /// Path store; discovered under the gen cache when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_db: Option<PathBuf>,
    /// Glob used for path store discovery.
    #[serde(default = "default_store_pattern")]
    pub store_pattern: String,
    /// Trust store; discovered under the gen cache when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_db: Option<PathBuf>,
    /// Glob used for trust store discovery.
    #[serde(default = "default_trust_store_pattern")]
    pub trust_store_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_scion_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_segments_file() -> PathBuf {
    PathBuf::from("path_db_segments.json")
}
fn default_store_pattern() -> String {
    DEFAULT_PATH_DB_PATTERN.into()
}
fn default_trust_store_pattern() -> String {
    DEFAULT_TRUST_DB_PATTERN.into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            scion_root: default_scion_root(),
            gen: None,
            gen_cache: None,
            segments_file: default_segments_file(),
            path_db: None,
            store_pattern: default_store_pattern(),
            trust_db: None,
            trust_store_pattern: default_trust_store_pattern(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PushConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: PushConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Concrete locations for this run.
    pub fn resolve(&self) -> ResolvedPaths {
        let paths = &self.paths;
        ResolvedPaths {
            segments_file: paths.segments_file.clone(),
            gen: paths
                .gen
                .clone()
                .unwrap_or_else(|| paths.scion_root.join("gen")),
            gen_cache: paths
                .gen_cache
                .clone()
                .unwrap_or_else(|| paths.scion_root.join("gen-cache")),
            path_db: paths.path_db.clone(),
            store_pattern: paths.store_pattern.clone(),
            trust_db: paths.trust_db.clone(),
            trust_store_pattern: paths.trust_store_pattern.clone(),
        }
    }
}

/// Paths with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub segments_file: PathBuf,
    pub gen: PathBuf,
    pub gen_cache: PathBuf,
    path_db: Option<PathBuf>,
    store_pattern: String,
    trust_db: Option<PathBuf>,
    trust_store_pattern: String,
}

impl ResolvedPaths {
    /// The configured path store, or the single match of the store pattern
    /// in the gen cache.
    pub fn store_path(&self) -> Result<PathBuf, StoreError> {
        match &self.path_db {
            Some(path) => Ok(path.clone()),
            None => default_store_path(&self.gen_cache, &self.store_pattern),
        }
    }

    /// The configured trust store, or the single match of the trust store
    /// pattern in the gen cache.
    pub fn trust_store_path(&self) -> Result<PathBuf, StoreError> {
        match &self.trust_db {
            Some(path) => Ok(path.clone()),
            None => default_store_path(&self.gen_cache, &self.trust_store_pattern),
        }
    }
}
