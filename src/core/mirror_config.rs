// Mirror Configuration
// Runtime settings that define what to mirror, where, and how often

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::app_config::AppConfig;
use crate::error::SyncError;
use crate::utilities::paths::{is_inside, normalize_path};

/// Optional mirror settings loaded from a YAML file
/// Every field may be overridden from the command line
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Directory treated as ground truth
    pub source: Option<PathBuf>,

    /// Directory kept converged to the source
    pub replica: Option<PathBuf>,

    /// Seconds to sleep between cycles
    pub interval_secs: Option<u64>,

    /// Append-only action log
    pub log_file: Option<PathBuf>,

    /// Bytes read per fingerprint chunk
    pub chunk_size: Option<usize>,

    /// Continue past per-path failures
    pub continue_on_error: Option<bool>,

    /// Echo action-log lines to stdout
    pub mirror_stdout: Option<bool>,

    /// Tracing filter for diagnostics
    pub log_filter: Option<String>,
}

impl MirrorConfig {
    /// Load mirror configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read mirror config: {}", path.display()))?;

        let config: MirrorConfig =
            serde_yaml::from_str(&content).context("Failed to parse mirror config YAML")?;

        Ok(config)
    }

    /// Layer `overrides` on top of this config, field by field
    pub fn merged_with(self, overrides: MirrorConfig) -> Self {
        Self {
            source: overrides.source.or(self.source),
            replica: overrides.replica.or(self.replica),
            interval_secs: overrides.interval_secs.or(self.interval_secs),
            log_file: overrides.log_file.or(self.log_file),
            chunk_size: overrides.chunk_size.or(self.chunk_size),
            continue_on_error: overrides.continue_on_error.or(self.continue_on_error),
            mirror_stdout: overrides.mirror_stdout.or(self.mirror_stdout),
            log_filter: overrides.log_filter.or(self.log_filter),
        }
    }
}

/// Validated settings for one mirror pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSettings {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub interval: Duration,
    pub log_file: PathBuf,
    pub chunk_size: usize,
    pub continue_on_error: bool,
    pub mirror_stdout: bool,
    pub log_filter: String,
}

impl MirrorSettings {
    /// Fill gaps from compiled defaults and validate the result
    pub fn resolve(config: MirrorConfig, defaults: &AppConfig) -> Result<Self, SyncError> {
        let source = config
            .source
            .ok_or_else(|| SyncError::Config("no source directory given".to_string()))?;
        let replica = config
            .replica
            .ok_or_else(|| SyncError::Config("no replica directory given".to_string()))?;
        let log_file = config
            .log_file
            .ok_or_else(|| SyncError::Config("no log file given".to_string()))?;

        let interval_secs = config.interval_secs.unwrap_or(defaults.sync.interval_secs);
        if interval_secs == 0 {
            return Err(SyncError::Config(
                "interval must be a positive number of seconds".to_string(),
            ));
        }

        let chunk_size = config.chunk_size.unwrap_or(defaults.sync.chunk_size);
        if chunk_size == 0 {
            return Err(SyncError::Config("chunk size must be positive".to_string()));
        }

        if !source.is_dir() {
            return Err(SyncError::Config(format!(
                "source {} is not an existing directory",
                source.display()
            )));
        }
        if replica.exists() && !replica.is_dir() {
            return Err(SyncError::Config(format!(
                "replica {} exists and is not a directory",
                replica.display()
            )));
        }

        let source_abs = absolute(&source)?;
        let replica_abs = absolute(&replica)?;
        let log_abs = absolute(&log_file)?;

        if is_inside(&replica_abs, &source_abs) || is_inside(&source_abs, &replica_abs) {
            return Err(SyncError::Config(format!(
                "source {} and replica {} must not overlap",
                source.display(),
                replica.display()
            )));
        }
        if is_inside(&log_abs, &source_abs) || is_inside(&log_abs, &replica_abs) {
            return Err(SyncError::Config(format!(
                "log file {} must live outside the source and replica trees",
                log_file.display()
            )));
        }
        if log_abs.is_dir() {
            return Err(SyncError::Config(format!(
                "log file {} is a directory",
                log_file.display()
            )));
        }

        Ok(Self {
            source,
            replica,
            interval: Duration::from_secs(interval_secs),
            log_file,
            chunk_size,
            continue_on_error: config
                .continue_on_error
                .unwrap_or(defaults.sync.continue_on_error),
            mirror_stdout: config
                .mirror_stdout
                .unwrap_or(defaults.logging.mirror_stdout),
            log_filter: config
                .log_filter
                .unwrap_or_else(|| defaults.logging.filter.clone()),
        })
    }
}

/// Anchor a possibly relative path at the working directory
fn absolute(path: &Path) -> Result<PathBuf, SyncError> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = std::env::current_dir().map_err(|e| SyncError::io(".", e))?;
    Ok(normalize_path(&cwd.join(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config_for(root: &Path) -> MirrorConfig {
        fs::create_dir_all(root.join("source")).unwrap();
        MirrorConfig {
            source: Some(root.join("source")),
            replica: Some(root.join("replica")),
            interval_secs: Some(5),
            log_file: Some(root.join("sync.log")),
            ..MirrorConfig::default()
        }
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let defaults = AppConfig::default();

        let settings = MirrorSettings::resolve(config_for(dir.path()), &defaults).unwrap();

        assert_eq!(settings.interval, Duration::from_secs(5));
        assert_eq!(settings.chunk_size, defaults.sync.chunk_size);
        assert_eq!(settings.continue_on_error, defaults.sync.continue_on_error);
        assert_eq!(settings.mirror_stdout, defaults.logging.mirror_stdout);
        assert_eq!(settings.log_filter, defaults.logging.filter);
    }

    #[test]
    fn test_resolve_keeps_configured_log_filter() {
        let dir = TempDir::new().unwrap();
        let config = MirrorConfig {
            log_filter: Some("folder_mirror=trace".to_string()),
            ..config_for(dir.path())
        };

        let settings = MirrorSettings::resolve(config, &AppConfig::default()).unwrap();
        assert_eq!(settings.log_filter, "folder_mirror=trace");
    }

    #[test]
    fn test_resolve_rejects_zero_interval() {
        let dir = TempDir::new().unwrap();
        let config = MirrorConfig {
            interval_secs: Some(0),
            ..config_for(dir.path())
        };

        let err = MirrorSettings::resolve(config, &AppConfig::default()).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_resolve_rejects_missing_source() {
        let dir = TempDir::new().unwrap();
        let config = MirrorConfig {
            source: Some(dir.path().join("nope")),
            ..config_for(dir.path())
        };

        let err = MirrorSettings::resolve(config, &AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("not an existing directory"));
    }

    #[test]
    fn test_resolve_rejects_nested_replica() {
        let dir = TempDir::new().unwrap();
        let config = MirrorConfig {
            replica: Some(dir.path().join("source/replica")),
            ..config_for(dir.path())
        };

        let err = MirrorSettings::resolve(config, &AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("must not overlap"));
    }

    #[test]
    fn test_resolve_rejects_log_inside_replica() {
        let dir = TempDir::new().unwrap();
        let config = MirrorConfig {
            log_file: Some(dir.path().join("replica/sync.log")),
            ..config_for(dir.path())
        };

        let err = MirrorSettings::resolve(config, &AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("outside the source and replica"));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = MirrorConfig {
            interval_secs: Some(30),
            chunk_size: Some(1024),
            ..MirrorConfig::default()
        };
        let overrides = MirrorConfig {
            interval_secs: Some(10),
            ..MirrorConfig::default()
        };

        let merged = base.merged_with(overrides);
        assert_eq!(merged.interval_secs, Some(10));
        assert_eq!(merged.chunk_size, Some(1024));
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mirror.yaml");
        fs::write(
            &path,
            "source: /data/in\nreplica: /data/out\ninterval_secs: 15\ncontinue_on_error: true\n",
        )
        .unwrap();

        let config = MirrorConfig::load(&path).unwrap();
        assert_eq!(config.source, Some(PathBuf::from("/data/in")));
        assert_eq!(config.interval_secs, Some(15));
        assert_eq!(config.continue_on_error, Some(true));
        assert_eq!(config.replica, Some(PathBuf::from("/data/out")));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mirror.yaml");
        fs::write(&path, "sauce: /data/in\n").unwrap();

        assert!(MirrorConfig::load(&path).is_err());
    }
}
