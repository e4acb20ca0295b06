//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$PATCHROLL_CONFIG` (environment variable)
//! 2. `~/.config/patchroll/config.toml` (Linux/macOS)
//!    `%APPDATA%\patchroll\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Command-line flags override anything set here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::export::archive::DEFAULT_MAX_MIB;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Export defaults.
    pub export: ExportConfig,
    /// git invocation.
    pub git: GitConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override the directory the log file is written to.
    pub cache_dir: Option<PathBuf>,
}

/// Export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Size budget per output file in MiB.
    pub max_mib: f64,
    /// Output directory used when `--out-dir` is not given.
    pub default_output_dir: Option<PathBuf>,
    /// Decode RFC 2047 subjects before building record file names.
    pub decode_subject: bool,
}

/// git invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Executable name or path.
    pub program: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_mib: DEFAULT_MAX_MIB,
            default_output_dir: None,
            decode_subject: true,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    let Some(path) = config_file_path() else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "Loaded config");
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            Config::default()
        }
    }
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("PATCHROLL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("patchroll").join("config.toml"))
}

/// Directory for the log file.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("patchroll")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.export.max_mib, 64.0);
        assert!(cfg.export.decode_subject);
        assert_eq!(cfg.git.program, "git");
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.export.max_mib, cfg.export.max_mib);
        assert_eq!(parsed.git.program, cfg.git.program);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[export]
max_mib = 8.5

[git]
program = "/usr/local/bin/git"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.export.max_mib, 8.5);
        assert_eq!(cfg.git.program, "/usr/local/bin/git");
        assert!(cfg.export.decode_subject);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_cache_dir_override() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/patchroll-logs"));
        assert_eq!(cache_dir(&cfg), PathBuf::from("/tmp/patchroll-logs"));
    }
}
