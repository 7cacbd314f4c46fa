#![allow(clippy::result_large_err)]

use super::BackendConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the settings file when `--config` is absent.
pub const SETTINGS_ENV: &str = "SPATIAL_BACKEND_SETTINGS";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the settings file: explicit path first, then `SPATIAL_BACKEND_SETTINGS`.
    pub fn settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit.map(Path::to_path_buf).or_else(|| {
            env::var(SETTINGS_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        })
    }

    /// Load defaults, then the settings file if any, then environment overrides.
    ///
    /// A settings file that was asked for but does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<BackendConfig, AppError> {
        let mut config = match Self::settings_path(explicit) {
            Some(path) => Self::load_from_file(&path)?.ok_or_else(|| {
                AppError::new(
                    ErrorCategory::ConfigError,
                    format!("settings file {} does not exist", path.display()),
                )
            })?,
            None => BackendConfig::default(),
        };

        Self::apply_env_overrides(&mut config);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<BackendConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: BackendConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut BackendConfig) {
        if let Ok(bind) = env::var("SPATIAL_BACKEND_BIND") {
            config.server.bind = bind;
        }

        if let Ok(origins) = env::var("SPATIAL_BACKEND_CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        // INSTANCE_PATH is what container deployments already set
        if let Ok(instance_path) =
            env::var("SPATIAL_BACKEND_INSTANCE_PATH").or_else(|_| env::var("INSTANCE_PATH"))
        {
            config.transform.instance_path = PathBuf::from(instance_path);
        }

        if let Ok(graph_file) = env::var("SPATIAL_BACKEND_GRAPH_FILE") {
            config.transform.graph_file = Some(PathBuf::from(graph_file));
        }

        if let Ok(program) = env::var("SPATIAL_BACKEND_TOOL") {
            config.transform.program = program;
        }

        if let Ok(timeout) = env::var("SPATIAL_BACKEND_REQUEST_TIMEOUT") {
            config.transform.request_timeout = Some(timeout).filter(|t| !t.trim().is_empty());
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "SPATIAL_BACKEND_SETTINGS - Path of the TOML settings file",
            "SPATIAL_BACKEND_BIND - Override listen address (default: 127.0.0.1:8080)",
            "SPATIAL_BACKEND_CORS_ORIGINS - Comma-separated allowed origins (default: *)",
            "SPATIAL_BACKEND_INSTANCE_PATH / INSTANCE_PATH - Directory holding transform files",
            "SPATIAL_BACKEND_GRAPH_FILE - Transform graph YAML (default: {instance}/graph.yaml)",
            "SPATIAL_BACKEND_TOOL - External transform program (default: AimsApplyTransform)",
            "SPATIAL_BACKEND_REQUEST_TIMEOUT - Tool timeout such as 30s or 2m (default: none)",
        ]
    }

    /// Parsed tool timeout, `None` when unlimited.
    pub fn request_timeout(config: &BackendConfig) -> Result<Option<Duration>, AppError> {
        config
            .transform
            .request_timeout
            .as_deref()
            .map(|raw| {
                humantime::parse_duration(raw.trim()).map_err(|e| {
                    AppError::new(
                        ErrorCategory::ConfigError,
                        format!("invalid transform.request_timeout {:?}: {}", raw, e),
                    )
                })
            })
            .transpose()
    }

    /// Validate configuration values
    pub fn validate_config(config: &BackendConfig) -> Result<(), AppError> {
        config.server.bind.parse::<SocketAddr>().map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("invalid server.bind {:?}: {}", config.server.bind, e),
            )
        })?;

        if config.server.max_body_bytes == 0 {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "server.max_body_bytes must be greater than zero",
            ));
        }

        if config.transform.program.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "transform.program cannot be empty",
            ));
        }

        if let Some(timeout) = Self::request_timeout(config)? {
            if timeout.is_zero() {
                return Err(AppError::new(
                    ErrorCategory::ConfigError,
                    "transform.request_timeout must be greater than zero",
                ));
            }
        }

        Ok(())
    }
}
