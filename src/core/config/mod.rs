use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod loader;

pub use loader::ConfigLoader;

/// Default location of the repository holding the running source code.
pub const DEFAULT_SOURCE_URL: &str = "https://github.com/HumanBrainProject/hbp-spatial-backend";

/// Main backend configuration loaded from a TOML settings file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Transform graph and external tool configuration
    #[serde(default)]
    pub transform: TransformConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the listener binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allowed CORS origins; `*` allows any origin, empty disables CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Expose the `/echo` debugging endpoint
    #[serde(default)]
    pub enable_echo: bool,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Target of the `/` and `/source` redirects
    #[serde(default = "default_source_url")]
    pub source_url: String,
}

/// Transform graph and external tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Directory holding the transform files, used as the tool's working directory
    #[serde(default = "default_instance_path")]
    pub instance_path: PathBuf,

    /// Transform graph YAML file (default: {instance_path}/graph.yaml)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_file: Option<PathBuf>,

    /// External transform program
    #[serde(default = "default_program")]
    pub program: String,

    /// How long to wait for the external program, e.g. "30s" (default: no limit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

impl TransformConfig {
    pub fn graph_path(&self) -> PathBuf {
        self.graph_file
            .clone()
            .unwrap_or_else(|| self.instance_path.join("graph.yaml"))
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_instance_path() -> PathBuf {
    PathBuf::from("instance")
}

fn default_program() -> String {
    crate::core::invoker::TOOL_NAME.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
            enable_echo: false,
            max_body_bytes: default_max_body_bytes(),
            source_url: default_source_url(),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            instance_path: default_instance_path(),
            graph_file: None,
            program: default_program(),
            request_timeout: None,
        }
    }
}
