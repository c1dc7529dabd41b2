//! Layered service configuration.
//!
//! Priority (highest first): `REFERRAL_*` environment variables (nested keys
//! separated by `__`, e.g. `REFERRAL_RUNTIME__MODEL`), the TOML file passed on
//! the command line, built-in defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::HeaderValue;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::bridge::BridgeConfig;
use crate::logging::LoggingConfig;
use crate::referral::{PromptTemplate, TemplateError};

const ENV_PREFIX: &str = "REFERRAL_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid listen address {host}:{port}")]
    Address { host: String, port: u16 },

    #[error("failed to read prompt template {path}")]
    TemplateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid prompt template")]
    Template(#[from] TemplateError),

    #[error("invalid CORS origin {0:?}")]
    CorsOrigin(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Base URL of the inference runtime
    pub base_url: String,
    /// Model every request is sent to
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "qwen:1.8b".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl RuntimeConfig {
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::new(&self.base_url, &self.model, self.timeout_ms)
    }
}

/// Replacement for the built-in prompt. `template` wins over `template_file`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub template: Option<String>,
    pub template_file: Option<PathBuf>,
}

impl PromptConfig {
    pub fn build(&self) -> Result<PromptTemplate, ConfigError> {
        if let Some(text) = &self.template {
            return Ok(PromptTemplate::new(text)?);
        }
        if let Some(path) = &self.template_file {
            let text = std::fs::read_to_string(path).map_err(|source| {
                ConfigError::TemplateFile {
                    path: path.clone(),
                    source,
                }
            })?;
            return Ok(PromptTemplate::new(text)?);
        }
        Ok(PromptTemplate::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `"*"` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl CorsConfig {
    pub fn layer(&self) -> Result<CorsLayer, ConfigError> {
        let origin = if self.allowed_origins.iter().any(|o| o == "*") {
            AllowOrigin::from(Any)
        } else {
            let origins = self
                .allowed_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|_| ConfigError::CorsOrigin(o.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(origins)
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub runtime: RuntimeConfig,
    pub prompt: PromptConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            runtime: RuntimeConfig::default(),
            prompt: PromptConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(path)
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Address {
                host: self.host.clone(),
                port: self.port,
            })
    }
}
