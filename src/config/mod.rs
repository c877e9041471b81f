use std::env;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which persistence realization backs the app: the seeded in-memory mock or
/// the hosted REST service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Mock,
    Hosted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Base URL of the hosted service. Required when `kind` is `Hosted`.
    pub base_url: Option<String>,
    /// Per-project api key sent with every hosted request.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Client-side request timeout. The hosted service is assumed to settle
    /// every request eventually; this bounds the wait anyway.
    pub request_timeout_secs: u64,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Overrides the default `~/.config/brutalmotors` session directory.
    pub config_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("MOTORS_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("MOTORS_BACKEND") {
            self.backend.kind = match v.as_str() {
                "hosted" => BackendKind::Hosted,
                "mock" => BackendKind::Mock,
                _ => self.backend.kind,
            };
        }
        if let Ok(v) = env::var("MOTORS_API_URL") {
            self.backend.base_url = Some(v);
        }
        if let Ok(v) = env::var("MOTORS_API_KEY") {
            self.backend.api_key = Some(v);
        }
        if let Ok(v) = env::var("MOTORS_GATEWAY_TIMEOUT_SECS") {
            self.gateway.request_timeout_secs =
                v.parse().unwrap_or(self.gateway.request_timeout_secs);
        }
        if let Ok(v) = env::var("MOTORS_GATEWAY_DEBUG_LOGGING") {
            self.gateway.debug_logging = v.parse().unwrap_or(self.gateway.debug_logging);
        }
        if let Ok(v) = env::var("MOTORS_CONFIG_DIR") {
            self.session.config_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            backend: BackendConfig {
                kind: BackendKind::Mock,
                base_url: None,
                api_key: None,
            },
            gateway: GatewayConfig {
                request_timeout_secs: 30,
                debug_logging: true,
            },
            session: SessionConfig { config_dir: None },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            backend: BackendConfig {
                kind: BackendKind::Hosted,
                base_url: None,
                api_key: None,
            },
            gateway: GatewayConfig {
                request_timeout_secs: 15,
                debug_logging: true,
            },
            session: SessionConfig { config_dir: None },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            backend: BackendConfig {
                kind: BackendKind::Hosted,
                base_url: None,
                api_key: None,
            },
            gateway: GatewayConfig {
                request_timeout_secs: 10,
                debug_logging: false,
            },
            session: SessionConfig { config_dir: None },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.backend.kind, BackendKind::Mock);
        assert!(config.gateway.debug_logging);
        assert_eq!(config.gateway.request_timeout_secs, 30);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.backend.kind, BackendKind::Hosted);
        assert!(!config.gateway.debug_logging);
        assert_eq!(config.gateway.request_timeout_secs, 10);
    }
}
