//! Layered configuration
//!
//! Sources, highest priority first:
//! 1. Environment variables (`GRAPHMORPH_*`, `__` separates sections)
//! 2. `graphmorph.toml` in the working directory
//! 3. Built-in defaults
//!
//! `GRAPHMORPH_HTTP__REQUEST_TIMEOUT_SECS=10` maps to `http.request_timeout_secs`.
//! The loaded value is immutable and handed to each component constructor.

use crate::{GraphmorphError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "GRAPHMORPH_";

/// Project-local config file name
pub const CONFIG_FILE: &str = "graphmorph.toml";

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_parallel_scan() -> bool {
    true
}

const fn default_max_iterations() -> u32 {
    25
}

const fn default_run_timeout_secs() -> u64 {
    300
}

/// Outbound HTTP settings shared by the prober and the fetcher
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sent as `Authorization: Bearer <token>` when present
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Probe conventional OpenAPI paths concurrently
    #[serde(default = "default_parallel_scan")]
    pub parallel_scan: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            bearer_token: None,
            parallel_scan: default_parallel_scan(),
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Limits applied to every decide/act loop
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Maximum decide steps per loop
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Wall-clock budget per loop
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

impl AgentConfig {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

/// Process-wide configuration, loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphmorphConfig {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

impl GraphmorphConfig {
    /// Load from defaults, `graphmorph.toml` and `GRAPHMORPH_*` variables
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment())
    }

    /// Load with an explicit config file in place of `graphmorph.toml`
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GraphmorphError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }

        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(figment)
    }

    /// Build the provider chain
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            figment = figment.merge(Toml::file(local));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would disable timeouts or the loop cap
    pub fn validate(&self) -> Result<()> {
        if self.http.request_timeout_secs == 0 {
            return Err(GraphmorphError::Config(
                "http.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(GraphmorphError::Config(
                "agent.max_iterations must be greater than zero".to_string(),
            ));
        }
        if self.agent.run_timeout_secs == 0 {
            return Err(GraphmorphError::Config(
                "agent.run_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_correct() {
        let config = GraphmorphConfig::default();
        assert_eq!(config.http.request_timeout_secs, 30);
        assert_eq!(config.http.bearer_token, None);
        assert!(config.http.parallel_scan);
        assert_eq!(config.agent.max_iterations, 25);
        assert_eq!(config.agent.run_timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [http]
                request_timeout_secs = 5
                parallel_scan = false

                [agent]
                max_iterations = 8
                "#,
            )?;

            let config = GraphmorphConfig::load().expect("config loads");
            assert_eq!(config.http.request_timeout_secs, 5);
            assert!(!config.http.parallel_scan);
            assert_eq!(config.agent.max_iterations, 8);
            assert_eq!(config.agent.run_timeout_secs, 300);
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[http]\nrequest_timeout_secs = 5\n")?;
            jail.set_env("GRAPHMORPH_HTTP__REQUEST_TIMEOUT_SECS", "12");
            jail.set_env("GRAPHMORPH_HTTP__BEARER_TOKEN", "secret");

            let config = GraphmorphConfig::load().expect("config loads");
            assert_eq!(config.http.request_timeout(), Duration::from_secs(12));
            assert_eq!(config.http.bearer_token.as_deref(), Some("secret"));
            Ok(())
        });
    }

    #[test]
    fn test_zero_iteration_cap_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("GRAPHMORPH_AGENT__MAX_ITERATIONS", "0");

            let err = GraphmorphConfig::load().unwrap_err();
            assert!(matches!(err, GraphmorphError::Config(_)));
            assert!(err.to_string().contains("max_iterations"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = GraphmorphConfig::load_from(Path::new("nope.toml")).unwrap_err();
            assert!(matches!(err, GraphmorphError::Config(_)));
            Ok(())
        });
    }
}
