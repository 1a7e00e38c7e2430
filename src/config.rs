use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for paper-trail
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaperTrailConfig {
    /// Workflow engine tuning
    pub engine: EngineConfig,
    /// Sealing service settings
    pub sealing: SealingConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Bounded internal retries when a compare-and-set loses the race
    pub cas_retry_limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SealingConfig {
    /// Endpoint of the external sealing service, if any. Unset means the
    /// in-process sealer (demo and test wiring).
    pub endpoint: Option<String>,
    /// Timeout for a single sealing call
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Enable structured tracing output
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
}

impl Default for PaperTrailConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig { cas_retry_limit: 3 },
            sealing: SealingConfig {
                endpoint: None,
                timeout_seconds: 30,
            },
            observability: ObservabilityConfig {
                tracing_enabled: true,
                log_level: "info".to_string(),
            },
        }
    }
}

impl PaperTrailConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (paper-trail.toml)
    /// 3. Environment variables (prefixed with PAPER_TRAIL_)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&PaperTrailConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("paper-trail.toml").exists() {
            builder = builder.add_source(File::with_name("paper-trail"));
        }

        builder = builder.add_source(
            Environment::with_prefix("PAPER_TRAIL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<PaperTrailConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = PaperTrailConfig::load_env_file();
        PaperTrailConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static PaperTrailConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = PaperTrailConfig::default();
        assert!(config.engine.cas_retry_limit >= 1);
        assert!(config.sealing.endpoint.is_none());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = PaperTrailConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: PaperTrailConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.engine.cas_retry_limit, config.engine.cas_retry_limit);
        assert_eq!(back.sealing.timeout_seconds, config.sealing.timeout_seconds);
    }
}
