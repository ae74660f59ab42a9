use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub advice: AdviceConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct AdviceConfig {
    pub enabled: bool,
}

impl AdviceConfig {
    pub fn enabled() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
            advice: Self::advice_config_from_env(),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn advice_config_from_env() -> AdviceConfig {
        // Only the exact value "true" turns the advice on
        let enabled = env::var("PLUGINS_CONTROLLER_ADVICE_ENABLED")
            .map(|v| is_enabled(&v))
            .unwrap_or(false);

        AdviceConfig { enabled }
    }
}

fn is_enabled(value: &str) -> bool {
    value.trim() == "true"
}
