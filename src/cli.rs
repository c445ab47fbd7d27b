//! Command line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, validate_config, ConfigError, ProxyConfig};

/// Forward HTTP proxy with CONNECT tunneling and basic auth.
#[derive(Debug, Parser)]
#[command(name = "forward-proxy", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:18080
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Proxy username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Proxy password (may be empty)
    #[arg(short = 'P', long)]
    pub password: Option<String>,
}

impl Cli {
    /// Load the config file (or defaults), apply flag overrides and validate.
    pub fn load_config(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if let Some(username) = &self.username {
            config.auth.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.auth.password = password.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
