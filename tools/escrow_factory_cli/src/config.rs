//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the escrow
//! factory gateway. Configuration includes the RPC endpoint, the deployed
//! program id, the signer keypair and confirmation polling bounds.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
};
use std::str::FromStr;

use crate::rpc::Commitment;

/// Environment variable holding a config file path.
pub const CONFIG_PATH_ENV: &str = "ESCROW_FACTORY_CONFIG_PATH";

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/escrow_factory.toml";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Network connection (RPC URL, commitment)
    pub network: NetworkConfig,
    /// Deployed escrow factory program
    pub program: ProgramConfig,
    /// Transaction signer
    pub signer: SignerConfig,
    /// Confirmation polling bounds
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
}

/// Network connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Solana RPC endpoint (e.g., "http://127.0.0.1:8899")
    pub rpc_url: String,
    /// Commitment a transaction must reach to count as confirmed
    #[serde(default)]
    pub commitment: Commitment,
}

/// Program settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Program id of the deployed escrow factory program (base58)
    pub program_id: String,
}

/// Signer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Path to a Solana JSON keypair file that pays for transactions
    pub keypair_path: String,
}

/// Confirmation polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    /// Delay between signature status checks in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Number of status checks before giving up
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_max_polls() -> u32 {
    120
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
        }
    }
}

/// Command-line values that replace file values before validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rpc_url: Option<String>,
    pub program_id: Option<String>,
    pub keypair_path: Option<String>,
}

impl GatewayConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to config file. If None, uses ESCROW_FACTORY_CONFIG_PATH env var or default.
    ///
    /// # Returns
    ///
    /// * `Ok(GatewayConfig)` - Successfully loaded and validated configuration
    /// * `Err(anyhow::Error)` - File missing, unparsable or invalid
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        Self::load_with_overrides(path, ConfigOverrides::default())
    }

    /// Loads configuration from a TOML file, applies overrides, then validates.
    ///
    /// File values replaced by an override are never validated, so a template
    /// with placeholder values can be completed from the command line.
    pub fn load_with_overrides(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> anyhow::Result<Self> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        if !std::path::Path::new(&config_path).exists() {
            return Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/escrow_factory.template.toml {}\n\
                Then edit it with your actual values.",
                config_path,
                config_path
            ));
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path))?;
        let mut config: GatewayConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path))?;
        config.set_overrides(overrides);
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", config_path))?;
        Ok(config)
    }

    /// Loads configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: GatewayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces file values with command-line overrides, then re-validates.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> anyhow::Result<()> {
        self.set_overrides(overrides);
        self.validate()
    }

    fn set_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(rpc_url) = overrides.rpc_url {
            self.network.rpc_url = rpc_url;
        }
        if let Some(program_id) = overrides.program_id {
            self.program.program_id = program_id;
        }
        if let Some(keypair_path) = overrides.keypair_path {
            self.signer.keypair_path = keypair_path;
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Checks:
    /// - RPC URL is http(s)
    /// - Program id is a valid base58 pubkey
    /// - Keypair path is set
    /// - Poll interval and poll count are positive
    pub fn validate(&self) -> anyhow::Result<()> {
        let rpc_url = &self.network.rpc_url;
        if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            anyhow::bail!(
                "Configuration error: rpc_url '{}' must start with http:// or https://",
                rpc_url
            );
        }

        self.program_id()?;

        if self.signer.keypair_path.trim().is_empty() {
            anyhow::bail!("Configuration error: signer.keypair_path must not be empty");
        }
        if self.confirmation.poll_interval_ms == 0 {
            anyhow::bail!("Configuration error: confirmation.poll_interval_ms must be positive");
        }
        if self.confirmation.max_polls == 0 {
            anyhow::bail!("Configuration error: confirmation.max_polls must be positive");
        }
        Ok(())
    }

    /// Parsed program id.
    pub fn program_id(&self) -> anyhow::Result<Pubkey> {
        Pubkey::from_str(&self.program.program_id).map_err(|_| {
            anyhow::anyhow!(
                "Configuration error: program_id '{}' is not a valid base58 pubkey",
                self.program.program_id
            )
        })
    }

    /// Reads the signer keypair. A leading `~/` expands to $HOME.
    pub fn load_keypair(&self) -> anyhow::Result<Keypair> {
        let path = expand_home(&self.signer.keypair_path);
        read_keypair_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read keypair file {}: {}", path, e))
    }
}

fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path.to_string(),
    }
}
