//! Flow account, token and Cadence path configuration
//!
//! Configuration is read once from an [`EnvSource`] and then treated as
//! immutable. Nothing is validated or defaulted during load: an unset variable
//! stays `None`, and checking for required values is left to the caller via
//! [`Config::missing`] or [`Config::require`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use kibble_tools::config::Config;
//! use kibble_tools::env::ProcessEnv;
//!
//! let config = Config::load(&ProcessEnv::with_dotenv());
//! println!("Access node: {:?}", config.node_url);
//! println!("FLOW balance script: {}", config.paths.scripts.get_flow);
//! ```

use serde::Serialize;
use std::fmt::{self, Write as _};
use thiserror::Error;
use tracing::{debug, info};

use crate::env::EnvSource;
use crate::paths::PathTable;

/// Placeholder printed in place of secret values
pub const REDACTED: &str = "[REDACTED]";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Env file error: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Missing required variables: {0}")]
    MissingField(String),

    #[error("Invalid path kind: {0}. Must be: script or transaction")]
    InvalidPathKind(String),

    #[error("Unknown environment variable: {0}")]
    UnknownVariable(String),
}

/// Environment variables the configuration is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvKey {
    AccessNode,
    PrivateKey,
    PublicKey,
    KeyId,
    AccountAddress,
    FlowToken,
    FusdToken,
    KibbleToken,
    FungibleToken,
    NonFungibleToken,
    AlchemyKey,
}

impl EnvKey {
    pub const ALL: [EnvKey; 11] = [
        EnvKey::AccessNode,
        EnvKey::PrivateKey,
        EnvKey::PublicKey,
        EnvKey::KeyId,
        EnvKey::AccountAddress,
        EnvKey::FlowToken,
        EnvKey::FusdToken,
        EnvKey::KibbleToken,
        EnvKey::FungibleToken,
        EnvKey::NonFungibleToken,
        EnvKey::AlchemyKey,
    ];

    /// Exact environment variable name
    pub fn name(&self) -> &'static str {
        match self {
            EnvKey::AccessNode => "FLOW_ACCESS_NODE",
            EnvKey::PrivateKey => "FLOW_ACCOUNT_PRIVATE_KEY",
            EnvKey::PublicKey => "FLOW_ACCOUNT_PUBLIC_KEY",
            EnvKey::KeyId => "FLOW_ACCOUNT_KEY_ID",
            EnvKey::AccountAddress => "FLOW_ACCOUNT_ADDRESS",
            EnvKey::FlowToken => "FLOW_TOKEN_ADDRESS",
            EnvKey::FusdToken => "FUSD_TOKEN_ADDRESS",
            EnvKey::KibbleToken => "KIBBLE_TOKEN_ADDRESS",
            EnvKey::FungibleToken => "FLOW_FUNGIBLE_ADDRESS",
            EnvKey::NonFungibleToken => "FLOW_NONFUNGIBLE_ADDRESS",
            EnvKey::AlchemyKey => "ALCHEMY_KEY",
        }
    }

    /// Whether the value must not be printed in summaries
    pub fn is_secret(&self) -> bool {
        matches!(self, EnvKey::PrivateKey | EnvKey::AlchemyKey)
    }

    /// Look up a key by its variable name
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        EnvKey::ALL
            .into_iter()
            .find(|key| key.name() == name)
            .ok_or_else(|| ConfigError::UnknownVariable(name.to_string()))
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Resolved configuration, built once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Flow access node URL
    pub node_url: Option<String>,
    /// Signing account private key
    pub private_key: Option<String>,
    pub public_key: Option<String>,
    /// Index of the signing key on the account, kept as text
    pub account_key_id: Option<String>,
    pub account_address: Option<String>,
    pub flow_token_address: Option<String>,
    pub fusd_token_address: Option<String>,
    pub kibble_token_address: Option<String>,
    /// FungibleToken standard contract address
    pub fungible_token_address: Option<String>,
    /// NonFungibleToken standard contract address
    pub non_fungible_token_address: Option<String>,
    /// Alchemy API key
    pub alchemy_key: Option<String>,
    /// Cadence script and transaction paths
    pub paths: PathTable,
}

impl Config {
    /// Read every variable from `source` once and build the path table.
    ///
    /// Values are taken verbatim: no trimming, parsing or defaults.
    pub fn load(source: &impl EnvSource) -> Self {
        let read = |key: EnvKey| {
            let value = source.var(key.name());
            if value.is_none() {
                debug!(var = key.name(), "environment variable not set");
            }
            value
        };

        let config = Config {
            node_url: read(EnvKey::AccessNode),
            private_key: read(EnvKey::PrivateKey),
            public_key: read(EnvKey::PublicKey),
            account_key_id: read(EnvKey::KeyId),
            account_address: read(EnvKey::AccountAddress),
            flow_token_address: read(EnvKey::FlowToken),
            fusd_token_address: read(EnvKey::FusdToken),
            kibble_token_address: read(EnvKey::KibbleToken),
            fungible_token_address: read(EnvKey::FungibleToken),
            non_fungible_token_address: read(EnvKey::NonFungibleToken),
            alchemy_key: read(EnvKey::AlchemyKey),
            paths: PathTable::new(),
        };

        info!(
            set = EnvKey::ALL.len() - config.missing().len(),
            total = EnvKey::ALL.len(),
            "configuration loaded"
        );
        config
    }

    /// Value loaded for `key`
    pub fn get(&self, key: EnvKey) -> Option<&str> {
        let value = match key {
            EnvKey::AccessNode => &self.node_url,
            EnvKey::PrivateKey => &self.private_key,
            EnvKey::PublicKey => &self.public_key,
            EnvKey::KeyId => &self.account_key_id,
            EnvKey::AccountAddress => &self.account_address,
            EnvKey::FlowToken => &self.flow_token_address,
            EnvKey::FusdToken => &self.fusd_token_address,
            EnvKey::KibbleToken => &self.kibble_token_address,
            EnvKey::FungibleToken => &self.fungible_token_address,
            EnvKey::NonFungibleToken => &self.non_fungible_token_address,
            EnvKey::AlchemyKey => &self.alchemy_key,
        };
        value.as_deref()
    }

    /// Keys with no value, in declaration order
    pub fn missing(&self) -> Vec<EnvKey> {
        EnvKey::ALL
            .into_iter()
            .filter(|key| self.get(*key).is_none())
            .collect()
    }

    /// Fail unless every key in `required` has a value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` naming all absent variables.
    pub fn require(&self, required: &[EnvKey]) -> Result<(), ConfigError> {
        let absent: Vec<&str> = required
            .iter()
            .filter(|key| self.get(**key).is_none())
            .map(|key| key.name())
            .collect();

        if absent.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingField(absent.join(", ")))
        }
    }

    /// Copy with secret values replaced by [`REDACTED`]
    pub fn redacted(&self) -> Self {
        let hide = |value: &Option<String>| value.as_ref().map(|_| REDACTED.to_string());
        Config {
            private_key: hide(&self.private_key),
            alchemy_key: hide(&self.alchemy_key),
            ..self.clone()
        }
    }

    /// Boxed text summary of the resolved configuration
    pub fn summary(&self) -> String {
        let rule = "════════════════════════════════════════════════════════════════";
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "╔{rule}╗");
        let _ = writeln!(out, "║              FLOW CONFIGURATION RESOLVED                       ║");
        let _ = writeln!(out, "╚{rule}╝");
        for key in EnvKey::ALL {
            let value = self.get(key).unwrap_or("(not configured)");
            let _ = writeln!(out, "  {:<26} {}", key, value);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "  Scripts:");
        for (name, entry) in self.paths.scripts() {
            let _ = writeln!(out, "    {:<24} {}", name, entry);
        }
        let _ = writeln!(out, "  Transactions:");
        for (name, entry) in self.paths.transactions() {
            let _ = writeln!(out, "    {:<24} {}", name, entry);
        }
        let _ = writeln!(out, "╚{rule}╝");
        out
    }

    /// Print the resolved configuration
    pub fn print_summary(&self) {
        print!("{}", self.summary());
    }

    /// Get configuration as JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Get configuration as TOML; unset values are omitted
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}
