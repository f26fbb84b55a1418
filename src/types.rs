// src/types.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.whoxy.com/";
pub const DEFAULT_CONFIG_PATH: &str = "whoxyfinder.toml";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
    pub workers: usize,
    pub delay: Duration,
    pub whois: WhoisConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("WhoxyFinder/{}", env!("CARGO_PKG_VERSION")),
            proxy: None,
            workers: 1,
            delay: Duration::ZERO,
            whois: WhoisConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WhoisConfig {
    pub timeout: Duration,
    /// Skip IANA discovery and send every query to this server.
    pub server: Option<String>,
    /// Port of the fixed `server`. Discovered servers use their own port or 43.
    pub port: u16,
    pub iana_server: String,
    pub iana_port: u16,
    pub follow_referrals: bool,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            server: None,
            port: 43,
            iana_server: "whois.iana.org".to_string(),
            iana_port: 43,
            follow_referrals: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: Option<String>,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Registrant attribute a reverse search pivots on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    #[value(name = "1", alias = "org", alias = "company")]
    Organization,
    #[value(name = "2", alias = "name", alias = "owner")]
    OwnerName,
    #[value(name = "3", alias = "email")]
    Email,
}

impl IdentityField {
    pub const ALL: [IdentityField; 3] = [
        IdentityField::Organization,
        IdentityField::OwnerName,
        IdentityField::Email,
    ];

    /// Query parameter the Whoxy reverse endpoint expects for this field.
    pub fn query_param(self) -> &'static str {
        match self {
            IdentityField::Organization => "company",
            IdentityField::OwnerName => "name",
            IdentityField::Email => "email",
        }
    }

    /// Numeric selector shown to the operator (`-c 1|2|3`).
    pub fn choice(self) -> u8 {
        match self {
            IdentityField::Organization => 1,
            IdentityField::OwnerName => 2,
            IdentityField::Email => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IdentityField::Organization => "Company Name",
            IdentityField::OwnerName => "Owner Name",
            IdentityField::Email => "Email Address",
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_param())
    }
}

/// How the search value is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Print the extractable fields of a domain and stop.
    Inspect { domain: String },
    /// Pull the search value out of a domain's own WHOIS record.
    FromDomain { domain: String, field: IdentityField },
    Direct { field: IdentityField, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// Every page the API reported was fetched.
    Exhausted,
    /// A page could not be fetched or decoded; collection stopped there.
    Failed { page: u32, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub field: IdentityField,
    pub query: String,
    pub candidates: usize,
    pub verified_count: usize,
    pub rejected: usize,
    pub failed: usize,
    pub pages_fetched: u32,
    pub termination: Termination,
    pub verified: Vec<String>,
    pub duration: Duration,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum WhoisError {
    /// Empty or "no match" style record. Expected for restricted registries.
    #[error("unparsable WHOIS record for {domain}: {reason}")]
    Parse { domain: String, reason: String },

    #[error("WHOIS I/O error talking to {server}: {message}")]
    Io { server: String, message: String },

    #[error("WHOIS timeout talking to {server}")]
    Timeout { server: String },

    #[error("no WHOIS server known for {0}")]
    NoServer(String),
}

#[derive(Debug, Error)]
pub enum WhoxyFinderError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No Whoxy API key configured (set WHOXY_API_KEY or [whoxy] api_key)")]
    MissingApiKey,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}\nBody: {1}")]
    JsonParseError(String, String),

    #[error(transparent)]
    Whois(#[from] WhoisError),

    #[error("{field} not found in WHOIS record of {domain}")]
    FieldNotFound { domain: String, field: &'static str },

    #[error("Output error: {0}")]
    OutputError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_field_params() {
        assert_eq!(IdentityField::Organization.query_param(), "company");
        assert_eq!(IdentityField::OwnerName.query_param(), "name");
        assert_eq!(IdentityField::Email.query_param(), "email");
    }

    #[test]
    fn test_identity_field_from_choice() {
        assert_eq!(IdentityField::from_str("1", false), Ok(IdentityField::Organization));
        assert_eq!(IdentityField::from_str("2", false), Ok(IdentityField::OwnerName));
        assert_eq!(IdentityField::from_str("3", false), Ok(IdentityField::Email));
        assert_eq!(IdentityField::from_str("org", true), Ok(IdentityField::Organization));
        assert!(IdentityField::from_str("4", false).is_err());
    }

    #[test]
    fn test_choices_are_distinct() {
        let choices: Vec<u8> = IdentityField::ALL.iter().map(|f| f.choice()).collect();
        assert_eq!(choices, vec![1, 2, 3]);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.workers, 1);
        assert!(config.delay.is_zero());
        assert_eq!(config.whois.port, 43);
        assert_eq!(config.whois.iana_server, "whois.iana.org");
        assert_eq!(config.whois.iana_port, 43);
        assert!(config.api_key.is_none());
    }
}
