// src/config.rs
use crate::error::{ErrorContext, Result};
use crate::types::{Config, WhoxyFinderError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const API_KEY_ENV: &str = "WHOXY_API_KEY";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    whoxy: WhoxySection,
    http: HttpSection,
    whois: WhoisSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WhoxySection {
    api_key: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HttpSection {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    proxy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WhoisSection {
    timeout_secs: Option<u64>,
    server: Option<String>,
    port: Option<u16>,
    iana_server: Option<String>,
    iana_port: Option<u16>,
    follow_referrals: Option<bool>,
}

/// Load configuration from `config_path` (if it exists), then apply
/// environment overrides. A missing file is not an error.
pub fn load_config(config_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if config_path.exists() {
        let contents = fs::read_to_string(config_path)
            .config_context(|| format!("Failed to read {}", config_path.display()))?;
        apply_file(&mut config, &contents)?;
    }

    apply_env_overrides(&mut config, |key| env::var(key).ok());
    validate_config(&config)?;

    Ok(config)
}

fn apply_file(config: &mut Config, contents: &str) -> Result<()> {
    let file: FileConfig = toml::from_str(contents).config_context(|| "Failed to parse config file".to_string())?;

    if let Some(key) = file.whoxy.api_key.filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key.trim().to_string());
    }
    if let Some(base_url) = file.whoxy.base_url {
        config.api_base_url = base_url;
    }

    if let Some(secs) = file.http.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(user_agent) = file.http.user_agent {
        config.user_agent = user_agent;
    }
    if file.http.proxy.is_some() {
        config.proxy = file.http.proxy;
    }

    if let Some(secs) = file.whois.timeout_secs {
        config.whois.timeout = Duration::from_secs(secs);
    }
    if file.whois.server.is_some() {
        config.whois.server = file.whois.server;
    }
    if let Some(port) = file.whois.port {
        config.whois.port = port;
    }
    if let Some(iana_server) = file.whois.iana_server {
        config.whois.iana_server = iana_server;
    }
    if let Some(iana_port) = file.whois.iana_port {
        config.whois.iana_port = iana_port;
    }
    if let Some(follow) = file.whois.follow_referrals {
        config.whois.follow_referrals = follow;
    }

    Ok(())
}

pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key.trim().to_string());
    }
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.timeout.is_zero() {
        return Err(WhoxyFinderError::ConfigError("HTTP timeout must be greater than 0".to_string()));
    }
    if config.whois.timeout.is_zero() {
        return Err(WhoxyFinderError::ConfigError("WHOIS timeout must be greater than 0".to_string()));
    }
    if config.workers == 0 {
        return Err(WhoxyFinderError::ConfigError("Thread count must be greater than 0".to_string()));
    }
    Url::parse(&config.api_base_url)
        .config_context(|| format!("Invalid API base URL {}", config.api_base_url))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_values_are_applied() {
        let mut config = Config::default();
        apply_file(
            &mut config,
            r#"
[whoxy]
api_key = " abc123 "

[http]
timeout_secs = 5

[whois]
server = "whois.verisign-grs.com"
follow_referrals = false
"#,
        )
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.whois.server.as_deref(), Some("whois.verisign-grs.com"));
        assert!(!config.whois.follow_referrals);
        assert_eq!(config.whois.port, 43);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.workers, 1);
        assert_eq!(config.api_base_url, crate::types::DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_load_from_disk() {
        let file = write_config(
            "[whois]\ntimeout_secs = 7\nport = 4343\niana_server = \"whois.example.net\"\niana_port = 4344\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.whois.timeout, Duration::from_secs(7));
        assert_eq!(config.whois.port, 4343);
        assert_eq!(config.whois.iana_server, "whois.example.net");
        assert_eq!(config.whois.iana_port, 4344);
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let file = write_config("[Whoxy]\nWHOXY_API_KEY = \"abc\"\n");
        assert!(matches!(load_config(file.path()), Err(WhoxyFinderError::ConfigError(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        apply_env_overrides(&mut config, |key| {
            (key == API_KEY_ENV).then(|| "from-env".to_string())
        });
        assert_eq!(config.api_key.as_deref(), Some("from-env"));

        apply_env_overrides(&mut config, |_| Some("   ".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        assert!(validate_config(&config).is_ok());

        config.workers = 0;
        assert!(validate_config(&config).is_err());

        config.workers = 4;
        config.api_base_url = "nope".to_string();
        assert!(validate_config(&config).is_err());
    }
}
