// src/whois.rs
use crate::extractor::extract_field;
use crate::types::{IdentityField, WhoisConfig, WhoisError};
use crate::utils::tld_of;
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const WHOIS_PORT: u16 = 43;

/// Line prefixes registries use to say a domain has no record.
const NOT_FOUND_MARKERS: &[&str] = &[
    "no match for",
    "not found",
    "no data found",
    "no entries found",
    "no object found",
    "domain not found",
    "no matching record",
    "status: free",
    "status: available",
];

/// Raw WHOIS text for one domain.
#[derive(Debug, Clone)]
pub struct WhoisRecord {
    pub domain: String,
    /// Servers that contributed to `text`, registry first.
    pub servers: Vec<String>,
    pub text: String,
}

impl WhoisRecord {
    /// Literal, case-sensitive substring test.
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    pub fn field(&self, field: IdentityField) -> Option<&str> {
        extract_field(&self.text, field)
    }
}

#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, WhoisError>;
}

/// WHOIS over TCP: IANA for the registry server, then the registry, then the
/// registrar when a thin registry points elsewhere.
#[derive(Clone)]
pub struct WhoisClient {
    config: WhoisConfig,
    servers: Arc<DashMap<String, String>>,
}

impl WhoisClient {
    pub fn new(config: WhoisConfig) -> Self {
        Self {
            config,
            servers: Arc::new(DashMap::new()),
        }
    }

    /// Send one query line and read until the server closes the connection.
    pub async fn query(&self, server: &str, port: u16, query: &str) -> Result<String, WhoisError> {
        let exchange = async {
            let mut stream = TcpStream::connect((server, port)).await?;
            stream.write_all(format!("{}\r\n", query).as_bytes()).await?;

            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        };

        match timeout(self.config.timeout, exchange).await {
            Ok(Ok(buf)) => Ok(String::from_utf8_lossy(&buf).into_owned()),
            Ok(Err(e)) => Err(WhoisError::Io {
                server: server.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(WhoisError::Timeout {
                server: server.to_string(),
            }),
        }
    }

    /// Query a discovered server, given as `host` or `host:port`.
    async fn query_referred(&self, server: &str, query: &str) -> Result<String, WhoisError> {
        let (host, port) = split_endpoint(server);
        self.query(host, port, query).await
    }

    /// Registry server for `domain`, resolved through IANA once per TLD.
    async fn server_for(&self, domain: &str) -> Result<String, WhoisError> {
        let tld = tld_of(domain).ok_or_else(|| WhoisError::NoServer(domain.to_string()))?;
        if let Some(server) = self.servers.get(&tld).map(|entry| entry.value().clone()) {
            return Ok(server);
        }

        let response = self
            .query(&self.config.iana_server, self.config.iana_port, &tld)
            .await?;
        let server = parse_iana_referral(&response)
            .ok_or_else(|| WhoisError::NoServer(domain.to_string()))?;

        debug!("WHOIS server for .{}: {}", tld, server);
        self.servers.insert(tld, server.clone());
        Ok(server)
    }

    async fn query_registry(&self, domain: &str) -> Result<(String, String), WhoisError> {
        if let Some(server) = &self.config.server {
            let text = self.query(server, self.config.port, domain).await?;
            return Ok((server.clone(), text));
        }

        let server = self.server_for(domain).await?;
        let text = self.query_referred(&server, domain).await?;
        Ok((server, text))
    }
}

#[async_trait]
impl WhoisLookup for WhoisClient {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, WhoisError> {
        let (server, mut text) = self.query_registry(domain).await?;
        check_record(domain, &text)?;

        let mut servers = vec![server.clone()];

        if self.config.follow_referrals {
            if let Some(registrar) = parse_registrar_referral(&text) {
                if !registrar.eq_ignore_ascii_case(&server) {
                    match self.query_referred(&registrar, domain).await {
                        Ok(extra) => {
                            text.push('\n');
                            text.push_str(&extra);
                            servers.push(registrar);
                        }
                        Err(e) => debug!("Registrar referral for {} failed: {}", domain, e),
                    }
                }
            }
        }

        Ok(WhoisRecord {
            domain: domain.to_string(),
            servers,
            text,
        })
    }
}

/// Split `host:port`; a bare host gets the standard WHOIS port.
fn split_endpoint(server: &str) -> (&str, u16) {
    match server.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && !host.contains(':') => match port.parse() {
            Ok(port) => (host, port),
            Err(_) => (server, WHOIS_PORT),
        },
        _ => (server, WHOIS_PORT),
    }
}

/// Reject empty and "no match" responses as unparsable.
fn check_record(domain: &str, text: &str) -> Result<(), WhoisError> {
    if text.trim().is_empty() {
        return Err(WhoisError::Parse {
            domain: domain.to_string(),
            reason: "empty response".to_string(),
        });
    }

    for line in text.lines() {
        let line = line
            .trim_start_matches(|c: char| c == '%' || c == '#' || c.is_whitespace())
            .to_lowercase();
        if let Some(marker) = NOT_FOUND_MARKERS.iter().find(|m| line.starts_with(*m)) {
            return Err(WhoisError::Parse {
                domain: domain.to_string(),
                reason: format!("registry answered '{}'", marker),
            });
        }
    }

    Ok(())
}

fn value_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = line.split_once(':')?;
    if name.trim().eq_ignore_ascii_case(key) {
        Some(value.trim())
    } else {
        None
    }
}

fn clean_host(value: &str) -> Option<String> {
    let host = value
        .trim()
        .trim_start_matches("whois://")
        .trim_start_matches("rwhois://")
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');
    let host = host.split(|c: char| c == '/' || c.is_whitespace()).next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

/// Registry server named by an IANA TLD response (`refer:` or `whois:`).
pub fn parse_iana_referral(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| value_after(line, "refer").or_else(|| value_after(line, "whois")))
        .and_then(clean_host)
}

/// Registrar server named in a thin registry response.
pub fn parse_registrar_referral(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| value_after(line, "Registrar WHOIS Server"))
        .and_then(clean_host)
}
