// src/verifier.rs
use crate::types::WhoisError;
use crate::whois::WhoisLookup;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Confirms candidates against their live WHOIS record.
#[derive(Clone)]
pub struct Verifier {
    whois: Arc<dyn WhoisLookup>,
    delay: Duration,
}

impl Verifier {
    pub fn new(whois: Arc<dyn WhoisLookup>, delay: Duration) -> Self {
        Self { whois, delay }
    }

    /// `Ok(Some(domain))` when the record contains `query` verbatim,
    /// `Ok(None)` when it does not or the record is unparsable. Transport
    /// failures are returned to the caller.
    pub async fn verify(&self, domain: &str, query: &str) -> Result<Option<String>, WhoisError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.whois.lookup(domain).await {
            Ok(record) if record.contains(query) => Ok(Some(domain.to_string())),
            Ok(_) => {
                debug!("{}: query not present in WHOIS record", domain);
                Ok(None)
            }
            Err(WhoisError::Parse { reason, .. }) => {
                debug!("{}: dropped, {}", domain, reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::whois::WhoisRecord;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Instant;

    pub(crate) enum Canned {
        Text(&'static str),
        Unparsable,
        Unreachable,
    }

    /// In-memory WHOIS keyed by domain.
    pub(crate) struct FakeWhois(pub HashMap<&'static str, Canned>);

    #[async_trait]
    impl WhoisLookup for FakeWhois {
        async fn lookup(&self, domain: &str) -> Result<WhoisRecord, WhoisError> {
            match self.0.get(domain) {
                Some(Canned::Text(text)) => Ok(WhoisRecord {
                    domain: domain.to_string(),
                    servers: vec!["fake".to_string()],
                    text: text.to_string(),
                }),
                Some(Canned::Unparsable) | None => Err(WhoisError::Parse {
                    domain: domain.to_string(),
                    reason: "empty response".to_string(),
                }),
                Some(Canned::Unreachable) => Err(WhoisError::Io {
                    server: "fake".to_string(),
                    message: "connection reset".to_string(),
                }),
            }
        }
    }

    fn verifier() -> Verifier {
        let whois = FakeWhois(HashMap::from([
            ("match.com", Canned::Text("Registrant Organization: Acme Corp\r\n")),
            ("other.com", Canned::Text("Registrant Organization: ACME CORP\r\n")),
            ("broken.com", Canned::Unparsable),
            ("down.com", Canned::Unreachable),
        ]));
        Verifier::new(Arc::new(whois), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_literal_match_confirms() {
        let result = verifier().verify("match.com", "Acme Corp").await.unwrap();
        assert_eq!(result, Some("match.com".to_string()));
    }

    #[tokio::test]
    async fn test_match_is_case_sensitive() {
        let result = verifier().verify("other.com", "Acme Corp").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_parse_failure_is_dropped() {
        let result = verifier().verify("broken.com", "Acme Corp").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let err = verifier().verify("down.com", "Acme Corp").await.unwrap_err();
        assert!(matches!(err, WhoisError::Io { .. }));
    }

    #[tokio::test]
    async fn test_delay_applies_before_lookup() {
        let whois = FakeWhois(HashMap::from([("match.com", Canned::Text("Acme Corp"))]));
        let verifier = Verifier::new(Arc::new(whois), Duration::from_millis(50));

        let start = Instant::now();
        let result = verifier.verify("match.com", "Acme Corp").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(result.is_some());
    }
}
