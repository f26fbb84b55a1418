// src/query.rs
use crate::error::Result;
use crate::types::{IdentityField, WhoxyFinderError};
use url::Url;

/// A reverse-WHOIS search against the Whoxy API.
///
/// `micro` mode keeps each page down to domain names, which is all the
/// collector reads.
#[derive(Debug, Clone)]
pub struct ReverseQuery {
    field: IdentityField,
    value: String,
    url: Url,
}

impl ReverseQuery {
    pub fn new(base_url: &str, api_key: &str, field: IdentityField, value: &str) -> Result<Self> {
        let mut url = Url::parse(base_url)
            .map_err(|e| WhoxyFinderError::ConfigError(format!("Invalid API base URL {}: {}", base_url, e)))?;

        url.query_pairs_mut()
            .clear()
            .append_pair("key", api_key)
            .append_pair("reverse", "whois")
            .append_pair("mode", "micro")
            .append_pair(field.query_param(), value);

        Ok(Self {
            field,
            value: value.to_string(),
            url,
        })
    }

    pub fn field(&self) -> IdentityField {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL for a 1-indexed result page.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_API_BASE_URL;

    fn params(url: &Url) -> Vec<(String, String)> {
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    #[test]
    fn test_single_selector_populated() {
        for field in IdentityField::ALL {
            let query = ReverseQuery::new(DEFAULT_API_BASE_URL, "k3y", field, "Acme Corp").unwrap();
            let pairs = params(query.url());
            let selectors: Vec<&(String, String)> = pairs
                .iter()
                .filter(|(k, _)| matches!(k.as_str(), "company" | "name" | "email"))
                .collect();
            assert_eq!(selectors.len(), 1);
            assert_eq!(selectors[0].0, field.query_param());
            assert_eq!(selectors[0].1, "Acme Corp");
        }
    }

    #[test]
    fn test_fixed_parameters() {
        let query = ReverseQuery::new(DEFAULT_API_BASE_URL, "k3y", IdentityField::Email, "a@b.com").unwrap();
        let pairs = params(query.url());
        assert!(pairs.contains(&("key".to_string(), "k3y".to_string())));
        assert!(pairs.contains(&("reverse".to_string(), "whois".to_string())));
        assert!(pairs.contains(&("mode".to_string(), "micro".to_string())));
        assert_eq!(query.url().host_str(), Some("api.whoxy.com"));
    }

    #[test]
    fn test_value_is_percent_encoded() {
        let query = ReverseQuery::new(
            DEFAULT_API_BASE_URL,
            "k3y",
            IdentityField::Organization,
            "AT&T Inc./R&D=1",
        )
        .unwrap();
        let raw = query.url().as_str();
        assert!(raw.contains("company=AT%26T+Inc.%2FR%26D%3D1"));
        assert!(!raw.contains("AT&T"));
        assert_eq!(query.value(), "AT&T Inc./R&D=1");
    }

    #[test]
    fn test_page_url() {
        let query = ReverseQuery::new(DEFAULT_API_BASE_URL, "k3y", IdentityField::OwnerName, "Jane").unwrap();
        let page = query.page_url(3);
        assert!(params(&page).contains(&("page".to_string(), "3".to_string())));
        assert!(!query.url().as_str().contains("page="));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ReverseQuery::new("not a url", "k", IdentityField::Email, "x").unwrap_err();
        assert!(matches!(err, WhoxyFinderError::ConfigError(_)));
    }
}
