// src/session.rs
use crate::types::{Config, WhoxyFinderError};
use reqwest::Client;
use std::time::Duration;

/// Longest body excerpt carried inside a JSON parse error.
const BODY_EXCERPT_LEN: usize = 512;

#[derive(Clone)]
pub struct Session {
    pub client: Client,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, WhoxyFinderError> {
        let mut client_builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| WhoxyFinderError::ConfigError(format!("Invalid proxy URL: {}", e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .map_err(|e| WhoxyFinderError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Session { client })
    }

    /// Transport failures surface as `HttpError` with the URL (and its API key) stripped.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, WhoxyFinderError> {
        let response = self.client.get(url).send().await.map_err(|e| e.without_url())?;
        Ok(response)
    }

    /// GET and decode a JSON body. The body is read as text first so a decode
    /// failure can report what the server actually sent.
    pub async fn get_json<T>(&self, url: &str) -> Result<T, WhoxyFinderError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.get(url).await?;

        if !response.status().is_success() {
            return Err(WhoxyFinderError::NetworkError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let text = response.text().await.map_err(|e| e.without_url())?;

        serde_json::from_str(&text)
            .map_err(|e| WhoxyFinderError::JsonParseError(e.to_string(), excerpt(&text)))
    }
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connection_failure_is_http_error_without_key() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let session = Session::new(&Config::default()).unwrap();
        let url = format!("http://127.0.0.1:{}/?key=secret-key&reverse=whois", port);
        let err = session.get(&url).await.unwrap_err();

        assert!(matches!(err, WhoxyFinderError::HttpError(_)));
        assert!(!err.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/").with_status(503).create_async().await;

        let session = Session::new(&Config::default()).unwrap();
        let err = session
            .get_json::<serde_json::Value>(&server.url())
            .await
            .unwrap_err();

        assert!(matches!(err, WhoxyFinderError::NetworkError(msg) if msg.contains("503")));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(BODY_EXCERPT_LEN + 10);
        let cut = excerpt(&long);
        assert_eq!(cut.len(), BODY_EXCERPT_LEN + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("short"), "short");
    }
}
