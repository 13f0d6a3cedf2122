//! Web tools backed by the hosted Ollama web API

mod fetch;
mod search;

pub use fetch::WebFetch;
pub use search::{SearchResult, WebSearch};

use serde_json::Value;
use std::time::Duration;

use crate::config::WebConfig;
use crate::error::{Error, Result, ToolError};

pub const MIN_RESULTS: i64 = 1;
pub const MAX_RESULTS: i64 = 10;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Clamp a requested result count into `[1, 10]`
pub fn clamp_max_results(requested: i64) -> u64 {
    requested.clamp(MIN_RESULTS, MAX_RESULTS) as u64
}

/// First `max_chars` characters of `text`, without any marker
pub fn take_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Decode a web API reply into the shape a tool expects
pub(crate) fn decode_reply<T: serde::de::DeserializeOwned>(body: Value) -> std::result::Result<T, ToolError> {
    serde_json::from_value(body)
        .map_err(|e| ToolError::ExecutionFailed(format!("Unexpected web API response: {}", e)))
}

/// Shared HTTP client for the search and fetch tools
#[derive(Clone)]
pub struct WebClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    pub(crate) fetch_max_chars: usize,
    pub(crate) fetch_max_links: usize,
    pub(crate) default_max_results: u64,
}

impl WebClient {
    pub fn new(config: &WebConfig, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create web HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            fetch_max_chars: config.fetch_max_chars,
            fetch_max_links: config.fetch_max_links,
            default_max_results: config.default_max_results,
        })
    }

    /// POST `body` to `{base_url}{path}` and decode the JSON reply
    pub(crate) async fn post(&self, path: &str, body: &Value) -> std::result::Result<Value, ToolError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ToolError::ExecutionFailed(
                "Web tools need an Ollama API key. Set OLLAMA_API_KEY and restart.".into(),
            )
        })?;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Web API request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Web request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed(format!(
                "Web API error ({}): {}",
                status,
                take_chars(&text, 200)
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to parse web API response: {}", e)))
    }
}

/// One-shot HTTP server standing in for the web API
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer the next request with `status` and `body`; returns the base URL
    pub(crate) async fn serve_once(status: u16, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {} OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_max_results() {
        assert_eq!(clamp_max_results(0), 1);
        assert_eq!(clamp_max_results(50), 10);
        assert_eq!(clamp_max_results(3), 3);
    }

    #[test]
    fn test_take_chars_respects_char_boundaries() {
        assert_eq!(take_chars("héllo", 2), "hé");
        assert_eq!(take_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported() {
        let client = WebClient::new(&WebConfig::default(), None).unwrap();
        let err = client.post("/api/web_search", &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("OLLAMA_API_KEY"));
    }
}
