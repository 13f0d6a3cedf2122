//! Web fetch tool

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ToolError;
use crate::tools::{BoxFuture, Tool, ToolOutput, WEB_FETCH, required_str};

use super::{WebClient, decode_reply, take_chars};

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    links: Vec<String>,
}

/// Tool for fetching the readable content of a page
pub struct WebFetch {
    client: WebClient,
}

impl WebFetch {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for WebFetch {
    fn name(&self) -> &str {
        WEB_FETCH
    }

    fn description(&self) -> &str {
        "Fetch a web page and return its title, text content and links. Long pages are truncated."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Fully-formed http or https URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let raw_url = required_str(&params, "url")?;
            let parsed = url::Url::parse(raw_url)
                .map_err(|e| ToolError::InvalidParams(format!("Invalid URL: {}", e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ToolError::InvalidParams(format!(
                    "Unsupported URL scheme: {}",
                    parsed.scheme()
                )));
            }

            let body = self
                .client
                .post("/api/web_fetch", &json!({ "url": parsed.as_str() }))
                .await?;
            let page: FetchResponse = decode_reply(body)?;

            let links: Vec<String> = page
                .links
                .into_iter()
                .take(self.client.fetch_max_links)
                .collect();

            Ok(ToolOutput::success(json!({
                "title": page.title,
                "content": take_chars(&page.content, self.client.fetch_max_chars),
                "links": links
            })))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebConfig;
    use crate::tools::web::test_server::serve_once;

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let tool = WebFetch::new(WebClient::new(&WebConfig::default(), Some("key".into())).unwrap());

        let err = tool.execute(json!({"url": "file:///etc/passwd"})).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameters: Unsupported URL scheme: file");

        let err = tool.execute(json!({"url": "not a url"})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_a_failure() {
        let base_url = serve_once(200, r#"{"title":"Page","links":"nope"}"#).await;
        let config = WebConfig {
            base_url,
            ..Default::default()
        };
        let tool = WebFetch::new(WebClient::new(&config, Some("key".into())).unwrap());

        let err = tool.execute(json!({"url": "https://example.com"})).await.unwrap_err();

        assert!(err.to_string().starts_with("Unexpected web API response:"), "{}", err);
    }
}
