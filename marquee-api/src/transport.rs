//! Transport seam and the reqwest-backed REST transport.

use std::time::Duration;

use async_trait::async_trait;
use marquee_core::ApiError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::Value;

/// HTTP verb of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A fully resolved request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub verb: Verb,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Sends resolved requests to the server and returns the decoded body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// Credentials attached to every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientCredentials {
    pub api_key: Option<String>,
    pub token: Option<String>,
}

/// Error body returned by the server on failure.
#[derive(Debug, Deserialize)]
struct ServerError {
    #[serde(alias = "Message", alias = "title")]
    message: String,
}

/// `Transport` over reqwest.
#[derive(Clone)]
pub struct RestTransport {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestTransport {
    pub fn new(
        base_url: &str,
        credentials: &ClientCredentials,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                reason: e.to_string(),
            })?;
        let auth_header = build_auth_headers(credentials)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn parse_response(&self, url: &str, response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if status.is_success() {
            // Handle 204 No Content
            if status.as_u16() == 204 {
                return Ok(Value::Null);
            }
            let text = response.text().await.map_err(transport_error)?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse {
                reason: e.to_string(),
            })
        } else {
            let text = response.text().await.map_err(transport_error)?;
            let message = match serde_json::from_str::<ServerError>(&text) {
                Ok(server_error) => server_error.message,
                Err(_) => text,
            };
            Err(ApiError::RequestFailed {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.verb {
            Verb::Get => self.client.get(&url),
            Verb::Post => self.client.post(&url),
            Verb::Put => self.client.put(&url),
            Verb::Delete => self.client.delete(&url),
        };
        builder = builder.headers(self.auth_header.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(verb = request.verb.as_str(), url = %url, "Sending request");
        let response = builder.send().await.map_err(transport_error)?;
        self.parse_response(&url, response).await
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        reason: err.to_string(),
    }
}

pub(crate) fn build_auth_headers(auth: &ClientCredentials) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ApiError::Transport {
                reason: e.to_string(),
            })?,
        );
    }
    if let Some(token) = &auth.token {
        let value = format!("Bearer {}", token);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ApiError::Transport {
                reason: e.to_string(),
            })?,
        );
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_headers_from_credentials() {
        let headers = build_auth_headers(&ClientCredentials {
            api_key: Some("k".to_string()),
            token: Some("t".to_string()),
        })
        .expect("valid header values");
        assert_eq!(headers.get("x-api-key").map(|v| v.as_bytes()), Some(&b"k"[..]));
        assert_eq!(
            headers.get("authorization").map(|v| v.as_bytes()),
            Some(&b"Bearer t"[..])
        );
    }

    #[test]
    fn test_invalid_header_value_is_an_error() {
        let result = build_auth_headers(&ClientCredentials {
            api_key: Some("bad\nkey".to_string()),
            token: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = RestTransport::new(
            "http://localhost:8096/",
            &ClientCredentials::default(),
            Duration::from_secs(5),
        )
        .expect("client builds");
        assert_eq!(transport.base_url(), "http://localhost:8096");
    }
}
