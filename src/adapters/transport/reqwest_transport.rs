//! Reqwest Transport - HttpTransport over `reqwest::Client`.

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;

use crate::ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Sends requests with a shared connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn map_error(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::timeout(format!("request timed out: {}", error))
        } else if error.is_connect() {
            TransportError::connect(format!("Failed to fetch: {}", error))
        } else {
            TransportError::other(format!("network error: {}", error))
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(Self::method(request.method), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(Self::map_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(Self::map_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_millis(500));
        // Port 9 (discard) on localhost is closed in test environments.
        let result = transport.send(&HttpRequest::get("http://127.0.0.1:9/health")).await;
        assert!(result.is_err());
    }

    #[test]
    fn maps_every_method() {
        assert_eq!(ReqwestTransport::method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestTransport::method(HttpMethod::Put), Method::PUT);
    }
}
