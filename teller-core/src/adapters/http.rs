//! reqwest-backed HTTP transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// HTTP transport over a shared reqwest connection pool
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Create a transport. `None` means requests never time out client-side.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            let secs = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
            TransportError(format!("Connection timed out after {} seconds", secs))
        } else if error.is_connect() {
            TransportError("Unable to connect to the banking service".to_string())
        } else {
            TransportError(format!("Request failed: {}", error))
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await.map_err(|e| self.map_request_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}
