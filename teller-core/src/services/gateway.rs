//! Authenticated request gateway
//!
//! Every call to the banking API goes through here. The gateway attaches the
//! bearer credential, encodes the payload, and classifies the outcome into
//! the core error taxonomy. It never retries and never touches the
//! credential store beyond reading it.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::api::ErrorBody;
use crate::domain::result::{Error, Result};
use crate::ports::{CredentialStore, HttpRequest, HttpTransport, Method};

const DEFAULT_FALLBACK_MESSAGE: &str = "Request failed";

/// How request parameters travel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    None,
    /// URL query parameters
    Query(Vec<(String, String)>),
    /// application/x-www-form-urlencoded body
    Form(Vec<(String, String)>),
}

/// A call against one API endpoint
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: String,
    pub method: Method,
    pub payload: Payload,
    pub requires_auth: bool,
    /// Shown when an error response carries no message of its own
    pub fallback_message: String,
}

impl ApiRequest {
    fn new(method: Method, endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method,
            payload: Payload::None,
            requires_auth: false,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn get(endpoint: &str) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post(endpoint: &str) -> Self {
        Self::new(Method::Post, endpoint)
    }

    /// Require the bearer credential
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn with_query(mut self, params: Vec<(String, String)>) -> Self {
        self.payload = Payload::Query(params);
        self
    }

    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.payload = Payload::Form(fields);
        self
    }

    pub fn with_fallback(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }
}

/// Gateway to the remote banking service
pub struct Gateway {
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    transport: Arc<dyn HttpTransport>,
}

impl Gateway {
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        Ok(Self {
            base_url,
            credentials,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, endpoint: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| Error::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Perform a call and return the decoded JSON payload
    pub async fn call(&self, request: ApiRequest) -> Result<JsonValue> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];

        if request.requires_auth {
            let token = self.credentials.get()?.ok_or(Error::Unauthenticated)?;
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let (query, form) = match request.payload {
            Payload::None => (Vec::new(), None),
            Payload::Query(params) => (params, None),
            Payload::Form(fields) => (Vec::new(), Some(fields)),
        };

        let http_request = HttpRequest {
            method: request.method,
            url: self.build_url(&request.endpoint, &query)?,
            headers,
            form,
        };

        tracing::debug!(method = %request.method, endpoint = %request.endpoint, "sending request");

        let response = self.transport.send(http_request).await.map_err(|e| {
            tracing::warn!(endpoint = %request.endpoint, error = %e, "transport failure");
            Error::network(&request.endpoint, e.0)
        })?;

        if !response.is_success() {
            let message = ErrorBody::parse(&response.body)
                .and_then(|body| body.message())
                .unwrap_or(request.fallback_message);
            tracing::debug!(endpoint = %request.endpoint, status = response.status, "service error");
            return Err(Error::service(&request.endpoint, response.status, message));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            Error::decode(&request.endpoint, format!("non-JSON body: {}", e))
        })
    }

    /// Perform a call and decode the payload into the endpoint's schema
    pub async fn call_as<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let endpoint = request.endpoint.clone();
        let value = self.call(request).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::decode(endpoint, e.to_string()))
    }
}
