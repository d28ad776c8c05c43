//! HTTP transport for Kibana and Elasticsearch REST API calls

use super::auth::Credential;
use crate::config::ConnectionConfig;
use crate::error::{truncate_body, ReconcileError};
use crate::resource::WirePayload;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use url::Url;

/// Anti-forgery header Kibana requires on every mutating request
pub const XSRF_HEADER: &str = "kbn-xsrf";

/// HTTP transport bound to one backend endpoint and credential
#[derive(Clone, Debug)]
pub struct Transport {
    client: Client,
    base: String,
    credential: Credential,
}

impl Transport {
    /// Create a transport from a connection config.
    ///
    /// The endpoint and credential are validated here, once; nothing is
    /// defaulted.
    pub fn new(config: &ConnectionConfig) -> Result<Self, ReconcileError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ReconcileError::Config("no endpoint configured".to_string()))?;

        let url = Url::parse(endpoint.trim())
            .map_err(|e| ReconcileError::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ReconcileError::Config(format!(
                "unsupported endpoint scheme: {}",
                url.scheme()
            )));
        }
        // API paths are appended to the endpoint, so it cannot end in a query
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ReconcileError::Config(format!(
                "endpoint must not carry a query or fragment: {}",
                endpoint
            )));
        }

        let credential = Credential::from_parts(
            config.username.as_deref(),
            config.password.as_deref(),
            config.api_key.as_deref(),
        )?;

        let mut builder = Client::builder().user_agent(concat!("esrec/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base: url.as_str().trim_end_matches('/').to_string(),
            credential,
        })
    }

    /// Full URL for an API path. Any path prefix on the endpoint is kept.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Issue a request and return the raw response.
    ///
    /// Only connection-level failures are errors here; the status code is
    /// left for the caller to interpret.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<&WirePayload>,
    ) -> Result<Response, ReconcileError> {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(XSRF_HEADER, "true");
        request = self.credential.apply(request);

        if let Some(payload) = payload {
            let body = serde_json::to_vec(payload)
                .map_err(|e| ReconcileError::encode("payload", e.to_string()))?;
            tracing::trace!("request body: {}", truncate_body(&String::from_utf8_lossy(&body)));
            request = request.body(body);
        }

        let response = request.send().await?;
        tracing::debug!("{} {} -> {}", method, url, response.status());

        Ok(response)
    }
}
