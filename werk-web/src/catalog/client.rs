//! HTTP client for the No Key No Shade catalog API

use super::{Catalog, CatalogError, CatalogResult, Lookup};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("werk-web/", env!("CARGO_PKG_VERSION"));

/// Catalog client over reqwest
///
/// One GET per lookup; the request timeout is the only bound on how long a
/// lookup may take.
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> CatalogResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::RemoteUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn fetch(&self, lookup: &Lookup) -> CatalogResult<Value> {
        let url = format!("{}/{}", self.base_url, lookup.path());

        tracing::debug!(lookup = %lookup, url = %url, "Querying catalog");

        let mut request = self.http_client.get(&url);
        if let Some(param) = lookup.query() {
            request = request.query(&[param]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::RemoteUnavailable(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(lookup.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(lookup = %lookup, status = %status, "Catalog returned error status");
            return Err(CatalogError::RemoteUnavailable(format!(
                "HTTP {} for {}",
                status.as_u16(),
                lookup
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::RemoteUnavailable(e.to_string()))?;

        serde_json::from_slice(&body)
            .map_err(|e| CatalogError::MalformedResponse(format!("{}: {}", lookup, e)))
    }
}
