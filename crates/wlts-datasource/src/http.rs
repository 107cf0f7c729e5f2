//! HTTP plumbing shared by the OGC clients

use std::time::Duration;

use reqwest::Url;
use wlts_core::catalog::DatasourceDefinition;
use wlts_core::error::{Result, WltsError};

/// Key-value query parameters of an OGC request
pub type Params = Vec<(&'static str, String)>;

/// GET-only client bound to one OGC service endpoint
#[derive(Debug, Clone)]
pub struct OgcHttp {
    datasource: String,
    endpoint: String,
    service: &'static str,
    credentials: Option<(String, String)>,
    client: reqwest::Client,
}

impl OgcHttp {
    /// Client for `{host}/{path}` speaking `service` version 1.0.0
    pub fn new(
        definition: &DatasourceDefinition,
        path: &str,
        service: &'static str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            WltsError::config_invalid(format!("datasources.{}", definition.id), e.to_string())
        })?;

        Ok(Self {
            datasource: definition.id.clone(),
            endpoint: format!("{}/{}", definition.host.trim_end_matches('/'), path),
            service,
            credentials: definition.credentials(),
            client,
        })
    }

    pub fn datasource(&self) -> &str {
        &self.datasource
    }

    pub fn unavailable(&self, reason: impl Into<String>) -> WltsError {
        WltsError::UpstreamUnavailable { datasource: self.datasource.clone(), reason: reason.into() }
    }

    pub fn invalid(&self, reason: impl Into<String>) -> WltsError {
        WltsError::InvalidResponse { datasource: self.datasource.clone(), reason: reason.into() }
    }

    /// Request URL with the service/version prefix and `params`
    pub fn url(&self, params: Params) -> Result<Url> {
        let mut all: Params =
            vec![("service", self.service.to_string()), ("version", "1.0.0".to_string())];
        all.extend(params);
        Url::parse_with_params(&self.endpoint, &all)
            .map_err(|e| self.unavailable(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response> {
        tracing::debug!(datasource = %self.datasource, url = %url, "OGC request");

        let mut request = self.client.get(url);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.unavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(self.unavailable(format!("{} returned HTTP {}", self.service, response.status())));
        }
        Ok(response)
    }

    pub async fn get_text(&self, params: Params) -> Result<String> {
        let url = self.url(params)?;
        self.send(url)
            .await?
            .text()
            .await
            .map_err(|e| self.unavailable(format!("failed to read body: {}", e)))
    }

    pub async fn get_bytes(&self, params: Params) -> Result<Vec<u8>> {
        let url = self.url(params)?;
        let body = self
            .send(url)
            .await?
            .bytes()
            .await
            .map_err(|e| self.unavailable(format!("failed to read body: {}", e)))?;
        Ok(body.to_vec())
    }
}
