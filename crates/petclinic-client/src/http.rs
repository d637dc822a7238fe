//! reqwest-backed visits client.

use std::time::Instant;

use async_trait::async_trait;
use petclinic_config::ClientConfig;
use petclinic_core::{NewVisit, Visit, VisitError, VisitScope};
use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::VisitApi;

/// Converts a transport failure into a `VisitError::Request`.
fn request_err(e: reqwest::Error) -> VisitError {
    VisitError::Request(e.to_string())
}

/// Client for the visits REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpVisitClient {
    client: Client,
    api_base: String,
}

impl HttpVisitClient {
    /// Creates a client using the timeout and user agent from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, VisitError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(request_err)?;

        Ok(Self::with_client(client, &config.api_base))
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL of the scoped visits collection.
    pub fn visits_url(&self, scope: &VisitScope) -> String {
        format!("{}/{}", self.api_base, scope.path())
    }

    /// Turns non-2xx responses into `VisitError::Status`.
    async fn check(response: Response, url: &str) -> Result<Response, VisitError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Visits API {} for {}: {}", status, url, body);
        Err(VisitError::status(status.as_u16(), body))
    }
}

#[async_trait]
impl VisitApi for HttpVisitClient {
    async fn list_visits(&self, scope: &VisitScope) -> Result<Vec<Visit>, VisitError> {
        let url = self.visits_url(scope);
        let start = Instant::now();
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("GET {} failed: {}", url, e);
            request_err(e)
        })?;
        let response = Self::check(response, &url).await?;

        // Read fully first: a connection dropped mid-body is a transport
        // failure, only a complete body that fails to parse is a decode error.
        let body = response.bytes().await.map_err(|e| {
            warn!("GET {} body read failed: {}", url, e);
            request_err(e)
        })?;
        let visits: Vec<Visit> = serde_json::from_slice(&body)?;

        debug!(
            "Loaded {} visits for {} in {}ms",
            visits.len(),
            scope,
            start.elapsed().as_millis()
        );
        Ok(visits)
    }

    async fn create_visit(&self, scope: &VisitScope, visit: &NewVisit) -> Result<(), VisitError> {
        let url = self.visits_url(scope);
        let start = Instant::now();
        debug!("POST {} ({})", url, visit.date);

        let response = self
            .client
            .post(&url)
            .json(visit)
            .send()
            .await
            .map_err(|e| {
                warn!("POST {} failed: {}", url, e);
                request_err(e)
            })?;
        Self::check(response, &url).await?;

        debug!("Recorded visit for {} in {}ms", scope, start.elapsed().as_millis());
        Ok(())
    }
}
