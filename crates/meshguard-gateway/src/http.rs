//! HTTPS gateway implementation

use async_trait::async_trait;
use meshguard_core::{
    AuditEvent, Error, Gateway, MeshGuardConfig, PolicyEvaluationRequest,
    PolicyEvaluationResponse, Result,
};
use serde::Serialize;
use tracing::debug;

/// Header carrying the gateway API key
const API_KEY_HEADER: &str = "X-MeshGuard-API-Key";

/// Header carrying the governed agent's identity
const AGENT_ID_HEADER: &str = "X-MeshGuard-Agent-Id";

/// Batch submission envelope
#[derive(Serialize)]
struct AuditBatchBody<'a> {
    events: &'a [AuditEvent],
}

/// HTTPS client for the governance gateway
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    agent_id: String,
}

impl HttpGateway {
    /// Build a gateway client from the governance configuration.
    ///
    /// The underlying HTTP client is constructed once with the configured
    /// request timeout so an unresponsive gateway cannot stall tool
    /// execution indefinitely.
    pub fn new(config: &MeshGuardConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            agent_id: config.agent_id.clone(),
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST to gateway");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(AGENT_ID_HEADER, &self.agent_id)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::gateway(status.as_u16(), message));
        }

        Ok(response)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn evaluate(
        &self,
        request: &PolicyEvaluationRequest,
    ) -> Result<PolicyEvaluationResponse> {
        let response = self.post("/api/v1/evaluate", request).await?;
        response
            .json::<PolicyEvaluationResponse>()
            .await
            .map_err(|e| Error::transport(e.to_string()))
    }

    async fn submit_audit_batch(&self, events: &[AuditEvent]) -> Result<()> {
        self.post("/api/v1/audit/batch", &AuditBatchBody { events })
            .await?;
        Ok(())
    }

    async fn submit_audit_event(&self, event: &AuditEvent) -> Result<()> {
        self.post("/api/v1/audit", event).await?;
        Ok(())
    }
}
