//! Policy evaluation client

use crate::cache::{cache_key, PolicyCache};
use chrono::Utc;
use meshguard_core::{
    Gateway, MeshGuardConfig, PolicyDecision, PolicyEffect, PolicyEvaluationRequest,
    PolicyEvaluationResponse, Result, FAIL_OPEN_EVALUATION_ID,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cached policy evaluation against the governance gateway.
///
/// Transport and gateway errors never escape to the host when `fail_open`
/// is set; they are converted into a synthetic allow instead. With
/// `fail_open` unset (the default) evaluation errors propagate and the
/// decision gate fails closed.
pub struct PolicyClient {
    config: Arc<MeshGuardConfig>,
    gateway: Arc<dyn Gateway>,
    cache: PolicyCache,
}

impl PolicyClient {
    /// Create a client over the given gateway
    pub fn new(config: Arc<MeshGuardConfig>, gateway: Arc<dyn Gateway>) -> Self {
        let cache = PolicyCache::new(config.cache_max_entries);
        Self {
            config,
            gateway,
            cache,
        }
    }

    /// Evaluate a request, consulting the cache first.
    ///
    /// A fresh cached decision is returned without any network call. On a
    /// miss the gateway is asked and a successful response is cached for
    /// the configured TTL. Fail-open decisions are deliberately not cached
    /// so a recovered gateway is consulted again immediately.
    pub async fn evaluate(
        &self,
        request: &PolicyEvaluationRequest,
    ) -> Result<PolicyEvaluationResponse> {
        let key = cache_key(request);

        if let Some(cached) = self.cache.get(&key) {
            debug!(action = %request.action, "policy decision served from cache");
            metrics::counter!("meshguard_policy_evaluations_total", "source" => "cache")
                .increment(1);
            return Ok(cached);
        }

        match self.gateway.evaluate(request).await {
            Ok(response) => {
                self.cache
                    .put(key, response.clone(), self.config.cache_ttl());
                metrics::counter!("meshguard_policy_evaluations_total", "source" => "gateway")
                    .increment(1);
                Ok(response)
            }
            Err(err) if self.config.fail_open => {
                warn!(
                    action = %request.action,
                    error = %err,
                    "policy evaluation failed, failing open"
                );
                metrics::counter!("meshguard_policy_evaluations_total", "source" => "fail_open")
                    .increment(1);
                Ok(fail_open_response())
            }
            Err(err) => Err(err),
        }
    }

    /// Number of decisions currently cached
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached decision, forcing fresh evaluations
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn fail_open_response() -> PolicyEvaluationResponse {
    PolicyEvaluationResponse {
        decision: PolicyDecision::new(PolicyEffect::Allow)
            .with_reason("MeshGuard unreachable, fail-open enabled"),
        evaluation_id: FAIL_OPEN_EVALUATION_ID.to_string(),
        evaluated_at: Utc::now(),
        policy_version: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meshguard_core::{AuditEvent, ContextMap, Error};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Gateway double that counts calls and can be configured to fail
    struct MockGateway {
        effect: PolicyEffect,
        fail: bool,
        evaluate_calls: AtomicU32,
    }

    impl MockGateway {
        fn allowing() -> Self {
            Self {
                effect: PolicyEffect::Allow,
                fail: false,
                evaluate_calls: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                effect: PolicyEffect::Allow,
                fail: true,
                evaluate_calls: AtomicU32::new(0),
            }
        }

        fn evaluate_calls(&self) -> u32 {
            self.evaluate_calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn evaluate(
            &self,
            _request: &PolicyEvaluationRequest,
        ) -> Result<PolicyEvaluationResponse> {
            let call = self.evaluate_calls.fetch_add(1, Ordering::Relaxed) + 1;
            if self.fail {
                return Err(Error::transport("connection refused"));
            }
            Ok(PolicyEvaluationResponse {
                decision: PolicyDecision::new(self.effect),
                evaluation_id: format!("eval-{call}"),
                evaluated_at: Utc::now(),
                policy_version: None,
            })
        }

        async fn submit_audit_batch(&self, _events: &[AuditEvent]) -> Result<()> {
            Ok(())
        }

        async fn submit_audit_event(&self, _event: &AuditEvent) -> Result<()> {
            Ok(())
        }
    }

    fn client_with(gateway: Arc<MockGateway>, fail_open: bool) -> PolicyClient {
        let config = MeshGuardConfig {
            api_key: "mk_test".to_string(),
            agent_id: "a1".to_string(),
            fail_open,
            ..Default::default()
        };
        PolicyClient::new(Arc::new(config), gateway)
    }

    fn request_with_context() -> PolicyEvaluationRequest {
        let mut context = ContextMap::new();
        context.insert("path".to_string(), serde_json::json!("/tmp/x"));
        PolicyEvaluationRequest::new("a1", "tool:read_file").with_context(context)
    }

    #[tokio::test]
    async fn second_evaluation_within_ttl_hits_cache() {
        let gateway = Arc::new(MockGateway::allowing());
        let client = client_with(gateway.clone(), false);
        let request = request_with_context();

        let first = client.evaluate(&request).await.unwrap();
        let second = client.evaluate(&request).await.unwrap();

        assert_eq!(gateway.evaluate_calls(), 1);
        assert_eq!(first.evaluation_id, second.evaluation_id);
    }

    #[tokio::test(start_paused = true)]
    async fn evaluation_after_ttl_reaches_gateway_again() {
        let gateway = Arc::new(MockGateway::allowing());
        let client = client_with(gateway.clone(), false);
        let request = request_with_context();

        client.evaluate(&request).await.unwrap();
        tokio::time::advance(Duration::from_millis(60_001)).await;
        client.evaluate(&request).await.unwrap();

        assert_eq!(gateway.evaluate_calls(), 2);
    }

    #[tokio::test]
    async fn different_context_is_a_different_cache_entry() {
        let gateway = Arc::new(MockGateway::allowing());
        let client = client_with(gateway.clone(), false);

        client.evaluate(&request_with_context()).await.unwrap();
        client
            .evaluate(&PolicyEvaluationRequest::new("a1", "tool:read_file"))
            .await
            .unwrap();

        assert_eq!(gateway.evaluate_calls(), 2);
        assert_eq!(client.cache_len(), 2);
    }

    #[tokio::test]
    async fn fail_open_returns_synthetic_allow() {
        let gateway = Arc::new(MockGateway::failing());
        let client = client_with(gateway.clone(), true);

        let response = client.evaluate(&request_with_context()).await.unwrap();
        assert_eq!(response.decision.effect, PolicyEffect::Allow);
        assert_eq!(response.evaluation_id, FAIL_OPEN_EVALUATION_ID);
        assert!(response
            .decision
            .reason
            .as_deref()
            .unwrap()
            .contains("unreachable"));
    }

    #[tokio::test]
    async fn fail_open_decision_is_not_cached() {
        let gateway = Arc::new(MockGateway::failing());
        let client = client_with(gateway.clone(), true);
        let request = request_with_context();

        client.evaluate(&request).await.unwrap();
        client.evaluate(&request).await.unwrap();

        assert_eq!(gateway.evaluate_calls(), 2);
        assert_eq!(client.cache_len(), 0);
    }

    #[tokio::test]
    async fn fail_closed_propagates_the_error() {
        let gateway = Arc::new(MockGateway::failing());
        let client = client_with(gateway, false);

        let err = client.evaluate(&request_with_context()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn clear_cache_forces_fresh_evaluation() {
        let gateway = Arc::new(MockGateway::allowing());
        let client = client_with(gateway.clone(), false);
        let request = request_with_context();

        client.evaluate(&request).await.unwrap();
        client.clear_cache();
        client.evaluate(&request).await.unwrap();

        assert_eq!(gateway.evaluate_calls(), 2);
    }
}
