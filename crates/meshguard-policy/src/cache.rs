//! Policy decision cache
//!
//! Keyed by (agent, action, serialized context). A lookup hits only while
//! the entry's expiry is strictly in the future; expired entries are treated
//! as absent and replaced on the next write to the same key. Reads never
//! suspend.

use meshguard_core::{PolicyEvaluationRequest, PolicyEvaluationResponse};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Build the cache key for an evaluation request.
///
/// The context map is ordered, so identical (agent, action, context) always
/// produce the same bytes.
pub fn cache_key(request: &PolicyEvaluationRequest) -> String {
    let context = request
        .context
        .as_ref()
        .and_then(|c| serde_json::to_string(c).ok())
        .unwrap_or_else(|| "{}".to_string());
    format!("{}:{}:{}", request.agent_id, request.action, context)
}

/// A cached decision with its expiry
struct CacheEntry {
    response: PolicyEvaluationResponse,
    expires_at: Instant,
}

/// Bounded in-memory decision cache.
///
/// Writes replace whole entries under the lock, so a reader can never
/// observe a partially-written decision. Concurrent misses on the same key
/// may both reach the gateway; the second write simply replaces the first.
pub struct PolicyCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl PolicyCache {
    /// Create a cache holding at most `max_entries` decisions
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    /// Look up a decision. Hits only while the entry is still fresh.
    pub fn get(&self, key: &str) -> Option<PolicyEvaluationResponse> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.response.clone())
    }

    /// Store a decision valid for `ttl` from now.
    ///
    /// At capacity, expired entries are dropped first; if every entry is
    /// still fresh the cache is cleared outright rather than growing.
    pub fn put(&self, key: String, response: PolicyEvaluationResponse, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write();

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.max_entries {
                entries.clear();
            }
        }

        entries.insert(
            key,
            CacheEntry {
                response,
                expires_at: now + ttl,
            },
        );
    }

    /// Number of entries currently held, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use meshguard_core::{PolicyDecision, PolicyEffect};

    fn response(id: &str) -> PolicyEvaluationResponse {
        PolicyEvaluationResponse {
            decision: PolicyDecision::new(PolicyEffect::Allow),
            evaluation_id: id.to_string(),
            evaluated_at: Utc::now(),
            policy_version: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl_miss_after() {
        let cache = PolicyCache::new(16);
        cache.put("k".to_string(), response("e1"), Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("k").unwrap().evaluation_id, "e1");

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("k").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_is_strict() {
        let cache = PolicyCache::new(16);
        cache.put("k".to_string(), response("e1"), Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(cache.get("k").is_none());
    }

    #[tokio::test]
    async fn put_replaces_existing_entry() {
        let cache = PolicyCache::new(16);
        cache.put("k".to_string(), response("e1"), Duration::from_secs(60));
        cache.put("k".to_string(), response("e2"), Duration::from_secs(60));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().evaluation_id, "e2");
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_drops_expired_entries_first() {
        let cache = PolicyCache::new(2);
        cache.put("a".to_string(), response("e1"), Duration::from_secs(10));
        cache.put("b".to_string(), response("e2"), Duration::from_secs(120));

        tokio::time::advance(Duration::from_secs(30)).await;
        cache.put("c".to_string(), response("e3"), Duration::from_secs(120));

        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn capacity_clears_when_all_entries_fresh() {
        let cache = PolicyCache::new(2);
        cache.put("a".to_string(), response("e1"), Duration::from_secs(120));
        cache.put("b".to_string(), response("e2"), Duration::from_secs(120));
        cache.put("c".to_string(), response("e3"), Duration::from_secs(120));

        assert_eq!(cache.len(), 1);
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn cache_key_is_deterministic_over_context() {
        let mut request = PolicyEvaluationRequest::new("a1", "tool:read_file");
        let mut context = meshguard_core::ContextMap::new();
        context.insert("path".to_string(), serde_json::json!("/tmp/x"));
        context.insert("mode".to_string(), serde_json::json!("r"));
        request = request.with_context(context.clone());

        let other = PolicyEvaluationRequest::new("a1", "tool:read_file").with_context(context);
        assert_eq!(cache_key(&request), cache_key(&other));

        let different = PolicyEvaluationRequest::new("a2", "tool:read_file");
        assert_ne!(cache_key(&request), cache_key(&different));
    }

    #[test]
    fn cache_key_without_context_uses_empty_object() {
        let request = PolicyEvaluationRequest::new("a1", "tool:ls");
        assert_eq!(cache_key(&request), "a1:tool:ls:{}");
    }
}
