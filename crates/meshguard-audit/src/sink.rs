//! Buffered audit event sink

use meshguard_core::{AuditEvent, Gateway, GovernanceMode, MeshGuardConfig};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Batched audit delivery with an immediate escalation path.
///
/// Shared across every concurrent invocation; cloning is cheap and clones
/// share the same queue and timer.
#[derive(Clone)]
pub struct AuditSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    config: Arc<MeshGuardConfig>,
    gateway: Arc<dyn Gateway>,

    /// Ordered queue of unflushed events
    queue: Mutex<Vec<AuditEvent>>,

    /// Set while a debounce timer task is alive; at most one at a time
    timer_pending: AtomicBool,

    /// Handle of the live timer task, joined on shutdown
    timer_handle: Mutex<Option<JoinHandle<()>>>,

    /// Serializes flushes; a batch in flight blocks the next drain
    flush_guard: tokio::sync::Mutex<()>,

    /// Wakes a sleeping timer task so shutdown can join it promptly
    shutdown: Notify,
}

impl AuditSink {
    /// Create a sink delivering through the given gateway
    pub fn new(config: Arc<MeshGuardConfig>, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                config,
                gateway,
                queue: Mutex::new(Vec::new()),
                timer_pending: AtomicBool::new(false),
                timer_handle: Mutex::new(None),
                flush_guard: tokio::sync::Mutex::new(()),
                shutdown: Notify::new(),
            }),
        }
    }

    /// Add an event to the batched queue.
    ///
    /// Reaching the batch-size threshold triggers a background flush.
    /// Otherwise a single debounced timer is armed so the event leaves
    /// within the flush interval. Bypass mode suppresses everything.
    pub fn enqueue(&self, event: AuditEvent) {
        if self.inner.config.mode == GovernanceMode::Bypass {
            return;
        }

        metrics::counter!("meshguard_audit_events_total", "path" => "batched").increment(1);

        let len = {
            let mut queue = self.inner.queue.lock();
            queue.push(event);
            queue.len()
        };

        if len >= self.inner.config.audit_batch_size {
            let inner = self.inner.clone();
            tokio::spawn(async move {
                flush_queue(&inner).await;
            });
        } else if !self.inner.timer_pending.swap(true, Ordering::SeqCst) {
            let inner = self.inner.clone();
            let handle = tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(inner.config.audit_flush_interval()) => {
                        inner.timer_pending.store(false, Ordering::SeqCst);
                        flush_queue(&inner).await;
                    }
                    _ = inner.shutdown.notified() => {
                        inner.timer_pending.store(false, Ordering::SeqCst);
                    }
                }
            });
            *self.inner.timer_handle.lock() = Some(handle);
        }
    }

    /// Drain the queue into a single batch and deliver it.
    ///
    /// Idempotent: an empty queue produces no network call. Events enqueued
    /// while a batch is in flight belong to the next batch.
    pub async fn flush(&self) {
        flush_queue(&self.inner).await;
    }

    /// Deliver a single event right now, bypassing the queue.
    ///
    /// Used for decisions with compliance significance. Failures are logged
    /// and the event is dropped, matching the batched path's accepted-loss
    /// policy.
    pub async fn submit_immediate(&self, event: AuditEvent) {
        if self.inner.config.mode == GovernanceMode::Bypass {
            return;
        }

        metrics::counter!("meshguard_audit_events_total", "path" => "immediate").increment(1);

        if let Err(err) = self.inner.gateway.submit_audit_event(&event).await {
            error!(
                action = %event.action,
                error = %err,
                "failed to deliver immediate audit event, dropping"
            );
            metrics::counter!("meshguard_audit_dropped_total", "path" => "immediate").increment(1);
        }
    }

    /// Number of events waiting for the next batch
    pub fn queue_len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Whether a debounce timer is currently armed
    pub fn timer_pending(&self) -> bool {
        self.inner.timer_pending.load(Ordering::SeqCst)
    }

    /// Drain the sink before process exit.
    ///
    /// Wakes and joins the pending timer task, then performs a final flush
    /// so nothing is left in the queue.
    pub async fn shutdown(&self) {
        info!("draining audit sink before shutdown");
        // notify_one stores a permit, so a timer task that has not been
        // polled yet still wakes immediately instead of sleeping out its
        // full interval.
        self.inner.shutdown.notify_one();

        let handle = self.inner.timer_handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        flush_queue(&self.inner).await;
    }
}

async fn flush_queue(inner: &SinkInner) {
    // One batch in flight at a time; a concurrent trigger waits here and
    // then finds whatever arrived since.
    let _guard = inner.flush_guard.lock().await;

    let batch = {
        let mut queue = inner.queue.lock();
        std::mem::take(&mut *queue)
    };

    if batch.is_empty() {
        return;
    }

    debug!(count = batch.len(), "flushing audit batch");
    if let Err(err) = inner.gateway.submit_audit_batch(&batch).await {
        error!(
            dropped = batch.len(),
            error = %err,
            "failed to deliver audit batch, dropping"
        );
        metrics::counter!("meshguard_audit_dropped_total", "path" => "batched")
            .increment(batch.len() as u64);
    }
}
