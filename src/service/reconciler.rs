use crate::domain::webhook::{OrderEvent, WebhookError};
use crate::repo::store::{ApplyOutcome, PaymentStore, StatusUpdate};
use crate::service::webhook_verifier::WebhookVerifier;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied { order_id: String, status: String },
    /// A newer event was already applied; acknowledged without mutation so
    /// the processor stops redelivering.
    Stale { order_id: String },
}

/// Drives a notification from raw bytes to a persisted status transition:
/// authenticate, then parse, then one conditional store write.
#[derive(Clone)]
pub struct WebhookReconciler {
    pub verifier: WebhookVerifier,
    pub store: Arc<dyn PaymentStore>,
}

impl WebhookReconciler {
    pub async fn process(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let (signature, timestamp) = match (signature, timestamp) {
            (Some(s), Some(t)) => (s, t),
            _ => return Err(WebhookError::MissingCredentials),
        };

        // The body stays opaque until the signature checks out.
        self.verifier.verify(raw_body, signature, timestamp)?;

        let event = OrderEvent::from_slice(raw_body)?;
        let event_time = parse_event_time(timestamp)?;

        tracing::info!(
            "webhook verified for order {} with status {}",
            event.order_id,
            event.status
        );

        let update = StatusUpdate {
            order_id: event.order_id.clone(),
            status: event.status.clone(),
            payment_session_id: event.processor_order_id,
            event_time,
        };

        let outcome = self
            .store
            .apply_status(&update)
            .await
            .map_err(|e| WebhookError::Store(e.to_string()))?;

        match outcome {
            ApplyOutcome::Applied => Ok(ReconcileOutcome::Applied {
                order_id: event.order_id,
                status: event.status,
            }),
            ApplyOutcome::Stale => {
                tracing::warn!("ignoring stale notification for order {}", event.order_id);
                Ok(ReconcileOutcome::Stale {
                    order_id: event.order_id,
                })
            }
            ApplyOutcome::NotFound => Err(WebhookError::RecordNotFound(event.order_id)),
        }
    }
}

fn parse_event_time(timestamp: &str) -> Result<DateTime<Utc>, WebhookError> {
    let secs: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| WebhookError::MalformedPayload(format!("timestamp '{}' is not unix seconds", timestamp)))?;

    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| WebhookError::MalformedPayload(format!("timestamp '{}' is out of range", timestamp)))
}
