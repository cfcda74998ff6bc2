use serde::Deserialize;
use thiserror::Error;

/// Failure modes of webhook processing. Every variant is reported to the
/// processor as a 400-level response so that it redelivers; none are
/// retried locally.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing webhook signature or timestamp header")]
    MissingCredentials,
    #[error("webhook signature mismatch")]
    InvalidSignature,
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
    #[error("no payment record for order {0}")]
    RecordNotFound(String),
    #[error("payment store error: {0}")]
    Store(String),
}

/// The order block of a processor notification. Field set follows the
/// Cashfree order-status webhook; `cf_order_id` arrives as a string in
/// newer API versions and as a number in older ones.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayload {
    pub order_id: Option<String>,
    pub order_status: Option<String>,
    #[serde(default)]
    pub cf_order_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DataPayload {
    order: Option<OrderPayload>,
}

/// Notification envelope. The processor has shipped both a top-level
/// `order` object and a `data.order` nesting across API versions, so both
/// are accepted here.
#[derive(Debug, Deserialize)]
pub struct OrderNotification {
    order: Option<OrderPayload>,
    data: Option<DataPayload>,
}

/// A validated, normalized order-status event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEvent {
    pub order_id: String,
    /// Processor status vocabulary, lower-cased.
    pub status: String,
    pub processor_order_id: Option<String>,
}

impl OrderEvent {
    /// Parses a raw notification body. Callers must verify the signature
    /// before handing bytes to this function.
    pub fn from_slice(raw: &[u8]) -> Result<Self, WebhookError> {
        let envelope: OrderNotification = serde_json::from_slice(raw)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        let order = envelope
            .order
            .or(envelope.data.and_then(|d| d.order))
            .ok_or_else(|| WebhookError::MalformedPayload("missing order object".to_string()))?;

        let order_id = order
            .order_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| WebhookError::MalformedPayload("missing order.order_id".to_string()))?;
        let status = order
            .order_status
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WebhookError::MalformedPayload("missing order.order_status".to_string()))?;

        Ok(Self {
            order_id,
            status: status.to_lowercase(),
            processor_order_id: order.cf_order_id.and_then(normalize_id),
        })
    }
}

fn normalize_id(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
