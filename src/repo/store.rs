use chrono::{DateTime, Utc};

/// A reconciled status change extracted from a verified notification.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub order_id: String,
    pub status: String,
    pub payment_session_id: Option<String>,
    /// Processor event time, taken from the timestamp header.
    pub event_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The record was updated.
    Applied,
    /// A newer event has already been applied; the record was left alone.
    Stale,
    /// No record matches the order id.
    NotFound,
}

/// Mutation seam of the payment-record store. The reconciler only ever
/// performs this one conditional write; insert and lookup stay on the
/// concrete repo.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn apply_status(&self, update: &StatusUpdate) -> anyhow::Result<ApplyOutcome>;
}
