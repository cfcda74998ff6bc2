use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One purchase attempt. `order_id` is the sole join key between this row
/// and the processor's notifications; rows are never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecord {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub customer_email: String,
    pub status: String,
    pub payment_session_id: Option<String>,
    pub last_event_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePaymentResponse {
    pub order_id: String,
    pub payment_session_id: Option<String>,
    pub order_amount: i64,
    pub order_currency: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct AckBody {
    pub message: String,
}

impl AckBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
