use crate::domain::payment::{CreatePaymentRequest, CreatePaymentResponse, ErrorBody};
use crate::gateways::{OrderGateway, OrderRequest};
use crate::repo::payments_repo::{NewPayment, PaymentsRepo};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentService {
    pub payments_repo: PaymentsRepo,
    pub gateway: Arc<dyn OrderGateway>,
    pub order_amount: i64,
    pub order_currency: String,
    pub return_url: String,
}

impl PaymentService {
    /// Creates the local record first, then opens the processor order. A
    /// record that never gets a session stays in `created` and is only ever
    /// advanced by a verified webhook.
    pub async fn create(
        &self,
        req: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, (axum::http::StatusCode, ErrorBody)> {
        validate_request(&req)?;

        let order_id = new_order_id();
        self.payments_repo
            .insert_payment(&NewPayment {
                order_id: order_id.clone(),
                amount: self.order_amount,
                currency: self.order_currency.clone(),
                customer_email: req.email.clone(),
            })
            .await
            .map_err(internal)?;

        let session = self
            .gateway
            .create_order(OrderRequest {
                order_id: order_id.clone(),
                amount: self.order_amount,
                currency: self.order_currency.clone(),
                customer_email: req.email,
                return_url: self.return_url.clone(),
            })
            .await
            .map_err(|e| {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    ErrorBody::new(format!("failed to create payment session: {}", e)),
                )
            })?;

        if let Some(session_id) = &session.payment_session_id {
            self.payments_repo
                .set_session_id(&order_id, session_id)
                .await
                .map_err(internal)?;
        }

        tracing::info!("created payment order {} via {}", order_id, self.gateway.name());

        Ok(CreatePaymentResponse {
            order_id,
            payment_session_id: session.payment_session_id,
            order_amount: self.order_amount,
            order_currency: self.order_currency.clone(),
        })
    }
}

pub fn new_order_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "order_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}

fn validate_request(req: &CreatePaymentRequest) -> Result<(), (axum::http::StatusCode, ErrorBody)> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err((
            axum::http::StatusCode::BAD_REQUEST,
            ErrorBody::new("a valid customer email is required"),
        ));
    }
    Ok(())
}

fn internal(e: anyhow::Error) -> (axum::http::StatusCode, ErrorBody) {
    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody::new(e.to_string()),
    )
}
