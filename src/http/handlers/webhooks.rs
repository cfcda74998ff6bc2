use crate::domain::payment::{AckBody, ErrorBody};
use crate::service::reconciler::ReconcileOutcome;
use crate::service::webhook_verifier::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

/// Processor-facing endpoint. The body is taken as raw bytes so the
/// signature is checked over exactly what was sent; any failure comes back
/// as a 400 and the processor redelivers.
pub async fn cashfree_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|h| h.to_str().ok());

    match state.reconciler.process(&body, signature, timestamp).await {
        Ok(ReconcileOutcome::Applied { order_id, status }) => (
            axum::http::StatusCode::OK,
            Json(AckBody::new(format!("order {} marked {}", order_id, status))),
        )
            .into_response(),
        Ok(ReconcileOutcome::Stale { order_id }) => (
            axum::http::StatusCode::OK,
            Json(AckBody::new(format!(
                "stale notification for order {} ignored",
                order_id
            ))),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("webhook rejected: {}", e);
            (
                axum::http::StatusCode::BAD_REQUEST,
                Json(ErrorBody::new(e.to_string())),
            )
                .into_response()
        }
    }
}
