use crate::domain::payment::ErrorBody;
use crate::service::export_service::{known_period, DEFAULT_PERIOD};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub period: Option<String>,
}

pub async fn download_stock_analysis(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let period = query.period.unwrap_or_else(|| DEFAULT_PERIOD.to_string());
    if !known_period(&period) {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(format!("unknown period '{}'", period))),
        )
            .into_response();
    }

    match state.export_service.export_csv(&period).await {
        Ok(csv) => (
            axum::http::StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"stock-analysis.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("analysis export failed: {}", e);
            (
                axum::http::StatusCode::BAD_GATEWAY,
                Json(ErrorBody::new(e.to_string())),
            )
                .into_response()
        }
    }
}
