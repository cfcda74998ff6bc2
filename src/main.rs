use axum::routing::{get, post};
use axum::Router;
use marketindex_payments::config::AppConfig;
use marketindex_payments::gateways::cashfree::CashfreeGateway;
use marketindex_payments::repo::payments_repo::PaymentsRepo;
use marketindex_payments::service::export_service::ExportService;
use marketindex_payments::service::payment_service::PaymentService;
use marketindex_payments::service::reconciler::WebhookReconciler;
use marketindex_payments::service::webhook_verifier::WebhookVerifier;
use marketindex_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let payments_repo = PaymentsRepo { pool: pool.clone() };
    let gateway = Arc::new(CashfreeGateway {
        base_url: cfg.cashfree_base_url.clone(),
        app_id: cfg.cashfree_app_id.clone(),
        secret_key: cfg.cashfree_secret_key.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: reqwest::Client::new(),
    });

    let payment_service = PaymentService {
        payments_repo: payments_repo.clone(),
        gateway,
        order_amount: cfg.order_amount,
        order_currency: cfg.order_currency.clone(),
        return_url: cfg.return_url.clone(),
    };

    let reconciler = WebhookReconciler {
        verifier: WebhookVerifier::new(cfg.webhook_secret.clone()),
        store: Arc::new(payments_repo.clone()),
    };

    let export_service = ExportService {
        analysis_base_url: cfg.analysis_base_url.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: reqwest::Client::new(),
    };

    let state = AppState {
        payment_service,
        reconciler,
        export_service,
        payments_repo,
    };

    // The browser front-end calls these endpoints cross-origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route(
            "/payments",
            post(marketindex_payments::http::handlers::payments::create_payment),
        )
        .route(
            "/payments/:order_id",
            get(marketindex_payments::http::handlers::payments::get_payment),
        )
        .route(
            "/webhooks/cashfree",
            post(marketindex_payments::http::handlers::webhooks::cashfree_webhook),
        )
        .route(
            "/exports/stock-analysis",
            get(marketindex_payments::http::handlers::exports::download_stock_analysis),
        )
        .route("/health", get(marketindex_payments::http::handlers::payments::health))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
