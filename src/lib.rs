pub mod config;
pub mod domain {
    pub mod payment;
    pub mod webhook;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod exports;
        pub mod payments;
        pub mod webhooks;
    }
}
pub mod repo {
    pub mod payments_repo;
    pub mod store;
}
pub mod service {
    pub mod export_service;
    pub mod payment_service;
    pub mod reconciler;
    pub mod webhook_verifier;
}

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub reconciler: service::reconciler::WebhookReconciler,
    pub export_service: service::export_service::ExportService,
    pub payments_repo: repo::payments_repo::PaymentsRepo,
}
