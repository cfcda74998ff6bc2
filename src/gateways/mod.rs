use anyhow::Result;

pub mod cashfree;
pub mod mock;

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub customer_email: String,
    pub return_url: String,
}

/// Processor acknowledgment of a newly opened order.
#[derive(Debug, Clone)]
pub struct OrderSession {
    pub payment_session_id: Option<String>,
    pub processor_order_id: Option<String>,
}

#[async_trait::async_trait]
pub trait OrderGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_order(&self, request: OrderRequest) -> Result<OrderSession>;
}
