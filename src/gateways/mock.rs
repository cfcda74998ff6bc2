use crate::gateways::{OrderGateway, OrderRequest, OrderSession};
use anyhow::Result;

pub struct MockOrderGateway {
    pub behavior: String,
}

#[async_trait::async_trait]
impl OrderGateway for MockOrderGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_order(&self, request: OrderRequest) -> Result<OrderSession> {
        match self.behavior.as_str() {
            "ALWAYS_FAILURE" => anyhow::bail!("mock decline"),
            "NO_SESSION" => Ok(OrderSession {
                payment_session_id: None,
                processor_order_id: None,
            }),
            _ => Ok(OrderSession {
                payment_session_id: Some(format!("session_{}", request.order_id)),
                processor_order_id: Some(format!("cf_{}", uuid::Uuid::new_v4())),
            }),
        }
    }
}
