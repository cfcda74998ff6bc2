use crate::gateways::{OrderGateway, OrderRequest, OrderSession};
use anyhow::Result;
use serde_json::json;

pub struct CashfreeGateway {
    pub base_url: String,
    pub app_id: String,
    pub secret_key: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl OrderGateway for CashfreeGateway {
    fn name(&self) -> &'static str {
        "cashfree"
    }

    async fn create_order(&self, request: OrderRequest) -> Result<OrderSession> {
        let order_url = format!("{}/pg/orders", self.base_url);
        let body = json!({
            "order_id": request.order_id,
            "order_amount": request.amount,
            "order_currency": request.currency,
            "customer_details": {
                "customer_id": request.customer_email,
                "customer_email": request.customer_email,
            },
            "order_meta": {
                "return_url": request.return_url,
            },
        });

        let resp = self
            .client
            .post(order_url)
            .header("x-client-id", &self.app_id)
            .header("x-client-secret", &self.secret_key)
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                let v: serde_json::Value = r.json().await.unwrap_or_default();
                Ok(OrderSession {
                    payment_session_id: v
                        .get("payment_session_id")
                        .and_then(|id| id.as_str())
                        .map(ToString::to_string),
                    processor_order_id: v.get("cf_order_id").and_then(|id| match id {
                        serde_json::Value::String(s) => Some(s.clone()),
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    }),
                })
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                anyhow::bail!(
                    "order create failed with HTTP {}: {}",
                    status.as_u16(),
                    body.chars().take(200).collect::<String>()
                )
            }
            Err(e) if e.is_timeout() => anyhow::bail!("order create timed out"),
            Err(e) => Err(e.into()),
        }
    }
}
