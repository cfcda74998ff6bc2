use crate::domain::payment::PaymentRecord;
use crate::repo::store::{ApplyOutcome, PaymentStore, StatusUpdate};
use anyhow::Result;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

pub struct NewPayment {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub customer_email: String,
}

impl PaymentsRepo {
    pub async fn insert_payment(&self, payment: &NewPayment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (order_id, amount, currency, customer_email, status)
            VALUES ($1, $2, $3, $4, 'created')
            "#,
        )
        .bind(&payment.order_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.customer_email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_session_id(&self, order_id: &str, payment_session_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE payments SET payment_session_id=$2, updated_at=now() WHERE order_id=$1",
        )
        .bind(order_id)
        .bind(payment_session_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT order_id, amount, currency, customer_email, status,
                   payment_session_id, last_event_at, created_at, updated_at
            FROM payments
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PaymentRecord {
            order_id: r.get("order_id"),
            amount: r.get("amount"),
            currency: r.get("currency"),
            customer_email: r.get("customer_email"),
            status: r.get("status"),
            payment_session_id: r.get("payment_session_id"),
            last_event_at: r.get("last_event_at"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }
}

#[async_trait::async_trait]
impl PaymentStore for PaymentsRepo {
    async fn apply_status(&self, update: &StatusUpdate) -> Result<ApplyOutcome> {
        // Single conditional write: the guard on last_event_at keeps an
        // older notification from overwriting a newer status.
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2,
                payment_session_id = COALESCE($3, payment_session_id),
                last_event_at = $4,
                updated_at = now()
            WHERE order_id = $1
              AND (last_event_at IS NULL OR last_event_at <= $4)
            "#,
        )
        .bind(&update.order_id)
        .bind(&update.status)
        .bind(update.payment_session_id.clone())
        .bind(update.event_time)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(ApplyOutcome::Applied);
        }

        let exists: bool = sqlx::query("SELECT EXISTS(SELECT 1 FROM payments WHERE order_id = $1) AS present")
            .bind(&update.order_id)
            .fetch_one(&self.pool)
            .await?
            .get("present");

        if exists {
            Ok(ApplyOutcome::Stale)
        } else {
            Ok(ApplyOutcome::NotFound)
        }
    }
}
