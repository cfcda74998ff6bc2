use chrono::{DateTime, Utc};
use marketindex_payments::domain::webhook::WebhookError;
use marketindex_payments::repo::store::{ApplyOutcome, PaymentStore, StatusUpdate};
use marketindex_payments::service::reconciler::{ReconcileOutcome, WebhookReconciler};
use marketindex_payments::service::webhook_verifier::WebhookVerifier;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SECRET: &str = "k";
const TIMESTAMP: &str = "1700000000";

#[derive(Debug, Clone)]
struct RecordState {
    status: String,
    payment_session_id: Option<String>,
    last_event_at: Option<DateTime<Utc>>,
}

/// In-memory stand-in for the payments table, mirroring the repo's
/// conditional-update semantics.
#[derive(Default)]
struct MemoryStore {
    records: Mutex<HashMap<String, RecordState>>,
}

impl MemoryStore {
    fn with_order(order_id: &str) -> Arc<Self> {
        let store = Self::default();
        store.records.lock().unwrap().insert(
            order_id.to_string(),
            RecordState {
                status: "created".to_string(),
                payment_session_id: None,
                last_event_at: None,
            },
        );
        Arc::new(store)
    }

    fn record(&self, order_id: &str) -> Option<RecordState> {
        self.records.lock().unwrap().get(order_id).cloned()
    }

    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl PaymentStore for MemoryStore {
    async fn apply_status(&self, update: &StatusUpdate) -> anyhow::Result<ApplyOutcome> {
        let mut records = self.records.lock().unwrap();
        let record = match records.get_mut(&update.order_id) {
            Some(record) => record,
            None => return Ok(ApplyOutcome::NotFound),
        };

        if let Some(last) = record.last_event_at {
            if last > update.event_time {
                return Ok(ApplyOutcome::Stale);
            }
        }

        record.status = update.status.clone();
        if update.payment_session_id.is_some() {
            record.payment_session_id = update.payment_session_id.clone();
        }
        record.last_event_at = Some(update.event_time);
        Ok(ApplyOutcome::Applied)
    }
}

fn reconciler(store: Arc<MemoryStore>) -> WebhookReconciler {
    WebhookReconciler {
        verifier: WebhookVerifier::new(SECRET),
        store,
    }
}

fn sign(body: &[u8], timestamp: &str) -> String {
    WebhookVerifier::new(SECRET).signature_hex(body, timestamp)
}

#[tokio::test]
async fn valid_notification_marks_order_success() {
    let store = MemoryStore::with_order("o1");
    let body = br#"{"order":{"order_id":"o1","order_status":"SUCCESS"}}"#;
    let sig = sign(body, TIMESTAMP);

    let outcome = reconciler(store.clone())
        .process(body, Some(&sig), Some(TIMESTAMP))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            order_id: "o1".to_string(),
            status: "success".to_string(),
        }
    );
    assert_eq!(store.record("o1").unwrap().status, "success");
}

#[tokio::test]
async fn forged_signature_leaves_record_unchanged() {
    let store = MemoryStore::with_order("o1");
    let body = br#"{"order":{"order_id":"o1","order_status":"SUCCESS"}}"#;

    let result = reconciler(store.clone())
        .process(body, Some("deadbeef"), Some(TIMESTAMP))
        .await;

    assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    assert_eq!(store.record("o1").unwrap().status, "created");
}

#[tokio::test]
async fn unknown_order_is_record_not_found_and_creates_nothing() {
    let store = MemoryStore::with_order("o1");
    let body = br#"{"order":{"order_id":"nonexistent","order_status":"SUCCESS"}}"#;
    let sig = sign(body, TIMESTAMP);

    let result = reconciler(store.clone())
        .process(body, Some(&sig), Some(TIMESTAMP))
        .await;

    match result {
        Err(WebhookError::RecordNotFound(order_id)) => assert_eq!(order_id, "nonexistent"),
        other => panic!("expected RecordNotFound, got {:?}", other),
    }
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn duplicate_delivery_is_idempotent() {
    let store = MemoryStore::with_order("o1");
    let body = br#"{"order":{"order_id":"o1","order_status":"SUCCESS"}}"#;
    let sig = sign(body, TIMESTAMP);
    let r = reconciler(store.clone());

    r.process(body, Some(&sig), Some(TIMESTAMP)).await.unwrap();
    let after_first = store.record("o1").unwrap();

    // Redelivery must still be acknowledged and must not change the state.
    let second = r.process(body, Some(&sig), Some(TIMESTAMP)).await;
    assert!(second.is_ok());

    let after_second = store.record("o1").unwrap();
    assert_eq!(after_first.status, after_second.status);
    assert_eq!(after_first.last_event_at, after_second.last_event_at);
}

#[tokio::test]
async fn missing_signature_header_is_missing_credentials() {
    let store = MemoryStore::with_order("o1");
    let body = br#"{"order":{"order_id":"o1","order_status":"SUCCESS"}}"#;

    let result = reconciler(store.clone())
        .process(body, None, Some(TIMESTAMP))
        .await;

    assert!(matches!(result, Err(WebhookError::MissingCredentials)));
    assert_eq!(store.record("o1").unwrap().status, "created");
}

#[tokio::test]
async fn missing_timestamp_header_is_missing_credentials() {
    let store = MemoryStore::with_order("o1");
    let body = br#"{"order":{"order_id":"o1","order_status":"SUCCESS"}}"#;
    let sig = sign(body, TIMESTAMP);

    let result = reconciler(store.clone()).process(body, Some(&sig), None).await;

    assert!(matches!(result, Err(WebhookError::MissingCredentials)));
    assert_eq!(store.record("o1").unwrap().status, "created");
}

#[tokio::test]
async fn well_signed_garbage_body_is_malformed_payload() {
    let store = MemoryStore::with_order("o1");
    let body = b"not json at all";
    let sig = sign(body, TIMESTAMP);

    let result = reconciler(store.clone())
        .process(body, Some(&sig), Some(TIMESTAMP))
        .await;

    assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    assert_eq!(store.record("o1").unwrap().status, "created");
}

#[tokio::test]
async fn well_signed_body_without_order_fields_is_malformed_payload() {
    let store = MemoryStore::with_order("o1");
    let body = br#"{"order":{"order_id":"o1"}}"#;
    let sig = sign(body, TIMESTAMP);

    let result = reconciler(store.clone())
        .process(body, Some(&sig), Some(TIMESTAMP))
        .await;

    assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    assert_eq!(store.record("o1").unwrap().status, "created");
}

#[tokio::test]
async fn non_numeric_timestamp_is_rejected_after_verification() {
    let store = MemoryStore::with_order("o1");
    let body = br#"{"order":{"order_id":"o1","order_status":"SUCCESS"}}"#;
    let sig = sign(body, "later");

    let result = reconciler(store.clone())
        .process(body, Some(&sig), Some("later"))
        .await;

    assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    assert_eq!(store.record("o1").unwrap().status, "created");
}

#[tokio::test]
async fn older_event_does_not_downgrade_newer_status() {
    let store = MemoryStore::with_order("o1");
    let r = reconciler(store.clone());

    let success = br#"{"order":{"order_id":"o1","order_status":"SUCCESS"}}"#;
    let success_ts = "1700000100";
    r.process(success, Some(&sign(success, success_ts)), Some(success_ts))
        .await
        .unwrap();

    // A delayed "pending" from before the success must be acknowledged as
    // stale without overwriting.
    let pending = br#"{"order":{"order_id":"o1","order_status":"PENDING"}}"#;
    let pending_ts = "1700000000";
    let outcome = r
        .process(pending, Some(&sign(pending, pending_ts)), Some(pending_ts))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome::Stale {
            order_id: "o1".to_string(),
        }
    );
    assert_eq!(store.record("o1").unwrap().status, "success");
}

#[tokio::test]
async fn processor_order_id_is_persisted_and_kept() {
    let store = MemoryStore::with_order("o1");
    let r = reconciler(store.clone());

    let active = br#"{"order":{"order_id":"o1","order_status":"ACTIVE","cf_order_id":448132}}"#;
    r.process(active, Some(&sign(active, TIMESTAMP)), Some(TIMESTAMP))
        .await
        .unwrap();
    assert_eq!(
        store.record("o1").unwrap().payment_session_id.as_deref(),
        Some("448132")
    );

    // A later event without the id must not clear it.
    let paid = br#"{"order":{"order_id":"o1","order_status":"PAID"}}"#;
    let later = "1700000200";
    r.process(paid, Some(&sign(paid, later)), Some(later))
        .await
        .unwrap();

    let record = store.record("o1").unwrap();
    assert_eq!(record.status, "paid");
    assert_eq!(record.payment_session_id.as_deref(), Some("448132"));
}

#[tokio::test]
async fn nested_data_order_payload_reconciles() {
    let store = MemoryStore::with_order("o2");
    let body = br#"{"data":{"order":{"order_id":"o2","order_status":"FAILED"}}}"#;
    let sig = sign(body, TIMESTAMP);

    reconciler(store.clone())
        .process(body, Some(&sig), Some(TIMESTAMP))
        .await
        .unwrap();

    assert_eq!(store.record("o2").unwrap().status, "failed");
}
