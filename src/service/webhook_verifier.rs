use crate::domain::webhook::WebhookError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";
pub const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";

type HmacSha256 = Hmac<Sha256>;

/// Authenticates inbound processor notifications.
///
/// The signed message is the raw request body followed by the timestamp
/// header value; the body must not be parsed before verification succeeds.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Checks a hex-encoded HMAC-SHA256 signature against the raw body and
    /// timestamp. Comparison is constant-time.
    pub fn verify(&self, raw_body: &[u8], signature_hex: &str, timestamp: &str) -> Result<(), WebhookError> {
        let provided = match hex::decode(signature_hex.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return Err(WebhookError::InvalidSignature),
        };

        let expected = self.compute(raw_body, timestamp);
        if !constant_time_eq(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Hex encoding of the expected signature for a body/timestamp pair.
    pub fn signature_hex(&self, raw_body: &[u8], timestamp: &str) -> String {
        hex::encode(self.compute(raw_body, timestamp))
    }

    fn compute(&self, raw_body: &[u8], timestamp: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(raw_body);
        mac.update(timestamp.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
