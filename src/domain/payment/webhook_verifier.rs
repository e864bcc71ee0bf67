//! MercadoPago webhook signature verification.
//!
//! Verifies that an inbound payment notification genuinely originates from
//! MercadoPago and is fresh. HMAC-SHA256 over a canonical signing string with
//! timestamp validation against replayed captures.
//!
//! This is the single gate that must pass before any event payload is parsed
//! or trusted. It fails closed: every malformed input is a verification
//! failure, never an error propagated to the caller.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age (or future skew) for webhook events: 5 minutes.
const MAX_TIMESTAMP_SKEW_SECS: i64 = 300;

/// Parsed components of the `x-signature` header.
///
/// Format: `ts=<unix-seconds>,v1=<hex-hmac>`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses the comma-separated key=value header.
    ///
    /// A pair with more or fewer than two `=`-separated components, a
    /// non-numeric `ts`, non-hex `v1`, or a missing field all fail.
    fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let components: Vec<&str> = part.split('=').collect();
            if components.len() != 2 {
                return Err(WebhookError::ParseError(
                    "invalid signature header format".to_string(),
                ));
            }

            match components[0].trim() {
                "ts" => {
                    timestamp = Some(components[1].trim().parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex::decode(components[1].trim()).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing ts".to_string()))?;
        let v1_signature = v1_signature
            .ok_or_else(|| WebhookError::ParseError("missing v1 signature".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
        })
    }
}

/// Verifier for MercadoPago webhook signatures.
pub struct WebhookSignatureVerifier<'a> {
    secret: &'a str,
}

impl<'a> WebhookSignatureVerifier<'a> {
    /// Creates a verifier using the shared webhook secret.
    pub fn new(secret: &'a str) -> Self {
        Self { secret }
    }

    /// Verifies a webhook signature.
    ///
    /// Returns `true` only when the header parses, the timestamp is within
    /// the freshness window, and the HMAC matches. Pure and side-effect
    /// free; never panics on adversarial input.
    pub fn verify(&self, signature_header: &str, request_id: &str) -> bool {
        self.check(signature_header, request_id).is_ok()
    }

    fn check(&self, signature_header: &str, request_id: &str) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        // Freshness: reject replays of captured callbacks
        let now = chrono::Utc::now().timestamp();
        if (now - header.timestamp).abs() > MAX_TIMESTAMP_SKEW_SECS {
            return Err(WebhookError::InvalidSignature);
        }

        let expected = self.compute_signature(request_id, header.timestamp);

        // Constant-time comparison prevents timing side-channels
        if expected.len() != header.v1_signature.len()
            || expected.ct_eq(&header.v1_signature).unwrap_u8() != 1
        {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Computes the HMAC-SHA256 over the canonical signing string.
    fn compute_signature(&self, request_id: &str, timestamp: i64) -> Vec<u8> {
        let signed_payload = format!(
            "id:{};request-id:{};ts:{};",
            request_id, request_id, timestamp
        );

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signed_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Computes a valid hex signature for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, request_id: &str, timestamp: i64) -> String {
    let signed_payload = format!(
        "id:{};request-id:{};ts:{};",
        request_id, request_id, timestamp
    );
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
