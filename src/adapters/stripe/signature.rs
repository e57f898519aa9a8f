//! Stripe webhook signature verification.
//!
//! Parses the `Stripe-Signature` header and verifies deliveries with
//! HMAC-SHA256 over `"{timestamp}.{payload}"`.
//!
//! # Security
//!
//! - Constant-time comparison to prevent timing attacks
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureParseError {
    /// Header is empty or missing.
    #[error("Missing Stripe-Signature header")]
    MissingHeader,
    /// Missing timestamp component (t=...).
    #[error("Missing timestamp (t=) in signature")]
    MissingTimestamp,
    /// Missing v1 signature component.
    #[error("Missing v1 signature in header")]
    MissingV1Signature,
    /// Invalid timestamp format.
    #[error("Invalid timestamp format")]
    InvalidTimestamp,
    /// Invalid signature format (not valid hex).
    #[error("Invalid signature format (not valid hex)")]
    InvalidSignatureFormat,
}

/// Verification failures for a parsed header.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error(transparent)]
    Parse(#[from] SignatureParseError),

    /// Event timestamp is older than the replay window.
    #[error("Event too old ({age_secs} seconds)")]
    TooOld { age_secs: i64 },

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Event timestamp in future")]
    InFuture,

    /// Computed signature does not match the provided one.
    #[error("Invalid signature")]
    Mismatch,
}

/// Parsed Stripe-Signature header components.
///
/// The header format is: `t=timestamp,v1=signature[,v0=legacy_signature]`
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe generated the event.
    pub timestamp: i64,

    /// Primary v1 signature (HMAC-SHA256, hex-encoded).
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parse a Stripe-Signature header into components.
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            // Skip parts without a key=value shape, like unknown keys below
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    v1_signature = Some(
                        hex_decode(value.trim())
                            .ok_or(SignatureParseError::InvalidSignatureFormat)?,
                    );
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }

        Ok(Self {
            timestamp: timestamp.ok_or(SignatureParseError::MissingTimestamp)?,
            v1_signature: v1_signature.ok_or(SignatureParseError::MissingV1Signature)?,
        })
    }
}

/// Verifies inbound webhook deliveries against the signing secret.
pub struct WebhookVerifier {
    secret: SecretString,
}

impl WebhookVerifier {
    /// Create a verifier for the given signing secret (whsec_...).
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Verify a delivery against its `Stripe-Signature` header value.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), SignatureError> {
        let header = SignatureHeader::parse(header)?;

        let age = now - header.timestamp;
        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(SignatureError::TooOld { age_secs: age });
        }
        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(SignatureError::InFuture);
        }

        let signed_payload = format!(
            "{}.{}",
            header.timestamp,
            String::from_utf8_lossy(payload)
        );

        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        if expected.as_slice().ct_eq(&header.v1_signature).unwrap_u8() != 1 {
            tracing::warn!("Invalid webhook signature");
            return Err(SignatureError::Mismatch);
        }

        Ok(())
    }
}

/// Decode a hex string to bytes.
fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = u8::from_str_radix(&hex[i..i + 2], 16).ok()?;
        bytes.push(byte);
    }
    Some(bytes)
}

/// Encode bytes to hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Build a `Stripe-Signature` header value for the given payload.
///
/// Used by tests and local tooling to forge valid deliveries.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    let result = mac.finalize().into_bytes();
    format!("t={},v1={}", timestamp, hex_encode(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Header Parsing
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_signature_header_valid() {
        let header = "t=1704067200,v1=5d41402abc4b2a76b9719d911017c592";
        let parsed = SignatureHeader::parse(header).unwrap();

        assert_eq!(parsed.timestamp, 1704067200);
        assert_eq!(
            hex_encode(&parsed.v1_signature),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn parse_signature_header_ignores_unknown_fields() {
        let header = "t=1704067200,v1=5d41402abc4b2a76b9719d911017c592,v0=aabbccdd";
        assert!(SignatureHeader::parse(header).is_ok());
    }

    #[test]
    fn parse_signature_header_skips_parts_without_equals() {
        let header = "garbage,t=1704067200,v1=5d41402abc4b2a76b9719d911017c592";
        let parsed = SignatureHeader::parse(header).unwrap();
        assert_eq!(parsed.timestamp, 1704067200);
    }

    #[test]
    fn parse_signature_header_only_garbage_parts_is_missing_timestamp() {
        let result = SignatureHeader::parse("garbage,more garbage");
        assert!(matches!(result, Err(SignatureParseError::MissingTimestamp)));
    }

    #[test]
    fn parse_signature_header_missing_timestamp() {
        let header = "v1=5d41402abc4b2a76b9719d911017c592";
        let result = SignatureHeader::parse(header);
        assert!(matches!(result, Err(SignatureParseError::MissingTimestamp)));
    }

    #[test]
    fn parse_signature_header_missing_v1() {
        let header = "t=1704067200";
        let result = SignatureHeader::parse(header);
        assert!(matches!(result, Err(SignatureParseError::MissingV1Signature)));
    }

    #[test]
    fn parse_signature_header_empty() {
        let result = SignatureHeader::parse("");
        assert!(matches!(result, Err(SignatureParseError::MissingHeader)));
    }

    #[test]
    fn parse_signature_header_invalid_timestamp() {
        let header = "t=not_a_number,v1=5d41402abc4b2a76b9719d911017c592";
        let result = SignatureHeader::parse(header);
        assert!(matches!(result, Err(SignatureParseError::InvalidTimestamp)));
    }

    #[test]
    fn parse_signature_header_invalid_hex() {
        let header = "t=1704067200,v1=not_valid_hex_xyz";
        let result = SignatureHeader::parse(header);
        assert!(matches!(
            result,
            Err(SignatureParseError::InvalidSignatureFormat)
        ));
    }

    #[test]
    fn parse_signature_header_odd_length_hex() {
        let header = "t=1704067200,v1=abc";
        let result = SignatureHeader::parse(header);
        assert!(matches!(
            result,
            Err(SignatureParseError::InvalidSignatureFormat)
        ));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Hex Encoding
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn hex_encode_bytes() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
    }

    #[test]
    fn hex_decode_roundtrip() {
        let original = vec![0xde, 0xad, 0xbe, 0xef];
        let encoded = hex_encode(&original);
        let decoded = hex_decode(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Verification
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let payload = br#"{"id":"evt_test"}"#;
        let now = 1704067200;
        let header = sign_payload(SECRET, now, payload);

        assert!(verifier().verify_at(payload, &header, now).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let payload = br#"{"id":"evt_test"}"#;
        let now = 1704067200;
        let header = sign_payload("wrong_secret", now, payload);

        let result = verifier().verify_at(payload, &header, now);
        assert!(matches!(result, Err(SignatureError::Mismatch)));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let payload = br#"{"id":"evt_test"}"#;
        let now = 1704067200;
        let header = sign_payload(SECRET, now, payload);

        let result = verifier().verify_at(br#"{"id":"evt_other"}"#, &header, now);
        assert!(matches!(result, Err(SignatureError::Mismatch)));
    }

    #[test]
    fn verify_rejects_expired_timestamp() {
        let payload = br#"{"id":"evt_test"}"#;
        let now = 1704067200;
        let header = sign_payload(SECRET, now - 600, payload); // 10 minutes ago

        let result = verifier().verify_at(payload, &header, now);
        assert!(matches!(result, Err(SignatureError::TooOld { .. })));
    }

    #[test]
    fn verify_rejects_future_timestamp() {
        let payload = br#"{"id":"evt_test"}"#;
        let now = 1704067200;
        let header = sign_payload(SECRET, now + 120, payload); // 2 minutes ahead

        let result = verifier().verify_at(payload, &header, now);
        assert!(matches!(result, Err(SignatureError::InFuture)));
    }

    #[test]
    fn verify_tolerates_small_clock_skew() {
        let payload = br#"{"id":"evt_test"}"#;
        let now = 1704067200;
        let header = sign_payload(SECRET, now + 30, payload);

        assert!(verifier().verify_at(payload, &header, now).is_ok());
    }

    #[test]
    fn verify_rejects_malformed_header() {
        let result = verifier().verify_at(b"{}", "malformed_header", 1704067200);
        assert!(matches!(result, Err(SignatureError::Parse(_))));
    }
}
