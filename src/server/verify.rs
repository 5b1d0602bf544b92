//! Helpers around the platform's use of a signing secret to authenticate
//! requests.
//!
//! Every request carries a timestamp and a signature header. The signature is
//! an HMAC SHA256 of `v0:{timestamp}:{body}`, keyed with the secret shared
//! when the app was created. We compute our own and compare it against the one
//! offered to know if the request really came from the platform, and refuse
//! timestamps too far from our clock so captured requests can't be replayed.
//!
//! <https://api.slack.com/authentication/verifying-requests-from-slack>

use super::error::{AuthFailure, MalformedRequest};
use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// How far, in seconds and in either direction, a request timestamp may drift
/// from our clock.
pub const MAX_CLOCK_SKEW: i64 = 5 * 60;

const VERSION: &str = "v0";

/// A newtype wrapper around the signing secret.
#[derive(Clone)]
pub struct SigningSecret(pub String);

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

/// The parts of one request that take part in verification.
#[derive(Debug)]
pub struct SignedRequest<'a> {
    pub timestamp: i64,
    pub signature: &'a str,
    pub body: &'a [u8],
}

impl<'a> SignedRequest<'a> {
    /// Pull the timestamp and signature out of the named headers. Their
    /// absence means the request is malformed rather than forged.
    pub fn from_headers(
        headers: &'a HeaderMap,
        timestamp_header: &str,
        signature_header: &str,
        body: &'a [u8],
    ) -> Result<Self, MalformedRequest> {
        let header = |name: &str| {
            headers
                .get(name)
                .ok_or_else(|| MalformedRequest::MissingHeader(name.to_owned()))?
                .to_str()
                .map_err(|_| MalformedRequest::InvalidHeader(name.to_owned()))
        };

        let timestamp = header(timestamp_header)?
            .trim()
            .parse()
            .map_err(|_| MalformedRequest::InvalidHeader(timestamp_header.to_owned()))?;

        Ok(SignedRequest {
            timestamp,
            signature: header(signature_header)?,
            body,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Verifier {
    secret: SigningSecret,
}

impl Verifier {
    pub fn new(secret: SigningSecret) -> Self {
        Verifier { secret }
    }

    /// Verify against the system clock.
    pub fn verify(&self, timestamp: i64, signature: &str, body: &[u8]) -> Result<(), AuthFailure> {
        self.verify_at(unix_now(), timestamp, signature, body)
    }

    pub fn verify_request(&self, req: &SignedRequest<'_>) -> Result<(), AuthFailure> {
        self.verify(req.timestamp, req.signature, req.body)
    }

    /// Verify as if the current unix time were `now`.
    pub fn verify_at(
        &self,
        now: i64,
        timestamp: i64,
        signature: &str,
        body: &[u8],
    ) -> Result<(), AuthFailure> {
        if now.abs_diff(timestamp) > MAX_CLOCK_SKEW.unsigned_abs() {
            return Err(AuthFailure::StaleTimestamp { timestamp, now });
        }

        let offered = signature
            .strip_prefix("v0=")
            .and_then(|hex_sig| hex::decode(hex_sig).ok())
            .ok_or(AuthFailure::SignatureMismatch)?;

        // `verify_slice` compares in constant time.
        self.mac(timestamp, body)
            .verify_slice(&offered)
            .map_err(|_| AuthFailure::SignatureMismatch)
    }

    /// The signature the platform would send for this timestamp and body.
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> String {
        format!(
            "{}={}",
            VERSION,
            hex::encode(self.mac(timestamp, body).finalize().into_bytes())
        )
    }

    fn mac(&self, timestamp: i64, body: &[u8]) -> HmacSha256 {
        // HMAC accepts keys of any length, so this can't fail.
        let mut mac = HmacSha256::new_from_slice(self.secret.0.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC takes keys of any length"));

        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b":");
        mac.update(body);
        mac
    }
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
