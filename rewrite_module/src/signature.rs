use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "x-notion-signature";
pub const TIMESTAMP_HEADER: &str = "x-notion-timestamp";

/// Verify the webhook signature: HMAC-SHA256 over `timestamp + raw_body`,
/// hex-encoded, optionally carrying a `sha256=` prefix in the header value.
///
/// With no secret configured the request is accepted as-is (trusted internal
/// delivery). With a secret configured, a missing signature or timestamp
/// header rejects the request.
pub fn verify_notion_signature(
    secret: Option<&str>,
    signature: Option<&str>,
    timestamp: Option<&str>,
    raw_body: &[u8],
) -> bool {
    let Some(secret) = secret.filter(|value| !value.trim().is_empty()) else {
        return true;
    };
    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        return false;
    };

    let normalized = signature.strip_prefix("sha256=").unwrap_or(signature);
    let Ok(provided) = hex::decode(normalized) else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(timestamp.as_bytes());
    mac.update(raw_body);
    mac.verify_slice(&provided).is_ok()
}
