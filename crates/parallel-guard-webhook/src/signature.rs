//! Signing scheme: `HMAC-SHA256(secret, "<webhook_id>.<timestamp>.<body>")`,
//! hex encoded, carried in `webhook-signature` as `v1,<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Scheme tag written by [`signature_header`].
pub const SIGNATURE_VERSION: &str = "v1";

/// Shortest run of hex digits accepted as a digest candidate.
pub const MIN_DIGEST_HEX_LEN: usize = 32;

/// Bytes covered by the MAC. The timestamp is used exactly as received.
pub fn signed_content(webhook_id: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(webhook_id.len() + timestamp.len() + body.len() + 2);
    content.extend_from_slice(webhook_id.as_bytes());
    content.push(b'.');
    content.extend_from_slice(timestamp.as_bytes());
    content.push(b'.');
    content.extend_from_slice(body);
    content
}

/// Lowercase hex HMAC-SHA256 of the signed content.
pub fn sign(secret: &[u8], webhook_id: &str, timestamp: &str, body: &[u8]) -> Result<String, WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::EmptySecret);
    }
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|err| WebhookError::InvalidKey(err.to_string()))?;
    mac.update(&signed_content(webhook_id, timestamp, body));
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Renders a digest as a header value (`v1,<hex>`).
pub fn signature_header(digest: &str) -> String {
    format!("{SIGNATURE_VERSION},{digest}")
}

/// Drops any scheme prefix (text up to the last `,` or `=`) and lowercases.
pub fn normalize_token(token: &str) -> String {
    token
        .rsplit([',', '='])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Extracts digest candidates from a signature header.
///
/// Each whitespace-separated entry may be `v1,<hex>`, `v1=<hex>`, bare
/// `<hex>`, or a comma-joined run of those. Candidates are lowercased and
/// deduplicated in first-seen order; anything shorter than
/// [`MIN_DIGEST_HEX_LEN`] hex digits is ignored.
pub fn parse_signature_header(header: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for entry in header.split_whitespace() {
        for candidate in parse_entry(entry) {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn parse_entry(entry: &str) -> Vec<String> {
    let parts: Vec<&str> = entry.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();

    let keyed: Vec<String> = parts
        .iter()
        .filter_map(|part| part.split_once('='))
        .filter(|(scheme, value)| is_version_tag(scheme) && is_digest(value.trim()))
        .map(|(_, value)| value.trim().to_ascii_lowercase())
        .collect();
    if !keyed.is_empty() {
        return keyed;
    }

    match parts.split_first() {
        Some((first, rest)) if is_version_tag(first) && !rest.is_empty() => {
            if rest.iter().all(|p| is_digest(p)) {
                return rest.iter().map(|p| p.to_ascii_lowercase()).collect();
            }
            Vec::new()
        }
        _ if !parts.is_empty() && parts.iter().all(|p| is_digest(p)) => {
            parts.iter().map(|p| p.to_ascii_lowercase()).collect()
        }
        _ => Vec::new(),
    }
}

fn is_version_tag(value: &str) -> bool {
    let value = value.trim();
    value.len() < MIN_DIGEST_HEX_LEN && value.to_ascii_lowercase().starts_with('v')
}

fn is_digest(value: &str) -> bool {
    value.len() >= MIN_DIGEST_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}
