use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Body field that lets a sender override the configured webhook secret.
const SECRET_FIELD: &str = "secret";

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// What a sender is expected to have signed, and with which key.
struct SignedForm {
    canonical: Vec<u8>,
    override_secret: Option<String>,
    had_secret_field: bool,
}

/// Parses the body, pulls out the top-level `secret` field and re-serializes
/// the rest compactly with key order preserved.
fn signed_form(body: &str) -> Result<SignedForm, SignatureError> {
    let mut payload: Value = serde_json::from_str(body)?;

    let removed = payload
        .as_object_mut()
        .and_then(|map| map.shift_remove(SECRET_FIELD));
    let had_secret_field = removed.is_some();
    let override_secret = removed
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(SignedForm {
        canonical: serde_json::to_vec(&payload)?,
        override_secret,
        had_secret_field,
    })
}

fn hmac_with(key: &str, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    mac
}

/// Checks an `x-gitea-signature` header against the request body.
///
/// The digest is keyed with the body's own `secret` field when it carries a
/// non-empty one, otherwise with `default_secret`. It is accepted when it
/// covers the canonical form of the body (compact, `secret` removed, key order
/// kept) or, for bodies without a `secret` field, the raw bytes as received.
/// The header is trimmed and hex-decoded, so digest case does not matter;
/// comparison runs in constant time on the decoded bytes.
///
/// A body that does not parse as JSON is an error rather than a mismatch.
pub fn verify_signature(
    body: &str,
    signature: &str,
    default_secret: &str,
) -> Result<bool, SignatureError> {
    let form = signed_form(body)?;

    let expected = match hex::decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };

    let key = form.override_secret.as_deref().unwrap_or(default_secret);
    if hmac_with(key, &form.canonical).verify_slice(&expected).is_ok() {
        return Ok(true);
    }

    Ok(!form.had_secret_field
        && hmac_with(key, body.as_bytes())
            .verify_slice(&expected)
            .is_ok())
}

/// Hex HMAC-SHA256 of the canonical form of `body`, keyed the way
/// [`verify_signature`] keys it.
pub fn sign_payload(body: &str, default_secret: &str) -> Result<String, SignatureError> {
    let form = signed_form(body)?;
    let key = form.override_secret.as_deref().unwrap_or(default_secret);

    Ok(hex::encode(hmac_with(key, &form.canonical).finalize().into_bytes()))
}
