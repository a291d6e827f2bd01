use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

pub const SIGNATURE_256_HEADER: &str = "X-Hub-Signature-256";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("no signature")]
    Missing,

    #[error("malformed signature {0:?}")]
    Malformed(String),

    #[error("bad signature {0}")]
    Mismatch(String),
}

/// Check a webhook body against its `X-Hub-Signature-256` or, failing that,
/// its legacy `X-Hub-Signature` value.
pub fn verify(
    secret: &[u8],
    sha256: Option<&str>,
    sha1: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    if let Some(signature) = sha256 {
        let expected = decode(signature, "sha256=")?;
        let mac = Hmac::<Sha256>::new_from_slice(secret)
            .map_err(|_| SignatureError::Malformed(signature.to_string()))?;
        return check(mac, body, &expected, signature);
    }

    if let Some(signature) = sha1 {
        let expected = decode(signature, "sha1=")?;
        let mac = Hmac::<Sha1>::new_from_slice(secret)
            .map_err(|_| SignatureError::Malformed(signature.to_string()))?;
        return check(mac, body, &expected, signature);
    }

    Err(SignatureError::Missing)
}

fn decode(signature: &str, prefix: &str) -> Result<Vec<u8>, SignatureError> {
    let digest = signature.strip_prefix(prefix).unwrap_or(signature);
    hex::decode(digest).map_err(|_| SignatureError::Malformed(signature.to_string()))
}

fn check<M: Mac>(mut mac: M, body: &[u8], expected: &[u8], signature: &str) -> Result<(), SignatureError> {
    mac.update(body);
    mac.verify_slice(expected)
        .map_err(|_| SignatureError::Mismatch(signature.to_string()))
}

/// `sha256=<hex>` signature of `body`, as GitHub sends it.
pub fn sign_sha256(secret: &[u8], body: &[u8]) -> String {
    // HMAC takes keys of any length
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret) else {
        return String::new();
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
