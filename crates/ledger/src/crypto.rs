use md5::Md5;
use sha2::{Digest, Sha256};

use crate::error::ChainError;
use crate::types::{BookCheckout, Commitment};

/// SHA-256 hash of arbitrary bytes, hex encoded.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Builds the message a block commits to:
/// `decimal(position) || timestamp || json(payload)`
fn commitment_message(
    position: u64,
    timestamp: &str,
    payload: &BookCheckout,
) -> Result<Vec<u8>, ChainError> {
    let payload = serde_json::to_vec(payload)?;
    let position = position.to_string();

    let mut msg = Vec::with_capacity(position.len() + timestamp.len() + payload.len());
    msg.extend_from_slice(position.as_bytes());
    msg.extend_from_slice(timestamp.as_bytes());
    msg.extend_from_slice(&payload);
    Ok(msg)
}

/// Commitment over a block's position, timestamp and payload.
pub fn commitment(
    position: u64,
    timestamp: &str,
    payload: &BookCheckout,
) -> Result<Commitment, ChainError> {
    let msg = commitment_message(position, timestamp, payload)?;
    Ok(hash_bytes(&msg))
}

/// Content-derived catalog identifier: MD5 of `external_code || publish_date`.
#[must_use]
pub fn catalog_identifier(external_code: &str, publish_date: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(external_code.as_bytes());
    hasher.update(publish_date.as_bytes());
    hex::encode(hasher.finalize())
}
