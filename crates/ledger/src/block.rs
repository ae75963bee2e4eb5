use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::crypto;
use crate::error::ChainError;
use crate::types::{Block, BookCheckout, Commitment};

/// Current UTC time formatted as RFC 3339.
pub fn current_timestamp() -> Result<String, ChainError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| ChainError::Serialization(e.to_string()))
}

impl Block {
    /// Builds a block from its fields and computes its commitment.
    pub(crate) fn seal(
        position: u64,
        payload: BookCheckout,
        timestamp: String,
        predecessor_commitment: Commitment,
    ) -> Result<Self, ChainError> {
        let commitment = crypto::commitment(position, &timestamp, &payload)?;
        Ok(Self {
            position,
            payload,
            timestamp,
            commitment,
            predecessor_commitment,
        })
    }

    /// Create the successor of `predecessor`, stamped with the current time.
    pub fn create(predecessor: &Self, payload: BookCheckout) -> Result<Self, ChainError> {
        Self::create_at(predecessor, payload, current_timestamp()?)
    }

    /// Create the successor of `predecessor` with an explicit timestamp.
    pub fn create_at(
        predecessor: &Self,
        payload: BookCheckout,
        timestamp: String,
    ) -> Result<Self, ChainError> {
        let position = predecessor
            .position
            .checked_add(1)
            .ok_or(ChainError::PositionOverflow(predecessor.position))?;
        Self::seal(
            position,
            payload,
            timestamp,
            predecessor.commitment.clone(),
        )
    }

    /// Recompute the commitment from the block's current fields and compare
    /// it with `expected`. Linkage is not checked here.
    #[must_use]
    pub fn recompute_and_compare(&self, expected: &str) -> bool {
        crypto::commitment(self.position, &self.timestamp, &self.payload)
            .is_ok_and(|recomputed| recomputed == expected)
    }
}
