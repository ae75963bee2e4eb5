use crate::error::{ChainError, ChainLinkageError};
use crate::genesis::create_genesis;
use crate::types::{Block, BookCheckout};

/// The ledger: an ordered, append-only list of hash-linked blocks.
///
/// Always holds at least the genesis block.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Create a new chain seeded with a freshly built genesis block.
    pub fn new() -> Result<Self, ChainError> {
        Self::with_genesis(create_genesis()?)
    }

    /// Create a chain from an existing genesis block.
    ///
    /// The block must sit at position 0, have an empty predecessor commitment,
    /// carry a genesis payload and match its own commitment.
    pub fn with_genesis(genesis: Block) -> Result<Self, ChainError> {
        if !is_valid_genesis(&genesis) {
            return Err(ChainError::InvalidGenesis);
        }

        Ok(Self {
            blocks: vec![genesis],
        })
    }

    /// Build a block for `payload` on top of the tip, validate it and append it.
    ///
    /// On rejection the chain is left unchanged.
    pub fn append(&mut self, payload: BookCheckout) -> Result<Block, ChainError> {
        let candidate = Block::create(self.tip()?, payload)?;
        self.append_block(candidate)
    }

    /// Validate an already built candidate against the tip and append it.
    pub fn append_block(&mut self, candidate: Block) -> Result<Block, ChainError> {
        Self::check_link(&candidate, self.tip()?)?;

        tracing::debug!(
            position = candidate.position,
            commitment = %candidate.commitment,
            "block appended"
        );
        self.blocks.push(candidate.clone());
        Ok(candidate)
    }

    /// Check that `candidate` correctly extends `tip`.
    ///
    /// Checks run in order: predecessor commitment, the candidate's own
    /// commitment, then position.
    pub fn check_link(candidate: &Block, tip: &Block) -> Result<(), ChainLinkageError> {
        if candidate.predecessor_commitment != tip.commitment {
            return Err(ChainLinkageError::PredecessorMismatch);
        }

        if !candidate.recompute_and_compare(&candidate.commitment) {
            return Err(ChainLinkageError::CommitmentMismatch);
        }

        let expected = tip
            .position
            .checked_add(1)
            .ok_or(ChainLinkageError::PositionOverflow(tip.position))?;
        if candidate.position != expected {
            return Err(ChainLinkageError::PositionGap {
                expected,
                got: candidate.position,
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn is_valid(candidate: &Block, tip: &Block) -> bool {
        Self::check_link(candidate, tip).is_ok()
    }

    /// Re-verify the whole chain from genesis to tip.
    pub fn audit(&self) -> Result<(), ChainError> {
        let genesis = self.blocks.first().ok_or(ChainError::EmptyChain)?;
        if !is_valid_genesis(genesis) {
            return Err(ChainError::InvalidGenesis);
        }

        for pair in self.blocks.windows(2) {
            Self::check_link(&pair[1], &pair[0]).map_err(|source| ChainError::InvalidBlock {
                position: pair[1].position,
                source,
            })?;
        }

        Ok(())
    }

    /// The most recently appended block.
    pub fn tip(&self) -> Result<&Block, ChainError> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    /// The number of blocks in the chain.
    #[must_use]
    pub const fn height(&self) -> u64 {
        self.blocks.len() as u64
    }

    /// Get a block by position.
    #[must_use]
    pub fn get_block(&self, position: u64) -> Option<&Block> {
        usize::try_from(position)
            .ok()
            .and_then(|index| self.blocks.get(index))
    }

    /// All blocks in chain order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }
}

fn is_valid_genesis(block: &Block) -> bool {
    block.position == 0
        && block.payload.is_genesis
        && block.predecessor_commitment.is_empty()
        && block.recompute_and_compare(&block.commitment)
}
