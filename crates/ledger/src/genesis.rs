use crate::block::current_timestamp;
use crate::error::ChainError;
use crate::types::{Block, BookCheckout};

/// Create the genesis block.
///
/// It sits at position 0 with an empty predecessor commitment, as if built on
/// top of a zero-valued placeholder, and carries a payload flagged
/// `is_genesis`. It is the root of trust and is never validated against a
/// predecessor.
pub fn create_genesis() -> Result<Block, ChainError> {
    Block::seal(0, BookCheckout::genesis(), current_timestamp()?, String::new())
}
