#![allow(clippy::missing_errors_doc)]

mod block;
mod chain;
mod crypto;
mod error;
mod genesis;
pub mod http;
mod types;

pub use block::current_timestamp;
pub use chain::Chain;
pub use crypto::{catalog_identifier, commitment};
pub use error::{ChainError, ChainLinkageError};
pub use genesis::create_genesis;
pub use types::{Block, BookCheckout, CatalogItem, Commitment};
