use serde::{Deserialize, Serialize};

/// Lowercase hex SHA-256 digest binding a block's contents.
pub type Commitment = String;

/// A book checkout recorded on the chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookCheckout {
    #[serde(alias = "book_id")]
    pub item_id: String,
    #[serde(alias = "user")]
    pub holder: String,
    pub checkout_date: String,
    /// Set only on the payload of the genesis block.
    pub is_genesis: bool,
}

impl BookCheckout {
    #[must_use]
    pub fn new(
        item_id: impl Into<String>,
        holder: impl Into<String>,
        checkout_date: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            holder: holder.into(),
            checkout_date: checkout_date.into(),
            is_genesis: false,
        }
    }

    /// Payload carried by the genesis block.
    #[must_use]
    pub fn genesis() -> Self {
        Self {
            is_genesis: true,
            ..Self::default()
        }
    }
}

/// A block in the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub position: u64,
    pub payload: BookCheckout,
    /// RFC 3339 capture time, fixed at creation.
    pub timestamp: String,
    /// SHA-256 over `position || timestamp || json(payload)`.
    pub commitment: Commitment,
    /// Commitment of the previous block (empty for genesis).
    pub predecessor_commitment: Commitment,
}

/// A catalog entry. Not linked into the chain; its identifier is derived
/// from its content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogItem {
    #[serde(alias = "id")]
    pub identifier: String,
    #[serde(alias = "isbn")]
    pub external_code: String,
    pub title: String,
    #[serde(alias = "author")]
    pub creator: String,
    pub publish_date: String,
}
