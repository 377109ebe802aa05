use chrono::{DateTime, Utc};

use super::*;

pub type TokenId = String;

/// A minted score. Fields are private so a record can't change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftRecord {
    token_id: TokenId,
    minted_at: DateTime<Utc>,
    score: u32,
    transaction_hash: Option<String>,
}

impl NftRecord {
    pub fn new(
        token_id: TokenId,
        minted_at: DateTime<Utc>,
        score: u32,
        transaction_hash: Option<String>,
    ) -> Self {
        Self {
            token_id,
            minted_at,
            score,
            transaction_hash,
        }
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    pub fn minted_at(&self) -> DateTime<Utc> {
        self.minted_at
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    pub fn minted_on(&self) -> String {
        self.minted_at.format("%Y-%m-%d").to_string()
    }
}
