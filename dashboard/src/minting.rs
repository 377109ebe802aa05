use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use rand::Rng;
use shared::types::MintRequest;
use shared::TokenId;
use tracing::{debug, instrument};

use crate::api::DevScoreBackend;

const TOKEN_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const TOKEN_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub token_id: TokenId,
    pub transaction_hash: Option<String>,
}

#[async_trait]
pub trait MintingService: Send + Sync {
    async fn mint(&self, request: &MintRequest) -> anyhow::Result<MintReceipt>;
}

/// Pretends to mint: waits, then makes up a token id. No chain is involved.
#[derive(Debug, Clone)]
pub struct SimulatedMinter {
    delay: Duration,
}

impl SimulatedMinter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

pub fn random_token_id() -> TokenId {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

#[async_trait]
impl MintingService for SimulatedMinter {
    #[instrument(skip(self, request), fields(score = request.score))]
    async fn mint(&self, request: &MintRequest) -> anyhow::Result<MintReceipt> {
        tokio::time::sleep(self.delay).await;
        let token_id = random_token_id();
        debug!("Simulated mint of token {token_id}");
        Ok(MintReceipt {
            token_id,
            transaction_hash: None,
        })
    }
}

/// Mints through the backend's `/api/mint-nft` endpoint.
#[derive(Clone)]
pub struct BackendMinter {
    backend: Arc<dyn DevScoreBackend>,
}

impl BackendMinter {
    pub fn new(backend: Arc<dyn DevScoreBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl MintingService for BackendMinter {
    #[instrument(skip(self, request), fields(score = request.score))]
    async fn mint(&self, request: &MintRequest) -> anyhow::Result<MintReceipt> {
        if request.wallet_address.is_none() {
            bail!("a wallet address is required to mint on the backend");
        }

        let response = self.backend.mint_nft(request).await?;
        Ok(MintReceipt {
            token_id: response.token_id,
            transaction_hash: response.transaction_hash,
        })
    }
}

/// Always hands out the same token.
#[derive(Debug, Clone)]
pub struct FixedMinter {
    token_id: TokenId,
}

impl FixedMinter {
    pub fn new(token_id: impl Into<TokenId>) -> Self {
        Self {
            token_id: token_id.into(),
        }
    }
}

#[async_trait]
impl MintingService for FixedMinter {
    async fn mint(&self, _request: &MintRequest) -> anyhow::Result<MintReceipt> {
        Ok(MintReceipt {
            token_id: self.token_id.clone(),
            transaction_hash: None,
        })
    }
}
