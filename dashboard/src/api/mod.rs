use async_trait::async_trait;
use serde_json::Value;
use shared::types::{
    ActivityResponse, GithubCheckResponse, LeaderboardEntry, MintRequest, MintResponse,
    SyncScoreResponse,
};
use shared::WalletAddress;

pub use shared::backend::BackendClient;

pub mod prometheus;

/// HTTP contract of the DevScore backend as seen by the state containers.
#[async_trait]
pub trait DevScoreBackend: Send + Sync {
    async fn activity(&self, username: &str) -> anyhow::Result<ActivityResponse>;

    async fn sync_score(&self, wallet: &WalletAddress) -> anyhow::Result<SyncScoreResponse>;

    async fn check_github(&self, wallet: &WalletAddress) -> anyhow::Result<GithubCheckResponse>;

    async fn connect_github(&self, wallet: &WalletAddress, username: &str)
        -> anyhow::Result<Value>;

    async fn mint_nft(&self, request: &MintRequest) -> anyhow::Result<MintResponse>;

    async fn leaderboard(&self, limit: u32) -> anyhow::Result<Vec<LeaderboardEntry>>;
}

#[async_trait]
impl DevScoreBackend for BackendClient {
    async fn activity(&self, username: &str) -> anyhow::Result<ActivityResponse> {
        BackendClient::activity(self, username).await
    }

    async fn sync_score(&self, wallet: &WalletAddress) -> anyhow::Result<SyncScoreResponse> {
        BackendClient::sync_score(self, wallet).await
    }

    async fn check_github(&self, wallet: &WalletAddress) -> anyhow::Result<GithubCheckResponse> {
        BackendClient::check_github(self, wallet).await
    }

    async fn connect_github(
        &self,
        wallet: &WalletAddress,
        username: &str,
    ) -> anyhow::Result<Value> {
        BackendClient::connect_github(self, wallet, username).await
    }

    async fn mint_nft(&self, request: &MintRequest) -> anyhow::Result<MintResponse> {
        BackendClient::mint_nft(self, request).await
    }

    async fn leaderboard(&self, limit: u32) -> anyhow::Result<Vec<LeaderboardEntry>> {
        BackendClient::leaderboard(self, limit).await
    }
}
