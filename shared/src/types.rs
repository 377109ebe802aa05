//! Request and response bodies of the DevScore backend.

use serde_json::Value;

use super::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    #[serde(default)]
    pub total_commits: Option<u64>,
    #[serde(default)]
    pub total_prs: Option<u64>,
    #[serde(default)]
    pub total_issues: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<WalletAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    #[serde(default)]
    pub summary: ActivitySummary,
    #[serde(default)]
    pub refined: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncScoreResponse {
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub activity_summary: ActivitySummary,
    #[serde(default)]
    pub github_username: Option<GithubHandle>,
    #[serde(default)]
    pub refined_insights: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubCheckResponse {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub github_username: Option<GithubHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubConnectRequest {
    pub wallet_address: WalletAddress,
    pub github_username: GithubHandle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub wallet_address: Option<WalletAddress>,
    pub score: u32,
    pub activity: Activity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintResponse {
    #[serde(default)]
    pub success: bool,
    pub token_id: TokenId,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub wallet_address: WalletAddress,
    pub username: String,
    pub score: u32,
    #[serde(default)]
    pub has_nft: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: Value,
}

impl ErrorDetail {
    /// Validation failures come back as a list of objects instead of a string.
    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(message) => message.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_string(),
                    None => item.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}
