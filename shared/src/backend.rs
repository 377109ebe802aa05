use std::time::Duration;

use anyhow::{anyhow, bail};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::types::*;
use crate::*;

#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            bail!("Backend URL {base_url} can't be used as a base");
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded `segments` to the base URL path.
    pub fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Backend URL {} can't be used as a base", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    #[instrument(skip(self))]
    pub async fn check_github(&self, wallet: &WalletAddress) -> anyhow::Result<GithubCheckResponse> {
        let url = self.endpoint(&["api", "github", "check", wallet.as_str()])?;
        let response = self.client.get(url).send().await?;
        parse_response(response).await
    }

    #[instrument(skip(self))]
    pub async fn connect_github(
        &self,
        wallet: &WalletAddress,
        github_username: &str,
    ) -> anyhow::Result<Value> {
        let url = self.endpoint(&["api", "github", "connect"])?;
        let body = GithubConnectRequest {
            wallet_address: wallet.clone(),
            github_username: github_username.to_string(),
        };
        let response = self.client.post(url).json(&body).send().await?;
        parse_response(response).await
    }

    #[instrument(skip(self))]
    pub async fn activity(&self, username: &str) -> anyhow::Result<ActivityResponse> {
        let url = self.endpoint(&["api", "github", "activity", username])?;
        let response = self
            .client
            .get(url)
            .query(&[("refine", "true")])
            .send()
            .await?;
        parse_response(response).await
    }

    #[instrument(skip(self))]
    pub async fn sync_score(&self, wallet: &WalletAddress) -> anyhow::Result<SyncScoreResponse> {
        let url = self.endpoint(&["api", "github", "sync-score", wallet.as_str()])?;
        let response = self.client.post(url).send().await?;
        parse_response(response).await
    }

    #[instrument(skip(self, request), fields(score = request.score))]
    pub async fn mint_nft(&self, request: &MintRequest) -> anyhow::Result<MintResponse> {
        let url = self.endpoint(&["api", "mint-nft"])?;
        let response = self.client.post(url).json(request).send().await?;
        let response: MintResponse = parse_response(response).await?;
        if !response.success {
            bail!("Backend refused to mint token {}", response.token_id);
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn leaderboard(&self, limit: u32) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let url = self.endpoint(&["api", "leaderboard"])?;
        let response = self
            .client
            .get(url)
            .query(&[("limit", limit)])
            .send()
            .await?;
        let response: LeaderboardResponse = parse_response(response).await?;
        Ok(response.leaderboard)
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Backend responded with {status}: {body}");
    bail!("{}", error_message(status, &body))
}

pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorDetail>(body) {
        Ok(detail) => detail.message(),
        Err(_) => format!("Backend responded with HTTP {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(base, None).unwrap()
    }

    #[test]
    fn endpoints_from_bare_host() {
        let url = client("http://localhost:8000")
            .endpoint(&["api", "github", "check", "QUBICABC"])
            .unwrap();

        assert_eq!(url.as_str(), "http://localhost:8000/api/github/check/QUBICABC");
    }

    #[test]
    fn endpoints_keep_base_path() {
        let with_slash = client("https://devscore.example/backend/")
            .endpoint(&["api", "leaderboard"])
            .unwrap();
        let without_slash = client("https://devscore.example/backend")
            .endpoint(&["api", "leaderboard"])
            .unwrap();

        assert_eq!(with_slash.as_str(), "https://devscore.example/backend/api/leaderboard");
        assert_eq!(with_slash, without_slash);
    }

    #[test]
    fn usernames_are_escaped() {
        let url = client("http://localhost:8000")
            .endpoint(&["api", "github", "activity", "a/b c"])
            .unwrap();

        assert_eq!(url.as_str(), "http://localhost:8000/api/github/activity/a%2Fb%20c");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(BackendClient::new("mailto:dev@example.com", None).is_err());
        assert!(BackendClient::new("not a url", None).is_err());
    }

    #[test]
    fn error_messages_prefer_detail() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"detail":"Wallet already linked"}"#),
            "Wallet already linked"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            "Backend responded with HTTP 502 Bad Gateway"
        );
    }
}
