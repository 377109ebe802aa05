//! In-memory fakes for the container tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use async_trait::async_trait;
use serde_json::{json, Value};
use shared::types::{
    ActivityResponse, ActivitySummary, GithubCheckResponse, LeaderboardEntry, MintRequest,
    MintResponse, SyncScoreResponse,
};
use shared::{Activity, WalletAddress};
use tokio::sync::oneshot;

use crate::{
    api::{prometheus::PrometheusClient, DevScoreBackend},
    auth::{AuthContext, StaticAuthProvider},
    messages::{MessageLoader, MsgCategory},
    minting::{FixedMinter, MintReceipt, MintingService},
    notify::{Notifier, Toast},
    wallet::{FixedWallet, WalletProvider},
    Context,
};

pub fn context(notifier: Arc<RecordingNotifier>) -> Context {
    context_with_backend(notifier, Arc::new(FakeBackend::default()))
}

pub fn context_with_backend(notifier: Arc<RecordingNotifier>, backend: Arc<FakeBackend>) -> Context {
    Context {
        backend,
        minter: Arc::new(FixedMinter::new("TOKEN001")),
        wallet: Arc::new(FixedWallet::new("QUBICTEST".into())),
        auth: AuthContext::new(Arc::new(StaticAuthProvider::from_accounts(
            Some("octocat".to_string()),
            None,
        ))),
        messages: Arc::new(MessageLoader::builtin().unwrap()),
        notifier,
        prometheus: Arc::new(PrometheusClient::default()),
    }
}

pub fn summary(activity: Activity) -> ActivitySummary {
    ActivitySummary {
        total_commits: Some(activity.commits),
        total_prs: Some(activity.pull_requests),
        total_issues: Some(activity.issues),
        wallet_address: None,
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn categories(&self) -> Vec<MsgCategory> {
        self.toasts().into_iter().map(|t| t.category).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

/// Backend answering from fixtures. Keys without a fixture fail like a 404.
#[derive(Default)]
pub struct FakeBackend {
    calls: AtomicUsize,
    activity: Mutex<HashMap<String, ActivityResponse>>,
    sync: Mutex<HashMap<String, SyncScoreResponse>>,
    links: Mutex<HashMap<String, String>>,
    checks_fail: AtomicBool,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl FakeBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn with_activity(self, username: &str, activity: Activity) -> Self {
        self.activity.lock().unwrap().insert(
            username.to_string(),
            ActivityResponse {
                summary: summary(activity),
                refined: Some(json!({ "summary": format!("{username} ships a lot") })),
            },
        );
        self
    }

    pub fn with_sync(self, wallet: &str, username: &str, activity: Activity, score: u32) -> Self {
        self.sync.lock().unwrap().insert(
            wallet.to_string(),
            SyncScoreResponse {
                score: Some(score),
                activity_summary: summary(activity),
                github_username: Some(username.to_string()),
                refined_insights: None,
            },
        );
        self
    }

    pub fn with_link(self, wallet: &str, username: &str) -> Self {
        self.links
            .lock()
            .unwrap()
            .insert(wallet.to_string(), username.to_string());
        self
    }

    /// Makes every `check_github` fail like an unreachable backend.
    pub fn fail_checks(&self) {
        self.checks_fail.store(true, Ordering::SeqCst);
    }

    /// Holds the response for `key` until the returned sender fires.
    pub fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), receiver);
        sender
    }

    async fn enter(&self, key: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().remove(key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl DevScoreBackend for FakeBackend {
    async fn activity(&self, username: &str) -> anyhow::Result<ActivityResponse> {
        self.enter(username).await;
        match self.activity.lock().unwrap().get(username) {
            Some(response) => Ok(response.clone()),
            None => bail!("GitHub user '{username}' not found"),
        }
    }

    async fn sync_score(&self, wallet: &WalletAddress) -> anyhow::Result<SyncScoreResponse> {
        self.enter(wallet.as_str()).await;
        match self.sync.lock().unwrap().get(wallet.as_str()) {
            Some(response) => Ok(response.clone()),
            None => bail!("No GitHub account linked to this wallet"),
        }
    }

    async fn check_github(&self, wallet: &WalletAddress) -> anyhow::Result<GithubCheckResponse> {
        self.enter(wallet.as_str()).await;
        if self.checks_fail.load(Ordering::SeqCst) {
            bail!("Backend responded with HTTP 503 Service Unavailable");
        }
        let username = self.links.lock().unwrap().get(wallet.as_str()).cloned();
        Ok(GithubCheckResponse {
            connected: username.is_some(),
            github_username: username,
        })
    }

    async fn connect_github(&self, wallet: &WalletAddress, username: &str) -> anyhow::Result<Value> {
        self.enter(username).await;
        if username == "ghost" {
            bail!("GitHub user '{username}' not found");
        }
        self.links
            .lock()
            .unwrap()
            .insert(wallet.to_string(), username.to_string());
        Ok(json!({ "success": true }))
    }

    async fn mint_nft(&self, request: &MintRequest) -> anyhow::Result<MintResponse> {
        self.enter("mint").await;
        if request.wallet_address.is_none() {
            bail!("wallet_address: field required");
        }
        Ok(MintResponse {
            success: true,
            token_id: "BACKEND1".to_string(),
            transaction_hash: Some("0xabc".to_string()),
        })
    }

    async fn leaderboard(&self, limit: u32) -> anyhow::Result<Vec<LeaderboardEntry>> {
        self.enter("leaderboard").await;
        Ok((1..=limit.min(3))
            .map(|rank| LeaderboardEntry {
                rank,
                wallet_address: format!("QUBIC{rank}").into(),
                username: format!("dev_{rank}"),
                score: 1000 - rank * 10,
                has_nft: rank == 1,
            })
            .collect())
    }
}

pub struct FailingWallet;

#[async_trait]
impl WalletProvider for FailingWallet {
    async fn connect(&self) -> anyhow::Result<WalletAddress> {
        bail!("extension not found")
    }
}

pub struct GatedWallet {
    address: WalletAddress,
    gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedWallet {
    pub fn new(address: &str) -> (Self, oneshot::Sender<()>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                address: address.into(),
                gate: tokio::sync::Mutex::new(Some(receiver)),
            },
            sender,
        )
    }
}

#[async_trait]
impl WalletProvider for GatedWallet {
    async fn connect(&self) -> anyhow::Result<WalletAddress> {
        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(self.address.clone())
    }
}

/// Fails the first `failures` mints, then succeeds.
#[derive(Default)]
pub struct FlakyMinter {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyMinter {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MintingService for FlakyMinter {
    async fn mint(&self, _request: &MintRequest) -> anyhow::Result<MintReceipt> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            bail!("testnet node unreachable");
        }
        Ok(MintReceipt {
            token_id: format!("FLAKY{call:03}"),
            transaction_hash: None,
        })
    }
}
