use std::sync::RwLock;

use serde_json::Value;
use shared::{
    calculate_score, types::MintRequest, Activity, GithubHandle, NftRecord, WalletAddress,
};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    api::prometheus::{Operation, Outcome},
    error::{DevScoreError, Result},
    guard::{read, write, Generation, Update},
    messages::MsgCategory,
    Context,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(DevScoreError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MintStatus {
    #[default]
    Idle,
    Minting,
    Minted,
    Error(DevScoreError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevScoreState {
    pub activity: Activity,
    pub score: u32,
    pub insights: Option<Value>,
    pub github_username: Option<GithubHandle>,
    pub wallet_address: Option<WalletAddress>,
    pub load: LoadStatus,
    pub mint: MintStatus,
    pub has_minted: bool,
    pub nft: Option<NftRecord>,
}

impl DevScoreState {
    pub fn is_loading(&self) -> bool {
        self.load == LoadStatus::Loading
    }

    pub fn is_minting(&self) -> bool {
        self.mint == MintStatus::Minting
    }
}

/// Activity, score and mint state of the current session.
///
/// `fetch_activity` and `sync_from_wallet` share one generation counter:
/// whichever of them was issued last owns the activity fields, and older
/// responses are dropped. Mints never overlap.
pub struct DevScore {
    context: Context,
    state: RwLock<DevScoreState>,
    activity_generation: Generation,
}

struct ActivityUpdate {
    activity: Activity,
    insights: Option<Value>,
    github_username: Option<GithubHandle>,
    wallet_address: Option<WalletAddress>,
}

impl DevScore {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            state: Default::default(),
            activity_generation: Default::default(),
        }
    }

    pub fn snapshot(&self) -> DevScoreState {
        read(&self.state).clone()
    }

    pub fn score(&self) -> u32 {
        read(&self.state).score
    }

    pub fn has_minted(&self) -> bool {
        read(&self.state).has_minted
    }

    pub fn is_loading(&self) -> bool {
        read(&self.state).is_loading()
    }

    pub fn is_minting(&self) -> bool {
        read(&self.state).is_minting()
    }

    /// Wallet to mint to when the score came from a username fetch.
    pub fn attach_wallet(&self, address: Option<WalletAddress>) {
        write(&self.state).wallet_address = address;
    }

    #[instrument(skip(self))]
    pub async fn fetch_activity(&self, identifier: &str) -> Result<Update<Activity>> {
        let started = chrono::Utc::now();
        let username = identifier.trim();
        if username.is_empty() {
            return Err(self.reject_load(
                Operation::FetchActivity,
                DevScoreError::Validation("a GitHub username is required".to_string()),
                started,
            ));
        }

        let ticket = self.activity_generation.issue();
        write(&self.state).load = LoadStatus::Loading;

        self.context.prometheus.add_backend_request();
        let result = self
            .context
            .backend
            .activity(username)
            .await
            .map(|response| ActivityUpdate {
                activity: Activity::from(&response.summary),
                insights: response.refined,
                github_username: Some(username.to_string()),
                wallet_address: None,
            });

        let update = self.apply(Operation::FetchActivity, ticket, result, started)?;
        if let Update::Applied(activity) = &update {
            self.context.notify(
                MsgCategory::ActivitySynced,
                vec![
                    ("commits", activity.commits.to_string()),
                    ("pull_requests", activity.pull_requests.to_string()),
                    ("score", calculate_score(activity).to_string()),
                ],
            );
        }
        Ok(update)
    }

    #[instrument(skip(self, address), fields(wallet = address.short(12)))]
    pub async fn sync_from_wallet(&self, address: &WalletAddress) -> Result<Update<Activity>> {
        let started = chrono::Utc::now();
        if address.as_str().trim().is_empty() {
            return Err(self.reject_load(
                Operation::SyncFromWallet,
                DevScoreError::Validation("a wallet address is required".to_string()),
                started,
            ));
        }

        let ticket = self.activity_generation.issue();
        write(&self.state).load = LoadStatus::Loading;

        self.context.prometheus.add_backend_request();
        let result = self
            .context
            .backend
            .sync_score(address)
            .await
            .map(|response| {
                let activity = Activity::from(&response.activity_summary);
                let local = calculate_score(&activity);
                if let Some(remote) = response.score.filter(|remote| *remote != local) {
                    warn!("Backend reported score {remote}, recomputed {local} from activity");
                }
                ActivityUpdate {
                    activity,
                    insights: response.refined_insights,
                    github_username: response.github_username,
                    wallet_address: Some(address.clone()),
                }
            });
        let reported_username = result
            .as_ref()
            .ok()
            .and_then(|update| update.github_username.clone());

        let update = self.apply(Operation::SyncFromWallet, ticket, result, started)?;
        if let Update::Applied(activity) = &update {
            let github_username = reported_username.unwrap_or_else(|| "unknown".to_string());
            self.context.notify(
                MsgCategory::WalletSynced,
                vec![
                    ("score", calculate_score(activity).to_string()),
                    ("github_username", github_username),
                ],
            );
        }
        Ok(update)
    }

    #[instrument(skip(self))]
    pub async fn mint(&self) -> Result<NftRecord> {
        let started = chrono::Utc::now();
        let request = {
            let mut state = write(&self.state);
            // Refusals never overwrite a running `Minting` or a finished `Minted` status
            let refusal = if state.is_minting() {
                Some((
                    DevScoreError::Precondition("a mint is already in progress".to_string()),
                    MsgCategory::ErrorMintFailed,
                    vec![("reason", "a mint is already in progress".to_string())],
                    false,
                ))
            } else if let Some(nft) = &state.nft {
                Some((
                    DevScoreError::Precondition(format!(
                        "token {} was already minted in this session",
                        nft.token_id()
                    )),
                    MsgCategory::ErrorAlreadyMinted,
                    vec![("token_id", nft.token_id().to_string())],
                    false,
                ))
            } else if state.score == 0 {
                Some((
                    DevScoreError::Precondition("score is zero, fetch activity first".to_string()),
                    MsgCategory::ErrorNoScore,
                    vec![],
                    true,
                ))
            } else {
                None
            };

            if let Some((error, msg, args, record_error)) = refusal {
                if record_error {
                    state.mint = MintStatus::Error(error.clone());
                }
                drop(state);

                debug!("Mint refused: {error}");
                self.context.notify(msg, args);
                self.context
                    .prometheus
                    .record(Operation::Mint, Outcome::Rejected, started);
                return Err(error);
            }

            state.mint = MintStatus::Minting;
            MintRequest {
                wallet_address: state.wallet_address.clone(),
                score: state.score,
                activity: state.activity,
            }
        };

        self.context.prometheus.add_backend_request();
        let result = self.context.minter.mint(&request).await;

        let mut state = write(&self.state);
        match result {
            Ok(receipt) => {
                let nft = NftRecord::new(
                    receipt.token_id,
                    chrono::Utc::now(),
                    request.score,
                    receipt.transaction_hash,
                );
                state.nft = Some(nft.clone());
                state.has_minted = true;
                state.mint = MintStatus::Minted;
                drop(state);

                info!("Minted DevScore NFT {} for score {}", nft.token_id(), nft.score());
                self.context.notify(
                    MsgCategory::NftMinted,
                    vec![("token_id", nft.token_id().to_string())],
                );
                self.context
                    .prometheus
                    .record(Operation::Mint, Outcome::Success, started);
                Ok(nft)
            }
            Err(e) => {
                let error = DevScoreError::network(e);
                state.mint = MintStatus::Error(error.clone());
                drop(state);

                error!("Failed to mint NFT: {error}");
                self.context.notify_error(MsgCategory::ErrorMintFailed, &error);
                self.context
                    .prometheus
                    .record(Operation::Mint, Outcome::Failure, started);
                Err(error)
            }
        }
    }

    fn reject_load(
        &self,
        operation: Operation,
        error: DevScoreError,
        started: chrono::DateTime<chrono::Utc>,
    ) -> DevScoreError {
        write(&self.state).load = LoadStatus::Error(error.clone());
        debug!("{operation:?} rejected: {error}");
        self.context
            .notify(MsgCategory::ErrorMissingIdentifier, vec![]);
        self.context
            .prometheus
            .record(operation, Outcome::Rejected, started);
        error
    }

    // Writes a finished fetch/sync into the state unless a newer one was issued.
    fn apply(
        &self,
        operation: Operation,
        ticket: crate::guard::Ticket,
        result: anyhow::Result<ActivityUpdate>,
        started: chrono::DateTime<chrono::Utc>,
    ) -> Result<Update<Activity>> {
        let mut state = write(&self.state);
        if !self.activity_generation.is_current(ticket) {
            drop(state);
            debug!("{operation:?} response was superseded by a newer request. Dropping it");
            self.context
                .prometheus
                .record(operation, Outcome::Superseded, started);
            return Ok(Update::Superseded);
        }

        match result {
            Ok(update) => {
                state.activity = update.activity;
                state.score = calculate_score(&update.activity);
                state.insights = update.insights;
                if update.github_username.is_some() {
                    state.github_username = update.github_username;
                }
                if update.wallet_address.is_some() {
                    state.wallet_address = update.wallet_address;
                }
                state.load = LoadStatus::Ready;
                drop(state);

                self.context
                    .prometheus
                    .record(operation, Outcome::Success, started);
                Ok(Update::Applied(update.activity))
            }
            Err(e) => {
                let error = DevScoreError::network(e);
                state.load = LoadStatus::Error(error.clone());
                drop(state);

                error!("{operation:?} failed: {error}");
                self.context.notify_error(MsgCategory::ErrorSyncFailed, &error);
                self.context
                    .prometheus
                    .record(operation, Outcome::Failure, started);
                Err(error)
            }
        }
    }
}
