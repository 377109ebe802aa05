use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use serde::Deserialize;
use shared::{backend::BackendClient, TokenId, WalletAddress};
use strum::Display;

use crate::{
    api::{prometheus::PrometheusClient, DevScoreBackend},
    auth::{AuthContext, StaticAuthProvider},
    messages::MessageLoader,
    minting::{BackendMinter, FixedMinter, MintingService, SimulatedMinter},
    notify::Notifier,
    wallet::{FixedWallet, SimulatedWallet, WalletProvider},
    Context,
};

pub const ENV_PREFIX: &str = "DEVSCORE_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WalletKind {
    #[default]
    Simulated,
    Fixed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MinterKind {
    #[default]
    Simulated,
    Backend,
    Fixed,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_delay_ms() -> u64 {
    1500
}

/// Settings read from `DEVSCORE_*` variables (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct Env {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub wallet_provider: WalletKind,
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub minter: MinterKind,
    pub token_id: Option<TokenId>,
    #[serde(default = "default_delay_ms")]
    pub simulated_delay_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub message_file: Option<PathBuf>,
    pub github_username: Option<String>,
    pub discord_username: Option<String>,
}

impl Env {
    pub fn from_env() -> anyhow::Result<Self> {
        envy::prefixed(ENV_PREFIX)
            .from_env()
            .context("Failed to read DEVSCORE_* settings")
    }

    fn delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    pub fn backend(&self) -> anyhow::Result<BackendClient> {
        BackendClient::new(
            &self.api_url,
            self.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn wallet_provider(&self) -> anyhow::Result<Arc<dyn WalletProvider>> {
        Ok(match self.wallet_provider {
            WalletKind::Simulated => Arc::new(SimulatedWallet::new(self.delay())),
            WalletKind::Fixed => {
                let address = self
                    .wallet_address
                    .as_deref()
                    .map(str::trim)
                    .filter(|address| !address.is_empty())
                    .context("DEVSCORE_WALLET_ADDRESS is required for the fixed wallet")?;
                Arc::new(FixedWallet::new(WalletAddress::new(address)))
            }
        })
    }

    pub fn minter(&self, backend: Arc<dyn DevScoreBackend>) -> Arc<dyn MintingService> {
        match self.minter {
            MinterKind::Simulated => Arc::new(SimulatedMinter::new(self.delay())),
            MinterKind::Backend => Arc::new(BackendMinter::new(backend)),
            MinterKind::Fixed => Arc::new(FixedMinter::new(
                self.token_id.clone().unwrap_or_else(|| "DEVSCORE".to_string()),
            )),
        }
    }

    pub fn messages(&self) -> anyhow::Result<MessageLoader> {
        match &self.message_file {
            Some(path) => MessageLoader::load_from_file(path),
            None => MessageLoader::builtin(),
        }
    }

    pub fn auth(&self) -> AuthContext {
        AuthContext::new(Arc::new(StaticAuthProvider::from_accounts(
            self.github_username.clone(),
            self.discord_username.clone(),
        )))
    }

    pub fn context(
        &self,
        notifier: Arc<dyn Notifier>,
        prometheus: Arc<PrometheusClient>,
    ) -> anyhow::Result<Context> {
        let backend: Arc<dyn DevScoreBackend> = Arc::new(self.backend()?);
        Ok(Context {
            minter: self.minter(backend.clone()),
            backend,
            wallet: self.wallet_provider()?,
            auth: self.auth(),
            messages: Arc::new(self.messages()?),
            notifier,
            prometheus,
        })
    }
}
