use std::sync::Arc;

use tracing::error;

use crate::{
    api::{prometheus::PrometheusClient, DevScoreBackend},
    auth::AuthContext,
    messages::{MessageLoader, MsgCategory},
    minting::MintingService,
    notify::Notifier,
    wallet::WalletProvider,
};

/// Services injected into every state container.
#[derive(Clone)]
pub struct Context {
    pub backend: Arc<dyn DevScoreBackend>,
    pub minter: Arc<dyn MintingService>,
    pub wallet: Arc<dyn WalletProvider>,
    pub auth: AuthContext,
    pub messages: Arc<MessageLoader>,
    pub notifier: Arc<dyn Notifier>,
    pub prometheus: Arc<PrometheusClient>,
}

impl Context {
    pub fn notify(&self, msg: MsgCategory, args: Vec<(&'static str, String)>) {
        match self.messages.toast(msg, args) {
            Ok(toast) => self.notifier.notify(toast),
            Err(e) => error!("Failed to render message for category {msg}: {e}"),
        }
    }

    // Same as `notify` for now, kept apart so error toasts are easy to find
    pub fn notify_error(&self, msg: MsgCategory, reason: impl ToString) {
        self.notify(msg, vec![("reason", reason.to_string())]);
    }
}
