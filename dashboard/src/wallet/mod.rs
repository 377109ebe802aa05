use std::sync::RwLock;

use shared::WalletAddress;
use tracing::{debug, error, info, instrument};

use crate::{
    api::prometheus::{Operation, Outcome},
    error::{DevScoreError, Result},
    guard::{read, write, Generation, Update},
    messages::MsgCategory,
    Context,
};

mod provider;

pub use provider::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletState {
    pub is_connected: bool,
    pub address: Option<WalletAddress>,
    pub is_connecting: bool,
}

pub struct Wallet {
    context: Context,
    state: RwLock<WalletState>,
    generation: Generation,
}

impl Wallet {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            state: Default::default(),
            generation: Default::default(),
        }
    }

    pub fn snapshot(&self) -> WalletState {
        read(&self.state).clone()
    }

    pub fn address(&self) -> Option<WalletAddress> {
        read(&self.state).address.clone()
    }

    pub fn is_connected(&self) -> bool {
        read(&self.state).is_connected
    }

    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<Update<WalletAddress>> {
        let started = chrono::Utc::now();
        let ticket = self.generation.issue();
        write(&self.state).is_connecting = true;

        let result = self.context.wallet.connect().await;

        let mut state = write(&self.state);
        if !self.generation.is_current(ticket) {
            drop(state);
            debug!("Wallet connection was superseded or cancelled. Dropping the result");
            self.context
                .prometheus
                .record(Operation::ConnectWallet, Outcome::Superseded, started);
            return Ok(Update::Superseded);
        }

        match result {
            Ok(address) => {
                *state = WalletState {
                    is_connected: true,
                    address: Some(address.clone()),
                    is_connecting: false,
                };
                drop(state);

                info!("Wallet connected: {}", address.short(12));
                self.context.notify(MsgCategory::WalletConnected, vec![]);
                self.context
                    .prometheus
                    .record(Operation::ConnectWallet, Outcome::Success, started);
                Ok(Update::Applied(address))
            }
            Err(e) => {
                state.is_connecting = false;
                drop(state);

                let error = DevScoreError::wallet(e);
                error!("Failed to connect wallet: {error}");
                self.context
                    .notify_error(MsgCategory::ErrorWalletConnectionFailed, &error);
                self.context
                    .prometheus
                    .record(Operation::ConnectWallet, Outcome::Failure, started);
                Err(error)
            }
        }
    }

    /// Clears the wallet right away; a connection still in flight is dropped.
    #[instrument(skip(self))]
    pub fn disconnect(&self) {
        self.generation.invalidate();
        *write(&self.state) = WalletState::default();
        info!("Wallet disconnected");
        self.context.notify(MsgCategory::WalletDisconnected, vec![]);
    }
}
