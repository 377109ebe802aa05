use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::error;

use crate::notify::{Toast, ToastVariant};

const BUILTIN_MESSAGES: &str = include_str!("../Messages.toml");

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MsgCategory {
    ActivitySynced,
    WalletSynced,
    NftMinted,
    WalletConnected,
    WalletDisconnected,
    GithubConnected,
    GithubDisconnected,

    ErrorSyncFailed,
    ErrorMissingIdentifier,
    ErrorNoScore,
    ErrorAlreadyMinted,
    ErrorMintFailed,
    ErrorWalletConnectionFailed,
    ErrorMissingGithubUsername,
    ErrorGithubConnectFailed,
}

impl MsgCategory {
    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ErrorSyncFailed
                | Self::ErrorMissingIdentifier
                | Self::ErrorNoScore
                | Self::ErrorAlreadyMinted
                | Self::ErrorMintFailed
                | Self::ErrorWalletConnectionFailed
                | Self::ErrorMissingGithubUsername
                | Self::ErrorGithubConnectFailed
        )
    }
}

impl std::fmt::Display for MsgCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Messages {
    title: String,
    message: Vec<String>,
    variables: HashSet<String>,
}

impl Messages {
    pub fn new(title: String, message: Vec<String>, variables: HashSet<String>) -> Self {
        Self {
            title,
            message,
            variables,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn format(&self, values: &HashMap<&'static str, String>) -> anyhow::Result<String> {
        let mut formatted_message = self
            .message
            .choose(&mut thread_rng())
            .ok_or_else(|| anyhow::anyhow!("Failed to choose randomly an message"))?
            .clone();
        for key in self.variables.iter() {
            if let Some(value) = values.get(key.as_str()) {
                formatted_message = formatted_message.replace(&format!("{{{}}}", key), value);
            } else {
                error!(
                    "The message expects a variable: {}, but it wasn't provided",
                    key
                );
            }
        }
        Ok(formatted_message)
    }

    fn partial_format(&mut self, values: &HashMap<&'static str, String>) {
        for message in self.message.iter_mut().chain(std::iter::once(&mut self.title)) {
            for (key, value) in values {
                *message = message.replace(&format!("{{{key}}}"), value);
                self.variables.remove(*key);
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageLoader {
    pub link: String,
    pub network: String,

    pub activity_synced: Messages,
    pub wallet_synced: Messages,
    pub nft_minted: Messages,
    pub wallet_connected: Messages,
    pub wallet_disconnected: Messages,
    pub github_connected: Messages,
    pub github_disconnected: Messages,

    // Errors
    pub error_sync_failed: Messages,
    pub error_missing_identifier: Messages,
    pub error_no_score: Messages,
    pub error_already_minted: Messages,
    pub error_mint_failed: Messages,
    pub error_wallet_connection_failed: Messages,
    pub error_missing_github_username: Messages,
    pub error_github_connect_failed: Messages,
}

impl MessageLoader {
    pub fn load_from_file(file_path: &Path) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(file_path)?;
        Self::load_from_str(&file_content)
    }

    /// Catalogue shipped inside the binary.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::load_from_str(BUILTIN_MESSAGES)
    }

    pub fn load_from_str(content: &str) -> anyhow::Result<Self> {
        let mut result: Self = toml::from_str(content)?;
        result.postprocess_messages();
        tracing::trace!("Loaded messages: {:#?}", result);
        Ok(result)
    }

    fn postprocess_messages(&mut self) {
        let values = vec![
            ("link", self.link.clone()),
            ("network", self.network.clone()),
        ]
        .into_iter()
        .collect::<HashMap<_, _>>();

        let array_of_messages = vec![
            &mut self.activity_synced,
            &mut self.wallet_synced,
            &mut self.nft_minted,
            &mut self.wallet_connected,
            &mut self.wallet_disconnected,
            &mut self.github_connected,
            &mut self.github_disconnected,
            &mut self.error_sync_failed,
            &mut self.error_missing_identifier,
            &mut self.error_no_score,
            &mut self.error_already_minted,
            &mut self.error_mint_failed,
            &mut self.error_wallet_connection_failed,
            &mut self.error_missing_github_username,
            &mut self.error_github_connect_failed,
        ];
        for message in array_of_messages {
            message.partial_format(&values);
        }
    }

    pub fn get_message(&self, category: MsgCategory) -> &Messages {
        match category {
            MsgCategory::ActivitySynced => &self.activity_synced,
            MsgCategory::WalletSynced => &self.wallet_synced,
            MsgCategory::NftMinted => &self.nft_minted,
            MsgCategory::WalletConnected => &self.wallet_connected,
            MsgCategory::WalletDisconnected => &self.wallet_disconnected,
            MsgCategory::GithubConnected => &self.github_connected,
            MsgCategory::GithubDisconnected => &self.github_disconnected,
            MsgCategory::ErrorSyncFailed => &self.error_sync_failed,
            MsgCategory::ErrorMissingIdentifier => &self.error_missing_identifier,
            MsgCategory::ErrorNoScore => &self.error_no_score,
            MsgCategory::ErrorAlreadyMinted => &self.error_already_minted,
            MsgCategory::ErrorMintFailed => &self.error_mint_failed,
            MsgCategory::ErrorWalletConnectionFailed => &self.error_wallet_connection_failed,
            MsgCategory::ErrorMissingGithubUsername => &self.error_missing_github_username,
            MsgCategory::ErrorGithubConnectFailed => &self.error_github_connect_failed,
        }
    }

    pub fn toast(
        &self,
        category: MsgCategory,
        args: Vec<(&'static str, String)>,
    ) -> anyhow::Result<Toast> {
        let messages = self.get_message(category);
        let description = messages.format(&args.into_iter().collect())?;
        let variant = if category.is_error() {
            ToastVariant::Destructive
        } else {
            ToastVariant::Default
        };

        Ok(Toast {
            title: messages.title().to_string(),
            description,
            variant,
            category,
        })
    }
}
