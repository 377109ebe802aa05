//! Identity provider session, passed explicitly to whatever needs it.
//!
//! The provider is a hosted sign-in service; this crate only reads the
//! session it produces and the external accounts linked to it.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::GithubHandle;
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{info, instrument};

use crate::guard::{read, write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountProvider {
    Github,
    Discord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAccount {
    pub provider: AccountProvider,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub external_accounts: Vec<ExternalAccount>,
}

impl Session {
    pub fn account(&self, provider: AccountProvider) -> Option<&ExternalAccount> {
        self.external_accounts
            .iter()
            .find(|account| account.provider == provider)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("no {0} account is linked to this session")]
    AccountNotLinked(AccountProvider),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `Ok(None)` means the provider answered and nobody is signed in.
    async fn session(&self) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

#[derive(Clone)]
pub struct AuthContext {
    provider: Arc<dyn AuthProvider>,
}

impl AuthContext {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn current_session(&self) -> Result<Session, AuthError> {
        self.provider.session().await?.ok_or(AuthError::NotSignedIn)
    }

    pub async fn is_signed_in(&self) -> Result<bool, AuthError> {
        Ok(self.provider.session().await?.is_some())
    }

    pub async fn username(&self, provider: AccountProvider) -> Result<String, AuthError> {
        let session = self.current_session().await?;
        session
            .account(provider)
            .map(|account| account.username.clone())
            .ok_or(AuthError::AccountNotLinked(provider))
    }

    pub async fn github_username(&self) -> Result<GithubHandle, AuthError> {
        self.username(AccountProvider::Github).await
    }

    pub async fn discord_username(&self) -> Result<String, AuthError> {
        self.username(AccountProvider::Discord).await
    }

    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        info!("Signed out");
        Ok(())
    }
}

/// Session taken from configuration instead of an interactive sign-in.
#[derive(Debug, Default)]
pub struct StaticAuthProvider {
    session: RwLock<Option<Session>>,
}

impl StaticAuthProvider {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }

    /// Signed in only when at least one account is configured.
    pub fn from_accounts(github: Option<String>, discord: Option<String>) -> Self {
        let external_accounts: Vec<_> = [
            (AccountProvider::Github, github),
            (AccountProvider::Discord, discord),
        ]
        .into_iter()
        .filter_map(|(provider, username)| {
            let username = username?.trim().to_string();
            (!username.is_empty()).then_some(ExternalAccount { provider, username })
        })
        .collect();

        if external_accounts.is_empty() {
            return Self::new(None);
        }

        let user_id = external_accounts
            .iter()
            .map(|account| format!("{}:{}", account.provider, account.username))
            .collect::<Vec<_>>()
            .join("+");

        Self::new(Some(Session {
            user_id,
            external_accounts,
        }))
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn session(&self) -> Result<Option<Session>, AuthError> {
        Ok(read(&self.session).clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *write(&self.session) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(github: Option<&str>, discord: Option<&str>) -> AuthContext {
        AuthContext::new(Arc::new(StaticAuthProvider::from_accounts(
            github.map(Into::into),
            discord.map(Into::into),
        )))
    }

    #[tokio::test]
    async fn linked_accounts() {
        let auth = context(Some("octocat"), Some("octo#1234"));

        assert_eq!(auth.github_username().await.unwrap(), "octocat");
        assert_eq!(auth.discord_username().await.unwrap(), "octo#1234");
        assert_eq!(
            auth.current_session().await.unwrap().user_id,
            "github:octocat+discord:octo#1234"
        );
    }

    #[tokio::test]
    async fn missing_link_is_typed() {
        let auth = context(Some("octocat"), None);

        assert_eq!(
            auth.discord_username().await,
            Err(AuthError::AccountNotLinked(AccountProvider::Discord))
        );
    }

    #[tokio::test]
    async fn no_accounts_means_signed_out() {
        let auth = context(None, Some("   "));

        assert!(!auth.is_signed_in().await.unwrap());
        assert_eq!(auth.github_username().await, Err(AuthError::NotSignedIn));
    }

    #[tokio::test]
    async fn sign_out_clears_session() {
        let auth = context(Some("octocat"), None);
        auth.sign_out().await.unwrap();

        assert_eq!(auth.current_session().await, Err(AuthError::NotSignedIn));
    }

    #[test]
    fn provider_names() {
        assert_eq!(AccountProvider::Github.to_string(), "github");
        assert_eq!("discord".parse::<AccountProvider>(), Ok(AccountProvider::Discord));
    }
}
