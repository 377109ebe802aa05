use std::sync::RwLock;

use shared::{GithubHandle, WalletAddress};
use tracing::{debug, error, info, instrument};

use crate::{
    api::prometheus::{Operation, Outcome},
    error::{DevScoreError, Result},
    guard::{read, write, Generation, Update},
    messages::MsgCategory,
    Context,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GithubLinkState {
    pub connected: bool,
    pub username: Option<GithubHandle>,
    pub loading: bool,
    pub error: Option<DevScoreError>,
}

/// GitHub account linked to a wallet on the backend.
pub struct GithubLink {
    context: Context,
    state: RwLock<GithubLinkState>,
    generation: Generation,
}

impl GithubLink {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            state: Default::default(),
            generation: Default::default(),
        }
    }

    pub fn snapshot(&self) -> GithubLinkState {
        read(&self.state).clone()
    }

    /// Asks the backend whether `wallet` already has an account. Failures are
    /// only logged: a missing link is not something the user has to act on.
    #[instrument(skip(self, wallet), fields(wallet = wallet.short(12)))]
    pub async fn check(&self, wallet: &WalletAddress) -> Result<Update<Option<GithubHandle>>> {
        let started = chrono::Utc::now();
        let ticket = self.generation.issue();

        self.context.prometheus.add_backend_request();
        let result = self.context.backend.check_github(wallet).await;

        let mut state = write(&self.state);
        if !self.generation.is_current(ticket) {
            drop(state);
            self.context
                .prometheus
                .record(Operation::CheckGithub, Outcome::Superseded, started);
            return Ok(Update::Superseded);
        }

        match result {
            Ok(response) => {
                if response.connected {
                    state.connected = true;
                    state.username = response.github_username.clone();
                }
                drop(state);

                debug!("GitHub link status: {:?}", response);
                self.context
                    .prometheus
                    .record(Operation::CheckGithub, Outcome::Success, started);
                Ok(Update::Applied(
                    response.github_username.filter(|_| response.connected),
                ))
            }
            Err(e) => {
                drop(state);
                let error = DevScoreError::network(e);
                error!("Error checking GitHub connection: {error}");
                self.context
                    .prometheus
                    .record(Operation::CheckGithub, Outcome::Failure, started);
                Err(error)
            }
        }
    }

    #[instrument(skip(self, wallet), fields(wallet = wallet.short(12)))]
    pub async fn connect(
        &self,
        wallet: &WalletAddress,
        username: &str,
    ) -> Result<Update<GithubHandle>> {
        let started = chrono::Utc::now();
        let username = username.trim();
        if username.is_empty() {
            let error = DevScoreError::Validation("a GitHub username is required".to_string());
            write(&self.state).error = Some(error.clone());
            self.context
                .notify(MsgCategory::ErrorMissingGithubUsername, vec![]);
            self.context
                .prometheus
                .record(Operation::ConnectGithub, Outcome::Rejected, started);
            return Err(error);
        }

        let ticket = self.generation.issue();
        {
            let mut state = write(&self.state);
            state.loading = true;
            state.error = None;
        }

        self.context.prometheus.add_backend_request();
        let result = self.context.backend.connect_github(wallet, username).await;

        let mut state = write(&self.state);
        if !self.generation.is_current(ticket) {
            drop(state);
            self.context
                .prometheus
                .record(Operation::ConnectGithub, Outcome::Superseded, started);
            return Ok(Update::Superseded);
        }

        match result {
            Ok(_) => {
                *state = GithubLinkState {
                    connected: true,
                    username: Some(username.to_string()),
                    loading: false,
                    error: None,
                };
                drop(state);

                info!("GitHub account {username} linked");
                self.context.notify(
                    MsgCategory::GithubConnected,
                    vec![("github_username", username.to_string())],
                );
                self.context
                    .prometheus
                    .record(Operation::ConnectGithub, Outcome::Success, started);
                Ok(Update::Applied(username.to_string()))
            }
            Err(e) => {
                let error = DevScoreError::network(e);
                state.loading = false;
                state.error = Some(error.clone());
                drop(state);

                error!("Failed to connect GitHub account {username}: {error}");
                self.context
                    .notify_error(MsgCategory::ErrorGithubConnectFailed, &error);
                self.context
                    .prometheus
                    .record(Operation::ConnectGithub, Outcome::Failure, started);
                Err(error)
            }
        }
    }

    /// Forgets the link locally; the backend keeps its record.
    pub fn disconnect(&self) {
        self.generation.invalidate();
        *write(&self.state) = GithubLinkState::default();
        self.context.notify(MsgCategory::GithubDisconnected, vec![]);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::DevScoreBackend;
    use crate::testing::{context_with_backend, FakeBackend, RecordingNotifier};

    fn link_with(backend: FakeBackend) -> (GithubLink, Arc<FakeBackend>, Arc<RecordingNotifier>) {
        let backend = Arc::new(backend);
        let notifier = Arc::new(RecordingNotifier::default());
        let link = GithubLink::new(context_with_backend(notifier.clone(), backend.clone()));
        (link, backend, notifier)
    }

    #[tokio::test]
    async fn check_picks_up_existing_link() {
        let (link, _, notifier) = link_with(FakeBackend::default().with_link("QUBICAAA", "octocat"));

        let update = link.check(&"QUBICAAA".into()).await.unwrap();
        assert_eq!(update, Update::Applied(Some("octocat".to_string())));
        assert!(link.snapshot().connected);
        assert!(notifier.toasts().is_empty());
    }

    #[tokio::test]
    async fn check_without_link_changes_nothing() {
        let (link, _, _) = link_with(FakeBackend::default());

        let update = link.check(&"QUBICAAA".into()).await.unwrap();
        assert_eq!(update, Update::Applied(None));
        assert_eq!(link.snapshot(), GithubLinkState::default());
    }

    #[tokio::test]
    async fn blank_username_is_rejected() {
        let (link, backend, notifier) = link_with(FakeBackend::default());

        let error = link.connect(&"QUBICAAA".into(), "  ").await.unwrap_err();
        assert!(matches!(error, DevScoreError::Validation(_)));
        assert_eq!(backend.calls(), 0);
        assert_eq!(link.snapshot().error, Some(error));
        assert_eq!(notifier.categories(), vec![MsgCategory::ErrorMissingGithubUsername]);
    }

    #[tokio::test]
    async fn connect_then_disconnect() {
        let (link, backend, notifier) = link_with(FakeBackend::default());
        let wallet: WalletAddress = "QUBICAAA".into();

        link.connect(&wallet, " octocat ").await.unwrap();
        assert_eq!(
            link.snapshot(),
            GithubLinkState {
                connected: true,
                username: Some("octocat".to_string()),
                loading: false,
                error: None,
            }
        );
        assert_eq!(
            backend.check_github(&wallet).await.unwrap().github_username.as_deref(),
            Some("octocat")
        );

        link.disconnect();
        assert_eq!(link.snapshot(), GithubLinkState::default());
        assert_eq!(
            notifier.categories(),
            vec![MsgCategory::GithubConnected, MsgCategory::GithubDisconnected]
        );
    }

    #[tokio::test]
    async fn backend_detail_is_surfaced() {
        let (link, _, notifier) = link_with(FakeBackend::default());

        let error = link.connect(&"QUBICAAA".into(), "ghost").await.unwrap_err();
        assert_eq!(error, DevScoreError::Network("GitHub user 'ghost' not found".to_string()));

        let state = link.snapshot();
        assert!(!state.connected);
        assert!(!state.loading);
        assert_eq!(notifier.toasts()[0].description, "GitHub user 'ghost' not found");
    }

    #[tokio::test]
    async fn failed_check_is_only_logged() {
        let (link, backend, notifier) = link_with(FakeBackend::default());
        backend.fail_checks();

        let error = link.check(&"QUBICAAA".into()).await.unwrap_err();
        assert!(matches!(error, DevScoreError::Network(_)));
        assert_eq!(link.snapshot(), GithubLinkState::default());
        assert!(notifier.toasts().is_empty());
    }
}
