use thiserror::Error;

/// Failures surfaced by the state containers.
///
/// Every variant is recovered where it happens: the container records it in
/// its state, sends a notification and hands it back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DevScoreError {
    /// Required input was missing; nothing was sent over the network.
    #[error("{0}")]
    Validation(String),

    /// Transport failure or non-2xx response from the backend.
    #[error("{0}")]
    Network(String),

    /// The operation is not allowed in the current state.
    #[error("{0}")]
    Precondition(String),

    #[error("wallet error: {0}")]
    Wallet(String),
}

impl DevScoreError {
    pub fn network(error: anyhow::Error) -> Self {
        // `{:#}` keeps the whole context chain on one line
        Self::Network(format!("{error:#}"))
    }

    pub fn wallet(error: anyhow::Error) -> Self {
        Self::Wallet(format!("{error:#}"))
    }
}

pub type Result<T, E = DevScoreError> = std::result::Result<T, E>;
