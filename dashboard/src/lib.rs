pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod messages;
pub mod minting;
pub mod notify;
pub mod state;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use context::Context;
pub use error::DevScoreError;
