use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use shared::WalletAddress;
use tracing::{debug, instrument};

const ADDRESS_PREFIX: &str = "QUBIC";
const ADDRESS_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const ADDRESS_BODY_LEN: usize = 56;

#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn connect(&self) -> anyhow::Result<WalletAddress>;
}

/// Stand-in for a testnet wallet: waits, then makes up a placeholder address.
#[derive(Debug, Clone)]
pub struct SimulatedWallet {
    delay: Duration,
}

impl SimulatedWallet {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

pub fn placeholder_address() -> WalletAddress {
    let mut rng = rand::thread_rng();
    let body: String = (0..ADDRESS_BODY_LEN)
        .map(|_| ADDRESS_ALPHABET[rng.gen_range(0..ADDRESS_ALPHABET.len())] as char)
        .collect();
    WalletAddress::new(format!("{ADDRESS_PREFIX}{body}"))
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    #[instrument(skip(self))]
    async fn connect(&self) -> anyhow::Result<WalletAddress> {
        tokio::time::sleep(self.delay).await;
        let address = placeholder_address();
        debug!("Simulated wallet {}", address.short(12));
        Ok(address)
    }
}

#[derive(Debug, Clone)]
pub struct FixedWallet {
    address: WalletAddress,
}

impl FixedWallet {
    pub fn new(address: WalletAddress) -> Self {
        Self { address }
    }
}

#[async_trait]
impl WalletProvider for FixedWallet {
    async fn connect(&self) -> anyhow::Result<WalletAddress> {
        Ok(self.address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_format() {
        let address = placeholder_address();
        let body = address
            .as_str()
            .strip_prefix(ADDRESS_PREFIX)
            .expect("prefixed address");

        assert_eq!(body.len(), ADDRESS_BODY_LEN);
        assert!(body.bytes().all(|b| ADDRESS_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn fixed_wallet_is_deterministic() {
        let wallet = FixedWallet::new("QUBICFIXED".into());

        assert_eq!(wallet.connect().await.unwrap().as_str(), "QUBICFIXED");
        assert_eq!(wallet.connect().await.unwrap().as_str(), "QUBICFIXED");
    }

    #[tokio::test]
    async fn simulated_wallet_connects() {
        let wallet = SimulatedWallet::new(Duration::from_millis(1));
        let address = wallet.connect().await.unwrap();

        assert!(address.as_str().starts_with(ADDRESS_PREFIX));
    }
}
