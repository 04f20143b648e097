//! Read-only chain access: balance queries and token-account derivation.

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

use crate::config::Config;
use crate::error::{PayError, Result};
use crate::token::LAMPORTS_PER_SOL;

/// Associated token account program.
const ATA_PROGRAM_ID: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Marker the RPC node puts in its error when a token account does not exist.
const ACCOUNT_NOT_FOUND_MARKER: &str = "could not find account";

/// Last-fetched balance snapshot, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Balances {
    pub sol: f64,
    pub usdc: f64,
}

/// Balance queries against the chain. Implemented over RPC in production and
/// by fakes in tests.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native balance of `owner` in lamports.
    async fn native_balance(&self, owner: &Pubkey) -> Result<u64>;

    /// Token balance of `owner` for `mint` in display units, or `None` when
    /// the owner has no token account for that mint (never received it).
    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<Option<f64>>;
}

/// Derive the associated token account for `owner` and `mint`.
/// Deterministic; the account is never stored in form state.
#[must_use]
pub fn derive_token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    let (ata, _) = Pubkey::find_program_address(
        &[owner.as_ref(), spl_token::id().as_ref(), mint.as_ref()],
        &ATA_PROGRAM_ID,
    );
    ata
}

/// Convert lamports to a display SOL amount.
#[must_use]
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// [`ChainReader`] over a shared nonblocking RPC client.
///
/// The client is created once and reused across every poll; the session
/// signer shares the same instance.
pub struct RpcChainReader {
    client: Arc<RpcClient>,
}

impl RpcChainReader {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(
            config.rpc_url.clone(),
            CommitmentConfig::confirmed(),
        ));
        Self { client }
    }

    #[must_use]
    pub fn with_client(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    /// The shared RPC client, for collaborators that submit transactions.
    #[must_use]
    pub fn client(&self) -> Arc<RpcClient> {
        Arc::clone(&self.client)
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn native_balance(&self, owner: &Pubkey) -> Result<u64> {
        self.client
            .get_balance(owner)
            .await
            .map_err(|e| PayError::Network(format!("Failed to fetch SOL balance: {e}")))
    }

    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<Option<f64>> {
        let token_account = derive_token_account(owner, mint);
        match self.client.get_token_account_balance(&token_account).await {
            Ok(balance) => Ok(Some(balance.ui_amount.unwrap_or(0.0))),
            Err(e) if e.to_string().contains(ACCOUNT_NOT_FOUND_MARKER) => Ok(None),
            Err(e) => Err(PayError::Network(format!(
                "Failed to fetch token balance: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::signature::{Keypair, Signer};

    use super::*;
    use crate::config::DEVNET_USDC_MINT;

    #[test]
    fn token_account_derivation_is_deterministic() {
        let owner = Keypair::new().pubkey();
        let a = derive_token_account(&owner, &DEVNET_USDC_MINT);
        let b = derive_token_account(&owner, &DEVNET_USDC_MINT);
        assert_eq!(a, b);
        assert_ne!(a, owner);
    }

    #[test]
    fn distinct_owners_get_distinct_token_accounts() {
        let a = derive_token_account(&Keypair::new().pubkey(), &DEVNET_USDC_MINT);
        let b = derive_token_account(&Keypair::new().pubkey(), &DEVNET_USDC_MINT);
        assert_ne!(a, b);
    }

    #[test]
    fn lamports_convert_to_sol() {
        assert_eq!(lamports_to_sol(1_000_000_000), 1.0);
        assert_eq!(lamports_to_sol(100_000_000), 0.1);
        assert_eq!(lamports_to_sol(0), 0.0);
    }
}
