//! Environment-supplied configuration.
//!
//! Everything here is read-only after startup: the RPC endpoint, the USDC
//! mint, and the passkey portal/paymaster URLs the session collaborator is
//! pointed at.

use std::path::PathBuf;
use std::str::FromStr;

use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

use crate::error::{PayError, Result};

/// Default RPC endpoint.
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// Devnet USDC mint.
pub const DEVNET_USDC_MINT: Pubkey = pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU");

/// Default passkey portal.
pub const DEFAULT_PORTAL_URL: &str = "https://portal.lazor.sh";

/// Cluster tag appended to explorer links.
pub const EXPLORER_CLUSTER: &str = "devnet";

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub usdc_mint: Pubkey,
    pub portal_url: String,
    pub paymaster_url: Option<String>,
    /// Optional solana-cli JSON keypair backing the software session signer.
    pub keypair_path: Option<PathBuf>,
}

impl Config {
    /// Read configuration from the environment, falling back to devnet
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let usdc_mint = match std::env::var("SOLPAY_USDC_MINT") {
            Ok(raw) => Pubkey::from_str(raw.trim())
                .map_err(|_| PayError::Config(format!("Invalid SOLPAY_USDC_MINT '{raw}'")))?,
            Err(_) => DEVNET_USDC_MINT,
        };

        Ok(Self {
            rpc_url: std::env::var("SOLPAY_RPC_URL").unwrap_or_else(|_| DEVNET_RPC_URL.to_string()),
            usdc_mint,
            portal_url: std::env::var("SOLPAY_PORTAL_URL")
                .unwrap_or_else(|_| DEFAULT_PORTAL_URL.to_string()),
            paymaster_url: std::env::var("SOLPAY_PAYMASTER_URL").ok(),
            keypair_path: std::env::var("SOLPAY_KEYPAIR_PATH").ok().map(PathBuf::from),
        })
    }

    /// Explorer link for an address on the configured cluster.
    #[must_use]
    pub fn explorer_address_url(&self, address: &str) -> String {
        format!("https://explorer.solana.com/address/{address}?cluster={EXPLORER_CLUSTER}")
    }

    /// Explorer link for a transaction signature on the configured cluster.
    #[must_use]
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!("https://explorer.solana.com/tx/{signature}?cluster={EXPLORER_CLUSTER}")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEVNET_RPC_URL.to_string(),
            usdc_mint: DEVNET_USDC_MINT,
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            paymaster_url: None,
            keypair_path: None,
        }
    }
}
