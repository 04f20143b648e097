//! Wallet session capability and the software-signer implementation.
//!
//! Session state is owned exclusively by the session object; every consumer
//! reads it through [`SessionSnapshot`] and requests mutations only through
//! the trait's operations. The session is injected (`Arc<dyn WalletSession>`)
//! rather than looked up globally, so tests can substitute a fake.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;

use crate::config::Config;
use crate::error::{PayError, Result};

/// Read-only projection of session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub connected: bool,
    pub connecting: bool,
    pub address: Option<Pubkey>,
}

impl SessionSnapshot {
    /// Snapshot of a session that has never connected.
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            connecting: false,
            address: None,
        }
    }
}

/// The wallet session collaborator: connection lifecycle plus
/// sign-and-submit. Signature construction details live behind this trait.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Current session state.
    fn snapshot(&self) -> SessionSnapshot;

    /// Establish a session. Fails without changing `connected` if the
    /// endpoint is unreachable or the user dismisses the prompt.
    async fn connect(&self) -> Result<()>;

    /// End the session immediately.
    fn disconnect(&self);

    /// Build, sign, and submit a transaction carrying `instructions`.
    /// Returns `None` when the collaborator reports no signature.
    async fn sign_and_send(&self, instructions: Vec<Instruction>) -> Result<Option<Signature>>;
}

/// Decision for a view that requires an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Session state is still resolving; render nothing protected.
    Pending,
    /// Resolved to no session; redirect to the login entry point.
    Login,
    /// Session active with a wallet address; render protected content.
    Allow,
}

/// Gate a protected view on the current session state.
///
/// Evaluated before protected content renders, on every state change, so a
/// disconnected user can never observe protected content even momentarily.
#[must_use]
pub fn gate(snapshot: &SessionSnapshot) -> Gate {
    if snapshot.connecting {
        return Gate::Pending;
    }
    if snapshot.connected && snapshot.address.is_some() {
        return Gate::Allow;
    }
    Gate::Login
}

/// Session backed by a local ed25519 keypair.
///
/// Stands in for the passkey smart-wallet collaborator on devnet: same
/// surface, but signing happens with a software key over the shared RPC
/// client instead of a WebAuthn ceremony.
pub struct KeypairSession {
    keypair: Keypair,
    client: Arc<RpcClient>,
    connected: AtomicBool,
    connecting: AtomicBool,
}

impl KeypairSession {
    #[must_use]
    pub fn new(keypair: Keypair, client: Arc<RpcClient>) -> Self {
        Self {
            keypair,
            client,
            connected: AtomicBool::new(false),
            connecting: AtomicBool::new(false),
        }
    }

    /// Build a session from configuration: load the keypair file when one is
    /// configured, otherwise generate an ephemeral key for this run.
    #[must_use]
    pub fn from_config(config: &Config, client: Arc<RpcClient>) -> Self {
        let keypair = match &config.keypair_path {
            Some(path) => match load_keypair(path) {
                Ok(kp) => kp,
                Err(e) => {
                    tracing::warn!("{e}; falling back to an ephemeral keypair");
                    Keypair::new()
                }
            },
            None => Keypair::new(),
        };
        Self::new(keypair, client)
    }

    #[must_use]
    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

fn load_keypair(path: &Path) -> Result<Keypair> {
    read_keypair_file(path).map_err(|e| {
        PayError::Config(format!("Failed to read keypair {}: {e}", path.display()))
    })
}

#[async_trait]
impl WalletSession for KeypairSession {
    fn snapshot(&self) -> SessionSnapshot {
        let connected = self.connected.load(Ordering::SeqCst);
        SessionSnapshot {
            connected,
            connecting: self.connecting.load(Ordering::SeqCst),
            address: connected.then(|| self.keypair.pubkey()),
        }
    }

    async fn connect(&self) -> Result<()> {
        self.connecting.store(true, Ordering::SeqCst);
        // Prove the endpoint is reachable before reporting a live session.
        let result = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| PayError::Network(format!("Failed to reach RPC endpoint: {e}")));
        self.connecting.store(false, Ordering::SeqCst);
        result?;
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn sign_and_send(&self, instructions: Vec<Instruction>) -> Result<Option<Signature>> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(PayError::NotConnected);
        }
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| PayError::Network(format!("Failed to fetch blockhash: {e}")))?;
        let transaction = Transaction::new_signed_with_payer(
            &instructions,
            Some(&self.keypair.pubkey()),
            &[&self.keypair],
            blockhash,
        );
        let signature = self
            .client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| PayError::Signing(e.to_string()))?;
        Ok(Some(signature))
    }
}
