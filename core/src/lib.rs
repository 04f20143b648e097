//! Core logic for the Solana passkey payment wallet: the payment-form state
//! machine, recipient validation, balance polling, payment-request encoding,
//! and the session/chain capability interfaces the UI is built against.

pub mod address;
pub mod chain;
pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod paylink;
pub mod poller;
pub mod price;
pub mod session;
pub mod token;

pub use chain::{derive_token_account, Balances, ChainReader, RpcChainReader};
pub use config::Config;
pub use error::{PayError, Result};
pub use form::{PaymentForm, PaymentStatus, PreparedPayment};
pub use poller::{BalancePoller, PollerHandle, POLL_INTERVAL};
pub use session::{gate, Gate, KeypairSession, SessionSnapshot, WalletSession};
pub use token::Token;

pub use solana_sdk::instruction::Instruction;
pub use solana_sdk::pubkey::Pubkey;
pub use solana_sdk::signature::Signature;
