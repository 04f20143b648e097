//! Periodic balance refresh while a session is connected.
//!
//! Polling is an owned resource: [`BalancePoller::start`] returns a handle
//! and dropping the handle cancels the underlying task, so no poll can ever
//! run against a disconnected session or an unmounted view.

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::chain::{lamports_to_sol, Balances, ChainReader};

/// Refresh cadence used by the payment view.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Handle to a running poller. Dropping it cancels the poll task.
pub struct PollerHandle {
    rx: watch::Receiver<Balances>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// A fresh receiver for balance updates. The first fetch after start is
    /// delivered as a change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Balances> {
        self.rx.clone()
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> Balances {
        *self.rx.borrow()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct BalancePoller;

impl BalancePoller {
    /// Start polling `owner`'s SOL and USDC balances every `interval`,
    /// beginning immediately.
    ///
    /// A missing token account reads as zero. Any other fetch failure leaves
    /// the previous value in place and is logged, never surfaced.
    #[must_use]
    pub fn start(
        reader: Arc<dyn ChainReader>,
        owner: Pubkey,
        usdc_mint: Pubkey,
        interval: Duration,
    ) -> PollerHandle {
        let (tx, rx) = watch::channel(Balances::default());
        let task = tokio::spawn(async move {
            let mut current = Balances::default();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;

                match reader.native_balance(&owner).await {
                    Ok(lamports) => current.sol = lamports_to_sol(lamports),
                    Err(e) => tracing::warn!("balance poll: SOL fetch failed: {e}"),
                }
                match reader.token_balance(&owner, &usdc_mint).await {
                    Ok(balance) => current.usdc = balance.unwrap_or(0.0),
                    Err(e) => tracing::warn!("balance poll: USDC fetch failed: {e}"),
                }

                if tx.send(current).is_err() {
                    break;
                }
            }
        });
        PollerHandle { rx, task }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use solana_sdk::signature::{Keypair, Signer};

    use super::*;
    use crate::config::DEVNET_USDC_MINT;
    use crate::error::{PayError, Result};

    struct FakeReader {
        fetches: AtomicUsize,
        lamports: u64,
        usdc: Option<f64>,
        fail: bool,
    }

    impl FakeReader {
        fn new(lamports: u64, usdc: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                lamports,
                usdc,
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                lamports: 0,
                usdc: None,
                fail: true,
            })
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChainReader for FakeReader {
        async fn native_balance(&self, _owner: &Pubkey) -> Result<u64> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PayError::Network("rpc down".to_string()));
            }
            Ok(self.lamports)
        }

        async fn token_balance(&self, _owner: &Pubkey, _mint: &Pubkey) -> Result<Option<f64>> {
            if self.fail {
                return Err(PayError::Network("rpc down".to_string()));
            }
            Ok(self.usdc)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_an_immediate_snapshot_then_ticks() {
        let reader = FakeReader::new(1_500_000_000, Some(2.5));
        let owner = Keypair::new().pubkey();
        let handle = BalancePoller::start(
            reader.clone(),
            owner,
            DEVNET_USDC_MINT,
            Duration::from_secs(10),
        );
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        let first = *rx.borrow_and_update();
        assert_eq!(first.sol, 1.5);
        assert_eq!(first.usdc, 2.5);
        assert_eq!(reader.fetch_count(), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        rx.changed().await.unwrap();
        assert_eq!(reader.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_token_account_reads_as_zero() {
        let reader = FakeReader::new(1_000_000_000, None);
        let owner = Keypair::new().pubkey();
        let handle = BalancePoller::start(reader, owner, DEVNET_USDC_MINT, Duration::from_secs(10));
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().usdc, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failures_keep_last_known_values() {
        let reader = FakeReader::failing();
        let owner = Keypair::new().pubkey();
        let handle = BalancePoller::start(
            reader.clone(),
            owner,
            DEVNET_USDC_MINT,
            Duration::from_secs(10),
        );
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        // Failure degrades silently to the previous (default) snapshot.
        assert_eq!(*rx.borrow_and_update(), Balances::default());
        assert!(reader.fetch_count() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_all_fetches() {
        let reader = FakeReader::new(1_000_000_000, Some(1.0));
        let owner = Keypair::new().pubkey();
        let handle = BalancePoller::start(
            reader.clone(),
            owner,
            DEVNET_USDC_MINT,
            Duration::from_secs(10),
        );
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        let fetched_while_live = reader.fetch_count();

        drop(handle);
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;

        assert_eq!(reader.fetch_count(), fetched_while_live);
        assert!(rx.changed().await.is_err());
    }
}
