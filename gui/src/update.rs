use iced::widget::qr_code;
use iced::Task;

use solpay_core::chain::lamports_to_sol;
use solpay_core::poller::{BalancePoller, POLL_INTERVAL};
use solpay_core::price::fetch_sol_price_usd;
use solpay_core::{Balances, PaymentForm, PaymentStatus};

use crate::messages::Message;
use crate::App;

impl App {
    // -- Update --

    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // -- Session --
            Message::ConnectPressed => {
                self.connect_error = None;
                let session = self.session.clone();
                Task::perform(
                    async move { session.connect().await.map_err(|e| e.to_string()) },
                    Message::Connected,
                )
            }

            Message::Connected(result) => match result {
                Ok(()) => {
                    self.connect_error = None;
                    self.start_polling()
                }
                Err(e) => {
                    self.connect_error = Some(e);
                    Task::none()
                }
            },

            Message::DisconnectPressed => {
                self.session.disconnect();
                // Dropping the handle cancels the poll task; nothing may poll
                // against a disconnected session.
                self.poller = None;
                self.balances_rx = None;
                // The payment view unmounts with the session; its state is
                // not persisted.
                self.form = PaymentForm::new();
                self.qr_data = None;
                self.wallet_menu_open = false;
                self.status_message = None;
                Task::none()
            }

            // -- Payment form --
            Message::RecipientChanged(v) => {
                self.form.set_recipient(v);
                self.refresh_qr();
                Task::none()
            }
            Message::AmountChanged(v) => {
                self.form.set_amount(v);
                self.refresh_qr();
                Task::none()
            }
            Message::TokenSelected(token) => {
                self.form.set_token(token);
                self.refresh_qr();
                Task::none()
            }

            Message::ConfirmPay => {
                let snapshot = self.session.snapshot();
                let Some(prepared) = self.form.prepare(&snapshot, &self.config.usdc_mint) else {
                    return Task::none();
                };
                let session = self.session.clone();
                Task::perform(
                    async move {
                        session
                            .sign_and_send(vec![prepared.instruction])
                            .await
                            .map(|signature| signature.map(|s| s.to_string()))
                            .map_err(|e| e.to_string())
                    },
                    Message::PayCompleted,
                )
            }

            Message::PayCompleted(result) => {
                self.form.complete(result);
                if self.form.status() == PaymentStatus::Success {
                    return self.fetch_balances_task();
                }
                Task::none()
            }

            // -- Balances --
            Message::BalancesUpdated(Some(balances)) => {
                if self.poller.is_none() {
                    // Update raced a disconnect; the session view is gone.
                    return Task::none();
                }
                self.apply_balances(balances);
                // Mark this update seen so the next watcher waits for a fresh
                // one instead of re-observing it.
                if let Some(rx) = self.balances_rx.as_mut() {
                    let _ = rx.borrow_and_update();
                }
                self.watch_balances()
            }
            Message::BalancesUpdated(None) => Task::none(),

            Message::BalancesFetched(Some(balances)) => {
                if self.poller.is_some() {
                    self.apply_balances(balances);
                }
                Task::none()
            }
            Message::BalancesFetched(None) => Task::none(),

            Message::RefreshBalances => self.fetch_balances_task(),

            // -- Price --
            Message::PriceTick => self.fetch_price_task(),
            Message::PriceUpdated(Some(price)) => {
                self.sol_price = price;
                Task::none()
            }
            Message::PriceUpdated(None) => Task::none(),

            // -- Session menu --
            Message::ToggleWalletMenu => {
                self.wallet_menu_open = !self.wallet_menu_open;
                self.status_message = None;
                Task::none()
            }
            Message::CloseMenus => {
                self.wallet_menu_open = false;
                Task::none()
            }

            Message::CopyAddress => {
                if let Some(address) = self.session.snapshot().address {
                    self.copy_to_clipboard(address.to_string(), "Address copied");
                }
                Task::none()
            }

            Message::CopyRecipient => {
                let recipient = self.form.recipient().to_string();
                if !recipient.is_empty() {
                    self.copy_to_clipboard(recipient, "Recipient copied");
                }
                Task::none()
            }

            Message::OpenExplorerAddress => {
                if let Some(address) = self.session.snapshot().address {
                    let url = self.config.explorer_address_url(&address.to_string());
                    let _ = open::that(&url);
                }
                Task::none()
            }

            Message::OpenExplorerTx(signature) => {
                let url = self.config.explorer_tx_url(&signature);
                let _ = open::that(&url);
                Task::none()
            }
        }
    }

    // -- Helpers --

    /// Start the balance poller for the connected address and arm the first
    /// watcher task.
    fn start_polling(&mut self) -> Task<Message> {
        let Some(owner) = self.session.snapshot().address else {
            return Task::none();
        };
        let handle = BalancePoller::start(
            self.chain.clone(),
            owner,
            self.config.usdc_mint,
            POLL_INTERVAL,
        );
        self.balances_rx = Some(handle.subscribe());
        self.poller = Some(handle);
        self.watch_balances()
    }

    /// Await the next snapshot from the poller. The chain re-arms itself from
    /// `BalancesUpdated` and ends when the poller is dropped.
    fn watch_balances(&self) -> Task<Message> {
        let Some(rx) = self.balances_rx.clone() else {
            return Task::none();
        };
        let mut rx = rx;
        Task::perform(
            async move {
                match rx.changed().await {
                    Ok(()) => Some(*rx.borrow()),
                    Err(_) => None,
                }
            },
            Message::BalancesUpdated,
        )
    }

    /// One-shot fetch outside the poll cadence (menu refresh, post-payment).
    fn fetch_balances_task(&self) -> Task<Message> {
        let Some(owner) = self.session.snapshot().address else {
            return Task::none();
        };
        let reader = self.chain.clone();
        let mint = self.config.usdc_mint;
        Task::perform(
            async move {
                let sol = match reader.native_balance(&owner).await {
                    Ok(lamports) => lamports_to_sol(lamports),
                    Err(e) => {
                        tracing::warn!("balance refresh: SOL fetch failed: {e}");
                        return None;
                    }
                };
                let usdc = match reader.token_balance(&owner, &mint).await {
                    Ok(balance) => balance.unwrap_or(0.0),
                    Err(e) => {
                        tracing::warn!("balance refresh: USDC fetch failed: {e}");
                        return None;
                    }
                };
                Some(Balances { sol, usdc })
            },
            Message::BalancesFetched,
        )
    }

    pub(crate) fn fetch_price_task(&self) -> Task<Message> {
        let client = self.http.clone();
        Task::perform(
            async move { fetch_sol_price_usd(&client).await },
            Message::PriceUpdated,
        )
    }

    fn apply_balances(&mut self, balances: Balances) {
        self.form.set_balances(balances);
    }

    /// Regenerate the QR image from the form's current payload. Encoding
    /// failures degrade to no QR.
    fn refresh_qr(&mut self) {
        self.qr_data = self
            .form
            .qr_payload()
            .and_then(|uri| qr_code::Data::new(uri).ok());
    }

    fn copy_to_clipboard(&mut self, value: String, confirmation: &str) {
        if let Some(cb) = &mut self.clipboard {
            match cb.set_text(value) {
                Ok(_) => self.status_message = Some(confirmation.to_string()),
                Err(e) => self.status_message = Some(format!("Copy failed: {e}")),
            }
        } else {
            self.status_message = Some("Clipboard not available".to_string());
        }
    }
}
