//! Payment form state machine.
//!
//! Owns recipient, amount, token selection, balance snapshots, and the
//! payment lifecycle (`idle -> processing -> success | error`). Derived
//! values (recipient validity, amount validity, the spendable limit, the QR
//! payload) are recomputed from current inputs on every mutation rather
//! than stored as independently mutable fields, so they can never go stale.

use chrono::Utc;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;

use crate::address;
use crate::chain::{derive_token_account, Balances};
use crate::display::{parse_amount, parse_ui_amount};
use crate::error::{friendly_submit_error, PayError, GENERIC_SUBMIT_ERROR};
use crate::paylink;
use crate::session::SessionSnapshot;
use crate::token::Token;

/// Payment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

/// A guarded, ready-to-submit transfer: exactly one instruction.
#[derive(Debug, Clone)]
pub struct PreparedPayment {
    pub instruction: Instruction,
    pub base_units: u64,
    pub token: Token,
    pub recipient: Pubkey,
}

/// State behind the payment view. Created when the view mounts and discarded
/// with it; mutated only through its own operations.
#[derive(Debug)]
pub struct PaymentForm {
    recipient: String,
    /// `Some` iff `recipient` currently decodes to an on-curve address.
    /// Recomputed synchronously on every recipient change.
    recipient_key: Option<Pubkey>,
    amount: String,
    token: Token,
    sol_balance: f64,
    usdc_balance: f64,
    status: PaymentStatus,
    signature: Option<String>,
    error: Option<String>,
    qr_payload: Option<String>,
}

impl Default for PaymentForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            recipient: String::new(),
            recipient_key: None,
            amount: "0.1".to_string(),
            token: Token::Sol,
            sol_balance: 0.0,
            usdc_balance: 0.0,
            status: PaymentStatus::Idle,
            signature: None,
            error: None,
            qr_payload: None,
        }
    }

    // -- Inputs --

    pub fn set_recipient(&mut self, value: String) {
        self.recipient_key = address::decode(&value);
        self.recipient = value;
        self.on_edit();
    }

    pub fn set_amount(&mut self, value: String) {
        self.amount = value;
        self.on_edit();
    }

    pub fn set_token(&mut self, token: Token) {
        self.token = token;
        self.on_edit();
    }

    /// Record the latest balance snapshot from the poller. Not a user edit:
    /// banners and the QR payload are left alone.
    pub fn set_balances(&mut self, balances: Balances) {
        self.sol_balance = balances.sol;
        self.usdc_balance = balances.usdc;
    }

    /// Editing any field clears a completed transaction's stale banner and
    /// returns the lifecycle to `Idle`, then regenerates the QR payload.
    fn on_edit(&mut self) {
        if matches!(self.status, PaymentStatus::Success | PaymentStatus::Error) {
            self.status = PaymentStatus::Idle;
            self.signature = None;
        }
        self.error = None;
        self.qr_payload = self.derive_qr();
    }

    fn derive_qr(&self) -> Option<String> {
        let recipient = self.recipient_key.as_ref()?;
        let base_units = parse_amount(&self.amount, self.token.decimals()).ok()?;
        if base_units == 0 {
            return None;
        }
        Some(paylink::encode(
            recipient,
            base_units,
            &self.amount,
            self.token,
            Utc::now(),
        ))
    }

    // -- Accessors --

    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    #[must_use]
    pub fn is_valid_recipient(&self) -> bool {
        self.recipient_key.is_some()
    }

    #[must_use]
    pub fn amount(&self) -> &str {
        &self.amount
    }

    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    #[must_use]
    pub fn sol_balance(&self) -> f64 {
        self.sol_balance
    }

    #[must_use]
    pub fn usdc_balance(&self) -> f64 {
        self.usdc_balance
    }

    #[must_use]
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn qr_payload(&self) -> Option<&str> {
        self.qr_payload.as_deref()
    }

    // -- Derived values --

    #[must_use]
    pub fn is_valid_amount(&self) -> bool {
        parse_ui_amount(&self.amount).is_some_and(|n| n > 0.0)
    }

    /// Balance available to spend for the selected token, after the SOL fee
    /// reserve.
    #[must_use]
    pub fn spendable(&self) -> f64 {
        let balance = match self.token {
            Token::Sol => self.sol_balance,
            Token::Usdc => self.usdc_balance,
        };
        balance - self.token.fee_reserve()
    }

    /// Amount plus the display fee estimate.
    #[must_use]
    pub fn total(&self) -> f64 {
        parse_ui_amount(&self.amount).unwrap_or(0.0) + self.token.fee_estimate()
    }

    /// Whether a submit would pass every guard right now.
    #[must_use]
    pub fn can_submit(&self, connected: bool) -> bool {
        if !connected || self.status == PaymentStatus::Processing {
            return false;
        }
        let Some(amount) = parse_ui_amount(&self.amount) else {
            return false;
        };
        amount > 0.0 && self.recipient_key.is_some() && amount <= self.spendable()
    }

    // -- Transitions --

    /// Run the submit guard and enter `Processing`.
    ///
    /// A violation leaves the current status untouched, records an inline
    /// error message, and returns `None`. While `Processing`, returns `None`
    /// without any state change; at most one transaction is in flight per
    /// form.
    pub fn prepare(
        &mut self,
        session: &SessionSnapshot,
        usdc_mint: &Pubkey,
    ) -> Option<PreparedPayment> {
        if self.status == PaymentStatus::Processing {
            return None;
        }
        let Some(owner) = session.address.filter(|_| session.connected) else {
            self.error = Some(PayError::NotConnected.to_string());
            return None;
        };
        let recipient = match address::parse(&self.recipient) {
            Ok(key) => key,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };
        let base_units = match parse_amount(&self.amount, self.token.decimals()) {
            Ok(units) => units,
            Err(message) => {
                self.error = Some(PayError::InvalidAmount(message).to_string());
                return None;
            }
        };
        if base_units == 0 {
            self.error = Some(
                PayError::InvalidAmount("Amount must be greater than 0".to_string()).to_string(),
            );
            return None;
        }
        let ui_amount = parse_ui_amount(&self.amount).unwrap_or(0.0);
        if ui_amount > self.spendable() {
            self.error = Some(
                PayError::InsufficientBalance(format!(
                    "Insufficient {} balance",
                    self.token.symbol()
                ))
                .to_string(),
            );
            return None;
        }

        let instruction = match self.token {
            Token::Sol => system_instruction::transfer(&owner, &recipient, base_units),
            Token::Usdc => {
                let source = derive_token_account(&owner, usdc_mint);
                let destination = derive_token_account(&recipient, usdc_mint);
                match spl_token::instruction::transfer_checked(
                    &spl_token::id(),
                    &source,
                    usdc_mint,
                    &destination,
                    &owner,
                    &[],
                    base_units,
                    self.token.decimals(),
                ) {
                    Ok(ix) => ix,
                    Err(e) => {
                        self.error = Some(format!("Failed to build transfer: {e}"));
                        return None;
                    }
                }
            }
        };

        self.status = PaymentStatus::Processing;
        self.error = None;
        self.signature = None;
        Some(PreparedPayment {
            instruction,
            base_units,
            token: self.token,
            recipient,
        })
    }

    /// Record the outcome of a dispatched submission.
    ///
    /// A returned signature means success; a missing signature or a failure
    /// message means error, with cancellation text rewritten to a friendlier
    /// banner.
    pub fn complete(&mut self, result: std::result::Result<Option<String>, String>) {
        match result {
            Ok(Some(signature)) if !signature.is_empty() => {
                self.status = PaymentStatus::Success;
                self.signature = Some(signature);
                self.error = None;
            }
            Ok(_) => {
                self.status = PaymentStatus::Error;
                self.signature = None;
                self.error = Some(GENERIC_SUBMIT_ERROR.to_string());
            }
            Err(message) => {
                self.status = PaymentStatus::Error;
                self.signature = None;
                self.error = Some(friendly_submit_error(&message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::signature::{Keypair, Signer};
    use solana_sdk::system_program;

    use super::*;
    use crate::config::DEVNET_USDC_MINT;
    use crate::error::CANCELLED_SUBMIT_ERROR;

    fn connected_session(owner: Pubkey) -> SessionSnapshot {
        SessionSnapshot {
            connected: true,
            connecting: false,
            address: Some(owner),
        }
    }

    fn funded_form(recipient: &Pubkey) -> PaymentForm {
        let mut form = PaymentForm::new();
        form.set_recipient(recipient.to_string());
        form.set_balances(Balances {
            sol: 10.0,
            usdc: 10.0,
        });
        form
    }

    #[test]
    fn recipient_validity_tracks_input_synchronously() {
        let mut form = PaymentForm::new();
        assert!(!form.is_valid_recipient());
        form.set_recipient(Keypair::new().pubkey().to_string());
        assert!(form.is_valid_recipient());
        form.set_recipient("garbage".to_string());
        assert!(!form.is_valid_recipient());
    }

    #[test]
    fn guard_rejects_disconnected_session() {
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        let prepared = form.prepare(&SessionSnapshot::disconnected(), &DEVNET_USDC_MINT);
        assert!(prepared.is_none());
        assert_eq!(form.status(), PaymentStatus::Idle);
        assert_eq!(form.error_message(), Some("Wallet is not connected"));
    }

    #[test]
    fn guard_rejects_invalid_recipient() {
        let owner = Keypair::new().pubkey();
        let mut form = PaymentForm::new();
        form.set_recipient("not-an-address".to_string());
        form.set_balances(Balances { sol: 1.0, usdc: 0.0 });
        assert!(form
            .prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .is_none());
        assert_eq!(form.status(), PaymentStatus::Idle);
        assert!(form.error_message().unwrap().contains("Invalid Solana address"));
    }

    #[test]
    fn guard_rejects_non_positive_amount() {
        let owner = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        for bad in ["0", "-1", "abc"] {
            let mut form = funded_form(&recipient);
            form.set_amount(bad.to_string());
            assert!(
                form.prepare(&connected_session(owner), &DEVNET_USDC_MINT)
                    .is_none(),
                "amount '{bad}' should be rejected"
            );
            assert!(form.error_message().is_some());
        }
    }

    #[test]
    fn sub_base_unit_amount_is_rejected_not_sent_as_zero() {
        let owner = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        form.set_token(Token::Usdc);
        // 0.0000009 USDC truncates to 0 base units.
        form.set_amount("0.0000009".to_string());
        assert!(form
            .prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .is_none());
        assert_eq!(
            form.error_message(),
            Some("Amount must be greater than 0")
        );
    }

    #[test]
    fn sol_transfer_floors_to_lamports() {
        let owner = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        form.set_amount("0.1".to_string());
        let prepared = form
            .prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .unwrap();
        assert_eq!(prepared.base_units, 100_000_000);
        assert_eq!(prepared.instruction.program_id, system_program::id());
        assert_eq!(form.status(), PaymentStatus::Processing);
    }

    #[test]
    fn usdc_transfer_floors_to_micro_units() {
        let owner = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        form.set_token(Token::Usdc);
        form.set_amount("2.5".to_string());
        let prepared = form
            .prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .unwrap();
        assert_eq!(prepared.base_units, 2_500_000);
        assert_eq!(prepared.instruction.program_id, spl_token::id());
        // Addressed between the derived token accounts, not the owners.
        let source = derive_token_account(&owner, &DEVNET_USDC_MINT);
        let destination = derive_token_account(&recipient, &DEVNET_USDC_MINT);
        let accounts: Vec<Pubkey> = prepared
            .instruction
            .accounts
            .iter()
            .map(|a| a.pubkey)
            .collect();
        assert!(accounts.contains(&source));
        assert!(accounts.contains(&destination));
    }

    #[test]
    fn sol_spendable_keeps_fee_reserve() {
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        form.set_balances(Balances { sol: 1.5, usdc: 0.0 });
        form.set_amount("1.499".to_string());
        assert!(form.can_submit(true));
        form.set_amount("1.4995".to_string());
        assert!(!form.can_submit(true));
    }

    #[test]
    fn usdc_spendable_has_no_reserve() {
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        form.set_token(Token::Usdc);
        form.set_balances(Balances { sol: 0.0, usdc: 2.5 });
        form.set_amount("2.5".to_string());
        assert!(form.can_submit(true));
        form.set_amount("2.51".to_string());
        assert!(!form.can_submit(true));
    }

    #[test]
    fn insufficient_balance_blocks_submission() {
        let owner = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        form.set_balances(Balances { sol: 0.05, usdc: 0.0 });
        form.set_amount("0.1".to_string());
        assert!(form
            .prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .is_none());
        assert_eq!(form.error_message(), Some("Insufficient SOL balance"));
        assert_eq!(form.status(), PaymentStatus::Idle);
    }

    #[test]
    fn processing_locks_out_a_second_submit() {
        let owner = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        assert!(form
            .prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .is_some());
        assert_eq!(form.status(), PaymentStatus::Processing);
        assert!(!form.can_submit(true));
        // Second submit produces no instruction and no state change.
        assert!(form
            .prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .is_none());
        assert_eq!(form.status(), PaymentStatus::Processing);
        assert!(form.error_message().is_none());
    }

    #[test]
    fn success_records_signature_and_clears_error() {
        let owner = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        form.prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .unwrap();
        form.complete(Ok(Some("5sig".to_string())));
        assert_eq!(form.status(), PaymentStatus::Success);
        assert_eq!(form.signature(), Some("5sig"));
        assert!(form.error_message().is_none());
    }

    #[test]
    fn failure_records_message_and_clears_signature() {
        let owner = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        let mut form = funded_form(&recipient);
        form.prepare(&connected_session(owner), &DEVNET_USDC_MINT)
            .unwrap();
        form.complete(Err("custom program error: 0x1".to_string()));
        assert_eq!(form.status(), PaymentStatus::Error);
        assert_eq!(form.error_message(), Some("custom program error: 0x1"));
        assert!(form.signature().is_none());
    }

    #[test]
    fn missing_signature_is_an_error() {
        let mut form = PaymentForm::new();
        form.complete(Ok(None));
        assert_eq!(form.status(), PaymentStatus::Error);
        assert_eq!(form.error_message(), Some(GENERIC_SUBMIT_ERROR));
    }

    #[test]
    fn cancellation_gets_a_friendly_banner() {
        let mut form = PaymentForm::new();
        form.complete(Err("User cancelled the passkey prompt".to_string()));
        assert_eq!(form.status(), PaymentStatus::Error);
        assert_eq!(form.error_message(), Some(CANCELLED_SUBMIT_ERROR));
    }

    #[test]
    fn editing_after_completion_clears_stale_banners() {
        let mut form = PaymentForm::new();
        form.complete(Ok(Some("5sig".to_string())));
        assert_eq!(form.status(), PaymentStatus::Success);
        form.set_amount("0.2".to_string());
        assert_eq!(form.status(), PaymentStatus::Idle);
        assert!(form.signature().is_none());

        form.complete(Err("boom".to_string()));
        assert_eq!(form.status(), PaymentStatus::Error);
        form.set_recipient(Keypair::new().pubkey().to_string());
        assert_eq!(form.status(), PaymentStatus::Idle);
        assert!(form.error_message().is_none());
    }

    #[test]
    fn qr_payload_requires_valid_recipient_and_positive_amount() {
        let mut form = PaymentForm::new();
        assert!(form.qr_payload().is_none());

        form.set_recipient(Keypair::new().pubkey().to_string());
        let payload = form.qr_payload().unwrap();
        assert!(payload.starts_with("solana:"));
        assert!(payload.contains("amount=100000000"));

        form.set_amount("0".to_string());
        assert!(form.qr_payload().is_none());

        form.set_amount("0.5".to_string());
        assert!(form.qr_payload().is_some());

        form.set_recipient("broken".to_string());
        assert!(form.qr_payload().is_none());
    }

    #[test]
    fn qr_payload_tracks_token_selection() {
        let mut form = PaymentForm::new();
        form.set_recipient(Keypair::new().pubkey().to_string());
        form.set_amount("2.5".to_string());
        form.set_token(Token::Usdc);
        let payload = form.qr_payload().unwrap();
        assert!(payload.contains("amount=2500000"));
        assert!(payload.contains("USDC"));
    }

    #[test]
    fn total_adds_fee_estimate_for_sol_only() {
        let mut form = PaymentForm::new();
        form.set_amount("1".to_string());
        assert!((form.total() - 1.000005).abs() < 1e-12);
        form.set_token(Token::Usdc);
        assert!((form.total() - 1.0).abs() < 1e-12);
    }
}
