//! Payment-request URI encoding.
//!
//! Produces the `solana:` URI a scanning wallet uses to pre-fill payment
//! details: recipient, amount in base units, a fixed label, a message naming
//! the amount and token, and a memo carrying the generation timestamp.

use chrono::{DateTime, SecondsFormat, Utc};
use solana_sdk::pubkey::Pubkey;
use url::form_urlencoded;

use crate::token::Token;

/// Fixed label shown by scanning wallets.
pub const PAYMENT_LABEL: &str = "Solana Payment";

const MEMO_PREFIX: &str = "Payment via Solpay";

/// Encode a payment request for `base_units` of `token` to `recipient`.
///
/// `ui_amount` is the user's decimal input, used verbatim in the
/// human-readable message.
#[must_use]
pub fn encode(
    recipient: &Pubkey,
    base_units: u64,
    ui_amount: &str,
    token: Token,
    generated_at: DateTime<Utc>,
) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("amount", &base_units.to_string())
        .append_pair("label", PAYMENT_LABEL)
        .append_pair(
            "message",
            &format!("Payment of {} {}", ui_amount.trim(), token.symbol()),
        )
        .append_pair(
            "memo",
            &format!(
                "{MEMO_PREFIX} - {}",
                generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
        )
        .finish();
    format!("solana:{recipient}?{query}")
}
