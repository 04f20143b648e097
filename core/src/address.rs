//! Recipient address validation.

use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use crate::error::PayError;

/// Check whether user input is a well-formed, on-curve Solana address.
///
/// Trims whitespace first; empty input is invalid. Base58 decode failures and
/// off-curve keys (derived/program addresses, which cannot receive a direct
/// transfer) are invalid. Never panics.
#[must_use]
pub fn validate(raw: &str) -> bool {
    decode(raw).is_some()
}

/// Decode user input into a `Pubkey`, applying the same rules as [`validate`].
#[must_use]
pub fn decode(raw: &str) -> Option<Pubkey> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let pubkey = Pubkey::from_str(raw).ok()?;
    pubkey.is_on_curve().then_some(pubkey)
}

/// Parse user input into a recipient `Pubkey` with a human-readable error
/// for the submit path.
pub fn parse(raw: &str) -> Result<Pubkey, PayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PayError::InvalidRecipient(
            "Recipient address is required".to_string(),
        ));
    }
    let pubkey = Pubkey::from_str(trimmed).map_err(|_| {
        PayError::InvalidRecipient(format!("Invalid Solana address '{trimmed}'"))
    })?;
    if !pubkey.is_on_curve() {
        return Err(PayError::InvalidRecipient(format!(
            "'{trimmed}' is a derived address and cannot receive a direct transfer"
        )));
    }
    Ok(pubkey)
}
