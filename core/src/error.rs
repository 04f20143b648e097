//! Domain error type for payment operations.

use thiserror::Error;

/// Fallback message shown when a submission failure carries no text of its own.
pub const GENERIC_SUBMIT_ERROR: &str = "Transaction rejected or failed";

/// Message shown when the signing collaborator reports a user cancellation.
pub const CANCELLED_SUBMIT_ERROR: &str = "Signature request was cancelled";

/// Typed error enum for payment operations, allowing callers to match on
/// specific failure modes instead of inspecting opaque `anyhow::Error` messages.
#[derive(Debug, Error)]
pub enum PayError {
    /// No active wallet session.
    #[error("Wallet is not connected")]
    NotConnected,

    /// Invalid or empty recipient address.
    #[error("{0}")]
    InvalidRecipient(String),

    /// Invalid amount (non-numeric, non-positive, or too large).
    #[error("{0}")]
    InvalidAmount(String),

    /// Insufficient balance for the requested transfer.
    #[error("{0}")]
    InsufficientBalance(String),

    /// Network or RPC communication failure.
    #[error("{0}")]
    Network(String),

    /// Signing or submission failure.
    #[error("{0}")]
    Signing(String),

    /// Invalid configuration (bad mint address, unreadable keypair file).
    #[error("{0}")]
    Config(String),

    /// Unexpected error from internal subsystems.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `std::result::Result<T, PayError>`.
pub type Result<T> = std::result::Result<T, PayError>;

/// Known substrings of passkey-prompt dismissal errors. Matched
/// case-insensitively against the collaborator's message.
const CANCELLATION_MARKERS: [&str; 4] = ["cancel", "not allowed", "denied", "abort"];

/// Turn a raw submission failure into the message shown to the user.
///
/// A recognised cancellation is rewritten to a friendlier message; anything
/// else is forwarded verbatim, falling back to [`GENERIC_SUBMIT_ERROR`] when
/// the failure carries no text.
pub fn friendly_submit_error(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return GENERIC_SUBMIT_ERROR.to_string();
    }
    let lower = trimmed.to_lowercase();
    if CANCELLATION_MARKERS.iter().any(|m| lower.contains(m)) {
        return CANCELLED_SUBMIT_ERROR.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_failure_falls_back_to_generic() {
        assert_eq!(friendly_submit_error(""), GENERIC_SUBMIT_ERROR);
        assert_eq!(friendly_submit_error("   "), GENERIC_SUBMIT_ERROR);
    }

    #[test]
    fn cancellation_signatures_are_rewritten() {
        assert_eq!(
            friendly_submit_error("User cancelled the request"),
            CANCELLED_SUBMIT_ERROR
        );
        assert_eq!(
            friendly_submit_error("NotAllowedError: The operation is not allowed"),
            CANCELLED_SUBMIT_ERROR
        );
        assert_eq!(friendly_submit_error("signing aborted"), CANCELLED_SUBMIT_ERROR);
    }

    #[test]
    fn other_failures_are_forwarded_verbatim() {
        assert_eq!(
            friendly_submit_error("custom program error: 0x1"),
            "custom program error: 0x1"
        );
    }
}
