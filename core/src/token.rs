//! The two assets the payment form can move: native SOL and devnet USDC.

use std::fmt;

pub use solana_sdk::native_token::LAMPORTS_PER_SOL;

/// SOL uses 9 decimal places (lamports).
pub const SOL_DECIMALS: u8 = 9;

/// USDC uses 6 decimal places on every cluster.
pub const USDC_DECIMALS: u8 = 6;

/// SOL kept back from the spendable balance so the transfer can still pay
/// its network fee.
pub const SOL_FEE_RESERVE: f64 = 0.001;

/// Display-only estimate of the network fee for a single transfer. The real
/// fee is determined by the signing collaborator.
pub const SOL_FEE_ESTIMATE: f64 = 0.000005;

/// Token selectable in the payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Token {
    #[default]
    Sol,
    Usdc,
}

impl Token {
    /// All selectable tokens, in display order.
    pub const ALL: [Token; 2] = [Token::Sol, Token::Usdc];

    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Token::Sol => "SOL",
            Token::Usdc => "USDC",
        }
    }

    #[must_use]
    pub fn decimals(&self) -> u8 {
        match self {
            Token::Sol => SOL_DECIMALS,
            Token::Usdc => USDC_DECIMALS,
        }
    }

    /// SOL reserved for fees when computing the spendable balance; zero for
    /// tokens whose fees are paid in SOL.
    #[must_use]
    pub fn fee_reserve(&self) -> f64 {
        match self {
            Token::Sol => SOL_FEE_RESERVE,
            Token::Usdc => 0.0,
        }
    }

    /// Display estimate added to the total for this token.
    #[must_use]
    pub fn fee_estimate(&self) -> f64 {
        match self {
            Token::Sol => SOL_FEE_ESTIMATE,
            Token::Usdc => 0.0,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
