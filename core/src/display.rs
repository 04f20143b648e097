//! Amount parsing and display helpers.
//!
//! All on-chain amounts are integral base units (lamports for SOL,
//! micro-units for USDC). User input is decimal text; parsing truncates
//! toward zero so a displayed balance can never be overspent by rounding.

/// Parse a decimal amount string into base units for a token with the given
/// number of decimals.
///
/// Accepts: `"1.5"` -> 1_500_000_000 (9 decimals), `"2.5"` -> 2_500_000
/// (6 decimals), `".5"` -> half a unit. Fractional digits beyond `decimals`
/// are truncated, never rounded up, so `"0.0000009"` at 6 decimals parses to
/// `0` (and is then rejected as non-positive by the submit guard).
pub fn parse_amount(input: &str, decimals: u8) -> Result<u64, String> {
    let input = input.trim();

    if input.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }
    if input.starts_with('-') {
        return Err("Amount must be positive".to_string());
    }

    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() > 2 {
        return Err("Invalid amount format. Use a decimal like '1.5' or '0.001'.".to_string());
    }

    let whole: u64 = if parts[0].is_empty() {
        // Leading dot: ".5" is treated as "0.5"
        0
    } else {
        parts[0]
            .parse()
            .map_err(|_| format!("Invalid amount: '{input}'"))?
    };

    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or_else(|| "Too many decimals".to_string())?;

    let frac = if parts.len() == 2 && !parts[1].is_empty() {
        let frac_str = parts[1];
        if !frac_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Invalid amount: '{input}'"));
        }
        // Keep at most `decimals` digits; anything finer is truncated.
        let kept = &frac_str[..frac_str.len().min(decimals as usize)];
        let padded = format!("{kept:0<width$}", width = decimals as usize);
        padded
            .parse::<u64>()
            .map_err(|_| format!("Invalid amount: '{input}'"))?
    } else {
        0
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| "Amount too large".to_string())
}

/// Parse a decimal amount string as a display number, for balance comparisons
/// and totals. Returns `None` for non-numeric or non-finite input.
#[must_use]
pub fn parse_ui_amount(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a SOL amount the way the balance cards show it.
#[must_use]
pub fn format_sol(amount: f64) -> String {
    format!("{amount:.4}")
}

/// Format a USDC amount the way the balance cards show it.
#[must_use]
pub fn format_usdc(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Format a USD estimate.
#[must_use]
pub fn format_usd(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Shorten an address for display: `7xKX...AsU9`.
#[must_use]
pub fn short_address(address: &str) -> String {
    if address.len() > 8 {
        format!("{}...{}", &address[..4], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_number() {
        assert_eq!(parse_amount("1", 9).unwrap(), 1_000_000_000);
    }

    #[test]
    fn parse_decimal_sol() {
        assert_eq!(parse_amount("0.1", 9).unwrap(), 100_000_000);
        assert_eq!(parse_amount("1.5", 9).unwrap(), 1_500_000_000);
    }

    #[test]
    fn parse_decimal_usdc() {
        assert_eq!(parse_amount("2.5", 6).unwrap(), 2_500_000);
    }

    #[test]
    fn parse_leading_dot() {
        assert_eq!(parse_amount(".5", 6).unwrap(), 500_000);
    }

    #[test]
    fn parse_trailing_dot() {
        assert_eq!(parse_amount("1.", 6).unwrap(), 1_000_000);
    }

    #[test]
    fn excess_precision_truncates_not_rounds() {
        // 10th decimal digit is dropped, not rounded up.
        assert_eq!(parse_amount("1.9999999999", 9).unwrap(), 1_999_999_999);
        // Sub-base-unit amounts collapse to zero.
        assert_eq!(parse_amount("0.0000009", 6).unwrap(), 0);
        assert_eq!(parse_amount("0.0000000004", 9).unwrap(), 0);
    }

    #[test]
    fn reject_negative() {
        assert!(parse_amount("-1", 9).is_err());
    }

    #[test]
    fn reject_empty() {
        assert!(parse_amount("", 9).is_err());
        assert!(parse_amount("   ", 9).is_err());
    }

    #[test]
    fn reject_garbage() {
        assert!(parse_amount("abc", 9).is_err());
        assert!(parse_amount("1.2.3", 9).is_err());
        assert!(parse_amount("1.2e5", 9).is_err());
    }

    #[test]
    fn reject_overflow() {
        assert!(parse_amount("99999999999999999999", 9).is_err());
    }

    #[test]
    fn ui_amount_rejects_non_numeric() {
        assert!(parse_ui_amount("abc").is_none());
        assert!(parse_ui_amount("").is_none());
        assert!(parse_ui_amount("NaN").is_none());
        assert!(parse_ui_amount("inf").is_none());
    }

    #[test]
    fn ui_amount_parses_decimals() {
        assert_eq!(parse_ui_amount(" 0.1 "), Some(0.1));
    }

    #[test]
    fn short_address_keeps_ends() {
        assert_eq!(
            short_address("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"),
            "7xKX...gAsU"
        );
        assert_eq!(short_address("short"), "short");
    }

    #[test]
    fn format_balances() {
        assert_eq!(format_sol(1.23456), "1.2346");
        assert_eq!(format_usdc(2.5), "2.50");
        assert_eq!(format_usd(101.239), "$101.24");
    }
}
