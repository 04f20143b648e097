//! SOL/USD price lookup for the session menu's fiat estimates.

use std::time::Duration;

use serde::Deserialize;

/// Price assumed until the first successful fetch.
pub const DEFAULT_SOL_PRICE_USD: f64 = 98.5;

/// Refresh cadence for the price.
pub const PRICE_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

const PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";

#[derive(Debug, Deserialize)]
struct PriceResponse {
    solana: Option<PricePoint>,
}

#[derive(Debug, Deserialize)]
struct PricePoint {
    usd: Option<f64>,
}

/// Fetch the current SOL/USD price.
///
/// Failures degrade silently: callers keep showing the last known price and
/// the miss is only logged.
pub async fn fetch_sol_price_usd(client: &reqwest::Client) -> Option<f64> {
    let response = match client.get(PRICE_URL).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("price fetch failed: {e}");
            return None;
        }
    };
    match response.json::<PriceResponse>().await {
        Ok(body) => extract_price(body),
        Err(e) => {
            tracing::debug!("price response unreadable: {e}");
            None
        }
    }
}

/// USD total of a SOL + USDC balance pair at the given price.
#[must_use]
pub fn total_balance_usd(sol: f64, usdc: f64, sol_price: f64) -> f64 {
    sol * sol_price + usdc
}

fn extract_price(body: PriceResponse) -> Option<f64> {
    body.solana?.usd.filter(|p| p.is_finite() && *p > 0.0)
}
