use solpay_core::{Balances, Token};

// -- Messages --

#[derive(Debug, Clone)]
pub(crate) enum Message {
    // Session
    ConnectPressed,
    Connected(Result<(), String>),
    DisconnectPressed,

    // Payment form
    RecipientChanged(String),
    AmountChanged(String),
    TokenSelected(Token),
    ConfirmPay,
    /// Ok(signature) from the signing collaborator, Err(message) on failure.
    PayCompleted(Result<Option<String>, String>),

    // Balances
    /// Update from the poller's watch channel; `None` when the poller is gone.
    BalancesUpdated(Option<Balances>),
    /// One-shot refresh result; `None` when the fetch failed.
    BalancesFetched(Option<Balances>),
    RefreshBalances,

    // SOL/USD price
    PriceTick,
    PriceUpdated(Option<f64>),

    // Navbar session menu
    ToggleWalletMenu,
    CloseMenus,
    CopyAddress,
    CopyRecipient,
    OpenExplorerAddress,
    OpenExplorerTx(String),
}
