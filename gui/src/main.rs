mod messages;
mod styles;
mod update;
mod views;

use iced::theme::Palette;
use iced::widget::{button, column, container, mouse_area, qr_code, row, text, Space};
use iced::{Color, Element, Fill, Font, Length, Task, Theme};

use std::sync::Arc;

use tokio::sync::watch;

use solpay_core::display::{format_sol, format_usd, format_usdc, short_address};
use solpay_core::price::{self, DEFAULT_SOL_PRICE_USD, PRICE_REFRESH_INTERVAL};
use solpay_core::session::{gate, Gate, SessionSnapshot};
use solpay_core::{
    Balances, ChainReader, Config, KeypairSession, PaymentForm, PollerHandle, RpcChainReader,
    WalletSession,
};

use messages::Message;

// Dark palette after the original widget (slate + purple)
const BG:      Color = Color::from_rgb(0.008, 0.024, 0.090); // #020617
const SURFACE: Color = Color::from_rgb(0.118, 0.161, 0.231); // #1e293b (slate-800)
const BORDER:  Color = Color::from_rgb(0.200, 0.255, 0.333); // #334155 (slate-700)
const ACTIVE:  Color = Color::from_rgb(0.169, 0.137, 0.333); // #2b2355
const MUTED:   Color = Color::from_rgb(0.580, 0.639, 0.722); // #94a3b8 (slate-400)
const PRIMARY: Color = Color::from_rgb(0.545, 0.361, 0.965); // #8b5cf6 (violet-500)

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    iced::application(App::new, App::update, App::view)
        .title("Solpay")
        .theme(App::theme)
        .subscription(App::subscription)
        .run()
}

// -- App state --

struct App {
    config: Config,
    session: Arc<dyn WalletSession>,
    chain: Arc<dyn ChainReader>,

    // Payment view state; discarded whenever the session ends
    form: PaymentForm,
    qr_data: Option<qr_code::Data>,

    // Balance polling: the handle owns the poll task; dropping it cancels
    poller: Option<PollerHandle>,
    balances_rx: Option<watch::Receiver<Balances>>,

    // Navbar
    sol_price: f64,
    wallet_menu_open: bool,
    status_message: Option<String>,
    connect_error: Option<String>,

    http: reqwest::Client,
    clipboard: Option<arboard::Clipboard>,

    // Cached theme (avoids re-allocating every frame)
    theme: Theme,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let config = Config::from_env().unwrap_or_else(|e| {
            tracing::warn!("{e}; using devnet defaults");
            Config::default()
        });
        let reader = RpcChainReader::new(&config);
        let session: Arc<dyn WalletSession> =
            Arc::new(KeypairSession::from_config(&config, reader.client()));

        let app = Self {
            config,
            session,
            chain: Arc::new(reader),
            form: PaymentForm::new(),
            qr_data: None,
            poller: None,
            balances_rx: None,
            sol_price: DEFAULT_SOL_PRICE_USD,
            wallet_menu_open: false,
            status_message: None,
            connect_error: None,
            http: reqwest::Client::new(),
            clipboard: arboard::Clipboard::new().ok(),
            theme: Theme::custom("Solpay".to_string(), Palette {
                background: BG,
                text: Color::from_rgb(0.988, 0.988, 0.988),
                primary: PRIMARY,
                success: styles::ACCENT,
                warning: Color::from_rgb(1.0, 0.757, 0.027),
                danger: styles::DANGER,
            }),
        };
        let warm_up_price = app.fetch_price_task();
        (app, warm_up_price)
    }

    fn theme(&self) -> Theme {
        self.theme.clone()
    }

    fn subscription(&self) -> iced::Subscription<Message> {
        iced::time::every(PRICE_REFRESH_INTERVAL).map(|_| Message::PriceTick)
    }

    // -- Views --

    fn view(&self) -> Element<'_, Message> {
        let snapshot = self.session.snapshot();

        // Protected content renders only once the session gate allows it;
        // anything short of that falls back to the login entry point.
        let body: Element<Message> = match gate(&snapshot) {
            Gate::Allow => self.view_pay(&snapshot),
            Gate::Pending | Gate::Login => self.view_login(&snapshot),
        };

        let mut page = column![self.view_header(&snapshot)];
        if self.wallet_menu_open && snapshot.connected {
            page = page.push(
                row![Space::new().width(Fill), self.view_wallet_menu(&snapshot)].padding([0, 20]),
            );
        }
        page = page.push(body);

        if self.wallet_menu_open {
            // Clicks that no menu control captured dismiss the dropdown.
            mouse_area(page).on_press(Message::CloseMenus).into()
        } else {
            page.into()
        }
    }

    fn view_header(&self, snapshot: &SessionSnapshot) -> Element<'_, Message> {
        let brand = container(text("SOLPAY").size(13).font(styles::BOLD))
            .padding([6, 12])
            .style(styles::pill);

        let wallet_button: Element<Message> = if snapshot.connected {
            let address = snapshot
                .address
                .map(|a| short_address(&a.to_string()))
                .unwrap_or_default();
            let arrow = if self.wallet_menu_open { "▴" } else { "▾" };
            button(
                row![
                    text("●").size(10).color(styles::ACCENT),
                    text(address).size(13).font(Font::MONOSPACE),
                    text(arrow).size(11).color(MUTED),
                ]
                .spacing(8)
                .align_y(iced::Alignment::Center),
            )
            .padding([8, 16])
            .style(styles::btn_secondary)
            .on_press(Message::ToggleWalletMenu)
            .into()
        } else {
            let label = if snapshot.connecting {
                "Connecting..."
            } else {
                "Connect Wallet"
            };
            let mut connect = button(text(label).size(13))
                .padding([8, 16])
                .style(styles::btn_secondary);
            if !snapshot.connecting {
                connect = connect.on_press(Message::ConnectPressed);
            }
            connect.into()
        };

        row![brand, Space::new().width(Fill), wallet_button]
            .padding(15)
            .align_y(iced::Alignment::Center)
            .into()
    }

    /// Condensed session/balance dropdown under the navbar pill.
    fn view_wallet_menu(&self, snapshot: &SessionSnapshot) -> Element<'_, Message> {
        let address = snapshot
            .address
            .map(|a| a.to_string())
            .unwrap_or_default();

        let header = row![
            text(short_address(&address)).size(13).font(Font::MONOSPACE),
            Space::new().width(Fill),
            text("Connected").size(11).color(styles::ACCENT),
        ]
        .align_y(iced::Alignment::Center);

        let balances = self.form_balances();
        let sol_row = row![
            text("Solana").size(12).color(MUTED),
            Space::new().width(Fill),
            column![
                text(format!("{} SOL", format_sol(balances.sol))).size(13),
                text(format!("≈ {}", format_usd(balances.sol * self.sol_price)))
                    .size(11)
                    .color(MUTED),
            ]
            .align_x(iced::Alignment::End),
        ];
        let usdc_row = row![
            text("USD Coin").size(12).color(MUTED),
            Space::new().width(Fill),
            column![
                text(format!("{} USDC", format_usdc(balances.usdc))).size(13),
                text(format!("≈ {}", format_usd(balances.usdc)))
                    .size(11)
                    .color(MUTED),
            ]
            .align_x(iced::Alignment::End),
        ];
        let total_row = row![
            text("Total Balance").size(12).color(MUTED),
            Space::new().width(Fill),
            text(format_usd(price::total_balance_usd(
                balances.sol,
                balances.usdc,
                self.sol_price
            )))
            .size(13)
            .font(styles::BOLD)
            .color(styles::ACCENT),
        ];

        let action = |label: &'static str, message: Message| {
            button(text(label).size(12))
                .width(Fill)
                .padding([6, 10])
                .style(styles::btn_ghost)
                .on_press(message)
        };

        let mut menu = column![
            header,
            styles::separator(),
            sol_row,
            usdc_row,
            styles::separator(),
            total_row,
            action("Refresh Balances", Message::RefreshBalances),
            styles::separator(),
            action("View on Explorer", Message::OpenExplorerAddress),
            action("Copy Address", Message::CopyAddress),
            button(text("Disconnect Wallet").size(12))
                .width(Fill)
                .padding([6, 10])
                .style(styles::btn_danger)
                .on_press(Message::DisconnectPressed),
        ]
        .spacing(8);

        if let Some(msg) = &self.status_message {
            menu = menu.push(text(msg.as_str()).size(11).color(styles::ACCENT));
        }

        container(menu)
            .padding(16)
            .width(Length::Fixed(280.0))
            .style(styles::card)
            .into()
    }

    /// Current balance snapshot as held by the form.
    fn form_balances(&self) -> Balances {
        Balances {
            sol: self.form.sol_balance(),
            usdc: self.form.usdc_balance(),
        }
    }
}
