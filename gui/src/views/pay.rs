use iced::widget::{button, column, container, qr_code, row, text, text_input, Space};
use iced::{Element, Fill, Font};

use solpay_core::display::{format_sol, format_usdc, parse_ui_amount, short_address};
use solpay_core::session::SessionSnapshot;
use solpay_core::token::SOL_FEE_ESTIMATE;
use solpay_core::{PaymentStatus, Token};

use crate::messages::Message;
use crate::{styles, App, MUTED};

impl App {
    pub(crate) fn view_pay(&self, snapshot: &SessionSnapshot) -> Element<'_, Message> {
        let cols = row![self.view_summary_card(), self.view_send_card(snapshot)].spacing(16);
        container(cols).padding(20).into()
    }

    /// Left card: balances, the scannable payment request, and the trust note.
    fn view_summary_card(&self) -> Element<'_, Message> {
        let title = text("Solana Pay Transfer").size(20).font(styles::BOLD);
        let subtitle = text("Send to any Solana address").size(12).color(MUTED);

        let balances = column![
            text("Your Balances").size(14).font(styles::BOLD),
            row![
                text("Solana (SOL)").size(13).color(MUTED),
                Space::new().width(Fill),
                text(format_sol(self.form.sol_balance()))
                    .size(13)
                    .font(Font::MONOSPACE)
                    .color(styles::ACCENT),
            ],
            styles::separator(),
            row![
                text("USDC Stablecoin").size(13).color(MUTED),
                Space::new().width(Fill),
                text(format_usdc(self.form.usdc_balance()))
                    .size(13)
                    .font(Font::MONOSPACE)
                    .color(styles::INFO),
            ],
        ]
        .spacing(8);

        let mut content = column![
            title,
            subtitle,
            Space::new().height(8),
            container(balances).padding(16).width(Fill).style(styles::pill),
        ]
        .spacing(8);

        if let Some(data) = &self.qr_data {
            content = content
                .push(Space::new().height(8))
                .push(text("Scan QR Code").size(14).font(styles::BOLD))
                .push(container(qr_code(data).cell_size(5)).center_x(Fill))
                .push(
                    text("Scan with any Solana wallet to pre-fill payment details")
                        .size(11)
                        .color(MUTED),
                );
        }

        content = content.push(Space::new().height(8)).push(
            text("Secure transfers on Solana devnet, powered by passkey smart wallets")
                .size(11)
                .color(MUTED),
        );

        container(content)
            .padding(24)
            .width(Fill)
            .style(styles::card)
            .into()
    }

    /// Right card: the payment form itself.
    fn view_send_card(&self, snapshot: &SessionSnapshot) -> Element<'_, Message> {
        let processing = self.form.status() == PaymentStatus::Processing;

        let title = text("Send Payment").size(20).font(styles::BOLD);
        let subtitle = match snapshot.address {
            Some(address) => format!("Connected: {}", short_address(&address.to_string())),
            None => "Connect your wallet to continue".to_string(),
        };

        // Connected pill with the disconnect shortcut
        let session_row = snapshot.address.map(|address| {
            container(
                row![
                    text("●").size(10).color(styles::ACCENT),
                    text(short_address(&address.to_string()))
                        .size(13)
                        .font(Font::MONOSPACE)
                        .color(styles::ACCENT),
                    Space::new().width(Fill),
                    button(text("Disconnect").size(11))
                        .padding([4, 10])
                        .style(styles::btn_ghost)
                        .on_press(Message::DisconnectPressed),
                ]
                .spacing(8)
                .align_y(iced::Alignment::Center),
            )
            .padding([10, 14])
            .width(Fill)
            .style(styles::banner_success)
        });

        // Recipient
        let mut recipient_input = text_input(
            "Enter Solana address (e.g. 7xKX...)",
            self.form.recipient(),
        )
        .size(13)
        .font(Font::MONOSPACE);
        if !processing {
            recipient_input = recipient_input.on_input(Message::RecipientChanged);
        }
        let mut recipient_row = row![recipient_input].spacing(8);
        if !self.form.recipient().is_empty() {
            recipient_row = recipient_row.push(
                button(text("Copy").size(11))
                    .padding([6, 10])
                    .style(styles::btn_ghost)
                    .on_press(Message::CopyRecipient),
            );
        }
        let validity_hint: Option<Element<Message>> = if self.form.recipient().is_empty() {
            None
        } else if self.form.is_valid_recipient() {
            Some(
                text("Valid Solana address")
                    .size(11)
                    .color(styles::ACCENT)
                    .into(),
            )
        } else {
            Some(
                text("Invalid address format")
                    .size(11)
                    .color(styles::DANGER)
                    .into(),
            )
        };

        // Amount
        let mut amount_input = text_input("0.00", self.form.amount())
            .size(16)
            .font(Font::MONOSPACE);
        if !processing {
            amount_input = amount_input
                .on_input(Message::AmountChanged)
                .on_submit(Message::ConfirmPay);
        }
        let amount_hint: Option<Element<Message>> =
            if !self.form.amount().is_empty() && !self.form.is_valid_amount() {
                Some(
                    text("Please enter a valid amount")
                        .size(11)
                        .color(styles::DANGER)
                        .into(),
                )
            } else {
                None
            };

        // Token picker
        let token_button = |label: &'static str, token: Token| {
            let mut b = button(container(text(label).size(14)).center_x(Fill))
                .width(Fill)
                .padding(12)
                .style(styles::toggle_btn(self.form.token() == token));
            if !processing {
                b = b.on_press(Message::TokenSelected(token));
            }
            b
        };
        let token_row = row![
            token_button("◎ SOL", Token::Sol),
            token_button("$ USDC", Token::Usdc),
        ]
        .spacing(12);

        // Fee and total summary
        let symbol = self.form.token().symbol();
        let amount_display = parse_ui_amount(self.form.amount()).unwrap_or(0.0);
        let mut summary = column![row![
            text("Amount").size(12).color(MUTED),
            Space::new().width(Fill),
            text(format!("{amount_display:.6} {symbol}"))
                .size(12)
                .font(Font::MONOSPACE),
        ]]
        .spacing(6);
        if self.form.token() == Token::Sol {
            summary = summary.push(row![
                text("Network Fee").size(12).color(MUTED),
                Space::new().width(Fill),
                text(format!("~{SOL_FEE_ESTIMATE} SOL"))
                    .size(12)
                    .font(Font::MONOSPACE),
            ]);
        }
        summary = summary.push(styles::separator()).push(row![
            text("Total").size(13).font(styles::BOLD),
            Space::new().width(Fill),
            text(format!("{:.6} {symbol}", self.form.total()))
                .size(13)
                .font(Font::MONOSPACE),
        ]);

        // Action button
        let send_label = if processing {
            "Processing...".to_string()
        } else {
            format!("Send {amount_display:.4} {symbol}")
        };
        let mut send = button(container(text(send_label).size(15).font(styles::BOLD)).center_x(Fill))
            .width(Fill)
            .padding(14)
            .style(styles::btn_primary);
        if self.form.can_submit(snapshot.connected) {
            send = send.on_press(Message::ConfirmPay);
        }

        let mut form = column![
            title,
            text(subtitle).size(12).color(MUTED),
        ]
        .spacing(8);
        if let Some(pill) = session_row {
            form = form.push(pill);
        }
        form = form
            .push(Space::new().height(4))
            .push(text("Recipient Address").size(12).color(MUTED))
            .push(recipient_row);
        if let Some(hint) = validity_hint {
            form = form.push(hint);
        }
        form = form
            .push(Space::new().height(4))
            .push(text("Amount").size(12).color(MUTED))
            .push(amount_input);
        if let Some(hint) = amount_hint {
            form = form.push(hint);
        }
        form = form
            .push(Space::new().height(4))
            .push(text("Select Token").size(12).color(MUTED))
            .push(token_row)
            .push(Space::new().height(4))
            .push(container(summary).padding(14).width(Fill).style(styles::pill))
            .push(Space::new().height(4))
            .push(send);

        // Lifecycle banners
        match self.form.status() {
            PaymentStatus::Success => {
                if let Some(signature) = self.form.signature() {
                    form = form.push(self.view_success_banner(signature));
                }
            }
            PaymentStatus::Error => {
                form = form.push(
                    container(
                        column![
                            text("Payment Failed").size(14).font(styles::BOLD).color(styles::DANGER),
                            text(self.form.error_message().unwrap_or("An error occurred. Please try again."))
                                .size(12)
                                .color(styles::DANGER),
                        ]
                        .spacing(4),
                    )
                    .padding(14)
                    .width(Fill)
                    .style(styles::banner_error),
                );
            }
            _ => {
                // Guard violations surface inline without leaving idle.
                if let Some(err) = self.form.error_message() {
                    form = form.push(text(err).size(12).color(styles::DANGER));
                }
            }
        }

        container(form)
            .padding(24)
            .width(Fill)
            .style(styles::card)
            .into()
    }

    fn view_success_banner(&self, signature: &str) -> Element<'_, Message> {
        let sent_line = format!(
            "Sent {} {} to {}",
            self.form.amount(),
            self.form.token().symbol(),
            short_address(self.form.recipient().trim()),
        );
        container(
            column![
                text("Payment Successful!").size(15).font(styles::BOLD).color(styles::ACCENT),
                text(sent_line).size(12).color(styles::ACCENT),
                text(short_address(signature)).size(11).font(Font::MONOSPACE).color(MUTED),
                button(text("View on Explorer →").size(12))
                    .padding([6, 12])
                    .style(styles::btn_ghost)
                    .on_press(Message::OpenExplorerTx(signature.to_string())),
            ]
            .spacing(6),
        )
        .padding(16)
        .width(Fill)
        .style(styles::banner_success)
        .into()
    }
}
