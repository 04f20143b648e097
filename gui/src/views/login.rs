use iced::widget::{button, column, container, text};
use iced::{Element, Fill};

use solpay_core::session::SessionSnapshot;

use crate::messages::Message;
use crate::{styles, App, MUTED};

impl App {
    pub(crate) fn view_login(&self, snapshot: &SessionSnapshot) -> Element<'_, Message> {
        let mark = container(text("S").size(28).font(styles::BOLD))
            .padding([14, 24])
            .style(styles::pill);

        let title = text("Solpay").size(32).font(styles::BOLD);
        let subtitle = text("Send SOL and USDC from a passkey smart wallet. No seed phrases.")
            .size(14)
            .color(MUTED);

        let label = if snapshot.connecting {
            "Authenticating..."
        } else {
            "Login with Passkey"
        };
        let mut login = button(text(label).size(16))
            .padding([14, 32])
            .style(styles::btn_primary);
        if !snapshot.connecting {
            login = login.on_press(Message::ConnectPressed);
        }

        let mut col = column![mark, title, subtitle, login]
            .spacing(16)
            .align_x(iced::Alignment::Center);

        if let Some(err) = &self.connect_error {
            col = col.push(text(err.as_str()).size(13).color(styles::DANGER));
        }

        container(col).center_x(Fill).center_y(Fill).into()
    }
}
