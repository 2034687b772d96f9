/// Status badges
use iced::widget::{container, text};
use iced::{Background, Border, Color, Element, Theme};

use crate::state::history::BadgeKind;
use crate::Message;

/// Fill and text colors for a badge kind. Outline badges have no fill.
pub fn colors(kind: &BadgeKind) -> (Option<Color>, Color) {
    match kind {
        BadgeKind::Success => (Some(Color::from_rgb8(0x1e, 0x88, 0x4b)), Color::WHITE),
        BadgeKind::Warning => (Some(Color::from_rgb8(0xe0, 0xa1, 0x1b)), Color::BLACK),
        BadgeKind::Primary => (Some(Color::from_rgb8(0x25, 0x63, 0xeb)), Color::WHITE),
        BadgeKind::Outline(_) => (None, Color::from_rgb8(0x9c, 0xa3, 0xaf)),
    }
}

pub fn view<'a>(kind: &BadgeKind) -> Element<'a, Message> {
    let (fill, text_color) = colors(kind);

    container(text(kind.label().to_string()).size(12))
        .padding([2, 8])
        .style(move |_theme: &Theme| container::Style {
            text_color: Some(text_color),
            background: fill.map(Background::Color),
            border: Border {
                color: fill.unwrap_or(text_color),
                width: 1.0,
                radius: 10.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}
