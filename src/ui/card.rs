/// Property image card
use iced::widget::image::Handle;
use iced::widget::{column, container, image, text};
use iced::{Element, Length};

use crate::media::ImageSlot;
use crate::Message;

const CARD_WIDTH: f32 = 360.0;
const CARD_HEIGHT: f32 = 220.0;

/// The image, or a neutral placeholder while the slot is loading or
/// when nothing could be loaded at all
pub fn view<'a>(slot: &ImageSlot, handle: Option<&Handle>) -> Element<'a, Message> {
    match handle {
        Some(handle) if !slot.is_loading() => {
            let picture = image(handle.clone())
                .width(Length::Fixed(CARD_WIDTH))
                .height(Length::Fixed(CARD_HEIGHT));

            if slot.active_source().is_fallback {
                column![picture, text("Photo unavailable").size(12)]
                    .spacing(4)
                    .into()
            } else {
                picture.into()
            }
        }
        _ => placeholder(),
    }
}

fn placeholder<'a>() -> Element<'a, Message> {
    container(text("🖼").size(48))
        .style(container::rounded_box)
        .center_x(Length::Fixed(CARD_WIDTH))
        .center_y(Length::Fixed(CARD_HEIGHT))
        .into()
}
