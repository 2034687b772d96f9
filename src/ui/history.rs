/// Status history list
use iced::widget::{column, container, row, scrollable, text, Column};
use iced::{Alignment, Element, Length};

use super::badge;
use crate::state::history::{DisplayEntry, HistoryProjection};
use crate::Message;

pub fn view<'a>(projection: &HistoryProjection) -> Element<'a, Message> {
    if projection.is_empty {
        return empty_state();
    }

    let rows: Column<Message> = projection
        .entries
        .iter()
        .fold(Column::new().spacing(12), |list, entry| list.push(entry_row(entry)));

    scrollable(rows).height(Length::Fill).into()
}

fn entry_row<'a>(entry: &DisplayEntry) -> Element<'a, Message> {
    let header = row![
        badge::view(&entry.badge),
        text(format!("by {}", entry.changed_by)).size(14),
        text(entry.changed_at.clone()).size(12),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let mut body = column![header].spacing(4);
    if let Some(note) = &entry.note {
        body = body.push(text(note.clone()).size(13));
    }

    container(body)
        .padding(8)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn empty_state<'a>() -> Element<'a, Message> {
    container(
        column![text("🕓").size(32), text("No history found").size(14)]
            .spacing(8)
            .align_x(Alignment::Center),
    )
    .center_x(Length::Fill)
    .padding(24)
    .into()
}
