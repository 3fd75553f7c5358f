use iced::widget::image::Handle;
use iced::widget::{button, canvas, column, container, row, stack, text, text_input, Image};
use iced::{Alignment, ContentFit, Element, Length};

use super::viewport::ViewportInput;
use crate::render::viewer::ViewerSession;
use crate::Message;

/// Modal content shown instead of the gallery grid
#[derive(Debug)]
pub enum Dialog {
    EditTags { id: String, input: String },
    ConfirmDelete { id: String, name: String },
    Viewer { session: ViewerSession, frame: Handle },
}

impl Dialog {
    pub fn view(&self) -> Element<'_, Message> {
        match self {
            Dialog::EditTags { input, .. } => edit_tags(input),
            Dialog::ConfirmDelete { name, .. } => confirm_delete(name),
            Dialog::Viewer { session, frame } => viewer(session, frame),
        }
    }
}

fn edit_tags(input: &str) -> Element<'_, Message> {
    let content = column![
        text("Edit Tags").size(20),
        text("Tags:"),
        text_input("Enter tags separated by commas", input)
            .on_input(Message::TagInputChanged)
            .on_submit(Message::SaveTags)
            .padding(8),
        row![
            button("OK").on_press(Message::SaveTags),
            button("Cancel")
                .style(button::secondary)
                .on_press(Message::CancelDialog),
        ]
        .spacing(10),
    ]
    .spacing(10)
    .width(Length::Fixed(400.0));

    centered(content.into())
}

fn confirm_delete(name: &str) -> Element<'_, Message> {
    let content = column![
        text("Confirm Deletion").size(20),
        text(format!("Are you sure you want to delete {}?", name)),
        row![
            button("Yes")
                .style(button::danger)
                .on_press(Message::ConfirmDelete),
            button("No")
                .style(button::secondary)
                .on_press(Message::CancelDialog),
        ]
        .spacing(10),
    ]
    .spacing(10)
    .align_x(Alignment::Center);

    centered(content.into())
}

fn viewer<'a>(session: &'a ViewerSession, frame: &'a Handle) -> Element<'a, Message> {
    let viewport = stack![
        Image::new(frame.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Fill),
        canvas(ViewportInput)
            .width(Length::Fill)
            .height(Length::Fill),
    ];

    let header = row![
        text(format!("3D Model Viewer - {}", session.name())).size(18),
        iced::widget::horizontal_space(),
        button("Close").on_press(Message::CloseViewer),
    ]
    .align_y(Alignment::Center);

    column![
        header,
        text("Drag to rotate, shift or middle drag to pan, wheel or right drag to zoom").size(12),
        viewport,
    ]
    .spacing(8)
    .padding(12)
    .into()
}

fn centered(content: Element<'_, Message>) -> Element<'_, Message> {
    container(container(content).padding(20).style(container::rounded_box))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
