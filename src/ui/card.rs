use iced::widget::image::Handle;
use iced::widget::{button, column, container, mouse_area, row, text, Image};
use iced::{mouse, Alignment, Element, Length};

use crate::render::{preview, RenderSettings};
use crate::state::data::ModelRecord;
use crate::Message;

/// Thumbnail edge length on screen
const PREVIEW_SIDE: f32 = 256.0;

/// What a card shows in place of the mesh
#[derive(Debug, Clone)]
pub enum Preview {
    Ready(Handle),
    Failed(String),
}

/// Render a card thumbnail for `model` and cache it as `previews/<id>.png`.
///
/// The PNG is write-only: the gallery always renders from the mesh, so a
/// failed write only costs the file on disk.
pub fn build_preview(model: &ModelRecord, settings: &RenderSettings) -> Preview {
    match preview::render_preview(&model.file_path, settings) {
        Ok(image) => {
            if let Err(e) = preview::save_preview(&image, &model.preview_path) {
                log::warn!("Could not write preview for model {}: {}", model.id, e);
            }
            Preview::Ready(to_handle(image))
        }
        Err(e) => {
            log::warn!("No preview for model {}: {}", model.id, e);
            Preview::Failed(e.to_string())
        }
    }
}

/// Hand an RGBA buffer to iced
pub fn to_handle(image: ::image::RgbaImage) -> Handle {
    let (width, height) = image.dimensions();
    Handle::from_rgba(width, height, image.into_raw())
}

pub fn view<'a>(model: &'a ModelRecord, preview: &'a Preview) -> Element<'a, Message> {
    let thumbnail: Element<'a, Message> = match preview {
        Preview::Ready(handle) => Image::new(handle.clone())
            .width(Length::Fixed(PREVIEW_SIDE))
            .height(Length::Fixed(PREVIEW_SIDE))
            .into(),
        Preview::Failed(reason) => container(text(reason).size(13))
            .width(Length::Fixed(PREVIEW_SIDE))
            .height(Length::Fixed(PREVIEW_SIDE))
            .center_x(Length::Fixed(PREVIEW_SIDE))
            .center_y(Length::Fixed(PREVIEW_SIDE))
            .into(),
    };

    let thumbnail = mouse_area(thumbnail)
        .on_press(Message::OpenViewer(model.id.clone()))
        .interaction(mouse::Interaction::Pointer);

    let info = column![
        text(format!("Name: {}", model.name)),
        text(format!("Upload Date: {}", model.upload_day())),
        text(format!("Tags: {}", model.joined_tags(", "))),
    ]
    .spacing(2);

    let buttons = row![
        button("Copy to Clipboard").on_press(Message::CopyToClipboard(model.id.clone())),
        button("Delete")
            .style(button::danger)
            .on_press(Message::RequestDelete(model.id.clone())),
        button("Edit Tags").on_press(Message::EditTags(model.id.clone())),
    ]
    .spacing(6);

    container(
        column![thumbnail, info, buttons]
            .spacing(8)
            .align_x(Alignment::Start),
    )
    .padding(8)
    .style(container::rounded_box)
    .into()
}
