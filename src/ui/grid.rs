/// Gallery screen layout
///
/// A heading, the picker button, and every stored image in a wrapping
/// grid. Each image is width-bounded, padded and framed.
use iced::widget::{button, column, container, scrollable, text, Column, Image};
use iced::{Border, Color, Element, Length, Padding, Theme};
use iced_aw::Wrap;

use crate::config::GalleryConfig;
use crate::gallery::{GalleryController, ViewState};
use crate::state::store::ImageStore;
use crate::ui::display::DisplayRef;
use crate::Message;

/// Border colour around each image (#ccc)
const BORDER_COLOR: Color = Color {
    r: 0.8,
    g: 0.8,
    b: 0.8,
    a: 1.0,
};

/// Build the gallery screen
pub fn view<'a, S: ImageStore>(
    gallery: &'a GalleryController<S>,
    config: &GalleryConfig,
) -> Element<'a, Message> {
    let tiles: Vec<Element<'a, Message>> = gallery
        .display()
        .iter()
        .map(|display_ref| tile(display_ref, config))
        .collect();

    let grid = Wrap::with_elements(tiles)
        .spacing(config.gap)
        .line_spacing(config.gap);

    let content: Column<Message> = column![
        text("Image Uploader").size(32),
        button("Choose image")
            .on_press(Message::ChooseImage)
            .padding(10),
        text(status_line(gallery.state(), gallery.records().len())).size(14),
        container(grid).padding(Padding {
            top: 20.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
        }),
    ]
    .spacing(10)
    .padding(config.page_padding);

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// One framed image
fn tile<'a>(display_ref: &DisplayRef, config: &GalleryConfig) -> Element<'a, Message> {
    container(Image::new(display_ref.handle().clone()))
        .max_width(config.max_display_width)
        .padding(config.image_padding)
        .style(framed)
        .into()
}

fn framed(_theme: &Theme) -> container::Style {
    container::Style {
        border: Border {
            color: BORDER_COLOR,
            width: 1.0,
            radius: 0.0.into(),
        },
        ..container::Style::default()
    }
}

/// Status text under the picker.
/// Storage errors only go to the log, so `Error` just shows the count.
pub fn status_line(state: ViewState, count: usize) -> String {
    match state {
        ViewState::Uninitialized => "Loading...".to_string(),
        ViewState::Inserting => "Saving...".to_string(),
        ViewState::Loaded | ViewState::Error => match count {
            1 => "1 image".to_string(),
            n => format!("{} images", n),
        },
    }
}
