use iced::{window, Element, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod gallery;
mod state;
mod ui;

use config::GalleryConfig;
use gallery::GalleryController;
use state::data::ImageFile;
use state::library::Library;

/// Extensions offered by the file picker
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "tif", "tiff", "avif",
];

/// Main application state
struct ImageGallery {
    config: GalleryConfig,
    gallery: GalleryController<Library>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Choose image" button
    ChooseImage,
    /// The picked file has been read (None if cancelled or unreadable)
    FileRead(Option<ImageFile>),
    /// The window is about to close
    CloseRequested(window::Id),
}

impl ImageGallery {
    /// Create the application and mount the gallery on the catalog
    fn new() -> (Self, Task<Message>) {
        let config = GalleryConfig::default();

        let mut gallery = GalleryController::new();
        gallery.mount(Library::open(&config));

        (ImageGallery { config, gallery }, Task::none())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseImage => {
                // Show the native file picker; only the first file is ever used
                let picked = FileDialog::new()
                    .set_title("Select an image")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file();

                match picked {
                    Some(path) => Task::perform(read_image(path), Message::FileRead),
                    None => {
                        self.gallery.select_file(None);
                        Task::none()
                    }
                }
            }
            Message::FileRead(file) => {
                self.gallery.select_file(file);
                Task::none()
            }
            Message::CloseRequested(id) => {
                if let Some(library) = self.gallery.shutdown() {
                    if let Err(e) = library.close() {
                        tracing::error!("Failed to close catalog: {}", e);
                    }
                }
                window::close(id)
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        ui::grid::view(&self.gallery, &self.config)
    }

    fn subscription(&self) -> Subscription<Message> {
        window::close_requests().map(Message::CloseRequested)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

/// Read a picked file off the UI thread.
/// Unreadable or non-image files are logged and dropped.
async fn read_image(path: PathBuf) -> Option<ImageFile> {
    match ImageFile::from_path(&path).await {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::error!("Skipping {}: {}", path.display(), e);
            None
        }
    }
}

fn main() -> iced::Result {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("image_gallery=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    iced::application("Image Gallery", ImageGallery::update, ImageGallery::view)
        .theme(ImageGallery::theme)
        .subscription(ImageGallery::subscription)
        .window(window::Settings {
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .centered()
        .run_with(ImageGallery::new)
}
