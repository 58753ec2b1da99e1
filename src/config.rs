/// Application configuration
///
/// Everything has a sensible default; nothing is read from a config
/// file.

use std::path::PathBuf;

/// Directory name under the user's data directory
const APP_DIR: &str = "image-gallery";

/// Catalog file name
const DB_FILE: &str = "image_gallery.db";

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Location of the SQLite catalog
    pub db_path: PathBuf,
    /// Maximum width of a rendered image, in logical pixels
    pub max_display_width: f32,
    /// Padding between an image and its border
    pub image_padding: u16,
    /// Gap between images in the grid
    pub gap: f32,
    /// Padding around the whole page
    pub page_padding: u16,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_display_width: 200.0,
            image_padding: 5,
            gap: 10.0,
            page_padding: 20,
        }
    }
}

/// Get the path where the database should be stored
fn default_db_path() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push(APP_DIR);
    path.push(DB_FILE);
    path
}
