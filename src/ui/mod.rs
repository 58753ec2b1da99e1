/// User interface module
///
/// - Gallery screen layout (grid.rs)
/// - Display references for stored images (display.rs)

pub mod display;
pub mod grid;
