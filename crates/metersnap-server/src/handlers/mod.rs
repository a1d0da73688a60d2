//! HTTP handlers: thin adapters between axum extractors and `ReadingService`.

pub mod images;
pub mod readings;

pub use images::get_image;
pub use readings::{confirm_reading, list_readings, submit_reading};
