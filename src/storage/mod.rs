//! Storage module - flat file stores for uploads and generated outputs

pub mod file;
pub mod filename;

pub use file::{detect_image_format, FileStore};
pub use filename::{allowed_file, sanitize_filename};
