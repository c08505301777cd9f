//! File inspection and path utilities.
//!
//! - Image detection by extension and by magic bytes
//! - Extension recovery for files that arrive without one
//! - Absolute path, `file://` URI and size helpers

mod file_type;
mod paths;

pub use file_type::{
    classify_file, detect_extension_by_magic, detect_format, is_image_by_extension,
    is_valid_image_file, FileClassification, MagicFormat, IMAGE_EXTENSIONS,
};
pub use paths::{
    absolute_path, file_size_mb, normalize_absolute_path, relative_to_root, to_file_uri,
};
