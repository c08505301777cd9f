//! File type classification by extension and by magic bytes.
//!
//! The two classifiers are deliberately separate: listing code only needs the
//! cheap extension check, while delivery re-reads the file header so a
//! placeholder or truncated image is caught before it reaches a channel.

use crate::config::InspectConfig;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Extensions treated as images (lowercase, without dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Magic bytes for file format detection.
mod magic {
    pub const PNG: &[u8; 8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    pub const JPEG: &[u8; 2] = &[0xFF, 0xD8];
    pub const GIF87A: &[u8; 6] = b"GIF87a";
    pub const GIF89A: &[u8; 6] = b"GIF89a";
    /// RIFF container; bytes 8..12 carry the form type.
    pub const RIFF: &[u8; 4] = b"RIFF";
    pub const WEBP: &[u8; 4] = b"WEBP";
    pub const BMP: &[u8; 2] = b"BM";
    pub const PDF: &[u8; 4] = b"%PDF";
}

/// Formats recognized from a file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MagicFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Pdf,
}

impl MagicFormat {
    /// Canonical extension, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            MagicFormat::Png => ".png",
            MagicFormat::Jpeg => ".jpg",
            MagicFormat::Gif => ".gif",
            MagicFormat::Webp => ".webp",
            MagicFormat::Bmp => ".bmp",
            MagicFormat::Pdf => ".pdf",
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, MagicFormat::Pdf)
    }
}

/// Result of running every classifier over one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileClassification {
    pub is_image: bool,
    pub is_valid_image: bool,
    /// Extension recovered from magic bytes (with dot), or empty.
    pub detected_extension: String,
}

/// Detect a format from the start of a file.
pub fn detect_format(header: &[u8]) -> Option<MagicFormat> {
    if header.starts_with(magic::PNG) {
        return Some(MagicFormat::Png);
    }
    if header.starts_with(magic::JPEG) {
        return Some(MagicFormat::Jpeg);
    }
    if header.starts_with(magic::GIF87A) || header.starts_with(magic::GIF89A) {
        return Some(MagicFormat::Gif);
    }
    if header.len() >= 12 && &header[..4] == magic::RIFF && &header[8..12] == magic::WEBP {
        return Some(MagicFormat::Webp);
    }
    if header.starts_with(magic::BMP) {
        return Some(MagicFormat::Bmp);
    }
    if header.starts_with(magic::PDF) {
        return Some(MagicFormat::Pdf);
    }
    None
}

/// Read at most `limit` bytes from the start of a file.
fn read_header(path: &Path, limit: usize) -> io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(limit);
    File::open(path)?
        .take(limit as u64)
        .read_to_end(&mut header)?;
    Ok(header)
}

/// Whether the path has a common image extension (case-insensitive).
pub fn is_image_by_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Check the first 12 bytes against the PNG, JPEG, GIF, WEBP and BMP
/// signatures.
///
/// Files shorter than 12 bytes are rejected outright: nothing that small is a
/// usable image. Read errors count as invalid.
pub fn is_valid_image_file(path: impl AsRef<Path>) -> bool {
    match read_header(path.as_ref(), InspectConfig::IMAGE_HEADER_LEN) {
        Ok(header) if header.len() >= InspectConfig::IMAGE_HEADER_LEN => {
            detect_format(&header).is_some_and(|f| f.is_image())
        }
        _ => false,
    }
}

/// Guess an extension (with dot) from the first 16 bytes.
///
/// Returns an empty string for unknown content or unreadable files.
pub fn detect_extension_by_magic(path: impl AsRef<Path>) -> String {
    read_header(path.as_ref(), InspectConfig::MAGIC_HEADER_LEN)
        .ok()
        .and_then(|header| detect_format(&header))
        .map(|f| f.extension().to_string())
        .unwrap_or_default()
}

/// Run all classifiers on one path.
pub fn classify_file(path: impl AsRef<Path>) -> FileClassification {
    let path = path.as_ref();
    FileClassification {
        is_image: is_image_by_extension(path),
        is_valid_image: is_valid_image_file(path),
        detected_extension: detect_extension_by_magic(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = magic::PNG.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
        bytes
    }

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_is_image_by_extension() {
        assert!(is_image_by_extension("a/b/photo.JPG"));
        assert!(is_image_by_extension("x.webp"));
        assert!(!is_image_by_extension("report.pdf"));
        assert!(!is_image_by_extension("noext"));
        assert!(!is_image_by_extension(".png"));
    }

    #[test]
    fn test_detect_format_signatures() {
        assert_eq!(detect_format(&png_bytes()), Some(MagicFormat::Png));
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(MagicFormat::Jpeg));
        assert_eq!(detect_format(b"GIF89a......"), Some(MagicFormat::Gif));
        assert_eq!(detect_format(b"RIFF\x24\0\0\0WEBPVP8 "), Some(MagicFormat::Webp));
        assert_eq!(detect_format(b"RIFF\x24\0\0\0WAVEfmt "), None);
        assert_eq!(detect_format(b"BM6\0\0\0"), Some(MagicFormat::Bmp));
        assert_eq!(detect_format(b"%PDF-1.7\n"), Some(MagicFormat::Pdf));
        assert_eq!(detect_format(b"hello world"), None);
        assert_eq!(detect_format(&[]), None);
    }

    #[test]
    fn test_png_file_classifies_as_image() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "upload", &png_bytes());

        assert!(is_valid_image_file(&path));
        assert_eq!(detect_extension_by_magic(&path), ".png");

        let info = classify_file(&path);
        assert!(!info.is_image);
        assert!(info.is_valid_image);
        assert_eq!(info.detected_extension, ".png");
    }

    #[test]
    fn test_short_files_are_not_valid_images() {
        let dir = TempDir::new().unwrap();
        assert!(!is_valid_image_file(write(&dir, "empty.png", b"")));
        assert!(!is_valid_image_file(write(&dir, "two.jpg", &[0xFF, 0xD8])));
        assert!(!is_valid_image_file(write(&dir, "eleven.bmp", b"BM123456789")));
    }

    #[test]
    fn test_pdf_is_not_an_image() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "doc", b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        assert!(!is_valid_image_file(&path));
        assert_eq!(detect_extension_by_magic(&path), ".pdf");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.png");
        assert!(!is_valid_image_file(&path));
        assert_eq!(detect_extension_by_magic(&path), "");
        let info = classify_file(&path);
        assert!(info.is_image);
        assert!(!info.is_valid_image);
    }
}
