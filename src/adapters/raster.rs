//! Raster images as data URLs.
//!
//! Embedded images travel inside page markup as `data:` URLs so a page body
//! is self-contained. PNG is used for rendered PDF pages: it is lossless, so
//! small print stays legible.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Encode a rendered image as a PNG data URL.
pub fn png_data_url(img: &DynamicImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!("Encoded PNG → {} bytes", buf.len());
    Ok(data_url("image/png", &buf))
}

/// Wrap raw image bytes in a data URL.
///
/// The mime type is the declared `image/*` type when there is one, otherwise
/// sniffed from the bytes, otherwise guessed from the file name.
pub fn image_data_url(bytes: &[u8], declared_type: &str, name: &str) -> String {
    data_url(&image_mime_type(bytes, declared_type, name), bytes)
}

fn image_mime_type(bytes: &[u8], declared_type: &str, name: &str) -> String {
    if declared_type.starts_with("image/") {
        return declared_type.to_string();
    }
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }
    Path::new(name)
        .extension()
        .and_then(ImageFormat::from_extension)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
