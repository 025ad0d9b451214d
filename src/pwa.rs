//! Installable-app artifacts: web manifest, app icon and offline script.
//!
//! These are only added to an export when the PWA option is on. The icon is
//! drawn rather than rendered from a font: a brand-colored square with a
//! white "A" built from three thick strokes.

use crate::config::{SiteMetadata, parse_hex_color};
use image::{ImageFormat, Rgb, RgbImage};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use thiserror::Error;

/// Short name used for the installed app and its cache.
pub const APP_NAME: &str = "docsite";

/// Side length of the exported icon, in pixels.
pub const ICON_SIZE: u32 = 512;

pub const ICON_PATH: &str = "icons/icon-512.png";

#[derive(Error, Debug)]
pub enum PwaError {
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("icon encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub start_url: String,
    pub background_color: String,
    pub theme_color: String,
    pub display: String,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

/// Build the web manifest for a site.
pub fn manifest(site: &SiteMetadata) -> WebManifest {
    let name = if site.title.is_empty() {
        APP_NAME.to_string()
    } else {
        site.title.clone()
    };
    WebManifest {
        name,
        short_name: APP_NAME.to_string(),
        start_url: ".".to_string(),
        background_color: site.theme_color.clone(),
        theme_color: site.theme_color.clone(),
        display: "standalone".to_string(),
        icons: vec![ManifestIcon {
            src: ICON_PATH.to_string(),
            sizes: format!("{ICON_SIZE}x{ICON_SIZE}"),
            media_type: "image/png".to_string(),
        }],
    }
}

/// Draw the app icon and encode it as PNG.
pub fn icon_png(brand: &str, size: u32) -> Result<Vec<u8>, PwaError> {
    let [r, g, b] = parse_hex_color(brand).ok_or_else(|| PwaError::InvalidColor(brand.to_string()))?;
    let s = size as f32;
    // Apex, feet and crossbar of the glyph, in pixels.
    let strokes = [
        ((0.50 * s, 0.18 * s), (0.26 * s, 0.82 * s)),
        ((0.50 * s, 0.18 * s), (0.74 * s, 0.82 * s)),
        ((0.36 * s, 0.58 * s), (0.64 * s, 0.58 * s)),
    ];
    let half_width = 0.05 * s;

    let img = RgbImage::from_fn(size, size, |x, y| {
        let p = (x as f32 + 0.5, y as f32 + 0.5);
        if strokes
            .iter()
            .any(|&(a, b)| distance_to_segment(p, a, b) <= half_width)
        {
            Rgb([255, 255, 255])
        } else {
            Rgb([r, g, b])
        }
    });

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Name of the offline cache for a precache list.
///
/// Changes whenever the list does, so a new export never serves stale files.
pub fn cache_name(precache: &[String]) -> String {
    let mut hasher = Sha256::new();
    for entry in precache {
        hasher.update(entry.as_bytes());
        hasher.update([b'\n']);
    }
    let hex: String = hasher
        .finalize()
        .iter()
        .take(4)
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("{APP_NAME}-{hex}")
}

/// Offline script: precache `precache` on install, serve cache-first.
pub fn service_worker(precache: &[String]) -> Result<String, PwaError> {
    let cache = serde_json::to_string(&cache_name(precache))?;
    let files = serde_json::to_string(precache)?;
    Ok(format!(
        "const CACHE={cache};\n\
         const PRECACHE={files};\n\
         self.addEventListener(\"install\",e=>{{self.skipWaiting();e.waitUntil(caches.open(CACHE).then(c=>c.addAll(PRECACHE)));}});\n\
         self.addEventListener(\"activate\",e=>{{e.waitUntil(caches.keys().then(keys=>Promise.all(keys.filter(k=>k!==CACHE).map(k=>caches.delete(k)))));}});\n\
         self.addEventListener(\"fetch\",e=>{{e.respondWith(caches.match(e.request).then(r=>r||fetch(e.request)));}});\n"
    ))
}
