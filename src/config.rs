//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged on top, so a config
//! file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [conversion]
//! split_pdf_pages = true           # One page per PDF page (false: first page only)
//! render_pdf_page_as_image = false # Embed a rendered image of each PDF page
//! ocr_language = "eng"             # Language code passed to the OCR engine
//! build_toc = true                 # Emit a table of contents
//!
//! [site]
//! title = "Generated Site"
//! description = "Built with docsite"
//! theme_color = "#0b0d12"
//!
//! [theme]
//! brand = "#6a8dff"                # Baked into the stylesheet at render time
//!
//! [export]
//! topology = "single"              # single | split | multi
//! pwa = false                      # Add manifest, icon and offline script
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Per-run conversion switches.
    pub conversion: Settings,
    /// Title, description and theme color of the generated site.
    pub site: SiteMetadata,
    /// Presentation values baked into the stylesheet.
    pub theme: Theme,
    /// Output topology and installable-app switch.
    pub export: ExportConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lang = &self.conversion.ocr_language;
        if lang.is_empty()
            || !lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "conversion.ocr_language must be a language code like \"eng\" or \"eng+deu\", got {lang:?}"
            )));
        }
        if !is_hex_color(&self.theme.brand) {
            return Err(ConfigError::Validation(format!(
                "theme.brand must be a #rgb or #rrggbb color, got {:?}",
                self.theme.brand
            )));
        }
        if !is_hex_color(&self.site.theme_color) {
            return Err(ConfigError::Validation(format!(
                "site.theme_color must be a #rgb or #rrggbb color, got {:?}",
                self.site.theme_color
            )));
        }
        Ok(())
    }
}

/// Conversion settings, replaced wholesale before each run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Produce one page per PDF page. When false only the first page is used.
    pub split_pdf_pages: bool,
    /// Rasterize each PDF page and embed it below the extracted text.
    pub render_pdf_page_as_image: bool,
    /// Language code handed to the OCR engine.
    pub ocr_language: String,
    /// Emit a table of contents in rendered output.
    pub build_toc: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            split_pdf_pages: true,
            render_pdf_page_as_image: false,
            ocr_language: "eng".to_string(),
            build_toc: true,
        }
    }
}

/// Free-form site metadata, independent of page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMetadata {
    pub title: String,
    pub description: String,
    pub theme_color: String,
}

impl Default for SiteMetadata {
    fn default() -> Self {
        Self {
            title: "Generated Site".to_string(),
            description: "Built with docsite".to_string(),
            theme_color: "#0b0d12".to_string(),
        }
    }
}

/// Presentation context read at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    /// Brand color, exposed to the stylesheet as `--brand`.
    pub brand: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            brand: "#6a8dff".to_string(),
        }
    }
}

/// Output packaging shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// One self-contained document with inline stylesheet and script.
    #[default]
    Single,
    /// One document plus separate `styles.css` and `script.js`.
    Split,
    /// An index document plus one document per page under `pages/`.
    Multi,
}

/// Export settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub topology: Topology,
    /// Add a web manifest, icon and offline script to the export.
    pub pwa: bool,
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parse a `#rgb` / `#rrggbb` color into RGB components.
///
/// Returns `None` for anything else.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    if !is_hex_color(value) {
        return None;
    }
    let hex = &value[1..];
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    if hex.len() == 3 {
        let mut rgb = [0u8; 3];
        for (i, c) in hex.chars().enumerate() {
            let v = channel(&c.to_string())?;
            rgb[i] = v * 17;
        }
        Some(rgb)
    } else {
        Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?])
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, on top of the
/// stock defaults.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docsite configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Conversion
# ---------------------------------------------------------------------------
[conversion]
# One site page per PDF page. When false, only the first page of each PDF
# is converted.
split_pdf_pages = true

# Rasterize each PDF page and embed the image below its extracted text.
render_pdf_page_as_image = false

# Language code handed to the OCR engine for images ("eng", "deu", "eng+fra").
ocr_language = "eng"

# Emit a table of contents linking every page.
build_toc = true

# ---------------------------------------------------------------------------
# Site metadata
# ---------------------------------------------------------------------------
[site]
title = "Generated Site"
description = "Built with docsite"
# Used for <meta name="theme-color"> and the web manifest.
theme_color = "#0b0d12"

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
# Brand color exposed to the stylesheet as --brand, and the app icon fill.
brand = "#6a8dff"

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# single: one self-contained index.html
# split:  index.html + styles.css + script.js
# multi:  index.html + pages/page-N.html + shared styles.css/script.js
topology = "single"

# Add manifest.webmanifest, icons/icon-512.png and sw.js.
pwa = false
"##
}
