//! Export: assemble a site bundle and hand it to a packager.
//!
//! [`assemble`] renders the chosen topology and collects every output file
//! into an in-memory [`Bundle`]. A [`Packager`] then decides where the bundle
//! goes; [`DirectoryPackager`] writes it out as a directory tree.
//!
//! ## Bundle layout
//!
//! ```text
//! index.html
//! styles.css               (split, multi)
//! script.js                (split, multi)
//! pages/page-N.html        (multi)
//! manifest.webmanifest     (pwa)
//! sw.js                    (pwa)
//! icons/icon-512.png       (pwa)
//! ```

use crate::config::Topology;
use crate::pwa::{self, ICON_PATH, ICON_SIZE, PwaError};
use crate::render::{RenderContext, render};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("nothing to export: convert some files first")]
    NothingToExport,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Pwa(#[from] PwaError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub topology: Topology,
    /// Add the web manifest, app icon and offline script.
    pub pwa: bool,
}

/// One output file, with a `/`-separated path relative to the bundle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub path: String,
    pub contents: Vec<u8>,
}

/// All files of one export, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    pub files: Vec<BundleFile>,
}

impl Bundle {
    fn add(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.push(BundleFile {
            path: path.into(),
            contents: contents.into(),
        });
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn get(&self, path: &str) -> Option<&BundleFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Total size of all files in bytes.
    pub fn size(&self) -> u64 {
        self.files.iter().map(|f| f.contents.len() as u64).sum()
    }
}

/// Render and collect every file of an export.
///
/// Fails with [`ExportError::NothingToExport`] when there are no pages.
pub fn assemble(ctx: &RenderContext<'_>, options: ExportOptions) -> Result<Bundle, ExportError> {
    if ctx.pages.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let ctx = RenderContext {
        pwa: options.pwa,
        ..*ctx
    };
    let site = render(&ctx, options.topology);

    let mut bundle = Bundle::default();
    for document in site.documents {
        bundle.add(document.path, document.markup);
    }
    if let Some(css) = site.stylesheet {
        bundle.add("styles.css", css);
    }
    if let Some(js) = site.script {
        bundle.add("script.js", js);
    }

    if options.pwa {
        let manifest = serde_json::to_string_pretty(&pwa::manifest(ctx.site))?;
        bundle.add("manifest.webmanifest", manifest);
        bundle.add(ICON_PATH, pwa::icon_png(&ctx.theme.brand, ICON_SIZE)?);

        let precache: Vec<String> = std::iter::once("./".to_string())
            .chain(bundle.paths().map(|p| format!("./{p}")))
            .collect();
        bundle.add("sw.js", pwa::service_worker(&precache)?);
    }

    debug!(
        "Assembled {} files ({} bytes) as {:?}",
        bundle.files.len(),
        bundle.size(),
        options.topology
    );
    Ok(bundle)
}

/// Delivers a bundle somewhere.
pub trait Packager {
    /// Package the bundle and return where it ended up.
    fn package(&self, bundle: &Bundle) -> Result<PathBuf, ExportError>;
}

/// Writes a bundle as a directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryPackager {
    root: PathBuf,
}

impl DirectoryPackager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Packager for DirectoryPackager {
    fn package(&self, bundle: &Bundle) -> Result<PathBuf, ExportError> {
        for file in &bundle.files {
            let dest = self.root.join(&file.path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, &file.contents)?;
        }
        info!(
            "Wrote {} files to {}",
            bundle.files.len(),
            self.root.display()
        );
        Ok(self.root.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, SiteMetadata, Theme};
    use crate::test_helpers::session_with_pages;
    use crate::types::Page;
    use tempfile::TempDir;

    fn ctx<'a>(
        pages: &'a [Page],
        settings: &'a Settings,
        site: &'a SiteMetadata,
        theme: &'a Theme,
    ) -> RenderContext<'a> {
        RenderContext {
            pages,
            settings,
            site,
            theme,
            pwa: false,
        }
    }

    fn with_bundle(pages: &[(&str, &str)], options: ExportOptions, check: impl FnOnce(Result<Bundle, ExportError>)) {
        let session = session_with_pages(pages);
        let (settings, site, theme) = (Settings::default(), SiteMetadata::default(), Theme::default());
        check(assemble(&ctx(session.pages(), &settings, &site, &theme), options));
    }

    fn paths(bundle: &Bundle) -> Vec<&str> {
        bundle.paths().collect()
    }

    #[test]
    fn empty_store_is_rejected() {
        with_bundle(&[], ExportOptions::default(), |result| {
            assert!(matches!(result, Err(ExportError::NothingToExport)));
        });
    }

    #[test]
    fn single_is_one_file() {
        with_bundle(&[("A", "<p>a</p>")], ExportOptions::default(), |result| {
            let bundle = result.unwrap();
            assert_eq!(paths(&bundle), ["index.html"]);
        });
    }

    #[test]
    fn split_adds_assets() {
        let options = ExportOptions {
            topology: Topology::Split,
            pwa: false,
        };
        with_bundle(&[("A", "<p>a</p>")], options, |result| {
            let bundle = result.unwrap();
            assert_eq!(paths(&bundle), ["index.html", "styles.css", "script.js"]);
        });
    }

    #[test]
    fn multi_has_page_documents() {
        let options = ExportOptions {
            topology: Topology::Multi,
            pwa: false,
        };
        with_bundle(&[("A", "<p>a</p>"), ("B", "<p>b</p>")], options, |result| {
            let bundle = result.unwrap();
            assert_eq!(
                paths(&bundle),
                [
                    "index.html",
                    "pages/page-1.html",
                    "pages/page-2.html",
                    "styles.css",
                    "script.js"
                ]
            );
        });
    }

    #[test]
    fn pwa_adds_manifest_icon_and_worker() {
        let options = ExportOptions {
            topology: Topology::Split,
            pwa: true,
        };
        with_bundle(&[("A", "<p>a</p>")], options, |result| {
            let bundle = result.unwrap();
            assert_eq!(
                paths(&bundle),
                [
                    "index.html",
                    "styles.css",
                    "script.js",
                    "manifest.webmanifest",
                    "icons/icon-512.png",
                    "sw.js"
                ]
            );

            let manifest = &bundle.get("manifest.webmanifest").unwrap().contents;
            let manifest: serde_json::Value = serde_json::from_slice(manifest).unwrap();
            assert_eq!(manifest["display"], "standalone");
            // Pretty-printed
            assert!(std::str::from_utf8(&bundle.get("manifest.webmanifest").unwrap().contents)
                .unwrap()
                .contains("\n  \"name\""));

            let sw = String::from_utf8(bundle.get("sw.js").unwrap().contents.clone()).unwrap();
            assert!(sw.contains(r#""./","./index.html","./styles.css","./script.js","./manifest.webmanifest","./icons/icon-512.png""#));

            let index = String::from_utf8(bundle.get("index.html").unwrap().contents.clone()).unwrap();
            assert!(index.contains("manifest.webmanifest"));
        });
    }

    #[test]
    fn directory_packager_writes_tree() {
        let tmp = TempDir::new().unwrap();
        let options = ExportOptions {
            topology: Topology::Multi,
            pwa: true,
        };
        with_bundle(&[("A", "<p>a</p>")], options, |result| {
            let bundle = result.unwrap();
            let out = tmp.path().join("site");
            let written = DirectoryPackager::new(&out).package(&bundle).unwrap();
            assert_eq!(written, out);
            for path in bundle.paths() {
                assert!(out.join(path).is_file(), "{path} missing");
            }
            let page = fs::read_to_string(out.join("pages/page-1.html")).unwrap();
            assert!(page.contains("<p>a</p>"));
        });
    }
}
