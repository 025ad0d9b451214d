//! Site assembly: pages and metadata → HTML documents.
//!
//! Every page becomes a `<section id="p-{i}" class="page">` holding its body
//! markup verbatim. When the table of contents is enabled, an
//! `<aside class="site-toc">` lists every page title in reading order.
//!
//! ## Topologies
//!
//! ```text
//! single   index.html                       (stylesheet and script inline)
//! split    index.html styles.css script.js
//! multi    index.html styles.css script.js
//!          pages/page-1.html ... pages/page-N.html
//! ```
//!
//! In the multi topology the index carries the table of contents (linking the
//! page documents) and the first page only; each page document carries one
//! page and links the shared assets one directory up.
//!
//! The stylesheet is generated per render with the theme's brand color as
//! `--brand`. The script smooth-scrolls in-page TOC links and highlights the
//! link of the section currently in view; links to other documents are left
//! alone.

use crate::config::{Settings, SiteMetadata, Theme, Topology};
use crate::types::Page;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const BASE_CSS: &str = r#"*{box-sizing:border-box}
html,body{margin:0}
body{font-family:Inter,system-ui,Arial,sans-serif;background:#0b0d12;color:#e9eef8}
a{color:#9ec1ff}
main{max-width:1100px;margin:24px auto;padding:0 16px}
.page{background:rgba(255,255,255,.02);padding:18px;border-radius:12px;margin-bottom:18px;border:1px solid rgba(255,255,255,.06)}
img{max-width:100%;height:auto;border-radius:8px;border:1px solid rgba(255,255,255,.06)}
pre{white-space:pre-wrap;background:rgba(255,255,255,.04);padding:12px;border-radius:8px;border:1px solid rgba(255,255,255,.06)}
table{width:100%;border-collapse:collapse;overflow:auto;display:block}
th,td{padding:8px 10px;border-bottom:1px solid rgba(255,255,255,.08)}
.site{display:grid;grid-template-columns:260px 1fr;gap:18px}
@media (max-width: 900px){.site{grid-template-columns:1fr}}
.site-toc{position:sticky;top:16px;height:fit-content;background:rgba(255,255,255,.02);border:1px solid rgba(255,255,255,.06);border-radius:12px;padding:10px}
.site-toc ul{list-style:none;margin:0;padding:0}
.site-toc a{display:block;padding:8px;border-radius:8px;color:#e9eef8;text-decoration:none}
.site-toc a.active,.site-toc a:hover{background:rgba(255,255,255,.06);border-left:3px solid var(--brand)}
"#;

/// Navigation script shared by every topology.
pub const SCRIPT: &str = r##"(()=>{"use strict";
const tocLinks=[...document.querySelectorAll(".site-toc a")];
tocLinks.forEach(a=>{const href=a.getAttribute("href")||"";if(!href.startsWith("#"))return;a.addEventListener("click",e=>{e.preventDefault();document.getElementById(href.slice(1))?.scrollIntoView({behavior:"smooth",block:"start"});});});
const obs=new IntersectionObserver(entries=>{entries.forEach(en=>{if(en.isIntersecting){const id=en.target.id;tocLinks.forEach(a=>a.classList.toggle("active",a.getAttribute("href")==="#"+id));}})},{rootMargin:"-40% 0px -55% 0px"});
document.querySelectorAll(".page").forEach(p=>obs.observe(p));
})();
"##;

/// Everything a render needs. Borrowed, so rendering never mutates state.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub pages: &'a [Page],
    pub settings: &'a Settings,
    pub site: &'a SiteMetadata,
    pub theme: &'a Theme,
    /// Link the web manifest and register the offline script.
    pub pwa: bool,
}

/// One rendered HTML document and its path relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub markup: String,
}

/// Output of a render: documents plus any external assets they link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteArtifacts {
    pub documents: Vec<Document>,
    pub stylesheet: Option<String>,
    pub script: Option<String>,
}

/// The site stylesheet with the theme's brand color baked in.
pub fn stylesheet(theme: &Theme) -> String {
    format!(":root{{--brand:{}}}\n{}", theme.brand, BASE_CSS)
}

/// Render the site in the given topology.
pub fn render(ctx: &RenderContext<'_>, topology: Topology) -> SiteArtifacts {
    match topology {
        Topology::Single => SiteArtifacts {
            documents: vec![Document {
                path: "index.html".to_string(),
                markup: render_full(ctx, &Assets::Inline(stylesheet(ctx.theme))).into_string(),
            }],
            stylesheet: None,
            script: None,
        },
        Topology::Split => SiteArtifacts {
            documents: vec![Document {
                path: "index.html".to_string(),
                markup: render_full(ctx, &Assets::Linked("")).into_string(),
            }],
            stylesheet: Some(stylesheet(ctx.theme)),
            script: Some(SCRIPT.to_string()),
        },
        Topology::Multi => {
            let mut documents = vec![Document {
                path: "index.html".to_string(),
                markup: render_multi_index(ctx).into_string(),
            }];
            documents.extend(ctx.pages.iter().enumerate().map(|(i, page)| Document {
                path: page_document_path(i),
                markup: render_page_document(ctx, i, page).into_string(),
            }));
            SiteArtifacts {
                documents,
                stylesheet: Some(stylesheet(ctx.theme)),
                script: Some(SCRIPT.to_string()),
            }
        }
    }
}

/// Self-contained markup for previewing the current pages.
pub fn render_preview(ctx: &RenderContext<'_>) -> String {
    render_full(ctx, &Assets::Inline(stylesheet(ctx.theme))).into_string()
}

/// Path of the document for the page at `ordinal` in the multi topology.
pub fn page_document_path(ordinal: usize) -> String {
    format!("pages/page-{}.html", ordinal + 1)
}

// ============================================================================
// Documents
// ============================================================================

/// How a document gets its stylesheet and script.
enum Assets {
    /// Embedded in the document.
    Inline(String),
    /// Linked, relative to the given prefix (`""` or `"../"`).
    Linked(&'static str),
}

impl Assets {
    fn root(&self) -> &'static str {
        match self {
            Assets::Inline(_) => "",
            Assets::Linked(root) => root,
        }
    }
}

fn base_document(ctx: &RenderContext<'_>, title: &str, assets: &Assets, content: Markup) -> Markup {
    let root = assets.root();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width,initial-scale=1";
                meta name="description" content=(ctx.site.description);
                meta name="theme-color" content=(ctx.site.theme_color);
                title { (title) }
                @match assets {
                    Assets::Inline(css) => { style { (PreEscaped(css)) } },
                    Assets::Linked(_) => { link rel="stylesheet" href={ (root) "styles.css" }; },
                }
                @if ctx.pwa {
                    link rel="manifest" href={ (root) "manifest.webmanifest" };
                }
            }
            body {
                main.site {
                    (content)
                }
                @match assets {
                    Assets::Inline(_) => { script { (PreEscaped(SCRIPT)) } },
                    Assets::Linked(_) => { script src={ (root) "script.js" } {} },
                }
                @if ctx.pwa {
                    script { (PreEscaped(sw_registration(root))) }
                }
            }
        }
    }
}

fn sw_registration(root: &str) -> String {
    format!(
        "if(\"serviceWorker\" in navigator){{navigator.serviceWorker.register(\"{root}sw.js\");}}"
    )
}

/// Every page in one document, TOC linking in-page anchors.
fn render_full(ctx: &RenderContext<'_>, assets: &Assets) -> Markup {
    let content = html! {
        @if ctx.settings.build_toc {
            (toc(ctx.pages, |i| format!("#p-{i}")))
        }
        div.site-content {
            @for (i, page) in ctx.pages.iter().enumerate() {
                (page_section(i, &page.body))
            }
        }
    };
    base_document(ctx, &ctx.site.title, assets, content)
}

/// Multi-topology index: TOC linking page documents, first page only.
fn render_multi_index(ctx: &RenderContext<'_>) -> Markup {
    let content = html! {
        @if ctx.settings.build_toc {
            (toc(ctx.pages, page_document_path))
        }
        div.site-content {
            @match ctx.pages.first() {
                Some(first) => { (page_section(0, &first.body)) },
                None => { (page_section(0, "<article><h1>Welcome</h1></article>")) },
            }
        }
    };
    base_document(ctx, &ctx.site.title, &Assets::Linked(""), content)
}

fn render_page_document(ctx: &RenderContext<'_>, ordinal: usize, page: &Page) -> Markup {
    let content = html! {
        div.site-content {
            (page_section(ordinal, &page.body))
        }
    };
    base_document(ctx, &page.title, &Assets::Linked("../"), content)
}

// ============================================================================
// Components
// ============================================================================

fn toc(pages: &[Page], href: impl Fn(usize) -> String) -> Markup {
    html! {
        aside.site-toc {
            ul {
                @for (i, page) in pages.iter().enumerate() {
                    li { a href=(href(i)) { (page.title) } }
                }
            }
        }
    }
}

fn page_section(ordinal: usize, body: &str) -> Markup {
    html! {
        section id={ "p-" (ordinal) } class="page" {
            (PreEscaped(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::session_with_pages;

    struct Fixture {
        pages: Vec<Page>,
        settings: Settings,
        site: SiteMetadata,
        theme: Theme,
    }

    impl Fixture {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: session_with_pages(pages).pages().to_vec(),
                settings: Settings::default(),
                site: SiteMetadata::default(),
                theme: Theme::default(),
            }
        }

        fn ctx(&self) -> RenderContext<'_> {
            RenderContext {
                pages: &self.pages,
                settings: &self.settings,
                site: &self.site,
                theme: &self.theme,
                pwa: false,
            }
        }
    }

    fn two_pages() -> Fixture {
        Fixture::new(&[("First", "<p>one</p>"), ("Second", "<p>two</p>")])
    }

    #[test]
    fn single_is_self_contained() {
        let fx = two_pages();
        let site = render(&fx.ctx(), Topology::Single);
        assert_eq!(site.documents.len(), 1);
        assert!(site.stylesheet.is_none());
        assert!(site.script.is_none());

        let html = &site.documents[0].markup;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>:root{--brand:#6a8dff}"));
        assert!(html.contains("IntersectionObserver"));
        assert!(!html.contains("styles.css"));
        assert!(html.contains("<section id=\"p-0\" class=\"page\"><p>one</p></section>"));
        assert!(html.contains("<section id=\"p-1\" class=\"page\"><p>two</p></section>"));
    }

    #[test]
    fn head_carries_site_metadata() {
        let mut fx = two_pages();
        fx.site.title = "Field Notes".into();
        fx.site.description = "Notes from the field".into();
        let html = render_preview(&fx.ctx());
        assert!(html.contains("<meta charset=\"utf-8\">"));
        assert!(html.contains("name=\"viewport\""));
        assert!(html.contains("<meta name=\"description\" content=\"Notes from the field\">"));
        assert!(html.contains("<meta name=\"theme-color\" content=\"#0b0d12\">"));
        assert!(html.contains("<title>Field Notes</title>"));
    }

    #[test]
    fn toc_lists_pages_in_order() {
        let fx = two_pages();
        let html = render_preview(&fx.ctx());
        assert!(html.contains(
            "<aside class=\"site-toc\"><ul><li><a href=\"#p-0\">First</a></li><li><a href=\"#p-1\">Second</a></li></ul></aside>"
        ));
    }

    #[test]
    fn toc_omitted_when_disabled() {
        let mut fx = two_pages();
        fx.settings.build_toc = false;
        let html = render_preview(&fx.ctx());
        assert!(!html.contains("site-toc\">"));
        assert!(html.contains("id=\"p-1\""));
    }

    #[test]
    fn split_links_assets() {
        let fx = two_pages();
        let site = render(&fx.ctx(), Topology::Split);
        let html = &site.documents[0].markup;
        assert!(html.contains("<link rel=\"stylesheet\" href=\"styles.css\">"));
        assert!(html.contains("<script src=\"script.js\"></script>"));
        assert!(!html.contains("<style>"));
        assert!(site.stylesheet.unwrap().contains("--brand:#6a8dff"));
        assert_eq!(site.script.as_deref(), Some(SCRIPT));
    }

    #[test]
    fn brand_color_from_theme() {
        let mut fx = two_pages();
        fx.theme.brand = "#ff0000".into();
        let site = render(&fx.ctx(), Topology::Split);
        assert!(site.stylesheet.unwrap().starts_with(":root{--brand:#ff0000}"));
    }

    #[test]
    fn multi_has_index_plus_one_document_per_page() {
        let fx = Fixture::new(&[("A", "<p>a</p>"), ("B", "<p>b</p>"), ("C", "<p>c</p>")]);
        let site = render(&fx.ctx(), Topology::Multi);
        let paths: Vec<&str> = site.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "index.html",
                "pages/page-1.html",
                "pages/page-2.html",
                "pages/page-3.html"
            ]
        );

        let index = &site.documents[0].markup;
        assert!(index.contains("<a href=\"pages/page-2.html\">B</a>"));
        assert!(index.contains("<p>a</p>"));
        assert!(!index.contains("<p>b</p>"));

        let page = &site.documents[2].markup;
        assert!(page.contains("<title>B</title>"));
        assert!(page.contains("href=\"../styles.css\""));
        assert!(page.contains("src=\"../script.js\""));
        assert!(page.contains("<section id=\"p-1\" class=\"page\"><p>b</p></section>"));
        assert!(!page.contains("site-toc\">"));
    }

    #[test]
    fn multi_empty_store_gets_placeholder() {
        let fx = Fixture::new(&[]);
        let site = render(&fx.ctx(), Topology::Multi);
        assert_eq!(site.documents.len(), 1);
        assert!(site.documents[0]
            .markup
            .contains("<article><h1>Welcome</h1></article>"));
    }

    #[test]
    fn user_text_in_titles_and_metadata_is_escaped() {
        let mut fx = Fixture::new(&[("<b>Tom & \"Jerry\"</b>", "<p>ok</p>")]);
        fx.site.title = "A < B".into();
        fx.site.description = "say \"hi\"".into();
        let html = render_preview(&fx.ctx());
        assert!(html.contains("&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"));
        assert!(html.contains("<title>A &lt; B</title>"));
        assert!(html.contains("content=\"say &quot;hi&quot;\""));
        assert!(!html.contains("<b>Tom"));
    }

    #[test]
    fn pwa_links_manifest_and_registers_worker() {
        let fx = two_pages();
        let mut ctx = fx.ctx();
        ctx.pwa = true;
        let site = render(&ctx, Topology::Multi);
        let index = &site.documents[0].markup;
        assert!(index.contains("<link rel=\"manifest\" href=\"manifest.webmanifest\">"));
        assert!(index.contains("register(\"sw.js\")"));
        let page = &site.documents[1].markup;
        assert!(page.contains("href=\"../manifest.webmanifest\""));
        assert!(page.contains("register(\"../sw.js\")"));
    }

    #[test]
    fn no_pwa_markup_by_default() {
        let fx = two_pages();
        let html = render_preview(&fx.ctx());
        assert!(!html.contains("manifest"));
        assert!(!html.contains("serviceWorker"));
    }

    #[test]
    fn script_only_intercepts_in_page_anchors() {
        assert!(SCRIPT.contains("if(!href.startsWith(\"#\"))return;"));
        assert!(SCRIPT.contains("rootMargin:\"-40% 0px -55% 0px\""));
    }
}
