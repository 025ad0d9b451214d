//! Markdown rendering with `pulldown-cmark`.
//!
//! GitHub-flavoured extensions (tables, strikethrough, task lists) are on.
//! Raw HTML in the source is rendered as escaped text, so a markdown file can
//! never inject structural markup into the site.

use super::backend::{AdapterError, MarkdownRenderer};
use pulldown_cmark::{Event, Options, Parser, html};

#[derive(Debug, Clone, Copy, Default)]
pub struct PulldownMarkdown;

impl MarkdownRenderer for PulldownMarkdown {
    fn render(&self, source: &str) -> Result<String, AdapterError> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(source, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &str) -> String {
        PulldownMarkdown.render(src).unwrap()
    }

    #[test]
    fn converts_basic_markdown() {
        let html = render("# Title\n\nThis is **bold** and *italic*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn renders_gfm_tables() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>a</th>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render("hello <script>alert(1)</script>\n\n<div onclick=\"x\">block</div>\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<div onclick"));
    }

    #[test]
    fn text_special_characters_escaped() {
        let html = render("Fish & chips < 5");
        assert!(html.contains("Fish &amp; chips &lt; 5"));
    }
}
