//! Markdown Rendering
//!
//! Primary path converts markdown to HTML with pulldown-cmark. The fallback
//! path is plain text only: HTML-escaped with line breaks preserved, so
//! injected markup never executes. Both paths are deterministic.

use pulldown_cmark::{html::push_html, Options, Parser};

fn options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS
}

/// Convert markdown to HTML.
pub fn to_html(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::new();
    push_html(&mut out, parser);
    out
}

/// Fallback rendering when the markdown converter is unavailable:
/// escaped text with `\n` turned into `<br>`.
pub fn to_safe_text(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }
    escape_html(markdown).replace('\n', "<br>")
}

/// Render with the converter when `enabled`, otherwise the text fallback.
pub fn render(markdown: &str, enabled: bool) -> String {
    if enabled {
        to_html(markdown)
    } else {
        to_safe_text(markdown)
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html_renders_heading() {
        let html = to_html("# hi");
        assert_eq!(html.trim(), "<h1>hi</h1>");
    }

    #[test]
    fn test_to_html_empty_is_empty() {
        assert_eq!(to_html(""), "");
        assert_eq!(to_safe_text(""), "");
    }

    #[test]
    fn test_fallback_escapes_and_keeps_breaks() {
        let out = to_safe_text("a<b\nc & d");
        assert_eq!(out, "a&lt;b<br>c &amp; d");
    }

    #[test]
    fn test_fallback_never_executes_markup() {
        let out = to_safe_text("<script>alert(1)</script>");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let src = "# not rendered\n<img src=x>";
        assert_eq!(to_safe_text(src), to_safe_text(src));
    }

    #[test]
    fn test_render_switches_on_flag() {
        assert_eq!(render("# hi", true).trim(), "<h1>hi</h1>");
        assert_eq!(render("# hi", false), "# hi");
    }
}
