//! Document assembly: wrap a Markdown-derived body into a full HTML page.
//!
//! The skeleton is fixed. Only three things vary: the escaped title, the
//! stylesheet (base CSS followed by the watermark rules, so generic
//! selectors in the base sheet cannot override the overlay) and the body.
//!
//! `body_html` is trusted: it is the output of the Markdown step and is
//! inserted as-is. Title, `lang` and watermark text are user-controlled and
//! always escaped. No scripts are ever emitted.

use super::watermark::build_watermark;
use crate::config::DEFAULT_LANG;

/// Assemble the document with the default `<html lang>`.
pub fn assemble_document(
    title: &str,
    body_html: &str,
    css_text: &str,
    watermark_text: Option<&str>,
) -> String {
    assemble_document_with_lang(DEFAULT_LANG, title, body_html, css_text, watermark_text)
}

/// Assemble a complete HTML document ready for the PDF renderer.
pub fn assemble_document_with_lang(
    lang: &str,
    title: &str,
    body_html: &str,
    css_text: &str,
    watermark_text: Option<&str>,
) -> String {
    let watermark = build_watermark(watermark_text);
    let lang = escape_html(lang);
    let title = escape_html(title);

    format!(
        r#"<!doctype html>
<html lang="{lang}">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{title}</title>
    <style>
{css_text}
{watermark_css}
    </style>
  </head>
  <body>
{overlay}    <main class="markdown-body">
{body_html}
    </main>
  </body>
</html>
"#,
        watermark_css = watermark.style_css,
        overlay = watermark.overlay_html,
    )
}

/// Escape text for HTML element content and double- or single-quoted
/// attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_of(doc: &str) -> &str {
        let start = doc.find("<title>").unwrap() + "<title>".len();
        let end = doc.find("</title>").unwrap();
        &doc[start..end]
    }

    #[test]
    fn escape_html_covers_special_chars() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("纯文本"), "纯文本");
    }

    #[test]
    fn title_is_escaped() {
        let doc = assemble_document("<script>x</script>", "<p>hi</p>", "", None);
        assert_eq!(title_of(&doc), "&lt;script&gt;x&lt;/script&gt;");
        assert!(!doc.contains("<script>"));
    }

    #[test]
    fn body_is_inserted_verbatim() {
        let body = "<h1 id=\"a\">A &amp; B</h1>\n<pre><code>x &lt; y</code></pre>";
        let doc = assemble_document("t", body, "", None);
        assert!(doc.contains(body));
        assert!(doc.contains("<main class=\"markdown-body\">"));
    }

    #[test]
    fn head_has_charset_and_viewport() {
        let doc = assemble_document("t", "", "", None);
        assert!(doc.starts_with("<!doctype html>"));
        assert!(doc.contains("<meta charset=\"UTF-8\" />"));
        assert!(doc.contains("name=\"viewport\""));
        assert!(doc.contains("<html lang=\"zh-CN\">"));
    }

    #[test]
    fn no_watermark_means_no_overlay_markup() {
        let doc = assemble_document("t", "<p>x</p>", "body{}", Some("  "));
        assert!(!doc.contains("md2pdf-watermark"));
    }

    #[test]
    fn base_css_precedes_watermark_rules() {
        let css = "body { color: red; }\n.md2pdf-watermark-item { color: blue; }";
        let doc = assemble_document("t", "", css, Some("SECRET"));
        let style_start = doc.find("<style>").unwrap();
        let base = doc.find("body { color: red; }").unwrap();
        let watermark_rule = doc.find("\n.md2pdf-watermark {").unwrap();
        let style_end = doc.find("</style>").unwrap();
        assert!(style_start < base && base < watermark_rule && watermark_rule < style_end);
    }

    #[test]
    fn overlay_precedes_main() {
        let doc = assemble_document("t", "<p>body</p>", "", Some("SECRET"));
        let overlay = doc.find("<div class=\"md2pdf-watermark\"").unwrap();
        let main = doc.find("<main").unwrap();
        let body = doc.find("<body>").unwrap();
        assert!(body < overlay && overlay < main);
    }

    #[test]
    fn watermark_text_is_escaped_in_document() {
        let doc = assemble_document("t", "", "", Some("<b>&"));
        assert!(doc.contains(">&lt;b&gt;&amp;</span>"));
        assert!(!doc.contains("<b>"));
    }

    #[test]
    fn lang_is_escaped() {
        let doc = assemble_document_with_lang("en\"><script>", "t", "", "", None);
        assert!(doc.contains("<html lang=\"en&quot;&gt;&lt;script&gt;\">"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let a = assemble_document("t", "<p>x</p>", "p{}", Some("W"));
        let b = assemble_document("t", "<p>x</p>", "p{}", Some("W"));
        assert_eq!(a, b);
    }
}
