use ammonia::Builder;
use comrak::{markdown_to_html, Options};
use std::collections::HashSet;

/// Render article/page Markdown to sanitized HTML.
///
/// comrak parses GFM (tables, strikethrough, autolinks); ammonia strips
/// anything that could execute in the browser.
pub fn render_markdown(raw: &str) -> String {
    let html = markdown_to_html(raw, &markdown_options());
    content_sanitizer().clean(&html).to_string()
}

/// Plain-text preview of Markdown content, cut at a word boundary.
pub fn plain_excerpt(raw: &str, max_chars: usize) -> String {
    let html = markdown_to_html(raw, &markdown_options());
    let text = Builder::empty().clean(&html).to_string();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}

fn markdown_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.superscript = true;
    options.render.unsafe_ = true; // raw HTML is passed through to ammonia
    options
}

fn content_sanitizer() -> Builder<'static> {
    let extra_tags: HashSet<&str> = [
        "h1", "h2", "h3", "h4", "h5", "h6", "pre", "code", "blockquote", "hr", "table", "thead",
        "tbody", "tr", "th", "td", "img", "del", "sup", "sub", "figure", "figcaption",
    ]
    .into_iter()
    .collect();

    let mut builder = Builder::default();
    builder
        .add_tags(extra_tags)
        .add_tag_attributes("a", &["href", "title"])
        .add_tag_attributes("img", &["src", "alt", "title"])
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("td", &["align"])
        .add_tag_attributes("th", &["align"])
        .url_schemes(["http", "https", "mailto"].into_iter().collect())
        .link_rel(Some("noopener noreferrer"));
    builder
}
