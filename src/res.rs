use axum::{debug_handler, http::{header, StatusCode}, response::{Html, IntoResponse, Response}};
use pulldown_cmark::{Event, Options, Parser};

use crate::AppResult;

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

#[debug_handler]
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        include_res!(str, "/style.css"),
    )
}

/// The 404 page, for anything the visitor may not see.
pub fn sorry(what: &str) -> AppResult<Response> {
    Ok((
        StatusCode::NOT_FOUND,
        Html(render(include_res!(str, "/pages/sorry.html"), &[("what", &escape_html(what))])),
    ).into_response())
}

/// Fills `{key}` placeholders in a single pass over `template`. Substituted
/// values are never scanned again, and unknown `{..}` text is left alone.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let filled = after.find('}').and_then(|close| {
            let key = &after[..close];
            values.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match filled {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// `url` when it is safe to put in an href, else `#`.
pub fn safe_href(url: &str) -> &str {
    const SCHEMES: &[&str] = &["https://", "http://", "mailto:", "tel:", "skype:"];
    let lower = url.trim_start().to_ascii_lowercase();
    if SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) { url } else { "#" }
}

/// Markdown to HTML, with raw HTML in the source shown as text.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_each_placeholder_once() {
        let html = render("<h1>{name}</h1><ul>{links}</ul>", &[
            ("name", "Me {links}"),
            ("links", "<li>x</li>"),
        ]);
        assert_eq!(html, "<h1>Me {links}</h1><ul><li>x</li></ul>");
    }

    #[test]
    fn render_keeps_unknown_braces() {
        assert_eq!(render("a {b} {c", &[("x", "y")]), "a {b} {c");
        assert_eq!(render("{x}{x}", &[("x", "1")]), "11");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn only_known_schemes_are_linked() {
        assert_eq!(safe_href("https://github.com/alice"), "https://github.com/alice");
        assert_eq!(safe_href("tel:+123"), "tel:+123");
        assert_eq!(safe_href("JavaScript:alert(1)"), "#");
        assert_eq!(safe_href("alice"), "#");
    }

    #[test]
    fn markdown_drops_raw_html() {
        let html = render_markdown("**hi** <script>alert(1)</script>");
        assert!(html.contains("<strong>hi</strong>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
