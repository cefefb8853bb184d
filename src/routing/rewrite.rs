//! Link rewriting for whole URLs and documents.
//!
//! `rewrite_reverse` applies the reverse route and then mounts the result
//! under the application's base path. The HTML and CSS helpers find
//! root-relative links in a document and pass each through a rewriter.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::routing::reverse::ReverseResolver;

/// Rewrite `url` through `reverse` and prefix `base_path`.
///
/// The result always starts with `/`. Absolute and protocol-relative URLs
/// point elsewhere and are returned untouched.
pub fn rewrite_reverse(reverse: &ReverseResolver<'_>, base_path: Option<&str>, url: &str) -> String {
    if is_external(url) {
        return url.to_string();
    }

    let url = reverse.resolve(url);
    let url = match base_path {
        Some(base) => format!("{}/{}", base.trim_matches('/'), url.trim_matches('/')),
        None => url,
    };

    if url.starts_with('/') {
        url
    } else {
        format!("/{}", url)
    }
}

/// Rewrite root-relative `href`, `src` and `action` attributes.
///
/// `rewrite` receives the link without its leading `/`.
pub fn rewrite_reverse_html(html: &str, rewrite: impl Fn(&str) -> String) -> String {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    let attribute = ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"(?i)(<[^>]*?\s(?:href|src|action)=")/([^"]*)""#).expect("valid attribute regex")
    });

    attribute
        .replace_all(html, |caps: &Captures<'_>| {
            let link = &caps[2];
            if link.starts_with('/') {
                // Protocol-relative: //cdn.example.org/...
                return caps[0].to_string();
            }
            format!("{}{}\"", &caps[1], rewrite(link))
        })
        .into_owned()
}

/// Rewrite `url(...)` references in a stylesheet.
///
/// Parent-directory hops (`../`) are dropped and quotes are preserved;
/// `data:` URIs, fragments and absolute URLs are left alone.
pub fn rewrite_reverse_css(css: &str, rewrite: impl Fn(&str) -> String) -> String {
    static URL: OnceLock<Regex> = OnceLock::new();
    let url = URL.get_or_init(|| Regex::new(r"(?i)url\(([^)]*)\)").expect("valid url regex"));

    url.replace_all(css, |caps: &Captures<'_>| {
        let inner = caps[1].trim();
        let (quote, link) = match inner.chars().next() {
            Some(q @ ('"' | '\'')) if inner.len() >= 2 && inner.ends_with(q) => {
                (q.to_string(), &inner[1..inner.len() - 1])
            }
            _ => (String::new(), inner),
        };

        let lower = link.to_ascii_lowercase();
        if link.is_empty() || link.starts_with('#') || lower.starts_with("data:") || is_external(link) {
            return caps[0].to_string();
        }

        let link = link.replace("../", "");
        format!("url({}{}{})", quote, rewrite(&link), quote)
    })
    .into_owned()
}

fn is_external(url: &str) -> bool {
    url.starts_with("//") || url.contains("://")
}
