//! # pressgen-html: HTML Fragment Surgeon
//!
//! Post-processing for model-generated HTML. The generative source is
//! untrusted: it leaks page-level wrappers, markdown fences, and it cannot
//! be relied on to place structural blocks exactly once. Everything here is
//! deliberate string/regex surgery — the fragments are not guaranteed to be
//! well-formed, so each mutation has a documented fallback order and is
//! idempotent.

use regex::Regex;
use std::sync::LazyLock;

/// Wrapper id for the internal-link block spliced into article bodies.
pub const RELATED_LINKS_ID: &str = "related-reading";

/// Wrapper id for the injected video figure.
pub const VIDEO_FIGURE_ID: &str = "featured-video";

/// Marker the body prompt asks the model to put on the authority
/// references section.
pub const REFERENCES_ID: &str = "authority-references";

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z0-9]*\s*\n?").expect("fence regex is valid"));

static PAGE_WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!DOCTYPE[^>]*>|</?html[^>]*>|<head[\s\S]*?</head>|</?body[^>]*>")
        .expect("page wrapper regex is valid")
});

static RELATED_LINKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?is)<section[^>]*id="{RELATED_LINKS_ID}"[^>]*>[\s\S]*?</section>\s*"#
    ))
    .expect("related links regex is valid")
});

static VIDEO_FIGURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?is)<figure[^>]*id="{VIDEO_FIGURE_ID}"[^>]*>[\s\S]*?</figure>\s*"#
    ))
    .expect("video figure regex is valid")
});

static CLOSE_P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p>").expect("paragraph regex is valid"));

static CLOSE_H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</h1>").expect("h1 regex is valid"));

static CLOSE_ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</article>").expect("article regex is valid"));

static REFERENCES_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?is)<section[^>]*id="{REFERENCES_ID}"[^>]*>[\s\S]*?</section>"#
    ))
    .expect("references regex is valid")
});

/// Strips markdown code fences and leaked page-level tags from a model
/// response that was supposed to be a bare HTML fragment.
pub fn clean_model_html(html: &str) -> String {
    let without_fences = FENCE_RE.replace_all(html, "");
    PAGE_WRAPPER_RE
        .replace_all(&without_fences, "")
        .trim()
        .to_string()
}

/// Builds the internal-link block and splices it into the body, guaranteeing
/// exactly one occurrence regardless of what the model produced.
///
/// Insertion preference: right after the authority-references section, else
/// right before the closing `</article>` tag, else appended at the end.
pub fn splice_related_links(html: &str, heading: &str, links: &[(String, String)]) -> String {
    let stripped = RELATED_LINKS_RE.replace_all(html, "").to_string();
    if links.is_empty() {
        return stripped;
    }

    let items: String = links
        .iter()
        .map(|(url, title)| {
            format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape_attr(url),
                escape_text(title)
            )
        })
        .collect();
    let block = format!(
        "<section id=\"{RELATED_LINKS_ID}\"><h2>{}</h2><ul>{items}</ul></section>",
        escape_text(heading)
    );

    if let Some(m) = REFERENCES_SECTION_RE.find(&stripped) {
        let mut out = String::with_capacity(stripped.len() + block.len());
        out.push_str(&stripped[..m.end()]);
        out.push_str(&block);
        out.push_str(&stripped[m.end()..]);
        return out;
    }
    if let Some(m) = CLOSE_ARTICLE_RE.find(&stripped) {
        let mut out = String::with_capacity(stripped.len() + block.len());
        out.push_str(&stripped[..m.start()]);
        out.push_str(&block);
        out.push_str(&stripped[m.start()..]);
        return out;
    }
    format!("{stripped}{block}")
}

/// Injects a video figure into the fragment, idempotently.
///
/// `None` or an empty embed leaves the input unchanged (any previously
/// injected figure included). Otherwise the old figure is stripped first and
/// the fresh one inserted after the first paragraph close tag; if none,
/// after the first `</h1>`; if neither, prepended to the fragment.
pub fn inject_video(html: &str, embed_html: Option<&str>, caption: &str) -> String {
    let embed = match embed_html {
        Some(e) if !e.trim().is_empty() => e,
        _ => return html.to_string(),
    };

    let stripped = VIDEO_FIGURE_RE.replace_all(html, "").to_string();
    let figcaption = if caption.trim().is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", escape_text(caption))
    };
    let figure = format!("<figure id=\"{VIDEO_FIGURE_ID}\">{embed}{figcaption}</figure>");

    let insert_at = CLOSE_P_RE
        .find(&stripped)
        .or_else(|| CLOSE_H1_RE.find(&stripped))
        .map(|m| m.end());

    match insert_at {
        Some(at) => {
            let mut out = String::with_capacity(stripped.len() + figure.len());
            out.push_str(&stripped[..at]);
            out.push_str(&figure);
            out.push_str(&stripped[at..]);
            out
        }
        None => format!("{figure}{stripped}"),
    }
}

/// Counts occurrences of an element with the given id. Used to assert the
/// exactly-once contracts.
pub fn count_occurrences(html: &str, id: &str) -> usize {
    html.matches(&format!("id=\"{id}\"")).count()
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
