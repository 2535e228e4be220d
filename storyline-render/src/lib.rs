//! # storyline-render
//!
//! Safe-mode markdown rendering for story bodies.
//!
//! Stories arrive as markdown and are stored as HTML. Rendering runs the
//! pulldown-cmark event stream through a sanitizing filter before HTML
//! generation:
//!
//! - raw HTML (block and inline) is re-emitted as escaped text, so author
//!   markup can never smuggle script into the store;
//! - link and image destinations with `javascript:`, `vbscript:`, or
//!   `data:` schemes are blanked;
//! - the emitted tag set is fixed by the renderer itself — see
//!   [`ALLOWED_TAGS`].
//!
//! Attachments are never embedded inline; they only ever become a record's
//! thumbnail, so nothing here touches binary content.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Every tag the renderer can emit. A sanitized document contains no other
/// elements; tests hold the renderer to this set.
pub const ALLOWED_TAGS: &[&str] = &[
    "a", "blockquote", "br", "code", "del", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "img", "li", "ol", "p", "pre", "strong", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// Render a story's markdown specification to sanitized HTML.
pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(sanitize_event);
    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        // push_html escapes Text events, so demoting raw HTML to text
        // neutralizes it while keeping the author's characters visible.
        Event::Html(raw) => Event::Text(raw),
        Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn sanitize_url(url: CowStr<'_>) -> CowStr<'_> {
    let trimmed = url.trim_start().to_ascii_lowercase();
    let dangerous = ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| trimmed.starts_with(scheme));
    if dangerous {
        CowStr::Borrowed("")
    } else {
        url
    }
}
