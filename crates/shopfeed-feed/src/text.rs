//! Plain-text normalization for HTML product descriptions.
//!
//! Tag removal is a single character scan rather than a real HTML parser:
//! anything between `<` and the next `>` is dropped. Only the six entities
//! Shopify's editor commonly emits are decoded; everything else is left as-is.

const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Strips markup from `html` and returns single-spaced, trimmed text.
///
/// Steps, in order: drop every `<...>` span, decode the fixed entity set,
/// collapse whitespace runs to one space, trim. Never fails; empty input
/// yields an empty string.
#[must_use]
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    // Start of the currently open `<`, if any. An unterminated `<` is text.
    let mut open_at: Option<usize> = None;

    for (i, c) in html.char_indices() {
        match (c, open_at) {
            ('<', None) => open_at = Some(i),
            ('>', Some(_)) => open_at = None,
            (_, None) => text.push(c),
            (_, Some(_)) => {}
        }
    }
    if let Some(start) = open_at {
        text.push_str(&html[start..]);
    }

    let decoded = decode_entities(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decodes the fixed entity set in one left-to-right pass, so a decoded
/// `&amp;lt;` becomes `&lt;` rather than `<`.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            Some((entity, replacement)) => {
                out.push_str(replacement);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
