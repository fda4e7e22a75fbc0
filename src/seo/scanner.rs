//! Lightweight HTML segmentation for the link injector.
//!
//! Keyword matching must never touch markup, existing anchors, code spans
//! or explicitly excluded sections. Instead of scanning raw HTML with
//! lookbehind regexes, the body is split into a token stream of text runs
//! and skip runs; the injector only searches inside text runs.

/// Tags whose entire element (markup and inner text) is never linkable.
const ALWAYS_PROTECTED: &[&str] = &["a", "code", "pre", "script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Plain text between tags; the only region keywords may match in.
    Text,
    /// A single tag, or the full span of a protected element.
    Skip,
}

/// A half-open byte range `start..end` into the scanned body.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: usize,
    pub end: usize,
}

/// Split `body` into text and skip segments. `excluded_tags` extends the
/// built-in protected set (anchors, code, pre, script, style) with
/// caller-chosen section tags such as headings.
pub fn segment(body: &str, excluded_tags: &[String]) -> Vec<Segment> {
    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            let tag_end = find_byte(bytes, b'>', i).map(|p| p + 1).unwrap_or(bytes.len());
            let name = tag_name(&body[i..tag_end]);

            let protected_name = name.filter(|n| is_protected(n, excluded_tags));
            let is_closing = bytes.get(i + 1) == Some(&b'/');
            let self_closing = tag_end >= 2 && bytes.get(tag_end - 2) == Some(&b'/');

            if let Some(name) = protected_name
                && !is_closing
                && !self_closing
            {
                // Skip through the matching close tag. Malformed HTML with
                // a missing close tag protects the rest of the body, which
                // errs on the side of not linking.
                let close = format!("</{name}");
                let span_end = match find_close_tag(bytes, close.as_bytes(), tag_end) {
                    Some(pos) => find_byte(bytes, b'>', pos).map(|p| p + 1).unwrap_or(bytes.len()),
                    None => bytes.len(),
                };
                segments.push(Segment {
                    kind: SegmentKind::Skip,
                    start: i,
                    end: span_end,
                });
                i = span_end;
            } else {
                segments.push(Segment {
                    kind: SegmentKind::Skip,
                    start: i,
                    end: tag_end,
                });
                i = tag_end;
            }
        } else {
            let text_end = find_byte(bytes, b'<', i).unwrap_or(bytes.len());
            segments.push(Segment {
                kind: SegmentKind::Text,
                start: i,
                end: text_end,
            });
            i = text_end;
        }
    }

    segments
}

/// Case-insensitive (ASCII) search for `needle` in `haystack` at or after
/// `from`. Returns the byte offset of the first match.
pub fn find_ascii_ci(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() || from > haystack.len() - needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Find the close tag `</name` at or after `from`, requiring the name to
/// end there (`>` or whitespace follows). A bare prefix match would let
/// `</abbr>` terminate an `<a>` span.
fn find_close_tag(bytes: &[u8], close: &[u8], mut from: usize) -> Option<usize> {
    while let Some(pos) = find_ascii_ci(bytes, close, from) {
        match bytes.get(pos + close.len()) {
            None | Some(b'>') => return Some(pos),
            Some(b) if b.is_ascii_whitespace() => return Some(pos),
            _ => from = pos + 1,
        }
    }
    None
}

fn find_byte(bytes: &[u8], target: u8, from: usize) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == target).map(|p| from + p)
}

fn is_protected(name: &str, excluded_tags: &[String]) -> bool {
    ALWAYS_PROTECTED.contains(&name) || excluded_tags.iter().any(|t| t.eq_ignore_ascii_case(name))
}

/// Extract the lowercased element name from a raw tag slice like
/// `<a href="...">` or `</p>`. Returns `None` for comments and doctypes.
fn tag_name(tag: &str) -> Option<String> {
    let inner = tag.strip_prefix('<')?;
    let inner = inner.strip_prefix('/').unwrap_or(inner);
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name.to_ascii_lowercase())
    }
}
