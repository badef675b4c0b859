//! HTML tokenization and tree construction.

use sw_dom::Document;
use sw_dom::NodeId;

/// Parses raw HTML into a DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        let mut document = Document::new();
        let mut stack: Vec<(String, NodeId)> = Vec::new();
        let bytes = input.as_bytes();
        let mut idx = 0_usize;

        while idx < bytes.len() {
            if bytes[idx] != b'<' {
                let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
                append_text(&mut document, &stack, &input[idx..next]);
                idx = next;
                continue;
            }

            if starts_with(bytes, idx, b"<!--") {
                idx = skip_comment(bytes, idx);
                continue;
            }

            if starts_with(bytes, idx, b"<!") {
                idx = skip_to_gt(bytes, idx.saturating_add(2));
                continue;
            }

            if starts_with(bytes, idx, b"<?") {
                idx = skip_to_gt(bytes, idx.saturating_add(2));
                continue;
            }

            let Some((tag, next_idx)) = parse_tag(bytes, idx) else {
                append_text(&mut document, &stack, "<");
                idx = idx.saturating_add(1);
                continue;
            };

            if tag.is_end {
                close_tag(&mut stack, &tag.name);
                idx = next_idx;
                continue;
            }

            let element = document.create_element(&tag.name);
            for (name, value) in &tag.attrs {
                document.set_attribute(element, name, value);
            }
            document.append_child(current_parent(&document, &stack), element);

            if !tag.self_closing && is_raw_text_element(&tag.name) {
                let (raw, after_raw) = read_raw_text_until_end_tag(input, next_idx, &tag.name);
                if !raw.trim().is_empty() {
                    let text = document.create_text(raw);
                    document.append_child(element, text);
                }
                idx = after_raw;
                continue;
            }

            if !tag.self_closing && !is_void_element(&tag.name) {
                stack.push((tag.name, element));
            }

            idx = next_idx;
        }

        document
    }
}

fn current_parent(document: &Document, stack: &[(String, NodeId)]) -> NodeId {
    stack
        .last()
        .map(|(_, id)| *id)
        .unwrap_or_else(|| document.root())
}

fn append_text(document: &mut Document, stack: &[(String, NodeId)], text: &str) {
    if text.trim().is_empty() {
        return;
    }

    let parent = current_parent(document, stack);
    let node = document.create_text(text);
    document.append_child(parent, node);
}

fn close_tag(stack: &mut Vec<(String, NodeId)>, name: &str) {
    let Some(open_index) = stack.iter().rposition(|(open_name, _)| open_name == name) else {
        // Stray end tag with no matching open element.
        return;
    };

    stack.truncate(open_index);
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedTag {
    name: String,
    attrs: Vec<(String, String)>,
    is_end: bool,
    self_closing: bool,
}

fn parse_tag(bytes: &[u8], start: usize) -> Option<(ParsedTag, usize)> {
    if bytes.get(start).copied() != Some(b'<') {
        return None;
    }

    let mut idx = start.saturating_add(1);
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx = idx.saturating_add(1);
    }

    idx = skip_spaces(bytes, idx);
    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }

    if idx == name_start {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[name_start..idx]).to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied() {
            None => return None,
            Some(b'>') => {
                return Some((
                    ParsedTag {
                        name,
                        attrs,
                        is_end,
                        self_closing,
                    },
                    idx.saturating_add(1),
                ));
            }
            Some(b'/') => {
                self_closing = true;
                idx = idx.saturating_add(1);
            }
            Some(_) => {
                let (attr, next_idx) = parse_attribute(bytes, idx)?;
                if !is_end && !attr.0.is_empty() {
                    attrs.push(attr);
                }
                idx = next_idx;
                self_closing = false;
            }
        }
    }
}

fn parse_attribute(bytes: &[u8], start: usize) -> Option<((String, String), usize)> {
    let mut idx = start;
    let name_start = idx;
    while idx < bytes.len() && is_attr_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }

    if idx == name_start {
        // Unparseable byte inside the tag; consume it to make progress.
        return Some(((String::new(), String::new()), idx.saturating_add(1)));
    }

    let name = String::from_utf8_lossy(&bytes[name_start..idx]).to_ascii_lowercase();
    idx = skip_spaces(bytes, idx);

    if bytes.get(idx).copied() != Some(b'=') {
        return Some(((name, String::new()), idx));
    }

    idx = skip_spaces(bytes, idx.saturating_add(1));
    match bytes.get(idx).copied() {
        Some(quote @ (b'"' | b'\'')) => {
            let value_start = idx.saturating_add(1);
            let end = find_byte(bytes, value_start, quote)?;
            let value = String::from_utf8_lossy(&bytes[value_start..end]).into_owned();
            Some(((name, value), end.saturating_add(1)))
        }
        _ => {
            let value_start = idx;
            while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() && bytes[idx] != b'>' {
                idx = idx.saturating_add(1);
            }
            let value = String::from_utf8_lossy(&bytes[value_start..idx]).into_owned();
            Some(((name, value), idx))
        }
    }
}

fn read_raw_text_until_end_tag<'a>(
    input: &'a str,
    start: usize,
    tag_name: &str,
) -> (&'a str, usize) {
    let bytes = input.as_bytes();
    let tag_bytes = tag_name.as_bytes();
    let mut idx = start;

    while idx < bytes.len() {
        if bytes[idx] == b'<'
            && bytes.get(idx.saturating_add(1)).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, idx.saturating_add(2), tag_bytes)
            && tag_name_boundary(bytes, idx.saturating_add(2 + tag_bytes.len()))
        {
            if let Some((_, end_idx)) = parse_tag(bytes, idx) {
                return (&input[start..idx], end_idx);
            }
        }

        idx = idx.saturating_add(1);
    }

    (&input[start..], bytes.len())
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    find_subslice(bytes, start.saturating_add(4), b"-->")
        .map(|end| end.saturating_add(3))
        .unwrap_or(bytes.len())
}

fn skip_to_gt(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() {
        if bytes[idx] == b'>' {
            return idx.saturating_add(1);
        }
        idx = idx.saturating_add(1);
    }

    bytes.len()
}

fn tag_name_boundary(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx).copied() {
        None => true,
        Some(byte) => byte.is_ascii_whitespace() || byte == b'>' || byte == b'/',
    }
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn is_attr_name_char(byte: u8) -> bool {
    !byte.is_ascii_whitespace() && !matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    if end > bytes.len() {
        return false;
    }

    bytes[idx..end]
        .iter()
        .zip(pattern.iter())
        .all(|(left, right)| left.eq_ignore_ascii_case(right))
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }

    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }

    bytes[from..]
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}
