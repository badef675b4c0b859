//! Minimal CSS selector parsing and matching.
//!
//! Supports what the page behaviors query for: tag, `#id` and `.class`
//! simple selectors, descendant and child combinators, and the
//! `[attr*=value]` substring attribute match.

use crate::Document;
use crate::NodeId;
use sw_core::PageError;
use sw_core::PageResult;

/// Compiled selector, matched right-to-left against arena elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    // Relation between this segment and the previous one; the first
    // segment carries `Descendant` and the field is never consulted.
    link: Combinator,
    simple: SimpleSelector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attr_contains: Vec<(String, String)>,
}

impl Selector {
    pub fn parse(input: &str) -> PageResult<Self> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(invalid(input, "selector is empty"));
        }

        let mut segments = Vec::new();
        let mut pending_link: Option<Combinator> = None;

        for token in tokens {
            match token {
                Token::Child => {
                    if segments.is_empty() || pending_link.is_some() {
                        return Err(invalid(input, "misplaced `>` combinator"));
                    }
                    pending_link = Some(Combinator::Child);
                }
                Token::Compound(source) => {
                    let simple = parse_compound(&source)
                        .ok_or_else(|| invalid(input, format!("bad compound `{source}`")))?;
                    let link = if segments.is_empty() {
                        Combinator::Descendant
                    } else {
                        pending_link.take().unwrap_or(Combinator::Descendant)
                    };
                    segments.push(Segment { link, simple });
                }
            }
        }

        if pending_link.is_some() {
            return Err(invalid(input, "selector ends with a combinator"));
        }

        Ok(Self { segments })
    }

    /// Whether the element at `id` matches this selector.
    pub fn matches(&self, document: &Document, id: NodeId) -> bool {
        match self.segments.len().checked_sub(1) {
            Some(last) => self.matches_at(document, id, last),
            None => false,
        }
    }

    fn matches_at(&self, document: &Document, id: NodeId, index: usize) -> bool {
        if !self.segments[index].simple.matches(document, id) {
            return false;
        }

        let Some(previous) = index.checked_sub(1) else {
            return true;
        };

        match self.segments[index].link {
            Combinator::Child => document
                .parent(id)
                .is_some_and(|parent| self.matches_at(document, parent, previous)),
            Combinator::Descendant => {
                let mut ancestor = document.parent(id);
                while let Some(candidate) = ancestor {
                    if self.matches_at(document, candidate, previous) {
                        return true;
                    }
                    ancestor = document.parent(candidate);
                }
                false
            }
        }
    }
}

impl SimpleSelector {
    fn matches(&self, document: &Document, id: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if document.tag(id) != Some(tag.as_str()) {
                return false;
            }
        } else if !document.is_element(id) {
            return false;
        }

        if let Some(id_value) = &self.id {
            if document.attribute(id, "id") != Some(id_value.as_str()) {
                return false;
            }
        }

        if !self
            .classes
            .iter()
            .all(|class| document.has_class(id, class))
        {
            return false;
        }

        self.attr_contains.iter().all(|(name, needle)| {
            document
                .attribute(id, name)
                .is_some_and(|value| value.contains(needle.as_str()))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Compound(String),
    Child,
}

fn tokenize(input: &str) -> PageResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        if let Some(open) = quote {
            current.push(ch);
            if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' if in_brackets => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                if in_brackets {
                    return Err(invalid(input, "nested `[`"));
                }
                in_brackets = true;
                current.push(ch);
            }
            ']' => {
                if !in_brackets {
                    return Err(invalid(input, "unmatched `]`"));
                }
                in_brackets = false;
                current.push(ch);
            }
            '>' if !in_brackets => {
                flush_compound(&mut current, &mut tokens);
                tokens.push(Token::Child);
            }
            _ if ch.is_whitespace() && !in_brackets => {
                flush_compound(&mut current, &mut tokens);
            }
            _ => current.push(ch),
        }
    }

    if in_brackets || quote.is_some() {
        return Err(invalid(input, "unterminated attribute selector"));
    }

    flush_compound(&mut current, &mut tokens);
    Ok(tokens)
}

fn flush_compound(current: &mut String, tokens: &mut Vec<Token>) {
    if !current.is_empty() {
        tokens.push(Token::Compound(std::mem::take(current)));
    }
}

fn parse_compound(source: &str) -> Option<SimpleSelector> {
    let mut simple = SimpleSelector::default();
    let mut rest = source;

    if rest.starts_with('*') {
        rest = &rest[1..];
    } else {
        let tag_len = rest.chars().take_while(|ch| is_name_char(*ch)).count();
        if tag_len > 0 {
            let tag: String = rest.chars().take(tag_len).collect();
            rest = &rest[tag.len()..];
            simple.tag = Some(tag.to_ascii_lowercase());
        }
    }

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('#') {
            let (name, remainder) = take_name(after)?;
            simple.id = Some(name);
            rest = remainder;
        } else if let Some(after) = rest.strip_prefix('.') {
            let (name, remainder) = take_name(after)?;
            simple.classes.push(name);
            rest = remainder;
        } else if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']')?;
            let body = &after[..close];
            let (name, needle) = parse_attr_contains(body)?;
            simple.attr_contains.push((name, needle));
            rest = &after[close + 1..];
        } else {
            return None;
        }
    }

    let empty = simple.tag.is_none()
        && simple.id.is_none()
        && simple.classes.is_empty()
        && simple.attr_contains.is_empty();
    if empty && !source.starts_with('*') {
        return None;
    }

    Some(simple)
}

fn parse_attr_contains(body: &str) -> Option<(String, String)> {
    let (name, raw_value) = body.split_once("*=")?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_name_char) {
        return None;
    }

    let value = raw_value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .or_else(|| {
            value
                .strip_prefix('\'')
                .and_then(|inner| inner.strip_suffix('\''))
        })
        .unwrap_or(value);

    Some((name.to_ascii_lowercase(), value.to_owned()))
}

fn take_name(input: &str) -> Option<(String, &str)> {
    let len = input.chars().take_while(|ch| is_name_char(*ch)).count();
    if len == 0 {
        return None;
    }

    let name: String = input.chars().take(len).collect();
    let rest = &input[name.len()..];
    Some((name, rest))
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')
}

fn invalid(selector: &str, detail: impl Into<String>) -> PageError {
    PageError::new(
        "dom.selector.invalid",
        format!("invalid selector `{selector}`: {}", detail.into()),
    )
}

#[cfg(test)]
mod tests {
    use super::Selector;
    use crate::Document;

    fn sidebar_fixture() -> (Document, Vec<crate::NodeId>) {
        let mut doc = Document::new();
        let sidebar = doc.create_element("nav");
        doc.set_attribute(sidebar, "id", "sidebar");
        let list = doc.create_element("ul");
        let item = doc.create_element("li");
        let anchor = doc.create_element("a");
        doc.set_attribute(anchor, "href", "/guide/#setup");
        let nested_list = doc.create_element("ul");
        doc.append_child(doc.root(), sidebar);
        doc.append_child(sidebar, list);
        doc.append_child(list, item);
        doc.append_child(item, anchor);
        doc.append_child(item, nested_list);
        (doc, vec![sidebar, list, item, anchor, nested_list])
    }

    fn parse(input: &str) -> Selector {
        match Selector::parse(input) {
            Ok(selector) => selector,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn matches_descendant_and_child_chains() {
        let (doc, ids) = sidebar_fixture();
        let anchor = ids[3];
        let nested_list = ids[4];

        assert_eq!(doc.select(&parse("#sidebar a")), vec![anchor]);
        assert_eq!(doc.select(&parse("#sidebar li > a")), vec![anchor]);
        assert_eq!(doc.select(&parse("#sidebar > ul ul")), vec![nested_list]);
        assert!(doc.select(&parse("#sidebar > a")).is_empty());
    }

    #[test]
    fn matches_attribute_substring() {
        let (doc, ids) = sidebar_fixture();
        let anchor = ids[3];

        assert_eq!(doc.select(&parse(r##"a[href*="#"]"##)), vec![anchor]);
        assert!(doc.select(&parse("a[href*=missing]")).is_empty());
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("   ").is_err());
        assert!(Selector::parse("li >").is_err());
        assert!(Selector::parse("> li").is_err());
        assert!(Selector::parse("a[href*=\"#\"").is_err());
        assert!(Selector::parse("a[href=x]").is_err());
    }

    #[test]
    fn universal_selector_matches_elements() {
        let (doc, ids) = sidebar_fixture();
        assert_eq!(doc.select(&parse("*")).len(), ids.len());
    }
}
