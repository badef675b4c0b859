//! Inline `style` attribute declaration handling.

/// Value of `property` inside an inline declaration list, if declared.
///
/// The last declaration wins, matching cascade order within one attribute.
pub(crate) fn property_value(source: &str, property: &str) -> Option<String> {
    let mut found = None;
    for declaration in split_declarations(source) {
        let Some((name, value)) = split_declaration(declaration) else {
            continue;
        };
        if name.eq_ignore_ascii_case(property) {
            found = Some(value.to_owned());
        }
    }

    found
}

/// Rewrites the declaration list with `property` set to `value`.
///
/// Unrelated declarations keep their order; an empty `value` removes the
/// property. Returns the new attribute text, empty when nothing remains.
pub(crate) fn with_property(source: &str, property: &str, value: &str) -> String {
    let mut declarations = Vec::new();
    for declaration in split_declarations(source) {
        let Some((name, kept_value)) = split_declaration(declaration) else {
            continue;
        };
        if name.eq_ignore_ascii_case(property) {
            continue;
        }
        declarations.push(format!("{name}:{kept_value}"));
    }

    if !value.is_empty() {
        declarations.push(format!("{}:{}", property.to_ascii_lowercase(), value));
    }

    declarations.join(";")
}

fn split_declaration(declaration: &str) -> Option<(String, &str)> {
    let colon = find_top_level_colon(declaration)?;
    let name = declaration[..colon].trim().to_ascii_lowercase();
    let value = declaration[colon + 1..].trim();
    if name.is_empty() || value.is_empty() {
        return None;
    }

    Some((name, value))
}

fn split_declarations(source: &str) -> Vec<&str> {
    let bytes = source.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0_usize;
    let mut idx = 0_usize;
    let mut quote: Option<u8> = None;
    let mut paren_depth = 0_u32;

    while idx < bytes.len() {
        let byte = bytes[idx];

        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            idx += 1;
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => paren_depth = paren_depth.saturating_add(1),
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b';' if paren_depth == 0 => {
                parts.push(&source[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }

        idx += 1;
    }

    if start <= source.len() {
        parts.push(&source[start..]);
    }

    parts
}

fn find_top_level_colon(declaration: &str) -> Option<usize> {
    let bytes = declaration.as_bytes();
    let mut quote: Option<u8> = None;
    let mut paren_depth = 0_u32;

    for (idx, byte) in bytes.iter().enumerate() {
        if let Some(open) = quote {
            if *byte == open {
                quote = None;
            }
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(*byte),
            b'(' => paren_depth = paren_depth.saturating_add(1),
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b':' if paren_depth == 0 => return Some(idx),
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::property_value;
    use super::with_property;

    #[test]
    fn reads_last_declaration() {
        let source = "display: block; color: red; display: flex";
        assert_eq!(property_value(source, "display").as_deref(), Some("flex"));
        assert_eq!(property_value(source, "color").as_deref(), Some("red"));
        assert_eq!(property_value(source, "top"), None);
    }

    #[test]
    fn keeps_urls_with_semicolons_intact() {
        let source = r#"background-image: url("data:image/svg+xml;utf8,<svg/>"); display: none"#;
        assert_eq!(property_value(source, "display").as_deref(), Some("none"));
        assert_eq!(
            property_value(source, "background-image").as_deref(),
            Some(r#"url("data:image/svg+xml;utf8,<svg/>")"#)
        );
    }

    #[test]
    fn rewrites_and_removes_properties() {
        let rewritten = with_property("display:none;top:50px", "display", "flex");
        assert_eq!(rewritten, "top:50px;display:flex");

        let removed = with_property(&rewritten, "display", "");
        assert_eq!(removed, "top:50px");

        assert_eq!(with_property("", "display", ""), "");
    }
}
