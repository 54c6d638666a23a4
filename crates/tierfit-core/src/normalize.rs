//! Canonical forms for the free-text values that arrive in input tables.
//!
//! Labels (license tiers and other human-facing values) are title cased so they can
//! be compared against the fixed tier vocabulary. Keys (activity codes) are upper
//! cased so joins compare one case convention. Both trim surrounding whitespace and
//! treat a blank value as absent.

pub fn normalize_label(raw: Option<&str>) -> Option<String> {
    let trimmed = non_blank(raw)?;
    Some(title_case(trimmed))
}

pub fn normalize_key(raw: Option<&str>) -> Option<String> {
    let trimmed = non_blank(raw)?;
    Some(trimmed.to_uppercase())
}

/// Trim-only normalization for identity and description fields.
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    non_blank(raw).map(str::to_owned)
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_owned()
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;

    for ch in value.chars() {
        if !ch.is_alphabetic() {
            out.push(ch);
            in_word = false;
            continue;
        }

        // Multi-char case mappings (e.g. 'ß' -> "SS") would not survive a second pass.
        let mapped = if in_word {
            single_char(ch.to_lowercase())
        } else {
            single_char(ch.to_uppercase())
        };
        out.push(mapped.unwrap_or(ch));
        in_word = true;
    }

    out
}

fn single_char(mut mapping: impl Iterator<Item = char>) -> Option<char> {
    let first = mapping.next()?;
    mapping.next().is_none().then_some(first)
}
