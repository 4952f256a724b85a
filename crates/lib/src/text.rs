//! Small text helpers shared by the metadata and SEO stages.

/// Lowercase, ASCII-alphanumeric slug with single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Truncates to at most `max` characters, never splitting a character.
pub fn truncate_chars(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }
    input.chars().take(max).collect()
}

/// Title Case for keyword-derived fallbacks.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Character position of `needle` in `haystack`, case-insensitive.
pub fn char_position(haystack: &str, needle: &str) -> Option<usize> {
    let lower_haystack = haystack.to_lowercase();
    let lower_needle = needle.to_lowercase();
    let byte_idx = lower_haystack.find(&lower_needle)?;
    Some(lower_haystack[..byte_idx].chars().count())
}
