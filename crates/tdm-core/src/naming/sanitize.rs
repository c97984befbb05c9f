//! Path-safe name sanitization.

/// Linux NAME_MAX in bytes.
pub const NAME_MAX: usize = 255;

/// Characters that are illegal in file names on at least one common filesystem.
fn is_illegal(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Removes illegal path characters (used for track file names).
pub fn strip_illegal_chars(name: &str) -> String {
    name.chars().filter(|c| !is_illegal(*c)).collect()
}

/// Replaces each illegal path character with `_` (used for collection directories).
pub fn replace_illegal_chars(name: &str) -> String {
    name.chars()
        .map(|c| if is_illegal(c) { '_' } else { c })
        .collect()
}

/// Trims leading/trailing whitespace and dots so the name is never `.`, `..` or hidden.
pub fn trim_name(name: &str) -> &str {
    name.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

/// Cuts `name` to at most `max` bytes on a char boundary.
pub fn truncate_bytes(name: &str, max: usize) -> &str {
    if name.len() <= max {
        return name;
    }
    let mut take = max;
    while take > 0 && !name.is_char_boundary(take) {
        take -= 1;
    }
    &name[..take]
}
