//! Minimal markup helpers for emitting fragments.
//!
//! Entity escaping goes through `html_escape`; only structured fields are
//! interpolated into templates.

/// Collapse every run of whitespace into a single space. Keeps one space at
/// either edge when the input had whitespace there.
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if out.is_empty() {
        return if s.is_empty() { out } else { " ".to_string() };
    }
    if s.starts_with(char::is_whitespace) {
        out.insert(0, ' ');
    }
    if s.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_whitespace() {
        assert_eq!(collapse_whitespace(" a \n\t b  c "), " a b c ");
    }

    #[test]
    fn whitespace_only_becomes_one_space() {
        assert_eq!(collapse_whitespace("\n\t  "), " ");
        assert_eq!(collapse_whitespace(""), "");
    }
}
