//! Idempotent document patcher.
//!
//! Replaces the text between a start and an end marker and reports whether
//! anything changed. Bytes before the end of the start marker and from the
//! end marker onward are always copied verbatim. Never touches storage.

use crate::domain::{DomainError, PatchResult};

/// Byte offsets of the two markers inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedRegion {
    /// Offset of the first byte of the start marker.
    pub start_marker: usize,
    /// Offset of the first byte after the start marker.
    pub inner_start: usize,
    /// Offset of the first byte of the end marker.
    pub end_marker: usize,
}

/// Find the managed region. Both markers must occur exactly once, start first.
pub fn locate(
    document: &str,
    start_delim: &str,
    end_delim: &str,
) -> Result<ManagedRegion, DomainError> {
    if start_delim.is_empty() || end_delim.is_empty() {
        return Err(DomainError::MalformedDocument(
            "markers must not be empty".to_string(),
        ));
    }

    let start_marker = document.find(start_delim).ok_or_else(|| {
        DomainError::MalformedDocument(format!("start marker '{}' not found", start_delim))
    })?;
    let inner_start = start_marker + start_delim.len();
    let end_marker = document[inner_start..]
        .find(end_delim)
        .map(|i| inner_start + i)
        .ok_or_else(|| {
            DomainError::MalformedDocument(format!(
                "end marker '{}' not found after start marker",
                end_delim
            ))
        })?;

    for delim in [start_delim, end_delim] {
        let count = document.matches(delim).count();
        if count != 1 {
            return Err(DomainError::MalformedDocument(format!(
                "marker '{}' occurs {} times, expected exactly once",
                delim, count
            )));
        }
    }

    Ok(ManagedRegion {
        start_marker,
        inner_start,
        end_marker,
    })
}

/// Replace the managed region with `new_inner`.
///
/// The region is written as `start + "\n" + new_inner + "\n" + end`. If the
/// current region already holds `new_inner` (with or without that newline
/// framing) the document is returned as-is with `changed == false`.
pub fn patch(
    document: &str,
    start_delim: &str,
    new_inner: &str,
    end_delim: &str,
) -> Result<PatchResult, DomainError> {
    if new_inner.contains(start_delim) || new_inner.contains(end_delim) {
        return Err(DomainError::MalformedDocument(
            "replacement content contains a marker".to_string(),
        ));
    }
    let region = locate(document, start_delim, end_delim)?;

    let current = strip_framing(&document[region.inner_start..region.end_marker]);
    if current == new_inner {
        return Ok(PatchResult {
            changed: false,
            new_content: document.to_string(),
        });
    }

    let mut candidate = String::with_capacity(document.len() + new_inner.len());
    candidate.push_str(&document[..region.inner_start]);
    candidate.push('\n');
    candidate.push_str(new_inner);
    candidate.push('\n');
    candidate.push_str(&document[region.end_marker..]);

    Ok(PatchResult {
        changed: candidate != document,
        new_content: candidate,
    })
}

/// Drop one leading and one trailing line break (LF or CRLF).
fn strip_framing(region: &str) -> &str {
    let region = region
        .strip_prefix("\r\n")
        .or_else(|| region.strip_prefix('\n'))
        .unwrap_or(region);
    region
        .strip_suffix("\r\n")
        .or_else(|| region.strip_suffix('\n'))
        .unwrap_or(region)
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: &str = "<!--S-->";
    const E: &str = "<!--E-->";

    #[test]
    fn replaces_region_with_framed_content() {
        let result = patch("A<!--S-->old<!--E-->B", S, "new", E).unwrap();
        assert!(result.changed);
        assert_eq!(result.new_content, "A<!--S-->\nnew\n<!--E-->B");
    }

    #[test]
    fn identical_content_is_not_a_change() {
        let doc = "A<!--S-->old<!--E-->B";
        let result = patch(doc, S, "old", E).unwrap();
        assert!(!result.changed);
        assert_eq!(result.new_content, doc);
    }

    #[test]
    fn second_application_is_a_no_op() {
        let doc = "<html>\n<body>\n<!--S-->\n<p>stale</p>\n<!--E-->\n</body>\n</html>\n";
        let first = patch(doc, S, "<p>fresh</p>", E).unwrap();
        assert!(first.changed);

        let second = patch(&first.new_content, S, "<p>fresh</p>", E).unwrap();
        assert!(!second.changed);
        assert_eq!(second.new_content, first.new_content);
    }

    #[test]
    fn crlf_framed_region_with_same_content_is_unchanged() {
        let doc = "<html>\r\n<!--S-->\r\n<p>fresh</p>\r\n<!--E-->\r\n</html>\r\n";
        let result = patch(doc, S, "<p>fresh</p>", E).unwrap();
        assert!(!result.changed);
        assert_eq!(result.new_content, doc);

        let stale = patch(doc, S, "<p>newer</p>", E).unwrap();
        assert!(stale.changed);
        assert_eq!(
            stale.new_content,
            "<html>\r\n<!--S-->\n<p>newer</p>\n<!--E-->\r\n</html>\r\n"
        );
    }

    #[test]
    fn bytes_outside_the_region_are_preserved() {
        let doc = "héllo \r\n<!-- keep -->\n<!--S--> x y z <!--E-->\r\ntail ünïcode";
        let region = locate(doc, S, E).unwrap();
        for inner in ["", "a", "multi\nline\ncontent", "<!-- other comment -->"] {
            let result = patch(doc, S, inner, E).unwrap();
            let out = &result.new_content;
            assert_eq!(out[..region.inner_start], doc[..region.inner_start]);
            let tail = &doc[region.end_marker..];
            assert!(out.ends_with(tail));
            assert_eq!(out.len() - tail.len(), region.inner_start + inner.len() + 2);
        }
    }

    #[test]
    fn missing_markers_are_fatal() {
        assert!(matches!(
            patch("no markers", S, "x", E),
            Err(DomainError::MalformedDocument(_))
        ));
        assert!(matches!(
            patch("A<!--S-->only start", S, "x", E),
            Err(DomainError::MalformedDocument(_))
        ));
        // end before start
        assert!(matches!(
            patch("<!--E--> then <!--S-->", S, "x", E),
            Err(DomainError::MalformedDocument(_))
        ));
    }

    #[test]
    fn duplicated_markers_are_fatal() {
        assert!(matches!(
            patch("<!--S-->a<!--E--><!--S-->b<!--E-->", S, "x", E),
            Err(DomainError::MalformedDocument(_))
        ));
    }

    #[test]
    fn content_containing_a_marker_is_rejected() {
        assert!(matches!(
            patch("<!--S--><!--E-->", S, "oops <!--E-->", E),
            Err(DomainError::MalformedDocument(_))
        ));
    }
}
