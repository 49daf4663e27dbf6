//! Anchor-relative text insertion
//!
//! A needle must occur exactly once in the current content. The payload is
//! inserted as whole lines right before or right after the line holding the
//! needle, using the file's own line terminator. Everything outside the
//! inserted lines is left byte-identical, including a missing newline at the
//! end of the file.

use crate::error::{Error, Result};
use crate::module::Anchor;

/// Insert `payload` next to `anchor` in `content`
///
/// `path` only labels errors.
pub fn insert(content: &str, anchor: &Anchor, payload: &str, path: &str) -> Result<String> {
    let needle = anchor.needle();
    let mut matches = content.match_indices(needle);
    let position = match (matches.next(), matches.next()) {
        (None, _) => {
            return Err(Error::AnchorNotFound {
                path: path.to_string(),
                needle: needle.to_string(),
            })
        }
        (Some((position, _)), None) => position,
        (Some(_), Some(_)) => {
            return Err(Error::AmbiguousAnchor {
                path: path.to_string(),
                needle: needle.to_string(),
                occurrences: content.matches(needle).count(),
            })
        }
    };

    let eol = line_terminator(content);
    let lines = payload_lines(payload, eol);

    let line_start = content[..position].rfind('\n').map_or(0, |i| i + 1);
    let needle_end = position + needle.len();
    let line_end = if needle.ends_with('\n') {
        Some(needle_end)
    } else {
        content[needle_end..].find('\n').map(|i| needle_end + i + 1)
    };

    let mut patched = String::with_capacity(content.len() + lines.len() + eol.len());
    match anchor {
        Anchor::BeforeText(_) => {
            patched.push_str(&content[..line_start]);
            patched.push_str(&lines);
            patched.push_str(eol);
            patched.push_str(&content[line_start..]);
        }
        Anchor::AfterText(_) => match line_end {
            Some(end) => {
                patched.push_str(&content[..end]);
                patched.push_str(&lines);
                patched.push_str(eol);
                patched.push_str(&content[end..]);
            }
            None => {
                // needle sits on a last line without terminator
                patched.push_str(content);
                patched.push_str(eol);
                patched.push_str(&lines);
            }
        },
    }
    Ok(patched)
}

/// `\r\n` when the content already uses it, `\n` otherwise
fn line_terminator(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Payload lines joined with `eol`, without a trailing terminator
fn payload_lines(payload: &str, eol: &str) -> String {
    let payload = payload.strip_suffix('\n').unwrap_or(payload);
    let payload = payload.strip_suffix('\r').unwrap_or(payload);
    payload
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect::<Vec<_>>()
        .join(eol)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE_JSON: &str = "{\n  \"name\": \"shop\",\n  \"engines\": {\n    \"node\": \">=22\"\n  }\n}\n";

    #[test]
    fn test_insert_before_line() {
        let patched = insert(
            PACKAGE_JSON,
            &Anchor::line_before("\"engines\":"),
            "  \"cacheDirectories\": [\"node_modules\"],",
            "package.json",
        )
        .unwrap();
        assert_eq!(
            patched,
            "{\n  \"name\": \"shop\",\n  \"cacheDirectories\": [\"node_modules\"],\n  \"engines\": {\n    \"node\": \">=22\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_insert_after_line() {
        let html = "<html>\n  <head>\n  </head>\n</html>\n";
        let patched = insert(html, &Anchor::line_after("<head>"), "    <meta charset=\"utf-8\">", "index.html")
            .unwrap();
        assert_eq!(
            patched,
            "<html>\n  <head>\n    <meta charset=\"utf-8\">\n  </head>\n</html>\n"
        );
    }

    #[test]
    fn test_multiline_payload_and_trailing_newline() {
        let patched = insert("a\nb\n", &Anchor::line_after("a"), "x\ny\n", "f.txt").unwrap();
        assert_eq!(patched, "a\nx\ny\nb\n");
    }

    #[test]
    fn test_after_multiline_needle_uses_its_last_line() {
        let patched = insert("a\nb\nc\n", &Anchor::line_after("a\nb"), "X", "f.txt").unwrap();
        assert_eq!(patched, "a\nb\nX\nc\n");
    }

    #[test]
    fn test_after_needle_ending_in_newline() {
        let patched = insert("a\nb\nc\n", &Anchor::line_after("a\n"), "X", "f.txt").unwrap();
        assert_eq!(patched, "a\nX\nb\nc\n");
    }

    #[test]
    fn test_crlf_is_preserved() {
        let patched = insert("a\r\nb\r\n", &Anchor::line_before("b"), "x\ny", "f.txt").unwrap();
        assert_eq!(patched, "a\r\nx\r\ny\r\nb\r\n");
    }

    #[test]
    fn test_after_last_line_without_newline() {
        let patched = insert("a\nb", &Anchor::line_after("b"), "c", "f.txt").unwrap();
        assert_eq!(patched, "a\nb\nc");
    }

    #[test]
    fn test_before_first_line() {
        let patched = insert("a\nb\n", &Anchor::line_before("a"), "start", "f.txt").unwrap();
        assert_eq!(patched, "start\na\nb\n");
    }

    #[test]
    fn test_missing_needle() {
        let err = insert(PACKAGE_JSON, &Anchor::line_before("\"jest\":"), "x", "package.json")
            .unwrap_err();
        match err {
            Error::AnchorNotFound { path, needle } => {
                assert_eq!(path, "package.json");
                assert_eq!(needle, "\"jest\":");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_needle() {
        let err = insert("x\ny\nx\n", &Anchor::line_after("x"), "z", "f.txt").unwrap_err();
        assert!(matches!(err, Error::AmbiguousAnchor { occurrences: 2, .. }));
    }

    #[test]
    fn test_needle_inserted_earlier_can_be_targeted() {
        let first = insert("a\nb\n", &Anchor::line_after("a"), "// plugins", "f.ts").unwrap();
        let second = insert(&first, &Anchor::line_after("// plugins"), "jest()", "f.ts").unwrap();
        assert_eq!(second, "a\n// plugins\njest()\nb\n");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn line() -> impl Strategy<Value = String> {
            "[a-z ]{0,12}"
        }

        proptest! {
            #[test]
            fn unique_needle_insertion_only_adds_payload(
                before in prop::collection::vec(line(), 0..6),
                after in prop::collection::vec(line(), 0..6),
                payload in "[a-z]{1,10}",
                place_before in any::<bool>(),
            ) {
                let needle = "@@ANCHOR@@";
                let mut lines = before.clone();
                lines.push(format!("  {}", needle));
                lines.extend(after.clone());
                let content = format!("{}\n", lines.join("\n"));

                let anchor = if place_before {
                    Anchor::line_before(needle)
                } else {
                    Anchor::line_after(needle)
                };
                let patched = insert(&content, &anchor, &payload, "f.txt").unwrap();

                let needle_line = before.len();
                let payload_line = if place_before { needle_line } else { needle_line + 1 };
                let body = patched.strip_suffix('\n').unwrap_or(&patched);
                let mut patched_lines: Vec<&str> = body.split('\n').collect();
                prop_assert_eq!(patched_lines.remove(payload_line), payload.as_str());
                prop_assert_eq!(format!("{}\n", patched_lines.join("\n")), content);
            }

            #[test]
            fn absent_needle_never_patches(content in "[a-z\n]{0,40}") {
                let err = insert(&content, &Anchor::line_after("@@"), "x", "f.txt").unwrap_err();
                prop_assert!(matches!(err, Error::AnchorNotFound { .. }), "unexpected error");
            }
        }
    }
}
