//! HTML Escaping
//!
//! SIMD-accelerated escaping using memchr. The two escaping sets
//! differ:
//!
//! - Text content: `&` -> `&amp;`, `<` -> `&lt;`. A bare `>` is left alone.
//! - Attribute values: `&` -> `&amp;`, `"` -> `&quot;`. `<` and `>` are left alone.
//!
//! All delimiters are ASCII, so slicing the input `&str` at a match position
//! always lands on a char boundary.

use memchr::{memchr, memchr2, memchr3};
use std::borrow::Cow;

const SPACES: &str = "                                                                ";

/// Append `n` spaces
#[inline]
pub fn push_spaces(out: &mut String, mut n: usize) {
    while n > SPACES.len() {
        out.push_str(SPACES);
        n -= SPACES.len();
    }
    out.push_str(&SPACES[..n]);
}

/// Append a newline followed by `indent` spaces
#[inline]
pub fn push_newline(out: &mut String, indent: usize) {
    out.push('\n');
    push_spaces(out, indent);
}

/// Escape text content, borrowing when nothing needs escaping
#[inline]
pub fn escape_text(input: &str) -> Cow<'_, str> {
    // Fast path: no special characters
    if memchr2(b'&', b'<', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    escape_text_into(input, 0, &mut out);
    Cow::Owned(out)
}

/// Escape text content into `out`, following each newline with `indent` spaces
pub fn escape_text_into(input: &str, indent: usize, out: &mut String) {
    let bytes = input.as_bytes();
    let mut start = 0;

    loop {
        let rest = &bytes[start..];
        let found = if indent == 0 {
            memchr2(b'&', b'<', rest)
        } else {
            memchr3(b'&', b'<', b'\n', rest)
        };

        let Some(offset) = found else {
            out.push_str(&input[start..]);
            return;
        };

        let pos = start + offset;
        out.push_str(&input[start..pos]);
        match bytes[pos] {
            b'&' => out.push_str("&amp;"),
            b'<' => out.push_str("&lt;"),
            _ => push_newline(out, indent),
        }
        start = pos + 1;
    }
}

/// Escape an attribute value into `out` (the surrounding quotes are not written)
pub fn escape_attr_into(input: &str, out: &mut String) {
    let bytes = input.as_bytes();
    let mut start = 0;

    while let Some(offset) = memchr2(b'&', b'"', &bytes[start..]) {
        let pos = start + offset;
        out.push_str(&input[start..pos]);
        if bytes[pos] == b'&' {
            out.push_str("&amp;");
        } else {
            out.push_str("&quot;");
        }
        start = pos + 1;
    }
    out.push_str(&input[start..]);
}

/// Copy already-trusted markup verbatim, following each newline with `indent` spaces
pub fn push_indented(input: &str, indent: usize, out: &mut String) {
    if indent == 0 {
        out.push_str(input);
        return;
    }

    let bytes = input.as_bytes();
    let mut start = 0;
    while let Some(offset) = memchr(b'\n', &bytes[start..]) {
        let pos = start + offset;
        out.push_str(&input[start..pos]);
        push_newline(out, indent);
        start = pos + 1;
    }
    out.push_str(&input[start..]);
}

/// Check whether text contains a newline
#[inline]
pub fn has_newline(input: &str) -> bool {
    memchr(b'\n', input.as_bytes()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("text&<>", "text&amp;&lt;>")]
    #[case("This is an <example> of text", "This is an &lt;example> of text")]
    #[case("\"quoted\"", "\"quoted\"")]
    #[case("&amp;", "&amp;amp;")]
    #[case("", "")]
    fn test_escape_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_text(input), expected);
    }

    #[rstest]
    #[case("closest tr", "closest tr")]
    #[case("Tom & Jerry \"the mouse\"", "Tom &amp; Jerry &quot;the mouse&quot;")]
    #[case("<b>", "<b>")]
    #[case("it's", "it's")]
    fn test_escape_attr(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(attr(input), expected);
    }

    fn attr(input: &str) -> String {
        let mut out = String::new();
        escape_attr_into(input, &mut out);
        out
    }

    #[test]
    fn test_escape_borrows_when_clean() {
        assert!(matches!(escape_text("hello"), Cow::Borrowed(_)));
        assert!(matches!(escape_text("a & b"), Cow::Owned(_)));
    }

    #[test]
    fn test_escape_text_reindents_newlines() {
        let mut out = String::new();
        escape_text_into("hello\nworld & <you>", 2, &mut out);
        assert_eq!(out, "hello\n  world &amp; &lt;you>");
    }

    #[test]
    fn test_escape_text_without_indent_keeps_newlines() {
        let mut out = String::new();
        escape_text_into("a\nb", 0, &mut out);
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn test_push_indented() {
        let mut out = String::new();
        push_indented("<td>a</td>\n<td>b&amp;</td>", 4, &mut out);
        assert_eq!(out, "<td>a</td>\n    <td>b&amp;</td>");
    }

    #[test]
    fn test_push_spaces_beyond_buffer() {
        let mut out = String::new();
        push_spaces(&mut out, 150);
        assert_eq!(out.len(), 150);
        assert!(out.bytes().all(|b| b == b' '));
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(escape_text("héllo <wörld> & ☃"), "héllo &lt;wörld> &amp; ☃");
    }

    proptest! {
        #[test]
        fn prop_text_escaping_asymmetry(s in ".*") {
            let escaped = escape_text(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert_eq!(escaped.matches('>').count(), s.matches('>').count());
            prop_assert_eq!(escaped.replace("&lt;", "<").replace("&amp;", "&"), s);
        }

        #[test]
        fn prop_attr_escaping(s in ".*") {
            let escaped = attr(&s);
            prop_assert!(!escaped.contains('"'));
            prop_assert_eq!(escaped.matches('<').count(), s.matches('<').count());
            prop_assert_eq!(escaped.replace("&quot;", "\"").replace("&amp;", "&"), s);
        }
    }
}
