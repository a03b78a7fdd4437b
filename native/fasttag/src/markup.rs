//! Trusted Markup
//!
//! `Markup` is finished, already-escaped HTML. Once built it is never
//! mutated and never escaped again: embedding it as a child copies its
//! content verbatim. Equality and hashing go by content.

use crate::error::MarkupError;
use std::borrow::Cow;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Header written in front of serialized markup
const MAGIC: &[u8; 4] = b"FTM1";
const HEADER_LEN: usize = MAGIC.len() + 4;

/// The HTML5 document type declaration
pub const DOCTYPE: Markup = Markup::from_static("<!DOCTYPE html>\n");

/// Immutable, already-safe HTML
#[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Markup(Cow<'static, str>);

impl Markup {
    /// Wrap a static literal as trusted markup (usable in `const`)
    pub const fn from_static(html: &'static str) -> Self {
        Markup(Cow::Borrowed(html))
    }

    /// Wrap text that the caller guarantees is already safe HTML
    pub fn from_trusted(html: impl Into<String>) -> Self {
        Markup(Cow::Owned(html.into()))
    }

    /// Wrap trusted bytes, which must be valid UTF-8
    pub fn from_utf8(bytes: Vec<u8>) -> Result<Self, MarkupError> {
        String::from_utf8(bytes)
            .map(|s| Markup(Cow::Owned(s)))
            .map_err(|_| MarkupError::InvalidUtf8)
    }

    /// Copy trusted bytes into markup, rejecting invalid UTF-8 rather than altering it
    pub fn from_trusted_bytes(bytes: &[u8]) -> Result<Self, MarkupError> {
        std::str::from_utf8(bytes)
            .map(|s| Markup(Cow::Owned(s.to_owned())))
            .map_err(|_| MarkupError::InvalidUtf8)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0.into_owned()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenate raw content, no separator and no re-escaping
    pub fn concat(&self, other: &Markup) -> Markup {
        let mut out = String::with_capacity(self.len() + other.len());
        out.push_str(&self.0);
        out.push_str(&other.0);
        Markup(Cow::Owned(out))
    }

    /// Name of the leading tag, or `""` when the content does not start with `<`
    pub fn tag_name(&self) -> &str {
        let Some(rest) = self.0.strip_prefix('<') else {
            return "";
        };
        let end = rest
            .find(|c: char| c == ' ' || c == '>')
            .unwrap_or(rest.len());
        &rest[..end]
    }

    /// Serialize to `FTM1` + little-endian u32 length + raw content
    pub fn serialize(&self) -> Result<Vec<u8>, MarkupError> {
        let bytes = self.as_bytes();
        let header = length_header(bytes.len())?;
        let mut out = Vec::with_capacity(HEADER_LEN + bytes.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&header);
        out.extend_from_slice(bytes);
        Ok(out)
    }

    /// Inverse of `serialize`
    pub fn deserialize(data: &[u8]) -> Result<Markup, MarkupError> {
        if data.len() < HEADER_LEN || &data[..MAGIC.len()] != MAGIC {
            return Err(MarkupError::MissingMagic);
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&data[MAGIC.len()..HEADER_LEN]);
        let expected = u32::from_le_bytes(len_bytes) as usize;

        let body = &data[HEADER_LEN..];
        if body.len() < expected {
            return Err(MarkupError::Truncated {
                expected,
                found: body.len(),
            });
        }
        if body.len() > expected {
            return Err(MarkupError::TrailingBytes(body.len() - expected));
        }
        Markup::from_utf8(body.to_vec())
    }
}

/// Encode a content length, failing when it does not fit the u32 header
fn length_header(len: usize) -> Result<[u8; 4], MarkupError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| MarkupError::TooLarge(len))
}

/// Render capability: anything that can hand over finished, trusted markup
///
/// Implementors are trusted transitively; their output is inserted
/// without escaping or validation.
pub trait Render {
    fn render_markup(&self) -> Markup;
}

impl Render for Markup {
    fn render_markup(&self) -> Markup {
        self.clone()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fasttag.Markup>{}</fasttag.Markup>", self.0)
    }
}

impl AsRef<str> for Markup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Markup> for String {
    fn from(m: Markup) -> String {
        m.into_string()
    }
}

impl Add for Markup {
    type Output = Markup;

    fn add(self, rhs: Markup) -> Markup {
        let mut out = self.into_string();
        out.push_str(rhs.as_str());
        Markup(Cow::Owned(out))
    }
}

impl Add<&Markup> for &Markup {
    type Output = Markup;

    fn add(self, rhs: &Markup) -> Markup {
        self.concat(rhs)
    }
}

impl AddAssign<&Markup> for Markup {
    fn add_assign(&mut self, rhs: &Markup) {
        self.0.to_mut().push_str(rhs.as_str());
    }
}
