//! Error Types
//!
//! Rendering never fails on the *shape* of its input: unknown values fall
//! back to their textual form. The errors here cover the few inputs that
//! cannot be turned into well-formed markup at all, plus decoding of
//! serialized `Markup`.

use thiserror::Error;

/// Errors raised synchronously by a render call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The attribute key transformed into an empty or illegal attribute name
    #[error("invalid attribute name {name:?} (from key {key:?})")]
    InvalidAttributeName { key: String, name: String },

    /// The tag name cannot appear between `<` and `>`
    #[error("invalid tag name {0:?}")]
    InvalidTagName(String),

    /// Elements, sequences or container values nested deeper than the context allows
    #[error("nesting exceeds the maximum depth of {0}")]
    NestingTooDeep(usize),

    /// Trusted markup that cannot be used as-is
    #[error(transparent)]
    Markup(#[from] MarkupError),
}

impl RenderError {
    /// Short machine-readable reason, used as an atom on the NIF boundary
    pub fn reason(&self) -> &'static str {
        match self {
            RenderError::InvalidAttributeName { .. } => "invalid_attribute_name",
            RenderError::InvalidTagName(_) => "invalid_tag_name",
            RenderError::NestingTooDeep(_) => "nesting_too_deep",
            RenderError::Markup(_) => "invalid_markup",
        }
    }
}

/// Errors from `Markup::deserialize`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("missing markup header")]
    MissingMagic,

    #[error("truncated markup: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("{0} unexpected trailing bytes after markup")]
    TrailingBytes(usize),

    #[error("markup is not valid UTF-8")]
    InvalidUtf8,

    #[error("markup of {0} bytes exceeds the serialized length limit")]
    TooLarge(usize),
}
