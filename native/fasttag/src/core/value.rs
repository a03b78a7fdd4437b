//! Loose Value Model
//!
//! `Value` is the loosely typed data accepted as an attribute value or as a
//! key/value inside a mapping child. Every value has a generic textual
//! representation (`Display`), which is what gets escaped when a value has
//! no more specific rendering rule:
//!
//! - strings display as themselves, but are quoted (`'a'`) inside containers
//! - lists display as `[1, 2]`, maps as `{'a': 2}`
//! - numbers use the shared number format (`format_float`)

use crate::error::RenderError;
use crate::render::context::DEFAULT_MAX_DEPTH;
use std::borrow::Cow;
use std::fmt::{self, Write};

/// Loosely typed attribute / mapping value
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
    List(Vec<Value<'a>>),
    Map(Vec<(Value<'a>, Value<'a>)>),
}

impl<'a> Value<'a> {
    /// Build a map value from ordered key/value pairs
    pub fn map<K, V, I>(pairs: I) -> Self
    where
        K: Into<Value<'a>>,
        V: Into<Value<'a>>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Convert into a value that owns all of its data
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Bool(b) => Value::Bool(b),
            Value::Int(n) => Value::Int(n),
            Value::Float(f) => Value::Float(f),
            Value::Str(s) => Value::Str(Cow::Owned(s.into_owned())),
            Value::List(items) => Value::List(items.into_iter().map(Value::into_owned).collect()),
            Value::Map(pairs) => Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            ),
        }
    }

    /// Write the generic representation into `out`
    ///
    /// `depth` is the nesting level of this value. A container nested
    /// deeper than `max_depth` fails with `NestingTooDeep`.
    pub fn write_repr(
        &self,
        out: &mut String,
        depth: usize,
        max_depth: usize,
    ) -> Result<(), RenderError> {
        self.repr_into(out, depth, max_depth, false)
    }

    fn repr_into(
        &self,
        out: &mut String,
        depth: usize,
        max_depth: usize,
        nested: bool,
    ) -> Result<(), RenderError> {
        if depth > max_depth {
            return Err(RenderError::NestingTooDeep(max_depth));
        }
        match self {
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(n) => {
                let _ = write!(out, "{}", n);
            }
            Value::Float(x) => {
                let _ = write!(out, "{}", format_float(*x));
            }
            Value::Str(s) if nested => push_quoted(s, out),
            Value::Str(s) => out.push_str(s),
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.repr_into(out, depth + 1, max_depth, true)?;
                }
                out.push(']');
            }
            Value::Map(pairs) => write_map_repr(pairs, out, depth, max_depth)?,
        }
        Ok(())
    }
}

/// Write mapping pairs as `{'a': 2}`, with the same depth rule as `Value::write_repr`
pub fn write_map_repr(
    pairs: &[(Value<'_>, Value<'_>)],
    out: &mut String,
    depth: usize,
    max_depth: usize,
) -> Result<(), RenderError> {
    if depth > max_depth {
        return Err(RenderError::NestingTooDeep(max_depth));
    }
    out.push('{');
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        k.repr_into(out, depth + 1, max_depth, true)?;
        out.push_str(": ");
        v.repr_into(out, depth + 1, max_depth, true)?;
    }
    out.push('}');
    Ok(())
}

/// Over-deep values display as `[...]`
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        match self.write_repr(&mut out, 0, DEFAULT_MAX_DEPTH) {
            Ok(()) => f.write_str(&out),
            Err(_) => f.write_str("[...]"),
        }
    }
}

/// Single-quoted string with backslash escapes for quotes and control whitespace
fn push_quoted(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

/// Display adapter for the shared float format
///
/// Shortest round-trip digits in plain notation for magnitudes in
/// `[1e-5, 1e16)`, exponent notation outside it. Integral floats print
/// without a fraction (`3.0` -> `3`), matching `%g`.
#[derive(Debug, Clone, Copy)]
pub struct FloatDisplay(f64);

/// Format a float with the shared number format
#[inline]
pub fn format_float(value: f64) -> FloatDisplay {
    FloatDisplay(value)
}

impl fmt::Display for FloatDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            return f.write_str("nan");
        }
        if v.is_infinite() {
            return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
        }
        let magnitude = v.abs();
        if magnitude == 0.0 || (1e-5..1e16).contains(&magnitude) {
            write!(f, "{}", v)
        } else {
            write!(f, "{:e}", v)
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value<'_> {
            fn from(n: $t) -> Self {
                Value::Int(i64::from(n))
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! value_from_wide_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value<'_> {
            fn from(n: $t) -> Self {
                match i64::try_from(n) {
                    Ok(n) => Value::Int(n),
                    Err(_) => Value::Str(Cow::Owned(n.to_string())),
                }
            }
        })*
    };
}

value_from_wide_int!(u64, usize, isize, i128, u128);

impl From<f32> for Value<'_> {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<f64> for Value<'_> {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::Str(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::Str(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Value<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Value::Str(s)
    }
}

impl<'a, T: Into<Value<'a>>> From<Vec<T>> for Value<'a> {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<'a, T: Into<Value<'a>>, const N: usize> From<[T; N]> for Value<'a> {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
