//! HTML Attribute Serialization
//!
//! Turns `(key, value)` pairs into ` name="value"` fragments.
//!
//! Key transform: a key starting with `_` loses that first underscore and
//! the rest is used verbatim (`_class` -> `class`, `_` -> `_`). Any other key
//! has every `_` replaced with `-` (`hx_target` -> `hx-target`).

use super::escape::escape_attr_into;
use super::value::{format_float, Value};
use crate::error::RenderError;
use memchr::memchr;
use std::borrow::Cow;
use std::fmt::Write;

/// Transform a raw attribute key into the emitted attribute name
#[inline]
pub fn transform_key(raw: &str) -> Cow<'_, str> {
    if let Some(rest) = raw.strip_prefix('_') {
        if rest.is_empty() {
            return Cow::Borrowed(raw);
        }
        return Cow::Borrowed(rest);
    }
    if memchr(b'_', raw.as_bytes()).is_none() {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(raw.replace('_', "-"))
}

/// Check a transformed attribute name against the HTML attribute-name rules
#[inline]
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

#[inline]
fn is_name_char(c: char) -> bool {
    !(c.is_ascii_whitespace()
        || c.is_control()
        || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'))
}

/// Transform and validate a raw key
pub fn attribute_name(raw: &str) -> Result<Cow<'_, str>, RenderError> {
    let name = transform_key(raw);
    if is_valid_attribute_name(&name) {
        Ok(name)
    } else {
        Err(RenderError::InvalidAttributeName {
            key: raw.to_string(),
            name: name.into_owned(),
        })
    }
}

/// Write an escaped attribute value (without quotes)
///
/// Containers are written in their generic representation, nested values
/// counted from `depth`.
fn write_value(
    value: &Value<'_>,
    out: &mut String,
    depth: usize,
    max_depth: usize,
) -> Result<(), RenderError> {
    match value {
        Value::Str(s) => escape_attr_into(s, out),
        Value::Int(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::Float(x) => {
            let _ = write!(out, "{}", format_float(*x));
        }
        other => {
            let mut repr = String::new();
            other.write_repr(&mut repr, depth, max_depth)?;
            escape_attr_into(&repr, out);
        }
    }
    Ok(())
}

/// Rough number of bytes the attributes in `pairs` will produce
pub fn estimated_len<K: AsRef<str>>(pairs: &[(K, Value<'_>)]) -> usize {
    pairs
        .iter()
        .map(|(k, v)| {
            k.as_ref().len()
                + 4
                + match v {
                    Value::Str(s) => s.len(),
                    _ => 20,
                }
        })
        .sum()
}

/// Ordered attribute set, unique by transformed name
///
/// Re-inserting a name replaces the earlier value in its original position;
/// inserting `false` removes it.
#[derive(Debug, Default, Clone)]
pub struct AttributeSet<'v> {
    entries: Vec<(Cow<'v, str>, &'v Value<'v>)>,
}

impl<'v> AttributeSet<'v> {
    /// Create an empty set
    pub fn new() -> Self {
        AttributeSet { entries: Vec::new() }
    }

    /// Build a set from raw `(key, value)` pairs in order
    pub fn from_pairs<K>(pairs: &'v [(K, Value<'v>)]) -> Result<Self, RenderError>
    where
        K: AsRef<str>,
    {
        let mut set = AttributeSet {
            entries: Vec::with_capacity(pairs.len()),
        };
        for (key, value) in pairs {
            set.insert(key.as_ref(), value)?;
        }
        Ok(set)
    }

    /// Insert a raw key, applying the key transform first
    pub fn insert(&mut self, raw_key: &'v str, value: &'v Value<'v>) -> Result<(), RenderError> {
        let name = attribute_name(raw_key)?;
        let existing = self.entries.iter().position(|(n, _)| *n == name);

        match (existing, value) {
            (Some(idx), Value::Bool(false)) => {
                self.entries.remove(idx);
            }
            (None, Value::Bool(false)) => {}
            (Some(idx), _) => self.entries[idx].1 = value,
            (None, _) => self.entries.push((name, value)),
        }
        Ok(())
    }

    /// Look up the value stored under a transformed name
    pub fn get(&self, name: &str) -> Option<&Value<'v>> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` in output order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<'v>)> {
        self.entries.iter().map(|(n, v)| (n.as_ref(), *v))
    }

    /// Write ` name="value"` / ` name` for every entry
    ///
    /// `depth` is the nesting level of the values; container values nested
    /// deeper than `max_depth` fail with `NestingTooDeep`.
    pub fn write_to(
        &self,
        out: &mut String,
        depth: usize,
        max_depth: usize,
    ) -> Result<(), RenderError> {
        for (name, value) in &self.entries {
            out.push(' ');
            out.push_str(name);
            if let Value::Bool(true) = value {
                continue;
            }
            out.push_str("=\"");
            write_value(value, out, depth, max_depth)?;
            out.push('"');
        }
        Ok(())
    }
}
