//! Elixir Term Conversion Utilities
//!
//! Decodes Elixir terms into `Child` / `Value` / `Element` and encodes
//! rendered `Markup` back as `{:safe, binary}`.
//!
//! Decoding never fails on the shape of a term: anything without a more
//! specific rule becomes opaque text. The only error is nesting deeper
//! than the render context allows; decoding enforces the same limit as
//! rendering.

use crate::error::{MarkupError, RenderError};
use crate::markup::Markup;
use crate::render::context::RenderContext;
use crate::render::{Child, Element};
use crate::core::value::Value;
use rustler::types::tuple::get_tuple;
use rustler::{Atom, Binary, Encoder, Env, ListIterator, MapIterator, NewBinary, Term, TermType};
use std::borrow::Cow;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    safe,
    error,
    nil,
}

/// Decode a child term, tracking nesting depth
fn decode_child<'a>(
    term: Term<'a>,
    ctx: &RenderContext,
    depth: usize,
) -> Result<Child<'a>, RenderError> {
    if depth > ctx.max_depth {
        return Err(RenderError::NestingTooDeep(ctx.max_depth));
    }

    let child = match term.get_type() {
        TermType::Binary => Child::Text(binary_to_str(term)),
        TermType::Integer => match term.decode::<i64>() {
            Ok(n) => Child::Int(n),
            Err(_) => Child::Opaque(format!("{:?}", term)),
        },
        TermType::Float => match term.decode::<f64>() {
            Ok(x) => Child::Float(x),
            Err(_) => Child::Opaque(format!("{:?}", term)),
        },
        TermType::List => {
            let mut items = Vec::new();
            if let Ok(iter) = term.decode::<ListIterator<'a>>() {
                for item in iter {
                    items.push(decode_child(item, ctx, depth + 1)?);
                }
            }
            Child::Seq(items)
        }
        TermType::Map => Child::Map(decode_pairs(term, ctx, depth)?),
        TermType::Atom => match term.decode::<Atom>() {
            Ok(atom) if atom == nil() => Child::Seq(Vec::new()),
            _ => Child::Opaque(atom_name(term)),
        },
        TermType::Tuple => match safe_markup(term) {
            Some(markup) => Child::Markup(markup?),
            None => Child::Opaque(format!("{:?}", term)),
        },
        _ => Child::Opaque(format!("{:?}", term)),
    };
    Ok(child)
}

/// Decode a loose value (attribute value or mapping entry)
fn decode_value<'a>(
    term: Term<'a>,
    ctx: &RenderContext,
    depth: usize,
) -> Result<Value<'a>, RenderError> {
    if depth > ctx.max_depth {
        return Err(RenderError::NestingTooDeep(ctx.max_depth));
    }

    let value = match term.get_type() {
        TermType::Binary => Value::Str(binary_to_str(term)),
        TermType::Integer => match term.decode::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Str(Cow::Owned(format!("{:?}", term))),
        },
        TermType::Float => match term.decode::<f64>() {
            Ok(x) => Value::Float(x),
            Err(_) => Value::Str(Cow::Owned(format!("{:?}", term))),
        },
        TermType::Atom => match term.decode::<bool>() {
            Ok(b) => Value::Bool(b),
            Err(_) => Value::Str(Cow::Owned(atom_name(term))),
        },
        TermType::List => {
            let mut items = Vec::new();
            if let Ok(iter) = term.decode::<ListIterator<'a>>() {
                for item in iter {
                    items.push(decode_value(item, ctx, depth + 1)?);
                }
            }
            Value::List(items)
        }
        TermType::Map => Value::Map(decode_pairs(term, ctx, depth)?),
        TermType::Tuple => match safe_markup(term) {
            Some(markup) => Value::Str(Cow::Owned(markup?.into_string())),
            None => Value::Str(Cow::Owned(format!("{:?}", term))),
        },
        _ => Value::Str(Cow::Owned(format!("{:?}", term))),
    };
    Ok(value)
}

fn decode_pairs<'a>(
    term: Term<'a>,
    ctx: &RenderContext,
    depth: usize,
) -> Result<Vec<(Value<'a>, Value<'a>)>, RenderError> {
    let mut pairs = Vec::new();
    if let Ok(iter) = term.decode::<MapIterator<'a>>() {
        for (k, v) in iter {
            pairs.push((decode_value(k, ctx, depth + 1)?, decode_value(v, ctx, depth + 1)?));
        }
    }
    Ok(pairs)
}

/// Decode attributes from a keyword list or a map
///
/// Keys may be atoms or binaries. `nil` values drop the attribute;
/// entries that are not key/value pairs are skipped.
pub fn decode_attrs<'a>(
    term: Term<'a>,
    ctx: &RenderContext,
) -> Result<Vec<(Cow<'a, str>, Value<'a>)>, RenderError> {
    let mut attrs = Vec::new();
    let mut push = |k: Term<'a>, v: Term<'a>| -> Result<(), RenderError> {
        if is_nil(v) {
            return Ok(());
        }
        let key = match k.get_type() {
            TermType::Atom => Cow::Owned(atom_name(k)),
            TermType::Binary => binary_to_str(k),
            _ => Cow::Owned(format!("{:?}", k)),
        };
        attrs.push((key, decode_value(v, ctx, 1)?));
        Ok(())
    };

    match term.get_type() {
        TermType::Map => {
            if let Ok(iter) = term.decode::<MapIterator<'a>>() {
                for (k, v) in iter {
                    push(k, v)?;
                }
            }
        }
        TermType::List => {
            if let Ok(iter) = term.decode::<ListIterator<'a>>() {
                for entry in iter {
                    let Ok(parts) = get_tuple(entry) else {
                        continue;
                    };
                    if let [k, v] = parts.as_slice() {
                        push(*k, *v)?;
                    }
                }
            }
        }
        _ => {}
    }
    Ok(attrs)
}

/// Decode an element spec `{name, children, attrs}`
pub fn term_to_element<'a>(term: Term<'a>, ctx: &RenderContext) -> Result<Element<'a>, RenderError> {
    let parts = get_tuple(term).unwrap_or_default();
    match parts.as_slice() {
        [name, children, attrs] => build_element(*name, *children, *attrs, ctx),
        _ => Err(RenderError::InvalidTagName(format!("{:?}", term))),
    }
}

/// Build an element from its three decoded parts
pub fn build_element<'a>(
    name: Term<'a>,
    children: Term<'a>,
    attrs: Term<'a>,
    ctx: &RenderContext,
) -> Result<Element<'a>, RenderError> {
    let name = match name.get_type() {
        TermType::Atom => Cow::Owned(atom_name(name)),
        TermType::Binary => binary_to_str(name),
        _ => return Err(RenderError::InvalidTagName(format!("{:?}", name))),
    };

    // A bare child is accepted where a list is expected
    let children = match decode_child(children, ctx, 0)? {
        Child::Seq(items) => items,
        single => vec![single],
    };

    Ok(Element::new(name)
        .children(children)
        .attrs(decode_attrs(attrs, ctx)?))
}

/// Decode `{:safe, iodata}` into trusted markup
///
/// Returns `None` when the term is not a safe tuple. Trusted bytes that are
/// not valid UTF-8 are rejected, never replaced.
fn safe_markup(term: Term<'_>) -> Option<Result<Markup, MarkupError>> {
    let parts = get_tuple(term).ok()?;
    let [tag, body] = parts.as_slice() else {
        return None;
    };
    if tag.decode::<Atom>().ok()? != safe() {
        return None;
    }
    let binary = Binary::from_iolist(*body).ok()?;
    Some(Markup::from_trusted_bytes(binary.as_slice()))
}

/// Borrow a binary as text, decoding invalid UTF-8 lossily
fn binary_to_str<'a>(term: Term<'a>) -> Cow<'a, str> {
    if let Ok(s) = term.decode::<&'a str>() {
        return Cow::Borrowed(s);
    }
    match term.decode::<Binary>() {
        Ok(binary) => Cow::Owned(String::from_utf8_lossy(binary.as_slice()).into_owned()),
        Err(_) => Cow::Borrowed(""),
    }
}

fn atom_name(term: Term<'_>) -> String {
    term.atom_to_string()
        .unwrap_or_else(|_| format!("{:?}", term))
}

fn is_nil(term: Term<'_>) -> bool {
    term.decode::<Atom>().is_ok_and(|atom| atom == nil())
}

/// Encode markup as `{:safe, binary}`
pub fn markup_to_term<'a>(env: Env<'a>, markup: &Markup) -> Term<'a> {
    (safe(), bytes_to_binary(env, markup.as_bytes())).encode(env)
}

/// Encode a render result as `{:safe, binary}` or `{:error, message}`
pub fn result_to_term<'a>(env: Env<'a>, result: Result<Markup, RenderError>) -> Term<'a> {
    match result {
        Ok(markup) => markup_to_term(env, &markup),
        Err(e) => error_to_term(env, &e),
    }
}

pub fn error_to_term<'a>(env: Env<'a>, err: &RenderError) -> Term<'a> {
    (error(), err.to_string()).encode(env)
}

/// Create a binary from bytes
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
