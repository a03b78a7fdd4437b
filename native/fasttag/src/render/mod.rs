//! Tag Builder and Child Renderer
//!
//! An `Element` is an ephemeral `(name, attributes, children)` triple that
//! lives for one render call. Rendering writes straight into one output
//! buffer and returns it as `Markup`.
//!
//! Layout rules when indentation is enabled with width `W`:
//! - every child goes on its own line, `W` spaces deeper than its parent,
//!   and the close tag goes on its own line at the parent's level
//! - an element whose only child is a single line of text stays on one
//!   line (`<td>hello</td>`), as do empty elements and `<pre>`
//! - nested sequences are flattened, one line per leaf
//!
//! Rather than re-scanning nested output, the renderer carries a *base
//! indent*: the number of spaces written after every newline at the
//! current position, inside text and trusted markup alike.

pub mod context;

use crate::core::attributes::{self, AttributeSet};
use crate::core::escape::{escape_text, escape_text_into, has_newline, push_indented, push_newline};
use crate::core::value::{format_float, write_map_repr, Value};
use crate::error::RenderError;
use crate::markup::{Markup, Render};
use crate::tags;
use context::RenderContext;
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::Arc;

/// One child of an element
///
/// A closed set of variants dispatched by tag; nothing is probed at runtime.
#[derive(Clone)]
pub enum Child<'a> {
    /// Already-safe markup, inserted verbatim
    Markup(Markup),
    /// A nested element, rendered with the parent's context
    Element(Box<Element<'a>>),
    /// Text, escaped
    Text(Cow<'a, str>),
    Int(i64),
    Float(f64),
    /// Nested children, flattened
    Seq(Vec<Child<'a>>),
    /// A mapping, rendered as one escaped text leaf (`{'a': 2}`)
    Map(Vec<(Value<'a>, Value<'a>)>),
    /// Textual form of a value with no more specific rule, escaped
    Opaque(String),
    /// A collaborator exposing the render capability, inserted verbatim
    External(Arc<dyn Render + Send + Sync>),
}

impl<'a> Child<'a> {
    /// Wrap any displayable value as escaped text
    pub fn opaque(value: impl fmt::Display) -> Self {
        Child::Opaque(value.to_string())
    }

    /// Build a mapping child from ordered pairs
    pub fn map<K, V, I>(pairs: I) -> Self
    where
        K: Into<Value<'a>>,
        V: Into<Value<'a>>,
        I: IntoIterator<Item = (K, V)>,
    {
        Child::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Wrap a render-capable collaborator
    pub fn external(renderable: impl Render + Send + Sync + 'static) -> Self {
        Child::External(Arc::new(renderable))
    }

    /// Whether this leaf renders as a single line of text
    fn is_single_line_text(&self) -> bool {
        match self {
            Child::Text(s) => !has_newline(s),
            Child::Opaque(s) => !has_newline(s),
            Child::Int(_) | Child::Float(_) | Child::Map(_) => true,
            _ => false,
        }
    }

    /// Rough number of output bytes, without descending into nested elements
    fn estimated_len(&self) -> usize {
        match self {
            Child::Markup(m) => m.len(),
            Child::Text(s) => s.len() + s.len() / 8,
            Child::Opaque(s) => s.len(),
            Child::Element(e) => 2 * e.name.len() + 32,
            Child::Seq(items) => 16 * items.len(),
            _ => 24,
        }
    }
}

impl fmt::Debug for Child<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Markup(m) => f.debug_tuple("Markup").field(m).finish(),
            Child::Element(e) => f.debug_tuple("Element").field(e).finish(),
            Child::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Child::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Child::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Child::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
            Child::Map(pairs) => f.debug_tuple("Map").field(pairs).finish(),
            Child::Opaque(s) => f.debug_tuple("Opaque").field(s).finish(),
            Child::External(r) => f
                .debug_tuple("External")
                .field(&r.render_markup())
                .finish(),
        }
    }
}

impl<'a> From<&'a str> for Child<'a> {
    fn from(s: &'a str) -> Self {
        Child::Text(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for Child<'a> {
    fn from(s: &'a String) -> Self {
        Child::Text(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for Child<'_> {
    fn from(s: String) -> Self {
        Child::Text(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Child<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Child::Text(s)
    }
}

macro_rules! child_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Child<'_> {
            fn from(n: $t) -> Self {
                match i64::try_from(n) {
                    Ok(n) => Child::Int(n),
                    Err(_) => Child::Opaque(n.to_string()),
                }
            }
        })*
    };
}

child_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, i128, u128);

impl From<f32> for Child<'_> {
    fn from(x: f32) -> Self {
        Child::Float(f64::from(x))
    }
}

impl From<f64> for Child<'_> {
    fn from(x: f64) -> Self {
        Child::Float(x)
    }
}

impl From<bool> for Child<'_> {
    fn from(b: bool) -> Self {
        Child::opaque(b)
    }
}

impl From<char> for Child<'_> {
    fn from(c: char) -> Self {
        Child::Opaque(c.to_string())
    }
}

impl From<Markup> for Child<'_> {
    fn from(m: Markup) -> Self {
        Child::Markup(m)
    }
}

impl<'a> From<Element<'a>> for Child<'a> {
    fn from(e: Element<'a>) -> Self {
        Child::Element(Box::new(e))
    }
}

impl From<Arc<dyn Render + Send + Sync>> for Child<'_> {
    fn from(r: Arc<dyn Render + Send + Sync>) -> Self {
        Child::External(r)
    }
}

impl<'a, T: Into<Child<'a>>> From<Vec<T>> for Child<'a> {
    fn from(items: Vec<T>) -> Self {
        Child::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<'a, T: Into<Child<'a>>, const N: usize> From<[T; N]> for Child<'a> {
    fn from(items: [T; N]) -> Self {
        Child::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<'a, T: Into<Child<'a>>> From<Option<T>> for Child<'a> {
    fn from(item: Option<T>) -> Self {
        match item {
            Some(item) => item.into(),
            None => Child::Seq(Vec::new()),
        }
    }
}

impl<'a> From<Value<'a>> for Child<'a> {
    fn from(value: Value<'a>) -> Self {
        match value {
            Value::Bool(b) => Child::opaque(b),
            Value::Int(n) => Child::Int(n),
            Value::Float(x) => Child::Float(x),
            Value::Str(s) => Child::Text(s),
            Value::List(items) => Child::Seq(items.into_iter().map(Child::from).collect()),
            Value::Map(pairs) => Child::Map(pairs),
        }
    }
}

/// An element under construction
#[derive(Debug, Clone)]
pub struct Element<'a> {
    name: Cow<'a, str>,
    attrs: Vec<(Cow<'a, str>, Value<'a>)>,
    children: Vec<Child<'a>>,
}

impl<'a> Element<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>) -> Self {
        Element {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute; the key is transformed at render time
    pub fn attr(mut self, key: impl Into<Cow<'a, str>>, value: impl Into<Value<'a>>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn attrs<K, V, I>(mut self, attrs: I) -> Self
    where
        K: Into<Cow<'a, str>>,
        V: Into<Value<'a>>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.attrs
            .extend(attrs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn child(mut self, child: impl Into<Child<'a>>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<C, I>(mut self, children: I) -> Self
    where
        C: Into<Child<'a>>,
        I: IntoIterator<Item = C>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn push_child(&mut self, child: impl Into<Child<'a>>) {
        self.children.push(child.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(Cow<'a, str>, Value<'a>)] {
        &self.attrs
    }

    pub fn child_nodes(&self) -> &[Child<'a>] {
        &self.children
    }

    pub fn is_void(&self) -> bool {
        tags::is_void(&self.name)
    }

    /// Render with the process-wide indent
    pub fn render(&self) -> Result<Markup, RenderError> {
        self.render_with(&RenderContext::global())
    }

    /// Render with an explicit context
    pub fn render_with(&self, ctx: &RenderContext) -> Result<Markup, RenderError> {
        let mut out = String::with_capacity(self.estimated_len());
        write_element(self, ctx, 0, 0, &mut out)?;
        Ok(Markup::from_trusted(out))
    }

    fn estimated_len(&self) -> usize {
        let attrs = attributes::estimated_len(&self.attrs);
        let children: usize = self.children.iter().map(Child::estimated_len).sum();
        2 * self.name.len() + 8 + attrs + children + 4 * self.children.len()
    }
}

/// Build and render an element in one call, using the process-wide indent
pub fn tag<'a, C, I, K, V, A>(name: &'a str, children: I, attrs: A) -> Result<Markup, RenderError>
where
    C: Into<Child<'a>>,
    I: IntoIterator<Item = C>,
    K: Into<Cow<'a, str>>,
    V: Into<Value<'a>>,
    A: IntoIterator<Item = (K, V)>,
{
    Element::new(name).children(children).attrs(attrs).render()
}

/// Escape text and mark the result as trusted markup
pub fn text(content: &str) -> Markup {
    Markup::from_trusted(escape_text(content).into_owned())
}

/// Check a tag name: an ASCII letter followed by anything that cannot end the tag
pub fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| {
            !(c.is_ascii_whitespace()
                || c.is_control()
                || matches!(c, '<' | '>' | '/' | '"' | '\'' | '='))
        })
}

#[inline]
fn check_depth(depth: usize, ctx: &RenderContext) -> Result<(), RenderError> {
    if depth > ctx.max_depth {
        tracing::debug!(max_depth = ctx.max_depth, "render nesting limit reached");
        return Err(RenderError::NestingTooDeep(ctx.max_depth));
    }
    Ok(())
}

fn write_element(
    el: &Element<'_>,
    ctx: &RenderContext,
    depth: usize,
    base: usize,
    out: &mut String,
) -> Result<(), RenderError> {
    check_depth(depth, ctx)?;
    if !is_valid_tag_name(&el.name) {
        return Err(RenderError::InvalidTagName(el.name.to_string()));
    }
    let attrs = AttributeSet::from_pairs(&el.attrs)?;

    out.push('<');
    out.push_str(&el.name);
    attrs.write_to(out, depth + 1, ctx.max_depth)?;
    out.push('>');

    if tags::is_void(&el.name) {
        if !el.children.is_empty() {
            tracing::warn!(
                tag = %el.name,
                children = el.children.len(),
                "children of a void element are ignored"
            );
        }
        return Ok(());
    }

    let preformatted = el.name == "pre";
    match ctx.indent.width() {
        Some(width) if !preformatted => {
            let mut leaves = Vec::with_capacity(el.children.len());
            collect_leaves(&el.children, ctx, depth, &mut leaves)?;

            let compact = match leaves.as_slice() {
                [] => true,
                [only] => only.is_single_line_text(),
                _ => false,
            };
            if compact {
                for leaf in leaves {
                    write_leaf(leaf, ctx, depth, base, out)?;
                }
            } else {
                let inner = base + width;
                for leaf in leaves {
                    push_newline(out, inner);
                    write_leaf(leaf, ctx, depth, inner, out)?;
                }
                push_newline(out, base);
            }
        }
        _ => {
            // Preformatted content is never re-indented
            let base = if preformatted { 0 } else { base };
            for child in &el.children {
                write_child(child, ctx, depth, base, out)?;
            }
        }
    }

    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
    Ok(())
}

/// Flatten sequences into their leaves
fn collect_leaves<'c, 'a>(
    children: &'c [Child<'a>],
    ctx: &RenderContext,
    depth: usize,
    leaves: &mut Vec<&'c Child<'a>>,
) -> Result<(), RenderError> {
    for child in children {
        match child {
            Child::Seq(items) => {
                check_depth(depth + 1, ctx)?;
                collect_leaves(items, ctx, depth + 1, leaves)?;
            }
            leaf => leaves.push(leaf),
        }
    }
    Ok(())
}

/// Write a child inline; sequence items are joined with newlines
fn write_child(
    child: &Child<'_>,
    ctx: &RenderContext,
    depth: usize,
    base: usize,
    out: &mut String,
) -> Result<(), RenderError> {
    let Child::Seq(items) = child else {
        return write_leaf(child, ctx, depth, base, out);
    };
    check_depth(depth + 1, ctx)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            push_newline(out, base);
        }
        write_child(item, ctx, depth + 1, base, out)?;
    }
    Ok(())
}

fn write_leaf(
    child: &Child<'_>,
    ctx: &RenderContext,
    depth: usize,
    base: usize,
    out: &mut String,
) -> Result<(), RenderError> {
    match child {
        Child::Markup(m) => push_indented(m.as_str(), base, out),
        Child::External(r) => push_indented(r.render_markup().as_str(), base, out),
        Child::Element(e) => write_element(e, ctx, depth + 1, base, out)?,
        Child::Text(s) => escape_text_into(s, base, out),
        Child::Opaque(s) => escape_text_into(s, base, out),
        Child::Int(n) => {
            let _ = write!(out, "{}", n);
        }
        Child::Float(x) => {
            let _ = write!(out, "{}", format_float(*x));
        }
        Child::Map(pairs) => {
            let mut repr = String::new();
            write_map_repr(pairs, &mut repr, depth + 1, ctx.max_depth)?;
            escape_text_into(&repr, base, out);
        }
        Child::Seq(_) => write_child(child, ctx, depth, base, out)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::context::{Indent, IndentGuard, GLOBAL_TEST_LOCK};
    use super::*;
    use crate::tags::{div, input, label, pre, span, td, tr, ul, li, button, p};
    use proptest::prelude::*;

    const NO_ATTRS: [(&str, Value<'static>); 0] = [];

    fn compact() -> RenderContext {
        RenderContext::compact()
    }

    fn width2() -> RenderContext {
        RenderContext::new(Indent::Width(2))
    }

    fn render(el: Element<'_>, ctx: &RenderContext) -> String {
        el.render_with(ctx).unwrap().into_string()
    }

    #[test]
    fn test_text_escaping_in_element() {
        let out = render(Element::new("div").child("text&<>"), &compact());
        assert_eq!(out, "<div>text&amp;&lt;></div>");
    }

    #[test]
    fn test_attribute_escaping() {
        let el = Element::new("span")
            .child("wow")
            .attr("a", "Tom & Jerry \"the mouse\"");
        assert_eq!(
            render(el, &compact()),
            "<span a=\"Tom &amp; Jerry &quot;the mouse&quot;\">wow</span>"
        );
    }

    #[test]
    fn test_key_transforms() {
        let el = Element::new("c").child("cc").attr("_class", "a b c");
        assert_eq!(render(el, &compact()), "<c class=\"a b c\">cc</c>");
        let el = Element::new("b").child("bb").attr("hx_target", "closest tr");
        assert_eq!(render(el, &compact()), "<b hx-target=\"closest tr\">bb</b>");
        assert_eq!(render(div().attr("_", "value"), &compact()), "<div _=\"value\"></div>");
    }

    #[test]
    fn test_void_elements() {
        let el = input()
            .attr("type", "checkbox")
            .attr("checked", true)
            .attr("disabled", false);
        assert_eq!(render(el.clone(), &compact()), "<input type=\"checkbox\" checked>");
        assert_eq!(render(el, &width2()), "<input type=\"checkbox\" checked>");

        let el = Element::new("input").attr("type", "text").attr("value", "value");
        assert_eq!(render(el, &compact()), "<input type=\"text\" value=\"value\">");
    }

    #[test]
    fn test_void_element_ignores_children() {
        let el = Element::new("br").child("ignored").child(span().child("x"));
        assert_eq!(render(el.clone(), &compact()), "<br>");
        assert_eq!(render(el, &width2()), "<br>");
    }

    #[test]
    fn test_numeric_attributes() {
        let el = input()
            .attr("type", "number")
            .attr("value", 10.3)
            .attr("min", -10)
            .attr("max", 100);
        assert_eq!(
            render(el, &width2()),
            "<input type=\"number\" value=\"10.3\" min=\"-10\" max=\"100\">"
        );
    }

    #[test]
    fn test_container_attribute() {
        assert_eq!(
            render(div().attr("a", vec![1, 2]), &compact()),
            "<div a=\"[1, 2]\"></div>"
        );
    }

    #[test]
    fn test_indented_table_row() {
        let row = tr().child(td().child("hello")).child(td().child("world"));
        assert_eq!(
            render(row, &width2()),
            "<tr>\n  <td>hello</td>\n  <td>world</td>\n</tr>"
        );
    }

    #[test]
    fn test_indented_text_children() {
        assert_eq!(render(div().child("value"), &width2()), "<div>value</div>");
        assert_eq!(
            render(span().child("hello").child("world"), &width2()),
            "<span>\n  hello\n  world\n</span>"
        );
        assert_eq!(
            render(span().child("hello\nworld"), &width2()),
            "<span>\n  hello\n  world\n</span>"
        );
    }

    #[test]
    fn test_single_number_stays_inline() {
        assert_eq!(render(div().child(3.3), &width2()), "<div>3.3</div>");
        assert_eq!(render(div().child(7), &compact()), "<div>7</div>");
    }

    #[test]
    fn test_trusted_markup_child() {
        let out = render(div().child(Markup::from_static("aa")), &width2());
        assert_eq!(out, "<div>\n  aa\n</div>");
        let out = render(div().child(Markup::from_static("a&amp;<b>")), &compact());
        assert_eq!(out, "<div>a&amp;<b></div>");
    }

    #[test]
    fn test_nested_indentation() {
        let tree = div()
            .child(p().child("x"))
            .child(ul().child(li().child("a")).child(li().child("b")));
        assert_eq!(
            render(tree, &width2()),
            "<div>\n  <p>x</p>\n  <ul>\n    <li>a</li>\n    <li>b</li>\n  </ul>\n</div>"
        );
    }

    #[test]
    fn test_nested_markup_is_reindented() {
        let cell = tr()
            .child(td().child("a"))
            .child(td().child("b"))
            .render_with(&width2())
            .unwrap();
        let table = Element::new("table").child(cell);
        assert_eq!(
            render(table, &width2()),
            "<table>\n  <tr>\n    <td>a</td>\n    <td>b</td>\n  </tr>\n</table>"
        );
    }

    #[test]
    fn test_disabled_indent_is_plain_concatenation() {
        let form = div()
            .child(div().child(label().child("First Name")).child(": Joe"))
            .child(button().child("Click To Edit").attr("hx_get", "/contact/1/edit").attr("_class", "btn primary"))
            .attr("hx_target", "this")
            .attr("hx_swap", "outerHTML");
        assert_eq!(
            render(form, &compact()),
            "<div hx-target=\"this\" hx-swap=\"outerHTML\"><div><label>First Name</label>: Joe</div>\
             <button hx-get=\"/contact/1/edit\" class=\"btn primary\">Click To Edit</button></div>"
        );
    }

    #[test]
    fn test_disabled_indent_keeps_raw_newlines() {
        let out = render(div().child("a\nb").child(Markup::from_static("\n<i>x</i>")), &compact());
        assert_eq!(out, "<div>a\nb\n<i>x</i></div>");
    }

    #[test]
    fn test_sequences_flatten() {
        let el = div().child(vec![Child::from("a"), Child::from(vec!["b", "c"])]);
        assert_eq!(render(el.clone(), &width2()), "<div>\n  a\n  b\n  c\n</div>");
        assert_eq!(render(el, &compact()), "<div>a\nb\nc</div>");
    }

    #[test]
    fn test_empty_sequence_and_none() {
        let el = div().child(Vec::<Child>::new()).child(None::<&str>);
        assert_eq!(render(el.clone(), &width2()), "<div></div>");
        assert_eq!(render(el, &compact()), "<div></div>");
    }

    #[test]
    fn test_mapping_child_is_one_leaf() {
        let el = div().child(Child::map([("a", Value::from("<x>"))]));
        assert_eq!(render(el, &compact()), "<div>{'a': '&lt;x>'}</div>");
    }

    #[test]
    fn test_opaque_child() {
        let el = div().child(Child::opaque(std::net::Ipv4Addr::LOCALHOST)).child(true);
        assert_eq!(render(el, &compact()), "<div>127.0.0.1true</div>");
    }

    #[test]
    fn test_external_capability() {
        struct Widget;
        impl Render for Widget {
            fn render_markup(&self) -> Markup {
                Markup::from_static("<b>w&amp;</b>")
            }
        }
        let el = div().child(Child::external(Widget));
        assert_eq!(render(el.clone(), &compact()), "<div><b>w&amp;</b></div>");
        assert_eq!(render(el, &width2()), "<div>\n  <b>w&amp;</b>\n</div>");
    }

    #[test]
    fn test_pre_is_never_reflowed() {
        let el = pre().child("line 1\n  line <2>");
        assert_eq!(render(el.clone(), &width2()), "<pre>line 1\n  line &lt;2></pre>");

        let nested = div().child(pre().child("a\nb")).child("c");
        assert_eq!(render(nested, &width2()), "<div>\n  <pre>a\nb</pre>\n  c\n</div>");
    }

    #[test]
    fn test_zero_width_indent() {
        let el = ul().child(li().child("a")).child(li().child("b"));
        assert_eq!(
            render(el, &RenderContext::new(Indent::Width(0))),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>"
        );
    }

    #[test]
    fn test_invalid_attribute_name_fails() {
        let err = div().attr("bad key", 1).render_with(&compact()).unwrap_err();
        assert_eq!(
            err,
            RenderError::InvalidAttributeName {
                key: "bad key".to_string(),
                name: "bad key".to_string()
            }
        );
        let nested = div().child(span().attr("", "x"));
        assert!(nested.render_with(&compact()).is_err());
    }

    #[test]
    fn test_invalid_tag_name_fails() {
        for name in ["", "1div", "di v", "a>b", "x/"] {
            let err = Element::new(name).render_with(&compact()).unwrap_err();
            assert_eq!(err, RenderError::InvalidTagName(name.to_string()));
        }
        assert!(Element::new("my-widget").render_with(&compact()).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        fn nest(levels: usize) -> Element<'static> {
            let mut el = span().child("leaf");
            for _ in 0..levels {
                el = div().child(el);
            }
            el
        }
        let ctx = compact().with_max_depth(10);
        assert!(nest(10).render_with(&ctx).is_ok());
        assert_eq!(
            nest(11).render_with(&ctx).unwrap_err(),
            RenderError::NestingTooDeep(10)
        );

        let mut seq = Child::from("leaf");
        for _ in 0..20 {
            seq = Child::Seq(vec![seq]);
        }
        let err = div().child(seq).render_with(&width2().with_max_depth(10)).unwrap_err();
        assert_eq!(err, RenderError::NestingTooDeep(10));
    }

    fn deep_list(levels: usize) -> Value<'static> {
        let mut value = Value::from("x");
        for _ in 0..levels {
            value = Value::List(vec![value]);
        }
        value
    }

    #[test]
    fn test_deep_attribute_value_hits_depth_limit() {
        let ctx = compact().with_max_depth(10);
        let err = div().attr("a", deep_list(2_000)).render_with(&ctx).unwrap_err();
        assert_eq!(err, RenderError::NestingTooDeep(10));

        let out = render(div().attr("a", deep_list(2)), &ctx);
        assert_eq!(out, "<div a=\"[['x']]\"></div>");
    }

    #[test]
    fn test_deep_mapping_child_hits_depth_limit() {
        let ctx = width2().with_max_depth(10);
        let deep = Child::map([("k", deep_list(2_000))]);
        let err = div().child(deep).render_with(&ctx).unwrap_err();
        assert_eq!(err, RenderError::NestingTooDeep(10));

        let shallow = Child::map([("k", deep_list(1))]);
        assert_eq!(render(div().child(shallow), &ctx), "<div>{'k': ['x']}</div>");
    }

    #[test]
    fn test_tag_function_uses_global_indent() {
        let _lock = GLOBAL_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        {
            let _guard = IndentGuard::new(Indent::Disabled);
            let out = tag("div", ["text&<>"], NO_ATTRS).unwrap();
            assert_eq!(out.as_str(), "<div>text&amp;&lt;></div>");
        }
        {
            let _guard = IndentGuard::new(Indent::Width(2));
            let out = tag("span", ["hello", "world"], [("_class", "x")]).unwrap();
            assert_eq!(out.as_str(), "<span class=\"x\">\n  hello\n  world\n</span>");
            assert_eq!(out.tag_name(), "span");
        }
    }

    #[test]
    fn test_text_function() {
        assert_eq!(
            text("This is an <example> of text").as_str(),
            "This is an &lt;example> of text"
        );
    }

    #[test]
    fn test_trusted_markup_is_not_reescaped() {
        let escaped = text("a & b");
        let out = render(div().child(escaped.clone()), &compact());
        assert_eq!(out, "<div>a &amp; b</div>");
        assert_eq!(render(div().child("a & b"), &compact()), out);
    }

    proptest! {
        #[test]
        fn prop_compact_render_equals_concatenation(parts in proptest::collection::vec(".*", 0..6)) {
            let el = div().children(parts.iter());
            let expected: String = std::iter::once("<div>".to_string())
                .chain(parts.iter().map(|p| escape_text(p).into_owned()))
                .chain(std::iter::once("</div>".to_string()))
                .collect();
            prop_assert_eq!(render(el, &compact()), expected);
        }

        #[test]
        fn prop_text_child_never_contains_raw_lt(s in ".*") {
            let out = render(span().child(s.as_str()), &compact());
            let inner = &out["<span>".len()..out.len() - "</span>".len()];
            prop_assert!(!inner.contains('<'));
        }
    }
}
