//! FastTag - Fast HTML tag generation
//!
//! Layers:
//! - core: escaping, loose values, attribute serialization
//! - markup: trusted, already-escaped HTML
//! - render: element builder, child renderer, indentation context
//! - tags: tag table and named constructors
//! - batch: parallel rendering of independent elements
//! - NIF surface (this file, plus term/resource)

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod batch;
pub mod core;
pub mod error;
pub mod markup;
pub mod render;
pub mod tags;
mod resource;
mod term;

pub use error::{MarkupError, RenderError};
pub use markup::{Markup, Render, DOCTYPE};
pub use render::context::{Indent, IndentGuard, RenderContext};
pub use render::{tag, text, Child, Element};
pub use crate::core::value::Value;

use resource::{RenderContextRef, RenderContextResource};
use term::{bytes_to_binary, error_to_term, markup_to_term, result_to_term, term_to_element};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    fn record_alloc(size: usize) {
        let current = ALLOCATED.fetch_add(size, Ordering::Relaxed) + size;
        PEAK_ALLOCATED.fetch_max(current, Ordering::Relaxed);
    }

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                record_alloc(layout.size());
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }

        // Output buffers grow by realloc; track the size delta in place
        unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
            let new_ptr = UNDERLYING.realloc(ptr, layout, new_size);
            if !new_ptr.is_null() {
                if new_size >= layout.size() {
                    record_alloc(new_size - layout.size());
                } else {
                    ALLOCATED.fetch_sub(layout.size() - new_size, Ordering::Relaxed);
                }
            }
            new_ptr
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Memory Tracking NIFs
// ============================================================================

#[cfg(feature = "memory_tracking")]
use std::sync::atomic::Ordering;

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory() -> usize {
    tracking::ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    let current = tracking::ALLOCATED.load(Ordering::SeqCst);
    let peak = tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
    (current, peak)
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    (0, 0)
}

// ============================================================================
// Tag Rendering
// ============================================================================

/// Render one element with the process-wide indent
/// Returns {:safe, binary} or {:error, message}
#[rustler::nif(name = "tag")]
fn tag_nif<'a>(env: Env<'a>, name: Term<'a>, children: Term<'a>, attrs: Term<'a>) -> Term<'a> {
    render_term(env, &RenderContext::global(), name, children, attrs)
}

/// Render one element with an explicit context
#[rustler::nif]
fn tag_with<'a>(
    env: Env<'a>,
    ctx: RenderContextRef,
    name: Term<'a>,
    children: Term<'a>,
    attrs: Term<'a>,
) -> Term<'a> {
    render_term(env, &ctx.ctx, name, children, attrs)
}

fn render_term<'a>(
    env: Env<'a>,
    ctx: &RenderContext,
    name: Term<'a>,
    children: Term<'a>,
    attrs: Term<'a>,
) -> Term<'a> {
    let result = term::build_element(name, children, attrs, ctx)
        .and_then(|element| element.render_with(ctx));
    result_to_term(env, result)
}

/// Escape text and mark it safe
#[rustler::nif(name = "text")]
fn text_nif<'a>(env: Env<'a>, content: Term<'a>) -> NifResult<Term<'a>> {
    let binary = Binary::from_iolist(content)?;
    let content = String::from_utf8_lossy(binary.as_slice());
    Ok(markup_to_term(env, &text(&content)))
}

/// The HTML5 doctype as safe markup
#[rustler::nif]
fn doctype<'a>(env: Env<'a>) -> Term<'a> {
    markup_to_term(env, &DOCTYPE)
}

/// Check whether a tag name is an HTML void element
#[rustler::nif]
fn is_void(name: &str) -> bool {
    tags::is_void(name)
}

// ============================================================================
// Indentation and Render Contexts
// ============================================================================

/// Set the process-wide indent (negative disables indentation)
#[rustler::nif]
fn set_indent(indent: i64) -> rustler::Atom {
    render::context::set_indent(Indent::from_legacy(indent));
    rustler::types::atom::ok()
}

/// Current process-wide indent (-1 when disabled)
#[rustler::nif]
fn get_indent() -> i64 {
    render::context::indent().to_legacy()
}

/// Create an immutable render context
#[rustler::nif]
fn context_new(indent: i64, max_depth: Option<usize>) -> RenderContextRef {
    ResourceArc::new(RenderContextResource::new(indent, max_depth))
}

// ============================================================================
// Batch Rendering
// ============================================================================

/// Render a list of {name, children, attrs} specs in parallel
/// Returns one {:safe, binary} / {:error, message} per spec, in order
#[rustler::nif(schedule = "DirtyCpu")]
fn render_many<'a>(env: Env<'a>, ctx: RenderContextRef, specs: Vec<Term<'a>>) -> Term<'a> {
    let ctx = ctx.ctx;

    // Decode on the calling thread; terms never cross into the pool
    let mut elements = Vec::with_capacity(specs.len());
    let mut slots = Vec::with_capacity(specs.len());
    for spec in specs {
        match term_to_element(spec, &ctx) {
            Ok(element) => {
                slots.push(Ok(elements.len()));
                elements.push(element);
            }
            Err(e) => slots.push(Err(e)),
        }
    }

    let rendered: Vec<Term<'a>> = batch::render_all(&elements, &ctx)
        .into_iter()
        .map(|result| result_to_term(env, result))
        .collect();

    let mut list = Term::list_new_empty(env);
    for slot in slots.iter().rev() {
        let term = match slot {
            Ok(idx) => rendered[*idx],
            Err(e) => error_to_term(env, e),
        };
        list = list.list_prepend(term);
    }
    list
}

/// Render a list of specs and concatenate the output
#[rustler::nif(schedule = "DirtyCpu")]
fn render_concat<'a>(env: Env<'a>, ctx: RenderContextRef, specs: Vec<Term<'a>>) -> Term<'a> {
    let ctx = ctx.ctx;
    let result = specs
        .into_iter()
        .map(|spec| term_to_element(spec, &ctx))
        .collect::<Result<Vec<_>, _>>()
        .and_then(|elements| batch::render_joined(&elements, &ctx));
    result_to_term(env, result)
}

// ============================================================================
// Markup Serialization
// ============================================================================

/// Serialize safe markup (iodata) to the portable binary form
/// Returns the binary, or {:error, message} for non-UTF-8 or oversized markup
#[rustler::nif]
fn markup_serialize<'a>(env: Env<'a>, content: Term<'a>) -> NifResult<Term<'a>> {
    let binary = Binary::from_iolist(content)?;
    let serialized = Markup::from_trusted_bytes(binary.as_slice()).and_then(|m| m.serialize());
    Ok(match serialized {
        Ok(bytes) => bytes_to_binary(env, &bytes),
        Err(e) => (rustler::types::atom::error(), e.to_string()).encode(env),
    })
}

/// Decode the portable binary form back into {:safe, binary}
#[rustler::nif]
fn markup_deserialize<'a>(env: Env<'a>, data: Binary<'a>) -> Term<'a> {
    match Markup::deserialize(data.as_slice()) {
        Ok(markup) => markup_to_term(env, &markup),
        Err(e) => (rustler::types::atom::error(), e.to_string()).encode(env),
    }
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.FastTag.Native");
