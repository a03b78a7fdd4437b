//! ResourceArc Wrappers
//!
//! A render context created once on the Elixir side and passed to any
//! number of render calls. The context is immutable, so no lock is needed.

use crate::render::context::{Indent, RenderContext};
use rustler::ResourceArc;

/// Wrapper for RenderContext that can be stored in a ResourceArc
pub struct RenderContextResource {
    pub ctx: RenderContext,
}

impl RenderContextResource {
    /// Build from the legacy indent integer and an optional depth limit
    pub fn new(indent: i64, max_depth: Option<usize>) -> Self {
        let mut ctx = RenderContext::new(Indent::from_legacy(indent));
        if let Some(max_depth) = max_depth {
            ctx = ctx.with_max_depth(max_depth);
        }
        RenderContextResource { ctx }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for RenderContextResource {}

/// Type alias for the ResourceArc
pub type RenderContextRef = ResourceArc<RenderContextResource>;
