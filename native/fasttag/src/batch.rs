//! Parallel Batch Rendering
//!
//! Uses Rayon to render many independent elements at once. Each element
//! gets its own output buffer; results come back in input order.

use crate::error::RenderError;
use crate::markup::Markup;
use crate::render::context::RenderContext;
use crate::render::Element;
use rayon::prelude::*;

/// Render every element in parallel with one shared context
pub fn render_all(
    elements: &[Element<'_>],
    ctx: &RenderContext,
) -> Vec<Result<Markup, RenderError>> {
    tracing::debug!(count = elements.len(), "rendering batch");
    elements
        .par_iter()
        .map(|element| element.render_with(ctx))
        .collect()
}

/// Render every element and concatenate the results, stopping at the first error
pub fn render_joined(
    elements: &[Element<'_>],
    ctx: &RenderContext,
) -> Result<Markup, RenderError> {
    let parts = render_all(elements, ctx)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    let mut out = String::with_capacity(parts.iter().map(Markup::len).sum());
    for part in &parts {
        out.push_str(part.as_str());
    }
    Ok(Markup::from_trusted(out))
}
