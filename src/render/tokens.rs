//! Per-image token rendering.

use crate::config::OutputField;
use crate::error::Result;
use crate::resolve::{Context, Resolver};

/// Render one `name=value` token per field, in field order.
///
/// Fields whose value resolves to nothing still yield `name=`.
pub fn render_image(
    resolver: &Resolver<'_>,
    fields: &[OutputField],
    ctx: &Context<'_>,
) -> Result<Vec<String>> {
    fields
        .iter()
        .map(|field| resolver.token(field, ctx))
        .collect()
}
