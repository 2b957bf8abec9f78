//! Rendering of field tokens and header-writer invocations.

mod invocation;
mod tokens;

pub use invocation::{build_invocation, expand_parameters, Invocation};
pub use tokens::render_image;
