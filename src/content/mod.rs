//! PDF content stream interpretation.
//!
//! Content streams are tokenised by `lopdf`, lifted into typed operators and
//! executed against a graphics state stack. Consumers observe the result
//! through the [`ContentSink`] trait.

pub mod graphics_state;
pub mod interpreter;
pub mod operators;

pub use graphics_state::{GraphicsState, GraphicsStateStack, Matrix};
pub use interpreter::{ContentInterpreter, ContentSink, GlyphEvent, DEFAULT_MAX_FORM_DEPTH};
pub use operators::{Operator, TextElement};
