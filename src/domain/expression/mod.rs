//! Expression - path walking, placeholder templates, and the expression resolver.

mod path;
mod resolver;
mod template;
mod trace;

pub use path::{get_dotted, get_path, PathError};
pub use resolver::{EvaluationType, ExpressionResolver, ExpressionSpec, ResolutionError};
pub use template::{display_value, has_placeholders, placeholder_paths, render, sole_placeholder};
pub use trace::{summarize, TraceLog};
