//! Intermediate results of lowering a tree into closures.

use crate::codegen::CompiledFn;
use std::sync::Arc;

/// Result of lowering one node: either a value known at compile time or a
/// closure that computes it at call time.
#[derive(Clone)]
pub enum Step {
    Literal(f64),
    Dynamic(CompiledFn),
}

impl Step {
    pub fn is_literal(&self) -> bool {
        matches!(self, Step::Literal(_))
    }

    pub fn literal_val(&self) -> Option<f64> {
        match self {
            Step::Literal(v) => Some(*v),
            Step::Dynamic(_) => None,
        }
    }

    /// Turns the step into a closure, wrapping literals.
    pub fn into_fn(self) -> CompiledFn {
        match self {
            Step::Literal(v) => Arc::new(move |_: &[f64]| v),
            Step::Dynamic(f) => f,
        }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Step::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}
