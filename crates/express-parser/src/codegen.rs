//! Expression compiler.
//!
//! Lowers a tree into a tree of closures over the argument slice. Calling the
//! result does not re-walk the AST or re-dispatch on node kinds; each closure
//! already knows its operation and slot. Subtrees made only of literals are
//! folded while lowering, with the same `f64` operations the interpreter uses,
//! so both backends stay bit-identical.

use crate::ast::{BinaryOp, Node};
use crate::codegen_steps::Step;
use crate::evaluate::ArgBuf;
use std::sync::Arc;
use tracing::debug;

/// A compiled expression: argument values in slot order in, result out.
pub type CompiledFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Compiles `root` into a callable function.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = root.size()))]
pub fn compile(root: &Node) -> CompiledFn {
    let step = lower(root);
    debug!(folded = step.is_literal(), "compiled");
    step.into_fn()
}

/// Lowers one node. Embedded expressions are compiled first and their
/// compiled function is memoized on the embedded expression.
pub fn lower(node: &Node) -> Step {
    match node {
        Node::Constant(value) => Step::Literal(*value),
        Node::Variable { slot, .. } => {
            let slot = *slot;
            Step::Dynamic(Arc::new(move |args: &[f64]| args[slot]))
        }
        Node::Neg(inner) => match lower(inner) {
            Step::Literal(value) => Step::Literal(-value),
            Step::Dynamic(f) => Step::Dynamic(Arc::new(move |args: &[f64]| -f(args))),
        },
        Node::Binary { op, left, right } => lower_binary(*op, lower(left), lower(right)),
        Node::Call { function, args } => {
            let func = function.func();
            let arg_fns: Vec<CompiledFn> = args.iter().map(|a| lower(a).into_fn()).collect();
            Step::Dynamic(Arc::new(move |input: &[f64]| {
                let values: ArgBuf = arg_fns.iter().map(|f| f(input)).collect();
                func(&values)
            }))
        }
        Node::Embedded { expression, args } => {
            let sub = expression.compiled_or_compile();
            let arg_fns: Vec<CompiledFn> = args.iter().map(|a| lower(a).into_fn()).collect();
            Step::Dynamic(Arc::new(move |input: &[f64]| {
                let values: ArgBuf = arg_fns.iter().map(|f| f(input)).collect();
                sub(&values)
            }))
        }
    }
}

fn lower_binary(op: BinaryOp, left: Step, right: Step) -> Step {
    if let (Some(l), Some(r)) = (left.literal_val(), right.literal_val()) {
        return Step::Literal(op.apply(l, r));
    }
    let l = left.into_fn();
    let r = right.into_fn();
    let f: CompiledFn = match op {
        BinaryOp::Add => Arc::new(move |args: &[f64]| l(args) + r(args)),
        BinaryOp::Sub => Arc::new(move |args: &[f64]| l(args) - r(args)),
        BinaryOp::Mul => Arc::new(move |args: &[f64]| l(args) * r(args)),
        BinaryOp::Div => Arc::new(move |args: &[f64]| l(args) / r(args)),
        BinaryOp::Pow => Arc::new(move |args: &[f64]| l(args).powf(r(args))),
    };
    Step::Dynamic(f)
}
