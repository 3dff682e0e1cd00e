//! Tree-walking interpreter.

use crate::ast::Node;
use smallvec::SmallVec;

/// Stack buffer for call arguments; spills to the heap only for wide calls.
pub(crate) type ArgBuf = SmallVec<[f64; 8]>;

/// Evaluates `node` against the argument values `args`, indexed by slot.
///
/// Every call re-walks the whole tree. Division by zero and other non-finite
/// results follow IEEE-754 and are not errors.
pub fn evaluate(node: &Node, args: &[f64]) -> f64 {
    match node {
        Node::Constant(value) => *value,
        Node::Variable { slot, .. } => args[*slot],
        Node::Neg(inner) => -evaluate(inner, args),
        Node::Binary { op, left, right } => {
            let l = evaluate(left, args);
            let r = evaluate(right, args);
            op.apply(l, r)
        }
        Node::Call { function, args: call_args } => {
            let values: ArgBuf = call_args.iter().map(|a| evaluate(a, args)).collect();
            function.call(&values)
        }
        Node::Embedded { expression, args: bound } => {
            let values: ArgBuf = bound.iter().map(|a| evaluate(a, args)).collect();
            evaluate(expression.root(), &values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn var(slot: usize) -> Node {
        Node::Variable {
            name: format!("v{}", slot),
            slot,
        }
    }

    #[test]
    fn test_constant_and_variable() {
        assert_eq!(evaluate(&Node::Constant(2.5), &[]), 2.5);
        assert_eq!(evaluate(&var(1), &[1.0, 7.0]), 7.0);
    }

    #[test]
    fn test_binary_ops() {
        let cases = [
            (BinaryOp::Add, 7.0),
            (BinaryOp::Sub, 3.0),
            (BinaryOp::Mul, 10.0),
            (BinaryOp::Div, 2.5),
            (BinaryOp::Pow, 25.0),
        ];
        for (op, expected) in cases {
            let node = Node::binary(op, var(0), var(1));
            assert_eq!(evaluate(&node, &[5.0, 2.0]), expected, "op {:?}", op);
        }
    }

    #[test]
    fn test_neg() {
        let node = Node::Neg(Box::new(var(0)));
        assert_eq!(evaluate(&node, &[3.0]), -3.0);
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        let node = Node::binary(BinaryOp::Div, Node::Constant(1.0), Node::Constant(0.0));
        assert_eq!(evaluate(&node, &[]), f64::INFINITY);
        let node = Node::binary(BinaryOp::Div, Node::Constant(0.0), Node::Constant(0.0));
        assert!(evaluate(&node, &[]).is_nan());
    }
}
