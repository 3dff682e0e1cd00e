//! Expression tree node types.

use crate::error::ExpressError;
use crate::expression::Expression;
use std::fmt;
use std::sync::Arc;

/// Signature of a native function callable from an expression.
pub type NativeFn = dyn Fn(&[f64]) -> f64 + Send + Sync;

/// A parsed expression tree. Each node owns its children.
#[derive(Debug, Clone)]
pub enum Node {
    Constant(f64),
    /// Reference to an argument. `slot` indexes the owning expression's
    /// argument values.
    Variable { name: String, slot: usize },
    /// Unary minus on a non-literal operand.
    Neg(Box<Node>),
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Native function registered through [`crate::Extensions::add_function`].
    Call {
        function: NativeFunction,
        args: Vec<Node>,
    },
    /// Another expression used as a call. `args` are bound to the embedded
    /// expression's slots by position.
    Embedded {
        expression: Box<Expression>,
        args: Vec<Node>,
    },
}

impl Node {
    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of nodes in this subtree. Embedded expressions count as one node
    /// plus their bound arguments.
    pub fn size(&self) -> usize {
        match self {
            Node::Constant(_) | Node::Variable { .. } => 1,
            Node::Neg(inner) => 1 + inner.size(),
            Node::Binary { left, right, .. } => 1 + left.size() + right.size(),
            Node::Call { args, .. } | Node::Embedded { args, .. } => {
                1 + args.iter().map(Node::size).sum::<usize>()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `^` is exponentiation, not XOR.
    Pow,
}

impl BinaryOp {
    pub fn from_char(c: char) -> Option<BinaryOp> {
        match c {
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Sub),
            '*' => Some(BinaryOp::Mul),
            '/' => Some(BinaryOp::Div),
            '^' => Some(BinaryOp::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Pow => '^',
        }
    }

    /// Both backends go through this function so their results stay
    /// bit-identical.
    #[inline]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
            BinaryOp::Pow => left.powf(right),
        }
    }
}

/// Argument count accepted by an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Skip the arity check.
    Any,
    /// Exactly `n` arguments.
    Fixed(usize),
    /// Between `min` and `max` arguments. `None` for no upper bound.
    Range(usize, Option<usize>),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Any => true,
            Arity::Fixed(n) => count == n,
            Arity::Range(min, max) => count >= min && max.map_or(true, |max| count <= max),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Any => write!(f, "any number of"),
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Range(min, Some(max)) => write!(f, "{} to {}", min, max),
            Arity::Range(min, None) => write!(f, "at least {}", min),
        }
    }
}

/// Asserts that an extension named `name` received an acceptable number of
/// arguments.
pub fn assert_arity(name: &str, arity: Arity, found: usize) -> Result<(), ExpressError> {
    if arity.accepts(found) {
        Ok(())
    } else {
        Err(ExpressError::Arity {
            name: name.to_string(),
            expected: arity.to_string(),
            found,
        })
    }
}

/// A named native function shared between every node that calls it.
#[derive(Clone)]
pub struct NativeFunction {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl NativeFunction {
    pub fn new(name: impl Into<Arc<str>>, func: Arc<NativeFn>) -> Self {
        NativeFunction {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn call(&self, args: &[f64]) -> f64 {
        (self.func)(args)
    }

    pub(crate) fn func(&self) -> Arc<NativeFn> {
        Arc::clone(&self.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeFunction").field(&self.name).finish()
    }
}
