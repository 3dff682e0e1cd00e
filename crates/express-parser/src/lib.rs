//! Arithmetic expressions with named variables, evaluated by a tree-walking
//! interpreter or by a compiled closure tree.
//!
//! # Example
//!
//! ```
//! use express_parser::Expression;
//!
//! let mut expr = Expression::new("(a + b) * 2").unwrap();
//! expr.set_argument("a", 2.0).unwrap();
//! expr.set_argument("b", 3.0).unwrap();
//! assert_eq!(expr.evaluate(), 10.0);
//!
//! expr.compile();
//! assert_eq!(expr.evaluate_compiled().unwrap(), 10.0);
//! ```
//!
//! Other expressions can be embedded as calls through [`Extensions`]:
//!
//! ```
//! use express_parser::{Expression, Extensions};
//! use std::sync::Arc;
//!
//! let square = Expression::new("x*x").unwrap();
//! let mut extensions = Extensions::with_math();
//! extensions.add_expression("sq", square);
//!
//! let mut expr = Expression::with_extensions("sq(a) + sqrt(b)", Arc::new(extensions)).unwrap();
//! expr.set_argument("a", 3.0).unwrap();
//! expr.set_argument("b", 16.0).unwrap();
//! assert_eq!(expr.evaluate(), 13.0);
//! ```

pub mod args;
pub mod ast;
pub mod codegen;
pub mod codegen_steps;
pub mod error;
pub mod evaluate;
pub mod expression;
pub mod extensions;
pub mod parse;
pub mod util;

pub use args::ArgumentTable;
pub use ast::{Arity, BinaryOp, NativeFunction, Node};
pub use codegen::CompiledFn;
pub use error::ExpressError;
pub use evaluate::evaluate;
pub use expression::Expression;
pub use extensions::{ExtensionHost, ExtensionProvider, Extensions};
