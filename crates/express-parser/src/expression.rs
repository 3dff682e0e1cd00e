//! The `Expression` type: a parsed tree, its arguments and its compiled form.

use crate::args::ArgumentTable;
use crate::ast::Node;
use crate::codegen::{self, CompiledFn};
use crate::error::ExpressError;
use crate::evaluate::evaluate;
use crate::extensions::Extensions;
use crate::parse::Parser;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// A parsed arithmetic expression with its own argument bindings.
///
/// Cloning produces an independent expression: the argument table and the
/// tree are deep-copied, so setting arguments on the clone never affects the
/// original. The extension registry is shared, and so is the compiled
/// function when one exists, because compiled code only reads the slice it is
/// called with.
#[derive(Clone)]
pub struct Expression {
    source: String,
    root: Node,
    arguments: ArgumentTable,
    extensions: Arc<Extensions>,
    arg_count: usize,
    compiled: OnceLock<CompiledFn>,
}

impl Expression {
    /// Parses `source` without extensions.
    pub fn new(source: &str) -> Result<Self, ExpressError> {
        Self::with_extensions(source, Arc::new(Extensions::new()))
    }

    /// Parses `source`, resolving `name(…)` calls against `extensions`.
    #[tracing::instrument(level = "debug", skip_all, fields(source = source))]
    pub fn with_extensions(
        source: &str,
        extensions: Arc<Extensions>,
    ) -> Result<Self, ExpressError> {
        let mut arguments = ArgumentTable::new();
        let root = Parser::parse(source, &extensions, &mut arguments)?;
        let arg_count = arguments.len();
        debug!(arg_count, nodes = root.size(), "parsed");
        Ok(Expression {
            source: source.to_string(),
            root,
            arguments,
            extensions,
            arg_count,
            compiled: OnceLock::new(),
        })
    }

    /// Sets the argument `name`. NaN is rejected; on error nothing changes.
    pub fn set_argument(&mut self, name: &str, value: f64) -> Result<(), ExpressError> {
        let slot = self
            .arguments
            .slot(name)
            .ok_or_else(|| ExpressError::UnknownArgument(name.to_string()))?;
        if value.is_nan() {
            return Err(ExpressError::InvalidValue {
                name: name.to_string(),
            });
        }
        self.arguments.set(slot, value);
        Ok(())
    }

    pub fn argument(&self, name: &str) -> Option<f64> {
        self.arguments.slot(name).and_then(|slot| self.arguments.get(slot))
    }

    /// `(name, value)` pairs in slot order.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, f64)> {
        self.arguments.iter()
    }

    pub fn argument_table(&self) -> &ArgumentTable {
        &self.arguments
    }

    /// Number of arguments, fixed when the expression was parsed.
    pub fn arg_count(&self) -> usize {
        self.arg_count
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn extensions(&self) -> &Arc<Extensions> {
        &self.extensions
    }

    /// Evaluates the expression by walking the tree.
    pub fn evaluate(&self) -> f64 {
        evaluate(&self.root, self.arguments.values())
    }

    /// Compiles the expression. Does nothing if it is already compiled.
    pub fn compile(&self) {
        self.compiled_or_compile();
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Evaluates the compiled form with the current arguments.
    ///
    /// Does not compile on demand: returns [`ExpressError::NotCompiled`] until
    /// [`Expression::compile`] has been called.
    pub fn evaluate_compiled(&self) -> Result<f64, ExpressError> {
        let f = self.compiled.get().ok_or(ExpressError::NotCompiled)?;
        Ok(f(self.arguments.values()))
    }

    /// The compiled function, if any.
    pub fn compiled(&self) -> Option<CompiledFn> {
        self.compiled.get().cloned()
    }

    /// Calls the compiled form with caller-supplied values in slot order,
    /// leaving the stored arguments untouched.
    pub fn call(&self, values: &[f64]) -> Result<f64, ExpressError> {
        let f = self.compiled.get().ok_or(ExpressError::NotCompiled)?;
        if values.len() != self.arg_count {
            return Err(ExpressError::ArgumentCount {
                expected: self.arg_count,
                found: values.len(),
            });
        }
        Ok(f(values))
    }

    pub(crate) fn compiled_or_compile(&self) -> CompiledFn {
        Arc::clone(self.compiled.get_or_init(|| {
            debug!(source = %self.source, "compiling");
            codegen::compile(&self.root)
        }))
    }
}

impl FromStr for Expression {
    type Err = ExpressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::new(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("arguments", &self.arguments)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}
