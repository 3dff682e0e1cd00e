//! Extension registry: named operations resolved while parsing `name(a, b, …)`.

use crate::args::ArgumentTable;
use crate::ast::{assert_arity, Arity, NativeFunction, Node};
use crate::error::ExpressError;
use crate::expression::Expression;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds the node for one call site from the already parsed argument nodes.
pub type ExtensionProvider =
    Arc<dyn Fn(&mut ExtensionHost<'_>, Vec<Node>) -> Result<Node, ExpressError> + Send + Sync>;

/// The expression being parsed, as seen by an extension provider.
pub struct ExtensionHost<'a> {
    args: &'a mut ArgumentTable,
}

impl<'a> ExtensionHost<'a> {
    pub(crate) fn new(args: &'a mut ArgumentTable) -> Self {
        ExtensionHost { args }
    }

    /// Returns a variable node for `name`, registering the argument if unseen.
    pub fn variable(&mut self, name: &str) -> Node {
        let slot = self.args.get_or_insert(name);
        Node::Variable {
            name: name.to_string(),
            slot,
        }
    }

    pub fn arguments(&self) -> &ArgumentTable {
        self.args
    }
}

/// Map of extension name -> provider. Built once, then shared read-only by
/// every expression parsed with it.
#[derive(Clone, Default)]
pub struct Extensions {
    providers: HashMap<String, ExtensionProvider>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with common math functions: `abs`, `sqrt`, `exp`, `ln`,
    /// `log10`, `sin`, `cos`, `tan`, `floor`, `ceil`, `round` (one argument)
    /// and `min`, `max` (one or more).
    pub fn with_math() -> Self {
        let unary: [(&str, fn(f64) -> f64); 11] = [
            ("abs", f64::abs),
            ("sqrt", f64::sqrt),
            ("exp", f64::exp),
            ("ln", f64::ln),
            ("log10", f64::log10),
            ("sin", f64::sin),
            ("cos", f64::cos),
            ("tan", f64::tan),
            ("floor", f64::floor),
            ("ceil", f64::ceil),
            ("round", f64::round),
        ];
        let mut extensions = Self::new();
        for (name, f) in unary {
            extensions.add_function(name, Arity::Fixed(1), move |args| f(args[0]));
        }
        extensions.add_function("min", Arity::Range(1, None), |args| {
            args.iter().copied().fold(f64::INFINITY, f64::min)
        });
        extensions.add_function("max", Arity::Range(1, None), |args| {
            args.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        });
        extensions
    }

    /// Registers a custom provider. Replaces any provider with the same name.
    pub fn add<F>(&mut self, name: &str, provider: F) -> &mut Self
    where
        F: Fn(&mut ExtensionHost<'_>, Vec<Node>) -> Result<Node, ExpressError>
            + Send
            + Sync
            + 'static,
    {
        self.providers.insert(name.to_string(), Arc::new(provider));
        self
    }

    /// Registers `expression` as a callable sub-expression: `name(x, y)` binds
    /// `x` and `y` to the expression's arguments in declaration order. Each
    /// call site gets its own clone of the expression.
    pub fn add_expression(&mut self, name: &str, expression: Expression) -> &mut Self {
        let ext_name = name.to_string();
        self.add(name, move |_, args| {
            assert_arity(&ext_name, Arity::Fixed(expression.arg_count()), args.len())?;
            Ok(Node::Embedded {
                expression: Box::new(expression.clone()),
                args,
            })
        })
    }

    /// Registers a native function over `f64` arguments.
    pub fn add_function<F>(&mut self, name: &str, arity: Arity, func: F) -> &mut Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        let function = NativeFunction::new(name, Arc::new(func));
        self.add(name, move |_, args| {
            assert_arity(function.name(), arity, args.len())?;
            Ok(Node::Call {
                function: function.clone(),
                args,
            })
        })
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionProvider> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Extensions").field("names", &names).finish()
    }
}
