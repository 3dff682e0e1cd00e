//! Expression parser.
//!
//! Precedence is resolved by rescanning rather than by recursive descent: a
//! span is split at its lowest-precedence top-level operator and both halves
//! are parsed on their own. `+ -` and `* /` split at the rightmost occurrence
//! (left-associative), `^` at the leftmost one (right-associative).

use crate::args::ArgumentTable;
use crate::ast::{assert_arity, Arity, BinaryOp, Node};
use crate::error::ExpressError;
use crate::extensions::{ExtensionHost, Extensions};
use crate::util::{
    check_balanced, find_operator, matching_paren, parse_literal, scan_pattern,
    split_top_level, strip_enclosing, Literal,
};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

/// Operator groups from lowest to highest precedence, with the split side.
const PRECEDENCE: [(&[u8], bool); 3] = [(b"+-", true), (b"*/", true), (b"^", false)];

/// Returns true if `name` is a valid variable or extension name.
pub fn is_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

pub struct Parser<'a> {
    source: &'a str,
    extensions: &'a Extensions,
    args: &'a mut ArgumentTable,
}

impl<'a> Parser<'a> {
    /// Parses `source` into a tree, registering every variable it references
    /// in `args`.
    pub fn parse(
        source: &'a str,
        extensions: &'a Extensions,
        args: &'a mut ArgumentTable,
    ) -> Result<Node, ExpressError> {
        check_balanced(source)?;
        let mut parser = Parser {
            source,
            extensions,
            args,
        };
        parser.parse_span(0, source.len())
    }

    fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    fn parse_span(&mut self, start: usize, end: usize) -> Result<Node, ExpressError> {
        let (start, end) = strip_enclosing(self.bytes(), start, end);
        if start == end {
            return Err(ExpressError::syntax(
                "Empty operand",
                &self.source[start..end],
                start,
            ));
        }

        let pattern = scan_pattern(self.bytes(), start, end);
        for (ops, rightmost) in PRECEDENCE {
            let found = find_operator(&pattern, ops, rightmost)
                .and_then(|i| BinaryOp::from_char(char::from(pattern[i])).map(|op| (i, op)));
            if let Some((index, op)) = found {
                let at = start + index;
                trace!(op = %op.symbol(), at, span = &self.source[start..end], "split");
                let left = self.parse_span(start, at)?;
                let right = self.parse_span(at + 1, end)?;
                return Ok(Node::binary(op, left, right));
            }
        }

        self.parse_operand(start, end)
    }

    /// Parses a span without top-level binary operators.
    fn parse_operand(&mut self, start: usize, end: usize) -> Result<Node, ExpressError> {
        let text = &self.source[start..end];

        match parse_literal(text) {
            Literal::Number(value) => return Ok(Node::Constant(value)),
            Literal::OutOfRange => {
                return Err(ExpressError::syntax(
                    "Numeric literal out of range",
                    text,
                    start,
                ))
            }
            Literal::NotALiteral => {}
        }

        match self.bytes()[start] {
            b'-' => {
                return Ok(match self.parse_span(start + 1, end)? {
                    Node::Constant(value) => Node::Constant(-value),
                    node => Node::Neg(Box::new(node)),
                })
            }
            b'+' => return self.parse_span(start + 1, end),
            _ => {}
        }

        if let Some(node) = self.parse_call(start, end)? {
            return Ok(node);
        }

        if !is_identifier(text) {
            return Err(ExpressError::syntax("Invalid token", text, start));
        }
        let slot = self.args.get_or_insert(text);
        trace!(name = text, slot, "variable");
        Ok(Node::Variable {
            name: text.to_string(),
            slot,
        })
    }

    /// Parses `name(arg, …)` when the span has that shape. Returns `None` for
    /// spans that are not calls.
    fn parse_call(&mut self, start: usize, end: usize) -> Result<Option<Node>, ExpressError> {
        let bytes = self.bytes();
        if bytes[end - 1] != b')' {
            return Ok(None);
        }
        let open = match bytes[start..end].iter().position(|&b| b == b'(') {
            Some(i) => start + i,
            None => return Ok(None),
        };
        if matching_paren(&bytes[..end], open) != Some(end - 1) {
            return Ok(None);
        }

        let name = self.source[start..open].trim_end();
        if !is_identifier(name) {
            return Err(ExpressError::syntax(
                "Invalid extension name",
                &self.source[start..end],
                start,
            ));
        }
        let extensions = self.extensions;
        let Some(provider) = extensions.get(name) else {
            return Err(ExpressError::syntax(
                "Unknown extension",
                &self.source[start..end],
                start,
            ));
        };

        let mut args = Vec::new();
        for (arg_start, arg_end) in split_top_level(bytes, open + 1, end - 1) {
            args.push(self.parse_span(arg_start, arg_end)?);
        }
        trace!(name, args = args.len(), "extension call");
        let mut host = ExtensionHost::new(self.args);
        let node = provider(&mut host, args)?;
        self.check_extension_node(name, &node, start, end)?;
        Ok(Some(node))
    }

    /// Rejects provider output that would index past an argument slice:
    /// variables outside the table, or embedded expressions bound to the
    /// wrong number of arguments.
    fn check_extension_node(
        &self,
        name: &str,
        node: &Node,
        start: usize,
        end: usize,
    ) -> Result<(), ExpressError> {
        match node {
            Node::Constant(_) => Ok(()),
            Node::Variable { slot, .. } => {
                if *slot < self.args.len() {
                    Ok(())
                } else {
                    Err(ExpressError::syntax(
                        "Extension produced an unknown argument",
                        &self.source[start..end],
                        start,
                    ))
                }
            }
            Node::Neg(inner) => self.check_extension_node(name, inner, start, end),
            Node::Binary { left, right, .. } => {
                self.check_extension_node(name, left, start, end)?;
                self.check_extension_node(name, right, start, end)
            }
            Node::Call { args, .. } => args
                .iter()
                .try_for_each(|arg| self.check_extension_node(name, arg, start, end)),
            Node::Embedded { expression, args } => {
                assert_arity(name, Arity::Fixed(expression.arg_count()), args.len())?;
                args.iter()
                    .try_for_each(|arg| self.check_extension_node(name, arg, start, end))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Node, ArgumentTable) {
        let mut args = ArgumentTable::new();
        let node = Parser::parse(source, &Extensions::new(), &mut args)
            .unwrap_or_else(|e| panic!("parse({}) failed: {}", source, e));
        (node, args)
    }

    fn parse_err(source: &str) -> ExpressError {
        let mut args = ArgumentTable::new();
        Parser::parse(source, &Extensions::new(), &mut args)
            .err()
            .unwrap_or_else(|| panic!("expected error for {}", source))
    }

    #[test]
    fn test_parse_constant() {
        let (node, args) = parse("  42.5 ");
        assert!(matches!(node, Node::Constant(v) if v == 42.5));
        assert!(args.is_empty());
    }

    #[test]
    fn test_parse_negative_literal_folds() {
        let (node, _) = parse("- 2");
        assert!(matches!(node, Node::Constant(v) if v == -2.0));
    }

    #[test]
    fn test_parse_unary_minus_on_variable() {
        let (node, args) = parse("-a");
        assert!(matches!(node, Node::Neg(ref inner) if matches!(**inner, Node::Variable { slot: 0, .. })));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_parse_additive_is_left_associative() {
        let (node, _) = parse("a-b-c");
        match node {
            Node::Binary { op: BinaryOp::Sub, left, right } => {
                assert!(matches!(*left, Node::Binary { op: BinaryOp::Sub, .. }));
                assert!(matches!(*right, Node::Variable { ref name, .. } if name == "c"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_pow_is_right_associative() {
        let (node, _) = parse("2^3^2");
        match node {
            Node::Binary { op: BinaryOp::Pow, left, right } => {
                assert!(matches!(*left, Node::Constant(v) if v == 2.0));
                assert!(matches!(*right, Node::Binary { op: BinaryOp::Pow, .. }));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_variables_in_first_occurrence_order() {
        let (_, args) = parse("y*x+y");
        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["y", "x"]);
    }

    #[test]
    fn test_parse_scientific_literal() {
        let (node, args) = parse("1e-3+x");
        match node {
            Node::Binary { op: BinaryOp::Add, left, .. } => {
                assert!(matches!(*left, Node::Constant(v) if v == 0.001));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_inf_and_nan_are_variables() {
        let (_, args) = parse("inf+nan");
        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["inf", "nan"]);
    }

    #[test]
    fn test_parse_errors() {
        for source in ["", "   ", "a+", "()", "a b", "1.2.3", "foo(1)", "(a+b", "a+b)", "1e999"] {
            assert!(
                matches!(parse_err(source), ExpressError::Syntax { .. }),
                "source {:?}",
                source
            );
        }
    }

    #[test]
    fn test_error_carries_fragment_and_offset() {
        match parse_err("a + b c") {
            ExpressError::Syntax { fragment, offset, .. } => {
                assert_eq!(fragment, "b c");
                assert_eq!(offset, 4);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_call_splits_nested_commas() {
        let mut ext = Extensions::new();
        ext.add("pair", |_, args| Ok(Node::Constant(args.len() as f64)));
        let mut args = ArgumentTable::new();
        let node = Parser::parse("pair(pair(a, b), c)", &ext, &mut args).unwrap();
        assert!(matches!(node, Node::Constant(v) if v == 2.0));
        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_call_without_arguments() {
        let mut ext = Extensions::new();
        ext.add("zero", |_, args| Ok(Node::Constant(args.len() as f64)));
        let mut args = ArgumentTable::new();
        let node = Parser::parse("zero( )", &ext, &mut args).unwrap();
        assert!(matches!(node, Node::Constant(v) if v == 0.0));
    }
}
