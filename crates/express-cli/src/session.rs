//! Command dispatch for the interactive console.
//!
//! Each line is one command. Expressions are stored by name; every expression
//! created later can call the earlier ones as `name(arg, …)`.

use express_parser::parse::is_identifier;
use express_parser::{ExpressError, Expression, Extensions};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const GREETING: &str = "Welcome to the express console! Type \"help\" to get command list.";

pub const HELP: &str = "\
> 'exit' - close program
> 'help' - print this message
> 'clear' - clear the screen
> 'create <NAME> <EXPRESSION>' - create expression with name <NAME>
> 'compile <NAME>' - compile expression <NAME>
> 'set <NAME> <ARGUMENT> <VALUE>' - set argument <ARGUMENT> of expression <NAME> to <VALUE>
> 'eval <NAME>' - evaluate expression <NAME> by walking its tree
> 'eval-compiled <NAME>' - evaluate the compiled form of expression <NAME> (alias 'eval-il')
> 'list <NAME>' - print arguments (and values) of expression <NAME>";

const CLEAR: &str = "\x1b[2J\x1b[H";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CliError {
    #[error("Unknown command: \"{0}\". Type 'help' for more info.")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}.")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },

    #[error("There is no expression named \"{0}\".")]
    UnknownExpression(String),

    #[error("\"{0}\" is not a valid expression name.")]
    InvalidName(String),

    #[error("Expression \"{0}\" already exists.")]
    AlreadyExists(String),

    #[error("\"{0}\" is not a number.")]
    InvalidNumber(String),

    #[error(transparent)]
    Express(#[from] ExpressError),
}

/// What the console should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Print(String),
    Exit,
}

#[derive(Debug, Default)]
pub struct Session {
    expressions: BTreeMap<String, Expression>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one command line. Blank lines print nothing.
    pub fn dispatch(&mut self, line: &str) -> Result<Outcome, CliError> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!(command, "dispatch");
        let output = match command {
            "" => String::new(),
            "exit" => return Ok(Outcome::Exit),
            "help" => HELP.to_string(),
            "clear" => CLEAR.to_string(),
            "create" => self.create(rest)?,
            "compile" => self.compile(rest)?,
            "set" => self.set(rest)?,
            "eval" => self.eval(rest)?,
            "eval-compiled" | "eval-il" => self.eval_compiled(rest)?,
            "list" => self.list(rest)?,
            other => return Err(CliError::UnknownCommand(other.to_string())),
        };
        Ok(Outcome::Print(output))
    }

    fn create(&mut self, rest: &str) -> Result<String, CliError> {
        let usage = CliError::Usage {
            command: "create",
            expected: "<NAME> <EXPRESSION>",
        };
        let (name, source) = rest.split_once(char::is_whitespace).ok_or(usage)?;
        if !is_identifier(name) {
            return Err(CliError::InvalidName(name.to_string()));
        }
        if self.expressions.contains_key(name) {
            return Err(CliError::AlreadyExists(name.to_string()));
        }
        let expression = Expression::with_extensions(source.trim(), self.extensions())?;
        self.expressions.insert(name.to_string(), expression);
        Ok(format!("Created expression \"{}\".", name))
    }

    fn compile(&mut self, rest: &str) -> Result<String, CliError> {
        let name = single_arg(rest, "compile")?;
        self.get(name)?.compile();
        Ok(format!("Compiled expression \"{}\".", name))
    }

    fn set(&mut self, rest: &str) -> Result<String, CliError> {
        let parts: Vec<&str> = rest.split_whitespace().collect();
        let [name, arg, raw] = parts[..] else {
            return Err(CliError::Usage {
                command: "set",
                expected: "<NAME> <ARGUMENT> <VALUE>",
            });
        };
        let value: f64 = raw
            .parse()
            .map_err(|_| CliError::InvalidNumber(raw.to_string()))?;
        self.get_mut(name)?.set_argument(arg, value)?;
        Ok(format!("Success: {}.{}={}", name, arg, value))
    }

    fn eval(&self, rest: &str) -> Result<String, CliError> {
        let name = single_arg(rest, "eval")?;
        let result = self.get(name)?.evaluate();
        Ok(format!("Evaluation result: {}", result))
    }

    fn eval_compiled(&self, rest: &str) -> Result<String, CliError> {
        let name = single_arg(rest, "eval-compiled")?;
        let result = self.get(name)?.evaluate_compiled()?;
        Ok(format!("Evaluation result: {}", result))
    }

    fn list(&self, rest: &str) -> Result<String, CliError> {
        let name = single_arg(rest, "list")?;
        let expression = self.get(name)?;
        if expression.arg_count() == 0 {
            return Ok(format!("Expression \"{}\" contains no arguments.", name));
        }
        let mut out = format!("Arguments of expression \"{}\":", name);
        let last = expression.arg_count() - 1;
        for (i, (arg, value)) in expression.arguments().enumerate() {
            let branch = if i == last { '╙' } else { '╟' };
            out.push_str(&format!("\n{}{} = {}", branch, arg, value));
        }
        Ok(out)
    }

    /// Math functions plus every stored expression, callable by name.
    fn extensions(&self) -> Arc<Extensions> {
        let mut extensions = Extensions::with_math();
        for (name, expression) in &self.expressions {
            extensions.add_expression(name, expression.clone());
        }
        Arc::new(extensions)
    }

    fn get(&self, name: &str) -> Result<&Expression, CliError> {
        self.expressions
            .get(name)
            .ok_or_else(|| CliError::UnknownExpression(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Expression, CliError> {
        self.expressions
            .get_mut(name)
            .ok_or_else(|| CliError::UnknownExpression(name.to_string()))
    }
}

fn single_arg<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, CliError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(name), None) => Ok(name),
        _ => Err(CliError::Usage {
            command,
            expected: "<NAME>",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, line: &str) -> String {
        match session.dispatch(line) {
            Ok(Outcome::Print(s)) => s,
            other => panic!("{}: unexpected {:?}", line, other),
        }
    }

    #[test]
    fn test_create_set_eval() {
        let mut session = Session::new();
        assert_eq!(run(&mut session, "create f a + b * 2"), "Created expression \"f\".");
        assert_eq!(run(&mut session, "set f a 1.5"), "Success: f.a=1.5");
        assert_eq!(run(&mut session, "set f b 2"), "Success: f.b=2");
        assert_eq!(run(&mut session, "eval f"), "Evaluation result: 5.5");
    }

    #[test]
    fn test_eval_compiled_requires_compile() {
        let mut session = Session::new();
        run(&mut session, "create f 1/0");
        assert_eq!(
            session.dispatch("eval-compiled f"),
            Err(CliError::Express(ExpressError::NotCompiled))
        );
        assert_eq!(run(&mut session, "compile f"), "Compiled expression \"f\".");
        assert_eq!(run(&mut session, "eval-il f"), "Evaluation result: inf");
    }

    #[test]
    fn test_list() {
        let mut session = Session::new();
        run(&mut session, "create g y*x");
        run(&mut session, "set g x 3");
        assert_eq!(
            run(&mut session, "list g"),
            "Arguments of expression \"g\":\n╟y = 0\n╙x = 3"
        );
        run(&mut session, "create c 42");
        assert_eq!(run(&mut session, "list c"), "Expression \"c\" contains no arguments.");
    }

    #[test]
    fn test_later_expressions_call_earlier_ones() {
        let mut session = Session::new();
        run(&mut session, "create sq v^2");
        run(&mut session, "create h sqrt(sq(a) + sq(b))");
        run(&mut session, "set h a 3");
        run(&mut session, "set h b 4");
        run(&mut session, "compile h");
        assert_eq!(run(&mut session, "eval h"), "Evaluation result: 5");
        assert_eq!(run(&mut session, "eval-compiled h"), "Evaluation result: 5");
    }

    #[test]
    fn test_errors() {
        let mut session = Session::new();
        assert_eq!(
            session.dispatch("frobnicate"),
            Err(CliError::UnknownCommand("frobnicate".into()))
        );
        assert_eq!(
            session.dispatch("eval nope"),
            Err(CliError::UnknownExpression("nope".into()))
        );
        assert!(matches!(session.dispatch("create f"), Err(CliError::Usage { .. })));
        assert!(matches!(
            session.dispatch("create 1f a"),
            Err(CliError::InvalidName(_))
        ));
        assert!(matches!(
            session.dispatch("create f (a"),
            Err(CliError::Express(ExpressError::Syntax { .. }))
        ));
        run(&mut session, "create f a");
        assert_eq!(
            session.dispatch("set f a x"),
            Err(CliError::InvalidNumber("x".into()))
        );
        assert!(matches!(session.dispatch("set f a"), Err(CliError::Usage { .. })));
        assert_eq!(
            session.dispatch("set f a NaN"),
            Err(CliError::Express(ExpressError::InvalidValue { name: "a".into() }))
        );
    }

    #[test]
    fn test_create_rejects_existing_name() {
        let mut session = Session::new();
        run(&mut session, "create f a+1");
        run(&mut session, "set f a 5");
        assert_eq!(
            session.dispatch("create f b*2"),
            Err(CliError::AlreadyExists("f".into()))
        );
        assert_eq!(run(&mut session, "list f"), "Arguments of expression \"f\":\n╙a = 5");
        assert_eq!(run(&mut session, "eval f"), "Evaluation result: 6");
    }

    #[test]
    fn test_exit_and_blank() {
        let mut session = Session::new();
        assert_eq!(session.dispatch("exit"), Ok(Outcome::Exit));
        assert_eq!(session.dispatch("   "), Ok(Outcome::Print(String::new())));
    }
}
