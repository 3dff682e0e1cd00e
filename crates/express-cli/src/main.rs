//! Interactive console for creating, compiling and evaluating expressions.

mod session;

use session::{Outcome, Session, GREETING};
use std::io::{self, BufRead, Write};

/// Installs a stderr subscriber when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> io::Result<()> {
    init_tracing();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut session = Session::new();

    writeln!(stdout, "{}", GREETING)?;
    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        match session.dispatch(&line?) {
            Ok(Outcome::Exit) => break,
            Ok(Outcome::Print(text)) if text.is_empty() => {}
            Ok(Outcome::Print(text)) => writeln!(stdout, "{}", text)?,
            Err(err) => writeln!(stdout, "Error: {}", err)?,
        }
    }
    Ok(())
}
