//! Quill - a small class-based language written as S-expressions
//!
//! A program is a list of `(class ...)` forms. Running it instantiates class
//! `main` and calls its `main` method.

pub mod token;
pub mod lexer;
pub mod parser;
pub mod ast;
pub mod value;
pub mod class;
pub mod registry;
pub mod heap;
pub mod frame;
pub mod console;
pub mod error;
pub mod interpreter;
pub mod eval;
pub mod exec;

pub use console::{BufferedConsole, Console, StdConsole};
pub use error::{ErrorCategory, ErrorKind, QuillError, Result};
pub use interpreter::{Interpreter, InterpreterConfig};
pub use lexer::Lexer;
pub use parser::{parse_program, Parser};
pub use value::Value;

/// Convenience function to run Quill code against stdin/stdout
pub fn run(source: &str) -> Result<Value> {
    run_with_console(source, StdConsole)
}

/// Parse `source` and run `main.main` with the given console
pub fn run_with_console<C: Console>(source: &str, console: C) -> Result<Value> {
    run_with_config(source, console, InterpreterConfig::default())
}

pub fn run_with_config<C: Console>(
    source: &str,
    console: C,
    config: InterpreterConfig,
) -> Result<Value> {
    let program = parse_program(source)?;

    let mut interpreter = Interpreter::with_config(console, config);
    interpreter.load(&program)?;
    interpreter.run_main()
}

/// Version of the Quill interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
