//! Quill CLI and REPL
//!
//! Usage:
//!   quill run <file.ql>     - Execute a Quill program
//!   quill check <file.ql>   - Parse and register classes without running
//!   quill repl              - Start interactive REPL

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use quill::interpreter::{DEFAULT_MAX_CALL_DEPTH, ENTRY_CLASS, ENTRY_METHOD};
use quill::{parse_program, Interpreter, InterpreterConfig, QuillError, StdConsole, Value, VERSION};

#[derive(Parser)]
#[command(name = "quill", version, about = "Quill - a class-based S-expression language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a Quill program (runs main.main)
    Run {
        /// Source file to run
        file: PathBuf,

        /// Maximum nested method calls before a stack overflow fault
        #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
        max_call_depth: usize,

        /// Estimated heap bytes that trigger garbage collection
        #[arg(long, default_value_t = quill::heap::DEFAULT_GC_THRESHOLD)]
        gc_threshold: usize,
    },
    /// Parse a program and register its classes without running it
    Check {
        /// Source file to check
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { file, max_call_depth, gc_threshold } => {
            let config = InterpreterConfig::default()
                .with_max_call_depth(max_call_depth)
                .with_gc_threshold(gc_threshold);
            run_file(&file, config);
        }
        Command::Check { file } => check_file(&file),
        Command::Repl => run_repl(),
    }
}

/// Diagnostics go to stderr, and only when RUST_LOG is set
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path.display(), e);
            process::exit(1);
        }
    }
}

fn report(err: QuillError, source: &str) -> ! {
    let err = err.with_source(source);
    eprintln!("{}", format!("{}", err).red());
    process::exit(1);
}

fn run_file(path: &Path, config: InterpreterConfig) {
    let source = read_source(path);

    let program = match parse_program(&source) {
        Ok(p) => p,
        Err(e) => report(e, &source),
    };

    let mut interpreter = Interpreter::with_config(StdConsole, config);
    if let Err(e) = interpreter.load(&program) {
        report(e, &source);
    }

    if let Err(e) = interpreter.run_main() {
        report(e, &source);
    }
}

fn check_file(path: &Path) {
    let source = read_source(path);

    let program = match parse_program(&source) {
        Ok(p) => p,
        Err(e) => report(e, &source),
    };

    let mut interpreter = Interpreter::stdio();
    if let Err(e) = interpreter.load(&program) {
        report(e, &source);
    }

    let has_entry = interpreter.registry.contains(ENTRY_CLASS);
    println!(
        "{} {}: {} classes{}",
        "ok".green().bold(),
        path.display(),
        interpreter.registry.len(),
        if has_entry { "" } else { " (no main class)" }
    );
}

fn run_repl() {
    println!("{} {} - {}",
        "Quill".cyan().bold(),
        VERSION.cyan(),
        "class-based S-expressions".dimmed()
    );
    println!("Type {} to exit, {} for help\n",
        "exit".yellow(),
        "help".yellow()
    );

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("{}: cannot start REPL: {}", "error".red(), e);
            process::exit(1);
        }
    };

    // Classes persist across inputs until `clear`
    let mut session = Interpreter::stdio();
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() {
            format!("{} ", "quill>".green().bold())
        } else {
            format!("{} ", "  ...>".dimmed())
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                if pending.is_empty() {
                    let command = line.trim();
                    if command.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(command);

                    match command {
                        "exit" | "quit" => {
                            println!("{}", "Goodbye!".cyan());
                            break;
                        }
                        "help" => {
                            print_repl_help();
                            continue;
                        }
                        "clear" => {
                            session = Interpreter::stdio();
                            println!("{}", "Session cleared.".dimmed());
                            continue;
                        }
                        "classes" => {
                            if session.registry.is_empty() {
                                println!("{}", "No classes defined.".dimmed());
                            }
                            for name in session.registry.names() {
                                println!("  {}", name.cyan());
                            }
                            continue;
                        }
                        "run" => {
                            match session.run(ENTRY_CLASS, ENTRY_METHOD) {
                                Ok(Value::Void) => {}
                                Ok(value) => println!("{} {}", "=>".dimmed(), format!("{}", value).cyan()),
                                Err(e) => eprintln!("{}", format!("{}", e).red()),
                            }
                            continue;
                        }
                        _ => {}
                    }
                } else {
                    let _ = rl.add_history_entry(line.trim());
                }

                pending.push_str(&line);
                pending.push('\n');
                if quill::parser::is_incomplete(&pending) {
                    continue;
                }

                let source = std::mem::take(&mut pending);
                define_classes(&mut session, &source);
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

/// Parse completed REPL input and register each class it declares
fn define_classes(session: &mut Interpreter<StdConsole>, source: &str) {
    let program = match parse_program(source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", format!("{}", e.with_source(source)).red());
            return;
        }
    };

    for decl in &program.classes {
        match session.register(decl) {
            Ok(class) => println!("{} class {}", "defined".dimmed(), class.name.cyan()),
            Err(e) => eprintln!("{}", format!("{}", e.with_source(source)).red()),
        }
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  run          Run main.main against the session classes");
    println!("  classes      List defined classes");
    println!("  clear        Forget all classes");
    println!("  exit, quit   Exit the REPL");
    println!("  help         Show this help\n");
    println!("{}", "Language Examples:".yellow());
    println!("  (class main");
    println!("    (field count 0)");
    println!("    (method main ()");
    println!("      (begin (set count (+ count 1)) (print \"count: \" count))))");
}
