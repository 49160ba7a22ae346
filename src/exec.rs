//! Statement execution
//!
//! Every statement yields a [`Flow`]. A `Return` produced anywhere inside a
//! method body short-circuits the enclosing `begin`, `while` and `if` nodes
//! until it reaches the invocation boundary in [`Interpreter::invoke`].

use crate::ast::{Expr, InputKind, Stmt};
use crate::console::Console;
use crate::error::{ErrorKind, QuillError, Result};
use crate::interpreter::{Interpreter, STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::token::Span;
use crate::value::Value;

/// Outcome of executing one statement
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Keep going with the next statement
    Continue,
    /// Unwind to the caller with this value
    Return(Value),
}

impl<C: Console> Interpreter<C> {
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.exec_stmt_inner(stmt))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> Result<Flow> {
        tracing::trace!(
            method = %self.frame().method,
            line = stmt.span().line,
            column = stmt.span().column,
            "exec"
        );

        match stmt {
            Stmt::Print { args, .. } => {
                let mut line = String::new();
                for arg in args {
                    let value = self.eval_expr(arg)?;
                    let text = value.printed().ok_or_else(|| {
                        QuillError::at(ErrorKind::Unprintable(value.type_name()), arg.span())
                    })?;
                    line.push_str(&text);
                }
                self.console.write_line(&line);
                Ok(Flow::Continue)
            }

            Stmt::Input { kind, field, span } => {
                self.exec_input(*kind, field, *span)?;
                Ok(Flow::Continue)
            }

            Stmt::Call(call) => {
                self.eval_call(call)?;
                Ok(Flow::Continue)
            }

            Stmt::If { condition, then_branch, else_branch, .. } => {
                if self.eval_condition(condition)? {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(Flow::Continue)
                }
            }

            Stmt::While { condition, body, .. } => {
                while self.eval_condition(condition)? {
                    if let Flow::Return(value) = self.exec_stmt(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Continue)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Void,
                };
                Ok(Flow::Return(value))
            }

            Stmt::Begin { stmts, .. } => {
                for stmt in stmts {
                    if let Flow::Return(value) = self.exec_stmt(stmt)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Continue)
            }

            Stmt::Set { name, value, span } => {
                let value = self.eval_expr(value)?;
                self.assign(name, value, *span)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// `if` and `while` conditions must be booleans
    fn eval_condition(&mut self, condition: &Expr) -> Result<bool> {
        match self.eval_expr(condition)? {
            Value::Bool(b) => Ok(b),
            other => Err(QuillError::at(
                ErrorKind::TypeMismatch("bool".to_string(), other.type_name().to_string()),
                condition.span(),
            )),
        }
    }

    /// Store into a parameter of the active frame, else into a field of the
    /// receiver
    fn assign(&mut self, name: &str, value: Value, span: Span) -> Result<()> {
        let frame = self.frame_mut();
        if frame.contains(name) {
            frame.assign(name, value);
            return Ok(());
        }

        let receiver = frame.receiver;
        let stored = self
            .heap
            .get_instance_mut(receiver)
            .is_some_and(|instance| instance.assign(name, value));

        if stored {
            Ok(())
        } else {
            Err(QuillError::at(ErrorKind::UndefinedField(name.to_string()), span))
        }
    }

    fn exec_input(&mut self, kind: InputKind, field: &str, span: Span) -> Result<()> {
        let receiver = self.frame().receiver;
        let has_field = self
            .heap
            .get_instance(receiver)
            .is_some_and(|instance| instance.field(field).is_some());
        if !has_field {
            return Err(QuillError::at(ErrorKind::UndefinedField(field.to_string()), span));
        }

        let line = self
            .console
            .read_line()
            .ok_or_else(|| QuillError::at(ErrorKind::InputExhausted, span))?;

        let value = match kind {
            InputKind::Int => line
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| QuillError::at(ErrorKind::InvalidInput(line.clone()), span))?,
            InputKind::Str => Value::Str(line),
        };

        if let Some(instance) = self.heap.get_instance_mut(receiver) {
            instance.assign(field, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferedConsole;
    use crate::parser::parse_program;

    /// Run a single statement as the body of `main.main`, with fields `x` and
    /// `s` available
    fn run_body(body: &str, input: &[&str]) -> (Result<Value>, Vec<String>) {
        let source = format!(
            "(class main (field x 0) (field s \"\") (method main () {}))",
            body
        );
        let program = parse_program(&source).expect("parse failed");
        let mut interp = Interpreter::new(BufferedConsole::with_input(input.iter().copied()));
        interp.load(&program).expect("load failed");
        let result = interp.run_main();
        (result, interp.into_console().take_output())
    }

    #[test]
    fn test_print_concatenates() {
        let (result, out) = run_body(r#"(print "x=" 5 " " true)"#, &[]);
        assert_eq!(result.unwrap(), Value::Void);
        assert_eq!(out, vec!["x=5 true"]);
    }

    #[test]
    fn test_print_object_is_unsupported() {
        let (result, _) = run_body("(print me)", &[]);
        assert_eq!(result.unwrap_err().kind, ErrorKind::Unprintable("object"));
    }

    #[test]
    fn test_begin_stops_at_return() {
        let (result, out) = run_body("(begin (print 1) (return 5) (print 2))", &[]);
        assert_eq!(result.unwrap(), Value::Int(5));
        assert_eq!(out, vec!["1"]);
    }

    #[test]
    fn test_while_returns_on_first_iteration() {
        let (result, out) = run_body(
            "(begin (while (< x 10) (begin (print x) (set x (+ x 1)) (return x))) (print \"after\"))",
            &[],
        );
        assert_eq!(result.unwrap(), Value::Int(1));
        assert_eq!(out, vec!["0"]);
    }

    #[test]
    fn test_if_requires_bool() {
        let (result, _) = run_body("(if 1 (print 1))", &[]);
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch("bool".into(), "int".into()));
    }

    #[test]
    fn test_return_without_value_is_void() {
        let (result, out) = run_body("(begin (return) (print 1))", &[]);
        assert_eq!(result.unwrap(), Value::Void);
        assert!(out.is_empty());
    }

    #[test]
    fn test_set_unknown_name() {
        let (result, _) = run_body("(set nope 1)", &[]);
        assert_eq!(result.unwrap_err().kind, ErrorKind::UndefinedField("nope".into()));
    }

    #[test]
    fn test_inputs_and_inputi() {
        let (result, out) = run_body(
            "(begin (inputi x) (inputs s) (print (+ x 1) s))",
            &[" 41 ", "hello"],
        );
        assert!(result.is_ok());
        assert_eq!(out, vec!["42hello"]);
    }

    #[test]
    fn test_inputi_rejects_text() {
        let (result, _) = run_body("(inputi x)", &["abc"]);
        assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidInput("abc".into()));
    }

    #[test]
    fn test_input_exhausted() {
        let (result, _) = run_body("(inputs s)", &[]);
        assert_eq!(result.unwrap_err().kind, ErrorKind::InputExhausted);
    }

    #[test]
    fn test_input_unknown_field() {
        let (result, _) = run_body("(inputi y)", &["1"]);
        assert_eq!(result.unwrap_err().kind, ErrorKind::UndefinedField("y".into()));
    }
}
