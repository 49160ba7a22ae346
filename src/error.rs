//! Error types for Quill
//!
//! Every failure carries a detailed [`ErrorKind`] and, when known, the span of
//! the node that raised it. Reporters usually only care about the coarse
//! [`ErrorCategory`].

use crate::token::Span;
use std::fmt;
use thiserror::Error;

/// Coarse error classes surfaced to the error reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Syntax,
    Type,
    Name,
    Fault,
    Arithmetic,
    Io,
    Unsupported,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Type => "type",
            ErrorCategory::Name => "name",
            ErrorCategory::Fault => "fault",
            ErrorCategory::Arithmetic => "arithmetic",
            ErrorCategory::Io => "io",
            ErrorCategory::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}

/// Error kinds in Quill
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Lexer and parser errors
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("expected '{expected}', got '{found}'")]
    MismatchedDelimiter { expected: String, found: String },
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("malformed {0}")]
    MalformedForm(String),
    #[error("unknown statement '{0}'")]
    UnknownStatement(String),
    #[error("'{0}' is a reserved word and cannot be used as a name")]
    ReservedName(String),
    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),
    #[error("lists nested more than {0} levels deep")]
    NestingTooDeep(usize),

    // Type errors
    #[error("operator '{op}' cannot be applied to {left} and {right}")]
    OperandMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("type mismatch: expected {0}, got {1}")]
    TypeMismatch(String, String),
    #[error("method '{method}' expects {expected} arguments, got {got}")]
    WrongArity {
        method: String,
        expected: usize,
        got: usize,
    },
    #[error("cannot instantiate unknown class '{0}'")]
    NewUnknownClass(String),
    #[error("class '{0}' is already defined")]
    DuplicateClass(String),
    #[error("cannot read '{0}' as an integer")]
    InvalidInput(String),

    // Name errors
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    #[error("undefined class '{0}'")]
    UndefinedClass(String),
    #[error("class '{class}' has no method '{method}'")]
    UndefinedMethod { class: String, method: String },
    #[error("undefined field '{0}'")]
    UndefinedField(String),
    #[error("field '{field}' is defined more than once in class '{class}'")]
    DuplicateField { class: String, field: String },
    #[error("method '{method}' is defined more than once in class '{class}'")]
    DuplicateMethod { class: String, method: String },
    #[error("parameter '{param}' is repeated in method '{method}'")]
    DuplicateParameter { method: String, param: String },

    // Faults
    #[error("cannot call method '{0}' on null")]
    NullDereference(String),
    #[error("stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),

    // Arithmetic
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("integer overflow in '{0}'")]
    IntegerOverflow(String),

    // Unsupported operations
    #[error("cannot print a value of type {0}")]
    Unprintable(&'static str),

    // Input collaborator
    #[error("input exhausted")]
    InputExhausted,
}

impl ErrorKind {
    /// The reporter-facing class of this error
    pub fn category(&self) -> ErrorCategory {
        use ErrorKind::*;
        match self {
            UnterminatedString
            | UnexpectedToken(_)
            | MismatchedDelimiter { .. }
            | UnexpectedEof
            | MalformedForm(_)
            | UnknownStatement(_)
            | ReservedName(_)
            | InvalidInteger(_)
            | NestingTooDeep(_) => ErrorCategory::Syntax,

            OperandMismatch { .. }
            | TypeMismatch(..)
            | WrongArity { .. }
            | NewUnknownClass(_)
            | DuplicateClass(_)
            | InvalidInput(_) => ErrorCategory::Type,

            UndefinedVariable(_)
            | UndefinedClass(_)
            | UndefinedMethod { .. }
            | UndefinedField(_)
            | DuplicateField { .. }
            | DuplicateMethod { .. }
            | DuplicateParameter { .. } => ErrorCategory::Name,

            NullDereference(_) | StackOverflow(_) => ErrorCategory::Fault,

            DivisionByZero | ModuloByZero | IntegerOverflow(_) => ErrorCategory::Arithmetic,

            Unprintable(_) => ErrorCategory::Unsupported,

            InputExhausted => ErrorCategory::Io,
        }
    }
}

/// A Quill error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct QuillError {
    pub kind: ErrorKind,
    pub span: Option<Span>,
    pub source_line: Option<String>,
}

impl QuillError {
    pub fn new(kind: ErrorKind, span: Option<Span>) -> Self {
        Self {
            kind,
            span,
            source_line: None,
        }
    }

    pub fn at(kind: ErrorKind, span: Span) -> Self {
        Self::new(kind, Some(span))
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn with_source(mut self, source: &str) -> Self {
        if let Some(span) = &self.span {
            let lines: Vec<&str> = source.lines().collect();
            if span.line > 0 && span.line <= lines.len() {
                self.source_line = Some(lines[span.line - 1].to_string());
            }
        }
        self
    }
}

impl From<ErrorKind> for QuillError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, None)
    }
}

impl fmt::Display for QuillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = &self.span {
            write!(
                f,
                "[line {}:{}] {} error: {}",
                span.line,
                span.column,
                self.category(),
                self.kind
            )?;

            if let Some(ref line) = self.source_line {
                write!(f, "\n  | {}", line)?;
                write!(f, "\n  | {}^", " ".repeat(span.column.saturating_sub(1)))?;
            }
        } else {
            write!(f, "{} error: {}", self.category(), self.kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for QuillError {}

/// Result type for Quill operations
pub type Result<T> = std::result::Result<T, QuillError>;
