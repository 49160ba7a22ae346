//! Parser for Quill
//!
//! Parsing happens in two passes: tokens are first read into generic
//! S-expressions, which are then lowered into the typed AST. Shape errors are
//! reported against the span of the offending list or atom.

use crate::ast::{
    BinaryOp, CallExpr, ClassDecl, Expr, FieldDecl, InputKind, MethodDecl, Program, Stmt, UnaryOp,
};
use crate::error::{ErrorKind, QuillError, Result};
use crate::lexer::Lexer;
use crate::token::{is_keyword, Span, Token, TokenKind};

/// A generic S-expression
#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    Atom { text: String, span: Span },
    Str { value: String, span: Span },
    List { items: Vec<SExpr>, span: Span },
}

impl SExpr {
    pub fn span(&self) -> Span {
        match self {
            SExpr::Atom { span, .. } | SExpr::Str { span, .. } | SExpr::List { span, .. } => *span,
        }
    }

    fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Deepest list nesting the reader accepts
pub const MAX_NESTING_DEPTH: usize = 256;

/// The parser state
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser from tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0, depth: 0 }
    }

    /// Parse the tokens into a program
    pub fn parse(&mut self) -> Result<Program> {
        let classes = self
            .read_all()?
            .iter()
            .map(lower_class)
            .collect::<Result<Vec<_>>>()?;
        Ok(Program::new(classes))
    }

    /// Read every top-level S-expression
    pub fn read_all(&mut self) -> Result<Vec<SExpr>> {
        let mut forms = Vec::new();
        while !self.is_at_end() {
            forms.push(self.read()?);
        }
        Ok(forms)
    }

    // ==================== Reader ====================

    fn read(&mut self) -> Result<SExpr> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Atom(text) => Ok(SExpr::Atom { text: text.clone(), span: token.span }),
            TokenKind::String(value) => Ok(SExpr::Str { value: value.clone(), span: token.span }),
            TokenKind::LeftParen | TokenKind::LeftBracket => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(QuillError::at(
                        ErrorKind::NestingTooDeep(MAX_NESTING_DEPTH),
                        token.span,
                    ));
                }
                let closer = token.kind.closer().unwrap_or(TokenKind::RightParen);
                self.depth += 1;
                let list = self.read_list(token.span, closer);
                self.depth -= 1;
                list
            }
            TokenKind::RightParen | TokenKind::RightBracket => Err(QuillError::at(
                ErrorKind::UnexpectedToken(token.kind.to_string()),
                token.span,
            )),
            TokenKind::Eof => Err(QuillError::at(ErrorKind::UnexpectedEof, token.span)),
        }
    }

    fn read_list(&mut self, open: Span, closer: TokenKind) -> Result<SExpr> {
        let mut items = Vec::new();
        loop {
            let next = self.peek();
            if next.kind == TokenKind::Eof {
                return Err(QuillError::at(ErrorKind::UnexpectedEof, open));
            }
            if next.kind.is_closer() {
                let close = self.advance();
                if close.kind != closer {
                    return Err(QuillError::at(
                        ErrorKind::MismatchedDelimiter {
                            expected: closer.to_string(),
                            found: close.kind.to_string(),
                        },
                        close.span,
                    ));
                }
                let span = Span::new(open.start, close.span.end, open.line, open.column);
                return Ok(SExpr::List { items, span });
            }
            items.push(self.read()?);
        }
    }

    // ==================== Helpers ====================

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.current < self.tokens.len() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.tokens.is_empty() || self.peek().kind == TokenKind::Eof
    }
}

/// Tokenize and parse a complete program
pub fn parse_program(source: &str) -> Result<Program> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse()
}

/// Whether `source` ends inside an open list or string, meaning more input is
/// needed before it can be parsed
pub fn is_incomplete(source: &str) -> bool {
    match Lexer::new(source).tokenize() {
        Ok(tokens) => {
            let mut depth: isize = 0;
            for token in &tokens {
                match token.kind {
                    TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
                    TokenKind::RightParen | TokenKind::RightBracket => depth -= 1,
                    _ => {}
                }
            }
            depth > 0
        }
        Err(e) => e.kind == ErrorKind::UnterminatedString,
    }
}

// ==================== Lowering ====================

fn malformed(what: &str, span: Span) -> QuillError {
    QuillError::at(ErrorKind::MalformedForm(what.to_string()), span)
}

/// Split a list into its head keyword and its items
fn list_with_head<'a>(expr: &'a SExpr) -> Option<(&'a str, &'a [SExpr], Span)> {
    match expr {
        SExpr::List { items, span } => {
            let head = items.first()?.as_atom()?;
            Some((head, items.as_slice(), *span))
        }
        _ => None,
    }
}

fn name_of(expr: &SExpr, what: &str) -> Result<String> {
    match expr.as_atom() {
        Some(text) if is_keyword(text) => Err(QuillError::at(
            ErrorKind::ReservedName(text.to_string()),
            expr.span(),
        )),
        Some(text) => Ok(text.to_string()),
        None => Err(malformed(what, expr.span())),
    }
}

fn lower_class(expr: &SExpr) -> Result<ClassDecl> {
    const SHAPE: &str = "class: expected (class <name> <member>...)";

    let (head, items, span) = list_with_head(expr).ok_or_else(|| malformed(SHAPE, expr.span()))?;
    if head != "class" || items.len() < 2 {
        return Err(malformed(SHAPE, span));
    }

    let name = name_of(&items[1], SHAPE)?;
    let mut fields = Vec::new();
    let mut methods = Vec::new();

    for member in &items[2..] {
        match list_with_head(member) {
            Some(("field", parts, span)) => {
                if parts.len() != 3 {
                    return Err(malformed("field: expected (field <name> <expr>)", span));
                }
                fields.push(FieldDecl {
                    name: name_of(&parts[1], "field name")?,
                    default: lower_expr(&parts[2])?,
                    span,
                });
            }
            Some(("method", parts, span)) => methods.push(lower_method(parts, span)?),
            _ => {
                return Err(malformed(
                    "class member: expected (field ...) or (method ...)",
                    member.span(),
                ))
            }
        }
    }

    Ok(ClassDecl { name, fields, methods, span })
}

fn lower_method(parts: &[SExpr], span: Span) -> Result<MethodDecl> {
    const SHAPE: &str = "method: expected (method <name> (<params>...) <statement>)";

    if parts.len() != 4 {
        return Err(malformed(SHAPE, span));
    }
    let name = name_of(&parts[1], SHAPE)?;
    let params = match &parts[2] {
        SExpr::List { items, .. } => items
            .iter()
            .map(|p| name_of(p, "parameter name"))
            .collect::<Result<Vec<_>>>()?,
        other => return Err(malformed(SHAPE, other.span())),
    };
    let body = lower_stmt(&parts[3])?;

    Ok(MethodDecl { name, params, body, span })
}

/// Lower a statement form
pub fn lower_stmt(expr: &SExpr) -> Result<Stmt> {
    let (head, items, span) = match expr {
        SExpr::List { items, span } => match items.first() {
            Some(SExpr::Atom { text, .. }) => (text.as_str(), items.as_slice(), *span),
            Some(other) => return Err(malformed("statement", other.span())),
            None => return Err(malformed("statement: empty list", *span)),
        },
        other => return Err(malformed("statement: expected a list", other.span())),
    };
    let args = &items[1..];

    let stmt = match head {
        "print" => Stmt::Print {
            args: args.iter().map(lower_expr).collect::<Result<Vec<_>>>()?,
            span,
        },
        "inputi" | "inputs" => {
            if args.len() != 1 {
                return Err(malformed("input: expected (inputi <field>)", span));
            }
            let kind = if head == "inputi" { InputKind::Int } else { InputKind::Str };
            Stmt::Input {
                kind,
                field: name_of(&args[0], "input target")?,
                span,
            }
        }
        "call" => Stmt::Call(Box::new(lower_call(args, span)?)),
        "if" => {
            if args.len() != 2 && args.len() != 3 {
                return Err(malformed("if: expected (if <cond> <then> [<else>])", span));
            }
            Stmt::If {
                condition: lower_expr(&args[0])?,
                then_branch: Box::new(lower_stmt(&args[1])?),
                else_branch: args.get(2).map(lower_stmt).transpose()?.map(Box::new),
                span,
            }
        }
        "while" => {
            if args.len() != 2 {
                return Err(malformed("while: expected (while <cond> <body>)", span));
            }
            Stmt::While {
                condition: lower_expr(&args[0])?,
                body: Box::new(lower_stmt(&args[1])?),
                span,
            }
        }
        "return" => {
            if args.len() > 1 {
                return Err(malformed("return: expected (return [<expr>])", span));
            }
            Stmt::Return {
                value: args.first().map(lower_expr).transpose()?,
                span,
            }
        }
        "begin" => Stmt::Begin {
            stmts: args.iter().map(lower_stmt).collect::<Result<Vec<_>>>()?,
            span,
        },
        "set" => {
            if args.len() != 2 {
                return Err(malformed("set: expected (set <name> <expr>)", span));
            }
            Stmt::Set {
                name: name_of(&args[0], "set target")?,
                value: lower_expr(&args[1])?,
                span,
            }
        }
        other => {
            return Err(QuillError::at(
                ErrorKind::UnknownStatement(other.to_string()),
                span,
            ))
        }
    };

    Ok(stmt)
}

fn lower_call(args: &[SExpr], span: Span) -> Result<CallExpr> {
    if args.len() < 2 {
        return Err(malformed("call: expected (call <target> <method> <args>...)", span));
    }
    Ok(CallExpr {
        target: lower_expr(&args[0])?,
        method: name_of(&args[1], "method name")?,
        args: args[2..].iter().map(lower_expr).collect::<Result<Vec<_>>>()?,
        span,
    })
}

/// Lower an expression
pub fn lower_expr(expr: &SExpr) -> Result<Expr> {
    match expr {
        SExpr::Str { value, span } => Ok(Expr::Str { value: value.clone(), span: *span }),
        SExpr::Atom { text, span } => lower_atom(text, *span),
        SExpr::List { items, span } => {
            let span = *span;
            let Some(head) = items.first().and_then(SExpr::as_atom) else {
                return Err(malformed("expression", span));
            };
            let args = &items[1..];

            if let Some(op) = BinaryOp::from_symbol(head) {
                if args.len() != 2 {
                    return Err(malformed(&format!("expression: '{}' takes two operands", op), span));
                }
                return Ok(Expr::Binary {
                    op,
                    left: Box::new(lower_expr(&args[0])?),
                    right: Box::new(lower_expr(&args[1])?),
                    span,
                });
            }

            match head {
                "!" => {
                    if args.len() != 1 {
                        return Err(malformed("expression: '!' takes one operand", span));
                    }
                    Ok(Expr::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(lower_expr(&args[0])?),
                        span,
                    })
                }
                "new" => {
                    if args.len() != 1 {
                        return Err(malformed("new: expected (new <class>)", span));
                    }
                    Ok(Expr::New { class: name_of(&args[0], "class name")?, span })
                }
                "call" => Ok(Expr::Call(Box::new(lower_call(args, span)?))),
                other => Err(malformed(&format!("expression starting with '{}'", other), span)),
            }
        }
    }
}

fn lower_atom(text: &str, span: Span) -> Result<Expr> {
    match text {
        "true" => return Ok(Expr::Bool { value: true, span }),
        "false" => return Ok(Expr::Bool { value: false, span }),
        "null" => return Ok(Expr::Null { span }),
        "me" => return Ok(Expr::Me { span }),
        _ => {}
    }

    if looks_numeric(text) {
        return text
            .parse::<i64>()
            .map(|value| Expr::Int { value, span })
            .map_err(|_| QuillError::at(ErrorKind::InvalidInteger(text.to_string()), span));
    }

    Ok(Expr::Ident { name: text.to_string(), span })
}

/// Optional sign followed by at least one decimal digit and nothing else
fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
