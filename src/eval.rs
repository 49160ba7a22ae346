//! Expression evaluation
//!
//! Operands are evaluated eagerly, left to right. Every operator checks the
//! kinds of its operands before doing anything else; there are no implicit
//! conversions.

use crate::ast::{BinaryOp, CallExpr, Expr, UnaryOp};
use crate::console::Console;
use crate::error::{ErrorKind, QuillError, Result};
use crate::heap::Handle;
use crate::interpreter::{Interpreter, STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::value::{Value, ValueKind};

impl<C: Console> Interpreter<C> {
    /// Evaluate an expression in the active frame, growing the host stack if
    /// recursion runs deep
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Int { value, .. } => Ok(Value::Int(*value)),
            Expr::Str { value, .. } => Ok(Value::Str(value.clone())),
            Expr::Bool { value, .. } => Ok(Value::Bool(*value)),
            Expr::Null { .. } => Ok(Value::Null),
            Expr::Me { .. } => Ok(Value::Object(self.frame().receiver)),

            Expr::Ident { name, span } => self.lookup(name).ok_or_else(|| {
                QuillError::at(ErrorKind::UndefinedVariable(name.clone()), *span)
            }),

            Expr::Binary { op, left, right, span } => {
                let left = self.eval_expr(left)?;
                // Keep the left operand alive while the right one runs
                self.roots.push(left.clone());
                let right = self.eval_expr(right);
                self.roots.pop();

                binary_op(*op, left, right?).map_err(|kind| QuillError::at(kind, *span))
            }

            Expr::Unary { op: UnaryOp::Not, operand, span } => match self.eval_expr(operand)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(QuillError::at(
                    ErrorKind::TypeMismatch("bool".to_string(), other.type_name().to_string()),
                    *span,
                )),
            },

            Expr::New { class, span } => {
                let def = self.registry.resolve(class).map_err(|_| {
                    QuillError::at(ErrorKind::NewUnknownClass(class.clone()), *span)
                })?;
                Ok(Value::Object(self.instantiate_class(def, Some(*span))?))
            }

            Expr::Call(call) => self.eval_call(call),
        }
    }

    /// Resolve a name: parameters of the active frame first, then fields of
    /// the receiver
    fn lookup(&self, name: &str) -> Option<Value> {
        let frame = self.frame();
        if let Some(value) = frame.get(name) {
            return Some(value.clone());
        }
        self.heap
            .get_instance(frame.receiver)
            .and_then(|instance| instance.field(name))
            .cloned()
    }

    /// Evaluate the target and arguments of a call in the caller's frame, then
    /// dispatch
    pub(crate) fn eval_call(&mut self, call: &CallExpr) -> Result<Value> {
        let receiver = self.eval_target(call)?;

        let base = self.roots.len();
        self.roots.push(Value::Object(receiver));
        let args = self.eval_args(&call.args);
        self.roots.truncate(base);

        self.invoke(receiver, &call.method, args?, Some(call.span))
    }

    fn eval_target(&mut self, call: &CallExpr) -> Result<Handle> {
        if let Expr::Me { .. } = call.target {
            return Ok(self.frame().receiver);
        }

        match self.eval_expr(&call.target)? {
            Value::Object(handle) => Ok(handle),
            Value::Null => Err(QuillError::at(
                ErrorKind::NullDereference(call.method.clone()),
                call.span,
            )),
            other => Err(QuillError::at(
                ErrorKind::TypeMismatch("object".to_string(), other.type_name().to_string()),
                call.target.span(),
            )),
        }
    }

    /// Evaluate arguments left to right, rooting each one as it is produced.
    /// The caller truncates the root stack afterwards.
    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.eval_expr(arg)?;
            self.roots.push(value.clone());
            values.push(value);
        }
        Ok(values)
    }
}

/// Apply a binary operator to two evaluated operands
pub fn binary_op(op: BinaryOp, left: Value, right: Value) -> std::result::Result<Value, ErrorKind> {
    let mismatch = || ErrorKind::OperandMismatch {
        op: op.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    };

    if left.kind() != right.kind() || left.kind() == ValueKind::Void {
        return Err(mismatch());
    }

    match (op, &left, &right) {
        (BinaryOp::Eq, _, _) => Ok(Value::Bool(left == right)),
        (BinaryOp::Ne, _, _) => Ok(Value::Bool(left != right)),

        (BinaryOp::Lt, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a < b)),
        (BinaryOp::Gt, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a > b)),
        (BinaryOp::Le, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a <= b)),
        (BinaryOp::Ge, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a >= b)),

        (
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod,
            Value::Int(a),
            Value::Int(b),
        ) => arithmetic(op, *a, *b).map(Value::Int),

        (BinaryOp::And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
        (BinaryOp::Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),

        _ => Err(mismatch()),
    }
}

/// Checked 64-bit integer arithmetic
fn arithmetic(op: BinaryOp, a: i64, b: i64) -> std::result::Result<i64, ErrorKind> {
    let overflow = || ErrorKind::IntegerOverflow(op.to_string());
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(overflow),
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(overflow),
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(overflow),
        BinaryOp::Div => {
            if b == 0 {
                return Err(ErrorKind::DivisionByZero);
            }
            i64::try_from(div_round_half_up(a, b)).map_err(|_| overflow())
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(ErrorKind::ModuloByZero);
            }
            Ok(mod_floor(a, b))
        }
        _ => Err(overflow()),
    }
}

/// Quotient rounded to the nearest integer, exact halves rounded up
fn div_round_half_up(a: i64, b: i64) -> i128 {
    let (mut n, mut d) = (a as i128, b as i128);
    if d < 0 {
        n = -n;
        d = -d;
    }
    // floor((n / d) + 1/2)
    (2 * n + d).div_euclid(2 * d)
}

/// Remainder with the sign of the divisor
fn mod_floor(a: i64, b: i64) -> i64 {
    let (a, b) = (a as i128, b as i128);
    let r = a % b;
    let r = if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r };
    r as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn op(op: BinaryOp, a: Value, b: Value) -> std::result::Result<Value, ErrorKind> {
        binary_op(op, a, b)
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(op(BinaryOp::Add, Value::Int(2), Value::Int(3)), Ok(Value::Int(5)));
        assert_eq!(op(BinaryOp::Sub, Value::Int(2), Value::Int(3)), Ok(Value::Int(-1)));
        assert_eq!(op(BinaryOp::Mul, Value::Int(-4), Value::Int(3)), Ok(Value::Int(-12)));
    }

    #[test]
    fn test_division_rounds_to_nearest() {
        assert_eq!(div_round_half_up(6, 3), 2);
        assert_eq!(div_round_half_up(7, 2), 4);
        assert_eq!(div_round_half_up(-7, 2), -3);
        assert_eq!(div_round_half_up(5, 3), 2);
        assert_eq!(div_round_half_up(4, 3), 1);
        assert_eq!(div_round_half_up(7, -2), -3);
        assert_eq!(div_round_half_up(-4, -3), 1);
    }

    #[test]
    fn test_modulo_sign_follows_divisor() {
        assert_eq!(mod_floor(7, 3), 1);
        assert_eq!(mod_floor(-7, 3), 2);
        assert_eq!(mod_floor(7, -3), -2);
        assert_eq!(mod_floor(i64::MIN, -1), 0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(op(BinaryOp::Div, Value::Int(1), Value::Int(0)), Err(ErrorKind::DivisionByZero));
        assert_eq!(op(BinaryOp::Mod, Value::Int(1), Value::Int(0)), Err(ErrorKind::ModuloByZero));
        assert_eq!(ErrorKind::DivisionByZero.category(), ErrorCategory::Arithmetic);
    }

    #[test]
    fn test_overflow() {
        let err = op(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1)).unwrap_err();
        assert_eq!(err, ErrorKind::IntegerOverflow("+".to_string()));
        let err = op(BinaryOp::Div, Value::Int(i64::MIN), Value::Int(-1)).unwrap_err();
        assert_eq!(err, ErrorKind::IntegerOverflow("/".to_string()));
    }

    #[test]
    fn test_kind_mismatch() {
        for (o, a, b) in [
            (BinaryOp::Add, Value::Int(3), Value::Bool(true)),
            (BinaryOp::And, Value::Int(1), Value::Int(2)),
            (BinaryOp::Lt, Value::Str("a".into()), Value::Int(1)),
            (BinaryOp::Add, Value::Bool(true), Value::Bool(false)),
            (BinaryOp::Add, Value::Str("a".into()), Value::Str("b".into())),
            (BinaryOp::Eq, Value::Null, Value::Int(0)),
            (BinaryOp::Lt, Value::Null, Value::Null),
            (BinaryOp::Eq, Value::Void, Value::Void),
        ] {
            let err = op(o, a, b).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Type, "{:?}", err);
        }
    }

    #[test]
    fn test_equality() {
        assert_eq!(op(BinaryOp::Eq, Value::Null, Value::Null), Ok(Value::Bool(true)));
        assert_eq!(op(BinaryOp::Ne, Value::Null, Value::Null), Ok(Value::Bool(false)));
        assert_eq!(
            op(BinaryOp::Eq, Value::Object(Handle(1)), Value::Null),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            op(BinaryOp::Eq, Value::Object(Handle(1)), Value::Object(Handle(1))),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            op(BinaryOp::Eq, Value::Str("x".into()), Value::Str("x".into())),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            op(BinaryOp::Ne, Value::Bool(true), Value::Bool(false)),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn test_logical() {
        assert_eq!(op(BinaryOp::And, Value::Bool(true), Value::Bool(false)), Ok(Value::Bool(false)));
        assert_eq!(op(BinaryOp::Or, Value::Bool(true), Value::Bool(false)), Ok(Value::Bool(true)));
    }
}
