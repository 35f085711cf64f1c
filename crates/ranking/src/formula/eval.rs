use setup_types::Tolerance;

use crate::error::EvaluationError;
use crate::feature_set::FeatureSource;
use crate::value::{Value, ValueKind};

use super::ast::{BinaryOp, Builtin, Expr, UnaryOp};

/// Tree-walking evaluator over one candidate.
pub struct Evaluator<'s, T, S: FeatureSource<T> + ?Sized> {
    source: &'s S,
    candidate: &'s T,
    tolerance: Tolerance,
}

impl<'s, T, S: FeatureSource<T> + ?Sized> Evaluator<'s, T, S> {
    pub fn new(source: &'s S, candidate: &'s T, tolerance: Tolerance) -> Self {
        Self {
            source,
            candidate,
            tolerance,
        }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, EvaluationError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Feature { slot, .. } => Ok(self.source.value(*slot, self.candidate)),
            Expr::Unary { op, operand } => {
                let v = self.eval(operand)?;
                match op {
                    UnaryOp::Neg => Ok(Value::Number(-number(&v, "-")?)),
                    UnaryOp::Not => Ok(Value::Boolean(!boolean(&v, "!")?)),
                }
            }
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if boolean(&self.eval(condition)?, "?:")? {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call { function, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(number(&self.eval(arg)?, function.name())?);
                }
                Ok(Value::Number(call(*function, &values)))
            }
        }
    }

    fn binary(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, EvaluationError> {
        let symbol = op.symbol();
        let tol = self.tolerance;
        match op {
            BinaryOp::And => {
                if !boolean(&self.eval(lhs)?, symbol)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(boolean(&self.eval(rhs)?, symbol)?))
            }
            BinaryOp::Or => {
                if boolean(&self.eval(lhs)?, symbol)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(boolean(&self.eval(rhs)?, symbol)?))
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                let equal = self.values_equal(&self.eval(lhs)?, &self.eval(rhs)?, symbol)?;
                Ok(Value::Boolean(equal == (op == BinaryOp::Eq)))
            }
            BinaryOp::Add => self.numeric(lhs, rhs, symbol, |a, b| Value::Number(a + b)),
            BinaryOp::Sub => self.numeric(lhs, rhs, symbol, |a, b| Value::Number(a - b)),
            BinaryOp::Mul => self.numeric(lhs, rhs, symbol, |a, b| Value::Number(a * b)),
            BinaryOp::Div => self.numeric(lhs, rhs, symbol, |a, b| Value::Number(a / b)),
            BinaryOp::Rem => self.numeric(lhs, rhs, symbol, |a, b| Value::Number(a % b)),
            BinaryOp::Pow => self.numeric(lhs, rhs, symbol, |a, b| Value::Number(a.powf(b))),
            BinaryOp::Lt => self.numeric(lhs, rhs, symbol, |a, b| {
                Value::Boolean(a < b && !tol.eq(a, b))
            }),
            BinaryOp::Le => self.numeric(lhs, rhs, symbol, |a, b| {
                Value::Boolean(a <= b || tol.eq(a, b))
            }),
            BinaryOp::Gt => self.numeric(lhs, rhs, symbol, |a, b| {
                Value::Boolean(a > b && !tol.eq(a, b))
            }),
            BinaryOp::Ge => self.numeric(lhs, rhs, symbol, |a, b| {
                Value::Boolean(a >= b || tol.eq(a, b))
            }),
        }
    }

    fn numeric(
        &self,
        lhs: &Expr,
        rhs: &Expr,
        op: &str,
        apply: impl FnOnce(f64, f64) -> Value,
    ) -> Result<Value, EvaluationError> {
        let a = number(&self.eval(lhs)?, op)?;
        let b = number(&self.eval(rhs)?, op)?;
        Ok(apply(a, b))
    }

    fn values_equal(&self, a: &Value, b: &Value, op: &str) -> Result<bool, EvaluationError> {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => Ok(self.tolerance.eq(*x, *y)),
            (Value::Boolean(x), Value::Boolean(y)) => Ok(x == y),
            (Value::Text(x), Value::Text(y)) => Ok(x == y),
            _ => Err(EvaluationError::TypeMismatch {
                op: op.to_string(),
                expected: a.kind(),
                found: b.kind(),
            }),
        }
    }
}

fn number(v: &Value, op: &str) -> Result<f64, EvaluationError> {
    v.as_number().ok_or_else(|| EvaluationError::TypeMismatch {
        op: op.to_string(),
        expected: ValueKind::Number,
        found: v.kind(),
    })
}

fn boolean(v: &Value, op: &str) -> Result<bool, EvaluationError> {
    v.as_bool().ok_or_else(|| EvaluationError::TypeMismatch {
        op: op.to_string(),
        expected: ValueKind::Boolean,
        found: v.kind(),
    })
}

/// Apply a builtin to arguments whose count was checked at compile time.
fn call(function: Builtin, args: &[f64]) -> f64 {
    match function {
        Builtin::Abs => args[0].abs(),
        Builtin::Sqrt => args[0].sqrt(),
        Builtin::Exp => args[0].exp(),
        Builtin::Ln => args[0].ln(),
        Builtin::Log10 => args[0].log10(),
        Builtin::Floor => args[0].floor(),
        Builtin::Ceil => args[0].ceil(),
        Builtin::Round => args[0].round(),
        Builtin::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
        Builtin::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Builtin::Pow => args[0].powf(args[1]),
        Builtin::Clamp => args[0].max(args[1]).min(args[2]),
    }
}
