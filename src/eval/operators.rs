//! Elementwise kernels. The operator is matched once per lane, never per
//! element, so every arm compiles to its own tight loop.

use super::lane::Lane;
use super::value::Value;
use crate::ast::{BinaryOp, Function, UnaryOp};
use crate::config::DivisionByZero;
use crate::error::EvalError;

pub fn unary(op: UnaryOp, value: Value) -> Value {
    match (op, value) {
        (UnaryOp::Plus, value) => value,
        (UnaryOp::Minus, Value::Int(lane)) => Value::Int(lane.map(u32::wrapping_neg)),
        (UnaryOp::Minus, Value::Float(lane)) => Value::Float(lane.map(|x| -x)),
    }
}

/// Apply a binary operator. Errors carry chunk-relative indices.
pub fn binary(
    op: BinaryOp,
    left: Value,
    right: Value,
    policy: DivisionByZero,
) -> Result<Value, EvalError> {
    if is_bitwise(op) {
        return Ok(Value::Int(int_binary(op, &left.into_uint(), &right.into_uint())));
    }
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            if is_division(op) && policy == DivisionByZero::Fail {
                check_divisor(op, b.position(|y| y == 0))?;
            }
            Ok(Value::Int(int_binary(op, &a, &b)))
        }
        (left, right) => {
            let a = left.into_float();
            let b = right.into_float();
            if is_division(op) && policy == DivisionByZero::Fail {
                check_divisor(op, b.position(|y| y == 0.0))?;
            }
            Ok(Value::Float(float_binary(op, &a, &b)))
        }
    }
}

fn is_bitwise(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr
    )
}

fn is_division(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Div | BinaryOp::Mod)
}

fn check_divisor(op: BinaryOp, zero_at: Option<usize>) -> Result<(), EvalError> {
    match zero_at {
        Some(index) => Err(EvalError::ArithmeticPolicyViolation {
            operator: op.symbol(),
            index,
        }),
        None => Ok(()),
    }
}

fn int_binary(op: BinaryOp, a: &Lane<u32>, b: &Lane<u32>) -> Lane<u32> {
    match op {
        BinaryOp::Add => a.zip_with(b, u32::wrapping_add),
        BinaryOp::Sub => a.zip_with(b, u32::wrapping_sub),
        BinaryOp::Mul => a.zip_with(b, u32::wrapping_mul),
        BinaryOp::Div => a.zip_with(b, |x, y| x.checked_div(y).unwrap_or(0)),
        BinaryOp::Mod => a.zip_with(b, |x, y| x.checked_rem(y).unwrap_or(0)),
        BinaryOp::Pow => a.zip_with(b, u32::wrapping_pow),
        BinaryOp::BitAnd => a.zip_with(b, |x, y| x & y),
        BinaryOp::BitOr => a.zip_with(b, |x, y| x | y),
        BinaryOp::BitXor => a.zip_with(b, |x, y| x ^ y),
        // Shift counts of 32 and up clear the word.
        BinaryOp::Shl => a.zip_with(b, |x, y| x.checked_shl(y).unwrap_or(0)),
        BinaryOp::Shr => a.zip_with(b, |x, y| x.checked_shr(y).unwrap_or(0)),
    }
}

fn float_binary(op: BinaryOp, a: &Lane<f64>, b: &Lane<f64>) -> Lane<f64> {
    match op {
        BinaryOp::Add => a.zip_with(b, |x, y| x + y),
        BinaryOp::Sub => a.zip_with(b, |x, y| x - y),
        BinaryOp::Mul => a.zip_with(b, |x, y| x * y),
        BinaryOp::Div => a.zip_with(b, |x, y| x / y),
        BinaryOp::Mod => a.zip_with(b, floor_mod),
        BinaryOp::Pow => a.zip_with(b, f64::powf),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
            unreachable!("bitwise operators run on the integer kernels")
        }
    }
}

/// Floored remainder: the result takes the sign of the divisor, so
/// `-1.5 % 2.0` is `0.5`. A zero divisor gives NaN.
fn floor_mod(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r == 0.0 {
        0.0f64.copysign(y)
    } else if (r < 0.0) != (y < 0.0) {
        r + y
    } else {
        r
    }
}

/// One-argument functions. `None` if `function` takes two.
pub fn call1(function: Function, value: Value) -> Option<Value> {
    let out = match function {
        Function::Sin => Value::Float(value.into_float().map(f64::sin)),
        Function::Cos => Value::Float(value.into_float().map(f64::cos)),
        Function::Tan => Value::Float(value.into_float().map(f64::tan)),
        Function::Exp => Value::Float(value.into_float().map(f64::exp)),
        Function::Sqrt => Value::Float(value.into_float().map(f64::sqrt)),
        Function::Log => Value::Float(value.into_float().map(f64::ln)),
        Function::Abs => match value {
            Value::Int(lane) => Value::Int(lane),
            Value::Float(lane) => Value::Float(lane.map(f64::abs)),
        },
        Function::Min | Function::Max => return None,
    };
    Some(out)
}

/// Two-argument functions. Integer pairs stay integer; otherwise NaN in
/// either argument propagates.
pub fn call2(function: Function, left: Value, right: Value) -> Option<Value> {
    let out = match (function, left, right) {
        (Function::Min, Value::Int(a), Value::Int(b)) => Value::Int(a.zip_with(&b, u32::min)),
        (Function::Max, Value::Int(a), Value::Int(b)) => Value::Int(a.zip_with(&b, u32::max)),
        (Function::Min, a, b) => Value::Float(a.into_float().zip_with(&b.into_float(), nan_min)),
        (Function::Max, a, b) => Value::Float(a.into_float().zip_with(&b.into_float(), nan_max)),
        _ => return None,
    };
    Some(out)
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn ints(xs: &[u32]) -> Value {
        Value::Int(Lane::Each(xs.to_vec()))
    }

    fn floats(xs: &[f64]) -> Value {
        Value::Float(Lane::Each(xs.to_vec()))
    }

    fn int(x: u32) -> Value {
        Value::Int(Lane::Splat(x))
    }

    fn float(x: f64) -> Value {
        Value::Float(Lane::Splat(x))
    }

    fn apply(op: BinaryOp, l: Value, r: Value) -> Value {
        binary(op, l, r, DivisionByZero::Zero).unwrap()
    }

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(apply(BinaryOp::Add, int(u32::MAX), int(2)), int(1));
        assert_eq!(apply(BinaryOp::Sub, int(0), int(1)), int(u32::MAX));
        assert_eq!(apply(BinaryOp::Mul, int(1 << 31), int(2)), int(0));
        assert_eq!(apply(BinaryOp::Pow, int(2), int(32)), int(0));
        assert_eq!(apply(BinaryOp::Pow, int(3), int(4)), int(81));
        assert_eq!(unary(UnaryOp::Minus, int(1)), int(u32::MAX));
    }

    #[test]
    fn integer_division_truncates() {
        assert_eq!(
            apply(BinaryOp::Div, ints(&[7, 8, 9]), int(2)),
            ints(&[3, 4, 4])
        );
        assert_eq!(apply(BinaryOp::Mod, ints(&[7, 8, 9]), int(4)), ints(&[3, 0, 1]));
    }

    #[test]
    fn zero_divisor_yields_zero_by_default() {
        assert_eq!(apply(BinaryOp::Div, ints(&[0, 5]), int(0)), ints(&[0, 0]));
        assert_eq!(apply(BinaryOp::Mod, int(5), ints(&[2, 0])), ints(&[1, 0]));
    }

    #[test]
    fn zero_divisor_fails_under_strict_policy() {
        let err = binary(BinaryOp::Div, int(1), ints(&[3, 2, 0, 0]), DivisionByZero::Fail).unwrap_err();
        assert_eq!(
            err,
            EvalError::ArithmeticPolicyViolation {
                operator: "/",
                index: 2
            }
        );
        let err = binary(BinaryOp::Mod, float(1.0), float(0.0), DivisionByZero::Fail).unwrap_err();
        assert_eq!(
            err,
            EvalError::ArithmeticPolicyViolation {
                operator: "%",
                index: 0
            }
        );
    }

    #[test]
    fn float_division_follows_ieee() {
        let Value::Float(Lane::Each(out)) = apply(BinaryOp::Div, floats(&[1.0, -1.0, 0.0]), float(0.0))
        else {
            panic!("expected float lane");
        };
        assert_eq!(out[0], f64::INFINITY);
        assert_eq!(out[1], f64::NEG_INFINITY);
        assert!(out[2].is_nan());
    }

    #[test]
    fn float_modulo_is_floored() {
        assert_eq!(
            apply(BinaryOp::Mod, floats(&[-1.5, 1.5, -4.0, 5.5]), float(2.0)),
            floats(&[0.5, 1.5, 0.0, 1.5])
        );
        assert_eq!(apply(BinaryOp::Mod, float(1.5), float(-2.0)), float(-0.5));
        assert_eq!(apply(BinaryOp::Mod, float(-1.5), float(-2.0)), float(-1.5));
        let Value::Float(Lane::Splat(x)) = apply(BinaryOp::Mod, float(1.0), float(0.0)) else {
            panic!("expected float splat");
        };
        assert!(x.is_nan());
    }

    #[test]
    fn mixed_operands_promote_to_float() {
        assert_eq!(apply(BinaryOp::Add, int(1), float(0.5)), float(1.5));
        assert_eq!(apply(BinaryOp::Div, ints(&[1, 3]), float(2.0)), floats(&[0.5, 1.5]));
    }

    #[test]
    fn shifts_past_word_width_clear() {
        assert_eq!(apply(BinaryOp::Shl, int(1), int(31)), int(1 << 31));
        assert_eq!(apply(BinaryOp::Shl, int(1), int(32)), int(0));
        assert_eq!(apply(BinaryOp::Shr, int(u32::MAX), int(40)), int(0));
    }

    #[test]
    fn bitwise_on_floats_truncates_to_u32() {
        assert_eq!(apply(BinaryOp::BitAnd, float(255.9), int(15)), int(15));
        assert_eq!(apply(BinaryOp::BitOr, float(-1.0), int(0)), int(u32::MAX));
        assert_eq!(apply(BinaryOp::Shr, float(f64::NAN), int(1)), int(0));
    }

    #[test]
    fn functions_produce_floats() {
        let Some(Value::Float(Lane::Splat(x))) = call1(Function::Sin, int(0)) else {
            panic!("expected float splat");
        };
        assert_approx_eq!(x, 0.0);
        let Some(Value::Float(Lane::Splat(x))) = call1(Function::Sqrt, int(16)) else {
            panic!("expected float splat");
        };
        assert_approx_eq!(x, 4.0);
        assert!(call1(Function::Min, int(1)).is_none());
    }

    #[test]
    fn abs_keeps_integers() {
        assert_eq!(call1(Function::Abs, int(5)), Some(int(5)));
        assert_eq!(call1(Function::Abs, float(-2.5)), Some(float(2.5)));
    }

    #[test]
    fn min_max() {
        assert_eq!(call2(Function::Min, ints(&[1, 9]), int(5)), Some(ints(&[1, 5])));
        assert_eq!(call2(Function::Max, ints(&[1, 9]), int(5)), Some(ints(&[5, 9])));
        assert_eq!(call2(Function::Max, int(1), float(0.5)), Some(float(1.0)));
        let Some(Value::Float(Lane::Splat(x))) = call2(Function::Min, float(f64::NAN), int(1)) else {
            panic!("expected float splat");
        };
        assert!(x.is_nan());
        assert!(call2(Function::Sin, int(1), int(2)).is_none());
    }
}
