//! Native implementations of foldable builtins.
//!
//! Integer arithmetic stays integral and is checked; any float operand
//! makes the operation a float one. Arguments of the wrong shape decline
//! with `Ok(None)`.

use std::cmp::Ordering;
use std::fmt;

use col_ir::{ConstValue, Number};

type NativeResult = Result<Option<ConstValue>, ArithmeticError>;

/// Division by zero, overflow, or a degenerate power base.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ArithmeticError;

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("arithmetic error")
    }
}

fn numbers(args: &[ConstValue]) -> Option<(Number, Number)> {
    match args {
        [ConstValue::Number(a), ConstValue::Number(b)] => Some((*a, *b)),
        _ => None,
    }
}

fn bools(args: &[ConstValue]) -> Option<(bool, bool)> {
    match args {
        [ConstValue::Bool(a), ConstValue::Bool(b)] => Some((*a, *b)),
        _ => None,
    }
}

fn arithmetic(
    args: &[ConstValue],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> NativeResult {
    let Some((a, b)) = numbers(args) else {
        return Ok(None);
    };
    let result = match (a, b) {
        (Number::Int(a), Number::Int(b)) => Number::Int(int_op(a, b).ok_or(ArithmeticError)?),
        (a, b) => {
            let value = float_op(a.as_f64(), b.as_f64());
            if !value.is_finite() {
                return Err(ArithmeticError);
            }
            Number::Float(value)
        }
    };
    Ok(Some(ConstValue::Number(result)))
}

pub(super) fn add(args: &[ConstValue]) -> NativeResult {
    if let [ConstValue::Str(a), ConstValue::Str(b)] = args {
        return Ok(Some(ConstValue::Str(format!("{a}{b}"))));
    }
    arithmetic(args, i64::checked_add, |a, b| a + b)
}

pub(super) fn sub(args: &[ConstValue]) -> NativeResult {
    arithmetic(args, i64::checked_sub, |a, b| a - b)
}

pub(super) fn mul(args: &[ConstValue]) -> NativeResult {
    arithmetic(args, i64::checked_mul, |a, b| a * b)
}

/// Floor division, as integer division rounds toward negative infinity.
pub(super) fn div(args: &[ConstValue]) -> NativeResult {
    arithmetic(args, floor_div, |a, b| (a / b).floor())
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

pub(super) fn neg(args: &[ConstValue]) -> NativeResult {
    let value = match args {
        [ConstValue::Number(Number::Int(v))] => Number::Int(v.checked_neg().ok_or(ArithmeticError)?),
        [ConstValue::Number(Number::Float(v))] => Number::Float(-v),
        _ => return Ok(None),
    };
    Ok(Some(ConstValue::Number(value)))
}

fn equal(args: &[ConstValue]) -> Option<bool> {
    match args {
        [ConstValue::Number(a), ConstValue::Number(b)] => Some(a.numeric_eq(*b)),
        [a, b] => Some(a == b),
        _ => None,
    }
}

pub(super) fn eql(args: &[ConstValue]) -> NativeResult {
    Ok(equal(args).map(ConstValue::Bool))
}

pub(super) fn neq(args: &[ConstValue]) -> NativeResult {
    Ok(equal(args).map(|eq| ConstValue::Bool(!eq)))
}

fn compare(args: &[ConstValue], accept: fn(Ordering) -> bool) -> NativeResult {
    let Some((a, b)) = numbers(args) else {
        return Ok(None);
    };
    let ordering = match (a, b) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
    };
    Ok(Some(ConstValue::Bool(ordering.is_some_and(accept))))
}

pub(super) fn les(args: &[ConstValue]) -> NativeResult {
    compare(args, Ordering::is_lt)
}

pub(super) fn leq(args: &[ConstValue]) -> NativeResult {
    compare(args, Ordering::is_le)
}

pub(super) fn gre(args: &[ConstValue]) -> NativeResult {
    compare(args, Ordering::is_gt)
}

pub(super) fn geq(args: &[ConstValue]) -> NativeResult {
    compare(args, Ordering::is_ge)
}

/// `a *= b`: `a` is a multiple of `b`.
pub(super) fn multiple_of(args: &[ConstValue]) -> NativeResult {
    let Some((a, b)) = numbers(args) else {
        return Ok(None);
    };
    let result = match (a, b) {
        (Number::Int(_), Number::Int(0)) => return Err(ArithmeticError),
        (Number::Int(a), Number::Int(b)) => a.checked_rem(b).ok_or(ArithmeticError)? == 0,
        (a, b) => {
            let b = b.as_f64();
            if b == 0.0 {
                return Err(ArithmeticError);
            }
            a.as_f64() % b == 0.0
        }
    };
    Ok(Some(ConstValue::Bool(result)))
}

/// `a **= b`: `a` is an integral power of `b`.
///
/// Only integers fold. A base below two never terminates the division
/// loop and is an error.
pub(super) fn power_of(args: &[ConstValue]) -> NativeResult {
    let Some((a, b)) = numbers(args) else {
        return Ok(None);
    };
    let (Some(mut value), Some(base)) = (a.as_int(), b.as_int()) else {
        return Ok(None);
    };
    if base < 2 {
        return Err(ArithmeticError);
    }
    if value < 1 {
        return Ok(Some(ConstValue::Bool(false)));
    }
    while value % base == 0 {
        value /= base;
    }
    Ok(Some(ConstValue::Bool(value == 1)))
}

pub(super) fn and(args: &[ConstValue]) -> NativeResult {
    Ok(bools(args).map(|(a, b)| ConstValue::Bool(a && b)))
}

pub(super) fn or(args: &[ConstValue]) -> NativeResult {
    Ok(bools(args).map(|(a, b)| ConstValue::Bool(a || b)))
}

pub(super) fn not(args: &[ConstValue]) -> NativeResult {
    match args {
        [ConstValue::Bool(v)] => Ok(Some(ConstValue::Bool(!v))),
        _ => Ok(None),
    }
}
