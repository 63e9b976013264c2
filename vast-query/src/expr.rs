// SPDX-License-Identifier: AGPL-3.0-or-later
// VAST - Distributed Network Forensics and Security Analytics
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Constant folding
//!
//! Clause right-hand sides are arithmetic trees over literal values with
//! no variables, so they fold completely at compile time. Folding is
//! total over the value lattice: unsupported operator/type pairs,
//! overflow, and division by zero all surface as validation errors,
//! never as panics.

use vast_core::{Duration, Result, Value, VastError};

use crate::ast::{BinaryExprOp, Expr, UnaryExprOp};

/// Folds an expression tree to a single value.
pub fn fold(expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Unary { op, operand } => fold_unary(*op, fold(operand)?),
        Expr::Binary { op, lhs, rhs } => fold_binary(*op, fold(lhs)?, fold(rhs)?),
    }
}

fn fold_unary(op: UnaryExprOp, v: Value) -> Result<Value> {
    let result = match (op, v) {
        // An explicit sign turns an unsigned literal into an int.
        (UnaryExprOp::Plus, Value::UInt(u)) => Value::Int(as_int(u)?),
        (UnaryExprOp::Plus, v @ (Value::Int(_) | Value::Double(_) | Value::Duration(_))) => v,
        (UnaryExprOp::Minus, Value::UInt(u)) => Value::Int(
            as_int(u)?
                .checked_neg()
                .ok_or_else(|| overflow("negation"))?,
        ),
        (UnaryExprOp::Minus, Value::Int(i)) => {
            Value::Int(i.checked_neg().ok_or_else(|| overflow("negation"))?)
        }
        (UnaryExprOp::Minus, Value::Double(d)) => Value::Double(-d),
        (UnaryExprOp::Minus, Value::Duration(d)) => Value::Duration(Duration::from_nanos(
            d.as_nanos()
                .checked_neg()
                .ok_or_else(|| overflow("negation"))?,
        )),
        (UnaryExprOp::BitNot, Value::UInt(u)) => Value::UInt(!u),
        (UnaryExprOp::BitNot, Value::Int(i)) => Value::Int(!i),
        (UnaryExprOp::BitNot, Value::Bool(b)) => Value::Bool(!b),
        (op, v) => {
            return Err(VastError::validation(format!(
                "unary {:?} not defined on {}",
                op,
                v.kind()
            )))
        }
    };
    Ok(result)
}

fn fold_binary(op: BinaryExprOp, lhs: Value, rhs: Value) -> Result<Value> {
    use BinaryExprOp::*;
    let result = match (op, &lhs, &rhs) {
        // Bitwise operators stay within one integral type.
        (BitAnd, Value::UInt(a), Value::UInt(b)) => Value::UInt(a & b),
        (BitOr, Value::UInt(a), Value::UInt(b)) => Value::UInt(a | b),
        (BitXor, Value::UInt(a), Value::UInt(b)) => Value::UInt(a ^ b),
        (BitAnd, Value::Int(a), Value::Int(b)) => Value::Int(a & b),
        (BitOr, Value::Int(a), Value::Int(b)) => Value::Int(a | b),
        (BitXor, Value::Int(a), Value::Int(b)) => Value::Int(a ^ b),
        (BitAnd, Value::Bool(a), Value::Bool(b)) => Value::Bool(a & b),
        (BitOr, Value::Bool(a), Value::Bool(b)) => Value::Bool(a | b),
        (BitXor, Value::Bool(a), Value::Bool(b)) => Value::Bool(a ^ b),

        // Duration and time arithmetic.
        (Add, Value::Duration(a), Value::Duration(b)) => duration(checked(
            a.as_nanos().checked_add(b.as_nanos()),
            "duration addition",
        )?),
        (Sub, Value::Duration(a), Value::Duration(b)) => duration(checked(
            a.as_nanos().checked_sub(b.as_nanos()),
            "duration subtraction",
        )?),
        (Mul, Value::Duration(a), Value::Int(b)) | (Mul, Value::Int(b), Value::Duration(a)) => {
            duration(checked(a.as_nanos().checked_mul(*b), "duration scaling")?)
        }
        (Mul, Value::Duration(a), Value::UInt(b)) | (Mul, Value::UInt(b), Value::Duration(a)) => {
            duration(checked(
                a.as_nanos().checked_mul(as_int(*b)?),
                "duration scaling",
            )?)
        }
        (Mul, Value::Duration(a), Value::Double(b))
        | (Mul, Value::Double(b), Value::Duration(a)) => {
            duration((a.as_nanos() as f64 * b) as i64)
        }
        (Div, Value::Duration(a), Value::Duration(b)) => {
            if b.as_nanos() == 0 {
                return Err(div_by_zero());
            }
            Value::Double(a.as_nanos() as f64 / b.as_nanos() as f64)
        }
        (Div, Value::Duration(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(div_by_zero());
            }
            duration(checked(a.as_nanos().checked_div(*b), "duration division")?)
        }
        (Div, Value::Duration(a), Value::UInt(b)) => {
            if *b == 0 {
                return Err(div_by_zero());
            }
            duration(a.as_nanos() / as_int(*b)?)
        }
        (Div, Value::Duration(a), Value::Double(b)) => duration((a.as_nanos() as f64 / b) as i64),
        (Add, Value::Time(t), Value::Duration(d)) | (Add, Value::Duration(d), Value::Time(t)) => {
            Value::Time(*t + *d)
        }
        (Sub, Value::Time(t), Value::Duration(d)) => Value::Time(*t - *d),
        (Sub, Value::Time(a), Value::Time(b)) => Value::Duration(*a - *b),

        // Numeric arithmetic with the usual promotions.
        (op, lhs, rhs) if numeric(lhs) && numeric(rhs) => fold_numeric(op, lhs, rhs)?,

        (op, lhs, rhs) => {
            return Err(VastError::validation(format!(
                "operator {:?} not defined on ({}, {})",
                op,
                lhs.kind(),
                rhs.kind()
            )))
        }
    };
    Ok(result)
}

fn fold_numeric(op: BinaryExprOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    use BinaryExprOp::*;
    // Promote: any double operand makes the result double; any int makes
    // it int; otherwise both are uint.
    if matches!(lhs, Value::Double(_)) || matches!(rhs, Value::Double(_)) {
        let a = as_f64(lhs);
        let b = as_f64(rhs);
        let r = match op {
            Add => a + b,
            Sub => a - b,
            Mul => a * b,
            Div => {
                if b == 0.0 {
                    return Err(div_by_zero());
                }
                a / b
            }
            Mod => {
                if b == 0.0 {
                    return Err(div_by_zero());
                }
                a % b
            }
            _ => {
                return Err(VastError::validation(format!(
                    "operator {:?} not defined on doubles",
                    op
                )))
            }
        };
        return Ok(Value::Double(r));
    }
    if matches!(lhs, Value::Int(_)) || matches!(rhs, Value::Int(_)) {
        let a = to_int(lhs)?;
        let b = to_int(rhs)?;
        let r = match op {
            Add => checked(a.checked_add(b), "addition")?,
            Sub => checked(a.checked_sub(b), "subtraction")?,
            Mul => checked(a.checked_mul(b), "multiplication")?,
            Div => {
                if b == 0 {
                    return Err(div_by_zero());
                }
                checked(a.checked_div(b), "division")?
            }
            Mod => {
                if b == 0 {
                    return Err(div_by_zero());
                }
                checked(a.checked_rem(b), "remainder")?
            }
            _ => {
                return Err(VastError::validation(format!(
                    "operator {:?} requires operands of one integral type",
                    op
                )))
            }
        };
        return Ok(Value::Int(r));
    }
    let (Value::UInt(a), Value::UInt(b)) = (lhs, rhs) else {
        unreachable!("numeric() admits only int, uint, double");
    };
    let r = match op {
        Add => checked(a.checked_add(*b), "addition")?,
        Sub => checked(a.checked_sub(*b), "subtraction")?,
        Mul => checked(a.checked_mul(*b), "multiplication")?,
        Div => {
            if *b == 0 {
                return Err(div_by_zero());
            }
            a / b
        }
        Mod => {
            if *b == 0 {
                return Err(div_by_zero());
            }
            a % b
        }
        _ => {
            return Err(VastError::validation(format!(
                "operator {:?} requires operands of one integral type",
                op
            )))
        }
    };
    Ok(Value::UInt(r))
}

fn numeric(v: &Value) -> bool {
    matches!(v, Value::Int(_) | Value::UInt(_) | Value::Double(_))
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(i) => *i as f64,
        Value::UInt(u) => *u as f64,
        Value::Double(d) => *d,
        _ => unreachable!(),
    }
}

fn to_int(v: &Value) -> Result<i64> {
    match v {
        Value::Int(i) => Ok(*i),
        Value::UInt(u) => as_int(*u),
        _ => unreachable!(),
    }
}

fn as_int(u: u64) -> Result<i64> {
    i64::try_from(u).map_err(|_| overflow("int conversion"))
}

fn duration(ns: i64) -> Value {
    Value::Duration(Duration::from_nanos(ns))
}

fn checked<T>(v: Option<T>, what: &str) -> Result<T> {
    v.ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> VastError {
    VastError::validation(format!("arithmetic overflow in {}", what))
}

fn div_by_zero() -> VastError {
    VastError::validation("division by zero")
}
