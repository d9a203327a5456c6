use crate::syntax::ast::{StaticBinaryOp, StaticExpr};
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::Display)]
pub enum StaticType {
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "bool")]
    Bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StaticTypeMismatch {
    pub found: StaticType,
    pub expected: StaticType,
}

/// Mapping from static variable names to the expressions that should replace them.
pub type StaticSubstitution = IndexMap<String, StaticExpr>;

impl StaticBinaryOp {
    pub fn is_relational(self) -> bool {
        match self {
            StaticBinaryOp::Add
            | StaticBinaryOp::Sub
            | StaticBinaryOp::Mul
            | StaticBinaryOp::Div
            | StaticBinaryOp::Pow => false,
            StaticBinaryOp::Eq
            | StaticBinaryOp::Lt
            | StaticBinaryOp::Lte
            | StaticBinaryOp::Gt
            | StaticBinaryOp::Gte => true,
        }
    }
}

impl StaticExpr {
    /// Derive the static type of this expression.
    /// All operands of binary operators must be integers, static variables are always integers.
    pub fn static_type(&self) -> Result<StaticType, StaticTypeMismatch> {
        match self {
            StaticExpr::Int(_) | StaticExpr::Var(_) => Ok(StaticType::Int),
            StaticExpr::Bool(_) => Ok(StaticType::Bool),
            StaticExpr::Binary(op, left, right) => {
                left.expect_static_type(StaticType::Int)?;
                right.expect_static_type(StaticType::Int)?;
                if op.is_relational() {
                    Ok(StaticType::Bool)
                } else {
                    Ok(StaticType::Int)
                }
            }
        }
    }

    pub fn expect_static_type(&self, expected: StaticType) -> Result<(), StaticTypeMismatch> {
        let found = self.static_type()?;
        if found == expected {
            Ok(())
        } else {
            Err(StaticTypeMismatch { found, expected })
        }
    }

    /// Replace all variables that are in `subst`, without simplifying the result.
    pub fn substitute(&self, subst: &StaticSubstitution) -> StaticExpr {
        match self {
            StaticExpr::Int(_) | StaticExpr::Bool(_) => self.clone(),
            StaticExpr::Var(name) => subst.get(name).cloned().unwrap_or_else(|| self.clone()),
            StaticExpr::Binary(op, left, right) => {
                StaticExpr::binary(*op, left.substitute(subst), right.substitute(subst))
            }
        }
    }

    /// Constant folding, bottom-up.
    ///
    /// Operators over two literals are evaluated,
    /// except for division by zero, negative exponents and powers with a very large result.
    /// Comparisons between syntactically equal operands are folded too.
    pub fn simplify(&self) -> StaticExpr {
        let (op, left, right) = match self {
            StaticExpr::Int(_) | StaticExpr::Bool(_) | StaticExpr::Var(_) => return self.clone(),
            StaticExpr::Binary(op, left, right) => (*op, left.simplify(), right.simplify()),
        };

        if let (StaticExpr::Int(left), StaticExpr::Int(right)) = (&left, &right) {
            if let Some(folded) = fold_int_binary(op, left, right) {
                return folded;
            }
        }

        if left == right {
            match op {
                StaticBinaryOp::Eq | StaticBinaryOp::Lte | StaticBinaryOp::Gte => return StaticExpr::Bool(true),
                StaticBinaryOp::Lt | StaticBinaryOp::Gt => return StaticExpr::Bool(false),
                StaticBinaryOp::Add
                | StaticBinaryOp::Sub
                | StaticBinaryOp::Mul
                | StaticBinaryOp::Div
                | StaticBinaryOp::Pow => {}
            }
        }

        StaticExpr::binary(op, left, right)
    }

    pub fn contains_var(&self, name: &str) -> bool {
        match self {
            StaticExpr::Int(_) | StaticExpr::Bool(_) => false,
            StaticExpr::Var(var) => var == name,
            StaticExpr::Binary(_, left, right) => left.contains_var(name) || right.contains_var(name),
        }
    }

    /// Match the `var = expr` shape, with the variable on the left.
    pub fn as_var_equality(&self) -> Option<(&str, &StaticExpr)> {
        match self {
            StaticExpr::Binary(StaticBinaryOp::Eq, left, right) => match &**left {
                StaticExpr::Var(name) => Some((name.as_str(), &**right)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_literal_bool(&self, value: bool) -> bool {
        matches!(self, &StaticExpr::Bool(b) if b == value)
    }
}

/// Powers whose result could be larger than this are left unfolded.
const MAX_FOLDED_POW_BITS: u64 = 1 << 16;

fn fold_int_binary(op: StaticBinaryOp, left: &BigInt, right: &BigInt) -> Option<StaticExpr> {
    let result = match op {
        StaticBinaryOp::Add => StaticExpr::Int(left + right),
        StaticBinaryOp::Sub => StaticExpr::Int(left - right),
        StaticBinaryOp::Mul => StaticExpr::Int(left * right),
        StaticBinaryOp::Div => {
            if right.is_zero() {
                return None;
            }
            StaticExpr::Int(left / right)
        }
        StaticBinaryOp::Pow => {
            let exp = right.to_u32()?;
            // 0, 1 and -1 stay small for any exponent
            if left.bits() > 1 && left.bits().saturating_mul(u64::from(exp)) > MAX_FOLDED_POW_BITS {
                return None;
            }
            StaticExpr::Int(left.pow(exp))
        }
        StaticBinaryOp::Eq => StaticExpr::Bool(left == right),
        StaticBinaryOp::Lt => StaticExpr::Bool(left < right),
        StaticBinaryOp::Lte => StaticExpr::Bool(left <= right),
        StaticBinaryOp::Gt => StaticExpr::Bool(left > right),
        StaticBinaryOp::Gte => StaticExpr::Bool(left >= right),
    };
    Some(result)
}

impl Display for StaticExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StaticExpr::Int(value) => write!(f, "{}", value),
            StaticExpr::Bool(value) => write!(f, "{}", value),
            StaticExpr::Var(name) => write!(f, "{}", name),
            StaticExpr::Binary(op, left, right) => {
                write_operand(f, left)?;
                write!(f, " {} ", op)?;
                write_operand(f, right)
            }
        }
    }
}

fn write_operand(f: &mut Formatter<'_>, operand: &StaticExpr) -> std::fmt::Result {
    match operand {
        StaticExpr::Binary(_, _, _) => write!(f, "({})", operand),
        StaticExpr::Int(_) | StaticExpr::Bool(_) | StaticExpr::Var(_) => write!(f, "{}", operand),
    }
}
