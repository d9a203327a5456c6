use crate::front::static_expr::StaticSubstitution;
use crate::syntax::ast::{StaticBinaryOp, StaticExpr};
use indexmap::IndexSet;
use log::{debug, trace};

/// Accumulates the static constraints emitted while checking the body of a single node.
///
/// All constraints are boolean static expressions, they are required conjunctively.
pub struct ConstraintStore {
    constraints: Vec<StaticExpr>,
    record_trivial_equalities: bool,
}

/// A constraint turned out to be false for every possible instantiation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConstraintFalse {
    /// The constraint as it was before the final substitution or simplification.
    pub constraint: StaticExpr,
}

impl ConstraintStore {
    pub fn new(record_trivial_equalities: bool) -> Self {
        ConstraintStore {
            constraints: vec![],
            record_trivial_equalities,
        }
    }

    pub fn emit(&mut self, constraint: StaticExpr) {
        trace!("emitting constraint {}", constraint);
        self.constraints.push(constraint);
    }

    pub fn emit_equal(&mut self, left: StaticExpr, right: StaticExpr) {
        if left == right && !self.record_trivial_equalities {
            return;
        }
        self.emit(StaticExpr::equal(left, right));
    }

    pub fn constraints(&self) -> &[StaticExpr] {
        &self.constraints
    }

    /// Take all constraints, leaving the store empty.
    pub fn drain(&mut self) -> Vec<StaticExpr> {
        std::mem::take(&mut self.constraints)
    }
}

/// Simplify a list of constraints by eliminating internal variables.
///
/// Any variable that is not in `params` is internal. Equalities of the form `v = e` or `e = v`
/// with `v` internal (and not occurring in `e`) are removed one at a time and substituted into all other constraints.
/// No other equation solving is attempted, `2 * n = 4` is kept as it is.
///
/// Constraints that simplify to `true` are dropped, a constraint that simplifies to `false` is an error.
pub fn solve(params: &IndexSet<String>, constraints: Vec<StaticExpr>) -> Result<Vec<StaticExpr>, ConstraintFalse> {
    let mut constraints = simplify_all(constraints, |c| c.simplify())?;

    while let Some((index, var, value)) = find_elimination(params, &constraints) {
        debug!("eliminating internal width variable {} := {}", var, value);
        constraints.remove(index);

        let mut subst = StaticSubstitution::new();
        subst.insert(var, value);
        constraints = simplify_all(constraints, |c| c.substitute(&subst).simplify())?;
    }

    Ok(constraints)
}

fn simplify_all(
    constraints: Vec<StaticExpr>,
    f: impl Fn(&StaticExpr) -> StaticExpr,
) -> Result<Vec<StaticExpr>, ConstraintFalse> {
    let mut result = vec![];
    for constraint in constraints {
        let simplified = f(&constraint);
        if simplified.is_literal_bool(false) {
            return Err(ConstraintFalse { constraint });
        }
        if !simplified.is_literal_bool(true) {
            result.push(simplified);
        }
    }
    Ok(result)
}

fn find_elimination(params: &IndexSet<String>, constraints: &[StaticExpr]) -> Option<(usize, String, StaticExpr)> {
    let eliminable = |var: &StaticExpr, value: &StaticExpr| match var {
        StaticExpr::Var(name) if !params.contains(name) && !value.contains_var(name) => {
            Some((name.clone(), value.clone()))
        }
        _ => None,
    };

    constraints.iter().enumerate().find_map(|(index, constraint)| {
        let StaticExpr::Binary(StaticBinaryOp::Eq, left, right) = constraint else {
            return None;
        };
        let (var, value) = eliminable(&**left, &**right).or_else(|| eliminable(&**right, &**left))?;
        Some((index, var, value))
    })
}
