use crate::front::constraints::ConstraintStore;
use crate::front::static_expr::StaticSubstitution;
use crate::new_index_type;
use crate::syntax::ast::{DeclaredType, StaticExpr};
use crate::util::arena::{Arena, IndexType};
use itertools::zip_eq;
use netlang_util::swrite::swrite_separated;
use std::fmt::{Display, Formatter};

new_index_type!(pub TypeVar);

/// The type of a circuit-level value.
///
/// Variables are indices into a [TypeStore], so cloning a `Ty` never copies the variable cell itself,
/// all clones keep referring to the same cell and see its binding.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Ty {
    Unit,
    Bit,
    BitArray(StaticExpr),
    Product(Vec<Ty>),
    Var(TypeVar),
}

#[derive(Debug, Clone)]
enum TypeCell {
    Unbound,
    /// Never rebound once set.
    Link(Ty),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UnifyError {
    Mismatch,
    ResultArity { found: usize, expected: usize },
}

pub struct TypeStore {
    cells: Arena<TypeVar, TypeCell>,
}

impl TypeStore {
    pub fn new() -> Self {
        TypeStore {
            cells: Arena::default(),
        }
    }

    pub fn fresh(&mut self) -> Ty {
        Ty::Var(self.cells.push(TypeCell::Unbound))
    }

    pub fn var_count(&self) -> usize {
        self.cells.len()
    }

    /// Follow variable links to the final type, compressing the chain on the way back.
    /// The result is either a concrete type or an unbound variable.
    pub fn representative(&mut self, ty: &Ty) -> Ty {
        let var = match *ty {
            Ty::Var(var) => var,
            Ty::Unit | Ty::Bit | Ty::BitArray(_) | Ty::Product(_) => return ty.clone(),
        };

        match &self.cells[var] {
            TypeCell::Unbound => ty.clone(),
            TypeCell::Link(next) => {
                let next = next.clone();
                let repr = self.representative(&next);
                if repr != next {
                    self.cells[var] = TypeCell::Link(repr.clone());
                }
                repr
            }
        }
    }

    /// Deep version of [Self::representative], also resolving the members of products.
    pub fn resolve(&mut self, ty: &Ty) -> Ty {
        match self.representative(ty) {
            Ty::Product(tys) => Ty::Product(tys.iter().map(|ty| self.resolve(ty)).collect()),
            repr => repr,
        }
    }

    /// Check whether `var` occurs in `ty`.
    /// Widths are opaque static expressions, they can't contain type variables.
    fn occurs(&mut self, var: TypeVar, ty: &Ty) -> bool {
        match self.representative(ty) {
            Ty::Var(other) => other == var,
            Ty::Product(tys) => tys.iter().any(|ty| self.occurs(var, ty)),
            Ty::Unit | Ty::Bit | Ty::BitArray(_) => false,
        }
    }

    fn bind(&mut self, var: TypeVar, ty: Ty) -> Result<(), UnifyError> {
        if self.occurs(var, &ty) {
            return Err(UnifyError::Mismatch);
        }
        assert!(
            matches!(self.cells[var], TypeCell::Unbound),
            "variable {:?} was bound twice",
            var
        );
        self.cells[var] = TypeCell::Link(ty);
        Ok(())
    }

    /// Unify two types, binding variables where necessary.
    ///
    /// Width equalities can't be decided yet, they are deferred as constraints into `constraints`.
    /// For that reason a single bit is also accepted where an array of width 1 is expected, and vice versa.
    pub fn unify(&mut self, constraints: &mut ConstraintStore, found: &Ty, expected: &Ty) -> Result<(), UnifyError> {
        let found = self.representative(found);
        let expected = self.representative(expected);

        match (&found, &expected) {
            (Ty::Var(a), Ty::Var(b)) if a == b => Ok(()),
            (Ty::Unit, Ty::Unit) | (Ty::Bit, Ty::Bit) => Ok(()),
            (Ty::Bit, Ty::BitArray(width)) | (Ty::BitArray(width), Ty::Bit) => {
                constraints.emit_equal(width.clone(), StaticExpr::int(1));
                Ok(())
            }
            (Ty::BitArray(found_width), Ty::BitArray(expected_width)) => {
                constraints.emit_equal(found_width.clone(), expected_width.clone());
                Ok(())
            }
            (Ty::Product(found_tys), Ty::Product(expected_tys)) => {
                if found_tys.len() != expected_tys.len() {
                    return Err(UnifyError::ResultArity {
                        found: found_tys.len(),
                        expected: expected_tys.len(),
                    });
                }
                for (found_ty, expected_ty) in zip_eq(found_tys, expected_tys) {
                    self.unify(constraints, found_ty, expected_ty)?;
                }
                Ok(())
            }
            // two distinct unbound variables are linked, not rejected
            (_, &Ty::Var(var)) => self.bind(var, found.clone()),
            (&Ty::Var(var), _) => self.bind(var, expected.clone()),
            (
                Ty::Unit | Ty::Bit | Ty::BitArray(_) | Ty::Product(_),
                Ty::Unit | Ty::Bit | Ty::BitArray(_) | Ty::Product(_),
            ) => Err(UnifyError::Mismatch),
        }
    }

    /// Resolve `ty` and substitute static variables in all of its widths.
    /// Unbound variables are kept as they are.
    pub fn substitute_widths(&mut self, ty: &Ty, subst: &StaticSubstitution) -> Ty {
        self.resolve(ty).substitute_widths(subst)
    }
}

impl Ty {
    /// Structural width substitution, variables are not followed.
    pub fn substitute_widths(&self, subst: &StaticSubstitution) -> Ty {
        match self {
            Ty::Unit => Ty::Unit,
            Ty::Bit => Ty::Bit,
            Ty::BitArray(width) => Ty::BitArray(width.substitute(subst).simplify()),
            Ty::Product(tys) => Ty::Product(tys.iter().map(|ty| ty.substitute_widths(subst)).collect()),
            &Ty::Var(var) => Ty::Var(var),
        }
    }

    /// Collapse a list of output types into a single type, a single output is not wrapped into a product.
    pub fn from_outputs(mut tys: Vec<Ty>) -> Ty {
        if tys.len() == 1 {
            tys.remove(0)
        } else {
            Ty::Product(tys)
        }
    }
}

impl From<&DeclaredType> for Ty {
    fn from(ty: &DeclaredType) -> Self {
        match ty {
            DeclaredType::Bit => Ty::Bit,
            DeclaredType::BitArray(width) => Ty::BitArray(width.clone()),
        }
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Unit => write!(f, "()"),
            Ty::Bit => write!(f, "bit"),
            Ty::BitArray(width) => write!(f, "bit[{}]", width),
            Ty::Product(tys) => {
                let mut s = String::from("(");
                swrite_separated(&mut s, ", ", tys);
                s.push(')');
                write!(f, "{}", s)
            }
            Ty::Var(var) => write!(f, "'t{}", var.inner().index()),
        }
    }
}
