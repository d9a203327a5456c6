use crate::data::diagnostic::Diagnostics;
use crate::front::constraints::ConstraintStore;
use crate::front::error::{TypingError, TypingErrorKind, TypingResult};
use crate::front::registry::Registry;
use crate::front::static_expr::StaticType;
use crate::front::types::{Ty, TypeStore, UnifyError};
use crate::syntax::ast::StaticExpr;
use crate::syntax::pos::Span;

#[derive(Debug, Copy, Clone)]
pub struct TypingSettings {
    /// Also record width equalities between syntactically identical widths.
    /// They are always true, so they only add noise to the constraint set before solving.
    pub record_trivial_equalities: bool,

    /// Prefix for internally generated width variables.
    /// This must not be a valid identifier, otherwise it could clash with a static parameter.
    pub fresh_width_prefix: &'static str,
}

impl Default for TypingSettings {
    fn default() -> Self {
        TypingSettings {
            record_trivial_equalities: false,
            fresh_width_prefix: "$w",
        }
    }
}

/// State shared across the checking of all nodes of a single program.
///
/// Nodes must be checked one at a time and in declaration order:
/// the constraint store only ever holds the constraints of the node currently being checked,
/// and later nodes can only call nodes that are already in the registry.
pub struct CheckSession<'d> {
    pub diags: &'d Diagnostics,
    pub settings: TypingSettings,

    pub types: TypeStore,
    pub constraints: ConstraintStore,
    pub registry: Registry,

    next_width_index: u64,
}

impl<'d> CheckSession<'d> {
    pub fn new(diags: &'d Diagnostics, settings: TypingSettings) -> Self {
        CheckSession {
            diags,
            settings,
            types: TypeStore::new(),
            constraints: ConstraintStore::new(settings.record_trivial_equalities),
            registry: Registry::new(),
            next_width_index: 0,
        }
    }

    /// Create a new internal width variable, distinct from all static parameters.
    pub fn fresh_width(&mut self) -> StaticExpr {
        let index = self.next_width_index;
        self.next_width_index += 1;
        StaticExpr::Var(format!("{}{}", self.settings.fresh_width_prefix, index))
    }

    /// Unify `found` with `expected`, reporting a failure at `span`.
    pub fn unify_at(&mut self, span: Span, found: &Ty, expected: &Ty) -> TypingResult<()> {
        match self.types.unify(&mut self.constraints, found, expected) {
            Ok(()) => Ok(()),
            Err(UnifyError::Mismatch) => {
                let found = self.types.resolve(found);
                let expected = self.types.resolve(expected);
                Err(TypingError::new(span, TypingErrorKind::Type { found, expected }))
            }
            Err(UnifyError::ResultArity { found, expected }) => {
                Err(TypingError::new(span, TypingErrorKind::ResultArity { found, expected }))
            }
        }
    }

    pub fn expect_static(&self, span: Span, expr: &StaticExpr, expected: StaticType) -> TypingResult<()> {
        expr.expect_static_type(expected)
            .map_err(|mismatch| TypingError::static_type(span, mismatch))
    }
}
