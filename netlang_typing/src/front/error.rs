use crate::data::diagnostic::Diagnostic;
use crate::front::static_expr::{StaticType, StaticTypeMismatch};
use crate::front::types::Ty;
use crate::syntax::ast::{Identifier, StaticExpr};
use crate::syntax::pos::Span;
use annotate_snippets::Level;

/// Failure while checking a single node.
/// Converted into a [Diagnostic] once it reaches the node boundary.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TypingError {
    pub span: Span,
    pub kind: TypingErrorKind,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TypingErrorKind {
    ArgsArity { found: usize, expected: usize },
    ParamsArity { found: usize, expected: usize },
    ResultArity { found: usize, expected: usize },
    /// Both types are fully resolved.
    Type { found: Ty, expected: Ty },
    StaticType { found: StaticType, expected: StaticType },
    StaticConstraintFalse(StaticExpr),
    UnboundNode(String),
    UnboundVariable(String),
}

pub type TypingResult<T> = Result<T, TypingError>;

impl TypingError {
    pub fn new(span: Span, kind: TypingErrorKind) -> Self {
        TypingError { span, kind }
    }

    pub fn static_type(span: Span, mismatch: StaticTypeMismatch) -> Self {
        let StaticTypeMismatch { found, expected } = mismatch;
        TypingError::new(span, TypingErrorKind::StaticType { found, expected })
    }

    pub fn to_diagnostic(&self, node: &Identifier) -> Diagnostic {
        let (title, label) = match &self.kind {
            TypingErrorKind::ArgsArity { found, expected } => (
                "wrong number of arguments".to_string(),
                format!("found {found} arguments, expected {expected}"),
            ),
            TypingErrorKind::ParamsArity { found, expected } => (
                "wrong number of static parameters".to_string(),
                format!("found {found} static parameters, expected {expected}"),
            ),
            TypingErrorKind::ResultArity { found, expected } => (
                "wrong number of results".to_string(),
                format!("found {found} results, expected {expected}"),
            ),
            TypingErrorKind::Type { found, expected } => (
                "type mismatch".to_string(),
                format!("found type `{found}`, expected `{expected}`"),
            ),
            TypingErrorKind::StaticType { found, expected } => (
                "static type mismatch".to_string(),
                format!("found static type `{found}`, expected `{expected}`"),
            ),
            TypingErrorKind::StaticConstraintFalse(constraint) => (
                "static constraint is always false".to_string(),
                format!("constraint `{constraint}` can never hold"),
            ),
            TypingErrorKind::UnboundNode(name) => (
                format!("unbound node `{name}`"),
                "node not found".to_string(),
            ),
            TypingErrorKind::UnboundVariable(name) => (
                format!("unbound variable `{name}`"),
                "variable not found".to_string(),
            ),
        };

        let mut diag = Diagnostic::new(title).add_error(self.span, label);
        if self.span != node.span {
            diag = diag.add_info(node.span, format!("while checking node `{}`", node.string));
        }
        if let TypingErrorKind::StaticConstraintFalse(_) = self.kind {
            diag = diag.footer(
                Level::Help,
                "this node can not be instantiated with any static parameters",
            );
        }
        diag.finish()
    }
}
