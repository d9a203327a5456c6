use crate::data::diagnostic::DiagnosticError;

#[must_use]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompileError {
    /// Checking was aborted, the cause has been reported to the [crate::data::diagnostic::Diagnostics].
    Diagnostic(DiagnosticError),
}

pub type CompileResult<T> = Result<T, CompileError>;

impl From<DiagnosticError> for CompileError {
    fn from(value: DiagnosticError) -> Self {
        CompileError::Diagnostic(value)
    }
}
