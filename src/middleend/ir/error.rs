use thiserror::Error;

pub type LowerResult<T> = Result<T, LowerError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LowerError {
    #[error("line {line}: undefined symbol '{name}'")]
    UndefinedSymbol { name: String, line: usize },

    #[error("line {line}: nested function definitions are not supported")]
    NestedFunctionDefinition { line: usize },

    #[error("line {line}: call to '{callee}' passes {found} argument(s), expected {expected}")]
    ArgCountMismatch {
        callee: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    #[error("line {line}: '{stmt}' outside of any loop")]
    BreakContinueOutsideLoop { stmt: &'static str, line: usize },

    #[error("line {line}: initializer of global '{name}' must be a constant expression")]
    NonConstGlobalInit { name: String, line: usize },

    #[error("line {line}: '{name}' is not an array or is indexed past its rank")]
    InvalidArrayAccess { name: String, line: usize },

    #[error("line {line}: array '{name}' has a non-positive dimension")]
    InvalidArrayDimension { name: String, line: usize },

    #[error("line {line}: assignment target is not assignable")]
    InvalidAssignTarget { line: usize },
}
