//! This module contains some error and result definitions used in this crate.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Errors that can occur while building a CSP model for a puzzle. Every fault
/// in the puzzle input or in the construction of variables and constraints is
/// reported through this type, so callers can decide to abort or to retry
/// with a relaxed model. Note that propagation failures are *not* errors, see
/// [Propagation](crate::propagator::Propagation) for that.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModelError {

    /// Indicates that the grid size of a puzzle is invalid. This is the case
    /// if it is less than 1.
    InvalidSize,

    /// Indicates that a cage refers to a cell outside the grid, that is, the
    /// row or column is less than 1 or greater than the grid size.
    OutOfBounds,

    /// Indicates that a cage was created without any cells.
    EmptyCage,

    /// Indicates that a cage contains the same cell more than once.
    DuplicateCell,

    /// Indicates that an operator symbol other than `+`, `-`, `*`, `/`, or `?`
    /// was encountered. The offending symbol is wrapped.
    UnknownOperator(String),

    /// Indicates that a variable was added to a CSP which already contains a
    /// variable of the same name. The duplicated name is wrapped.
    DuplicateVariable(String),

    /// Indicates that a constraint scope refers to a variable which is not
    /// part of the CSP it is added to.
    UnknownVariable,

    /// Indicates that a satisfying tuple has a different length than the
    /// scope of its constraint.
    WrongTupleArity,

    /// Indicates that a satisfying tuple contains a value that is not in the
    /// full domain of the variable at the same scope position.
    ValueOutsideDomain,

    /// Indicates that a variable was created with an empty domain.
    EmptyDomain
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidSize => write!(f, "invalid grid size"),
            ModelError::OutOfBounds => write!(f, "cell out of bounds"),
            ModelError::EmptyCage => write!(f, "empty cage"),
            ModelError::DuplicateCell => write!(f, "duplicate cell in cage"),
            ModelError::UnknownOperator(symbol) =>
                write!(f, "unknown operator '{}'", symbol),
            ModelError::DuplicateVariable(name) =>
                write!(f, "duplicate variable '{}'", name),
            ModelError::UnknownVariable =>
                write!(f, "constraint refers to unknown variable"),
            ModelError::WrongTupleArity =>
                write!(f, "tuple arity does not match constraint scope"),
            ModelError::ValueOutsideDomain =>
                write!(f, "tuple value outside of variable domain"),
            ModelError::EmptyDomain => write!(f, "empty variable domain")
        }
    }
}

impl Error for ModelError { }

/// Syntactic sugar for `Result<V, ModelError>`.
pub type ModelResult<V> = Result<V, ModelError>;

/// Errors that can occur when a search driver assigns or unassigns variables
/// of a CSP in a way that violates its invariants.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SearchError {

    /// Indicates that a variable ID does not belong to the CSP in question.
    UnknownVariable,

    /// Indicates that a variable was assigned while it already held a value.
    AlreadyAssigned,

    /// Indicates that a variable was assigned a value which is not contained
    /// in its current domain.
    ValueNotInCurrentDomain
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::UnknownVariable => write!(f, "unknown variable"),
            SearchError::AlreadyAssigned =>
                write!(f, "variable is already assigned"),
            SearchError::ValueNotInCurrentDomain =>
                write!(f, "value is not in the current domain")
        }
    }
}

impl Error for SearchError { }

/// Syntactic sugar for `Result<V, SearchError>`.
pub type SearchResult<V> = Result<V, SearchError>;
