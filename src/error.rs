//! Error types for the Concise compressed integer-set engine.
//!
//! A single enum covers every precondition violation the core can raise,
//! following the same `thiserror`-based convention the rest of this crate
//! uses throughout.

use thiserror::Error;

/// The error type for `ConciseSet` and `SubSet` operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetError {
    /// An element fell outside `[0, MAX_ALLOWED]` (or a requested rank
    /// exceeded `size()`).
    #[error("element or rank {0} is out of range [0, MAX_ALLOWED]")]
    OutOfRange(i64),

    /// `first()`/`last()`/`get()` were called on an empty set.
    #[error("operation not defined on an empty set")]
    Empty,

    /// A sub-view mutation targeted an element outside its `[from, to)`
    /// bound.
    #[error("element {value} is out of sub-view bounds [{from}, {to})")]
    OutOfBounds {
        /// The rejected element.
        value: i64,
        /// Inclusive lower bound of the view.
        from: i64,
        /// Exclusive upper bound of the view.
        to: i64,
    },

    /// An iterator detached from its set's lifetime observed a mutation
    /// after it was created.
    #[error("iterator invalidated by a concurrent modification")]
    ConcurrentModification,

    /// A set-algebra operation was attempted between incompatible
    /// integer-set backends.
    #[error("operation between incompatible set backends")]
    TypeMismatch,
}

/// A specialized `Result` type used throughout this crate.
pub type Result<T> = std::result::Result<T, SetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            SetError::OutOfRange(5).to_string(),
            "element or rank 5 is out of range [0, MAX_ALLOWED]"
        );
        assert_eq!(
            SetError::OutOfBounds { value: 3, from: 10, to: 20 }.to_string(),
            "element 3 is out of sub-view bounds [10, 20)"
        );
    }

    #[test]
    fn result_alias_compiles() {
        fn returns_result() -> Result<i32> {
            Ok(1)
        }
        assert_eq!(returns_result().unwrap(), 1);
    }
}
