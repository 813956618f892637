//! Error types for the core signal store.

use std::error::Error;
use std::fmt;

use crate::id::SignalId;

/// Errors from [`SignalStore`](crate::store::SignalStore) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// A write carried a unit that conflicts with the signal's declared unit.
    ///
    /// The declared unit is fixed by the first non-dimensionless write (or
    /// an explicit [`declare_unit`](crate::store::SignalStore::declare_unit))
    /// and every later write must match it.
    UnitMismatch {
        /// The signal whose contract was violated.
        signal: SignalId,
        /// The declared unit.
        expected: String,
        /// The unit the write carried.
        got: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitMismatch {
                signal,
                expected,
                got,
            } => write!(
                f,
                "unit mismatch for signal {signal}: expected '{expected}', got '{got}'"
            ),
        }
    }
}

impl Error for StoreError {}
