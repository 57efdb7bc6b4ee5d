//! Error taxonomy shared by every configuration-manager operation.
//!
//! The same codes are used for synchronous return values and for the
//! per-entry outcomes carried in a [`ResponseBatch`](crate::types::ResponseBatch).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire code reported for a successful operation or entry.
pub const NO_ERROR: u32 = 0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpfError {
    #[error("unknown error")]
    Unknown,

    #[error("callback handle is not registered")]
    BadCallbackHandle,

    #[error("callback function is missing")]
    BadCallbackFunction,

    #[error("resource already exists")]
    ResourceExists,

    #[error("resource does not exist")]
    ResourceNonexistent,

    #[error("invalid attribute value")]
    InvalidAttribute,

    #[error("invalid VC address")]
    InvalidVcAddress,

    #[error("contained objects exist")]
    ContainedObjectsExist,

    #[error("feature not supported")]
    FeatureNotSupported,

    #[error("too many registered callbacks")]
    TooManyCallbacks,
}

impl NpfError {
    /// Stable numeric code for this error.
    pub const fn code(self) -> u32 {
        match self {
            NpfError::Unknown => 1,
            NpfError::BadCallbackHandle => 2,
            NpfError::BadCallbackFunction => 3,
            NpfError::ResourceExists => 4,
            NpfError::ResourceNonexistent => 5,
            NpfError::InvalidAttribute => 6,
            NpfError::InvalidVcAddress => 7,
            NpfError::ContainedObjectsExist => 8,
            NpfError::FeatureNotSupported => 9,
            NpfError::TooManyCallbacks => 10,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        const ALL: [NpfError; 10] = [
            NpfError::Unknown,
            NpfError::BadCallbackHandle,
            NpfError::BadCallbackFunction,
            NpfError::ResourceExists,
            NpfError::ResourceNonexistent,
            NpfError::InvalidAttribute,
            NpfError::InvalidVcAddress,
            NpfError::ContainedObjectsExist,
            NpfError::FeatureNotSupported,
            NpfError::TooManyCallbacks,
        ];
        ALL.into_iter().find(|e| e.code() == code)
    }
}

/// Collapses an operation outcome into its wire code.
pub fn result_code(result: &Result<(), NpfError>) -> u32 {
    match result {
        Ok(()) => NO_ERROR,
        Err(e) => e.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_round_trip() {
        let mut seen = std::collections::HashSet::new();
        for code in 1..=10 {
            let err = NpfError::from_code(code).expect("every code in range maps to an error");
            assert_eq!(err.code(), code);
            assert!(seen.insert(err));
        }
        assert_eq!(NpfError::from_code(NO_ERROR), None);
        assert_eq!(NpfError::from_code(11), None);
    }

    #[test]
    fn result_code_maps_ok_to_no_error() {
        assert_eq!(result_code(&Ok(())), NO_ERROR);
        assert_eq!(result_code(&Err(NpfError::InvalidVcAddress)), 7);
    }
}
