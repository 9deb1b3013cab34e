use thiserror::Error;

use crate::infrastructure::{ParsingError, TransportError};

/// Why a listing page or a detail item was skipped.
/// Never fatal to the run; the walker logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParsingError),
}

impl ItemError {
    /// Name of the required field that was missing, if that is the cause
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            Self::Parse(e) if e.is_field_missing() => e.field(),
            _ => None,
        }
    }
}
