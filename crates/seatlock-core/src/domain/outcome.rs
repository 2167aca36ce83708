//! Outcome model: what a successful call returns, and the five result kinds
//! every call is classified into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ReservationError;
use super::state::SeatState;

/// Result classification handed to collaborators, which map it to their own
/// status codes and messages.
///
/// Serialized as SCREAMING_SNAKE_CASE: SUCCESS / REFRESHED / NOT_FOUND /
/// CONFLICT / INVALID_STATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    Success,
    Refreshed,
    NotFound,
    Conflict,
    InvalidState,
}

impl ResultKind {
    pub fn is_success(self) -> bool {
        matches!(self, ResultKind::Success | ResultKind::Refreshed)
    }
}

/// Successful acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The seat was available and is now held by the caller.
    Held { expires_at: DateTime<Utc> },

    /// The caller already held the seat; the lease got a new expiry.
    Refreshed { expires_at: DateTime<Utc> },
}

impl AcquireOutcome {
    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            Self::Held { expires_at } | Self::Refreshed { expires_at } => *expires_at,
        }
    }

    pub fn is_refresh(&self) -> bool {
        matches!(self, Self::Refreshed { .. })
    }
}

/// Anything an engine call can return, reduced to a [`ResultKind`].
pub trait Classify {
    fn kind(&self) -> ResultKind;
}

impl Classify for AcquireOutcome {
    fn kind(&self) -> ResultKind {
        match self {
            Self::Held { .. } => ResultKind::Success,
            Self::Refreshed { .. } => ResultKind::Refreshed,
        }
    }
}

impl Classify for SeatState {
    fn kind(&self) -> ResultKind {
        ResultKind::Success
    }
}

impl Classify for () {
    fn kind(&self) -> ResultKind {
        ResultKind::Success
    }
}

impl<T: Classify> Classify for Result<T, ReservationError> {
    fn kind(&self) -> ResultKind {
        match self {
            Ok(value) => value.kind(),
            Err(err) => err.kind(),
        }
    }
}
