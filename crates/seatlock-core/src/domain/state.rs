//! Seat state as seen by callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally visible seat state.
///
/// State transitions:
/// - Available -> Held -> Allocated
/// - Held -> Available (lease expired or released)
///
/// Allocated is terminal. Holder and expiry live on the record, never here,
/// so a status listing cannot leak who holds a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatState {
    /// Free to acquire.
    Available,

    /// Under a time-bounded lease.
    Held,

    /// Permanently booked.
    Allocated,
}

impl SeatState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, SeatState::Allocated)
    }

    /// Can a new holder acquire this seat?
    pub fn is_available(self) -> bool {
        matches!(self, SeatState::Available)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeatState::Available => "available",
            SeatState::Held => "held",
            SeatState::Allocated => "allocated",
        }
    }
}

impl fmt::Display for SeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
