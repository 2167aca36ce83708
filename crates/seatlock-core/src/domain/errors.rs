//! Errors - 予約操作の失敗分類
//!
//! Every rejection is ordinary control flow: nothing here is fatal to the
//! engine, and a rejected call never leaves a partial mutation behind.

use thiserror::Error;

use super::ids::SeatId;
use super::outcome::ResultKind;

/// Why an acquire was refused.
///
/// Only the cause is reported; the current holder is never revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The seat is permanently allocated.
    Allocated,

    /// Another holder has a live lease on the seat.
    HeldByOther,
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Allocated => "already allocated",
            Self::HeldByOther => "held by another holder",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    #[error("seat {0} not found")]
    NotFound(SeatId),

    #[error("seat {seat_id} is unavailable: {reason}")]
    Conflict {
        seat_id: SeatId,
        reason: ConflictReason,
    },

    /// The seat is not held by the caller. Never held, held by someone else,
    /// already allocated and lease expired all collapse into this one kind.
    #[error("seat {0} is not held by this holder")]
    InvalidState(SeatId),
}

impl ReservationError {
    pub fn conflict(seat_id: SeatId, reason: ConflictReason) -> Self {
        Self::Conflict { seat_id, reason }
    }

    pub fn seat_id(&self) -> &SeatId {
        match self {
            Self::NotFound(seat_id)
            | Self::Conflict { seat_id, .. }
            | Self::InvalidState(seat_id) => seat_id,
        }
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            Self::NotFound(_) => ResultKind::NotFound,
            Self::Conflict { .. } => ResultKind::Conflict,
            Self::InvalidState(_) => ResultKind::InvalidState,
        }
    }
}
