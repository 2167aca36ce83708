//! Engine results -> status code + message, the way the booking API answered.

use seatlock_core::{
    AcquireOutcome, ConflictReason, ReservationError, ResultKind, SeatId, SeatState,
};
use serde::Serialize;

/// What the caller sees for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: u16,
    pub kind: ResultKind,
    pub message: String,
}

impl Response {
    fn new(kind: ResultKind, message: impl Into<String>) -> Self {
        Self {
            status: status_code(kind),
            kind,
            message: message.into(),
        }
    }
}

pub fn status_code(kind: ResultKind) -> u16 {
    match kind {
        ResultKind::Success | ResultKind::Refreshed => 200,
        ResultKind::NotFound => 404,
        ResultKind::Conflict => 409,
        ResultKind::InvalidState => 400,
    }
}

pub fn lock(
    seat_id: &SeatId,
    result: &Result<AcquireOutcome, ReservationError>,
    lease_secs: i64,
) -> Response {
    match result {
        Ok(AcquireOutcome::Held { .. }) => Response::new(
            ResultKind::Success,
            format!("Seat {seat_id} locked successfully. Confirm within {lease_secs} seconds."),
        ),
        Ok(AcquireOutcome::Refreshed { .. }) => Response::new(
            ResultKind::Refreshed,
            format!("Seat {seat_id} is already locked by you. Lock refreshed."),
        ),
        Err(ReservationError::Conflict {
            reason: ConflictReason::Allocated,
            ..
        }) => Response::new(
            ResultKind::Conflict,
            format!("Seat {seat_id} is already permanently booked."),
        ),
        Err(ReservationError::Conflict {
            reason: ConflictReason::HeldByOther,
            ..
        }) => Response::new(
            ResultKind::Conflict,
            format!("Seat {seat_id} is already locked by another user."),
        ),
        Err(err) => rejected(err),
    }
}

pub fn confirm(seat_id: &SeatId, result: &Result<(), ReservationError>) -> Response {
    match result {
        Ok(()) => Response::new(
            ResultKind::Success,
            format!("Seat {seat_id} booked successfully!"),
        ),
        Err(ReservationError::InvalidState(_)) => Response::new(
            ResultKind::InvalidState,
            "Seat is not locked and cannot be booked",
        ),
        Err(err) => rejected(err),
    }
}

pub fn release(seat_id: &SeatId, result: &Result<(), ReservationError>) -> Response {
    match result {
        Ok(()) => Response::new(ResultKind::Success, format!("Seat {seat_id} released.")),
        Err(ReservationError::InvalidState(_)) => Response::new(
            ResultKind::InvalidState,
            format!("Seat {seat_id} is not locked by you."),
        ),
        Err(err) => rejected(err),
    }
}

pub fn status(seat_id: &SeatId, result: &Result<SeatState, ReservationError>) -> Response {
    match result {
        Ok(state) => Response::new(ResultKind::Success, format!("Seat {seat_id} is {state}.")),
        Err(err) => rejected(err),
    }
}

fn rejected(err: &ReservationError) -> Response {
    match err {
        ReservationError::NotFound(seat_id) => {
            Response::new(ResultKind::NotFound, format!("Seat {seat_id} not found."))
        }
        other => Response::new(other.kind(), other.to_string()),
    }
}
