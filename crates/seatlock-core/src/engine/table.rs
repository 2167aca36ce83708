//! Seat table: the engine's guarded state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::seat::SeatRecord;
use crate::domain::{DomainEvent, ReservationError, SeatId, SeatState};

use super::{SeatCounts, SeatStatus};

/// All seats in provisioning order, plus an id index.
///
/// Only ever touched while the engine's mutex is held.
#[derive(Debug)]
pub(crate) struct SeatTable {
    seats: Vec<SeatRecord>,
    index: HashMap<SeatId, usize>,
}

impl SeatTable {
    /// Caller guarantees ids are unique (checked by the builder).
    pub fn new(ids: Vec<SeatId>) -> Self {
        let index = ids
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position))
            .collect();
        let seats = ids.into_iter().map(SeatRecord::new).collect();
        Self { seats, index }
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Demote every expired hold to Available.
    ///
    /// O(seat count). Fine for a small fixed inventory; a large one would want
    /// an expiry-ordered index instead of a full scan.
    pub fn reclaim_expired(&mut self, now: DateTime<Utc>) -> Vec<DomainEvent> {
        self.seats
            .iter_mut()
            .filter_map(|seat| {
                seat.reclaim_if_expired(now)
                    .map(|lease| DomainEvent::HoldExpired {
                        seat_id: seat.id().clone(),
                        holder: lease.holder,
                        expired_at: lease.expires_at,
                    })
            })
            .collect()
    }

    pub fn get(&self, seat_id: &SeatId) -> Result<&SeatRecord, ReservationError> {
        self.index
            .get(seat_id)
            .map(|&position| &self.seats[position])
            .ok_or_else(|| ReservationError::NotFound(seat_id.clone()))
    }

    pub fn get_mut(&mut self, seat_id: &SeatId) -> Result<&mut SeatRecord, ReservationError> {
        match self.index.get(seat_id) {
            Some(&position) => Ok(&mut self.seats[position]),
            None => Err(ReservationError::NotFound(seat_id.clone())),
        }
    }

    pub fn statuses(&self) -> Vec<SeatStatus> {
        self.seats
            .iter()
            .map(|seat| SeatStatus {
                seat_id: seat.id().clone(),
                state: seat.state(),
            })
            .collect()
    }

    pub fn counts(&self) -> SeatCounts {
        let mut counts = SeatCounts::default();
        for seat in &self.seats {
            match seat.state() {
                SeatState::Available => counts.available += 1,
                SeatState::Held => counts.held += 1,
                SeatState::Allocated => counts.allocated += 1,
            }
        }
        counts
    }
}
