//! Seat record: identity + occupancy.

use chrono::{DateTime, TimeDelta, Utc};

use super::errors::{ConflictReason, ReservationError};
use super::ids::{HolderId, SeatId};
use super::outcome::AcquireOutcome;
use super::state::SeatState;

/// A live lease on one seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lease {
    pub holder: HolderId,
    pub expires_at: DateTime<Utc>,
}

impl Lease {
    /// Strict comparison: a lease is still valid at exactly `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    fn is_held_by(&self, holder: &HolderId) -> bool {
        &self.holder == holder
    }
}

/// Holder and expiry only exist inside `Held`, so "held without a holder"
/// or "available with an expiry" cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Occupancy {
    Available,
    Held(Lease),
    Allocated,
}

/// Single source of truth for one seat.
///
/// All state transitions happen through the methods below; each either
/// assigns a whole new `Occupancy` or returns an error without touching it.
#[derive(Debug, Clone)]
pub(crate) struct SeatRecord {
    id: SeatId,
    occupancy: Occupancy,
}

impl SeatRecord {
    pub fn new(id: SeatId) -> Self {
        Self {
            id,
            occupancy: Occupancy::Available,
        }
    }

    pub fn id(&self) -> &SeatId {
        &self.id
    }

    pub fn state(&self) -> SeatState {
        match self.occupancy {
            Occupancy::Available => SeatState::Available,
            Occupancy::Held(_) => SeatState::Held,
            Occupancy::Allocated => SeatState::Allocated,
        }
    }

    #[cfg(test)]
    pub fn holder(&self) -> Option<&HolderId> {
        match &self.occupancy {
            Occupancy::Held(lease) => Some(&lease.holder),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match &self.occupancy {
            Occupancy::Held(lease) => Some(lease.expires_at),
            _ => None,
        }
    }

    /// Demote an expired hold to Available. Returns the lapsed lease.
    pub fn reclaim_if_expired(&mut self, now: DateTime<Utc>) -> Option<Lease> {
        let Occupancy::Held(lease) = &self.occupancy else {
            return None;
        };
        if !lease.is_expired(now) {
            return None;
        }
        let lapsed = lease.clone();
        self.occupancy = Occupancy::Available;
        Some(lapsed)
    }

    /// Available -> Held, or refresh when `holder` already holds the seat.
    pub fn acquire(
        &mut self,
        holder: &HolderId,
        now: DateTime<Utc>,
        lease_duration: TimeDelta,
    ) -> Result<AcquireOutcome, ReservationError> {
        // Saturates at the end of chrono's range instead of overflowing.
        let expires_at = now
            .checked_add_signed(lease_duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let outcome = match &self.occupancy {
            Occupancy::Allocated => {
                return Err(ReservationError::conflict(
                    self.id.clone(),
                    ConflictReason::Allocated,
                ));
            }
            Occupancy::Held(lease) if !lease.is_expired(now) && !lease.is_held_by(holder) => {
                return Err(ReservationError::conflict(
                    self.id.clone(),
                    ConflictReason::HeldByOther,
                ));
            }
            Occupancy::Held(lease) if !lease.is_expired(now) => {
                AcquireOutcome::Refreshed { expires_at }
            }
            Occupancy::Held(_) | Occupancy::Available => AcquireOutcome::Held { expires_at },
        };

        self.occupancy = Occupancy::Held(Lease {
            holder: holder.clone(),
            expires_at,
        });
        Ok(outcome)
    }

    /// Held (by `holder`, not expired) -> Allocated.
    pub fn confirm(
        &mut self,
        holder: &HolderId,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationError> {
        self.check_holder(holder, now)?;
        self.occupancy = Occupancy::Allocated;
        Ok(())
    }

    /// Held (by `holder`, not expired) -> Available.
    pub fn release(
        &mut self,
        holder: &HolderId,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationError> {
        self.check_holder(holder, now)?;
        self.occupancy = Occupancy::Available;
        Ok(())
    }

    fn check_holder(&self, holder: &HolderId, now: DateTime<Utc>) -> Result<(), ReservationError> {
        match &self.occupancy {
            Occupancy::Held(lease) if lease.is_held_by(holder) && !lease.is_expired(now) => Ok(()),
            _ => Err(ReservationError::InvalidState(self.id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn lease() -> TimeDelta {
        TimeDelta::seconds(60)
    }

    fn held_by(holder: &str) -> SeatRecord {
        let mut seat = SeatRecord::new(SeatId::from("1"));
        seat.acquire(&HolderId::from(holder), t0(), lease()).unwrap();
        seat
    }

    fn allocated() -> SeatRecord {
        let mut seat = held_by("u1");
        seat.confirm(&HolderId::from("u1"), t0()).unwrap();
        seat
    }

    fn assert_holder_iff_held(seat: &SeatRecord) {
        let held = seat.state() == SeatState::Held;
        assert_eq!(seat.holder().is_some(), held);
        assert_eq!(seat.expires_at().is_some(), held);
    }

    #[test]
    fn new_seat_starts_available() {
        let seat = SeatRecord::new(SeatId::from("1"));
        assert_eq!(seat.state(), SeatState::Available);
        assert_holder_iff_held(&seat);
    }

    #[test]
    fn acquire_sets_holder_and_exact_expiry() {
        let seat = held_by("u1");

        assert_eq!(seat.state(), SeatState::Held);
        assert_eq!(seat.holder(), Some(&HolderId::from("u1")));
        assert_eq!(seat.expires_at(), Some(t0() + lease()));
        assert_holder_iff_held(&seat);
    }

    #[test]
    fn reacquire_by_same_holder_issues_new_expiry() {
        let mut seat = held_by("u1");
        let later = t0() + TimeDelta::seconds(30);

        let outcome = seat.acquire(&HolderId::from("u1"), later, lease()).unwrap();

        assert_eq!(outcome, AcquireOutcome::Refreshed { expires_at: later + lease() });
        assert_eq!(seat.expires_at(), Some(later + lease()));
    }

    #[rstest]
    #[case::held_by_other(held_by("u1"), ConflictReason::HeldByOther)]
    #[case::allocated(allocated(), ConflictReason::Allocated)]
    fn acquire_conflicts_without_mutation(
        #[case] seat: SeatRecord,
        #[case] reason: ConflictReason,
    ) {
        let mut seat = seat;
        let before = seat.occupancy.clone();

        let err = seat.acquire(&HolderId::from("u2"), t0(), lease()).unwrap_err();

        assert_eq!(err, ReservationError::conflict(SeatId::from("1"), reason));
        assert_eq!(seat.occupancy, before);
    }

    #[rstest]
    #[case::never_held(SeatRecord::new(SeatId::from("1")), "u1")]
    #[case::held_by_other(held_by("u1"), "u2")]
    #[case::allocated(allocated(), "u1")]
    fn confirm_rejects_with_invalid_state(#[case] seat: SeatRecord, #[case] holder: &str) {
        let mut seat = seat;
        let before = seat.occupancy.clone();

        let err = seat.confirm(&HolderId::from(holder), t0()).unwrap_err();

        assert_eq!(err, ReservationError::InvalidState(SeatId::from("1")));
        assert_eq!(seat.occupancy, before);
    }

    #[test]
    fn confirm_clears_holder_and_expiry() {
        let seat = allocated();
        assert_eq!(seat.state(), SeatState::Allocated);
        assert_holder_iff_held(&seat);
    }

    #[test]
    fn acquire_near_the_end_of_time_saturates() {
        let mut seat = SeatRecord::new(SeatId::from("1"));
        let late = DateTime::<Utc>::MAX_UTC - TimeDelta::seconds(10);

        let outcome = seat.acquire(&HolderId::from("u1"), late, lease()).unwrap();

        assert_eq!(outcome.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert_eq!(seat.state(), SeatState::Held);
        assert!(seat.confirm(&HolderId::from("u1"), late).is_ok());
    }

    #[test]
    fn lease_is_valid_at_exact_expiry() {
        let mut seat = held_by("u1");
        let boundary = t0() + lease();

        assert!(seat.reclaim_if_expired(boundary).is_none());
        assert!(seat.confirm(&HolderId::from("u1"), boundary).is_ok());
    }

    #[test]
    fn reclaim_demotes_expired_hold() {
        let mut seat = held_by("u1");
        let past_expiry = t0() + lease() + TimeDelta::milliseconds(1);

        let lapsed = seat.reclaim_if_expired(past_expiry).unwrap();

        assert_eq!(lapsed.holder, HolderId::from("u1"));
        assert_eq!(lapsed.expires_at, t0() + lease());
        assert_eq!(seat.state(), SeatState::Available);
        assert_holder_iff_held(&seat);
    }

    #[test]
    fn release_returns_seat_to_available() {
        let mut seat = held_by("u1");

        assert_eq!(
            seat.release(&HolderId::from("u2"), t0()),
            Err(ReservationError::InvalidState(SeatId::from("1")))
        );
        seat.release(&HolderId::from("u1"), t0()).unwrap();

        assert_eq!(seat.state(), SeatState::Available);
        assert_holder_iff_held(&seat);
    }
}
