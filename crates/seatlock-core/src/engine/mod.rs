//! Reservation engine: exclusive, time-bounded leases over a fixed seat set.
//!
//! # 並行性
//! - テーブル全体を 1 つの Mutex で守る（sweep が全座席に触るため）
//! - 1 回の呼び出し = 1 回のクリティカルセクション
//! - ロック中に I/O はしない。イベントはロック解放後に sink へ渡す
//!
//! # 期限切れの回収（lazy sweep）
//! タイマーは持たず、すべての呼び出し（読み取り含む）の先頭で
//! 期限切れの Held を Available に戻してから本来の操作を評価します。

mod builder;
mod table;

pub use self::builder::{BuildError, DEFAULT_LEASE_DURATION, EngineBuilder, MAX_LEASE_DURATION};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AcquireOutcome, DomainEvent, HolderId, ReservationError, SeatId, SeatState,
};
use crate::ports::{Clock, EventSink};

use self::table::SeatTable;

/// One row of a status query. Holder and expiry are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStatus {
    pub seat_id: SeatId,
    pub state: SeatState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCounts {
    pub available: usize,
    pub held: usize,
    pub allocated: usize,
}

impl SeatCounts {
    pub fn total(&self) -> usize {
        self.available + self.held + self.allocated
    }
}

/// The engine. Share it behind an `Arc`; every method takes `&self`.
pub struct ReservationEngine {
    table: Mutex<SeatTable>,
    lease_duration: TimeDelta,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
}

impl ReservationEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    fn new(
        table: SeatTable,
        lease_duration: TimeDelta,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            table: Mutex::new(table),
            lease_duration,
            clock,
            sink,
        }
    }

    pub fn lease_duration(&self) -> TimeDelta {
        self.lease_duration
    }

    pub fn seat_count(&self) -> usize {
        self.lock_table().len()
    }

    /// State of every seat, in provisioning order.
    pub fn query(&self) -> Vec<SeatStatus> {
        self.run(|table, _now, _events| table.statuses())
    }

    /// State of one seat.
    pub fn status(&self, seat_id: &SeatId) -> Result<SeatState, ReservationError> {
        self.run(|table, _now, _events| table.get(seat_id).map(|seat| seat.state()))
    }

    pub fn counts(&self) -> SeatCounts {
        self.run(|table, _now, _events| table.counts())
    }

    /// Take (or refresh) the lease on a seat.
    ///
    /// - Available -> Held: `AcquireOutcome::Held`
    /// - Held by `holder` -> Held with a new expiry: `AcquireOutcome::Refreshed`
    /// - Held by another holder, or Allocated: `ReservationError::Conflict`
    pub fn acquire(
        &self,
        seat_id: &SeatId,
        holder: &HolderId,
    ) -> Result<AcquireOutcome, ReservationError> {
        self.run(|table, now, events| -> Result<_, ReservationError> {
            let seat = table.get_mut(seat_id)?;
            let outcome = seat.acquire(holder, now, self.lease_duration)?;
            events.push(match outcome {
                AcquireOutcome::Held { expires_at } => DomainEvent::SeatHeld {
                    seat_id: seat_id.clone(),
                    holder: holder.clone(),
                    expires_at,
                },
                AcquireOutcome::Refreshed { expires_at } => DomainEvent::HoldRefreshed {
                    seat_id: seat_id.clone(),
                    holder: holder.clone(),
                    expires_at,
                },
            });
            Ok(outcome)
        })
    }

    /// Promote the caller's live lease to a permanent allocation.
    pub fn confirm(&self, seat_id: &SeatId, holder: &HolderId) -> Result<(), ReservationError> {
        self.run(|table, now, events| -> Result<_, ReservationError> {
            table.get_mut(seat_id)?.confirm(holder, now)?;
            events.push(DomainEvent::SeatAllocated {
                seat_id: seat_id.clone(),
                holder: holder.clone(),
            });
            Ok(())
        })
    }

    /// Give up the caller's live lease before it expires.
    pub fn release(&self, seat_id: &SeatId, holder: &HolderId) -> Result<(), ReservationError> {
        self.run(|table, now, events| -> Result<_, ReservationError> {
            table.get_mut(seat_id)?.release(holder, now)?;
            events.push(DomainEvent::HoldReleased {
                seat_id: seat_id.clone(),
                holder: holder.clone(),
            });
            Ok(())
        })
    }

    /// One critical section: read the clock, sweep, run `op`.
    /// Events are emitted after the lock is dropped.
    fn run<T>(
        &self,
        op: impl FnOnce(&mut SeatTable, DateTime<Utc>, &mut Vec<DomainEvent>) -> T,
    ) -> T {
        let (result, events) = {
            let mut table = self.lock_table();
            let now = self.clock.now();
            let mut events = table.reclaim_expired(now);
            let result = op(&mut table, now, &mut events);
            (result, events)
        };

        for event in &events {
            self.sink.emit(event);
        }
        result
    }

    /// Every mutation assigns a complete seat state, so a panic elsewhere
    /// cannot leave the table half-written; recover from poisoning.
    fn lock_table(&self) -> MutexGuard<'_, SeatTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn inspect<T>(&self, seat_id: &str, f: impl FnOnce(&crate::domain::seat::SeatRecord) -> T) -> T {
        let table = self.lock_table();
        f(table.get(&SeatId::from(seat_id)).unwrap())
    }
}
