//! EngineBuilder - engine の構築と起動時検証
//!
//! # Fail-fast 設計
//! - 座席 ID の重複・空文字、lease 長 0 や上限超えは build() 時にエラー
//! - 一度 build された engine の座席集合は変わらない

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;

use crate::domain::SeatId;
use crate::ports::{Clock, EventSink, NoopEventSink, SystemClock};

use super::ReservationEngine;
use super::table::SeatTable;

/// Lease duration used when none is given.
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(60);

/// Longest lease `build()` accepts (one year).
pub const MAX_LEASE_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// BuildError は engine 構築時のエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("seat id {0:?} is provisioned more than once")]
    DuplicateSeat(SeatId),

    #[error("seat ids must not be empty strings")]
    EmptySeatId,

    #[error("lease duration must be greater than zero")]
    ZeroLeaseDuration,

    #[error("lease duration {0:?} is out of range")]
    LeaseDurationOutOfRange(Duration),
}

/// EngineBuilder は ReservationEngine を構築
///
/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new()
///     .seats(["1", "2", "3"])
///     .lease_duration(Duration::from_secs(60))
///     .event_sink(Arc::new(TracingEventSink))
///     .build()?;
/// ```
pub struct EngineBuilder {
    seat_ids: Vec<SeatId>,
    lease_duration: Duration,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            seat_ids: Vec::new(),
            lease_duration: DEFAULT_LEASE_DURATION,
            clock: Arc::new(SystemClock),
            sink: Arc::new(NoopEventSink),
        }
    }

    /// Add seats, in order. May be called more than once.
    pub fn seats<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SeatId>,
    {
        self.seat_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = lease_duration;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// # 検証
    /// - 座席 ID が空文字でないこと
    /// - 座席 ID が重複していないこと
    /// - lease 長が 0 より大きく、`MAX_LEASE_DURATION` 以下であること
    ///
    /// An empty seat list is allowed: every acquire then reports NotFound.
    pub fn build(self) -> Result<ReservationEngine, BuildError> {
        let mut seen = HashSet::new();
        for id in &self.seat_ids {
            if id.as_str().is_empty() {
                return Err(BuildError::EmptySeatId);
            }
            if !seen.insert(id) {
                return Err(BuildError::DuplicateSeat(id.clone()));
            }
        }

        if self.lease_duration.is_zero() {
            return Err(BuildError::ZeroLeaseDuration);
        }
        if self.lease_duration > MAX_LEASE_DURATION {
            return Err(BuildError::LeaseDurationOutOfRange(self.lease_duration));
        }
        let lease_duration = TimeDelta::from_std(self.lease_duration)
            .map_err(|_| BuildError::LeaseDurationOutOfRange(self.lease_duration))?;

        Ok(ReservationEngine::new(
            SeatTable::new(self.seat_ids),
            lease_duration,
            self.clock,
            self.sink,
        ))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HolderId;

    #[test]
    fn test_build_success() {
        let engine = EngineBuilder::new().seats(["1", "2"]).build().unwrap();
        assert_eq!(engine.lease_duration(), TimeDelta::seconds(60));
        assert_eq!(engine.query().len(), 2);
    }

    #[test]
    fn test_build_duplicate_seat() {
        let result = EngineBuilder::new().seats(["1", "2"]).seats(["2"]).build();
        assert!(matches!(
            result,
            Err(BuildError::DuplicateSeat(id)) if id == SeatId::from("2")
        ));
    }

    #[test]
    fn test_build_empty_seat_id() {
        let result = EngineBuilder::new().seats(["1", ""]).build();
        assert!(matches!(result, Err(BuildError::EmptySeatId)));
    }

    #[test]
    fn test_build_zero_lease() {
        let result = EngineBuilder::new()
            .seats(["1"])
            .lease_duration(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(BuildError::ZeroLeaseDuration)));
    }

    #[test]
    fn test_build_lease_out_of_range() {
        let result = EngineBuilder::new()
            .seats(["1"])
            .lease_duration(Duration::MAX)
            .build();
        assert!(matches!(result, Err(BuildError::LeaseDurationOutOfRange(_))));
    }

    #[test]
    fn test_build_lease_beyond_cap() {
        // Fits in a TimeDelta, but `now + lease` would leave chrono's date range.
        let huge = Duration::from_secs(10_000_000_000_000);
        let result = EngineBuilder::new().seats(["1"]).lease_duration(huge).build();
        assert!(matches!(
            result,
            Err(BuildError::LeaseDurationOutOfRange(d)) if d == huge
        ));

        let just_over = MAX_LEASE_DURATION + Duration::from_secs(1);
        let result = EngineBuilder::new().seats(["1"]).lease_duration(just_over).build();
        assert!(matches!(result, Err(BuildError::LeaseDurationOutOfRange(_))));
    }

    #[test]
    fn test_build_lease_at_cap() {
        let engine = EngineBuilder::new()
            .seats(["1"])
            .lease_duration(MAX_LEASE_DURATION)
            .build()
            .unwrap();
        assert!(engine.acquire(&SeatId::from("1"), &HolderId::from("u1")).is_ok());
    }

    #[test]
    fn test_build_without_seats() {
        let engine = EngineBuilder::new().build().unwrap();
        assert!(engine.query().is_empty());
    }
}
