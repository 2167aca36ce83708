//! EventSink port - イベント記録の抽象化
//!
//! Engine 自身はログを出しません。状態遷移は DomainEvent として
//! EventSink に渡され、何をするかは sink 側が決めます。
//!
//! # 実装
//! - **NoopEventSink**: 何もしない（デフォルト）
//! - **TracingEventSink**: `tracing` の構造化ログに変換

use crate::domain::DomainEvent;

/// EventSink はドメインイベントを記録
///
/// Called after the engine has released its lock, so implementations may
/// block briefly without stalling other callers' critical sections.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &DomainEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &DomainEvent) {}
}

/// Writes each event as a structured `tracing` record under the
/// `seatlock::events` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &DomainEvent) {
        match event {
            DomainEvent::SeatHeld {
                seat_id,
                holder,
                expires_at,
            } => tracing::info!(
                target: "seatlock::events",
                seat_id = %seat_id,
                holder = %holder,
                expires_at = %expires_at,
                "seat held"
            ),
            DomainEvent::HoldRefreshed {
                seat_id,
                holder,
                expires_at,
            } => tracing::debug!(
                target: "seatlock::events",
                seat_id = %seat_id,
                holder = %holder,
                expires_at = %expires_at,
                "hold refreshed"
            ),
            DomainEvent::SeatAllocated { seat_id, holder } => tracing::info!(
                target: "seatlock::events",
                seat_id = %seat_id,
                holder = %holder,
                "seat allocated"
            ),
            DomainEvent::HoldReleased { seat_id, holder } => tracing::info!(
                target: "seatlock::events",
                seat_id = %seat_id,
                holder = %holder,
                "hold released"
            ),
            DomainEvent::HoldExpired {
                seat_id,
                holder,
                expired_at,
            } => tracing::info!(
                target: "seatlock::events",
                seat_id = %seat_id,
                holder = %holder,
                expired_at = %expired_at,
                "hold expired, seat reclaimed"
            ),
        }
    }
}

/// Keeps every event in memory (for testing).
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingEventSink {
    events: std::sync::Mutex<Vec<DomainEvent>>,
}

#[cfg(test)]
impl RecordingEventSink {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl EventSink for RecordingEventSink {
    fn emit(&self, event: &DomainEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
