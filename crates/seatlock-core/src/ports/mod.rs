//! Ports - 抽象化レイヤー
//!
//! Engine が外部に依存する箇所（時刻とイベント出力）を trait として切り出し、
//! テストでは決定的な実装に差し替えます。

pub mod clock;
pub mod event_sink;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::{EventSink, NoopEventSink, TracingEventSink};

#[cfg(test)]
pub(crate) use self::event_sink::RecordingEventSink;
