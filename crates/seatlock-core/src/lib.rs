//! seatlock-core
//!
//! Time-bounded exclusive leases over a fixed set of seats.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, state, outcome, errors, events, seat record）
//! - **ports**: 抽象化レイヤー（Clock, EventSink）
//! - **engine**: ReservationEngine と EngineBuilder
//! - **config**: EngineConfig の読み込み（defaults → TOML → env）
//!
//! ```ignore
//! let engine = ReservationEngine::builder().seats(["1", "2"]).build()?;
//! let me = HolderId::from("u1");
//! engine.acquire(&SeatId::from("1"), &me)?;
//! engine.confirm(&SeatId::from("1"), &me)?;
//! ```

pub mod config;
pub mod domain;
pub mod engine;
pub mod ports;

pub use crate::config::{ConfigError, EngineConfig};
pub use crate::domain::{
    AcquireOutcome, Classify, ConflictReason, DomainEvent, HolderId, ReservationError,
    ResultKind, SeatId, SeatState,
};
pub use crate::engine::{BuildError, EngineBuilder, ReservationEngine, SeatCounts, SeatStatus};
