//! Domain model (ids, state, seat records, outcomes, errors, events).
//!
//! ドメイン層は時刻もロックも知りません。`now` は呼び出し側から渡され、
//! 排他制御は engine 側の責務です。

pub mod errors;
pub mod events;
pub mod ids;
pub mod outcome;
pub(crate) mod seat;
pub mod state;

pub use self::errors::{ConflictReason, ReservationError};
pub use self::events::DomainEvent;
pub use self::ids::{HolderId, SeatId};
pub use self::outcome::{AcquireOutcome, Classify, ResultKind};
pub use self::state::SeatState;
