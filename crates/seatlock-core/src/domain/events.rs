//! Events - ドメインイベント
//!
//! 状態遷移ごとに 1 件発行され、EventSink に渡されます。
//! Rejected calls produce no event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{HolderId, SeatId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Available -> Held
    SeatHeld {
        seat_id: SeatId,
        holder: HolderId,
        expires_at: DateTime<Utc>,
    },

    /// Held -> Held, same holder, new expiry
    HoldRefreshed {
        seat_id: SeatId,
        holder: HolderId,
        expires_at: DateTime<Utc>,
    },

    /// Held -> Allocated
    SeatAllocated { seat_id: SeatId, holder: HolderId },

    /// Held -> Available, by the holder
    HoldReleased { seat_id: SeatId, holder: HolderId },

    /// Held -> Available, by the sweep
    HoldExpired {
        seat_id: SeatId,
        holder: HolderId,
        expired_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn seat_id(&self) -> &SeatId {
        match self {
            Self::SeatHeld { seat_id, .. }
            | Self::HoldRefreshed { seat_id, .. }
            | Self::SeatAllocated { seat_id, .. }
            | Self::HoldReleased { seat_id, .. }
            | Self::HoldExpired { seat_id, .. } => seat_id,
        }
    }

    pub fn holder(&self) -> &HolderId {
        match self {
            Self::SeatHeld { holder, .. }
            | Self::HoldRefreshed { holder, .. }
            | Self::SeatAllocated { holder, .. }
            | Self::HoldReleased { holder, .. }
            | Self::HoldExpired { holder, .. } => holder,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SeatHeld { .. } => "seat_held",
            Self::HoldRefreshed { .. } => "hold_refreshed",
            Self::SeatAllocated { .. } => "seat_allocated",
            Self::HoldReleased { .. } => "hold_released",
            Self::HoldExpired { .. } => "hold_expired",
        }
    }
}
