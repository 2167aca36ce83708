//! Domain identifiers - 座席 ID と保持者トークン
//!
//! Both are plain strings on the wire, but they are distinct types so a seat id
//! can never be passed where a holder token is expected (and vice versa).

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

use crate::ports::Clock;

/// Stable identifier of one seat, fixed at provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(String);

impl SeatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SeatId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SeatId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque identity token of a caller.
///
/// The engine only compares tokens for equality. How a token is derived
/// (session, header, CLI flag) is the caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(String);

impl HolderId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// 新しいトークンを生成
    ///
    /// ULID の timestamp 部分は Clock から取るので、FixedClock を使えば
    /// テストでも先頭部分は決定的になります。
    pub fn generate<C: Clock + ?Sized>(clock: &C) -> Self {
        let timestamp_ms = clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        Self(format!("holder-{ulid}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for HolderId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for HolderId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn generated_holders_are_unique() {
        let a = HolderId::generate(&SystemClock);
        let b = HolderId::generate(&SystemClock);

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("holder-"));
    }

    #[test]
    fn generated_holder_embeds_clock_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(fixed_time);

        let holder = HolderId::generate(&clock);
        let ulid: Ulid = holder.as_str().trim_start_matches("holder-").parse().unwrap();

        assert_eq!(ulid.timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let seat = SeatId::from("A1");
        assert_eq!(serde_json::to_string(&seat).unwrap(), "\"A1\"");

        let back: HolderId = serde_json::from_str("\"u1\"").unwrap();
        assert_eq!(back, HolderId::from("u1"));
    }
}
