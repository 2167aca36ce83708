//! Engine configuration.
//!
//! Sources, later ones win:
//! 1. built-in defaults (60 second lease, seats "1" to "5")
//! 2. an optional TOML file
//! 3. `SEATLOCK_*` environment variables (`SEATLOCK_LEASE_DURATION_SECS`,
//!    `SEATLOCK_SEAT_IDS=1,2,3`)

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment, File, Map};
use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::{BuildError, EngineBuilder, ReservationEngine};
use crate::ports::{Clock, EventSink};

pub const ENV_PREFIX: &str = "SEATLOCK";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid engine configuration: {0}")]
    Build(#[from] BuildError),
}

/// Provisioning for one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long a hold lasts before the sweep reclaims it.
    #[serde(default = "default_lease_duration_secs")]
    pub lease_duration_secs: u64,
    /// Seats to provision, in display order.
    #[serde(
        default = "default_seat_ids",
        deserialize_with = "seat_ids_from_list_or_csv"
    )]
    pub seat_ids: Vec<String>,
}

fn default_lease_duration_secs() -> u64 {
    60
}

fn default_seat_ids() -> Vec<String> {
    (1..=5).map(|n| n.to_string()).collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lease_duration_secs: default_lease_duration_secs(),
            seat_ids: default_seat_ids(),
        }
    }
}

/// `SEATLOCK_*` variables, read from the process unless `vars` is given.
/// Values are left as strings; see [`seat_ids_from_list_or_csv`].
fn environment(vars: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX).source(vars)
}

/// TOML gives an array, the environment gives `"1,2,3"` (or just `"7"`).
fn seat_ids_from_list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeatIds {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match SeatIds::deserialize(deserializer)? {
        SeatIds::List(ids) => ids,
        SeatIds::Csv(csv) => csv.split(',').map(|id| id.trim().to_string()).collect(),
    })
}

impl EngineConfig {
    /// Load from defaults, an optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        Self::from_builder(builder.add_source(environment(None)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn lease_duration(&self) -> Duration {
        Duration::from_secs(self.lease_duration_secs)
    }

    /// Builder preloaded with this configuration; clock and sink still
    /// default and can be overridden.
    pub fn engine_builder(&self) -> EngineBuilder {
        EngineBuilder::new()
            .seats(self.seat_ids.iter().cloned())
            .lease_duration(self.lease_duration())
    }

    pub fn build_engine(
        &self,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Result<ReservationEngine, ConfigError> {
        Ok(self
            .engine_builder()
            .clock(clock)
            .event_sink(sink)
            .build()?)
    }
}
