//! CLI command definitions and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use seatlock_core::ports::{SystemClock, TracingEventSink};
use seatlock_core::{
    ConfigError, EngineConfig, HolderId, ReservationEngine, ReservationError, SeatId,
};

use crate::output::{self, OutputFormat};
use crate::repl;
use crate::response;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("contender task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// seatlock: exclusive seat leases with automatic expiry
#[derive(Debug, Parser)]
#[command(name = "seatlock", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Lease duration in seconds (overrides the config file)
    #[arg(long)]
    pub lease_secs: Option<u64>,

    /// Seat ids, comma separated (overrides the config file)
    #[arg(long, value_delimiter = ',')]
    pub seats: Option<Vec<String>>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute (defaults to the interactive session)
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive booking session
    Repl {
        /// Identity token for this session (generated when omitted)
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Race many callers for one seat and report who won
    Contend {
        /// Seat to fight over
        seat: String,
        /// Number of concurrent callers
        #[arg(long, default_value_t = 8)]
        callers: usize,
        /// Confirm the winner's hold afterwards
        #[arg(long)]
        confirm: bool,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<(), CliError> {
        let config = self.resolve_config()?;
        let clock = Arc::new(SystemClock);
        let engine = Arc::new(config.build_engine(clock.clone(), Arc::new(TracingEventSink))?);
        tracing::debug!(
            seats = engine.seat_count(),
            lease_secs = config.lease_duration_secs,
            "engine ready"
        );

        match self.command {
            None => repl::run(engine, HolderId::generate(clock.as_ref()), self.format).await,
            Some(Command::Repl { user }) => {
                let holder = user
                    .map(HolderId::from)
                    .unwrap_or_else(|| HolderId::generate(clock.as_ref()));
                repl::run(engine, holder, self.format).await
            }
            Some(Command::Contend {
                seat,
                callers,
                confirm,
            }) => {
                let report = contend(engine, clock, SeatId::from(seat), callers, confirm).await?;
                println!(
                    "{}",
                    output::render(&report, || report.to_text(), self.format)
                );
                Ok(())
            }
        }
    }

    fn resolve_config(&self) -> Result<EngineConfig, CliError> {
        let mut config = EngineConfig::load(self.config.as_deref())?;
        if let Some(secs) = self.lease_secs {
            config.lease_duration_secs = secs;
        }
        if let Some(seats) = &self.seats {
            config.seat_ids = seats.clone();
        }
        Ok(config)
    }
}

/// Outcome of one `contend` run.
#[derive(Debug, Serialize)]
pub struct ContendReport {
    pub seat_id: SeatId,
    pub callers: usize,
    pub winner: Option<HolderId>,
    pub conflicts: usize,
    pub rejected: Vec<response::Response>,
    pub confirmed: Option<response::Response>,
}

impl ContendReport {
    fn to_text(&self) -> String {
        let mut out = match &self.winner {
            Some(winner) => format!(
                "Seat {}: {} callers, {} won, {} got a conflict.",
                self.seat_id, self.callers, winner, self.conflicts
            ),
            None => format!(
                "Seat {}: {} callers, nobody won.",
                self.seat_id, self.callers
            ),
        };
        for rejected in &self.rejected {
            out.push_str(&format!("\n[{}] {}", rejected.status, rejected.message));
        }
        if let Some(confirmed) = &self.confirmed {
            out.push_str(&format!("\n[{}] {}", confirmed.status, confirmed.message));
        }
        out
    }
}

async fn contend(
    engine: Arc<ReservationEngine>,
    clock: Arc<SystemClock>,
    seat_id: SeatId,
    callers: usize,
    confirm: bool,
) -> Result<ContendReport, CliError> {
    let mut handles = Vec::with_capacity(callers);
    for _ in 0..callers {
        let engine = engine.clone();
        let seat_id = seat_id.clone();
        let holder = HolderId::generate(clock.as_ref());
        handles.push(tokio::spawn(async move {
            let result = engine.acquire(&seat_id, &holder);
            (holder, result)
        }));
    }

    let lease_secs = engine.lease_duration().num_seconds();
    let mut winner = None;
    let mut conflicts = 0;
    let mut rejected = Vec::new();
    for handle in handles {
        let (holder, result) = handle.await?;
        match &result {
            Ok(_) => winner = Some(holder),
            Err(ReservationError::Conflict { .. }) => conflicts += 1,
            Err(_) => rejected.push(response::lock(&seat_id, &result, lease_secs)),
        }
    }
    // NotFound is the same for every caller.
    rejected.dedup();

    let confirmed = match (&winner, confirm) {
        (Some(holder), true) => Some(response::confirm(
            &seat_id,
            &engine.confirm(&seat_id, holder),
        )),
        _ => None,
    };

    tracing::info!(
        seat_id = %seat_id,
        callers,
        conflicts,
        won = winner.is_some(),
        "contention finished"
    );

    Ok(ContendReport {
        seat_id,
        callers,
        winner,
        conflicts,
        rejected,
        confirmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatlock_core::ResultKind;

    fn engine(seats: &[&str]) -> Arc<ReservationEngine> {
        Arc::new(
            ReservationEngine::builder()
                .seats(seats.iter().copied())
                .build()
                .unwrap(),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn contend_has_exactly_one_winner() {
        let engine = engine(&["1", "2"]);
        let report = contend(engine.clone(), Arc::new(SystemClock), SeatId::from("1"), 16, false)
            .await
            .unwrap();

        assert!(report.winner.is_some());
        assert_eq!(report.conflicts, 15);
        assert!(report.rejected.is_empty());
        assert_eq!(engine.counts().held, 1);
    }

    #[tokio::test]
    async fn contend_confirms_the_winner() {
        let engine = engine(&["A"]);
        let report = contend(engine.clone(), Arc::new(SystemClock), SeatId::from("A"), 3, true)
            .await
            .unwrap();

        let confirmed = report.confirmed.unwrap();
        assert_eq!(confirmed.kind, ResultKind::Success);
        assert_eq!(engine.counts().allocated, 1);
    }

    #[tokio::test]
    async fn contend_on_unknown_seat() {
        let report = contend(engine(&["1"]), Arc::new(SystemClock), SeatId::from("9"), 4, true)
            .await
            .unwrap();

        assert!(report.winner.is_none());
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].kind, ResultKind::NotFound);
        assert!(report.confirmed.is_none());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["seatlock", "--lease-secs", "5", "--seats", "a,b,c"]);
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.lease_duration_secs, 5);
        assert_eq!(config.seat_ids, ["a", "b", "c"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_contend() {
        let cli = Cli::parse_from(["seatlock", "-f", "json", "contend", "3", "--callers", "4"]);

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Some(Command::Contend { ref seat, callers: 4, confirm: false }) if seat == "3"
        ));
    }
}
