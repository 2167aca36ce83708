//! Interactive session: one caller identity, many commands, one engine.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use seatlock_core::{HolderId, ReservationEngine, SeatCounts, SeatId, SeatStatus};

use crate::commands::CliError;
use crate::output::{self, OutputFormat};
use crate::response::{self, Response};

const HELP: &str = "\
Commands:
  seats                 list every seat and its status
  status <seat>         show one seat
  lock <seat> [user]    lock a seat (as yourself unless a user is given)
  confirm <seat> [user] book a seat you have locked
  release <seat> [user] give up a lock
  counts                seats per status
  user <token>          switch the identity used by this session
  whoami                show the identity used by this session
  help                  show this help
  exit                  leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Seats,
    Status(SeatId),
    Lock(SeatId, Option<HolderId>),
    Confirm(SeatId, Option<HolderId>),
    Release(SeatId, Option<HolderId>),
    Counts,
    SwitchUser(HolderId),
    WhoAmI,
    Help,
    Exit,
}

impl ReplCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        let extra = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments for '{verb}'"));
        }

        let seat = |name: &str| {
            arg.map(SeatId::from)
                .ok_or_else(|| format!("usage: {name} <seat>"))
        };
        let holder = extra.map(HolderId::from);

        let command = match verb.to_ascii_lowercase().as_str() {
            "seats" | "ls" => Self::Seats,
            "status" => Self::Status(seat("status")?),
            "lock" => Self::Lock(seat("lock")?, holder),
            "confirm" | "book" => Self::Confirm(seat("confirm")?, holder),
            "release" | "unlock" => Self::Release(seat("release")?, holder),
            "counts" => Self::Counts,
            "user" => Self::SwitchUser(
                arg.map(HolderId::from)
                    .ok_or_else(|| "usage: user <token>".to_string())?,
            ),
            "whoami" => Self::WhoAmI,
            "help" | "?" => Self::Help,
            "exit" | "quit" => Self::Exit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

/// What one command produced, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Response(Response),
    Seats(Vec<SeatStatus>),
    Counts(SeatCounts),
    Text(String),
    Exit,
}

pub struct Session {
    engine: Arc<ReservationEngine>,
    holder: HolderId,
}

impl Session {
    pub fn new(engine: Arc<ReservationEngine>, holder: HolderId) -> Self {
        Self { engine, holder }
    }

    pub fn holder(&self) -> &HolderId {
        &self.holder
    }

    pub fn handle(&mut self, command: ReplCommand) -> Reply {
        match command {
            ReplCommand::Seats => Reply::Seats(self.engine.query()),
            ReplCommand::Status(seat) => {
                Reply::Response(response::status(&seat, &self.engine.status(&seat)))
            }
            ReplCommand::Lock(seat, as_holder) => {
                let holder = as_holder.unwrap_or_else(|| self.holder.clone());
                let result = self.engine.acquire(&seat, &holder);
                let lease_secs = self.engine.lease_duration().num_seconds();
                Reply::Response(response::lock(&seat, &result, lease_secs))
            }
            ReplCommand::Confirm(seat, as_holder) => {
                let holder = as_holder.unwrap_or_else(|| self.holder.clone());
                Reply::Response(response::confirm(&seat, &self.engine.confirm(&seat, &holder)))
            }
            ReplCommand::Release(seat, as_holder) => {
                let holder = as_holder.unwrap_or_else(|| self.holder.clone());
                Reply::Response(response::release(&seat, &self.engine.release(&seat, &holder)))
            }
            ReplCommand::Counts => Reply::Counts(self.engine.counts()),
            ReplCommand::SwitchUser(holder) => {
                self.holder = holder;
                Reply::Text(format!("Now acting as {}.", self.holder))
            }
            ReplCommand::WhoAmI => Reply::Text(format!("You are {}.", self.holder)),
            ReplCommand::Help => Reply::Text(HELP.to_string()),
            ReplCommand::Exit => Reply::Exit,
        }
    }
}

fn render(reply: &Reply, format: OutputFormat) -> String {
    match reply {
        Reply::Response(response) => output::render_response(response, format),
        Reply::Seats(seats) => output::render_seats(seats, format),
        Reply::Counts(counts) => output::render_counts(counts, format),
        Reply::Text(text) => text.clone(),
        Reply::Exit => String::new(),
    }
}

pub async fn run(
    engine: Arc<ReservationEngine>,
    holder: HolderId,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut session = Session::new(engine, holder);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Seat Booking System");
    println!("Acting as {}. Type 'help' for commands.", session.holder());

    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match ReplCommand::parse(&line) {
            Ok(None) => {}
            Ok(Some(command)) => {
                let reply = session.handle(command);
                if reply == Reply::Exit {
                    break;
                }
                println!("{}", render(&reply, format));
            }
            Err(message) => output::print_error(&message),
        }
    }

    tracing::debug!(holder = %session.holder(), "session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use seatlock_core::ports::FixedClock;
    use seatlock_core::{ResultKind, SeatState};
    use std::time::Duration;

    fn session() -> (Session, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ));
        let engine = ReservationEngine::builder()
            .seats(["1", "2", "3"])
            .lease_duration(Duration::from_secs(60))
            .clock(clock.clone())
            .build()
            .unwrap();
        (Session::new(Arc::new(engine), HolderId::from("SimulatedUser")), clock)
    }

    fn kind(reply: Reply) -> ResultKind {
        match reply {
            Reply::Response(response) => response.kind,
            other => panic!("expected a response, got {other:?}"),
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(ReplCommand::parse("  "), Ok(None));
        assert_eq!(ReplCommand::parse("seats"), Ok(Some(ReplCommand::Seats)));
        assert_eq!(
            ReplCommand::parse("LOCK 3"),
            Ok(Some(ReplCommand::Lock(SeatId::from("3"), None)))
        );
        assert_eq!(
            ReplCommand::parse("confirm 3 alice"),
            Ok(Some(ReplCommand::Confirm(
                SeatId::from("3"),
                Some(HolderId::from("alice"))
            )))
        );
        assert!(ReplCommand::parse("lock").is_err());
        assert!(ReplCommand::parse("lock 1 a b").is_err());
        assert!(ReplCommand::parse("fly 1").is_err());
    }

    #[test]
    fn session_walks_the_booking_flow() {
        let (mut s, _clock) = session();

        assert_eq!(kind(s.handle(ReplCommand::Lock(SeatId::from("1"), None))), ResultKind::Success);
        assert_eq!(
            kind(s.handle(ReplCommand::Lock(SeatId::from("1"), Some(HolderId::from("other"))))),
            ResultKind::Conflict
        );
        assert_eq!(kind(s.handle(ReplCommand::Lock(SeatId::from("1"), None))), ResultKind::Refreshed);
        assert_eq!(kind(s.handle(ReplCommand::Confirm(SeatId::from("1"), None))), ResultKind::Success);

        let Reply::Seats(seats) = s.handle(ReplCommand::Seats) else {
            panic!("expected seats");
        };
        assert_eq!(seats[0].state, SeatState::Allocated);
    }

    #[test]
    fn session_lock_expires() {
        let (mut s, clock) = session();
        s.handle(ReplCommand::Lock(SeatId::from("2"), None));
        clock.advance(TimeDelta::seconds(61));

        let reply = s.handle(ReplCommand::Confirm(SeatId::from("2"), None));
        let Reply::Response(response) = reply else {
            panic!("expected a response");
        };
        assert_eq!(response.status, 400);
        assert_eq!(response.message, "Seat is not locked and cannot be booked");
    }

    #[test]
    fn switching_user_changes_the_holder() {
        let (mut s, _clock) = session();
        s.handle(ReplCommand::Lock(SeatId::from("3"), None));
        s.handle(ReplCommand::SwitchUser(HolderId::from("bob")));

        assert_eq!(s.holder(), &HolderId::from("bob"));
        assert_eq!(kind(s.handle(ReplCommand::Confirm(SeatId::from("3"), None))), ResultKind::InvalidState);
        assert_eq!(kind(s.handle(ReplCommand::Status(SeatId::from("9")))), ResultKind::NotFound);
    }
}
