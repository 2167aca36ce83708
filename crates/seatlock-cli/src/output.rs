//! Table and JSON output formatting.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use seatlock_core::{SeatCounts, SeatStatus};

use crate::response::Response;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// `{"1": {"status": "available"}, ...}` in provisioning order.
pub struct SeatsBody<'a>(pub &'a [SeatStatus]);

impl Serialize for SeatsBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            status: &'a str,
        }

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for seat in self.0 {
            map.serialize_entry(
                seat.seat_id.as_str(),
                &Entry {
                    status: seat.state.as_str(),
                },
            )?;
        }
        map.end()
    }
}

pub fn render_seats(seats: &[SeatStatus], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if seats.is_empty() {
                return "No seats provisioned.".to_string();
            }
            let width = seats
                .iter()
                .map(|s| s.seat_id.as_str().len())
                .max()
                .unwrap_or(0)
                .max("SEAT".len());
            let mut out = format!("{:<width$}  STATUS", "SEAT");
            for seat in seats {
                out.push_str(&format!("\n{:<width$}  {}", seat.seat_id.as_str(), seat.state));
            }
            out
        }
        OutputFormat::Json => to_json(&SeatsBody(seats), "{}"),
    }
}

pub fn render_counts(counts: &SeatCounts, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format!(
            "available: {}  held: {}  allocated: {}  (total {})",
            counts.available,
            counts.held,
            counts.allocated,
            counts.total()
        ),
        OutputFormat::Json => to_json(counts, "{}"),
    }
}

pub fn render_response(response: &Response, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format!("[{}] {}", response.status, response.message),
        OutputFormat::Json => to_json(response, "{}"),
    }
}

pub fn render<T: Serialize>(item: &T, text: impl FnOnce() -> String, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => text(),
        OutputFormat::Json => to_json(item, "{}"),
    }
}

fn to_json<T: Serialize + ?Sized>(item: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(item).unwrap_or_else(|_| fallback.to_string())
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}
