//! Progress and result rendering

use bgdl_events::ProgressSnapshot;
use console::{Style, Term};
use serde_json::json;
use std::io;

/// Renders one download's progress to the terminal, or as JSON lines
#[derive(Clone)]
pub struct ProgressRenderer {
    json_output: bool,
    colors_enabled: bool,
    term: Term,
}

impl ProgressRenderer {
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
            term: Term::stderr(),
        }
    }

    pub fn progress(&self, progress: &ProgressSnapshot) -> io::Result<()> {
        if self.json_output {
            println!(
                "{}",
                json!({
                    "event": "progress",
                    "bytesReceived": progress.bytes_received,
                    "totalBytesToReceive": progress.total_bytes_to_receive,
                })
            );
            return Ok(());
        }

        let line = match (progress.total_bytes_to_receive, progress.fraction()) {
            (Some(total), Some(fraction)) => format!(
                "{} / {} ({:.0}%)",
                format_bytes(progress.bytes_received),
                format_bytes(total),
                fraction * 100.0
            ),
            _ => format_bytes(progress.bytes_received),
        };
        self.term.clear_line()?;
        self.term.write_str(&line)
    }

    pub fn completed(&self, source: &str, destination: &str) -> io::Result<()> {
        if self.json_output {
            println!(
                "{}",
                json!({"event": "completed", "source": source, "destination": destination})
            );
            return Ok(());
        }

        self.term.clear_line()?;
        let style = if self.colors_enabled {
            Style::new().green().bold()
        } else {
            Style::new()
        };
        self.term
            .write_line(&format!("{} {source} -> {destination}", style.apply_to("Downloaded")))
    }

    /// Move past the in-place progress line before an error is printed
    pub fn interrupt(&self) -> io::Result<()> {
        if self.json_output {
            return Ok(());
        }
        self.term.clear_line()
    }
}

/// Human-readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    // Display precision only
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}
