//! Per-call traffic records for the provider adapters.
//!
//! Nothing is written until a front end calls [`enable`] with a destination.
//! Payloads are cut to a short preview so student conversations stay out of
//! the logs.

use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const PREVIEW_CHARS: usize = 200;

static DESTINATION: OnceLock<PathBuf> = OnceLock::new();

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Request,
    Response,
    Error,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => write!(f, "REQUEST"),
            Direction::Response => write!(f, "RESPONSE"),
            Direction::Error => write!(f, "ERROR"),
        }
    }
}

/// Start appending records to `path`. Only the first call takes effect.
pub fn enable(path: PathBuf) {
    let _ = DESTINATION.set(path);
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}... ({} chars total)", &text[..cut], text.chars().count()),
    }
}

fn payload_preview(payload: &impl Serialize) -> String {
    match serde_json::to_string(payload) {
        Ok(json) => preview(&json),
        Err(e) => format!("<unserializable: {}>", e),
    }
}

fn format_entry(direction: Direction, model: &str, detail: &str) -> String {
    format!(
        "[{}] [TRAFFIC] [{}] [{}] {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        direction,
        model,
        detail
    )
}

fn append(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}

// The detail is only rendered when logging is on.
fn record(direction: Direction, model: &str, detail: impl FnOnce() -> String) {
    let Some(path) = DESTINATION.get() else {
        return;
    };
    if let Err(e) = append(path, &format_entry(direction, model, &detail())) {
        tracing::debug!("Traffic log write to {:?} failed: {}", path, e);
    }
}

pub fn log_request(model: &str, request: &impl Serialize) {
    record(Direction::Request, model, || payload_preview(request));
}

pub fn log_response(model: &str, response: &impl Serialize) {
    record(Direction::Response, model, || payload_preview(response));
}

pub fn log_error(model: &str, error: &str) {
    record(Direction::Error, model, || preview(error));
}
