// Slash command parsing and image loading for the REPL.

use llm::{DEFAULT_IMAGE_MIME_TYPE, ImageData, Mode};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tutor_core::ReplyAction;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    History,
    ToggleMode,
    SetMode(Mode),
    QuickSolve(PathBuf),
    Action(ReplyAction),
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, String> {
        let Some(rest) = input.strip_prefix('/') else {
            return Err("Not a command".to_string());
        };
        let rest = rest.trim_start();

        let parts: Vec<&str> = rest.split_whitespace().collect();
        if parts.is_empty() {
            return Err("Empty command".to_string());
        }

        match parts[0] {
            "quit" | "exit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "history" => Ok(Command::History),
            "giga" => Ok(Command::ToggleMode),
            "mode" => {
                if parts.len() < 2 {
                    return Err("Usage: /mode <standard|elevated>".to_string());
                }
                Mode::from_str(parts[1]).map(Command::SetMode)
            }
            "image" | "tira20" => {
                // Paths may contain spaces
                let path = rest[parts[0].len()..].trim();
                if path.is_empty() {
                    return Err("Usage: /image <path>".to_string());
                }
                Ok(Command::QuickSolve(PathBuf::from(path)))
            }
            "summarize" | "resumir" | "quiz" => parts[0].parse().map(Command::Action),
            _ => Err(format!(
                "Unknown command: /{}. Type /help for available commands.",
                parts[0]
            )),
        }
    }
}

pub fn print_help() {
    println!("Available commands:");
    println!("  /quit, /exit           - Exit the chat");
    println!("  /giga                  - Toggle elevated mode (Prof. GIGANTE)");
    println!("  /mode <mode>           - Set mode (standard, elevated)");
    println!("  /image <path>          - Solve the exercises in a photo (Tira 20s)");
    println!("  /summarize             - Summarize the last explanation");
    println!("  /quiz                  - Quiz on the last explanation");
    println!("  /history               - Show the conversation so far");
    println!("  /help                  - Show this help message");
    println!("  Ctrl+D                 - Exit the chat");
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => DEFAULT_IMAGE_MIME_TYPE,
    }
}

/// Read a picture from disk as a data URI.
pub fn load_image(path: &Path) -> anyhow::Result<ImageData> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read image {}: {}", path.display(), e))?;
    Ok(ImageData::from_bytes(mime_type_for(path), &bytes))
}
