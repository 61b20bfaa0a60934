pub mod conversation;
pub mod engine;
pub mod prompts;
pub mod router;
pub mod session;

#[cfg(test)]
mod testing;

pub use conversation::{Conversation, Message, Sender};
pub use engine::{EngineCommand, EngineEvent, TutorEngine};
pub use prompts::{QUICK_SOLVE_PROMPT, ReplyAction, SYSTEM_INSTRUCTION, WELCOME_MESSAGE};
pub use router::{BACKUP_MARKER, CRITICAL_FAILURE_TEXT, RouteOutcome, Router};
pub use session::TutorSession;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a request is already in progress")]
    Busy,
    #[error("engine task has stopped")]
    Closed,
}
