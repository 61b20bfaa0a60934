mod commands;
mod logging;

use clap::Parser;
use commands::{Command, load_image, print_help};
use config::{AppConfig, load_env_file};
use llm::{GeminiProvider, GroqProvider, ImageData, Mode, Provider};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tutor_core::prompts::title;
use tutor_core::{
    EngineEvent, Message, Router, SYSTEM_INSTRUCTION, Sender, TutorEngine, WELCOME_MESSAGE,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Professor Maior, the study assistant", long_about = None)]
struct Args {
    /// Start in elevated mode (Prof. GIGANTE)
    #[arg(long)]
    elevated: bool,

    /// Mirror logs to stderr
    #[arg(long, short)]
    verbose: bool,

    /// Custom base URL for the Gemini API (e.g., for proxy)
    #[arg(long, env = "GEMINI_BASE_URL")]
    gemini_url: Option<String>,

    /// Custom base URL for the Groq API
    #[arg(long, env = "GROQ_BASE_URL")]
    groq_url: Option<String>,

    /// Solve the exercises in this photo, print the answer and exit
    #[arg(long)]
    image: Option<PathBuf>,
}

fn print_status_bar(mode: Mode) {
    let terminal_width: usize = 80;
    let status = format!(" {} • {} ", title(mode), mode);
    let padding = terminal_width.saturating_sub(status.chars().count());
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;

    println!("┌{}┐", "─".repeat(terminal_width - 2));
    println!("│{}{}{}│", " ".repeat(left_pad), status, " ".repeat(right_pad));
    println!("└{}┘", "─".repeat(terminal_width - 2));
}

fn print_reply(message: &Message) {
    println!("{}", message.text);
    if !message.sources.is_empty() {
        println!();
        println!("Fontes:");
        for source in &message.sources {
            println!("  - {} ({})", source.title, source.uri);
        }
    }
}

fn print_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for message in messages {
        let who = match message.sender {
            Sender::User => "Aluno",
            Sender::Assistant => "Professor",
        };
        let image = if message.image.is_some() { " [imagem]" } else { "" };
        println!(
            "[{}] {}{}: {}",
            message.timestamp.format("%H:%M"),
            who,
            image,
            message.text
        );
    }
}

/// Wait for the engine to finish the current request, printing the reply.
async fn await_reply(engine: &mut TutorEngine) {
    while let Some(event) = engine.next_event().await {
        match event {
            EngineEvent::MessageAdded(message) if message.sender == Sender::Assistant => {
                print_reply(&message);
            }
            EngineEvent::MessageAdded(_) => {}
            EngineEvent::ModeChanged(mode) => {
                tracing::debug!(%mode, "Mode change applied");
            }
            EngineEvent::Error(e) => tracing::warn!("Request failed: {}", e),
            EngineEvent::ReplyComplete => break,
        }
    }
}

fn build_router(config: &AppConfig) -> anyhow::Result<Router> {
    let primary: Arc<dyn Provider> = Arc::new(GeminiProvider::new(&config.gemini, SYSTEM_INSTRUCTION)?);
    let secondary: Arc<dyn Provider> = Arc::new(GroqProvider::new(&config.groq, SYSTEM_INSTRUCTION)?);
    Ok(Router::new(primary, secondary))
}

async fn quick_solve_once(engine: &mut TutorEngine, image: ImageData) -> anyhow::Result<()> {
    engine.send_message(tutor_core::QUICK_SOLVE_PROMPT, Some(image))?;
    await_reply(engine).await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();

    let _log_guard = logging::init_logging(args.verbose);

    let mut config = AppConfig::load();
    if let Some(url) = args.gemini_url {
        config.gemini.settings.base_url = Some(url);
    }
    if let Some(url) = args.groq_url {
        config.groq.settings.base_url = Some(url);
    }
    tracing::debug!(?config, "Configuration loaded");

    let mode = if args.elevated || config.start_elevated {
        Mode::Elevated
    } else {
        Mode::Standard
    };
    let mut engine = TutorEngine::new(build_router(&config)?, mode);

    if let Some(path) = args.image {
        let image = load_image(&path)?;
        return quick_solve_once(&mut engine, image).await;
    }

    println!();
    println!("{}", WELCOME_MESSAGE);
    println!();
    println!("Type /help for commands, Ctrl+D or /quit to exit.");
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_status_bar(engine.mode());
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            None => {
                println!();
                println!("Até à próxima!");
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            let command = match Command::parse(input) {
                Ok(command) => command,
                Err(err) => {
                    println!("{}", err);
                    println!();
                    continue;
                }
            };

            let sent = match command {
                Command::Quit => {
                    println!("Até à próxima!");
                    break;
                }
                Command::Help => {
                    print_help();
                    Ok(false)
                }
                Command::History => {
                    let session = engine.get_session();
                    let session = session.lock().await;
                    print_history(session.conversation().messages());
                    Ok(false)
                }
                Command::ToggleMode => engine.toggle_mode().map(|mode| {
                    println!("Switched to {}", title(mode));
                    false
                }),
                Command::SetMode(mode) => engine.set_mode(mode).map(|_| {
                    println!("Switched to {}", title(mode));
                    false
                }),
                Command::QuickSolve(path) => match load_image(&path) {
                    Ok(image) => engine
                        .send_message(tutor_core::QUICK_SOLVE_PROMPT, Some(image))
                        .map(|_| true),
                    Err(e) => {
                        eprintln!("{}", e);
                        Ok(false)
                    }
                },
                Command::Action(action) => engine.run_action(action).map(|_| true),
            };

            match sent {
                Ok(true) => await_reply(&mut engine).await,
                Ok(false) => {}
                Err(e) => eprintln!("Error: {}", e),
            }
            println!();
            continue;
        }

        match engine.send_message(input, None) {
            Ok(()) => await_reply(&mut engine).await,
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }

    let session = engine.get_session();
    let count = session.lock().await.conversation().len();
    tracing::info!(messages = count, "Session ended");
    Ok(())
}
