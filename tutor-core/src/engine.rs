use crate::prompts::ReplyAction;
use crate::{EngineError, Message, RouteOutcome, Router, TutorSession};
use llm::{ImageData, Mode};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

pub enum EngineCommand {
    Send { text: String, image: Option<ImageData> },
    Action(ReplyAction),
    ToggleMode,
    SetMode(Mode),
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A message was appended to the conversation (user or assistant).
    MessageAdded(Message),
    ReplyComplete,
    ModeChanged(Mode),
    Error(String),
}

/// Runs a `TutorSession` on its own task so front ends never block on a
/// provider call. One request is in flight at a time.
pub struct TutorEngine {
    session: Arc<Mutex<TutorSession>>,
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    busy: Arc<AtomicBool>,
    mode: Mode,
    processor_handle: JoinHandle<()>,
}

impl TutorEngine {
    pub fn new(router: Router, mode: Mode) -> Self {
        let session = Arc::new(Mutex::new(TutorSession::new(router, mode)));
        let busy = Arc::new(AtomicBool::new(false));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session_clone = Arc::clone(&session);
        let busy_clone = Arc::clone(&busy);
        let processor_handle = tokio::spawn(async move {
            Self::processor_loop(session_clone, busy_clone, cmd_rx, event_tx).await;
        });

        Self {
            session,
            cmd_tx,
            event_rx,
            busy,
            mode,
            processor_handle,
        }
    }

    async fn processor_loop(
        session: Arc<Mutex<TutorSession>>,
        busy: Arc<AtomicBool>,
        mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>,
        event_tx: mpsc::UnboundedSender<EngineEvent>,
    ) {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                EngineCommand::Send { text, image } => {
                    Self::process_exchange(&session, text, image, &event_tx).await;
                    busy.store(false, Ordering::SeqCst);
                    let _ = event_tx.send(EngineEvent::ReplyComplete);
                }
                EngineCommand::Action(action) => {
                    Self::process_exchange(&session, action.prompt().to_string(), None, &event_tx)
                        .await;
                    busy.store(false, Ordering::SeqCst);
                    let _ = event_tx.send(EngineEvent::ReplyComplete);
                }
                EngineCommand::ToggleMode => {
                    let mode = session.lock().await.toggle_mode();
                    let _ = event_tx.send(EngineEvent::ModeChanged(mode));
                }
                EngineCommand::SetMode(mode) => {
                    session.lock().await.set_mode(mode);
                    let _ = event_tx.send(EngineEvent::ModeChanged(mode));
                }
            }
        }
    }

    async fn process_exchange(
        session: &Mutex<TutorSession>,
        text: String,
        image: Option<ImageData>,
        event_tx: &mpsc::UnboundedSender<EngineEvent>,
    ) {
        // 1. Append the question and build the request under a short lock
        let (request, router) = {
            let mut sess = session.lock().await;
            let request = sess.begin(text, image);
            if let Some(question) = sess.conversation().last() {
                let _ = event_tx.send(EngineEvent::MessageAdded(question.clone()));
            }
            (request, sess.router())
        };

        // 2. Route WITHOUT holding the session lock
        let (result, outcome) = router.route_with_outcome(&request).await;

        // 3. Append the reply
        let reply = session.lock().await.finish(result, outcome).clone();
        let _ = event_tx.send(EngineEvent::MessageAdded(reply));
        if outcome == RouteOutcome::Failed {
            let _ = event_tx.send(EngineEvent::Error("no provider answered".to_string()));
        }
    }

    fn begin_request(&self, cmd: EngineCommand) -> Result<(), EngineError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::Busy);
        }
        if self.cmd_tx.send(cmd).is_err() {
            self.busy.store(false, Ordering::SeqCst);
            return Err(EngineError::Closed);
        }
        Ok(())
    }

    /// Queue a question. Fails with `Busy` while a previous one is unanswered.
    pub fn send_message(
        &self,
        text: impl Into<String>,
        image: Option<ImageData>,
    ) -> Result<(), EngineError> {
        self.begin_request(EngineCommand::Send {
            text: text.into(),
            image,
        })
    }

    pub fn run_action(&self, action: ReplyAction) -> Result<(), EngineError> {
        self.begin_request(EngineCommand::Action(action))
    }

    pub fn toggle_mode(&mut self) -> Result<Mode, EngineError> {
        self.cmd_tx
            .send(EngineCommand::ToggleMode)
            .map_err(|_| EngineError::Closed)?;
        self.mode = self.mode.toggled();
        Ok(self.mode)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::SetMode(mode))
            .map_err(|_| EngineError::Closed)?;
        self.mode = mode;
        Ok(())
    }

    /// Mode that the next queued request will be sent with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }

    pub fn get_session(&self) -> Arc<Mutex<TutorSession>> {
        Arc::clone(&self.session)
    }
}

impl Drop for TutorEngine {
    fn drop(&mut self) {
        self.processor_handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Sender;
    use crate::router::BACKUP_MARKER;
    use crate::testing::ScriptedProvider;
    use llm::GenerateResult;
    use std::time::Duration;

    async fn until_complete(engine: &mut TutorEngine) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Some(event) = engine.next_event().await {
            let done = matches!(event, EngineEvent::ReplyComplete);
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn test_send_emits_both_messages() {
        let primary = ScriptedProvider::answering("gemini", GenerateResult::text("Olá!"));
        let secondary = ScriptedProvider::failing("groq");
        let mut engine = TutorEngine::new(Router::new(primary, secondary), Mode::Standard);

        engine.send_message("Olá", None).unwrap();
        let events = until_complete(&mut engine).await;

        let added: Vec<&Message> = events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::MessageAdded(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].sender, Sender::User);
        assert_eq!(added[0].text, "Olá");
        assert_eq!(added[1].sender, Sender::Assistant);
        assert_eq!(added[1].text, "Olá!");
        assert!(!engine.is_busy());
        assert_eq!(engine.get_session().lock().await.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_second_send_rejected_while_busy() {
        let primary = ScriptedProvider::slow(
            "gemini",
            GenerateResult::text("devagar"),
            Duration::from_millis(200),
        );
        let secondary = ScriptedProvider::failing("groq");
        let mut engine = TutorEngine::new(Router::new(primary.clone(), secondary), Mode::Standard);

        engine.send_message("primeira", None).unwrap();
        assert!(engine.is_busy());
        assert!(matches!(
            engine.send_message("segunda", None),
            Err(EngineError::Busy)
        ));
        assert!(matches!(
            engine.run_action(ReplyAction::Quiz),
            Err(EngineError::Busy)
        ));

        until_complete(&mut engine).await;
        assert!(!engine.is_busy());
        assert_eq!(primary.call_count(), 1);

        engine.send_message("segunda", None).unwrap();
        until_complete(&mut engine).await;
        assert_eq!(primary.call_count(), 2);
    }

    #[tokio::test]
    async fn test_toggle_mode_applies_to_next_request() {
        let primary = ScriptedProvider::failing("gemini");
        let secondary = ScriptedProvider::answering("groq", GenerateResult::text("backup"));
        let mut engine =
            TutorEngine::new(Router::new(primary.clone(), secondary.clone()), Mode::Standard);

        assert_eq!(engine.toggle_mode().unwrap(), Mode::Elevated);
        assert_eq!(engine.mode(), Mode::Elevated);
        match engine.next_event().await {
            Some(EngineEvent::ModeChanged(mode)) => assert_eq!(mode, Mode::Elevated),
            other => panic!("unexpected event: {:?}", other),
        }

        engine.send_message("prova", None).unwrap();
        until_complete(&mut engine).await;
        assert_eq!(secondary.call_count(), 0);
        assert_eq!(primary.requests()[0].mode, Mode::Elevated);

        engine.set_mode(Mode::Standard).unwrap();
        engine.send_message("outra", None).unwrap();
        let events = until_complete(&mut engine).await;
        let reply = events.iter().rev().find_map(|e| match e {
            EngineEvent::MessageAdded(m) if m.sender == Sender::Assistant => Some(m),
            _ => None,
        });
        assert!(reply.unwrap().text.starts_with(BACKUP_MARKER));
    }

    #[tokio::test]
    async fn test_failed_route_reports_error() {
        let primary = ScriptedProvider::failing("gemini");
        let secondary = ScriptedProvider::failing("groq");
        let mut engine = TutorEngine::new(Router::new(primary, secondary), Mode::Standard);

        engine.send_message("oi", None).unwrap();
        let events = until_complete(&mut engine).await;

        assert!(events.iter().any(|e| matches!(e, EngineEvent::Error(_))));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::MessageAdded(m) if m.text == crate::CRITICAL_FAILURE_TEXT
        )));
    }

    #[tokio::test]
    async fn test_action_follows_previous_reply() {
        let primary = ScriptedProvider::answering("gemini", GenerateResult::text("quiz"));
        let secondary = ScriptedProvider::failing("groq");
        let mut engine = TutorEngine::new(Router::new(primary.clone(), secondary), Mode::Standard);

        engine.send_message("Os Lusíadas", None).unwrap();
        until_complete(&mut engine).await;
        engine.run_action(ReplyAction::Quiz).unwrap();
        until_complete(&mut engine).await;

        let requests = primary.requests();
        assert_eq!(requests[1].prompt, ReplyAction::Quiz.prompt());
        assert_eq!(requests[1].history.len(), 2);
    }

    #[tokio::test]
    async fn test_conversation_readable_while_request_in_flight() {
        let primary = ScriptedProvider::slow(
            "gemini",
            GenerateResult::text("devagar"),
            Duration::from_millis(500),
        );
        let secondary = ScriptedProvider::failing("groq");
        let mut engine = TutorEngine::new(Router::new(primary, secondary), Mode::Standard);

        engine.send_message("primeira", None).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(engine.is_busy());

        let session = engine.get_session();
        let guard = tokio::time::timeout(Duration::from_millis(200), session.lock())
            .await
            .expect("session is locked during the provider call");
        assert_eq!(guard.conversation().len(), 1);
        assert_eq!(guard.conversation().messages()[0].sender, Sender::User);
        drop(guard);

        until_complete(&mut engine).await;
        assert_eq!(session.lock().await.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_send_after_processor_stops_reports_closed() {
        let primary = ScriptedProvider::answering("gemini", GenerateResult::text("ok"));
        let secondary = ScriptedProvider::failing("groq");
        let mut engine = TutorEngine::new(Router::new(primary.clone(), secondary), Mode::Standard);

        engine.processor_handle.abort();
        let _ = (&mut engine.processor_handle).await;

        assert!(matches!(
            engine.send_message("oi", None),
            Err(EngineError::Closed)
        ));
        assert!(!engine.is_busy());
        assert!(matches!(engine.toggle_mode(), Err(EngineError::Closed)));
        assert_eq!(engine.mode(), Mode::Standard);
        assert_eq!(primary.call_count(), 0);
    }
}
