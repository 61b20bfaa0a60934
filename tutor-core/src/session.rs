//! A tutoring session: conversation, current mode and the router that answers.

use crate::conversation::{Conversation, Message};
use crate::prompts::{QUICK_SOLVE_PROMPT, ReplyAction};
use crate::router::{RouteOutcome, Router};
use llm::{GenerateRequest, GenerateResult, ImageData, Mode};

pub struct TutorSession {
    conversation: Conversation,
    mode: Mode,
    router: Router,
    last_outcome: Option<RouteOutcome>,
}

impl TutorSession {
    pub fn new(router: Router, mode: Mode) -> Self {
        TutorSession {
            conversation: Conversation::new(),
            mode,
            router,
            last_outcome: None,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::info!(from = %self.mode, to = %mode, "Mode changed");
        }
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn last_outcome(&self) -> Option<RouteOutcome> {
        self.last_outcome
    }

    /// Append the user's message and build the request for it.
    ///
    /// The history handed to the providers is taken before the user message
    /// is appended, so it never contains the question being answered.
    pub fn begin(&mut self, text: impl Into<String>, image: Option<ImageData>) -> GenerateRequest {
        let text = text.into();
        let history = self.conversation.history();

        let mut request = GenerateRequest::new(text.clone(), self.mode).with_history(history);
        if let Some(image) = &image {
            request = request.with_image(image.clone());
        }

        self.conversation.push(Message::user(text, image));
        request
    }

    /// Append the routed answer to the request opened by [`Self::begin`].
    pub fn finish(&mut self, result: GenerateResult, outcome: RouteOutcome) -> &Message {
        tracing::debug!(?outcome, sources = result.sources.len(), "Reply received");
        self.last_outcome = Some(outcome);
        self.conversation.push(Message::assistant(result))
    }

    /// Handle on the router, for callers that route outside a borrow of the session.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Append the user's message, ask the router, append the reply.
    pub async fn send(&mut self, text: impl Into<String>, image: Option<ImageData>) -> &Message {
        let request = self.begin(text, image);
        let (result, outcome) = self.router.route_with_outcome(&request).await;
        self.finish(result, outcome)
    }

    /// Send a photo of an exercise with the quick-solve prompt.
    pub async fn quick_solve(&mut self, image: ImageData) -> &Message {
        self.send(QUICK_SOLVE_PROMPT, Some(image)).await
    }

    /// Follow up on the previous reply with a canned prompt.
    pub async fn act(&mut self, action: ReplyAction) -> &Message {
        self.send(action.prompt(), None).await
    }
}
