use serde::{Deserialize, Serialize};

use crate::api::{GenerateRequest, GenerateResult};
use crate::transcript;

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Message {
    pub(crate) role: Role,
    #[serde(default)]
    pub(crate) content: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub(crate) fn build(
        model: &str,
        system_instruction: &str,
        max_tokens: Option<u32>,
        request: &GenerateRequest,
    ) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !system_instruction.is_empty() {
            messages.push(Message {
                role: Role::System,
                content: Some(system_instruction.to_string()),
            });
        }
        messages.push(Message {
            role: Role::User,
            content: Some(transcript::build_prompt(request)),
        });

        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct ChatCompletionChoice {
    #[serde(default)]
    pub(crate) index: u32,
    pub(crate) message: Message,
    #[serde(default)]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) model: Option<String>,
    pub(crate) choices: Vec<ChatCompletionChoice>,
}

impl From<ChatCompletionResponse> for GenerateResult {
    fn from(response: ChatCompletionResponse) -> Self {
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty());

        match text {
            Some(text) => GenerateResult::text(text),
            None => GenerateResult::apology(),
        }
    }
}
