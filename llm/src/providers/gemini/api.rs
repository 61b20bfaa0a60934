use serde::{Deserialize, Serialize};

use super::provider::GeminiCallConfig;
use crate::api::{GenerateRequest, GenerateResult, Source};
use crate::transcript;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    User,
    Model,
}

/// Gemini inline data for images
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub(crate) mime_type: String,
    pub(crate) data: String, // base64-encoded
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<Role>,
    pub(crate) parts: Vec<Part>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct GoogleSearch {}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Tool {
    GoogleSearch(GoogleSearch),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThinkingConfig {
    pub(crate) thinking_budget: u32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) thinking_config: Option<ThinkingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.thinking_config.is_none() && self.max_output_tokens.is_none()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tools: Option<Vec<Tool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// One user turn: the image first (if any), then the transcript text.
    pub(crate) fn build(
        system_instruction: &str,
        call: &GeminiCallConfig,
        request: &GenerateRequest,
    ) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &request.image {
            let inline = image.parse();
            parts.push(Part::InlineData(InlineData {
                mime_type: inline.mime_type,
                data: inline.data,
            }));
        }
        parts.push(Part::Text(transcript::build_prompt(request)));

        let system_instruction = (!system_instruction.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::Text(system_instruction.to_string())],
        });

        let generation_config = GenerationConfig {
            thinking_config: call
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            max_output_tokens: call.max_output_tokens,
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some(Role::User),
                parts,
            }],
            tools: call
                .google_search
                .then(|| vec![Tool::GoogleSearch(GoogleSearch::default())]),
            system_instruction,
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
        }
    }
}

// Response side. Unknown part kinds (thought signatures, code execution, ...)
// are ignored rather than failing the whole decode.

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponsePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) thought: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub(crate) parts: Vec<ResponsePart>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct WebChunk {
    #[serde(default)]
    pub(crate) uri: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct GroundingChunk {
    #[serde(default)]
    pub(crate) web: Option<WebChunk>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroundingMetadata {
    #[serde(default)]
    pub(crate) grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<ResponseContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) grounding_metadata: Option<GroundingMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

impl From<GenerateContentResponse> for GenerateResult {
    fn from(response: GenerateContentResponse) -> Self {
        let Some(candidate) = response.candidates.into_iter().next() else {
            return GenerateResult::apology();
        };

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|p| p.thought != Some(true))
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        let sources = candidate
            .grounding_metadata
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web)
                    .map(|web| Source {
                        uri: web.uri.unwrap_or_default(),
                        title: web.title.unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            GenerateResult::apology().with_sources(sources)
        } else {
            GenerateResult::text(text).with_sources(sources)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ImageData, Mode, APOLOGY_TEXT};

    fn flash(google_search: bool) -> GeminiCallConfig {
        GeminiCallConfig {
            model: "gemini-2.5-flash".to_string(),
            thinking_budget: None,
            google_search,
            max_output_tokens: None,
        }
    }

    #[test]
    fn test_standard_request_serialization() {
        let request = GenerateRequest::new("Quem foi Camões?", Mode::Standard);
        let body = GenerateContentRequest::build("persona", &flash(true), &request);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [{"text": "Pergunta do Aluno: Quem foi Camões?"}]
                }],
                "tools": [{"googleSearch": {}}],
                "systemInstruction": {"parts": [{"text": "persona"}]}
            })
        );
    }

    #[test]
    fn test_image_part_precedes_text() {
        let request = GenerateRequest::new("resolve", Mode::Standard)
            .with_image(ImageData::new("data:image/png;base64,iVBOR"));
        let body = GenerateContentRequest::build("persona", &flash(false), &request);
        let json = serde_json::to_value(&body).unwrap();

        assert!(json.get("tools").is_none());
        assert_eq!(
            json["contents"][0]["parts"][0],
            serde_json::json!({"inlineData": {"mimeType": "image/png", "data": "iVBOR"}})
        );
        assert_eq!(
            json["contents"][0]["parts"][1]["text"],
            "Pergunta do Aluno: resolve"
        );
    }

    #[test]
    fn test_generation_config_carries_thinking_budget() {
        let call = GeminiCallConfig {
            model: "gemini-2.5-pro".to_string(),
            thinking_budget: Some(32768),
            google_search: false,
            max_output_tokens: Some(2048),
        };
        let request = GenerateRequest::new("prova", Mode::Elevated);
        let json = serde_json::to_value(GenerateContentRequest::build("", &call, &request)).unwrap();

        assert_eq!(
            json["generationConfig"],
            serde_json::json!({"thinkingConfig": {"thinkingBudget": 32768}, "maxOutputTokens": 2048})
        );
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_text_and_sources() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "a pensar...", "thought": true},
                        {"text": "Luís de Camões "},
                        {"text": "foi um poeta.", "thoughtSignature": "abc"}
                    ]
                },
                "finishReason": "STOP",
                "groundingMetadata": {
                    "webSearchQueries": ["camões"],
                    "groundingChunks": [
                        {"web": {"uri": "https://pt.wikipedia.org/wiki/Camões", "title": "wikipedia.org"}},
                        {"retrievedContext": {"uri": "ignored"}},
                        {"web": {"uri": "https://pt.wikipedia.org/wiki/Camões", "title": "wikipedia.org"}}
                    ]
                }
            }],
            "usageMetadata": {"totalTokenCount": 42}
        }))
        .unwrap();

        let result = GenerateResult::from(response);
        assert_eq!(result.text, "Luís de Camões foi um poeta.");
        assert_eq!(result.sources.len(), 2, "duplicates are kept");
        assert_eq!(result.sources[0].title, "wikipedia.org");
    }

    #[test]
    fn test_missing_text_becomes_apology() {
        let blocked: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert_eq!(GenerateResult::from(blocked).text, APOLOGY_TEXT);

        let empty: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"promptFeedback": {}})).unwrap();
        let result = GenerateResult::from(empty);
        assert_eq!(result.text, APOLOGY_TEXT);
        assert!(result.sources.is_empty());
    }
}
