use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned when a provider answers without any usable text.
pub const APOLOGY_TEXT: &str = "Peço desculpa, mas não consegui processar a resposta.";

/// Returned when a provider has no credentials configured.
pub const CONFIGURATION_ERROR_TEXT: &str =
    "⚠️ Erro de configuração: Por favor, contacta o administrador.";

/// Assumed when an image data URI does not declare its media type.
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// User-selected tier. `Elevated` picks the high-reasoning model.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    #[serde(alias = "giga")]
    Elevated,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Standard => Mode::Elevated,
            Mode::Elevated => Mode::Standard,
        }
    }

    pub fn is_elevated(self) -> bool {
        self == Mode::Elevated
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Standard => write!(f, "standard"),
            Mode::Elevated => write!(f, "elevated"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Mode::Standard),
            "elevated" | "giga" => Ok(Mode::Elevated),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A prior message as seen by a provider.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

impl HistoryTurn {
    pub fn user(text: impl Into<String>) -> Self {
        HistoryTurn {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        HistoryTurn {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Image attached to a request, kept as a `data:<mime>;base64,<payload>` URI.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageData(String);

/// Media type and base64 payload extracted from an [`ImageData`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl ImageData {
    pub fn new(data_uri: impl Into<String>) -> Self {
        ImageData(data_uri.into())
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        ImageData(format!("data:{};base64,{}", mime_type, BASE64.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the URI into media type and payload.
    ///
    /// Anything that is not `data:<mime>;base64,<payload>` is treated as a
    /// JPEG, with a leading `data:image/<word>;base64,` header removed if one
    /// is present.
    pub fn parse(&self) -> InlineImage {
        if let Some((mime_type, data)) = self
            .0
            .strip_prefix("data:")
            .and_then(|rest| rest.rsplit_once(";base64,"))
        {
            if !mime_type.is_empty() && !data.is_empty() {
                return InlineImage {
                    mime_type: mime_type.to_string(),
                    data: data.to_string(),
                };
            }
        }

        InlineImage {
            mime_type: DEFAULT_IMAGE_MIME_TYPE.to_string(),
            data: strip_image_header(&self.0).to_string(),
        }
    }
}

fn strip_image_header(uri: &str) -> &str {
    let Some(rest) = uri.strip_prefix("data:image/") else {
        return uri;
    };
    match rest.split_once(";base64,") {
        Some((subtype, payload))
            if !subtype.is_empty()
                && subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            payload
        }
        _ => uri,
    }
}

/// A web source cited by a grounded answer.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// One generation request, built fresh for every send.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub image: Option<ImageData>,
    pub mode: Mode,
    /// Prior messages, oldest first. Never includes the prompt being answered.
    pub history: Vec<HistoryTurn>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>, mode: Mode) -> Self {
        GenerateRequest {
            prompt: prompt.into(),
            image: None,
            mode,
            history: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Normalised answer shared by every provider.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct GenerateResult {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl GenerateResult {
    pub fn text(text: impl Into<String>) -> Self {
        GenerateResult {
            text: text.into(),
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    pub fn apology() -> Self {
        Self::text(APOLOGY_TEXT)
    }

    pub fn configuration_error() -> Self {
        Self::text(CONFIGURATION_ERROR_TEXT)
    }
}
