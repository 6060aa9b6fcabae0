//! Chat-completions wire types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: [Message<'a>; 2],
    pub(crate) temperature: f32,
    pub(crate) top_p: f32,
    pub(crate) max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Message<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

impl<'a> Message<'a> {
    pub(crate) fn system(content: &'a str) -> Self {
        Self { role: "system", content }
    }

    pub(crate) fn user(content: &'a str) -> Self {
        Self { role: "user", content }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub(crate) choices: Vec<Choice>,
}

impl CompletionResponse {
    /// Text of the first choice, if it carries any
    pub(crate) fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    pub(crate) message: ReplyMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReplyMessage {
    /// Null when the model only made tool calls or was filtered
    #[serde(default)]
    pub(crate) content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiError {
    pub(crate) error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    pub(crate) message: String,
}
