//! Wire format of the OpenAI-compatible `/completions` endpoint

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionChoice {
    #[serde(default)]
    pub text: String,
}

impl CompletionResponse {
    /// First choice, whitespace-trimmed; blank text counts as missing
    pub fn into_paragraph(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }
}
