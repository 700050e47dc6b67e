//! Socratic hint generation.
//!
//! The tutoring side of the service is an external text-generation
//! collaborator: given the problem, the student's code, and the expected
//! vs. actual output, it returns one Socratic question or hint. The
//! [`HintGenerator`] trait is the single seam: the backing service can be
//! swapped (or stubbed in tests) without touching the compile/run core.
//!
//! [`OpenAiHintGenerator`] is the production implementation, calling the
//! OpenAI chat-completions API over HTTPS.

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

/// Default model used by [`OpenAiHintGenerator`].
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Read-only context backing a single hint request.
///
/// All fields are opaque pass-through text; the core never examines them.
#[derive(Debug, Clone, Default)]
pub struct HintContext {
    /// The question the student is solving.
    pub problem_statement: String,
    /// The student's current code.
    pub code: String,
    /// What the student expects their program to print.
    pub expected_output: String,
    /// What the program actually produced (fresh run or caller-supplied).
    pub actual_output: String,
    /// Previous tutor/student exchanges.
    pub conversation_history: String,
}

impl HintContext {
    /// Render the tutoring prompt for this context.
    fn render_prompt(&self) -> String {
        format!(
            "You are an experienced programming tutor and I am a student asking you for help with my C++ code.\n\
             - Use the Socratic method to ask me one question at a time or give me one hint at a time in order to guide me to discover the answer on my own. Do NOT directly give me the answer. Even if I give up and ask you for the answer, do not give me the answer. Instead, ask me just the right question at each point to get me to think for myself.\n\
             - Do NOT edit my code or write new code for me since that might give away the answer. Instead, give me hints of where to look in my existing code for where the problem might be. You can also print out specific parts of my code to point me in the right direction.\n\
             - Do NOT use advanced concepts that students in an introductory class have not learned yet. Instead, use concepts that are taught in introductory-level classes and beginner-level programming tutorials. Also, prefer the C++ standard library and built-in features over external libraries.\n\
             Here is my C++ code, which uses C++20 with GNU C++ extensions:\n\
             {code}\n\
             Help me fix this bug. I expect to see:\n\
             {expected}\n\
             but instead I see:\n\
             {actual}\n\
             The question I am solving:\n\
             {problem}\n\n\
             Previous conversation:\n\
             {history}\n\n\
             Based on this information, provide a Socratic question or hint to guide the student's thinking:",
            code = self.code,
            expected = self.expected_output,
            actual = self.actual_output,
            problem = self.problem_statement,
            history = self.conversation_history,
        )
    }
}

/// Errors from the hint backend.
///
/// A failed hint is reported as a failure, never silently replaced with
/// fabricated text.
#[derive(Debug, Error)]
pub enum HintError {
    /// The backing service could not be reached (connect/transport error).
    #[error("hint service unreachable: {0}")]
    Unreachable(String),

    /// The backing service answered with a non-success status.
    #[error("hint service returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code from the backend.
        status: u16,
        /// Response body, truncated to something loggable.
        message: String,
    },

    /// The response arrived but did not contain a hint.
    #[error("malformed hint service response: {0}")]
    MalformedResponse(String),
}

/// Capability interface for Socratic hint generation.
#[async_trait]
pub trait HintGenerator: Send + Sync {
    /// Produce one Socratic question or hint for `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`HintError`] if the backing service is unreachable,
    /// rejects the request, or answers with something unusable.
    async fn generate(&self, ctx: &HintContext) -> Result<String, HintError>;
}

/// Hint generator backed by the OpenAI chat-completions API.
pub struct OpenAiHintGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl std::fmt::Debug for OpenAiHintGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the key.
        f.debug_struct("OpenAiHintGenerator")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenAiHintGenerator {
    /// Create a generator using [`DEFAULT_MODEL`] and [`DEFAULT_ENDPOINT`].
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Use a different chat model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different chat-completions endpoint (compatible proxies,
    /// or a local stub in tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl HintGenerator for OpenAiHintGenerator {
    async fn generate(&self, ctx: &HintContext) -> Result<String, HintError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": ctx.render_prompt() }
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HintError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HintError::Api {
                status: status.as_u16(),
                message: truncate(&message, 512),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| HintError::MalformedResponse(e.to_string()))?;

        extract_hint(&payload)
    }
}

/// Pull the assistant text out of a chat-completions response.
fn extract_hint(payload: &Value) -> Result<String, HintError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| {
            HintError::MalformedResponse("response carries no choices[0].message.content".into())
        })
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s[..end].to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn prompt_carries_all_context_fields() {
        let ctx = HintContext {
            problem_statement: "sum two numbers".into(),
            code: "int main() { return 0; }".into(),
            expected_output: "3".into(),
            actual_output: "".into(),
            conversation_history: "student: help".into(),
        };
        let prompt = ctx.render_prompt();

        assert!(prompt.contains("sum two numbers"));
        assert!(prompt.contains("int main() { return 0; }"));
        assert!(prompt.contains("I expect to see:\n3"));
        assert!(prompt.contains("student: help"));
    }

    #[test]
    fn extract_hint_reads_chat_response() {
        let payload = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "What does line 3 do?" } }
            ]
        });
        assert_eq!(extract_hint(&payload).unwrap(), "What does line 3 do?");
    }

    #[test]
    fn extract_hint_rejects_empty_choices() {
        let payload = json!({ "choices": [] });
        assert!(matches!(
            extract_hint(&payload),
            Err(HintError::MalformedResponse(_))
        ));
    }
}
