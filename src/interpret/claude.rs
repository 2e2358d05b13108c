// LogLens - GPL-3.0-or-later
// This file is part of LogLens.
//
// Copyright (C) 2026 Daniel Freiermuth
//
// LogLens is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// LogLens is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with LogLens.  If not, see <https://www.gnu.org/licenses/>.

//! Fallback handler backed by the Anthropic Messages API.

use super::{FallbackError, FallbackHandler};
use serde_json::{json, Value};

pub const DEFAULT_MODEL: &str = "claude-opus-5";

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You answer questions about a single structured log event. \
Use only the event context provided; say so plainly when the context does not contain \
the answer. Keep responses short.";

/// Asks Claude about a log line when no command matched
pub struct ClaudeHandler {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl ClaudeHandler {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Build a handler from `ANTHROPIC_API_KEY`, or `None` when unset
    pub fn from_env(model: &str) -> Option<Self> {
        std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.is_empty())
            .map(|key| Self::new(key, model))
    }
}

impl FallbackHandler for ClaudeHandler {
    fn answer(&self, context: &str, query: &str) -> Result<String, FallbackError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [{
                "role": "user",
                "content": format!("{context}\n\nQuestion: {query}"),
            }],
        });

        tracing::debug!(model = %self.model, "sending fallback request");
        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .ok()
                .and_then(|payload| {
                    payload["error"]["message"].as_str().map(str::to_string)
                })
                .unwrap_or_default();
            return Err(FallbackError::Handler(format!(
                "API returned {status}: {detail}"
            )));
        }

        let payload: Value = response.json()?;
        if payload["stop_reason"] == "refusal" {
            return Err(FallbackError::Handler(
                "the request was declined".to_string(),
            ));
        }

        payload["content"]
            .as_array()
            .and_then(|blocks| {
                blocks
                    .iter()
                    .filter(|block| block["type"] == "text")
                    .find_map(|block| block["text"].as_str())
            })
            .map(str::to_string)
            .ok_or_else(|| {
                FallbackError::Handler("response contained no text content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_requires_key() {
        // The variable is intentionally not set in the test environment
        if std::env::var(API_KEY_VAR).is_err() {
            assert!(ClaudeHandler::from_env(DEFAULT_MODEL).is_none());
        }
    }

    #[test]
    fn test_handler_carries_model() {
        let handler = ClaudeHandler::new("sk-test", "claude-haiku-4-5");
        assert_eq!(handler.model, "claude-haiku-4-5");
    }
}
