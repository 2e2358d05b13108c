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

pub mod claude;

use crate::entity::{ActionableLogLine, QueryResult, NONE_SENTINEL};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A free-text input split into command and parameter string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: String,
    pub params: String,
}

/// Split input into a lowercased leading token and the trimmed remainder.
///
/// Standalone parsing utility for callers such as autocomplete - `interpret`
/// does not go through it. Returns `None` iff the trimmed input is empty.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next()?.to_lowercase();
    let params = parts.next().unwrap_or("").trim().to_string();
    Some(ParsedCommand { command, params })
}

const NL_OPENERS: &[&str] = &[
    "what", "why", "how", "when", "where", "who", // interrogatives
    "can", "could", "would", "should", // modals
    "is", "are", "explain", "describe",
];

/// Heuristic classifier for natural-language input.
///
/// Pure and independent of any registered command set; used as a UI signal
/// only, never as a gate inside `interpret`.
pub fn is_natural_language(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    if normalized.ends_with('?') || normalized.starts_with("tell me") {
        return true;
    }
    normalized
        .split_whitespace()
        .next()
        .is_some_and(|first| NL_OPENERS.contains(&first))
}

/// Ways the natural-language fallback can fail
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Handler(String),
}

/// External natural-language handler consulted for unresolved queries.
/// Called at most once per query; no retry.
pub trait FallbackHandler: Send + Sync {
    fn answer(&self, context: &str, query: &str) -> Result<String, FallbackError>;
}

impl<F> FallbackHandler for F
where
    F: Fn(&str, &str) -> Result<String, FallbackError> + Send + Sync,
{
    fn answer(&self, context: &str, query: &str) -> Result<String, FallbackError> {
        self(context, query)
    }
}

/// Fallback configuration. Replaced wholesale - no merging of partial
/// updates; last call wins.
#[derive(Clone, Default)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub handler: Option<Arc<dyn FallbackHandler>>,
}

impl FallbackConfig {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_handler(handler: Arc<dyn FallbackHandler>) -> Self {
        Self {
            enabled: true,
            handler: Some(handler),
        }
    }
}

impl fmt::Debug for FallbackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackConfig")
            .field("enabled", &self.enabled)
            .field("handler", &self.handler.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

/// Resolves free-text input against a line's commands, handing unresolved
/// queries to the configured fallback.
///
/// An explicit instance rather than process-wide state; callers thread it
/// through alongside the registry.
#[derive(Debug, Default)]
pub struct Interpreter {
    fallback: FallbackConfig,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fallback configuration. Default is disabled.
    pub fn configure_fallback(&mut self, config: FallbackConfig) {
        tracing::info!(enabled = config.enabled, "fallback configuration replaced");
        self.fallback = config;
    }

    pub const fn fallback_enabled(&self) -> bool {
        self.fallback.enabled
    }

    /// Resolve `input` against `line`.
    ///
    /// The line's own `handle_query` runs first; its result is returned
    /// unchanged when handled. Otherwise the fallback handler is invoked
    /// once, when enabled and configured. A failing handler yields
    /// `handled: false` with a "Claude fallback failed" error; with the
    /// fallback disabled the original unhandled result passes through
    /// verbatim. `line.source` is never mutated.
    pub fn interpret(&self, line: &ActionableLogLine, input: &str) -> QueryResult {
        let result = line.handle_query(input);
        if result.handled {
            return result;
        }

        if self.fallback.enabled {
            if let Some(handler) = &self.fallback.handler {
                let context = line_context(line);
                tracing::debug!("handing unresolved query to fallback");
                return match handler.answer(&context, input) {
                    Ok(content) => QueryResult::handled(content),
                    Err(err) => QueryResult {
                        handled: false,
                        content: String::new(),
                        data: None,
                        error: Some(format!("Claude fallback failed: {err}")),
                    },
                };
            }
        }

        result
    }
}

/// Render the context string handed to the fallback: line identity, every
/// non-sentinel context entry, and the available commands.
fn line_context(line: &ActionableLogLine) -> String {
    let mut parts = vec![
        format!("Type: {}", line.source.type_name),
        format!("Timestamp: {}", line.timestamp),
        format!("Event: {}", line.message),
        format!("Id: {}", line.source.id),
    ];
    for (key, value) in &line.source.context {
        let rendered = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        if rendered.is_empty() || rendered == NONE_SENTINEL {
            continue;
        }
        parts.push(format!("{key}: {rendered}"));
    }
    parts.push("Available commands:".to_string());
    for command in line.available_commands() {
        parts.push(format!("  {} - {}", command.name, command.description));
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::beads::BeadsAdapter;
    use crate::adapter::FormatAdapter;
    use std::sync::Mutex;

    const SAMPLE: &str =
        "2025-01-15T15:04:03.456Z|bd.issue.create|bd-97ux|steve|sess-abc123|title=Implement ALLP";

    fn sample_line() -> ActionableLogLine {
        BeadsAdapter::new().parse(SAMPLE).expect("should parse")
    }

    #[test]
    fn test_parse_command_scenarios() {
        let parsed = parse_command("  SHOW  param  ").expect("should parse");
        assert_eq!(parsed.command, "show");
        assert_eq!(parsed.params, "param");

        let bare = parse_command("deps").expect("should parse");
        assert_eq!(bare.command, "deps");
        assert_eq!(bare.params, "");

        // Params keep their case; only the command token is lowercased
        let mixed = parse_command("show BD-97ux extra").expect("should parse");
        assert_eq!(mixed.command, "show");
        assert_eq!(mixed.params, "BD-97ux extra");
    }

    #[test]
    fn test_parse_command_none_iff_empty() {
        assert!(parse_command("").is_none());
        assert!(parse_command("   \t ").is_none());
        assert!(parse_command("x").is_some());
    }

    #[test]
    fn test_is_natural_language() {
        assert!(is_natural_language("why did this happen"));
        assert!(is_natural_language("What is this event"));
        assert!(is_natural_language("could this be related"));
        assert!(is_natural_language("is this an error"));
        assert!(is_natural_language("tell me about this"));
        assert!(is_natural_language("explain the failure"));
        assert!(is_natural_language("show related items?"));

        assert!(!is_natural_language("category bd"));
        assert!(!is_natural_language("show bd-97ux"));
        assert!(!is_natural_language(""));
        // Prefixes of openers must not match ("isolate" is not "is")
        assert!(!is_natural_language("isolate the problem"));
    }

    #[test]
    fn test_interpret_returns_handled_result_unchanged() {
        let interpreter = Interpreter::new();
        let line = sample_line();
        let result = interpreter.interpret(&line, "deps");
        assert!(result.handled);
    }

    #[test]
    fn test_interpret_without_fallback_passes_through() {
        let interpreter = Interpreter::new();
        let line = sample_line();
        let result = interpreter.interpret(&line, "unknowncmd");
        assert!(!result.handled);
        assert_eq!(
            result.error.as_deref(),
            Some("Unknown command: unknowncmd. Try: show, related, deps, category, session, before, after")
        );
    }

    #[test]
    fn test_fallback_invoked_only_for_unresolved_queries() {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&invocations);
        let handler = move |context: &str, query: &str| -> Result<String, FallbackError> {
            seen.lock()
                .expect("handler mutex")
                .push((context.to_string(), query.to_string()));
            Ok("resp".to_string())
        };
        let mut interpreter = Interpreter::new();
        interpreter.configure_fallback(FallbackConfig::with_handler(Arc::new(handler)));

        let line = sample_line();
        // A matching command never reaches the fallback
        let handled = interpreter.interpret(&line, "show");
        assert!(handled.handled);
        assert!(invocations.lock().expect("handler mutex").is_empty());

        // An unresolved query does, exactly once
        let result = interpreter.interpret(&line, "explain this");
        assert!(result.handled);
        assert_eq!(result.content, "resp");
        let calls = invocations.lock().expect("handler mutex");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "explain this");
    }

    #[test]
    fn test_fallback_context_contents() {
        let captured = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&captured);
        let handler = move |context: &str, _query: &str| -> Result<String, FallbackError> {
            *sink.lock().expect("handler mutex") = context.to_string();
            Ok("resp".to_string())
        };
        let mut interpreter = Interpreter::new();
        interpreter.configure_fallback(FallbackConfig::with_handler(Arc::new(handler)));

        let line = sample_line();
        interpreter.interpret(&line, "explain this");

        let context = captured.lock().expect("handler mutex").clone();
        assert!(context.contains("Type: beads"));
        assert!(context.contains("Id: bd-97ux"));
        assert!(context.contains("Event: bd.issue.create"));
        assert!(context.contains("agentId: steve"));
        assert!(context.contains("sessionId: sess-abc123"));
        assert!(context.contains("show - Show the full record for this entity"));
    }

    #[test]
    fn test_fallback_skips_sentinel_and_empty_entries() {
        let captured = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&captured);
        let handler = move |context: &str, _query: &str| -> Result<String, FallbackError> {
            *sink.lock().expect("handler mutex") = context.to_string();
            Ok("resp".to_string())
        };
        let mut interpreter = Interpreter::new();
        interpreter.configure_fallback(FallbackConfig::with_handler(Arc::new(handler)));

        let line = BeadsAdapter::new()
            .parse("2025-01-15T15:04:03Z|sys.startup||||")
            .expect("should parse");
        interpreter.interpret(&line, "explain this");

        let context = captured.lock().expect("handler mutex").clone();
        assert!(!context.contains("agentId:"));
        assert!(!context.contains("sessionId:"));
        assert!(!context.contains("details:"));
    }

    #[test]
    fn test_fallback_failure_shape() {
        let handler = |_context: &str, _query: &str| -> Result<String, FallbackError> {
            Err(FallbackError::Handler("boom".to_string()))
        };
        let mut interpreter = Interpreter::new();
        interpreter.configure_fallback(FallbackConfig::with_handler(Arc::new(handler)));

        let line = sample_line();
        let result = interpreter.interpret(&line, "explain this");
        assert!(!result.handled);
        assert!(result.content.is_empty());
        assert_eq!(result.error.as_deref(), Some("Claude fallback failed: boom"));
    }

    #[test]
    fn test_configure_fallback_last_call_wins() {
        let first =
            |_: &str, _: &str| -> Result<String, FallbackError> { Ok("first".to_string()) };
        let second =
            |_: &str, _: &str| -> Result<String, FallbackError> { Ok("second".to_string()) };
        let mut interpreter = Interpreter::new();
        interpreter.configure_fallback(FallbackConfig::with_handler(Arc::new(first)));
        interpreter.configure_fallback(FallbackConfig::with_handler(Arc::new(second)));

        let line = sample_line();
        assert_eq!(interpreter.interpret(&line, "nothing matches").content, "second");

        // Disabling replaces the whole config; the old handler is gone
        interpreter.configure_fallback(FallbackConfig::disabled());
        assert!(!interpreter.fallback_enabled());
        let result = interpreter.interpret(&line, "nothing matches");
        assert!(!result.handled);
        assert!(result.error.as_deref().is_some_and(|e| e.starts_with("Unknown command")));
    }

    #[test]
    fn test_interpret_never_mutates_source() {
        let handler =
            |_: &str, _: &str| -> Result<String, FallbackError> { Ok("resp".to_string()) };
        let mut interpreter = Interpreter::new();
        interpreter.configure_fallback(FallbackConfig::with_handler(Arc::new(handler)));

        let line = sample_line();
        let before = line.source.clone();
        for input in ["show", "deps", "unknowncmd", "explain this", "", "before 3"] {
            let _ = interpreter.interpret(&line, input);
        }
        assert_eq!(line.source, before);
    }

    #[test]
    fn test_enabled_without_handler_passes_through() {
        let mut interpreter = Interpreter::new();
        interpreter.configure_fallback(FallbackConfig {
            enabled: true,
            handler: None,
        });
        let line = sample_line();
        let result = interpreter.interpret(&line, "unknowncmd");
        assert!(!result.handled);
        assert!(result.error.as_deref().is_some_and(|e| e.starts_with("Unknown command")));
    }
}
