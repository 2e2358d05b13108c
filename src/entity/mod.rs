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

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Literal stand-in for a missing entity id.
pub const NONE_SENTINEL: &str = "none";

/// Severity attached to a parsed line, when the adapter can infer one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub const fn severity(self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Warn => 2,
            Self::Error => 3,
        }
    }
}

/// Adapter-specific payload carried by every parsed line.
///
/// `type_name` identifies the adapter that produced the line, `id` is the
/// entity's natural key within that source, and `context` holds every
/// adapter-specific field. The context is populated once at parse time and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSource {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
    pub context: Map<String, Value>,
}

impl LineSource {
    pub fn new(
        type_name: impl Into<String>,
        id: impl Into<String>,
        context: Map<String, Value>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
            context,
        }
    }
}

/// What a line shows when the user expands it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionResult {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Outcome of running a query against a line.
///
/// `handled == false` with no error is a valid silent no-op; `handled ==
/// false` with `error` set is the standard unresolved shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub handled: bool,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// The query was resolved, with `content` to show the user
    pub fn handled(content: impl Into<String>) -> Self {
        Self {
            handled: true,
            content: content.into(),
            data: None,
            error: None,
        }
    }

    /// Silent no-op: not handled, nothing to report
    pub fn unhandled() -> Self {
        Self::default()
    }

    /// Not handled, with actionable text for the user
    pub fn unresolved(error: impl Into<String>) -> Self {
        Self {
            handled: false,
            content: String::new(),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Handler invoked with the parameter string when a command matches.
///
/// Adapters build these by currying a stateless `fn(&Context, &str)` over an
/// immutable, shared context - the handler itself carries no mutable state.
pub type CommandHandler = Arc<dyn Fn(&str) -> QueryResult + Send + Sync>;

/// A named operation bound to one parsed line
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    handler: CommandHandler,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        aliases: &[&str],
        description: impl Into<String>,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: aliases.iter().map(|alias| (*alias).to_string()).collect(),
            description: description.into(),
            handler,
        }
    }

    /// Case-insensitive match against the name or any alias.
    /// Normalization happens here, at match time, not at construction.
    pub fn matches(&self, token: &str) -> bool {
        self.name.eq_ignore_ascii_case(token)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(token))
    }

    pub fn run(&self, params: &str) -> QueryResult {
        (self.handler)(params)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A parsed, interactive log line.
///
/// Created once per successful parse and immutable afterwards. The caller
/// owns the lifetime - entities are not pooled or persisted.
#[derive(Debug, Clone)]
pub struct ActionableLogLine {
    /// ISO-8601 timestamp string, kept verbatim from the source line
    pub timestamp: String,
    /// Normalized event identifier (e.g. a dotted event code)
    pub message: String,
    /// The original unmodified line
    pub raw: String,
    pub level: Option<LogLevel>,
    pub source: LineSource,
    expansion: ExpansionResult,
    commands: Vec<Command>,
}

impl ActionableLogLine {
    pub fn new(
        timestamp: impl Into<String>,
        message: impl Into<String>,
        raw: impl Into<String>,
        level: Option<LogLevel>,
        source: LineSource,
        expansion: ExpansionResult,
        commands: Vec<Command>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
            raw: raw.into(),
            level,
            source,
            expansion,
            commands,
        }
    }

    /// What this line shows when selected
    pub fn default_expansion(&self) -> ExpansionResult {
        self.expansion.clone()
    }

    /// Commands bound to this line, in match order
    pub fn available_commands(&self) -> &[Command] {
        &self.commands
    }

    /// Parse the timestamp for ordering. `None` when the adapter recorded a
    /// timestamp shape chrono cannot fully parse.
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok()
    }

    /// Resolve free-text input against this line's commands.
    ///
    /// The whole input is trimmed, lowercased and split on whitespace; the
    /// first token selects a command and the rest, rejoined with single
    /// spaces, becomes the parameter string. First match in list order wins.
    pub fn handle_query(&self, input: &str) -> QueryResult {
        let normalized = input.trim().to_lowercase();
        let mut tokens = normalized.split_whitespace();
        let Some(name) = tokens.next() else {
            // Empty input is a silent no-op, not an unknown command
            return QueryResult::unhandled();
        };
        let params = tokens.collect::<Vec<_>>().join(" ");

        for command in &self.commands {
            if command.matches(name) {
                tracing::debug!(command = %command.name, "dispatching line command");
                return command.run(&params);
            }
        }

        let known = self
            .commands
            .iter()
            .map(|command| command.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        QueryResult::unresolved(format!("Unknown command: {name}. Try: {known}"))
    }
}
