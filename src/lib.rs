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

//! Turn line-oriented event logs into queryable, actionable entities.
//!
//! Raw lines flow through an [`adapter::AdapterRegistry`] that tries each
//! registered [`adapter::FormatAdapter`] in registration order. A successful
//! parse yields an [`entity::ActionableLogLine`] that can describe itself
//! (default expansion) and answer follow-up questions (command dispatch). An
//! [`interpret::Interpreter`] resolves free text against a line's commands
//! and, only on failure, hands off to a configured natural-language
//! fallback.
//!
//! Malformed input is rejected as a value (`None`), never a panic; panics
//! are reserved for adapter programming errors and propagate uncaught.

pub mod adapter;
pub mod config;
pub mod entity;
pub mod interpret;
pub mod process;

pub use adapter::beads::BeadsAdapter;
pub use adapter::{AdapterRegistry, FormatAdapter};
pub use config::GlobalConfig;
pub use entity::{
    ActionableLogLine, Command, CommandHandler, ExpansionResult, LineSource, LogLevel,
    QueryResult, NONE_SENTINEL,
};
pub use interpret::claude::ClaudeHandler;
pub use interpret::{
    is_natural_language, parse_command, FallbackConfig, FallbackError, FallbackHandler,
    Interpreter, ParsedCommand,
};
pub use process::{ProcessError, ProcessRunner, SystemRunner};
