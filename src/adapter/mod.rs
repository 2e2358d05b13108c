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

pub mod beads;

use crate::entity::{ActionableLogLine, Command, ExpansionResult, QueryResult};

/// Capability implemented by every log format.
///
/// `parse` returns `None` for non-matching or malformed input and must never
/// panic on data - panics are reserved for adapter programming errors, which
/// the registry deliberately does not catch.
pub trait FormatAdapter: Send + Sync {
    /// Identifies this adapter in the registry
    fn type_name(&self) -> &str;

    /// Turn a raw line into an entity, or `None` when the line does not
    /// belong to this format
    fn parse(&self, raw_line: &str) -> Option<ActionableLogLine>;

    fn default_expansion(&self, line: &ActionableLogLine) -> ExpansionResult {
        line.default_expansion()
    }

    fn handle_query(&self, line: &ActionableLogLine, input: &str) -> QueryResult {
        line.handle_query(input)
    }

    /// Template command list built from a placeholder context. Used for
    /// documentation and autocomplete, never for execution.
    fn commands(&self) -> Vec<Command>;
}

/// Holds registered adapters and routes raw lines to the first one that
/// parses them. Registration order is the trial order.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn FormatAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its type name. Re-registering an existing
    /// type replaces it in place - last write wins, original position kept.
    pub fn register(&mut self, adapter: Box<dyn FormatAdapter>) {
        let slot = self
            .adapters
            .iter_mut()
            .find(|existing| existing.type_name() == adapter.type_name());
        match slot {
            Some(existing) => {
                tracing::warn!(
                    type_name = adapter.type_name(),
                    "replacing already-registered adapter"
                );
                *existing = adapter;
            }
            None => self.adapters.push(adapter),
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn FormatAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.type_name() == type_name)
            .map(|adapter| &**adapter)
    }

    /// Try each registered adapter in registration order and return the
    /// first successful parse. `None` when nothing matches or the registry
    /// is empty.
    pub fn parse(&self, raw_line: &str) -> Option<ActionableLogLine> {
        for adapter in &self.adapters {
            if let Some(line) = adapter.parse(raw_line) {
                return Some(line);
            }
        }
        tracing::debug!("no adapter matched line");
        None
    }

    /// Registered type names, in registration order
    pub fn types(&self) -> Vec<&str> {
        self.adapters
            .iter()
            .map(|adapter| adapter.type_name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
