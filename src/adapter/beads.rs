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

//! Adapter for the beads event log.
//!
//! Wire format: `TIMESTAMP|EVENT_CODE|ENTITY_ID|AGENT_ID|SESSION_ID|DETAILS`
//! where `DETAILS` is free text that may itself contain the delimiter.

use crate::adapter::FormatAdapter;
use crate::entity::{
    ActionableLogLine, Command, CommandHandler, ExpansionResult, LineSource, LogLevel,
    QueryResult, NONE_SENTINEL,
};
use crate::process::{ProcessRunner, SystemRunner};
use fancy_regex::Regex;
use serde_json::{json, Map};
use std::sync::{Arc, LazyLock};

// ISO-8601 date-time prefix: YYYY-MM-DDT...
static ISO_DATETIME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").expect("valid regex literal"));

const BEADS_TYPE: &str = "beads";
const DEFAULT_CLI: &str = "bd";
const DEFAULT_WINDOW: u32 = 10;

/// Event-code prefix to human-readable category. Unknown prefixes map to
/// "Unknown" without failing the parse.
const CATEGORIES: &[(&str, &str)] = &[
    ("bd", "Issue Tracking"),
    ("git", "Version Control"),
    ("agent", "Agent Activity"),
    ("session", "Session Lifecycle"),
    ("file", "File Operation"),
    ("build", "Build & Test"),
    ("sys", "System"),
];

const UNKNOWN_CATEGORY: &str = "Unknown";

fn category_label(prefix: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(known, _)| *known == prefix)
        .map_or(UNKNOWN_CATEGORY, |(_, label)| *label)
}

/// Display heuristic only - the grammar carries no level field
fn infer_level(action: &str) -> LogLevel {
    let last_segment = action.rsplit('.').next().unwrap_or(action);
    match last_segment {
        "error" | "fail" | "failed" => LogLevel::Error,
        "warn" | "warning" => LogLevel::Warn,
        "debug" | "trace" => LogLevel::Debug,
        _ => LogLevel::Info,
    }
}

/// Everything a command handler is allowed to see: the parsed fields of one
/// line plus the CLI binding. Immutable for the line's lifetime.
struct BeadsContext {
    entity_id: String,
    session_id: String,
    category_prefix: String,
    timestamp: String,
    cli_program: String,
    runner: Arc<dyn ProcessRunner>,
}

/// Static command table. Handlers are stateless fns dispatched with the
/// line's context passed explicitly.
struct CommandDef {
    name: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    run: fn(&BeadsContext, &str) -> QueryResult,
}

const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "show",
        aliases: &["view", "open"],
        description: "Show the full record for this entity",
        run: cmd_show,
    },
    CommandDef {
        name: "related",
        aliases: &["rel"],
        description: "List records related to this entity",
        run: cmd_related,
    },
    CommandDef {
        name: "deps",
        aliases: &["dependencies"],
        description: "Show the dependency tree for this entity",
        run: cmd_deps,
    },
    CommandDef {
        name: "category",
        aliases: &["cat"],
        description: "List recent events in the same category",
        run: cmd_category,
    },
    CommandDef {
        name: "session",
        aliases: &["sess"],
        description: "List events from the same session",
        run: cmd_session,
    },
    CommandDef {
        name: "before",
        aliases: &["prev"],
        description: "List events before this one (optional count)",
        run: cmd_before,
    },
    CommandDef {
        name: "after",
        aliases: &["next"],
        description: "List events after this one (optional count)",
        run: cmd_after,
    },
];

/// Fixed suggestion set shown on every expansion
const SUGGESTIONS: &[&str] = &["show", "related", "category", "session"];

/// Run the domain CLI and fold any failure into displayable content. The
/// query counts as handled even when the underlying process fails.
fn run_cli(ctx: &BeadsContext, args: &[String]) -> QueryResult {
    match ctx.runner.run(&ctx.cli_program, args) {
        Ok(output) if output.is_empty() => QueryResult::handled("(no output)"),
        Ok(output) => QueryResult::handled(output),
        Err(err) => QueryResult::handled(format!("Command failed: {err}")),
    }
}

fn cmd_show(ctx: &BeadsContext, _params: &str) -> QueryResult {
    if ctx.entity_id == NONE_SENTINEL {
        return QueryResult::handled("This event has no associated entity to show.");
    }
    run_cli(ctx, &["show".to_string(), ctx.entity_id.clone()])
}

fn cmd_related(ctx: &BeadsContext, _params: &str) -> QueryResult {
    run_cli(ctx, &["related".to_string(), ctx.entity_id.clone()])
}

fn cmd_deps(ctx: &BeadsContext, _params: &str) -> QueryResult {
    if ctx.entity_id == NONE_SENTINEL {
        return QueryResult::handled(
            "This event has no associated entity, so it has no dependencies.",
        );
    }
    run_cli(
        ctx,
        &["dep".to_string(), "tree".to_string(), ctx.entity_id.clone()],
    )
}

fn cmd_category(ctx: &BeadsContext, _params: &str) -> QueryResult {
    run_cli(
        ctx,
        &[
            "list".to_string(),
            "--category".to_string(),
            ctx.category_prefix.clone(),
        ],
    )
}

fn cmd_session(ctx: &BeadsContext, _params: &str) -> QueryResult {
    if ctx.session_id.is_empty() {
        return QueryResult::handled("This event is not associated with a session.");
    }
    run_cli(
        ctx,
        &[
            "log".to_string(),
            "--session".to_string(),
            ctx.session_id.clone(),
        ],
    )
}

fn window_size(params: &str) -> u32 {
    params
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .unwrap_or(DEFAULT_WINDOW)
}

fn cmd_before(ctx: &BeadsContext, params: &str) -> QueryResult {
    run_cli(
        ctx,
        &[
            "log".to_string(),
            "--until".to_string(),
            ctx.timestamp.clone(),
            "--limit".to_string(),
            window_size(params).to_string(),
        ],
    )
}

fn cmd_after(ctx: &BeadsContext, params: &str) -> QueryResult {
    run_cli(
        ctx,
        &[
            "log".to_string(),
            "--since".to_string(),
            ctx.timestamp.clone(),
            "--limit".to_string(),
            window_size(params).to_string(),
        ],
    )
}

/// Curry the static table over one line's context. Each parsed line gets a
/// fresh command list.
fn bind_commands(ctx: &Arc<BeadsContext>) -> Vec<Command> {
    COMMANDS
        .iter()
        .map(|def| {
            let ctx = Arc::clone(ctx);
            let run = def.run;
            let handler: CommandHandler = Arc::new(move |params: &str| run(&ctx, params));
            Command::new(def.name, def.aliases, def.description, handler)
        })
        .collect()
}

/// Adapter for the pipe-delimited beads event-log grammar
pub struct BeadsAdapter {
    cli_program: String,
    runner: Arc<dyn ProcessRunner>,
}

impl Default for BeadsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BeadsAdapter {
    pub fn new() -> Self {
        Self::with_cli(DEFAULT_CLI)
    }

    /// Use a different CLI program (e.g. from configuration)
    pub fn with_cli(program: impl Into<String>) -> Self {
        Self::with_runner(program, Arc::new(SystemRunner))
    }

    /// Inject a custom process runner. Tests use this to avoid spawning.
    pub fn with_runner(program: impl Into<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            cli_program: program.into(),
            runner,
        }
    }

    fn context_for(
        &self,
        entity_id: &str,
        session_id: &str,
        category_prefix: &str,
        timestamp: &str,
    ) -> Arc<BeadsContext> {
        Arc::new(BeadsContext {
            entity_id: entity_id.to_string(),
            session_id: session_id.to_string(),
            category_prefix: category_prefix.to_string(),
            timestamp: timestamp.to_string(),
            cli_program: self.cli_program.clone(),
            runner: Arc::clone(&self.runner),
        })
    }
}

fn render_expansion(
    event_code: &str,
    category: &str,
    action: &str,
    entity_id: &str,
    agent_id: &str,
    session_id: &str,
    details: &str,
) -> ExpansionResult {
    let mut lines = vec![
        format!("Event: {event_code}"),
        format!("Category: {category}"),
        format!("Action: {action}"),
    ];
    if entity_id != NONE_SENTINEL {
        lines.push(format!("Entity: {entity_id}"));
    }
    if !agent_id.is_empty() {
        lines.push(format!("Agent: {agent_id}"));
    }
    if !session_id.is_empty() {
        lines.push(format!("Session: {session_id}"));
    }
    if !details.is_empty() {
        lines.push(format!("Details: {details}"));
    }

    let mut data = Map::new();
    data.insert("category".to_string(), json!(category));
    data.insert("action".to_string(), json!(action));

    ExpansionResult {
        content: lines.join("\n"),
        data: Some(data),
        suggestions: Some(SUGGESTIONS.iter().map(|s| (*s).to_string()).collect()),
    }
}

impl FormatAdapter for BeadsAdapter {
    fn type_name(&self) -> &str {
        BEADS_TYPE
    }

    fn parse(&self, raw_line: &str) -> Option<ActionableLogLine> {
        let fields: Vec<&str> = raw_line.split('|').collect();
        if fields.len() < 5 {
            return None;
        }

        let timestamp = fields[0];
        if !ISO_DATETIME_PREFIX.is_match(timestamp).unwrap_or(false) {
            return None;
        }

        let event_code = fields[1];
        if event_code.is_empty() || !event_code.contains('.') {
            return None;
        }

        let entity_id = if fields[2].is_empty() {
            NONE_SENTINEL
        } else {
            fields[2]
        };
        let agent_id = fields[3];
        let session_id = fields[4];
        // DETAILS may contain the delimiter; rejoin all trailing fields
        let details = if fields.len() > 5 {
            fields[5..].join("|")
        } else {
            String::new()
        };

        let (category_prefix, action) = event_code
            .split_once('.')
            .unwrap_or((event_code, ""));
        let category = category_label(category_prefix);

        let mut context = Map::new();
        context.insert("agentId".to_string(), json!(agent_id));
        context.insert("sessionId".to_string(), json!(session_id));
        context.insert("details".to_string(), json!(details));
        context.insert("category".to_string(), json!(category));

        let expansion = render_expansion(
            event_code, category, action, entity_id, agent_id, session_id, &details,
        );
        let ctx = self.context_for(entity_id, session_id, category_prefix, timestamp);

        Some(ActionableLogLine::new(
            timestamp,
            event_code,
            raw_line,
            Some(infer_level(action)),
            LineSource::new(BEADS_TYPE, entity_id, context),
            expansion,
            bind_commands(&ctx),
        ))
    }

    fn commands(&self) -> Vec<Command> {
        // Placeholder context; for documentation only
        let ctx = self.context_for(NONE_SENTINEL, "", "", "1970-01-01T00:00:00Z");
        bind_commands(&ctx)
    }
}
