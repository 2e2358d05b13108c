/// `LogLens` - turn event logs into queryable, actionable entities
///
/// Copyright (C) 2026 Daniel Freiermuth
///
/// This program is free software: you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation, either version 3 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use anyhow::Context;
use clap::Parser;
use loglens::{
    AdapterRegistry, BeadsAdapter, ClaudeHandler, FallbackConfig, GlobalConfig, Interpreter,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "loglens")]
#[command(author = "LogLens Team")]
#[command(version)]
#[command(about = "Parse event logs into interactive entities and query them", long_about = None)]
struct Args {
    /// Path to the log file to read (stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the full default expansion for every parsed line
    #[arg(long)]
    expand: bool,

    /// Sort parsed lines by timestamp before printing
    #[arg(long)]
    sort: bool,

    /// Run a query against the N-th parsed line (1-based)
    #[arg(long, value_name = "N", requires = "query")]
    line: Option<usize>,

    /// Query text to run against the selected line
    #[arg(long, value_name = "INPUT", requires = "line")]
    query: Option<String>,

    /// Enable the Claude natural-language fallback (reads ANTHROPIC_API_KEY)
    #[arg(long)]
    claude: bool,
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG to override (e.g. RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "LogLens starting up");

    let args = Args::parse();
    let config = GlobalConfig::load();

    let mut registry = AdapterRegistry::new();
    registry.register(Box::new(BeadsAdapter::with_cli(config.cli_program.clone())));

    let mut interpreter = Interpreter::new();
    if args.claude || config.claude_fallback {
        match ClaudeHandler::from_env(&config.claude_model) {
            Some(handler) => {
                interpreter.configure_fallback(FallbackConfig::with_handler(Arc::new(handler)));
            }
            None => tracing::warn!(
                "ANTHROPIC_API_KEY is not set, natural-language fallback stays disabled"
            ),
        }
    }

    let content = read_input(args.file.as_deref())?;
    let mut entities = Vec::new();
    let mut unparsed = 0usize;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match registry.parse(line) {
            Some(entity) => entities.push(entity),
            None => unparsed += 1,
        }
    }
    tracing::info!(parsed = entities.len(), unparsed, "finished parsing input");

    if args.sort {
        entities.sort_by_key(loglens::ActionableLogLine::parsed_timestamp);
    }

    if let (Some(selected), Some(query)) = (args.line, args.query.as_deref()) {
        let entity = selected
            .checked_sub(1)
            .and_then(|index| entities.get(index))
            .with_context(|| {
                format!(
                    "line {selected} is out of range ({} parsed lines)",
                    entities.len()
                )
            })?;
        let result = interpreter.interpret(entity, query);
        if result.handled {
            println!("{}", result.content);
        } else if let Some(error) = result.error {
            println!("{error}");
        }
        return Ok(());
    }

    for (index, entity) in entities.iter().enumerate() {
        if args.expand {
            let expansion = entity.default_expansion();
            println!("--- line {} ---", index + 1);
            println!("{}", expansion.content);
            if let Some(suggestions) = expansion.suggestions {
                println!("Try: {}", suggestions.join(", "));
            }
            println!();
        } else {
            let level = entity.level.map_or("-", loglens::LogLevel::as_str);
            println!(
                "{:>4}  {:5}  {}  {}",
                index + 1,
                level,
                entity.timestamp,
                entity.message
            );
        }
    }
    if unparsed > 0 {
        eprintln!("({unparsed} lines did not match any registered format)");
    }

    Ok(())
}
