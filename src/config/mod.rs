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

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_cli_program() -> String {
    "bd".to_string()
}

fn default_claude_model() -> String {
    crate::interpret::claude::DEFAULT_MODEL.to_string()
}

/// Global user configuration stored in the config directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Domain CLI invoked by line commands
    #[serde(default = "default_cli_program")]
    pub cli_program: String,

    /// Enable the Claude natural-language fallback without passing --claude
    #[serde(default)]
    pub claude_fallback: bool,

    /// Model used by the fallback handler
    #[serde(default = "default_claude_model")]
    pub claude_model: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            cli_program: default_cli_program(),
            claude_fallback: false,
            claude_model: default_claude_model(),
        }
    }
}

impl GlobalConfig {
    /// Get the path to the global config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|config_dir| config_dir.join("loglens").join("config.json"))
    }

    /// Load global config from disk, returning defaults if not found
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                tracing::info!(path = %path.display(), "loading global config");
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(err) => {
                        tracing::warn!(%err, "failed to load config, using defaults");
                    }
                }
            } else {
                tracing::info!("no global config found, using defaults");
            }
        }

        Self::default()
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Save global config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().context("could not determine config directory")?;
        self.save_to(&path)?;
        tracing::info!(path = %path.display(), "saved global config");
        Ok(())
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }
}
