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

use std::process::ExitStatus;
use thiserror::Error;

/// Ways an external command invocation can fail
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{program} produced non-utf8 output")]
    InvalidUtf8 { program: String },
}

/// Capability for running an external command to completion and capturing
/// its stdout. Command handlers hold this as a trait object so tests can
/// substitute a fake.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<String, ProcessError>;
}

/// Runner backed by `std::process::Command`. Blocks until the child exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, ProcessError> {
        tracing::debug!(program, ?args, "spawning external command");
        let output = std::process::Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ProcessError::Launch {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ProcessError::Exit {
                program: program.to_string(),
                status: output.status,
                stderr,
            });
        }

        String::from_utf8(output.stdout)
            .map(|stdout| stdout.trim_end().to_string())
            .map_err(|_| ProcessError::InvalidUtf8 {
                program: program.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        let runner = SystemRunner;
        let output = runner
            .run("echo", &["hello".to_string()])
            .expect("echo should succeed");
        assert_eq!(output, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_program_is_launch_error() {
        let runner = SystemRunner;
        let err = runner
            .run("loglens-no-such-binary", &[])
            .expect_err("missing binary should fail");
        assert!(matches!(err, ProcessError::Launch { .. }));
        assert!(err.to_string().contains("loglens-no-such-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_exit_error() {
        let runner = SystemRunner;
        let err = runner
            .run("false", &[])
            .expect_err("false exits nonzero");
        assert!(matches!(err, ProcessError::Exit { .. }));
        assert!(err.to_string().contains("false"));
    }
}
