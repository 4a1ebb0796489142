use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;

use crate::types::CommandResult;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0} is not installed")]
    Missing(String),
    #[error("Failed to launch {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    fn from_spawn(program: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            ProcessError::Missing(program.to_string())
        } else {
            ProcessError::Io {
                program: program.to_string(),
                source: err,
            }
        }
    }
}

/// Boundary between the app and every external program it talks to.
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture output.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ProcessError>;

    /// Start a program that outlives the request, with no stdio attached.
    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), ProcessError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ProcessError> {
        log::debug!("Running {} {}", program, args.join(" "));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| ProcessError::from_spawn(program, err))?;

        Ok(CommandResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), ProcessError> {
        log::info!("Launching {} {}", program, args.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|err| ProcessError::from_spawn(program, err))?;

        // Reap the child once it exits so it never lingers as a zombie.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_maps_to_missing() {
        let err = SystemRunner
            .run("appvault-definitely-not-a-real-binary", &[])
            .unwrap_err();
        assert!(matches!(err, ProcessError::Missing(name) if name == "appvault-definitely-not-a-real-binary"));
    }

    #[test]
    fn run_captures_exit_code_and_stdout() {
        let result = SystemRunner.run("sh", &["-c", "echo hello; exit 3"]).unwrap();
        assert_eq!(result.code, Some(3));
        assert_eq!(result.stdout.trim(), "hello");
        assert!(!result.success());
    }
}
