use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::TempDir;

use crate::process::{CommandRunner, ProcessError};
use crate::types::CommandResult;

#[derive(Clone)]
enum Reply {
    Missing,
    Output { code: i32, stdout: String, stderr: String },
}

/// Replays canned output per program and records every invocation.
#[derive(Default)]
pub(crate) struct StubRunner {
    replies: HashMap<String, Reply>,
    pub(crate) calls: Mutex<Vec<Vec<String>>>,
    pub(crate) spawned: Mutex<Vec<Vec<String>>>,
}

impl StubRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_output(mut self, program: &str, code: i32, stdout: &str) -> Self {
        self.replies.insert(
            program.to_string(),
            Reply::Output {
                code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    pub(crate) fn with_failure(mut self, program: &str, code: i32, stderr: &str) -> Self {
        self.replies.insert(
            program.to_string(),
            Reply::Output {
                code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    pub(crate) fn with_missing(mut self, program: &str) -> Self {
        self.replies.insert(program.to_string(), Reply::Missing);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn spawned(&self) -> Vec<Vec<String>> {
        self.spawned.lock().unwrap().clone()
    }

    fn reply_for(&self, program: &str) -> Reply {
        self.replies.get(program).cloned().unwrap_or(Reply::Missing)
    }
}

fn command_line(program: &str, args: &[&str]) -> Vec<String> {
    std::iter::once(program)
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect()
}

impl CommandRunner for StubRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ProcessError> {
        self.calls.lock().unwrap().push(command_line(program, args));
        match self.reply_for(program) {
            Reply::Missing => Err(ProcessError::Missing(program.to_string())),
            Reply::Output {
                code,
                stdout,
                stderr,
            } => Ok(CommandResult {
                code: Some(code),
                stdout,
                stderr,
            }),
        }
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), ProcessError> {
        match self.reply_for(program) {
            Reply::Missing => Err(ProcessError::Missing(program.to_string())),
            Reply::Output { .. } => {
                self.spawned.lock().unwrap().push(command_line(program, args));
                Ok(())
            }
        }
    }
}

/// Fresh scratch directory, removed when dropped.
pub(crate) fn fixture_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Writes fixture files relative to a scratch directory.
pub(crate) trait FixtureDir {
    fn write(&self, relative: &str, content: &str) -> PathBuf;
}

impl FixtureDir for TempDir {
    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let target = self.path().join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(&target, content).expect("write fixture");
        target
    }
}
