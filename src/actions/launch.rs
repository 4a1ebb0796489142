use crate::process::CommandRunner;
use crate::scan::desktop_entry::split_exec;
use crate::types::{AppKind, AppRecord};

use super::ActionError;

/// The argv actually spawned for `record`, wrapped in `terminal` when the
/// record needs one.
pub fn launch_argv(record: &AppRecord, terminal: &str) -> Result<Vec<String>, ActionError> {
    if !record.can_launch() {
        return Err(ActionError::EmptyCommand);
    }

    let needs_terminal = record.terminal && record.kind != AppKind::NotApplicable;
    let mut argv = if needs_terminal {
        split_exec(terminal)
    } else {
        Vec::new()
    };
    argv.extend(record.launch.iter().cloned());
    Ok(argv)
}

pub fn launch(
    record: &AppRecord,
    terminal: &str,
    runner: &dyn CommandRunner,
) -> Result<(), ActionError> {
    let argv = launch_argv(record, terminal)?;
    let Some((program, args)) = argv.split_first() else {
        return Err(ActionError::EmptyCommand);
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    runner.spawn_detached(program, &args)?;
    Ok(())
}
