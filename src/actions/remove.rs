use crate::process::CommandRunner;
use crate::types::{AppRecord, CommandResult, PackageSource};

use super::ActionError;
use super::privilege::{PKEXEC, run_privileged_command};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemovalPlan {
    pub program: &'static str,
    pub args: Vec<String>,
    pub privileged: bool,
}

impl RemovalPlan {
    /// Shown in the confirmation dialog.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 2);
        if self.privileged {
            parts.push(PKEXEC.to_string());
        }
        parts.push(self.program.to_string());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

pub fn removal_plan(record: &AppRecord) -> Result<RemovalPlan, ActionError> {
    if !record.removable {
        return Err(ActionError::NotRemovable(record.name.clone()));
    }
    if record.identifier.trim().is_empty() {
        return Err(ActionError::EmptyCommand);
    }

    let id = record.identifier.clone();
    let plan = match record.source {
        PackageSource::Apt => RemovalPlan {
            program: "apt-get",
            args: vec!["autoremove".into(), "--purge".into(), "-y".into(), id],
            privileged: true,
        },
        PackageSource::Flatpak => RemovalPlan {
            program: "flatpak",
            args: vec!["uninstall".into(), "--delete-data".into(), "-y".into(), id],
            privileged: false,
        },
        PackageSource::Snap => RemovalPlan {
            program: "snap",
            args: vec!["remove".into(), "--purge".into(), id],
            privileged: true,
        },
    };
    Ok(plan)
}

/// Blocking; run it off the main loop.
pub fn remove(record: &AppRecord, runner: &dyn CommandRunner) -> Result<CommandResult, ActionError> {
    let plan = removal_plan(record)?;
    let args: Vec<&str> = plan.args.iter().map(String::as_str).collect();
    log::info!("Removing {} with: {}", record.identifier, plan.command_line());

    let result = if plan.privileged {
        run_privileged_command(runner, plan.program, &args)?
    } else {
        runner.run(plan.program, &args)?
    };

    if !result.success() {
        log::warn!(
            "Removal of {} exited with {:?}",
            record.identifier,
            result.code
        );
        return Err(ActionError::Failed {
            name: record.name.clone(),
            detail: result.failure_detail(),
        });
    }
    Ok(result)
}
