mod launch;
mod privilege;
mod remove;

use thiserror::Error;

use crate::process::ProcessError;

pub use launch::launch;
pub use remove::{remove, removal_plan};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("No command to run")]
    EmptyCommand,
    #[error("{0} was not installed by a package manager and cannot be removed here")]
    NotRemovable(String),
    #[error(transparent)]
    Spawn(#[from] ProcessError),
    #[error("Removing {name} failed: {detail}")]
    Failed { name: String, detail: String },
}
