use crate::process::{CommandRunner, ProcessError};
use crate::types::CommandResult;

pub(crate) const PKEXEC: &str = "pkexec";

pub(crate) fn run_privileged_command(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<CommandResult, ProcessError> {
    let mut full_args = Vec::with_capacity(args.len() + 1);
    full_args.push(program);
    full_args.extend_from_slice(args);
    runner.run(PKEXEC, &full_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRunner;

    #[test]
    fn wraps_command_in_pkexec() {
        let runner = StubRunner::new().with_output(PKEXEC, 0, "");
        let result = run_privileged_command(&runner, "apt-get", &["autoremove", "vim"]).unwrap();
        assert!(result.success());
        assert_eq!(runner.calls(), vec![vec!["pkexec", "apt-get", "autoremove", "vim"]]);
    }

    #[test]
    fn missing_pkexec_is_reported() {
        let runner = StubRunner::new();
        let err = run_privileged_command(&runner, "snap", &["remove", "x"]).unwrap_err();
        assert!(matches!(err, ProcessError::Missing(program) if program == PKEXEC));
    }
}
