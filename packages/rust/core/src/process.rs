//! Helpers for running subprocesses with inherited stdio.

use std::process::{Command, ExitStatus};

use docmake_shared::{DocmakeError, Result};

/// Render a command line for logs and error messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `command` to completion with the parent's stdio and return its status.
pub fn run_inherited(mut command: Command) -> Result<ExitStatus> {
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .status()
        .map_err(|e| DocmakeError::spawn(program, e))
}

/// Exit code of a finished process.
///
/// On Unix a process killed by signal N reports `128 + N`, as shells do.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_command_joins_args() {
        let args = vec!["submodule".to_string(), "update".into(), "--init".into()];
        assert_eq!(display_command("git", &args), "git submodule update --init");
        assert_eq!(display_command("make-docs", &[]), "make-docs");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = run_inherited(Command::new("docmake-test-no-such-program")).unwrap_err();
        assert!(matches!(err, DocmakeError::Spawn { .. }));
        assert!(err.to_string().contains("docmake-test-no-such-program"));
    }

    #[cfg(unix)]
    #[test]
    fn exit_codes_are_forwarded() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 7"]);
        let status = run_inherited(cmd).expect("run sh");
        assert_eq!(exit_code(status), 7);
    }

    #[cfg(unix)]
    #[test]
    fn signal_deaths_map_to_shell_convention() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "kill -TERM $$"]);
        let status = run_inherited(cmd).expect("run sh");
        assert_eq!(exit_code(status), 128 + 15);
    }
}
