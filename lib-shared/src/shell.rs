/// Shell invocation plumbing shared by the tool wrappers.
///
/// Every wrapper funnels its command lines through `run_to_log` so that the
/// combined stdout/stderr of the external tools ends up in the per-rule log
/// file instead of on the terminal.
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use slog::Logger;

use super::errors::*;

/// Open the log file at `path` for appending, creating parents as needed.
fn open_log(path: &str) -> Result<::std::fs::File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            ::std::fs::create_dir_all(parent)
                .chain_err(|| format!("Could not create log directory for {}", path))?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .chain_err(|| format!("Could not open log file {}", path))
}

/// Append a `#### <text> ####` banner line to the log file.
pub fn log_banner(log_path: &str, text: &str) -> Result<()> {
    let mut log = open_log(log_path)?;
    writeln!(log, "#### {} ####", text)
        .chain_err(|| format!("Could not write to log file {}", log_path))?;
    Ok(())
}

/// Run one shell command line, appending combined stdout/stderr to `log_path`.
pub fn run_to_log(logger: &Logger, cmd: &str, log_path: &str) -> Result<()> {
    debug!(logger, "Running: {}", cmd);

    let stdout_log = open_log(log_path)?;
    let stderr_log = stdout_log
        .try_clone()
        .chain_err(|| format!("Could not reopen log file {}", log_path))?;

    let status = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_log))
        .stderr(Stdio::from(stderr_log))
        .status()
        .chain_err(|| format!("Could not launch command: {}", cmd))?;

    if !status.success() {
        bail!("Command failed ({}), see {}: {}", status, log_path, cmd);
    }

    Ok(())
}

/// Run several command lines in order through `run_to_log`.
pub fn run_all_to_log(logger: &Logger, cmds: &[String], log_path: &str) -> Result<()> {
    for cmd in cmds {
        run_to_log(logger, cmd, log_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate tempdir;

    use self::tempdir::TempDir;
    use std::fs;

    use slog;
    use slog::Drain;

    use super::*;

    fn discard_logger() -> Logger {
        Logger::root(slog::Discard.fuse(), o!())
    }

    #[test]
    fn output_is_appended_to_the_log() {
        let tmp = TempDir::new("shell").unwrap();
        let log = tmp.path().join("rule.log");
        let log = log.to_str().unwrap();

        let logger = discard_logger();
        log_banner(log, "ECHO LOG").unwrap();
        run_to_log(&logger, "echo first", log).unwrap();
        run_to_log(&logger, "echo second 1>&2", log).unwrap();

        let text = fs::read_to_string(log).unwrap();
        assert_eq!(text, "#### ECHO LOG ####\nfirst\nsecond\n");
    }

    #[test]
    fn failing_command_is_an_error() {
        let tmp = TempDir::new("shell").unwrap();
        let log = tmp.path().join("rule.log");

        let logger = discard_logger();
        let result = run_to_log(&logger, "false", log.to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn log_directory_is_created() {
        let tmp = TempDir::new("shell").unwrap();
        let log = tmp.path().join("logs").join("merge").join("S1.log");
        let log = log.to_str().unwrap().to_string();

        let logger = discard_logger();
        run_to_log(&logger, "echo hi", &log).unwrap();
        assert!(fs::read_to_string(&log).unwrap().contains("hi"));
    }
}
