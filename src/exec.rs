//! Pandoc subprocess execution.
//!
//! A small builder around `std::process::Command`: source text is piped to
//! stdin as UTF-8, stdout and stderr are captured, and a non-zero exit is
//! always an error carrying the status and the command that failed. An
//! optional timeout kills a hung pandoc instead of hanging the whole build.

use std::io::{Read, Write};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::command::PandocCommand;
use crate::error::{ReaderError, Result};

/// Poll interval while waiting on a child with a timeout.
const WAIT_POLL: Duration = Duration::from_millis(10);

/// Configured pandoc invocation ready to run.
pub struct Invocation<'a> {
    command: &'a PandocCommand,
    stdin_data: &'a str,
    timeout: Option<Duration>,
}

impl<'a> Invocation<'a> {
    pub fn new(command: &'a PandocCommand, stdin_data: &'a str) -> Self {
        Self {
            command,
            stdin_data,
            timeout: None,
        }
    }

    /// Kill the subprocess if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the command, feed stdin, and return captured stdout.
    pub fn run(self) -> Result<String> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ReaderError::PandocMissing,
                _ => ReaderError::Io(self.command.program.clone(), e),
            })?;

        // Drain stdout/stderr on threads so a chatty pandoc cannot fill a
        // pipe and deadlock against our stdin write.
        let stdout_handle = spawn_reader(child.stdout.take());
        let stderr_handle = spawn_reader(child.stderr.take());

        if let Some(mut stdin) = child.stdin.take() {
            // A child that rejects its options exits before draining stdin;
            // its exit status and stderr matter more than the broken pipe.
            if let Err(e) = stdin.write_all(self.stdin_data.as_bytes())
                && e.kind() != std::io::ErrorKind::BrokenPipe
            {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReaderError::Io(self.command.program.clone(), e));
            }
            // Dropping stdin closes the pipe and lets pandoc finish
        }

        let status = self.wait(&mut child)?;
        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();

        let output = Output {
            status,
            stdout,
            stderr,
        };
        if !output.status.success() {
            return Err(ReaderError::PandocFailed {
                command: self.command.display(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Wait for the child, enforcing the timeout when one is set.
    fn wait(&self, child: &mut Child) -> Result<std::process::ExitStatus> {
        let Some(timeout) = self.timeout else {
            return child
                .wait()
                .map_err(|e| ReaderError::Io(self.command.program.clone(), e));
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    // Kill and reap so no zombie is left behind
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ReaderError::PandocTimeout {
                        command: self.command.display(),
                        seconds: timeout.as_secs(),
                    });
                }
                Ok(None) => std::thread::sleep(WAIT_POLL),
                Err(e) => return Err(ReaderError::Io(self.command.program.clone(), e)),
            }
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    source: Option<R>,
) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut source) = source {
            let _ = source.read_to_end(&mut buf);
        }
        buf
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn command(program: &str, args: &[&str]) -> PandocCommand {
        PandocCommand {
            program: PathBuf::from(program),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn test_stdin_pipe() {
        let cmd = command("cat", &[]);
        let out = Invocation::new(&cmd, "test data").run().unwrap();
        assert_eq!(out, "test data");
    }

    #[test]
    fn test_missing_program() {
        let cmd = command("definitely-not-pandoc-xyz", &[]);
        let err = Invocation::new(&cmd, "").run().unwrap_err();
        assert!(matches!(err, ReaderError::PandocMissing));
    }

    #[test]
    fn test_nonzero_exit() {
        let cmd = command("false", &[]);
        let err = Invocation::new(&cmd, "").run().unwrap_err();
        assert!(matches!(err, ReaderError::PandocFailed { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_early_exit_reports_status_not_broken_pipe() {
        // Child exits with diagnostics before reading any of a large stdin;
        // the failure must carry its status and stderr, not the pipe error
        let cmd = command("sh", &["-c", "echo 'bad option' >&2; exit 2"]);
        let input = "x".repeat(4 * 1024 * 1024);
        let err = Invocation::new(&cmd, &input).run().unwrap_err();
        match err {
            ReaderError::PandocFailed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(2));
                assert!(stderr.contains("bad option"));
            }
            other => panic!("expected PandocFailed, got {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_timeout_kills_child() {
        let cmd = command("sleep", &["5"]);
        let start = Instant::now();
        let err = Invocation::new(&cmd, "")
            .timeout(Some(Duration::from_millis(100)))
            .run()
            .unwrap_err();
        assert!(matches!(err, ReaderError::PandocTimeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
