//! External program invocation
//!
//! All interaction with the transcoder and metadata prober goes through
//! this single interface: run a command, capture its output, and assert
//! on the exit status.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::process::Command;
use tracing::trace;

/// Binary used for container remuxing and preview scaling
pub const TRANSCODER: &str = "ffmpeg";

/// Binary used for probing video metadata
pub const PROBER: &str = "mediainfo";

/// Captured outcome of an external call
#[derive(Debug)]
pub struct CallResult {
    /// The full command line, rendered for logging
    pub command: String,
    /// Exit status code (-1 when the process was killed by a signal)
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CallResult {
    /// Whether the call exited with status 0
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Consume the result, failing with a typed error unless the exit
    /// status was 0. The error carries the command, status, and the
    /// captured stderr, so callers log the failure exactly once.
    pub fn assert_success(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            let stderr = self.stderr_lossy();
            Err(Error::ExternalTool {
                command: self.command,
                status: self.status,
                stderr,
            })
        }
    }

    /// Captured stdout, lossily decoded
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured stderr, lossily decoded and trimmed
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Run an external program with the given arguments, capturing both
/// output streams. Blocks until the process exits.
pub fn run<I, S>(program: &str, args: I) -> Result<CallResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().collect();
    let command = render_command(program, &args);
    trace!(%command, "invoking external program");

    let output = Command::new(program).args(&args).output()?;

    Ok(CallResult {
        command,
        status: output.status.code().unwrap_or(-1),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Fail at startup when a required external binary is not on the PATH
pub fn require_binary(name: &str) -> Result<()> {
    match run("which", [name]) {
        Ok(result) if result.success() => Ok(()),
        _ => Err(Error::MissingBinary(name.to_string())),
    }
}

fn render_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut rendered = String::from(program);
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}
