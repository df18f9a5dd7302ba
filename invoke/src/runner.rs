//! External tool execution.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::ToolError;

/// Runs the propagation tool and returns its stdout.
///
/// The workflow only depends on this trait, so tests substitute a scripted
/// runner for the real binary.
pub trait ToolRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<String, ToolError>;
}

/// Runs the tool as a child process with a wall clock limit.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<String, ToolError> {
        debug!(program = %program.display(), args = ?args, "Starting tool");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        // Both pipes are drained concurrently so a chatty child cannot block
        // on a full pipe buffer before it exits.
        let stdout = drain(&mut child, Pipe::Stdout);
        let stderr = drain(&mut child, Pipe::Stderr);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                warn!(
                    program = %program.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "Tool timed out, killing process"
                );
                kill(&mut child);
                return Err(ToolError::Timeout(self.timeout));
            }
            Err(e) => {
                kill(&mut child);
                return Err(ToolError::Io(e));
            }
        };

        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;
        debug!(
            program = %program.display(),
            code = ?status.code(),
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            "Tool finished"
        );

        if !status.success() {
            let output = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(ToolError::NonZeroExit {
                code: status.code(),
                output: output.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

enum Pipe {
    Stdout,
    Stderr,
}

type Reader = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain(child: &mut Child, pipe: Pipe) -> Reader {
    let source: Option<Box<dyn Read + Send>> = match pipe {
        Pipe::Stdout => child.stdout.take().map(|p| Box::new(p) as Box<dyn Read + Send>),
        Pipe::Stderr => child.stderr.take().map(|p| Box::new(p) as Box<dyn Read + Send>),
    };
    source.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(reader: Reader) -> Result<String, ToolError> {
    let Some(handle) = reader else {
        return Ok(String::new());
    };
    let buf = handle
        .join()
        .map_err(|_| std::io::Error::other("pipe reader thread panicked"))??;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
