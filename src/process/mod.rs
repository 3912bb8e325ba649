//! ngccm tool process management (startup/IO).

use std::process::Stdio;

use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use crate::error::{NgccmError, Result};

pub mod session;

/// How to launch the ngccm tool: the program plus any arguments that go before
/// the port selection (`-z -c -p <port>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub program: String,
    pub pre_args: Vec<String>,
}

impl Default for ToolSpec {
    fn default() -> Self {
        Self { program: crate::config::DEFAULT_TOOL.to_string(), pre_args: Vec::new() }
    }
}

impl ToolSpec {
    pub fn new(program: impl Into<String>, pre_args: Vec<String>) -> Self {
        Self { program: program.into(), pre_args }
    }

    pub fn args(&self, port: u16) -> Vec<String> {
        let mut args = self.pre_args.clone();
        args.extend(["-z".to_string(), "-c".to_string(), "-p".to_string(), port.to_string()]);
        args
    }

    fn command(&self, port: u16) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(port))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

pub struct ProcessHandle {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// Start the tool bound to `port` with all three standard streams piped.
pub fn spawn(tool: &ToolSpec, port: u16) -> Result<ProcessHandle> {
    let mut child = tool.command(port).spawn().map_err(|source| NgccmError::Spawn {
        program: tool.program.clone(),
        source,
    })?;
    tracing::debug!(program = %tool.program, port, pid = ?child.id(), "spawned ngccm tool");

    let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
    let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

    Ok(ProcessHandle { child, stdin, stdout, stderr })
}

/// Start the tool and hand back the bare child, for one-shot scripts.
pub fn spawn_oneshot(tool: &ToolSpec, port: u16) -> Result<Child> {
    tool.command(port).spawn().map_err(|source| NgccmError::Spawn {
        program: tool.program.clone(),
        source,
    })
}

fn missing_pipe(name: &str) -> NgccmError {
    NgccmError::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        format!("no {} on spawned tool", name),
    ))
}
