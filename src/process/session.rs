//! Interactive session with the ngccm tool: send a line, wait for a pattern.

use std::time::Duration;

use regex::bytes::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;

use super::{spawn, ProcessHandle, ToolSpec};
use crate::error::{NgccmError, Result};

/// Text consumed by a successful [`Session::expect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expected {
    /// Everything up to and including the match.
    pub consumed: String,
    /// The `result` capture group, when the pattern has one and it took part.
    pub result: Option<String>,
}

pub struct Session {
    handle: ProcessHandle,
    buf: Vec<u8>,
    timeout: Duration,
    stdout_closed: bool,
    stderr_closed: bool,
}

impl Session {
    pub fn start(tool: &ToolSpec, port: u16, timeout: Duration) -> Result<Self> {
        Ok(Self {
            handle: spawn(tool, port)?,
            buf: Vec::new(),
            timeout,
            stdout_closed: false,
            stderr_closed: false,
        })
    }

    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        tracing::debug!(cmd = line, "sending");
        let stdin = &mut self.handle.stdin;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Wait until `pattern` matches the unread output, then consume through the match.
    pub async fn expect(&mut self, pattern: &Regex, waiting_for: &str) -> Result<Expected> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(caps) = pattern.captures(&self.buf) {
                let end = caps.get(0).map_or(0, |m| m.end());
                let result = caps
                    .name("result")
                    .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned());
                let consumed: Vec<u8> = self.buf.drain(..end).collect();
                tracing::debug!(waiting_for, "matched response");
                return Ok(Expected {
                    consumed: String::from_utf8_lossy(&consumed).into_owned(),
                    result,
                });
            }
            if self.is_closed() {
                return Err(NgccmError::Eof {
                    waiting_for: waiting_for.to_string(),
                    output: self.take_buffer(),
                });
            }
            self.fill(deadline, waiting_for).await?;
        }
    }

    /// Read until the tool closes its output, wait for it to exit, and return
    /// whatever was left unread.
    pub async fn finish(mut self) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        while !self.is_closed() {
            self.fill(deadline, "end of output").await?;
        }
        match tokio::time::timeout_at(deadline, self.handle.child.wait()).await {
            Ok(status) => {
                let status = status?;
                tracing::debug!(?status, "ngccm tool exited");
            }
            Err(_) => {
                tracing::warn!("ngccm tool did not exit after closing its output; killing it");
                self.handle.child.kill().await?;
            }
        }
        Ok(self.take_buffer())
    }

    fn is_closed(&self) -> bool {
        self.stdout_closed && self.stderr_closed
    }

    fn take_buffer(&mut self) -> String {
        let rest = std::mem::take(&mut self.buf);
        String::from_utf8_lossy(&rest).into_owned()
    }

    /// Pull the next chunk from stdout or stderr, whichever is ready first.
    async fn fill(&mut self, deadline: Instant, waiting_for: &str) -> Result<()> {
        let mut out_chunk = [0u8; 4096];
        let mut err_chunk = [0u8; 4096];
        let stdout = &mut self.handle.stdout;
        let stderr = &mut self.handle.stderr;
        let (out_open, err_open) = (!self.stdout_closed, !self.stderr_closed);

        let read = tokio::time::timeout_at(deadline, async {
            tokio::select! {
                r = stdout.read(&mut out_chunk), if out_open => (true, r),
                r = stderr.read(&mut err_chunk), if err_open => (false, r),
                else => (true, Ok(0)),
            }
        })
        .await;

        let (from_stdout, n) = match read {
            Ok((from_stdout, r)) => (from_stdout, r?),
            Err(_) => {
                return Err(NgccmError::Timeout {
                    waiting_for: waiting_for.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        };

        match (from_stdout, n) {
            (true, 0) => self.stdout_closed = true,
            (false, 0) => self.stderr_closed = true,
            (true, n) => self.buf.extend_from_slice(&out_chunk[..n]),
            (false, n) => self.buf.extend_from_slice(&err_chunk[..n]),
        }
        Ok(())
    }
}
