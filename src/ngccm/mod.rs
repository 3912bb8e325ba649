//! Client for the ngccm tool: three ways to run a script of commands.
//!
//! - [`Ngccm::send_commands`] talks to the tool interactively and keeps the raw
//!   text of every answer.
//! - [`Ngccm::send_commands_parsed`] does the same but extracts each answer
//!   into a [`CommandResult`].
//! - [`Ngccm::send_commands_fast`] pipes the whole script in at once. It is much
//!   quicker, but some `get` answers may be missing from the output.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::{io::AsyncWriteExt, time::timeout};

use crate::{
    config::Config,
    error::{NgccmError, Result},
    process::{self, session::Session, ToolSpec},
};

pub mod patterns;
pub mod script;

pub use script::{CommandList, QUIT};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawOutput {
    pub output: String,
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub cmd: String,
    pub result: String,
    /// Send and answer times, in seconds since the Unix epoch.
    pub times: (f64, f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedOutput {
    pub output: Vec<CommandResult>,
    pub log: String,
}

impl ParsedOutput {
    /// The answer to `cmd`, if it was sent and answered.
    pub fn result_for(&self, cmd: &str) -> Option<&str> {
        self.output
            .iter()
            .find(|r| r.cmd == cmd)
            .map(|r| r.result.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Ngccm {
    tool: ToolSpec,
    port: u16,
    timeout: Duration,
}

impl Ngccm {
    pub fn new(port: u16) -> Self {
        Self {
            tool: ToolSpec::default(),
            port,
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let (program, pre_args) = cfg.tool();
        Self {
            tool: ToolSpec::new(program, pre_args),
            port: cfg.port(),
            timeout: cfg.timeout(),
        }
    }

    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the commands one at a time, waiting for each answer, and return all
    /// of the tool's output.
    pub async fn send_commands(&self, cmds: impl Into<CommandList>) -> Result<RawOutput> {
        let script = cmds.into().into_script();
        tracing::info!(port = self.port, commands = script.len(), "running ngccm script");

        let mut session = Session::start(&self.tool, self.port, self.timeout)?;
        let mut raw_output = String::new();
        for c in &script {
            session.send_line(c).await?;
            if c != QUIT {
                let pattern = patterns::raw_response(c)?;
                raw_output.push_str(&session.expect(&pattern, c).await?.consumed);
            }
        }
        raw_output.push_str(&session.finish().await?);

        Ok(RawOutput {
            output: raw_output.trim().to_string(),
            log: script::transcript(&script),
        })
    }

    /// Run the commands one at a time and return each answer paired with its
    /// command.
    pub async fn send_commands_parsed(&self, cmds: impl Into<CommandList>) -> Result<ParsedOutput> {
        let script = cmds.into().into_script();
        tracing::info!(port = self.port, commands = script.len(), "running parsed ngccm script");

        let mut session = Session::start(&self.tool, self.port, self.timeout)?;
        let mut output = Vec::with_capacity(script.len());
        for c in &script {
            session.send_line(c).await?;
            let t0 = now();
            if c != QUIT {
                let pattern = patterns::parsed_response(c)?;
                let answer = session.expect(&pattern, c).await?;
                let t1 = now();
                output.push(CommandResult {
                    cmd: c.clone(),
                    result: answer.result.unwrap_or_default().trim().to_string(),
                    times: (t0, t1),
                });
            }
        }
        // Every answer is in hand; a slow shutdown only costs a warning.
        if let Err(e) = session.finish().await {
            tracing::warn!(error = %e, "ngccm tool did not shut down cleanly");
        }

        Ok(ParsedOutput {
            output,
            log: script::transcript(&script),
        })
    }

    /// Pipe the whole script into the tool and return its stdout followed by
    /// its stderr. Answers are not synchronised with commands.
    pub async fn send_commands_fast(&self, cmds: impl Into<CommandList>) -> Result<RawOutput> {
        let script = cmds.into().into_script();
        tracing::info!(port = self.port, commands = script.len(), "piping ngccm script");

        let mut child = process::spawn_oneshot(&self.tool, self.port)?;
        let stdin = child.stdin.take();
        let payload = script::joined(&script);

        // Feed stdin while draining stdout/stderr, or a chatty tool fills its
        // output pipe and stops reading. Dropping stdin at the end closes it.
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(payload.as_bytes()).await {
                Ok(()) => Ok(()),
                // The tool may exit before reading everything; its output still counts.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::warn!("ngccm tool closed stdin before the script was written");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        };
        let run = async move {
            let (fed, out) = tokio::join!(feed, child.wait_with_output());
            fed?;
            out
        };

        // On timeout the child is dropped with the future and killed.
        let out = timeout(self.timeout, run)
            .await
            .map_err(|_| NgccmError::Timeout {
                waiting_for: "end of piped script".to_string(),
                secs: self.timeout.as_secs(),
            })??;

        let mut raw_output = String::from_utf8_lossy(&out.stdout).into_owned();
        raw_output.push_str(&String::from_utf8_lossy(&out.stderr));

        Ok(RawOutput {
            output: raw_output,
            log: script::transcript(&script),
        })
    }
}

fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_for() {
        let parsed = ParsedOutput {
            output: vec![CommandResult {
                cmd: "get HF1-mezz_reg4".into(),
                result: "0x0a03".into(),
                times: (1.0, 2.0),
            }],
            log: String::new(),
        };
        assert_eq!(parsed.result_for("get HF1-mezz_reg4"), Some("0x0a03"));
        assert_eq!(parsed.result_for("get HF2-mezz_reg4"), None);
    }

    #[test]
    fn test_from_config_takes_port_and_tool() {
        let mut cfg = Config::load_from(std::path::Path::new("/nonexistent/.ngccmrc"));
        cfg.set("NGCCM_PORT", "64002");
        cfg.set("NGCCM_TOOL", "stdbuf -oL ngccm");
        cfg.set("NGCCM_TIMEOUT", "5");
        let client = Ngccm::from_config(&cfg);
        assert_eq!(client.port(), 64002);
        assert_eq!(client.tool.program, "stdbuf");
        assert_eq!(client.timeout, Duration::from_secs(5));
    }
}
