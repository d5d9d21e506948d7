use anyhow::{anyhow, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub struct CommandResult {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl CommandResult {
    /// Stdout as trimmed UTF-8 text.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

/// Runs the command to completion, capturing both streams.
pub async fn run_command(exec: &mut tokio::process::Command) -> Result<CommandResult> {
    exec.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let output = exec.output().await?;
    Ok(CommandResult {
        success: output.status.success(),
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Runs the command while relaying each stdout line to our stdout as it arrives.
///
/// Stdout is also collected verbatim (newlines included); stderr is collected
/// and returned in the error when the command fails.
pub async fn stream_command(exec: &mut tokio::process::Command) -> Result<CommandResult> {
    exec.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = exec.spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("Failed to capture stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("Failed to capture stderr"))?;

    let mut stdout_reader = BufReader::new(stdout).split(b'\n');
    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut relay = tokio::io::stdout();

    let mut collected_stdout = Vec::new();
    let mut collected_stderr = String::new();

    let mut stdout_done = false;
    let mut stderr_done = false;

    while !stdout_done || !stderr_done {
        tokio::select! {
            stdout_line = stdout_reader.next_segment(), if !stdout_done => {
                match stdout_line {
                    Ok(Some(mut line)) => {
                        line.push(b'\n');
                        relay.write_all(&line).await?;
                        relay.flush().await?;
                        collected_stdout.extend_from_slice(&line);
                    },
                    Ok(None) => {
                        stdout_done = true;
                    },
                    Err(e) => {
                        log::warn!("Error reading stdout: {}", e);
                        stdout_done = true;
                    },
                }
            },
            stderr_line = stderr_reader.next_line(), if !stderr_done => {
                match stderr_line {
                    Ok(Some(line)) => {
                        collected_stderr.push_str(&line);
                        collected_stderr.push('\n');
                    },
                    Ok(None) => {
                        stderr_done = true;
                    },
                    Err(e) => {
                        log::warn!("Error reading stderr: {}", e);
                        stderr_done = true;
                    },
                }
            },
        }
    }

    let exit_status = child.wait().await?;

    Ok(CommandResult {
        success: exit_status.success(),
        stdout: collected_stdout,
        stderr: collected_stderr,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_run_command_captures_output() {
        let mut exec = tokio::process::Command::new("sh");
        exec.arg("-c").arg("printf 'abc\\n'; printf 'oops' >&2; exit 3");
        let result = run_command(&mut exec).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.stdout_text(), "abc");
        assert_eq!(result.stderr, "oops");
    }

    #[tokio::test]
    async fn test_stream_command_collects_lines() {
        let mut exec = tokio::process::Command::new("sh");
        exec.arg("-c").arg("printf 'one\\ntwo\\n'");
        let result = stream_command(&mut exec).await.unwrap();
        assert!(result.success);
        assert_eq!(result.stdout, b"one\ntwo\n".to_vec());
    }
}
