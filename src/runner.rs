//! Subprocess execution with streamed output capture and cancellation
//!
//! Both child pipes are drained continuously while the process runs: the OS
//! pipe buffers are bounded, and a child producing steady output deadlocks if
//! the parent only reads after exit. Each pipe gets its own reader task that
//! appends lines to a buffer; joining those tasks after exit is the drain
//! barrier that guarantees the outcome holds every byte the child wrote.

use crate::types::ExecutionOutcome;
use crate::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Execute an external tool and capture its full output
///
/// Returns [`Error::ToolInvocation`] when the process cannot be started at
/// all (missing binary, permissions). A process that starts and exits
/// non-zero is not an error here; it is a non-success [`ExecutionOutcome`]
/// for the caller to judge.
///
/// Cancellation both stops the wait and terminates the child; an
/// already-cancelled token returns promptly with [`Error::Cancelled`] and no
/// surviving process. `kill_on_drop` backstops futures that are dropped
/// without being polled to completion.
pub async fn run(
    executable: &Path,
    args: &[String],
    working_dir: &Path,
    cancel: &CancellationToken,
) -> Result<ExecutionOutcome> {
    let tool = executable
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| executable.display().to_string());

    tracing::debug!(tool = %tool, ?args, dir = %working_dir.display(), "spawning tool");

    let mut child = Command::new(executable)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::ToolInvocation {
            tool: tool.clone(),
            reason: e.to_string(),
        })?;

    let stdout = child.stdout.take().ok_or_else(|| Error::ToolInvocation {
        tool: tool.clone(),
        reason: "stdout pipe was not captured".to_string(),
    })?;
    let stderr = child.stderr.take().ok_or_else(|| Error::ToolInvocation {
        tool: tool.clone(),
        reason: "stderr pipe was not captured".to_string(),
    })?;

    let stdout_task = spawn_line_reader(stdout, "stdout", tool.clone());
    let stderr_task = spawn_line_reader(stderr, "stderr", tool.clone());

    let status = tokio::select! {
        // Biased so an already-cancelled token wins over a racing exit
        biased;

        _ = cancel.cancelled() => {
            if let Err(e) = child.kill().await {
                tracing::warn!(tool = %tool, error = %e, "failed to kill cancelled child");
            }
            // Readers hit EOF once the child is gone; reap them quietly
            let _ = stdout_task.await;
            let _ = stderr_task.await;
            tracing::info!(tool = %tool, "tool terminated after cancellation");
            return Err(Error::Cancelled);
        }
        status = child.wait() => status?,
    };

    // Drain barrier: both readers run to EOF before the outcome is built, so
    // no buffered output is still in flight when we return.
    let stdout_lines = stdout_task.await.unwrap_or_default();
    let stderr_lines = stderr_task.await.unwrap_or_default();

    let outcome = ExecutionOutcome {
        exit_code: status.code().unwrap_or(-1),
        stdout: join_lines(stdout_lines),
        stderr: join_lines(stderr_lines),
    };

    tracing::info!(tool = %tool, exit_code = outcome.exit_code, "tool exited");
    Ok(outcome)
}

/// One task per pipe, reading lines into an append-only buffer as they arrive
fn spawn_line_reader<R>(pipe: R, stream: &'static str, tool: String) -> JoinHandle<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut collected = Vec::new();
        let mut lines = BufReader::new(pipe).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    // yt-dlp writes progress to stderr, so neither stream is an error channel
                    tracing::debug!(tool = %tool, stream, line = %line, "tool output");
                    collected.push(line);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(tool = %tool, stream, error = %e, "stopped reading tool output");
                    break;
                }
            }
        }
        collected
    })
}

/// Rejoin captured lines, preserving order, one line per entry
fn join_lines(lines: Vec<String>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
