// src/exec/runner.rs

//! Streaming child-process runner.
//!
//! With [`Capture::Merged`] stdout and stderr of the child share one OS
//! pipe, so the captured bytes are ordered exactly as the child wrote them.
//! With [`Capture::StdoutOnly`] stderr gets its own pipe, drained by a
//! background task and kept out of the parsed output.
//!
//! Output is read in chunks as soon as any bytes are available; each chunk
//! is written and flushed to the console (when streaming) before the next
//! read, and always appended to the capture buffer.
//!
//! On unix the child leads its own process group. A terminal Ctrl-C then
//! reaches only `venvtask`, which kills the whole group, so tools launched
//! through `mvenv run` do not outlive the interrupt.

use std::io::{self, PipeReader};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{Result, VenvtaskError};

use super::command::{Capture, CommandLine, CommandSpec, ExecutionResult};

const CHUNK_SIZE: usize = 8 * 1024;

/// Run `spec` to completion.
///
/// - `console`: where to mirror output live; `None` captures silently.
/// - `shutdown`: flipping it to `true` kills the child, waits for it to be
///   reaped and returns [`VenvtaskError::Interrupted`].
///
/// A non-zero exit is returned as [`VenvtaskError::CommandFailed`] carrying
/// the captured output.
pub async fn run_command<W>(
    spec: &CommandSpec,
    console: Option<&mut W>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<ExecutionResult>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let command_line = spec.to_string();
    let (mut child, reader) = spawn(spec, &command_line)?;
    debug!(command = %command_line, pid = ?child.id(), "spawned child process");

    let side_stderr = child.stderr.take().map(drain_stderr);

    let pumped = match into_async(reader) {
        Ok(mut reader) => pump(&mut child, &mut reader, console, shutdown).await,
        Err(e) => Err(e.into()),
    };

    let (status, mut output) = match pumped {
        Ok(done) => done,
        Err(err) => {
            reap(&mut child, &command_line).await;
            if let Some(handle) = side_stderr {
                handle.abort();
            }
            return Err(err);
        }
    };

    let diagnostics = match side_stderr {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    };

    let exit_code = status.code().unwrap_or(-1);
    debug!(
        command = %command_line,
        exit_code,
        bytes = output.len(),
        stderr_bytes = diagnostics.len(),
        "child process exited"
    );

    if status.success() {
        if !diagnostics.is_empty() {
            debug!(
                command = %command_line,
                stderr = %String::from_utf8_lossy(&diagnostics).trim_end(),
                "child wrote to stderr"
            );
        }
        Ok(ExecutionResult { exit_code, output })
    } else {
        output.extend_from_slice(&diagnostics);
        Err(VenvtaskError::CommandFailed {
            command: command_line,
            exit_code,
            output,
        })
    }
}

fn spawn(spec: &CommandSpec, command_line: &str) -> Result<(Child, PipeReader)> {
    let (reader, writer) = io::pipe()?;

    let mut cmd = match &spec.line {
        CommandLine::Shell(script) if cfg!(windows) => {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(script);
            c
        }
        CommandLine::Shell(script) => {
            let mut c = Command::new("sh");
            c.arg("-c").arg(script);
            c
        }
        CommandLine::Program { program, args } => {
            let mut c = Command::new(program);
            c.args(args);
            c
        }
    };

    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }

    match spec.capture {
        Capture::Merged => {
            cmd.stdout(writer.try_clone()?).stderr(writer);
        }
        Capture::StdoutOnly => {
            cmd.stdout(writer).stderr(Stdio::piped());
        }
    }
    cmd.kill_on_drop(true);

    // A background process group that reads the terminal is stopped by
    // SIGTTIN, so the child gets no stdin.
    #[cfg(unix)]
    {
        cmd.stdin(Stdio::null()).process_group(0);
    }

    // `cmd` owns the parent's copies of the write end; they are closed when
    // it drops at the end of this function, so EOF arrives once the child
    // (and anything it forked) exits.
    let child = cmd.spawn().map_err(|source| VenvtaskError::Spawn {
        command: command_line.to_string(),
        source,
    })?;

    Ok((child, reader))
}

fn drain_stderr(mut stderr: ChildStderr) -> JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = stderr.read_to_end(&mut buf).await {
            debug!(error = %e, "reading child stderr failed");
        }
        buf
    })
}

#[cfg(unix)]
fn into_async(reader: PipeReader) -> io::Result<tokio::net::unix::pipe::Receiver> {
    tokio::net::unix::pipe::Receiver::from_owned_fd(std::os::fd::OwnedFd::from(reader))
}

#[cfg(not(unix))]
fn into_async(reader: PipeReader) -> io::Result<tokio::fs::File> {
    let handle = std::os::windows::io::OwnedHandle::from(reader);
    Ok(tokio::fs::File::from_std(std::fs::File::from(handle)))
}

async fn pump<R, W>(
    child: &mut Child,
    reader: &mut R,
    mut console: Option<&mut W>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(ExitStatus, Vec<u8>)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut captured = Vec::new();

    loop {
        let n = tokio::select! {
            read = reader.read(&mut buf) => read?,
            _ = shutdown_requested(shutdown) => return Err(VenvtaskError::Interrupted),
        };
        if n == 0 {
            break;
        }

        let chunk = &buf[..n];
        if let Some(out) = console.as_deref_mut() {
            out.write_all(chunk).await?;
            out.flush().await?;
        }
        captured.extend_from_slice(chunk);
    }

    let status = tokio::select! {
        status = child.wait() => status?,
        _ = shutdown_requested(shutdown) => return Err(VenvtaskError::Interrupted),
    };

    Ok((status, captured))
}

/// Resolves once shutdown is requested; never resolves if the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Kill the child's process group, then the child itself, and wait for it
/// so no zombie outlives the call.
async fn reap(child: &mut Child, command_line: &str) {
    kill_group(child, command_line);

    match child.try_wait() {
        Ok(Some(_)) => return,
        Ok(None) => {}
        Err(e) => debug!(command = %command_line, error = %e, "try_wait failed before kill"),
    }

    debug!(command = %command_line, "killing child process");
    if let Err(e) = child.kill().await {
        warn!(command = %command_line, error = %e, "failed to kill child process");
    }
}

#[cfg(unix)]
fn kill_group(child: &Child, command_line: &str) {
    // `None` once the child has been reaped.
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };

    // SAFETY: plain syscall; a negative pid addresses the group that
    // `spawn` created with the child as its leader.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(
            command = %command_line,
            error = %io::Error::last_os_error(),
            "signalling process group failed"
        );
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child, _command_line: &str) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn no_shutdown() -> watch::Receiver<bool> {
        let (_tx, rx) = watch::channel(false);
        rx
    }

    #[tokio::test]
    async fn stderr_and_stdout_share_one_ordered_stream() {
        let spec = CommandSpec::new(CommandLine::shell("echo one; echo two >&2; echo three"));
        let mut shutdown = no_shutdown();
        let result = run_command::<tokio::io::Sink>(&spec, None, &mut shutdown)
            .await
            .unwrap();
        assert_eq!(result.output_lossy(), "one\ntwo\nthree\n");
        assert!(result.success());
    }

    #[tokio::test]
    async fn non_zero_exit_carries_captured_output() {
        let spec = CommandSpec::new(CommandLine::shell("echo broken; exit 3"));
        let mut shutdown = no_shutdown();
        match run_command::<tokio::io::Sink>(&spec, None, &mut shutdown).await {
            Err(VenvtaskError::CommandFailed {
                exit_code, output, ..
            }) => {
                assert_eq!(exit_code, 3);
                assert_eq!(output, b"broken\n");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stdout_only_keeps_stderr_out_of_the_output() {
        let spec = CommandSpec::new(CommandLine::shell("echo noise >&2; echo '[]'")).stdout_only();
        let mut shutdown = no_shutdown();
        let result = run_command::<tokio::io::Sink>(&spec, None, &mut shutdown)
            .await
            .unwrap();
        assert_eq!(result.output_lossy(), "[]\n");
    }

    #[tokio::test]
    async fn stdout_only_failure_still_reports_stderr() {
        let spec = CommandSpec::new(CommandLine::shell("echo partial; echo 'no such env' >&2; exit 2"))
            .stdout_only();
        let mut shutdown = no_shutdown();
        match run_command::<tokio::io::Sink>(&spec, None, &mut shutdown).await {
            Err(VenvtaskError::CommandFailed { exit_code, output, .. }) => {
                assert_eq!(exit_code, 2);
                assert_eq!(output, b"partial\nno such env\n");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let spec = CommandSpec::new(CommandLine::program("venvtask-no-such-binary", Vec::<String>::new()));
        let mut shutdown = no_shutdown();
        let err = run_command::<tokio::io::Sink>(&spec, None, &mut shutdown)
            .await
            .unwrap_err();
        assert!(matches!(err, VenvtaskError::Spawn { .. }));
    }
}
