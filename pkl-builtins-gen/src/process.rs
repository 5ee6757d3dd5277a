//! Blocking subprocess execution with an optional deadline.

use std::io::{self, Read};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How a bounded subprocess run ended.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The process exited before the deadline.
    Exited(Output),
    /// The deadline passed; the process was killed and reaped.
    TimedOut,
}

/// Runs `command` to completion, capturing its output, unless `timeout`
/// elapses first.
///
/// Both pipes are drained on background threads so a chatty child cannot
/// block on a full pipe while it is being polled.
///
/// # Errors
///
/// Returns the spawn error, or any error raised while polling, killing or
/// collecting the child.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> io::Result<ProcessOutcome> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn()?;
    let stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout pipe was not captured"))?;
    let stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr pipe was not captured"))?;
    let stdout_reader = spawn_pipe_reader(stdout_pipe);
    let stderr_reader = spawn_pipe_reader(stderr_pipe);

    let Some(status) = wait_with_timeout(&mut child, timeout)? else {
        // Grandchildren may still hold the pipes open; leave the readers
        // detached rather than waiting on them.
        return Ok(ProcessOutcome::TimedOut);
    };

    Ok(ProcessOutcome::Exited(Output {
        status,
        stdout: join_reader(stdout_reader)?,
        stderr: join_reader(stderr_reader)?,
    }))
}

fn spawn_pipe_reader(
    mut pipe: impl Read + Send + 'static,
) -> thread::JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_reader(handle: thread::JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| io::Error::other("pipe reader thread panicked"))?
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> io::Result<Option<std::process::ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        if start.elapsed() > timeout {
            return handle_timeout(child);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn handle_timeout(child: &mut Child) -> io::Result<Option<std::process::ExitStatus>> {
    if let Some(status) = child.try_wait()? {
        return Ok(Some(status));
    }
    child.kill()?;
    child.wait()?;
    Ok(None)
}
