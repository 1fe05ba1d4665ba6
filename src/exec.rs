use crate::command::{EncoderCommand, Plan};
use crate::error::{Result, TrimError};
use std::io::{self, ErrorKind, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// How much of ffmpeg's stderr is kept to find its final message.
const DIAGNOSTIC_TAIL: usize = 16 * 1024;

/// Run every command of the plan in order, stopping at the first failure.
/// ffmpeg's stderr is copied to `sink` as it arrives.
pub fn run_plan<W: Write>(plan: &Plan, sink: &mut W) -> Result<()> {
    for command in &plan.commands {
        run(command, sink)?;
    }
    Ok(())
}

pub fn run<W: Write>(command: &EncoderCommand, sink: &mut W) -> Result<()> {
    debug!(pass = %command.pass, "starting ffmpeg");
    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| match err.kind() {
            ErrorKind::NotFound => TrimError::EncoderNotFound {
                program: command.program.display().to_string(),
            },
            _ => TrimError::Io(err),
        })?;

    let mut tail = Vec::new();
    if let Some(mut stderr) = child.stderr.take() {
        if let Err(err) = relay(&mut stderr, sink, &mut tail) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(err.into());
        }
    }

    let status = child.wait()?;
    debug!(pass = %command.pass, %status, "ffmpeg finished");
    if !status.success() {
        return Err(TrimError::EncoderFailed {
            pass: command.pass.to_string(),
            status: describe(status),
            diagnostic: last_line(&tail),
        });
    }
    Ok(())
}

/// Copy `from` into `sink` untouched, keeping the last bytes in `tail`.
///
/// A broken `sink` only stops the copy; `from` is still drained so ffmpeg
/// never blocks on a full pipe.
fn relay<R: Read, W: Write>(from: &mut R, sink: &mut W, tail: &mut Vec<u8>) -> io::Result<()> {
    let mut buf = [0u8; 8192];
    let mut relaying = true;
    loop {
        let n = match from.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if relaying {
            if let Err(err) = sink.write_all(&buf[..n]).and_then(|()| sink.flush()) {
                debug!(%err, "stopped relaying ffmpeg output");
                relaying = false;
            }
        }

        tail.extend_from_slice(&buf[..n]);
        if tail.len() > DIAGNOSTIC_TAIL {
            let excess = tail.len() - DIAGNOSTIC_TAIL;
            tail.drain(..excess);
        }
    }
}

/// ffmpeg reports the fatal error last; progress lines end in `\r`.
fn last_line(tail: &[u8]) -> String {
    String::from_utf8_lossy(tail)
        .split(|c| c == '\n' || c == '\r')
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .unwrap_or("no diagnostic output")
        .to_string()
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with code {}", code),
        None => format!("was terminated ({})", status),
    }
}
