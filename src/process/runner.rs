use crate::error::{Result, RunnerError};
use crate::output::{say, OutputSender};
use crate::process::exit_code;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

const RULE_WIDTH: usize = 80;

/// Build a platform shell invocation for a command string, with the
/// command's stderr redirected into its stdout.
///
/// Merging inside the shell gives both streams one pipe, so lines keep the
/// order the child wrote them in.
fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(format!("{command} 2>&1"));
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(format!("exec 2>&1; {command}"));
        cmd
    }
}

/// Run a shell command to completion, echoing its combined output line by line.
///
/// Returns the exit code. A non-zero exit is not an error; only failing to
/// start or wait on the shell is.
pub async fn run_command(command: &str, out: &OutputSender) -> Result<i32> {
    let rule = "=".repeat(RULE_WIDTH);
    say(out, format!("\n\n{rule}"));
    say(out, format!("Running: {command}"));
    say(out, format!("{rule}\n"));

    let mut child = shell_command(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| RunnerError::Spawn {
            command: command.to_string(),
            source,
        })?;
    debug!(pid = ?child.id(), command, "spawned shell command");

    let reader = child
        .stdout
        .take()
        .map(|s| tokio::spawn(forward_lines(s, out.clone())));

    let status = child.wait().await.map_err(|source| RunnerError::Wait {
        command: command.to_string(),
        source,
    })?;
    if let Some(reader) = reader {
        let _ = reader.await;
    }

    let code = exit_code(status);
    debug!(command, code, "shell command finished");

    say(out, format!("\n{rule}"));
    say(out, format!("Command completed with return code: {code}"));
    say(out, format!("{rule}\n"));
    Ok(code)
}

/// Forward every line of `reader` to the console until EOF.
async fn forward_lines<R: AsyncRead + Unpin>(reader: R, out: OutputSender) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                say(&out, line.trim_end_matches(['\r', '\n']));
            }
        }
    }
}
