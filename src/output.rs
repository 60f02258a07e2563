//! Console output routing.
//!
//! Child output, banners and status messages are funneled through a single
//! writer so lines from concurrent readers never interleave mid-line. The
//! writer takes the stdout/stderr lock for one line at a time: the log
//! subscriber writes to stderr from other threads.

use std::io::Write;
use tokio::sync::mpsc;

/// Which console stream a line goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

pub type OutputSender = mpsc::UnboundedSender<OutputLine>;

fn write_line(mut w: impl Write, msg: &str) -> std::io::Result<()> {
    writeln!(w, "{msg}")?;
    w.flush()
}

/// Start the console writer. It runs until every sender is dropped.
pub fn spawn_output_writer() -> (OutputSender, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        while let Some(line) = rx.blocking_recv() {
            // A closed console is not worth aborting a run over.
            let _ = match &line {
                OutputLine::Stdout(msg) => write_line(std::io::stdout().lock(), msg),
                OutputLine::Stderr(msg) => write_line(std::io::stderr().lock(), msg),
            };
        }
    });
    (tx, handle)
}

/// Send a stdout line, ignoring a closed writer.
pub fn say(out: &OutputSender, msg: impl Into<String>) {
    let _ = out.send(OutputLine::Stdout(msg.into()));
}

/// Send a stderr line, ignoring a closed writer.
pub fn warn(out: &OutputSender, msg: impl Into<String>) {
    let _ = out.send(OutputLine::Stderr(msg.into()));
}
