use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Opens URLs for the operator. The supervisor holds one of these so tab
/// opening can be swapped out.
pub trait OpenUrl: Send + Sync {
    /// Start opening `url`. Returns once the request is handed off.
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// The platform's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl OpenUrl for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        open_url(url)
    }
}

/// Open a URL in the default browser.
///
/// Only a failure to start the opener is an error. The opener is reaped in
/// the background, so a slow `xdg-open` never delays the caller. Must be
/// called from within a tokio runtime.
pub fn open_url(url: &str) -> std::io::Result<()> {
    let mut child = opener(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let url = url.to_string();
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if !status.success() => debug!(%url, %status, "browser opener failed"),
            Err(e) => debug!(%url, "waiting on browser opener: {e}"),
            Ok(_) => {}
        }
    });
    Ok(())
}

#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}
