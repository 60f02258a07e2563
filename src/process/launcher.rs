use crate::error::{Result, RunnerError};
use crate::model::LaunchDescriptor;
use crate::process::request_termination;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::debug;

/// How long to wait for a dead child's stderr pipe to close. A grandchild
/// holding the pipe open would otherwise stall the poll loop.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Turns a descriptor into the command that serves it.
pub trait Launch: Send + Sync {
    fn command(&self, app: &LaunchDescriptor) -> Command;
}

/// Serves a Streamlit script with `{python} -m streamlit run`.
#[derive(Debug, Clone)]
pub struct StreamlitLauncher {
    python: String,
}

impl StreamlitLauncher {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

impl Default for StreamlitLauncher {
    fn default() -> Self {
        Self::new("python")
    }
}

impl Launch for StreamlitLauncher {
    fn command(&self, app: &LaunchDescriptor) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(["-m", "streamlit", "run"])
            .arg(&app.path)
            .arg("--server.port")
            .arg(app.port.to_string());
        cmd
    }
}

/// A descriptor bound to its live process.
pub struct AppHandle {
    descriptor: LaunchDescriptor,
    child: Child,
    stderr: Option<JoinHandle<String>>,
}

impl AppHandle {
    pub fn descriptor(&self) -> &LaunchDescriptor {
        &self.descriptor
    }

    /// OS process id, `None` once the child has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Non-blocking exit check.
    pub fn try_exit(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Everything the child wrote to stderr. Only meaningful after exit.
    pub async fn take_stderr(&mut self) -> String {
        let Some(mut task) = self.stderr.take() else {
            return String::new();
        };
        match tokio::time::timeout(STDERR_GRACE, &mut task).await {
            Ok(Ok(text)) => text,
            Ok(Err(_)) => String::new(),
            Err(_) => {
                task.abort();
                String::new()
            }
        }
    }

    /// Send a graceful termination request.
    pub fn terminate(&mut self) -> std::io::Result<()> {
        request_termination(&mut self.child)
    }
}

impl std::fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppHandle")
            .field("descriptor", &self.descriptor)
            .field("pid", &self.child.id())
            .finish()
    }
}

/// Spawn the server for one descriptor. Returns as soon as the process exists.
pub fn spawn_app(launcher: &dyn Launch, descriptor: LaunchDescriptor) -> Result<AppHandle> {
    let mut cmd = launcher.command(&descriptor);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
        command: format!("{:?}", cmd.as_std()),
        source,
    })?;
    debug!(name = %descriptor.name, port = descriptor.port, pid = ?child.id(), "spawned app");

    let stderr = child.stderr.take().map(|s| tokio::spawn(read_all(s)));
    Ok(AppHandle {
        descriptor,
        child,
        stderr,
    })
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}
