//! Multi-app supervision.
//!
//! Owns the set of running apps from spawn to exit, reports each exit and
//! broadcasts a graceful termination when shut down.

use crate::config::SupervisorConfig;
use crate::model::{LaunchDescriptor, SupervisorEvent};
use crate::orchestrator::Shutdown;
use crate::process::{self, spawn_app, AppHandle, Launch, OpenUrl, SystemBrowser};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// How a supervision run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionOutcome {
    /// Every app exited on its own.
    AllExited,
    /// Shutdown fired while apps were still running.
    Interrupted { terminated: usize },
}

/// An exit observed by `poll_once`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    pub descriptor: LaunchDescriptor,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

pub struct Supervisor {
    launcher: Arc<dyn Launch>,
    opener: Arc<dyn OpenUrl>,
    active: Vec<AppHandle>,
    settle_delay: Duration,
    poll_interval: Duration,
    event_tx: UnboundedSender<SupervisorEvent>,
}

impl Supervisor {
    pub fn new(
        launcher: Arc<dyn Launch>,
        cfg: &SupervisorConfig,
        event_tx: UnboundedSender<SupervisorEvent>,
    ) -> Self {
        Self {
            launcher,
            opener: Arc::new(SystemBrowser),
            active: Vec::new(),
            settle_delay: cfg.settle_delay,
            poll_interval: cfg.poll_interval,
            event_tx,
        }
    }

    /// Replace the system browser used by `open_browser_tabs`.
    pub fn with_opener(mut self, opener: Arc<dyn OpenUrl>) -> Self {
        self.opener = opener;
        self
    }

    /// Apps not yet seen to exit, in launch order.
    pub fn active(&self) -> &[AppHandle] {
        &self.active
    }

    fn emit(&self, ev: SupervisorEvent) {
        let _ = self.event_tx.send(ev);
    }

    /// Spawn one app and add it to the active set.
    pub fn launch(&mut self, descriptor: LaunchDescriptor) -> crate::error::Result<&AppHandle> {
        let handle = spawn_app(self.launcher.as_ref(), descriptor)?;
        self.track(handle);
        Ok(&self.active[self.active.len() - 1])
    }

    fn track(&mut self, handle: AppHandle) {
        let d = handle.descriptor();
        self.emit(SupervisorEvent::Launched {
            app_name: d.app_name(),
            url: d.url(),
        });
        self.active.push(handle);
    }

    fn report_launch_failure(&self, descriptor: &LaunchDescriptor, error: String) {
        debug!(name = %descriptor.name, port = descriptor.port, "launch failed: {error}");
        self.emit(SupervisorEvent::LaunchFailed {
            name: descriptor.name.clone(),
            port: descriptor.port,
            error,
        });
    }

    /// Spawn every app, one blocking task per descriptor. The active set
    /// keeps input order regardless of which spawn finishes first.
    pub async fn launch_all(&mut self, descriptors: &[LaunchDescriptor]) -> usize {
        let tasks: Vec<_> = descriptors
            .iter()
            .cloned()
            .map(|d| {
                let launcher = self.launcher.clone();
                tokio::task::spawn_blocking(move || spawn_app(launcher.as_ref(), d))
            })
            .collect();

        let mut launched = 0;
        let results = futures::future::join_all(tasks).await;
        for (descriptor, res) in descriptors.iter().zip(results) {
            match res {
                Ok(Ok(handle)) => {
                    self.track(handle);
                    launched += 1;
                }
                Ok(Err(e)) => self.report_launch_failure(descriptor, e.to_string()),
                Err(e) => self.report_launch_failure(descriptor, e.to_string()),
            }
        }
        info!(launched, requested = descriptors.len(), "apps launched");
        launched
    }

    /// Wait for the apps to settle, then open one browser tab per app.
    pub async fn open_browser_tabs(&self, descriptors: &[LaunchDescriptor]) {
        tokio::time::sleep(self.settle_delay).await;
        for d in descriptors {
            let url = d.url();
            self.emit(SupervisorEvent::BrowserOpened {
                name: d.name.clone(),
                url: url.clone(),
            });
            if let Err(e) = self.opener.open(&url) {
                debug!(%url, "browser open failed: {e}");
                self.emit(SupervisorEvent::BrowserFailed {
                    url,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Check every active app once and drop the ones that have exited.
    pub async fn poll_once(&mut self) -> Vec<Termination> {
        let mut exited = Vec::new();
        let mut i = 0;
        while i < self.active.len() {
            let status = match self.active[i].try_exit() {
                Ok(Some(status)) => Some(process::exit_code(status)),
                Ok(None) => {
                    i += 1;
                    continue;
                }
                Err(e) => {
                    // The child can no longer be waited on; treat it as gone.
                    warn!(name = %self.active[i].descriptor().name, "wait failed: {e}");
                    None
                }
            };
            let mut handle = self.active.remove(i);
            let stderr = handle.take_stderr().await;
            let descriptor = handle.descriptor().clone();
            debug!(name = %descriptor.name, port = descriptor.port, exit_code = ?status, "app terminated");
            self.emit(SupervisorEvent::Terminated {
                name: descriptor.name.clone(),
                port: descriptor.port,
                exit_code: status,
                stderr: stderr.clone(),
            });
            exited.push(Termination {
                descriptor,
                exit_code: status,
                stderr,
            });
        }
        exited
    }

    /// Poll until every app has exited or `shutdown` fires.
    pub async fn supervise(&mut self, shutdown: &Shutdown) -> SupervisionOutcome {
        self.emit(SupervisorEvent::AllRunning);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    return self.stop_all();
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            let exited = self.poll_once().await;
            debug!(exited = exited.len(), remaining = self.active.len(), "poll");
            if self.active.is_empty() {
                self.emit(SupervisorEvent::AllExited);
                return SupervisionOutcome::AllExited;
            }
        }
    }

    /// Ask every remaining app to terminate. Does not wait for them.
    fn stop_all(&mut self) -> SupervisionOutcome {
        self.emit(SupervisorEvent::Stopping);
        let mut terminated = 0;
        for handle in &mut self.active {
            match handle.terminate() {
                Ok(()) => terminated += 1,
                Err(e) => warn!(name = %handle.descriptor().name, "terminate failed: {e}"),
            }
        }
        info!(terminated, "termination requested");
        self.emit(SupervisorEvent::Stopped);
        SupervisionOutcome::Interrupted { terminated }
    }
}
