use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Static description of one web app to launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    pub name: String,
    pub path: PathBuf,
    pub port: u16,
}

impl LaunchDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            port,
        }
    }

    /// Local URL the app serves on.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Script file name without its extension, e.g. `app` for `src/webapp/app.py`.
    pub fn app_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// The three dashboards served side by side.
pub fn default_apps() -> Vec<LaunchDescriptor> {
    vec![
        LaunchDescriptor::new("Field Analyzer", "src/webapp/app.py", 8501),
        LaunchDescriptor::new(
            "Basic Crop Recommender",
            "src/webapp/crop_recommendation_app.py",
            8502,
        ),
        LaunchDescriptor::new(
            "Advanced Crop Recommender",
            "src/webapp/combined_model_app.py",
            8503,
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Original crop dataset only
    Basic,
    /// Combined datasets
    Enhanced,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Enhanced => "enhanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Preprocess,
    Train,
    Launch,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Preprocess, Step::Train, Step::Launch];
}

/// Exit code of one executed pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: Step,
    pub command: String,
    pub exit_code: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub started_utc: String,
    pub mode: Mode,
    pub base_dir: PathBuf,
    pub steps: Vec<StepOutcome>,
    pub skipped: Vec<Step>,
}

impl PipelineReport {
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| s.exit_code != 0)
    }
}

/// Events emitted by the supervisor and rendered by the CLI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisorEvent {
    Launched {
        app_name: String,
        url: String,
    },
    LaunchFailed {
        name: String,
        port: u16,
        error: String,
    },
    BrowserOpened {
        name: String,
        url: String,
    },
    BrowserFailed {
        url: String,
        error: String,
    },
    AllRunning,
    Terminated {
        name: String,
        port: u16,
        exit_code: Option<i32>,
        stderr: String,
    },
    AllExited,
    Stopping,
    Stopped,
}

impl SupervisorEvent {
    /// Render a human-readable message for the console.
    pub fn to_message(&self) -> String {
        match self {
            SupervisorEvent::Launched { app_name, url } => {
                format!("Starting {} on {}", app_name, url)
            }
            SupervisorEvent::LaunchFailed { name, port, error } => {
                format!("ERROR: failed to start {} on port {}: {}", name, port, error)
            }
            SupervisorEvent::BrowserOpened { name, url } => {
                format!("Opening {} at {}", name, url)
            }
            SupervisorEvent::BrowserFailed { url, error } => {
                format!("Could not open browser for {}: {}", url, error)
            }
            SupervisorEvent::AllRunning => {
                "\nAll apps are running. Press Ctrl+C to stop all apps.".to_string()
            }
            SupervisorEvent::Terminated {
                name,
                port,
                exit_code,
                stderr,
            } => {
                let mut msg = format!("WARNING: {} on port {} has terminated.", name, port);
                if let Some(code) = exit_code {
                    msg.push_str(&format!(" (exit code {})", code));
                }
                if !stderr.trim().is_empty() {
                    msg.push_str(&format!("\nError from {}: {}", name, stderr.trim_end()));
                }
                msg
            }
            SupervisorEvent::AllExited => "All apps have terminated. Exiting.".to_string(),
            SupervisorEvent::Stopping => "\nStopping all apps...".to_string(),
            SupervisorEvent::Stopped => "All apps stopped.".to_string(),
        }
    }

    /// Whether the message belongs on stderr rather than stdout.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SupervisorEvent::LaunchFailed { .. }
                | SupervisorEvent::BrowserFailed { .. }
                | SupervisorEvent::Terminated { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_apps_use_consecutive_ports() {
        let ports: Vec<u16> = default_apps().iter().map(|a| a.port).collect();
        assert_eq!(ports, vec![8501, 8502, 8503]);
    }

    #[test]
    fn app_name_is_script_stem() {
        let app = LaunchDescriptor::new("Basic", "src/webapp/crop_recommendation_app.py", 8502);
        assert_eq!(app.app_name(), "crop_recommendation_app");
        assert_eq!(app.url(), "http://localhost:8502");
    }

    #[test]
    fn terminated_message_names_app_and_port() {
        let ev = SupervisorEvent::Terminated {
            name: "Basic Crop Recommender".into(),
            port: 8502,
            exit_code: Some(1),
            stderr: "Traceback: boom\n".into(),
        };
        let msg = ev.to_message();
        assert!(msg.starts_with("WARNING: Basic Crop Recommender on port 8502 has terminated."));
        assert!(msg.contains("Error from Basic Crop Recommender: Traceback: boom"));
        assert!(ev.is_warning());
    }

    #[test]
    fn terminated_message_omits_empty_stderr() {
        let ev = SupervisorEvent::Terminated {
            name: "Field Analyzer".into(),
            port: 8501,
            exit_code: None,
            stderr: "  \n".into(),
        };
        assert!(!ev.to_message().contains("Error from"));
    }
}
