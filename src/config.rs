//! Runtime configuration for both entry points.
//!
//! The supervisor can read its app list and timing from a JSON file; the
//! pipeline is configured from CLI flags only.

use crate::error::{Result, RunnerError};
use crate::model::{default_apps, LaunchDescriptor, Mode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub apps: Vec<LaunchDescriptor>,
    /// Wait between spawning the apps and opening browser tabs.
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub open_browser: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            apps: default_apps(),
            settle_delay: Duration::from_secs(3),
            poll_interval: Duration::from_secs(1),
            open_browser: true,
        }
    }
}

impl SupervisorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RunnerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| RunnerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `{config_dir}/smartfarm-runner/apps.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("smartfarm-runner").join("apps.json"))
    }

    /// Load `explicit` if given, else the default path if it exists, else defaults.
    /// Returns the file that was read, if any.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Ok((Self::load(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub mode: Mode,
    pub skip_preprocessing: bool,
    pub skip_training: bool,
    pub launch_app: bool,
    pub base_dir: PathBuf,
    /// Interpreter for the preprocessing and training scripts.
    pub python: String,
    /// Command prefix that serves the web app.
    pub streamlit: String,
}

impl PipelineOptions {
    pub fn new(mode: Mode, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            skip_preprocessing: false,
            skip_training: false,
            launch_app: true,
            base_dir: base_dir.into(),
            python: "python".into(),
            streamlit: "streamlit run".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"poll_interval": "250ms", "open_browser": false}}"#).unwrap();

        let cfg = SupervisorConfig::load(file.path()).unwrap();
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert!(!cfg.open_browser);
        assert_eq!(cfg.settle_delay, Duration::from_secs(3));
        assert_eq!(cfg.apps, default_apps());
    }

    #[test]
    fn apps_are_read_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"apps": [
                {{"name": "Second", "path": "b.py", "port": 9002}},
                {{"name": "First", "path": "a.py", "port": 9001}}
            ]}}"#
        )
        .unwrap();

        let cfg = SupervisorConfig::load(file.path()).unwrap();
        let names: Vec<_> = cfg.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = SupervisorConfig::discover(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, RunnerError::ConfigRead { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = SupervisorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, RunnerError::ConfigParse { .. }));
    }
}
