//! Launchers for the smart farming web apps and the crop recommendation
//! pipeline.
//!
//! Two binaries share this crate: `run-all-apps` keeps the dashboards running
//! side by side, `run-pipeline` runs preprocessing, training and the web app
//! in sequence.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod process;
mod text_summary;
pub mod workspace;
