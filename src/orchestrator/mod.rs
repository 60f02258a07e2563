//! Application-level orchestration.
//!
//! This module owns the two run lifecycles: the pipeline sequencer, which
//! runs preprocessing, training and the web app one after another, and the
//! supervisor, which keeps several web apps running side by side until they
//! exit or a shutdown is requested. CLI layers call into this module and only
//! render what it reports.

mod pipeline;
mod shutdown;
mod supervisor;

pub use pipeline::{plan, run_pipeline, skipped_steps, PlannedStep};
pub use shutdown::Shutdown;
pub use supervisor::{SupervisionOutcome, Supervisor, Termination};
