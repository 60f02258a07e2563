//! Preprocess → train → launch sequencing.
//!
//! Steps run one after another through the shell. Only a skip flag keeps a
//! step from running; a failed step is recorded and the next one starts
//! anyway.

use crate::config::PipelineOptions;
use crate::error::Result;
use crate::model::{Mode, PipelineReport, Step, StepOutcome};
use crate::output::{say, warn as warn_line, OutputSender};
use crate::process::run_command;
use crate::workspace::ensure_all_dirs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One step that will run, with its fully rendered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub step: Step,
    pub announcement: &'static str,
    pub script: PathBuf,
    pub command: String,
}

fn script_for(mode: Mode, step: Step) -> &'static str {
    match (mode, step) {
        (Mode::Basic, Step::Preprocess) => "src/preprocessing/preprocess_crop_data.py",
        (Mode::Enhanced, Step::Preprocess) => "src/preprocessing/preprocess_combined_data.py",
        (Mode::Basic, Step::Train) => "src/training/crop_prediction_model.py",
        (Mode::Enhanced, Step::Train) => "src/training/train_combined_model.py",
        (Mode::Basic, Step::Launch) => "webapp/app.py",
        (Mode::Enhanced, Step::Launch) => "webapp/app_combined.py",
    }
}

fn announcement_for(mode: Mode, step: Step) -> &'static str {
    match (mode, step) {
        (Mode::Basic, Step::Preprocess) => "Running basic data preprocessing...",
        (Mode::Enhanced, Step::Preprocess) => "Running combined data preprocessing...",
        (Mode::Basic, Step::Train) => "Training basic crop prediction model...",
        (Mode::Enhanced, Step::Train) => {
            "Training combined and extended crop prediction models..."
        }
        (Mode::Basic, Step::Launch) => "Launching basic web application...",
        (Mode::Enhanced, Step::Launch) => "Launching enhanced web application...",
    }
}

fn is_skipped(opts: &PipelineOptions, step: Step) -> bool {
    match step {
        Step::Preprocess => opts.skip_preprocessing,
        Step::Train => opts.skip_training,
        Step::Launch => !opts.launch_app,
    }
}

fn quote_path(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Steps that will run for `opts`, in execution order.
pub fn plan(opts: &PipelineOptions) -> Vec<PlannedStep> {
    Step::ALL
        .into_iter()
        .filter(|step| !is_skipped(opts, *step))
        .map(|step| {
            let script = opts.base_dir.join(script_for(opts.mode, step));
            let program = match step {
                Step::Preprocess | Step::Train => &opts.python,
                Step::Launch => &opts.streamlit,
            };
            PlannedStep {
                step,
                announcement: announcement_for(opts.mode, step),
                command: format!("{} {}", program, quote_path(&script)),
                script,
            }
        })
        .collect()
}

/// Steps turned off by configuration.
pub fn skipped_steps(opts: &PipelineOptions) -> Vec<Step> {
    Step::ALL
        .into_iter()
        .filter(|step| is_skipped(opts, *step))
        .collect()
}

/// Run every planned step in order and report each exit code.
pub async fn run_pipeline(opts: &PipelineOptions, out: &OutputSender) -> Result<PipelineReport> {
    let started_utc = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into());

    // Best effort: a failure here never stops the pipeline.
    say(out, "Calling ensure_all_dirs...");
    match ensure_all_dirs(&opts.base_dir).await {
        Ok(_) => say(out, "Directories ensured!"),
        Err(e) => {
            debug!("directory setup failed: {e:?}");
            warn_line(out, format!("Error ensuring directories: {e}"));
        }
    }
    say(out, format!("Base directory: {}", opts.base_dir.display()));

    let mut steps = Vec::new();
    for planned in plan(opts) {
        info!(step = ?planned.step, script = %planned.script.display(), "starting step");
        say(out, planned.announcement);
        let exit_code = run_command(&planned.command, out).await?;
        if exit_code != 0 {
            warn!(step = ?planned.step, exit_code, "step failed, continuing");
        }
        steps.push(StepOutcome {
            step: planned.step,
            command: planned.command,
            exit_code,
        });
    }

    Ok(PipelineReport {
        started_utc,
        mode: opts.mode,
        base_dir: opts.base_dir.clone(),
        steps,
        skipped: skipped_steps(opts),
    })
}
