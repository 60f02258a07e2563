//! Text summary builder for pipeline runs.
//!
//! Formats the human-readable recap printed after the last step.

use crate::model::{PipelineReport, Step};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn step_label(step: Step) -> &'static str {
    match step {
        Step::Preprocess => "Preprocessing",
        Step::Train => "Training",
        Step::Launch => "Web app",
    }
}

/// Build a text summary from a finished pipeline report.
pub(crate) fn build_text_summary(report: &PipelineReport) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!(
        "Pipeline summary ({} mode, started {})",
        report.mode.as_str(),
        report.started_utc
    ));
    for outcome in &report.steps {
        let status = if outcome.exit_code == 0 {
            "ok".to_string()
        } else {
            format!("FAILED (return code {})", outcome.exit_code)
        };
        lines.push(format!("  {:<14} {}", step_label(outcome.step), status));
    }
    for step in &report.skipped {
        lines.push(format!("  {:<14} skipped", step_label(*step)));
    }

    let failed = report.failed_steps().count();
    if failed > 0 {
        // Later steps ran anyway and may have used stale outputs.
        lines.push(format!(
            "{failed} step(s) failed; later steps may have used stale data."
        ));
    }

    TextSummary { lines }
}
