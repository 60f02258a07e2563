use crate::config::{PipelineOptions, SupervisorConfig};
use crate::model::{Mode, SupervisorEvent};
use crate::orchestrator::{self, Shutdown, SupervisionOutcome, Supervisor};
use crate::output::{say, spawn_output_writer, warn};
use crate::process::StreamlitLauncher;
use crate::text_summary::build_text_summary;
use crate::workspace::resolve_base_dir;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "smartfarm_runner=debug"
    } else {
        "smartfarm_runner=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "run-pipeline",
    version,
    about = "Run the Crop Recommendation System pipeline"
)]
pub struct PipelineCli {
    /// Run mode: 'basic' for the original dataset only, 'enhanced' for combined datasets
    #[arg(long, value_enum, default_value_t = Mode::Basic)]
    pub mode: Mode,

    /// Skip data preprocessing step
    #[arg(long)]
    pub skip_preprocessing: bool,

    /// Skip model training step
    #[arg(long)]
    pub skip_training: bool,

    /// Don't launch the web application
    #[arg(long)]
    pub no_app: bool,

    /// Project root holding src/ and webapp/ (defaults to the current directory)
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Interpreter for the preprocessing and training scripts
    #[arg(long, default_value = "python")]
    pub python: String,

    /// Command that serves the web app
    #[arg(long, default_value = "streamlit run")]
    pub streamlit: String,

    /// Print the run report as JSON instead of a text summary
    #[arg(long)]
    pub json: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Build `PipelineOptions` from CLI arguments.
pub fn build_pipeline_options(args: &PipelineCli) -> PipelineOptions {
    let mut opts = PipelineOptions::new(args.mode, resolve_base_dir(args.base_dir.as_deref()));
    opts.skip_preprocessing = args.skip_preprocessing;
    opts.skip_training = args.skip_training;
    opts.launch_app = !args.no_app;
    opts.python = args.python.clone();
    opts.streamlit = args.streamlit.clone();
    opts
}

pub async fn run_pipeline(args: PipelineCli) -> Result<()> {
    let opts = build_pipeline_options(&args);
    let (out_tx, out_handle) = spawn_output_writer();
    say(&out_tx, format!("Starting pipeline in {} mode", opts.mode.as_str()));

    let res = orchestrator::run_pipeline(&opts, &out_tx)
        .await
        .context("pipeline aborted");
    if let Ok(report) = res.as_ref() {
        if args.json {
            say(&out_tx, serde_json::to_string_pretty(report)?);
        } else {
            for line in build_text_summary(report).lines {
                say(&out_tx, line);
            }
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    res.map(|_| ())
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "run-all-apps",
    version,
    about = "Start all smart farming web apps and watch them until they exit"
)]
pub struct AppsCli {
    /// JSON file with the apps to run and timing; defaults to
    /// <config dir>/smartfarm-runner/apps.json when that exists
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Interpreter used to run `-m streamlit`
    #[arg(long, default_value = "python")]
    pub python: String,

    /// Do not open browser tabs
    #[arg(long)]
    pub no_browser: bool,

    /// Wait before opening browser tabs
    #[arg(long)]
    pub settle_delay: Option<humantime::Duration>,

    /// How often to check whether apps are still running
    #[arg(long)]
    pub poll_interval: Option<humantime::Duration>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolve the supervisor config: file (if any) first, then CLI overrides.
pub fn build_supervisor_config(args: &AppsCli) -> Result<SupervisorConfig> {
    let (mut cfg, source) =
        SupervisorConfig::discover(args.config.as_deref()).context("loading app config")?;
    if let Some(path) = source {
        info!(path = %path.display(), "loaded app config");
    }
    if args.no_browser {
        cfg.open_browser = false;
    }
    if let Some(d) = args.settle_delay {
        cfg.settle_delay = d.into();
    }
    if let Some(d) = args.poll_interval {
        cfg.poll_interval = d.into();
    }
    Ok(cfg)
}

pub async fn run_all_apps(args: AppsCli) -> Result<()> {
    let cfg = build_supervisor_config(&args)?;
    let (out_tx, out_handle) = spawn_output_writer();

    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<SupervisorEvent>();
    let render = {
        let out = out_tx.clone();
        tokio::spawn(async move {
            while let Some(ev) = evt_rx.recv().await {
                if ev.is_warning() {
                    warn(&out, ev.to_message());
                } else {
                    say(&out, ev.to_message());
                }
            }
        })
    };

    let rule = "=".repeat(42);
    say(&out_tx, rule.clone());
    say(&out_tx, "   Starting All Smart Farming Apps");
    say(&out_tx, rule);

    let shutdown = Shutdown::new();
    let ctrl_c = shutdown.trigger_on_ctrl_c();

    let launcher = Arc::new(StreamlitLauncher::new(args.python.clone()));
    let mut supervisor = Supervisor::new(launcher, &cfg, evt_tx);
    let launched = supervisor.launch_all(&cfg.apps).await;
    if cfg.open_browser && launched > 0 {
        supervisor.open_browser_tabs(&cfg.apps).await;
    }
    let outcome = supervisor.supervise(&shutdown).await;
    if let SupervisionOutcome::Interrupted { terminated } = outcome {
        info!(terminated, "stopped on interrupt");
    }

    ctrl_c.abort();
    // Dropping the supervisor closes the event channel and ends the renderer.
    drop(supervisor);
    let _ = render.await;
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}
