//! Operator binary for live odo PDR sessions.
//!
//! Wires configuration, artifacts, the serial (or replay) source and the
//! Ctrl-C handler together, runs one session to completion and reports a
//! summary. All session state lives in the engine; this binary is glue.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use odo_core::{Position2D, SessionConfig, StandardScaler};
use odo_model::{StepLengthNet, StepLengthNetConfig};
use odo_pdr::{
    run_session, FrameSource, PdrEngine, ReplaySource, SerialFrameSource, Termination,
    TrajectoryObserver,
};

#[derive(Parser, Debug)]
#[command(name = "odo", about = "Live pedestrian dead-reckoning over a serial IMU stream")]
struct Args {
    /// Configuration file (TOML/JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<String>,

    /// Serial device override (e.g. /dev/ttyUSB0)
    #[arg(long)]
    port: Option<String>,

    /// Baud rate override
    #[arg(long)]
    baud: Option<u32>,

    /// Replay a captured stream from a file instead of opening the port
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Feature scaler artifact override
    #[arg(long)]
    scaler: Option<PathBuf>,

    /// Model checkpoint override
    #[arg(long)]
    model: Option<PathBuf>,

    /// Session log destination override
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Logs every position update; stands where the live trajectory plot of
/// the original tooling used to be.
struct TraceObserver;

impl TrajectoryObserver for TraceObserver {
    fn on_position(&mut self, position: &Position2D, step_index: u32) {
        info!(step = step_index, x_m = position.x, y_m = position.y, "position");
    }
}

fn load_config(args: &Args) -> anyhow::Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => SessionConfig::default(),
    };

    if let Some(port) = &args.port {
        config.serial.port = port.clone();
    }
    if let Some(baud) = args.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(scaler) = &args.scaler {
        config.artifacts.scaler_path = scaler.clone();
    }
    if let Some(model) = &args.model {
        config.artifacts.model_path = model.clone();
    }
    if let Some(output) = &args.output {
        config.artifacts.output_path = output.clone();
    }

    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!(
        scaler = %config.artifacts.scaler_path.display(),
        model = %config.artifacts.model_path.display(),
        "loading estimator artifacts"
    );
    let scaler = StandardScaler::from_json_file(&config.artifacts.scaler_path)?;
    let net = StepLengthNet::load(
        &config.artifacts.model_path,
        StepLengthNetConfig {
            window_size: config.engine.window_size,
            ..StepLengthNetConfig::default()
        },
    )?;

    let mut engine = PdrEngine::new(
        config.engine.clone(),
        config.walker,
        scaler,
        Box::new(net),
    )
    .with_observer(Box::new(TraceObserver));

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .context("installing interrupt handler")?;
    }

    let mut source: Box<dyn FrameSource> = match &args.replay {
        Some(path) => {
            info!(replay = %path.display(), "replaying captured stream");
            Box::new(ReplaySource::from_path(path)?)
        }
        None => Box::new(SerialFrameSource::open(&config.serial)?),
    };

    let output_path = stamped_output_path(&config.artifacts.output_path);
    let file = File::create(&output_path)
        .with_context(|| format!("creating session log {}", output_path.display()))?;
    let mut sink = BufWriter::new(file);

    let summary = run_session(&mut engine, source.as_mut(), &shutdown, &mut sink)?;

    info!(
        session = %summary.session_id,
        frames = summary.frames_processed,
        discarded = summary.frames_discarded,
        steps = summary.steps_recorded,
        skipped = summary.estimates_skipped,
        output = %output_path.display(),
        "session finished"
    );

    match summary.termination {
        Termination::ConnectionLost(reason) => anyhow::bail!("connection lost: {reason}"),
        Termination::EndOfStream | Termination::Interrupted => Ok(()),
    }
}

/// Insert a local timestamp before the extension so successive sessions
/// never overwrite each other.
fn stamped_output_path(base: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("trajectory");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    base.with_file_name(format!("{stem}_{stamp}.{ext}"))
}
