//! The live session loop.
//!
//! Single-threaded and cooperative: read one line, process it fully, log
//! what happened, repeat. Per-frame errors never escalate past their
//! iteration; only connection faults end the session. Whatever path the
//! loop exits through, the recorder flushes exactly once before this
//! module returns.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use odo_core::{Error, Result, SessionId};

use crate::engine::{FrameOutcome, PdrEngine};
use crate::recorder::FlushOutcome;
use crate::source::{FrameSource, SourceRead};

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The source reported end-of-stream
    EndOfStream,
    /// The shutdown flag was raised (user interrupt)
    Interrupted,
    /// The link failed unrecoverably
    ConnectionLost(String),
}

/// Outcome report for one completed session.
#[derive(Debug)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub frames_processed: u64,
    pub frames_discarded: u64,
    pub steps_recorded: u32,
    pub estimates_skipped: u64,
    pub termination: Termination,
    pub flush: FlushOutcome,
}

/// Drive the engine from the source until the stream ends, the shutdown
/// flag is raised, or the connection fails; then flush the session log.
pub fn run_session(
    engine: &mut PdrEngine,
    source: &mut dyn FrameSource,
    shutdown: &AtomicBool,
    sink: &mut dyn Write,
) -> Result<SessionSummary> {
    let session_id = engine.session_id();
    info!(%session_id, "session started");

    let mut frames_processed = 0u64;
    let mut frames_discarded = 0u64;
    let mut estimates_skipped = 0u64;

    let termination = loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("interrupt received, shutting down");
            break Termination::Interrupted;
        }

        let line = match source.read_line() {
            Ok(SourceRead::Line(line)) => line,
            Ok(SourceRead::Idle) => continue,
            Ok(SourceRead::Closed) => {
                info!("input stream ended");
                break Termination::EndOfStream;
            }
            Err(Error::Connection(reason)) => {
                error!(%reason, "connection lost");
                break Termination::ConnectionLost(reason);
            }
            Err(other) => {
                error!(error = %other, "unrecoverable read failure");
                break Termination::ConnectionLost(other.to_string());
            }
        };

        match engine.process_line(&line) {
            Ok(FrameOutcome::Buffered) => frames_processed += 1,
            Ok(FrameOutcome::Step(record)) => {
                frames_processed += 1;
                info!(
                    step = record.step_index,
                    length_m = record.step_length_m,
                    x_m = record.x_m,
                    y_m = record.y_m,
                    heading_deg = record.heading_deg,
                    "step recorded"
                );
            }
            Ok(FrameOutcome::EstimateSkipped(reason)) => {
                frames_processed += 1;
                estimates_skipped += 1;
                warn!(%reason, "estimation failed, step skipped");
            }
            Err(reason) => {
                frames_discarded += 1;
                warn!(%reason, %line, "frame discarded");
            }
        }
    };

    // guaranteed flush, identical on every termination path
    let steps_recorded = engine.steps_recorded() as u32;
    let flush = engine.flush_records(sink)?;
    match flush {
        FlushOutcome::Written(rows) => info!(rows, "session log flushed"),
        FlushOutcome::Empty => warn!("no steps recorded this session, nothing written"),
    }

    Ok(SessionSummary {
        session_id,
        frames_processed,
        frames_discarded,
        steps_recorded,
        estimates_skipped,
        termination,
        flush,
    })
}
