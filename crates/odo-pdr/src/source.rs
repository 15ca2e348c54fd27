//! Frame sources for the live loop.
//!
//! The engine is fed line-by-line through the [`FrameSource`] trait so the
//! session loop runs identically against real hardware and replayed
//! captures. The serial implementation owns the port exclusively for the
//! session; dropping the source releases it on every exit path.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use tracing::info;

use odo_core::{Error, Result, SerialConfig};

/// Outcome of one read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRead {
    /// A complete, non-empty line
    Line(String),
    /// Nothing to process right now (timeout, blank line, partial line)
    Idle,
    /// The stream ended normally
    Closed,
}

/// Blocking, timeout-bounded line source.
pub trait FrameSource {
    fn read_line(&mut self) -> Result<SourceRead>;
}

/// Live sensor stream over a serial link at a fixed baud rate.
///
/// Reads are bounded by the configured timeout; a timeout surfaces as
/// [`SourceRead::Idle`] rather than blocking indefinitely. Bytes of a line
/// interrupted by a timeout are kept and completed on the next call.
/// Non-UTF-8 bytes are decoded lossily, matching the tolerant decoding of
/// the capture firmware's consumers.
pub struct SerialFrameSource {
    reader: BufReader<Box<dyn serialport::SerialPort>>,
    pending: Vec<u8>,
}

impl SerialFrameSource {
    /// Open the configured port; the handle is held for the whole session.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open()
            .map_err(|e| Error::Connection(format!("cannot open {}: {e}", config.port)))?;

        info!(port = %config.port, baud = config.baud_rate, "serial port open");
        Ok(Self {
            reader: BufReader::new(port),
            pending: Vec::new(),
        })
    }
}

impl FrameSource for SerialFrameSource {
    fn read_line(&mut self) -> Result<SourceRead> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) => Ok(SourceRead::Idle),
            Ok(_) if self.pending.ends_with(b"\n") => {
                let line = String::from_utf8_lossy(&self.pending).trim().to_string();
                self.pending.clear();
                if line.is_empty() {
                    Ok(SourceRead::Idle)
                } else {
                    Ok(SourceRead::Line(line))
                }
            }
            // newline not reached yet; keep the partial tail for next time
            Ok(_) => Ok(SourceRead::Idle),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(SourceRead::Idle),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(SourceRead::Idle),
            Err(e) => Err(Error::Connection(format!("serial read failed: {e}"))),
        }
    }
}

/// Line source over any buffered reader; used for tests and offline replay
/// of captured streams.
pub struct ReplaySource<R> {
    reader: R,
}

impl ReplaySource<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::Connection(format!("cannot open replay {}: {e}", path.as_ref().display()))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    fn read_line(&mut self) -> Result<SourceRead> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(SourceRead::Closed),
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    Ok(SourceRead::Idle)
                } else {
                    Ok(SourceRead::Line(trimmed.to_string()))
                }
            }
            Err(e) => Err(Error::Connection(format!("replay read failed: {e}"))),
        }
    }
}
