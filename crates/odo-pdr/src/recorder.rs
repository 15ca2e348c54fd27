//! Session recording and one-shot CSV flush.
//!
//! Records accumulate in memory during the session and are written once at
//! termination, on every exit path. The output starts with a UTF-8 BOM so
//! downstream spreadsheet tooling detects the encoding.

use std::io::Write;

use odo_core::{Result, StepRecord};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";
const HEADER: &str = "step_index,step_length_m,x_m,y_m,heading_deg";

/// Result of flushing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Number of rows written
    Written(usize),
    /// Nothing was recorded; no bytes were written
    Empty,
}

/// Ordered in-memory log of successfully estimated steps.
#[derive(Debug, Default)]
pub struct SessionRecorder {
    records: Vec<StepRecord>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based index the next recorded step will carry.
    pub fn next_index(&self) -> u32 {
        self.records.len() as u32 + 1
    }

    pub fn record(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Write all records in insertion order, then clear the log so a stray
    /// second call cannot duplicate rows. An empty session writes nothing.
    pub fn flush(&mut self, out: &mut dyn Write) -> Result<FlushOutcome> {
        if self.records.is_empty() {
            return Ok(FlushOutcome::Empty);
        }

        out.write_all(UTF8_BOM)?;
        writeln!(out, "{HEADER}")?;
        for r in &self.records {
            writeln!(
                out,
                "{},{:.4},{:.4},{:.4},{:.2}",
                r.step_index, r.step_length_m, r.x_m, r.y_m, r.heading_deg
            )?;
        }
        out.flush()?;

        let written = self.records.len();
        self.records.clear();
        Ok(FlushOutcome::Written(written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: u32) -> StepRecord {
        StepRecord {
            step_index: i,
            step_length_m: 0.75,
            x_m: i as f64,
            y_m: 0.0,
            heading_deg: 0.0,
        }
    }

    #[test]
    fn test_empty_session_writes_nothing() {
        let mut recorder = SessionRecorder::new();
        let mut out = Vec::new();
        assert_eq!(recorder.flush(&mut out).unwrap(), FlushOutcome::Empty);
        assert!(out.is_empty());
    }

    #[test]
    fn test_flush_writes_bom_header_and_rows() {
        let mut recorder = SessionRecorder::new();
        recorder.record(record(1));
        recorder.record(record(2));

        let mut out = Vec::new();
        assert_eq!(recorder.flush(&mut out).unwrap(), FlushOutcome::Written(2));

        assert_eq!(&out[..3], b"\xef\xbb\xbf");
        let text = String::from_utf8(out[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("1,0.7500,1.0000,0.0000,0.00"));
        assert_eq!(lines.next(), Some("2,0.7500,2.0000,0.0000,0.00"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_second_flush_cannot_duplicate_rows() {
        let mut recorder = SessionRecorder::new();
        recorder.record(record(1));

        let mut first = Vec::new();
        recorder.flush(&mut first).unwrap();

        let mut second = Vec::new();
        assert_eq!(recorder.flush(&mut second).unwrap(), FlushOutcome::Empty);
        assert!(second.is_empty());
    }

    #[test]
    fn test_next_index_is_one_based() {
        let mut recorder = SessionRecorder::new();
        assert_eq!(recorder.next_index(), 1);
        recorder.record(record(1));
        assert_eq!(recorder.next_index(), 2);
    }
}
