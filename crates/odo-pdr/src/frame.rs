//! Frame parsing for the serial line protocol.
//!
//! One ASCII line per sample, fields separated by `|`, at least 8 fields:
//! `raw_step|gx|gy|gz|ax|ay|az|imu_yaw`. Trailing extra fields are
//! tolerated and ignored. A reject leaves engine state untouched; the
//! caller logs and moves on to the next line.

use odo_core::{Error, Result, SensorFrame};

/// Number of fields the engine requires per line
pub const MIN_FIELDS: usize = 8;

const DELIMITER: char = '|';

/// Parse one raw line into a [`SensorFrame`].
pub fn parse_frame(line: &str) -> Result<SensorFrame> {
    let parts: Vec<&str> = line.trim().split(DELIMITER).collect();
    if parts.len() < MIN_FIELDS {
        return Err(Error::MalformedFrame {
            reason: format!("expected at least {MIN_FIELDS} fields, got {}", parts.len()),
        });
    }

    let mut values = [0.0f64; MIN_FIELDS];
    for (i, part) in parts[..MIN_FIELDS].iter().enumerate() {
        values[i] = part.trim().parse::<f64>().map_err(|_| Error::MalformedFrame {
            reason: format!("field {i} is not numeric: {part:?}"),
        })?;
    }

    Ok(SensorFrame {
        raw_step: values[0],
        gx: values[1],
        gy: values[2],
        gz: values[3],
        ax: values[4],
        ay: values[5],
        az: values[6],
        imu_yaw: values[7],
    })
}
