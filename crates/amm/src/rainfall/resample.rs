use chrono::{Duration, NaiveDateTime};

use crate::config::AmmConfig;
use crate::error::SeriesError;

use super::types::{Observation, RainFormat, RainfallSeries, RawRainfall};

/// A depth spread at constant intensity over `[from, to)`, in seconds
/// relative to the grid start.
#[derive(Debug, Clone, Copy)]
struct Piece {
    from: i64,
    to: i64,
    depth: f64,
}

/// Conform `raw` to the run window and step of `config`.
pub fn conform(raw: &RawRainfall, config: &AmmConfig) -> Result<RainfallSeries, SeriesError> {
    conform_to_grid(raw, config.start, config.step_seconds, config.step_count())
}

/// Conform `raw` to `steps` uniform steps of `step_seconds` from `start`.
///
/// Each observation's depth is allocated to calculation steps in proportion
/// to overlap, so the total depth inside the window is preserved.
pub fn conform_to_grid(
    raw: &RawRainfall,
    start: NaiveDateTime,
    step_seconds: i64,
    steps: usize,
) -> Result<RainfallSeries, SeriesError> {
    raw.validate()?;
    if step_seconds <= 0 {
        return Err(SeriesError::InvalidInterval {
            seconds: step_seconds,
        });
    }
    if steps == 0 {
        return Err(SeriesError::NoOverlap);
    }

    let pieces = pieces(raw, start);
    let (span_from, span_to) = record_span(raw, start);
    let window_to = step_seconds * steps as i64;
    if span_to <= 0 || span_from >= window_to {
        return Err(SeriesError::NoOverlap);
    }

    let mut depths = vec![0.0; steps];
    for piece in pieces {
        allocate(piece, step_seconds, &mut depths);
    }
    Ok(RainfallSeries::from_parts(start, step_seconds, depths))
}

fn offset(t: NaiveDateTime, start: NaiveDateTime) -> i64 {
    (t - start).num_seconds()
}

/// Time covered by the record, relative to the grid start.
fn record_span(raw: &RawRainfall, start: NaiveDateTime) -> (i64, i64) {
    let obs = &raw.observations;
    let first = offset(obs[0].timestamp, start);
    let last = offset(obs[obs.len() - 1].timestamp, start);
    match raw.format {
        RainFormat::Cumulative => (first, last),
        RainFormat::Volume | RainFormat::Intensity => (first, last + raw.recording_interval_seconds),
    }
}

fn pieces(raw: &RawRainfall, start: NaiveDateTime) -> Vec<Piece> {
    let obs = &raw.observations;
    match raw.format {
        RainFormat::Cumulative => obs
            .windows(2)
            .map(|pair| Piece {
                from: offset(pair[0].timestamp, start),
                to: offset(pair[1].timestamp, start),
                depth: pair[1].value - pair[0].value,
            })
            .collect(),
        RainFormat::Volume | RainFormat::Intensity => obs
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let from = offset(o.timestamp, start);
                let mut to = from + raw.recording_interval_seconds;
                // A reading never extends past the next one.
                if let Some(next) = obs.get(i + 1) {
                    to = to.min(offset(next.timestamp, start));
                }
                let depth = match raw.format {
                    RainFormat::Intensity => o.value * (to - from) as f64 / 3600.0,
                    _ => o.value,
                };
                Piece { from, to, depth }
            })
            .collect(),
    }
}

fn allocate(piece: Piece, step_seconds: i64, depths: &mut [f64]) {
    if piece.depth <= 0.0 || piece.to <= piece.from {
        return;
    }
    let duration = (piece.to - piece.from) as f64;
    let first = piece.from.div_euclid(step_seconds).max(0) as usize;
    for (k, slot) in depths.iter_mut().enumerate().skip(first) {
        let step_from = k as i64 * step_seconds;
        if step_from >= piece.to {
            break;
        }
        let step_to = step_from + step_seconds;
        let overlap = piece.to.min(step_to) - piece.from.max(step_from);
        if overlap > 0 {
            *slot += piece.depth * (overlap as f64 / duration);
        }
    }
}

/// Reject empty, unordered or non-finite instantaneous records. Negative
/// values are allowed.
pub(crate) fn validate_instantaneous(observations: &[Observation]) -> Result<(), SeriesError> {
    if observations.is_empty() {
        return Err(SeriesError::Empty);
    }
    for (index, obs) in observations.iter().enumerate() {
        if !obs.value.is_finite() {
            return Err(SeriesError::InvalidValue {
                index,
                value: obs.value,
            });
        }
        if index > 0 && obs.timestamp <= observations[index - 1].timestamp {
            return Err(SeriesError::NonMonotonic { index });
        }
    }
    Ok(())
}

/// Value of an instantaneous record at `when`, linear between the readings
/// either side. `None` outside the record.
pub fn interpolate(observations: &[Observation], when: NaiveDateTime) -> Option<f64> {
    let after = observations.partition_point(|o| o.timestamp <= when);
    let before = observations.get(after.checked_sub(1)?)?;
    if before.timestamp == when {
        return Some(before.value);
    }
    let next = observations.get(after)?;
    let span = (next.timestamp - before.timestamp).num_milliseconds() as f64;
    let elapsed = (when - before.timestamp).num_milliseconds() as f64;
    Some(before.value + (next.value - before.value) * elapsed / span)
}

/// Sample an instantaneous record at the start of each of `steps` uniform
/// steps. The record must span every sampled instant.
pub fn sample_to_grid(
    observations: &[Observation],
    start: NaiveDateTime,
    step_seconds: i64,
    steps: usize,
) -> Result<Vec<f64>, SeriesError> {
    validate_instantaneous(observations)?;
    if step_seconds <= 0 {
        return Err(SeriesError::InvalidInterval {
            seconds: step_seconds,
        });
    }
    let partial = || SeriesError::PartialCoverage {
        covered_from: observations[0].timestamp,
        covered_to: observations[observations.len() - 1].timestamp,
    };
    (0..steps)
        .map(|i| {
            let when = start + Duration::seconds(step_seconds * i as i64);
            interpolate(observations, when).ok_or_else(partial)
        })
        .collect()
}
