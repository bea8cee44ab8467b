// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use indexmap::IndexMap;
use serde_json::Value;

use crate::errors::{EngineError, Result};
use crate::model::record::number_value;
use crate::model::{Record, DURATION, TIMESTAMP};
use crate::observability::messages::time_sync::{PaddingApplied, TimeSyncCompleted};
use crate::observability::messages::StructuredLog;
use crate::parameters::{AggregationMethod, ParameterRegistry};
use crate::time_sync::TimeParams;
use crate::utils::expression::evaluate_record;

/// A validated input record.
struct Observation {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration: i64,
    /// Evaluated fields, `timestamp` and `duration` excluded.
    fields: Record,
}

/// One resolution-sized slice of the timeline.
struct Tick {
    at: DateTime<Utc>,
    fields: Record,
}

/// Synchronize `records` onto the window described by `params`.
///
/// Records are checked in the order given; they are not sorted first, so an
/// out-of-order sequence is reported as an overlap.
pub fn synchronize(
    records: &[Record],
    params: &TimeParams,
    registry: &ParameterRegistry,
) -> Result<Vec<Record>> {
    let observations = records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_observation(index, record, params))
        .collect::<Result<Vec<_>>>()?;

    check_overlaps(&observations)?;

    let (pad_start, pad_end) = padding_needed(&observations, params);
    if pad_start || pad_end {
        if !params.allow_padding {
            return Err(EngineError::InvalidPadding {
                start: pad_start,
                end: pad_end,
            });
        }
        PaddingApplied {
            start: pad_start,
            end: pad_end,
        }
        .log();
    }

    let mut ticks = Vec::new();
    match (observations.first(), observations.last()) {
        (Some(first), Some(last)) => {
            if pad_start {
                ticks.extend(fill(params.start, first.start, &first.fields, params, registry));
            }
            for (index, observation) in observations.iter().enumerate() {
                if index > 0 {
                    let previous_end = observations[index - 1].end;
                    ticks.extend(fill(previous_end, observation.start, &observation.fields, params, registry));
                }
                ticks.extend(expand(observation, params, registry));
            }
            if pad_end {
                ticks.extend(fill(last.end, params.end, &last.fields, params, registry));
            }
        }
        _ => ticks.extend(fill(params.start, params.end, &Record::new(), params, registry)),
    }

    ticks.sort_by_key(|tick| tick.at);

    let outputs = resample(&ticks, params, registry);

    TimeSyncCompleted {
        input_count: records.len(),
        tick_count: ticks.len(),
        output_count: outputs.len(),
    }
    .log();

    Ok(outputs)
}

fn parse_observation(index: usize, record: &Record, params: &TimeParams) -> Result<Observation> {
    let mut fields = evaluate_record(record)?;

    let start = match fields.shift_remove(TIMESTAMP) {
        None | Some(Value::Null) => {
            return Err(EngineError::InputValidation(format!(
                "timestamp is required in inputs[{}]",
                index
            )))
        }
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc).trunc_subsecs(0))
            .map_err(|_| EngineError::InvalidDate { index, value: raw })?,
        Some(other) => {
            return Err(EngineError::InvalidDate {
                index,
                value: other.to_string(),
            })
        }
    };

    let duration = fields
        .shift_remove(DURATION)
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            EngineError::InputValidation(format!("duration in inputs[{}] must be a number", index))
        })?;
    if duration < 0.0 || duration.fract() != 0.0 {
        return Err(EngineError::InputValidation(format!(
            "duration in inputs[{}] must be a whole, non-negative number of seconds, got {}",
            index, duration
        )));
    }
    let duration = duration as i64;

    let end = Duration::try_seconds(duration)
        .and_then(|length| start.checked_add_signed(length))
        .ok_or_else(|| {
            EngineError::InputValidation(format!(
                "duration {} in inputs[{}] runs past the supported date range",
                duration, index
            ))
        })?;

    let resolution = params.resolution;
    if duration % resolution != 0 {
        return Err(EngineError::Config(format!(
            "upsampling-resolution {} does not evenly divide duration {} of inputs[{}]",
            resolution, duration, index
        )));
    }
    let offset = (start - params.start).num_seconds();
    if offset % resolution != 0 {
        return Err(EngineError::Config(format!(
            "inputs[{}] starts {}s from start-time, which is not a multiple of upsampling-resolution {}",
            index, offset, resolution
        )));
    }

    Ok(Observation {
        start,
        end,
        duration,
        fields,
    })
}

fn check_overlaps(observations: &[Observation]) -> Result<()> {
    for (index, pair) in observations.windows(2).enumerate() {
        if pair[0].end > pair[1].start {
            return Err(EngineError::ObservationOverlap { index: index + 1 });
        }
    }
    Ok(())
}

/// Which window edges lack coverage, as `(start, end)`.
fn padding_needed(observations: &[Observation], params: &TimeParams) -> (bool, bool) {
    match (observations.first(), observations.last()) {
        (Some(first), Some(last)) => (first.start > params.start, last.end < params.end),
        _ => (true, true),
    }
}

/// Starts of the `count` ticks laid from `from` that fall inside the window.
///
/// `from` sits a whole number of resolutions away from the window start.
fn window_ticks(
    from: DateTime<Utc>,
    count: i64,
    params: &TimeParams,
) -> impl Iterator<Item = DateTime<Utc>> {
    let resolution = params.resolution;
    let offset = (from - params.start).num_seconds() / resolution;
    let window = (params.end - params.start).num_seconds() / resolution;
    let first = (-offset).max(0);
    let last = (window - offset).min(count).max(first);
    (first..last).map(move |step| from + Duration::seconds(step * resolution))
}

/// Split one observation into resolution-sized ticks.
fn expand(
    observation: &Observation,
    params: &TimeParams,
    registry: &ParameterRegistry,
) -> impl Iterator<Item = Tick> {
    let tick_count = observation.duration / params.resolution;
    let mut fields = Record::new();
    for (field, value) in &observation.fields {
        let split = match (registry.method_for(field), value.as_f64()) {
            (AggregationMethod::Sum, Some(number)) => number_value(number / tick_count as f64),
            _ => value.clone(),
        };
        fields.insert(field.clone(), split);
    }

    window_ticks(observation.start, tick_count, params).map(move |at| Tick {
        at,
        fields: fields.clone(),
    })
}

/// Neutral ticks covering `[from, to)`, shaped after `template`.
fn fill(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    template: &Record,
    params: &TimeParams,
    registry: &ParameterRegistry,
) -> Vec<Tick> {
    let span = (to - from).num_seconds();
    if span <= 0 {
        return Vec::new();
    }

    let mut fields = Record::new();
    for (field, value) in template {
        let neutral = if *field == params.time_reserved_field {
            Value::from(params.resolution)
        } else {
            match registry.method_for(field) {
                AggregationMethod::Sum | AggregationMethod::Avg => Value::from(0),
                AggregationMethod::None => Value::Null,
                AggregationMethod::Copy => value.clone(),
            }
        };
        fields.insert(field.clone(), neutral);
    }

    window_ticks(from, span / params.resolution, params)
        .map(|at| Tick {
            at,
            fields: fields.clone(),
        })
        .collect()
}

/// Combine consecutive ticks into `interval` sized frames.
fn resample(ticks: &[Tick], params: &TimeParams, registry: &ParameterRegistry) -> Vec<Record> {
    let frame_len = (params.interval / params.resolution) as usize;
    ticks
        .chunks(frame_len)
        .map(|frame| resample_frame(frame, params.resolution, registry))
        .collect()
}

fn resample_frame(frame: &[Tick], resolution: i64, registry: &ParameterRegistry) -> Record {
    let mut output = Record::new();
    output.insert(TIMESTAMP.to_string(), Value::from(format_timestamp(frame[0].at)));
    output.insert(DURATION.to_string(), Value::from(frame.len() as i64 * resolution));

    let mut totals: IndexMap<&str, (f64, AggregationMethod)> = IndexMap::new();
    for tick in frame {
        for (field, value) in &tick.fields {
            let method = registry.method_for(field);
            match (method, value.as_f64()) {
                (AggregationMethod::Sum | AggregationMethod::Avg, Some(number)) => {
                    totals.entry(field.as_str()).or_insert((0.0, method)).0 += number;
                    output.entry(field.clone()).or_insert(Value::Null);
                }
                // copy, none and non-numeric values keep the last tick's value
                _ => {
                    output.insert(field.clone(), value.clone());
                }
            }
        }
    }

    for (field, (total, method)) in totals {
        let value = match method {
            AggregationMethod::Avg => total / frame.len() as f64,
            _ => total,
        };
        output.insert(field.to_string(), number_value(value));
    }

    output
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
