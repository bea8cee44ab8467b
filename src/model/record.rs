// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Time-stamped observation records.
//!
//! A record is an insertion-ordered map from field name to JSON value. Every
//! record is expected to carry `timestamp` and `duration`; everything else is
//! a metric or a label.

use serde_json::{Map, Value};

pub const TIMESTAMP: &str = "timestamp";
pub const DURATION: &str = "duration";

/// An ordered mapping of field name to value.
pub type Record = Map<String, Value>;

/// Fill in `defaults` wherever `record` does not already define the field.
///
/// Record fields always win over defaults.
pub fn merge_defaults(defaults: &Record, record: &Record) -> Record {
    let mut merged = defaults.clone();
    for (key, value) in record {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Convert an `f64` into a JSON number, keeping integral values integral.
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
