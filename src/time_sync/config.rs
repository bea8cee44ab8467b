// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::consts::{
    DEFAULT_TIME_RESERVED_FIELD, DEFAULT_UPSAMPLING_RESOLUTION, MAX_WINDOW_TICKS,
};
use crate::errors::{EngineError, Result};

/// Raw time-sync settings as written in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeSyncConfig {
    pub start_time: String,
    pub end_time: String,
    pub interval: i64,
    pub allow_padding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsampling_resolution: Option<i64>,
    /// Field filled with the tick duration in padded ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_reserved: Option<String>,
}

/// Validated window and resampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Frame length in seconds.
    pub interval: i64,
    /// Tick length in seconds.
    pub resolution: i64,
    pub allow_padding: bool,
    pub time_reserved_field: String,
}

impl TimeSyncConfig {
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        let value = value.ok_or_else(|| {
            EngineError::Config(
                "time-sync config is missing; declare start-time, end-time, interval and allow-padding"
                    .to_string(),
            )
        })?;
        serde_json::from_value(value.clone())
            .map_err(|e| EngineError::Config(format!("invalid time-sync config: {}", e)))
    }

    pub fn validate(&self) -> Result<TimeParams> {
        let start = parse_window_edge("start-time", &self.start_time)?;
        let end = parse_window_edge("end-time", &self.end_time)?;
        if start >= end {
            return Err(EngineError::Config(format!(
                "start-time '{}' must be earlier than end-time '{}'",
                self.start_time, self.end_time
            )));
        }

        if self.interval <= 0 {
            return Err(EngineError::Config(format!(
                "interval must be a positive number of seconds, got {}",
                self.interval
            )));
        }

        let resolution = self
            .upsampling_resolution
            .unwrap_or(DEFAULT_UPSAMPLING_RESOLUTION);
        if resolution < 1 {
            return Err(EngineError::Config(format!(
                "upsampling-resolution must be at least 1, got {}",
                resolution
            )));
        }
        if self.interval % resolution != 0 {
            return Err(EngineError::Config(format!(
                "upsampling-resolution {} does not evenly divide interval {}",
                resolution, self.interval
            )));
        }

        let window = (end - start).num_seconds();
        if window % resolution != 0 {
            return Err(EngineError::Config(format!(
                "upsampling-resolution {} does not evenly divide the {}s window",
                resolution, window
            )));
        }
        if window / resolution > MAX_WINDOW_TICKS {
            return Err(EngineError::Config(format!(
                "window of {}s holds more than {} ticks at upsampling-resolution {}",
                window, MAX_WINDOW_TICKS, resolution
            )));
        }

        Ok(TimeParams {
            start,
            end,
            interval: self.interval,
            resolution,
            allow_padding: self.allow_padding,
            time_reserved_field: self
                .time_reserved
                .clone()
                .unwrap_or_else(|| DEFAULT_TIME_RESERVED_FIELD.to_string()),
        })
    }
}

fn parse_window_edge(key: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc).trunc_subsecs(0))
        .map_err(|e| EngineError::Config(format!("{} '{}' is not RFC 3339: {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> TimeSyncConfig {
        TimeSyncConfig::from_value(Some(&value)).unwrap()
    }

    #[test]
    fn test_valid_config_defaults() {
        let params = config(json!({
            "start-time": "2023-12-12T00:00:00.000Z",
            "end-time": "2023-12-12T00:01:00.000Z",
            "interval": 5,
            "allow-padding": true
        }))
        .validate()
        .unwrap();

        assert_eq!(params.resolution, 1);
        assert_eq!(params.interval, 5);
        assert_eq!((params.end - params.start).num_seconds(), 60);
        assert_eq!(params.time_reserved_field, "time-reserved");
    }

    #[test]
    fn test_missing_config() {
        assert!(matches!(
            TimeSyncConfig::from_value(None),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = TimeSyncConfig::from_value(Some(&json!({
            "start-time": "2023-12-12T00:00:00Z",
            "end-time": "2023-12-12T00:01:00Z",
            "allow-padding": true
        })));

        match result {
            Err(EngineError::Config(message)) => assert!(message.contains("interval")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_configs() {
        let cases = vec![
            ("end before start", json!({"start-time": "2023-12-12T00:01:00Z", "end-time": "2023-12-12T00:00:00Z", "interval": 5, "allow-padding": true})),
            ("equal edges", json!({"start-time": "2023-12-12T00:00:00Z", "end-time": "2023-12-12T00:00:00Z", "interval": 5, "allow-padding": true})),
            ("zero interval", json!({"start-time": "2023-12-12T00:00:00Z", "end-time": "2023-12-12T00:01:00Z", "interval": 0, "allow-padding": true})),
            ("zero resolution", json!({"start-time": "2023-12-12T00:00:00Z", "end-time": "2023-12-12T00:01:00Z", "interval": 5, "allow-padding": true, "upsampling-resolution": 0})),
            ("resolution does not divide interval", json!({"start-time": "2023-12-12T00:00:00Z", "end-time": "2023-12-12T00:01:00Z", "interval": 5, "allow-padding": true, "upsampling-resolution": 2})),
            ("resolution does not divide window", json!({"start-time": "2023-12-12T00:00:00Z", "end-time": "2023-12-12T00:00:07Z", "interval": 5, "allow-padding": true, "upsampling-resolution": 5})),
            ("window too long for resolution", json!({"start-time": "2000-01-01T00:00:00Z", "end-time": "2023-12-12T00:00:00Z", "interval": 5, "allow-padding": true})),
            ("bad start", json!({"start-time": "yesterday", "end-time": "2023-12-12T00:01:00Z", "interval": 5, "allow-padding": true})),
        ];

        for (name, value) in cases {
            let result = config(value).validate();
            assert!(
                matches!(result, Err(EngineError::Config(_))),
                "case '{}' should be a config error, got {:?}",
                name,
                result
            );
        }
    }

    #[test]
    fn test_time_reserved_override() {
        let params = config(json!({
            "start-time": "2023-12-12T00:00:00Z",
            "end-time": "2023-12-12T00:01:00Z",
            "interval": 10,
            "allow-padding": true,
            "upsampling-resolution": 5,
            "time-reserved": "reserved"
        }))
        .validate()
        .unwrap();

        assert_eq!(params.resolution, 5);
        assert_eq!(params.time_reserved_field, "reserved");
    }
}
