// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for manifest execution.
//!
//! Every failure is unrecoverable: the first error aborts the whole run and is
//! surfaced to the caller unmodified. Messages always name the offending
//! field, record index, node path or stage identifier.

use thiserror::Error;

use crate::utils::expression::ExpressionError;

/// Errors raised while loading, computing or aggregating a manifest tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Missing or invalid stage or global settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A pipeline references a stage identifier that was never initialized.
    #[error("Configuration error: stage '{stage}' used by '{node}' is not declared in initialize.plugins")]
    UnknownStage { stage: String, node: String },

    /// Malformed record (missing or mistyped field).
    #[error("Input validation error: {0}")]
    InputValidation(String),

    /// Empty grouping list or a record missing a grouping field.
    #[error("Invalid grouping: {0}")]
    InvalidGrouping(String),

    /// Padding is needed but `allow-padding` is false.
    #[error("Invalid padding: {}", padding_edges(*start, *end))]
    InvalidPadding { start: bool, end: bool },

    /// Timestamp could not be parsed.
    #[error("Invalid date in inputs[{index}]: '{value}' is not a valid RFC 3339 timestamp")]
    InvalidDate { index: usize, value: String },

    /// Two consecutive observations overlap in time.
    #[error("Observation overlap: inputs[{index}] starts before inputs[{}] ends", index.saturating_sub(1))]
    ObservationOverlap { index: usize },

    /// Empty, unknown or non-aggregatable aggregation metric.
    #[error("Invalid aggregation parameters: {0}")]
    InvalidAggregationParams(String),

    /// A stage could not be resolved to an implementation.
    #[error("Module initialization error for stage '{stage}': {reason}")]
    ModuleInitialization { stage: String, reason: String },

    /// A stage did not complete within the configured timeout.
    #[error("Stage '{stage}' on '{node}' did not complete within {seconds}s")]
    StageTimeout {
        stage: String,
        node: String,
        seconds: u64,
    },

    /// The manifest file could not be read or parsed.
    #[error("Failed to load manifest '{path}': {reason}")]
    Manifest { path: String, reason: String },

    /// The computed manifest could not be serialized or written.
    #[error("Failed to export results: {0}")]
    Export(String),
}

fn padding_edges(start: bool, end: bool) -> String {
    let edges = match (start, end) {
        (true, true) => "start and end",
        (true, false) => "start",
        (false, true) => "end",
        (false, false) => "no edge",
    };
    format!("padding is required at {} of the time window but allow-padding is false", edges)
}

impl From<ExpressionError> for EngineError {
    fn from(error: ExpressionError) -> Self {
        EngineError::InputValidation(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
