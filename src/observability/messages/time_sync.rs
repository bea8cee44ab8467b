// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for time synchronization.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Synthetic records are inserted at the window edges.
///
/// # Log Level
/// `debug!`
pub struct PaddingApplied {
    pub start: bool,
    pub end: bool,
}

impl Display for PaddingApplied {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Padding time window: start={}, end={}", self.start, self.end)
    }
}

impl StructuredLog for PaddingApplied {
    fn log(&self) {
        tracing::debug!(start = self.start, end = self.end, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("padding", span_name = name, start = self.start, end = self.end)
    }
}

/// Time synchronization summary.
///
/// # Log Level
/// `debug!`
pub struct TimeSyncCompleted {
    pub input_count: usize,
    pub tick_count: usize,
    pub output_count: usize,
}

impl Display for TimeSyncCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Time sync: {} records expanded to {} ticks, resampled into {} frames",
            self.input_count, self.tick_count, self.output_count
        )
    }
}

impl StructuredLog for TimeSyncCompleted {
    fn log(&self) {
        tracing::debug!(
            input_count = self.input_count,
            tick_count = self.tick_count,
            output_count = self.output_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "time_sync",
            span_name = name,
            input_count = self.input_count,
            output_count = self.output_count,
        )
    }
}
