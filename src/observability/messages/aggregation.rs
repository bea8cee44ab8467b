// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the aggregation engine.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Vertical aggregation finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct AggregationCompleted<'a> {
    pub scope: &'a str,
    pub metrics: &'a [String],
    pub interior_count: usize,
}

impl Display for AggregationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Vertical aggregation ({} scope) of [{}] written to {} nodes",
            self.scope,
            self.metrics.join(", "),
            self.interior_count
        )
    }
}

impl StructuredLog for AggregationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            scope = self.scope,
            metrics = ?self.metrics,
            interior_count = self.interior_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "aggregation",
            span_name = name,
            scope = self.scope,
            interior_count = self.interior_count,
        )
    }
}

/// Horizontal aggregation is reserved and does nothing.
///
/// # Log Level
/// `warn!` - Requested behavior is not available
pub struct HorizontalAggregationReserved;

impl Display for HorizontalAggregationReserved {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Horizontal aggregation is reserved; tree returned unchanged")
    }
}

impl StructuredLog for HorizontalAggregationReserved {
    fn log(&self) {
        tracing::warn!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("aggregation_reserved", span_name = name)
    }
}
