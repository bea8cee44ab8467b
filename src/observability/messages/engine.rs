// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the pipeline executor.
//!
//! This module contains message types for logging events related to:
//! * Compute lifecycle (start, completion, failure)
//! * Stage invocations on leaf nodes
//! * Regrouping of leaf records into new children
//! * Nodes skipped for lack of inputs

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Compute run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use impact_engine::observability::messages::engine::ComputeStarted;
///
/// let msg = ComputeStarted {
///     phases: "observe,regroup,compute",
///     stage_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ComputeStarted<'a> {
    pub phases: &'a str,
    pub stage_count: usize,
}

impl Display for ComputeStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting manifest compute: phases=[{}], {} stages registered",
            self.phases, self.stage_count
        )
    }
}

impl StructuredLog for ComputeStarted<'_> {
    fn log(&self) {
        tracing::info!(
            phases = self.phases,
            stage_count = self.stage_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "compute",
            span_name = name,
            phases = self.phases,
            stage_count = self.stage_count,
        )
    }
}

/// Compute run completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ComputeCompleted {
    pub leaf_count: usize,
    pub duration: std::time::Duration,
}

impl Display for ComputeCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Manifest compute completed: {} leaves in {:?}",
            self.leaf_count, self.duration
        )
    }
}

impl StructuredLog for ComputeCompleted {
    fn log(&self) {
        tracing::info!(
            leaf_count = self.leaf_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "compute_completed",
            span_name = name,
            leaf_count = self.leaf_count,
            duration = ?self.duration,
        )
    }
}

/// Compute run aborted.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ComputeFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ComputeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Manifest compute failed: {}", self.error)
    }
}

impl StructuredLog for ComputeFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("compute_failed", span_name = name, error = %self.error)
    }
}

/// A stage is about to run on a leaf.
///
/// # Log Level
/// `debug!` - Per-stage detail
pub struct StageStarted<'a> {
    pub stage: &'a str,
    pub node: &'a str,
    pub record_count: usize,
}

impl Display for StageStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' started on '{}' with {} records",
            self.stage, self.node, self.record_count
        )
    }
}

impl StructuredLog for StageStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            stage = self.stage,
            node = self.node,
            record_count = self.record_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage",
            span_name = name,
            stage = self.stage,
            node = self.node,
            record_count = self.record_count,
        )
    }
}

/// A stage finished on a leaf.
///
/// # Log Level
/// `debug!` - Per-stage detail
pub struct StageCompleted<'a> {
    pub stage: &'a str,
    pub node: &'a str,
    pub output_count: usize,
    pub duration: std::time::Duration,
}

impl Display for StageCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' completed on '{}': {} records in {:?}",
            self.stage, self.node, self.output_count, self.duration
        )
    }
}

impl StructuredLog for StageCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            stage = self.stage,
            node = self.node,
            output_count = self.output_count,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage_completed",
            span_name = name,
            stage = self.stage,
            node = self.node,
            output_count = self.output_count,
        )
    }
}

/// A stage failed on a leaf; the error is propagated unchanged.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StageFailed<'a> {
    pub stage: &'a str,
    pub node: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' failed on '{}': {}",
            self.stage, self.node, self.error
        )
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::error!(
            stage = self.stage,
            node = self.node,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "stage_failed",
            span_name = name,
            stage = self.stage,
            node = self.node,
            error = %self.error,
        )
    }
}

/// A leaf was split into regrouped children.
///
/// # Log Level
/// `info!` - Tree shape changed
pub struct RegroupApplied<'a> {
    pub node: &'a str,
    pub groups: &'a [String],
    pub child_count: usize,
}

impl Display for RegroupApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Regrouped '{}' by [{}] into {} children",
            self.node,
            self.groups.join(", "),
            self.child_count
        )
    }
}

impl StructuredLog for RegroupApplied<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            groups = ?self.groups,
            child_count = self.child_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "regroup",
            span_name = name,
            node = self.node,
            child_count = self.child_count,
        )
    }
}

/// Leaf has neither inputs nor defaults.
///
/// # Log Level
/// `debug!`
pub struct NodeSkipped<'a> {
    pub node: &'a str,
}

impl Display for NodeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping '{}': no inputs and no defaults", self.node)
    }
}

impl StructuredLog for NodeSkipped<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("node_skipped", span_name = name, node = self.node)
    }
}
