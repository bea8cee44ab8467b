// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `engine` - compute lifecycle, stage invocations and regrouping
//! * `aggregation` - aggregation engine events
//! * `parameters` - parameter registry events
//! * `time_sync` - time synchronization events

use tracing::Span;

pub mod aggregation;
pub mod engine;
pub mod parameters;
pub mod time_sync;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Build a span carrying the same fields as the message.
    fn span(&self, name: &str) -> Span;
}
