// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the parameter registry.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A field has no descriptor and falls back to `sum`.
///
/// # Log Level
/// `warn!` - Emitted once per registry per field
///
/// # Example
/// ```
/// use impact_engine::observability::messages::parameters::UnknownParameterDefaulted;
///
/// let msg = UnknownParameterDefaulted { field: "gpu/energy" };
/// assert!(msg.to_string().contains("gpu/energy"));
/// ```
pub struct UnknownParameterDefaulted<'a> {
    pub field: &'a str,
}

impl Display for UnknownParameterDefaulted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Parameter '{}' has no registered aggregation method; using 'sum'",
            self.field
        )
    }
}

impl StructuredLog for UnknownParameterDefaulted<'_> {
    fn log(&self) {
        tracing::warn!(field = self.field, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("unknown_parameter", span_name = name, field = self.field)
    }
}
