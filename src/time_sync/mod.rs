// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Time Synchronization Engine.
//!
//! Reconstructs a gap-free, evenly spaced series over a declared window from
//! irregular observations. Records are validated, expanded into
//! `upsampling-resolution` sized ticks, padded where coverage is missing,
//! trimmed to the window and finally resampled into `interval` sized frames.
//! Every field is split, filled and recombined according to its aggregation
//! method in the [`ParameterRegistry`](crate::parameters::ParameterRegistry).

mod config;
mod engine;

pub use config::{TimeParams, TimeSyncConfig};
pub use engine::synchronize;
