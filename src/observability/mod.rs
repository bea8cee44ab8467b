// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging goes through message types that
//! implement `Display` and [`messages::StructuredLog`]. This keeps log text out
//! of the engine code and gives every event consistent structured fields.
//!
//! # Usage
//!
//! ```rust
//! use impact_engine::observability::messages::StructuredLog;
//! use impact_engine::observability::messages::engine::StageStarted;
//!
//! let msg = StageStarted {
//!     stage: "sum-energy",
//!     node: "tree.children.server-1",
//!     record_count: 12,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
