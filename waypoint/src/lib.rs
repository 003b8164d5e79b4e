//! Variable-resolution and execution-state engine for mission trees.
//!
//! A mission decomposes a high-level goal into workflow → stage → step →
//! sub-step, where each unit declares inputs, outputs, and (for leaves) a
//! tool. This crate implements the deterministic computation core over that
//! tree, with a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (schema matching, scope
//!   resolution, status derivation, output application, the mission/hop
//!   reducer). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, snapshot store).
//!   Isolated to enable mocking in tests.
//!
//! The [`report`] module and the CLI binary are thin presentation harnesses
//! over the core; the core itself executes no tools, persists nothing, and
//! performs no network I/O.

pub mod core;
pub mod io;
pub mod logging;
pub mod model;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
