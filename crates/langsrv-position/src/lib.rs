//! Offset↔(line, column) conversion and range containment/intersection.
//!
//! This is the engine's leaf-most component: every other crate builds
//! positions and ranges through [`Position`] and [`Range`], and converts
//! between byte offsets and them through [`LineIndex`].

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod line_index;
mod range;

pub use line_index::LineIndex;
pub use range::{Position, Range};
