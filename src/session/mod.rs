//! Generation entry points.
//!
//! A generation compiles a [`Scene`](crate::Scene), runs its commands against a fresh surface and
//! font cache, then encodes the result. Nothing is shared between generations.

/// One-shot scene rendering and file output.
pub mod generate;
