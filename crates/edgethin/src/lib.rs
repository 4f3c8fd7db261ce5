//! Umbrella crate for the `edgethin` workspace.
//!
//! Re-exports the grid primitives of `et-core` and the edge algorithms of
//! `et-edge` under one path.

pub use et_core::*;
pub use et_edge::*;
