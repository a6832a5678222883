//! Gated collection implementations
//!
//! - `GatedCollection`: one backing collection behind one gate
//! - `GatedNestedCollection`: buckets of gated collections behind a top-level gate

pub mod flat;
pub mod nested;

pub use flat::GatedCollection;
pub use nested::GatedNestedCollection;
