//! Domain Layer - filters, gates and statistics
//!
//! This layer contains:
//! - Hash material and proto filters
//! - The filter bit vector
//! - Parameter calculations and configuration
//! - Per-collection statistics with change notification
//! - The gate (filter + stats under one lock)
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod filter;
pub mod gate;
pub mod hash_functions;
pub mod parameters;
pub mod proto;
pub mod stats;

pub use config::{FilterConfig, FilterConfigBuilder, NestedConfig};
pub use filter::Filter;
pub use gate::{GateConfig, GateSnapshot};
pub use hash_functions::HashPair;
pub use parameters::{calculate_optimal_parameters, FilterParams};
pub use proto::{ProtoFilter, ProtoFilterBuilder};
pub use stats::{ActionMapper, CollectionStats, StatsAction, StatsSnapshot};
