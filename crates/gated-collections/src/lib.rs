//! # Gated Collections
//!
//! Collections fronted by compact Bloom filter gates, so membership,
//! intersection and candidate queries can be answered without scanning
//! whenever a negative is provable from the gate alone.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure data structures, no I/O
//!   - `ProtoFilter`: config-independent hash material for values
//!   - `Filter`: the Bloom filter bit vector
//!   - `FilterConfig`: filter shape with validation
//!   - `CollectionStats`: insert/delete counters with change notification
//!   - `GateConfig`: gate filter and stats under one lock
//!
//! - **Ports Layer** (`ports/`): trait definitions
//!   - `BloomFilterGated`: the contract every gated collection exposes
//!   - `BackingCollection`: storage behind a flat gate
//!   - `BucketFactory`: bucket construction for nested collections
//!
//! - **Collection Layer** (`collection/`): the two shapes
//!   - `GatedCollection`: flat, one backing collection
//!   - `GatedNestedCollection`: sharded into buckets routed by Hamming distance
//!
//! ## Invariants
//!
//! - **No false negatives**: an element added and not removed is always found.
//! - **Gate monotonicity**: bits only leave a gate through `clear()`.
//! - **Stats consistency**: a nested top-level `filter_count` equals the sum of its buckets'.
//! - **Free-bucket floor**: after every nested `add`, at least `min_free` buckets are not full.
//!
//! ## Usage Example
//!
//! ```
//! use std::collections::HashSet;
//! use gated_collections::{
//!     BloomFilterGated, FilterConfig, FlatBucketFactory, GatedNestedCollection, NestedConfig,
//!     ProtoFilter,
//! };
//!
//! let factory =
//!     FlatBucketFactory::<String, HashSet<String>>::new(FilterConfig::new(5, 5)?)?;
//! let mut names =
//!     GatedNestedCollection::new(FilterConfig::new(25, 5)?, factory, NestedConfig::new(3)?)?;
//!
//! for name in ["Hello", "Hello", "World"] {
//!     names.add(&ProtoFilter::of(name), name.to_string());
//! }
//!
//! assert_eq!(names.count(), 2);
//! assert!(names.contains(&ProtoFilter::of("Hello"), &"Hello".to_string()));
//! assert!(names.free_bucket_count() >= 3);
//! # Ok::<(), gated_collections::GateError>(())
//! ```

pub mod collection;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use collection::{GatedCollection, GatedNestedCollection};
pub use domain::{
    ActionMapper, CollectionStats, Filter, FilterConfig, FilterConfigBuilder, GateConfig,
    NestedConfig, ProtoFilter, ProtoFilterBuilder, StatsAction, StatsSnapshot,
};
pub use error::GateError;
pub use ports::{
    BackingCollection, BloomFilterGated, Bucket, BucketFactory, Candidates, FlatBucketFactory,
    NestedBucketFactory, RetainMap,
};
