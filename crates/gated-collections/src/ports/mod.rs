//! Ports Layer
//!
//! Defines the traits at the seams of the crate:
//! - `BloomFilterGated` - the contract both collection shapes expose
//! - `BackingCollection` - storage a flat collection fronts
//! - `BucketFactory` - bucket construction for nested collections

pub mod backing;
pub mod factory;
pub mod gated;

pub use backing::BackingCollection;
pub use factory::{Bucket, BucketFactory, FlatBucketFactory, NestedBucketFactory};
pub use gated::{BloomFilterGated, Candidates, RetainMap};
