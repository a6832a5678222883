//! Bucket construction for nested collections

use std::marker::PhantomData;

use crate::collection::{GatedCollection, GatedNestedCollection};
use crate::domain::{FilterConfig, NestedConfig};
use crate::error::GateError;
use crate::ports::backing::BackingCollection;
use crate::ports::gated::BloomFilterGated;

/// One shard of a nested collection.
pub type Bucket<T> = Box<dyn BloomFilterGated<T>>;

/// Knows the filter config of the buckets it creates and how to create them.
pub trait BucketFactory<T: 'static>: Send + Sync {
    fn filter_config(&self) -> &FilterConfig;

    /// A fresh, empty bucket gated under [`filter_config`](Self::filter_config).
    fn create_bucket(&self) -> Bucket<T>;
}

/// Creates flat buckets backed by `C::default()`.
///
/// The duplicate policy of the buckets is the one of `C`.
pub struct FlatBucketFactory<T, C> {
    filter_config: FilterConfig,
    _marker: PhantomData<fn() -> (T, C)>,
}

impl<T, C> FlatBucketFactory<T, C> {
    pub fn new(filter_config: FilterConfig) -> Result<Self, GateError> {
        filter_config.validate()?;
        Ok(Self {
            filter_config,
            _marker: PhantomData,
        })
    }
}

impl<T, C> BucketFactory<T> for FlatBucketFactory<T, C>
where
    T: PartialEq + Send + Sync + 'static,
    C: BackingCollection<T> + Default + Send + Sync + 'static,
{
    fn filter_config(&self) -> &FilterConfig {
        &self.filter_config
    }

    fn create_bucket(&self) -> Bucket<T> {
        Box::new(GatedCollection::from_parts(
            C::default(),
            self.filter_config.clone(),
        ))
    }
}

type InnerFactoryFn<T> = Box<dyn Fn() -> Box<dyn BucketFactory<T>> + Send + Sync>;

/// Creates buckets that are themselves nested collections.
///
/// Each bucket exclusively owns the inner factory `make_inner` produces for it.
pub struct NestedBucketFactory<T: 'static> {
    filter_config: FilterConfig,
    nested_config: NestedConfig,
    make_inner: InnerFactoryFn<T>,
}

impl<T: 'static> NestedBucketFactory<T> {
    pub fn new<F>(
        filter_config: FilterConfig,
        nested_config: NestedConfig,
        make_inner: F,
    ) -> Result<Self, GateError>
    where
        F: Fn() -> Box<dyn BucketFactory<T>> + Send + Sync + 'static,
    {
        filter_config.validate()?;
        nested_config.validate()?;
        Ok(Self {
            filter_config,
            nested_config,
            make_inner: Box::new(make_inner),
        })
    }
}

impl<T> BucketFactory<T> for NestedBucketFactory<T>
where
    T: Send + Sync + 'static,
{
    fn filter_config(&self) -> &FilterConfig {
        &self.filter_config
    }

    fn create_bucket(&self) -> Bucket<T> {
        Box::new(GatedNestedCollection::from_parts(
            self.filter_config.clone(),
            (self.make_inner)(),
            self.nested_config.clone(),
        ))
    }
}
