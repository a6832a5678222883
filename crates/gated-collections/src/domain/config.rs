//! Gate configuration and validation
//!
//! # Example
//!
//! ```
//! use gated_collections::domain::FilterConfigBuilder;
//!
//! let config = FilterConfigBuilder::new()
//!     .number_of_items(1_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .expect("Valid config");
//! assert!(config.bit_width() > 1_000);
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::{calculate_fpr, calculate_optimal_parameters, MAX_HASH_PROBES};
use crate::error::GateError;

/// Default design capacity used by [`FilterConfigBuilder`].
pub const DEFAULT_NUMBER_OF_ITEMS: usize = 1_000;

/// Default false positive rate used by [`FilterConfigBuilder`].
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Shape of every filter built for one gate.
///
/// Two configs are compatible only when all three fields are identical;
/// filters built under different configs are not comparable bit for bit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Design capacity; a gate at or above it reports itself full
    number_of_items: usize,
    /// Filter size in bits (m)
    bit_width: usize,
    /// Probes per value (k)
    hash_probe_count: usize,
}

impl FilterConfig {
    /// Size filters for `number_of_items` values at a false positive rate of
    /// `1 / probability_inverse`.
    pub fn new(number_of_items: usize, probability_inverse: u32) -> Result<Self, GateError> {
        let fpr = fpr_from_inverse(probability_inverse)?;
        Self::with_false_positive_rate(number_of_items, fpr)
    }

    /// Size filters for `number_of_items` values at `fpr`.
    pub fn with_false_positive_rate(number_of_items: usize, fpr: f64) -> Result<Self, GateError> {
        if !(fpr > 0.0 && fpr <= 0.5) {
            return Err(GateError::InvalidFalsePositiveRate { fpr });
        }
        if number_of_items == 0 {
            return Err(GateError::InvalidConfig(
                "number_of_items cannot be 0".to_string(),
            ));
        }

        let params = calculate_optimal_parameters(number_of_items, fpr);
        Self::with_parameters(number_of_items, params.bit_width, params.hash_probe_count)
    }

    /// Use an explicit filter shape.
    pub fn with_parameters(
        number_of_items: usize,
        bit_width: usize,
        hash_probe_count: usize,
    ) -> Result<Self, GateError> {
        let config = Self {
            number_of_items,
            bit_width,
            hash_probe_count,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants a deserialized config may have skipped.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.number_of_items == 0 {
            return Err(GateError::InvalidConfig(
                "number_of_items cannot be 0".to_string(),
            ));
        }
        if self.bit_width == 0 {
            return Err(GateError::InvalidConfig("bit_width cannot be 0".to_string()));
        }
        if self.hash_probe_count == 0 || self.hash_probe_count > MAX_HASH_PROBES {
            return Err(GateError::InvalidConfig(format!(
                "hash_probe_count must be between 1 and {}, got {}",
                MAX_HASH_PROBES, self.hash_probe_count
            )));
        }
        Ok(())
    }

    pub fn number_of_items(&self) -> usize {
        self.number_of_items
    }

    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    pub fn hash_probe_count(&self) -> usize {
        self.hash_probe_count
    }

    /// Expected false positive rate once `number_of_items` values are folded in.
    pub fn false_positive_rate(&self) -> f64 {
        calculate_fpr(self.bit_width, self.number_of_items, self.hash_probe_count)
    }
}

fn fpr_from_inverse(probability_inverse: u32) -> Result<f64, GateError> {
    if probability_inverse < 2 {
        return Err(GateError::InvalidConfig(format!(
            "probability_inverse must be at least 2, got {}",
            probability_inverse
        )));
    }
    Ok(1.0 / f64::from(probability_inverse))
}

/// Fluent builder for [`FilterConfig`].
///
/// Without overrides the shape is derived from capacity and rate; an
/// explicit `bit_width` or `hash_probe_count` replaces the derived value.
#[derive(Default)]
pub struct FilterConfigBuilder {
    number_of_items: Option<usize>,
    false_positive_rate: Option<f64>,
    probability_inverse: Option<u32>,
    bit_width: Option<usize>,
    hash_probe_count: Option<usize>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the design capacity
    pub fn number_of_items(mut self, items: usize) -> Self {
        self.number_of_items = Some(items);
        self
    }

    /// Set the target false positive rate, replacing any `probability_inverse`
    pub fn false_positive_rate(mut self, fpr: f64) -> Self {
        self.false_positive_rate = Some(fpr);
        self.probability_inverse = None;
        self
    }

    /// Set the target false positive rate as `1 / inverse`, replacing any
    /// `false_positive_rate`
    pub fn probability_inverse(mut self, inverse: u32) -> Self {
        self.probability_inverse = Some(inverse);
        self.false_positive_rate = None;
        self
    }

    /// Override the derived bit width
    pub fn bit_width(mut self, bits: usize) -> Self {
        self.bit_width = Some(bits);
        self
    }

    /// Override the derived probe count
    pub fn hash_probe_count(mut self, probes: usize) -> Self {
        self.hash_probe_count = Some(probes);
        self
    }

    /// Build the config, validating every parameter
    pub fn build(self) -> Result<FilterConfig, GateError> {
        let items = self.number_of_items.unwrap_or(DEFAULT_NUMBER_OF_ITEMS);
        let fpr = match self.probability_inverse {
            Some(inverse) => fpr_from_inverse(inverse)?,
            None => self.false_positive_rate.unwrap_or(DEFAULT_FALSE_POSITIVE_RATE),
        };
        let derived = FilterConfig::with_false_positive_rate(items, fpr)?;

        FilterConfig::with_parameters(
            items,
            self.bit_width.unwrap_or(derived.bit_width),
            self.hash_probe_count.unwrap_or(derived.hash_probe_count),
        )
    }
}

/// Settings for a [`GatedNestedCollection`](crate::collection::GatedNestedCollection).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedConfig {
    /// Minimum number of non-full buckets kept after every insert
    pub min_free: usize,
}

impl Default for NestedConfig {
    fn default() -> Self {
        Self { min_free: 1 }
    }
}

impl NestedConfig {
    pub fn new(min_free: usize) -> Result<Self, GateError> {
        let config = Self { min_free };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GateError> {
        if self.min_free == 0 {
            return Err(GateError::InvalidConfig("min_free cannot be 0".to_string()));
        }
        Ok(())
    }

    pub fn with_min_free(mut self, min_free: usize) -> Self {
        self.min_free = min_free;
        self
    }
}
