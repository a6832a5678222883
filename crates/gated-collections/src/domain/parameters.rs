//! Optimal gate parameters
//!
//! Formulas:
//! - m = -n*ln(p) / (ln(2)^2)  -- optimal bit width
//! - k = (m/n) * ln(2)         -- optimal probe count
//! - p = (1 - e^(-kn/m))^k     -- false positive rate at n items

use std::f64::consts::LN_2;

/// Upper bound on hash probes per value.
pub const MAX_HASH_PROBES: usize = 32;

/// Derived filter shape for a design capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterParams {
    /// Number of bits in the filter (m)
    pub bit_width: usize,
    /// Number of probes per value (k)
    pub hash_probe_count: usize,
    /// Expected false positive rate once the design capacity is reached
    pub expected_fpr: f64,
}

/// Calculate the filter shape for `num_items` values at `target_fpr`.
///
/// Callers validate inputs; `num_items == 0` yields a degenerate 1-bit shape.
pub fn calculate_optimal_parameters(num_items: usize, target_fpr: f64) -> FilterParams {
    if num_items == 0 {
        return FilterParams {
            bit_width: 1,
            hash_probe_count: 1,
            expected_fpr: 1.0,
        };
    }

    let n = num_items as f64;
    let m = (-n * target_fpr.ln() / (LN_2 * LN_2)).ceil().max(1.0) as usize;
    let k = ((m as f64 / n) * LN_2).round() as usize;
    let k = k.clamp(1, MAX_HASH_PROBES);

    FilterParams {
        bit_width: m,
        hash_probe_count: k,
        expected_fpr: calculate_fpr(m, num_items, k),
    }
}

/// False positive rate of an `m`-bit, `k`-probe filter holding `n` values.
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
