//! # Weight Distribution
//!
//! Splits a width among siblings: constant sizes are taken off first along
//! with the spacing between items, and whatever is left is shared by
//! relative weight. Rows and table columns both size their children here.

use crate::model::ItemSize;

/// Reject size lists that cannot be resolved for any width.
pub fn check_sizes(sizes: &[ItemSize]) -> Result<(), String> {
    let mut total_weight = 0.0;
    let mut has_relative = false;
    for (i, size) in sizes.iter().enumerate() {
        match *size {
            ItemSize::Relative(w) => {
                if !w.is_finite() || w < 0.0 {
                    return Err(format!("item {} has invalid relative weight {}", i, w));
                }
                has_relative = true;
                total_weight += w;
            }
            ItemSize::Constant(w) => {
                if !w.is_finite() || w < 0.0 {
                    return Err(format!("item {} has invalid constant width {}", i, w));
                }
            }
        }
    }
    if has_relative && total_weight <= 0.0 {
        return Err("relative weights sum to zero".to_string());
    }
    Ok(())
}

/// Final widths for `sizes` sharing `available` points with `spacing`
/// between neighbours. Sizes must have passed [`check_sizes`].
pub fn distribute(sizes: &[ItemSize], available: f64, spacing: f64) -> Vec<f64> {
    if sizes.is_empty() {
        return vec![];
    }

    let gaps = spacing * (sizes.len() - 1) as f64;
    let constant: f64 = sizes
        .iter()
        .map(|s| match s {
            ItemSize::Constant(w) => *w,
            ItemSize::Relative(_) => 0.0,
        })
        .sum();
    let total_weight: f64 = sizes
        .iter()
        .map(|s| match s {
            ItemSize::Relative(w) => *w,
            ItemSize::Constant(_) => 0.0,
        })
        .sum();
    let free = (available - gaps - constant).max(0.0);

    sizes
        .iter()
        .map(|s| match s {
            ItemSize::Constant(w) => *w,
            ItemSize::Relative(w) if total_weight > 0.0 => free * (w / total_weight),
            ItemSize::Relative(_) => 0.0,
        })
        .collect()
}
