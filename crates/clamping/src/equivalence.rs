use std::borrow::Borrow;

use approx::AbsDiffEq;
use setup_types::Tolerance;

use crate::configuration::ClampingConfiguration;
use crate::types::FeatureId;

/// Same clamping height, thickness and lever-arm ratio, and the same
/// reference frame, all within `tolerance`.
///
/// Reflexive and symmetric, not transitive: do not build equivalence
/// classes from it or use configurations as hash keys.
pub fn are_equivalent(
    a: &ClampingConfiguration,
    b: &ClampingConfiguration,
    tolerance: Tolerance,
) -> bool {
    // Identical infinities (no reachable feature) count as equal.
    let close = |x: f64, y: f64| x == y || tolerance.eq(x, y);
    close(a.clamping_height(), b.clamping_height())
        && close(a.clamping_thickness(), b.clamping_thickness())
        && close(a.lever_arm_ratio(), b.lever_arm_ratio())
        && a
            .reference_frame()
            .abs_diff_eq(b.reference_frame(), tolerance.epsilon)
}

/// Indices of the configurations to keep: each is kept unless it is
/// equivalent to one kept before it. Linear scan, input order preserved.
pub fn dedup_equivalent<C: Borrow<ClampingConfiguration>>(
    configs: &[C],
    tolerance: Tolerance,
) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::new();
    for (i, config) in configs.iter().enumerate() {
        if !kept
            .iter()
            .any(|&k| are_equivalent(configs[k].borrow(), config.borrow(), tolerance))
        {
            kept.push(i);
        }
    }
    kept
}

/// Features fully machinable in both configurations, in `a`'s order.
pub fn common_machinable_features(
    a: &ClampingConfiguration,
    b: &ClampingConfiguration,
) -> Vec<FeatureId> {
    let other = b.fully_machinable_ids();
    a.fully_machinable()
        .iter()
        .map(|f| f.id)
        .filter(|id| other.contains(id))
        .collect()
}
