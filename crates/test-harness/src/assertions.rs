//! Rich assertion helpers with diagnostic output.
//!
//! Every failure includes the context label, expected vs actual, and enough
//! of the surrounding state (ranking order, exclusions) to debug it.

use cam_geom::Point3d;
use clamping::{are_equivalent, ClampingConfiguration, ClampingScalars};
use ranking::{ExclusionReason, RankedResult};
use setup_types::Tolerance;

use crate::helpers::HarnessError;

fn fail(detail: String) -> Result<(), HarnessError> {
    Err(HarnessError::AssertionFailed { detail })
}

/// Assert a scalar within `tol`. Infinities must match exactly.
pub fn assert_scalar(actual: f64, expected: f64, tol: f64, ctx: &str) -> Result<(), HarnessError> {
    let same = if expected.is_infinite() {
        actual == expected
    } else {
        (actual - expected).abs() <= tol
    };
    if same {
        Ok(())
    } else {
        fail(format!(
            "[{}] expected {:.6}, got {:.6} (tol={})",
            ctx, expected, actual, tol
        ))
    }
}

/// Assert every clamping scalar, naming the first one that differs.
pub fn assert_scalars(
    actual: &ClampingScalars,
    expected: &ClampingScalars,
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let pairs = [
        ("clamping thickness", actual.clamping_thickness, expected.clamping_thickness),
        ("clamping height", actual.clamping_height, expected.clamping_height),
        ("lever-arm ratio", actual.lever_arm_ratio, expected.lever_arm_ratio),
        (
            "gravity-center height",
            actual.gravity_center_height,
            expected.gravity_center_height,
        ),
        ("extent X", actual.extents[0], expected.extents[0]),
        ("extent Y", actual.extents[1], expected.extents[1]),
        ("extent Z", actual.extents[2], expected.extents[2]),
    ];
    for (name, a, e) in pairs {
        assert_scalar(a, e, tol, &format!("{ctx}: {name}"))?;
    }
    Ok(())
}

pub fn assert_point(actual: &Point3d, expected: &Point3d, tol: f64, ctx: &str) -> Result<(), HarnessError> {
    if actual.distance_to(expected) <= tol {
        Ok(())
    } else {
        fail(format!(
            "[{}] expected point ({:.4}, {:.4}, {:.4}), got ({:.4}, {:.4}, {:.4}) (tol={})",
            ctx, expected.x, expected.y, expected.z, actual.x, actual.y, actual.z, tol
        ))
    }
}

/// Assert equivalence in either direction, or its absence.
pub fn assert_equivalence(
    a: &ClampingConfiguration,
    b: &ClampingConfiguration,
    expected: bool,
    tol: Tolerance,
    ctx: &str,
) -> Result<(), HarnessError> {
    let forward = are_equivalent(a, b, tol);
    let backward = are_equivalent(b, a, tol);
    if forward != backward {
        return fail(format!("[{}] equivalence is not symmetric", ctx));
    }
    if forward == expected {
        return Ok(());
    }
    fail(format!(
        "[{}] expected equivalent={}, got {}.\n  a: {:?}\n  b: {:?}",
        ctx,
        expected,
        forward,
        a.reference(),
        b.reference()
    ))
}

/// Assert the ranked order by candidate index, best first.
pub fn assert_rank_order<T>(
    result: &RankedResult<'_, T>,
    expected: &[usize],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = result.indices();
    if actual == expected {
        return Ok(());
    }
    let scores: Vec<String> = result
        .iter()
        .map(|c| format!("#{}={:.6}", c.index, c.score))
        .collect();
    let excluded: Vec<String> = result
        .excluded
        .iter()
        .map(|e| format!("#{}: {:?}", e.index, e.reason))
        .collect();
    fail(format!(
        "[{}] expected order {:?}, got {:?}.\nScores: [{}]\nExcluded: [{}]",
        ctx,
        expected,
        actual,
        scores.join(", "),
        excluded.join(", ")
    ))
}

/// Assert `index` was excluded because of a non-finite value of `feature`.
pub fn assert_excluded_by<T>(
    result: &RankedResult<'_, T>,
    index: usize,
    feature: &str,
    ctx: &str,
) -> Result<(), HarnessError> {
    match result.excluded.iter().find(|e| e.index == index) {
        Some(e) => match &e.reason {
            ExclusionReason::NonFiniteFeature { feature: f, .. } if f == feature => Ok(()),
            other => fail(format!(
                "[{}] candidate #{} excluded for {:?}, expected non-finite {}",
                ctx, index, other, feature
            )),
        },
        None => fail(format!(
            "[{}] candidate #{} not excluded. Ranked: {:?}",
            ctx,
            index,
            result.indices()
        )),
    }
}
