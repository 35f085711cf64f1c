use std::cmp::Ordering;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable holding the process-wide comparison tolerance.
pub const TOLERANCE_ENV: &str = "CAMSETUP_TOLERANCE";

/// Tolerance used when the environment does not provide a valid one.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Shared comparison tolerance for geometric values and scores.
///
/// Every comparison in the selection core (coincident points, equal scalars,
/// tied scores, degenerate normalization spans) goes through one `Tolerance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub epsilon: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl Tolerance {
    /// Create a tolerance, falling back to the default for unusable values.
    pub fn new(epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon > 0.0 {
            Self { epsilon }
        } else {
            Self::default()
        }
    }

    /// Read the tolerance from `CAMSETUP_TOLERANCE`.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(TOLERANCE_ENV).ok().as_deref())
    }

    /// Parse a raw configuration value. `None` and invalid values yield the default.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match raw.trim().parse::<f64>() {
            Ok(epsilon) if epsilon.is_finite() && epsilon > 0.0 => Self { epsilon },
            _ => {
                warn!(
                    value = raw,
                    default = DEFAULT_EPSILON,
                    "invalid tolerance configuration, using default"
                );
                Self::default()
            }
        }
    }

    /// `|a - b| <= epsilon`.
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.epsilon
    }

    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() <= self.epsilon
    }

    /// Three-way comparison treating values within epsilon as equal.
    ///
    /// Not transitive across chains of near-equal values. NaN compares equal
    /// to everything.
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        if self.eq(a, b) {
            Ordering::Equal
        } else {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }
}

static GLOBAL: OnceLock<Tolerance> = OnceLock::new();

/// Process-wide tolerance, read from the environment on first use.
pub fn global_tolerance() -> Tolerance {
    *GLOBAL.get_or_init(Tolerance::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_missing_uses_default() {
        assert_eq!(Tolerance::parse(None).epsilon, DEFAULT_EPSILON);
    }

    #[test]
    fn parse_valid_value() {
        assert_eq!(Tolerance::parse(Some(" 1e-3 ")).epsilon, 1e-3);
    }

    #[test]
    fn parse_rejects_garbage_and_non_positive() {
        for raw in ["abc", "", "0", "-1e-4", "NaN", "inf"] {
            assert_eq!(
                Tolerance::parse(Some(raw)).epsilon,
                DEFAULT_EPSILON,
                "value {raw:?} should fall back"
            );
        }
    }

    #[test]
    fn compare_within_epsilon_is_equal() {
        let tol = Tolerance::new(1e-3);
        assert_eq!(tol.compare(1.0, 1.0005), Ordering::Equal);
        assert_eq!(tol.compare(1.0, 1.01), Ordering::Less);
        assert_eq!(tol.compare(2.0, 1.0), Ordering::Greater);
    }

    #[test]
    fn compare_nan_is_equal() {
        let tol = Tolerance::default();
        assert_eq!(tol.compare(f64::NAN, 1.0), Ordering::Equal);
    }

    #[test]
    fn new_sanitizes() {
        assert_eq!(Tolerance::new(-1.0).epsilon, DEFAULT_EPSILON);
        assert_eq!(Tolerance::new(0.5).epsilon, 0.5);
    }
}
