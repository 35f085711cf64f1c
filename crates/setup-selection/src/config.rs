use serde::{Deserialize, Serialize};
use setup_types::{global_tolerance, Tolerance};

use crate::error::SelectionError;

/// Favors a short lever arm over the clamped faces, a tall contact band and a
/// low center of gravity, then the number of features reachable in one setup.
/// Meant to be used with normalization so the terms share a scale.
pub const DEFAULT_FORMULA: &str = "2 * ReferenceLeverArmRatio + ReferenceClampingHeight \
     - ReferenceGravityCenterHeight + FullyMachinableCount";

fn default_formula() -> String {
    DEFAULT_FORMULA.to_string()
}

fn default_normalize() -> bool {
    true
}

/// How a selector scores candidates.
///
/// ```json
/// { "formula": "ClampingHeight - GravityCenterHeight",
///   "normalize": true,
///   "tie_breakers": ["ClampingThickness"],
///   "tolerance": 1e-6 }
/// ```
///
/// Every field is optional. Without `tolerance` the process-wide value applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    #[serde(default = "default_formula")]
    pub formula: String,
    #[serde(default = "default_normalize")]
    pub normalize: bool,
    #[serde(default)]
    pub tie_breakers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            formula: default_formula(),
            normalize: default_normalize(),
            tie_breakers: Vec::new(),
            tolerance: None,
        }
    }
}

impl SelectionConfig {
    pub fn from_json(json: &str) -> Result<Self, SelectionError> {
        let config: Self = serde_json::from_str(json).map_err(|e| SelectionError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SelectionError> {
        serde_json::to_string_pretty(self).map_err(|e| SelectionError::Config {
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.formula.trim().is_empty() {
            return Err(SelectionError::Config {
                reason: "formula is empty".into(),
            });
        }
        if let Some(epsilon) = self.tolerance {
            if !(epsilon.is_finite() && epsilon > 0.0) {
                return Err(SelectionError::Config {
                    reason: format!("tolerance must be positive and finite, got {epsilon}"),
                });
            }
        }
        Ok(())
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance.map(Tolerance::new).unwrap_or_else(global_tolerance)
    }
}
