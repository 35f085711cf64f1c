//! The named features a selection formula can refer to.

use clamping::ClampingConfiguration;
use ranking::{FeatureSet, Value};

use crate::feasibility::Workpiece;

/// Feature names of [`clamping_feature_set`].
pub mod names {
    pub const CLAMPING_HEIGHT: &str = "ClampingHeight";
    pub const CLAMPING_THICKNESS: &str = "ClampingThickness";
    pub const LEVER_ARM_RATIO: &str = "LeverArmRatio";
    pub const GRAVITY_CENTER_HEIGHT: &str = "GravityCenterHeight";
    pub const EXTENT_X: &str = "ExtentX";
    pub const EXTENT_Y: &str = "ExtentY";
    pub const EXTENT_Z: &str = "ExtentZ";
    pub const REFERENCE_CLAMPING_HEIGHT: &str = "ReferenceClampingHeight";
    pub const REFERENCE_CLAMPING_THICKNESS: &str = "ReferenceClampingThickness";
    pub const REFERENCE_LEVER_ARM_RATIO: &str = "ReferenceLeverArmRatio";
    pub const REFERENCE_GRAVITY_CENTER_HEIGHT: &str = "ReferenceGravityCenterHeight";
    pub const REFERENCE_EXTENT_X: &str = "ReferenceExtentX";
    pub const REFERENCE_EXTENT_Y: &str = "ReferenceExtentY";
    pub const REFERENCE_EXTENT_Z: &str = "ReferenceExtentZ";
    pub const FULLY_MACHINABLE_COUNT: &str = "FullyMachinableCount";
    pub const PARTIALLY_MACHINABLE_COUNT: &str = "PartiallyMachinableCount";
    pub const IS_OCCURRENCE: &str = "IsOccurrence";
}

/// Anything that carries a clamping configuration.
pub trait HasClamping {
    fn clamping(&self) -> &ClampingConfiguration;
}

impl HasClamping for ClampingConfiguration {
    fn clamping(&self) -> &ClampingConfiguration {
        self
    }
}

/// A configuration together with what the shop knows about the part.
#[derive(Debug, Clone)]
pub struct SetupCandidate {
    pub configuration: ClampingConfiguration,
    pub material: Option<String>,
    pub mass_kg: Option<f64>,
}

impl SetupCandidate {
    pub fn new(configuration: ClampingConfiguration) -> Self {
        Self {
            configuration,
            material: None,
            mass_kg: None,
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn with_mass_kg(mut self, mass_kg: f64) -> Self {
        self.mass_kg = Some(mass_kg);
        self
    }
}

impl HasClamping for SetupCandidate {
    fn clamping(&self) -> &ClampingConfiguration {
        &self.configuration
    }
}

// Resource limits are stated in the assembly's unit, so feasibility uses the
// reference values.
impl Workpiece for ClampingConfiguration {
    fn extents(&self) -> [f64; 3] {
        self.reference().extents
    }

    fn clamping_thickness(&self) -> f64 {
        self.reference().clamping_thickness
    }
}

impl Workpiece for SetupCandidate {
    fn extents(&self) -> [f64; 3] {
        Workpiece::extents(&self.configuration)
    }

    fn clamping_thickness(&self) -> f64 {
        Workpiece::clamping_thickness(&self.configuration)
    }

    fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    fn mass_kg(&self) -> Option<f64> {
        self.mass_kg
    }
}

/// Every standard clamping feature, raw values first, then the reference
/// (assembly-unit) values, then counts and flags.
pub fn clamping_feature_set<T: HasClamping + 'static>() -> FeatureSet<T> {
    use names::*;

    FeatureSet::new()
        .with_number(CLAMPING_HEIGHT, |c: &T| c.clamping().raw().clamping_height)
        .with_number(CLAMPING_THICKNESS, |c: &T| {
            c.clamping().raw().clamping_thickness
        })
        .with_number(LEVER_ARM_RATIO, |c: &T| c.clamping().raw().lever_arm_ratio)
        .with_number(GRAVITY_CENTER_HEIGHT, |c: &T| {
            c.clamping().raw().gravity_center_height
        })
        .with_number(EXTENT_X, |c: &T| c.clamping().raw().extents[0])
        .with_number(EXTENT_Y, |c: &T| c.clamping().raw().extents[1])
        .with_number(EXTENT_Z, |c: &T| c.clamping().raw().extents[2])
        .with_number(REFERENCE_CLAMPING_HEIGHT, |c: &T| {
            c.clamping().reference().clamping_height
        })
        .with_number(REFERENCE_CLAMPING_THICKNESS, |c: &T| {
            c.clamping().reference().clamping_thickness
        })
        .with_number(REFERENCE_LEVER_ARM_RATIO, |c: &T| {
            c.clamping().reference().lever_arm_ratio
        })
        .with_number(REFERENCE_GRAVITY_CENTER_HEIGHT, |c: &T| {
            c.clamping().reference().gravity_center_height
        })
        .with_number(REFERENCE_EXTENT_X, |c: &T| c.clamping().reference().extents[0])
        .with_number(REFERENCE_EXTENT_Y, |c: &T| c.clamping().reference().extents[1])
        .with_number(REFERENCE_EXTENT_Z, |c: &T| c.clamping().reference().extents[2])
        .with_feature(FULLY_MACHINABLE_COUNT, |c: &T| {
            Value::from(c.clamping().fully_machinable().len())
        })
        .with_feature(PARTIALLY_MACHINABLE_COUNT, |c: &T| {
            Value::from(c.clamping().partially_machinable().len())
        })
        .with_feature(IS_OCCURRENCE, |c: &T| Value::Boolean(c.clamping().is_occurrence()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_is_declared_once() {
        let set = clamping_feature_set::<ClampingConfiguration>();
        assert_eq!(set.len(), 17);
        for name in [
            names::CLAMPING_HEIGHT,
            names::REFERENCE_EXTENT_Z,
            names::FULLY_MACHINABLE_COUNT,
            names::IS_OCCURRENCE,
        ] {
            assert!(set.index_of(name).is_some(), "{name} missing");
        }
        let mut all: Vec<&str> = set.names().collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 17);
    }
}
