use serde::{Deserialize, Serialize};

/// Length unit of a part context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Meter,
    Inch,
}

impl LengthUnit {
    pub fn meters_per_unit(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1e-3,
            LengthUnit::Centimeter => 1e-2,
            LengthUnit::Meter => 1.0,
            LengthUnit::Inch => 0.0254,
        }
    }

    /// Factor converting a length expressed in `source` units into `self` units.
    pub fn conversion_from(self, source: LengthUnit) -> f64 {
        if self == source {
            1.0
        } else {
            source.meters_per_unit() / self.meters_per_unit()
        }
    }
}
