use serde::{Deserialize, Serialize};

/// A machine tool from the shop catalog.
///
/// Limits are expressed in the same length unit as the parts they are checked
/// against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,
    /// Materials the machine may cut. Empty means unrestricted.
    #[serde(default)]
    pub materials: Vec<String>,
    /// Largest admissible part dimension.
    pub max_part_dimension: f64,
    /// Smallest admissible part dimension.
    #[serde(default)]
    pub min_part_dimension: f64,
    /// Maximum vise jaw opening.
    pub max_vise_opening: f64,
    /// Maximum part weight in kilograms.
    pub max_part_weight: f64,
}

/// A raw stock blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub name: String,
    pub material: String,
    /// Blank dimensions, in any order.
    pub dimensions: [f64; 3],
}

/// Either kind of resource a candidate can be checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Resource {
    Machine(Machine),
    Stock(Stock),
}
