//! Physical feasibility of a candidate setup against shop resources.
//!
//! Every check is a pure predicate. Data the candidate does not know (its
//! material or mass) never rules it out. A value within the tolerance of a
//! limit satisfies it.

use setup_types::{global_tolerance, Machine, Resource, Stock, Tolerance};
use tracing::debug;

/// What a feasibility check needs to know about a clamped part.
///
/// Lengths must be in the same unit as the resource limits.
pub trait Workpiece {
    /// Extents along the clamping frame axes.
    fn extents(&self) -> [f64; 3];

    /// Jaw-to-jaw distance the vise must open to.
    fn clamping_thickness(&self) -> f64;

    fn material(&self) -> Option<&str> {
        None
    }

    fn mass_kg(&self) -> Option<f64> {
        None
    }
}

/// A reason a resource cannot take a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    UnsupportedMaterial { material: String },
    ViseOpening { required: f64, limit: f64 },
    Overweight { mass_kg: f64, limit: f64 },
    TooLarge { dimension: f64, limit: f64 },
    TooSmall { dimension: f64, limit: f64 },
    MaterialMismatch { material: String, stock: String },
    ExceedsStock { extents: [f64; 3], stock: [f64; 3] },
}

fn same_material(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn exceeds(value: f64, limit: f64, tolerance: Tolerance) -> bool {
    value > limit + tolerance.epsilon
}

fn falls_short(value: f64, limit: f64, tolerance: Tolerance) -> bool {
    value < limit - tolerance.epsilon
}

fn sorted(mut values: [f64; 3]) -> [f64; 3] {
    values.sort_by(f64::total_cmp);
    values
}

pub fn material_supported(machine: &Machine, workpiece: &impl Workpiece) -> Option<Violation> {
    let material = workpiece.material()?;
    if machine.materials.is_empty()
        || machine.materials.iter().any(|m| same_material(m, material))
    {
        None
    } else {
        Some(Violation::UnsupportedMaterial {
            material: material.to_string(),
        })
    }
}

pub fn within_vise_opening(
    machine: &Machine,
    workpiece: &impl Workpiece,
    tolerance: Tolerance,
) -> Option<Violation> {
    let required = workpiece.clamping_thickness();
    exceeds(required, machine.max_vise_opening, tolerance).then_some(Violation::ViseOpening {
        required,
        limit: machine.max_vise_opening,
    })
}

pub fn within_weight_limit(
    machine: &Machine,
    workpiece: &impl Workpiece,
    tolerance: Tolerance,
) -> Option<Violation> {
    let mass_kg = workpiece.mass_kg()?;
    exceeds(mass_kg, machine.max_part_weight, tolerance).then_some(Violation::Overweight {
        mass_kg,
        limit: machine.max_part_weight,
    })
}

/// Largest extent against the machine maximum, then smallest against its minimum.
pub fn within_envelope(
    machine: &Machine,
    workpiece: &impl Workpiece,
    tolerance: Tolerance,
) -> Option<Violation> {
    let [smallest, _, largest] = sorted(workpiece.extents());
    if exceeds(largest, machine.max_part_dimension, tolerance) {
        return Some(Violation::TooLarge {
            dimension: largest,
            limit: machine.max_part_dimension,
        });
    }
    falls_short(smallest, machine.min_part_dimension, tolerance).then_some(Violation::TooSmall {
        dimension: smallest,
        limit: machine.min_part_dimension,
    })
}

/// The part must be cut from the blank: each sorted extent fits the matching
/// sorted stock dimension, and the materials agree when the part's is known.
pub fn fits_stock(stock: &Stock, workpiece: &impl Workpiece, tolerance: Tolerance) -> Vec<Violation> {
    let mut found = Vec::new();
    if let Some(material) = workpiece.material() {
        if !same_material(material, &stock.material) {
            found.push(Violation::MaterialMismatch {
                material: material.to_string(),
                stock: stock.material.clone(),
            });
        }
    }
    let extents = sorted(workpiece.extents());
    let dims = sorted(stock.dimensions);
    if extents
        .iter()
        .zip(dims.iter())
        .any(|(&e, &d)| exceeds(e, d, tolerance))
    {
        found.push(Violation::ExceedsStock {
            extents,
            stock: dims,
        });
    }
    found
}

pub fn fits_machine(
    machine: &Machine,
    workpiece: &impl Workpiece,
    tolerance: Tolerance,
) -> Vec<Violation> {
    [
        material_supported(machine, workpiece),
        within_vise_opening(machine, workpiece, tolerance),
        within_weight_limit(machine, workpiece, tolerance),
        within_envelope(machine, workpiece, tolerance),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Every reason `resource` rejects the candidate; empty when it fits.
pub fn violations(
    workpiece: &impl Workpiece,
    resource: &Resource,
    tolerance: Tolerance,
) -> Vec<Violation> {
    match resource {
        Resource::Machine(machine) => fits_machine(machine, workpiece, tolerance),
        Resource::Stock(stock) => fits_stock(stock, workpiece, tolerance),
    }
}

/// Whether `resource` can take the candidate, under the process-wide tolerance.
pub fn fits(workpiece: &impl Workpiece, resource: &Resource) -> bool {
    fits_with(workpiece, resource, global_tolerance())
}

pub fn fits_with(workpiece: &impl Workpiece, resource: &Resource, tolerance: Tolerance) -> bool {
    let found = violations(workpiece, resource, tolerance);
    if !found.is_empty() {
        debug!(violations = ?found, "candidate does not fit resource");
    }
    found.is_empty()
}
