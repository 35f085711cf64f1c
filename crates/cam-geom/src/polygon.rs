//! Mass properties of planar polygons.

use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// Area properties of a planar polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonProperties {
    pub area: f64,
    pub centroid: Point3d,
    /// Polar second moment of area about the axis through the centroid
    /// along the polygon normal.
    pub polar_moment: f64,
}

impl PolygonProperties {
    /// Radius of gyration about the normal axis through the centroid.
    pub fn radius_of_gyration(&self) -> f64 {
        if self.area <= 0.0 {
            return 0.0;
        }
        (self.polar_moment / self.area).sqrt()
    }
}

/// Area, centroid and polar moment of a simple planar polygon.
///
/// `loop_points` is the boundary in order (either winding); `normal` is the
/// plane normal. Returns `None` for fewer than three points, a zero normal,
/// or zero area.
pub fn polygon_properties(loop_points: &[Point3d], normal: Vec3) -> Option<PolygonProperties> {
    if loop_points.len() < 3 {
        return None;
    }
    let n = normal.normalized()?;
    let u = n.any_perpendicular();
    let v = n.cross(&u);
    let base = loop_points[0];
    let coords: Vec<(f64, f64)> = loop_points
        .iter()
        .map(|p| {
            let d = *p - base;
            (d.dot(&u), d.dot(&v))
        })
        .collect();

    // Green's theorem sums over the boundary, in local 2D coordinates.
    let mut a2 = 0.0;
    let mut cx6 = 0.0;
    let mut cy6 = 0.0;
    let mut ixx12 = 0.0;
    let mut iyy12 = 0.0;
    for i in 0..coords.len() {
        let (x0, y0) = coords[i];
        let (x1, y1) = coords[(i + 1) % coords.len()];
        let cross = x0 * y1 - x1 * y0;
        a2 += cross;
        cx6 += (x0 + x1) * cross;
        cy6 += (y0 + y1) * cross;
        ixx12 += (y0 * y0 + y0 * y1 + y1 * y1) * cross;
        iyy12 += (x0 * x0 + x0 * x1 + x1 * x1) * cross;
    }
    if a2.abs() < 1e-30 {
        return None;
    }
    // Clockwise loops give negative sums throughout; the ratios are unaffected
    // and the sign cancels once the area is made positive.
    let sign = a2.signum();
    let area = 0.5 * a2 * sign;
    let cx = cx6 / (3.0 * a2);
    let cy = cy6 / (3.0 * a2);
    let ixx = ixx12 * sign / 12.0 - area * cy * cy;
    let iyy = iyy12 * sign / 12.0 - area * cx * cx;

    Some(PolygonProperties {
        area,
        centroid: base + u * cx + v * cy,
        polar_moment: (ixx + iyy).max(0.0),
    })
}
