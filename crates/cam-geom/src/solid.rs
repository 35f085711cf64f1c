//! Volume and centroid of closed polyhedra.

use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidProperties {
    pub volume: f64,
    pub centroid: Point3d,
}

/// Volume and centroid of a closed polyhedron given as planar face loops.
///
/// All loops must share one orientation (all outward or all inward). Each
/// loop is fan-triangulated and the signed tetrahedra against the first
/// vertex are summed, so far-from-origin solids keep their precision.
/// `None` for an empty or zero-volume shell.
pub fn polyhedron_properties(faces: &[Vec<Point3d>]) -> Option<SolidProperties> {
    let apex = faces.iter().find_map(|f| f.first().copied())?;
    let mut volume6 = 0.0;
    let mut moment = Vec3::ZERO;
    for face in faces {
        if face.len() < 3 {
            continue;
        }
        let a = face[0] - apex;
        for pair in face[1..].windows(2) {
            let b = pair[0] - apex;
            let c = pair[1] - apex;
            let v6 = a.dot(&b.cross(&c));
            volume6 += v6;
            moment = moment + (a + b + c) * v6;
        }
    }
    if volume6.abs() < 1e-30 {
        return None;
    }
    Some(SolidProperties {
        volume: (volume6 / 6.0).abs(),
        centroid: apex + moment / (4.0 * volume6),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::BoundingBox;
    use approx::assert_abs_diff_eq;

    fn box_faces(bb: &BoundingBox) -> Vec<Vec<Point3d>> {
        let c = bb.corners();
        // Outward-wound quads.
        [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 4, 7, 3],
            [1, 2, 6, 5],
        ]
        .iter()
        .map(|idx| idx.iter().map(|&i| c[i]).collect())
        .collect()
    }

    #[test]
    fn box_volume_and_centroid() {
        let bb = BoundingBox::new(Point3d::new(1.0, 2.0, 3.0), Point3d::new(3.0, 5.0, 7.0));
        let props = polyhedron_properties(&box_faces(&bb)).unwrap();
        assert_abs_diff_eq!(props.volume, 24.0, epsilon = 1e-9);
        assert_abs_diff_eq!(props.centroid, bb.center(), epsilon = 1e-9);
    }

    #[test]
    fn inward_winding_gives_same_result() {
        let bb = BoundingBox::new(Point3d::new(-1.0, -1.0, 0.0), Point3d::new(1.0, 3.0, 2.0));
        let mut faces = box_faces(&bb);
        for f in &mut faces {
            f.reverse();
        }
        let props = polyhedron_properties(&faces).unwrap();
        assert_abs_diff_eq!(props.volume, 16.0, epsilon = 1e-9);
        assert_abs_diff_eq!(props.centroid, bb.center(), epsilon = 1e-9);
    }

    #[test]
    fn empty_shell() {
        assert!(polyhedron_properties(&[]).is_none());
    }
}
