use cam_geom::{BoundingBox, Frame, Plane, Point3d, PolygonProperties, SolidProperties};
use setup_types::LengthUnit;

use crate::types::*;

/// Read-only geometry queries on part bodies.
///
/// Implementations wrap a geometry kernel that is not reentrant, so callers
/// use one implementation from one thread at a time. All answers for an
/// occurrence are given in its prototype's local coordinates and units.
pub trait PartIntrospect {
    /// The part context the body's geometry is defined in.
    fn body_part(&self, body: BodyId) -> Result<PartId, KernelError>;

    /// Length unit of a part context.
    fn part_unit(&self, part: PartId) -> Result<LengthUnit, KernelError>;

    /// `Some` when the body is an occurrence placed in an assembly.
    fn occurrence(&self, body: BodyId) -> Result<Option<Occurrence>, KernelError>;

    fn body_faces(&self, body: BodyId) -> Result<Vec<FaceId>, KernelError>;

    fn body_vertices(&self, body: BodyId) -> Result<Vec<Point3d>, KernelError>;

    /// Volume and centroid of the solid.
    fn body_properties(&self, body: BodyId) -> Result<SolidProperties, KernelError>;

    /// Bounding box of the body expressed in `frame`-local coordinates.
    fn bounding_box(&self, body: BodyId, frame: &Frame) -> Result<BoundingBox, KernelError>;

    fn face_edges(&self, face: FaceId) -> Result<Vec<EdgeId>, KernelError>;

    fn edge_endpoints(&self, edge: EdgeId) -> Result<(Point3d, Point3d), KernelError>;

    /// Supporting plane of a planar face: origin at the face centroid,
    /// normal pointing out of the material.
    fn face_plane(&self, face: FaceId) -> Result<Plane, KernelError>;

    /// Area, centroid and polar moment about the normal axis of a planar face.
    fn face_properties(&self, face: FaceId) -> Result<PolygonProperties, KernelError>;

    /// Factor converting lengths of the `source` part into `target` units.
    fn length_conversion_factor(&self, target: PartId, source: PartId) -> Result<f64, KernelError> {
        Ok(self.part_unit(target)?.conversion_from(self.part_unit(source)?))
    }

    /// Distinct endpoints of every edge of a face.
    fn face_points(&self, face: FaceId) -> Result<Vec<Point3d>, KernelError> {
        let mut points: Vec<Point3d> = Vec::new();
        for edge in self.face_edges(face)? {
            let (a, b) = self.edge_endpoints(edge)?;
            for p in [a, b] {
                if !points.iter().any(|q| q.distance_to(&p) < 1e-12) {
                    points.push(p);
                }
            }
        }
        Ok(points)
    }
}
