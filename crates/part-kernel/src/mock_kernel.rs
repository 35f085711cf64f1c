//! Deterministic polyhedral test double implementing PartIntrospect.
//!
//! Bodies are closed polyhedra with planar, outward-wound faces. Mass
//! properties are computed exactly from the face loops, so tests can state
//! expected clamping values in closed form.

use std::collections::HashMap;

use cam_geom::{
    polygon_properties, polyhedron_properties, BoundingBox, Frame, Plane, Point3d,
    PolygonProperties, SolidProperties, Transform, Vec3,
};
use setup_types::LengthUnit;
use tracing::debug;

use crate::traits::PartIntrospect;
use crate::types::*;

#[derive(Debug, Clone)]
struct MockEdge {
    id: EdgeId,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
struct MockFace {
    id: FaceId,
    /// Vertex indices in outward winding order.
    vertices: Vec<usize>,
    edges: Vec<EdgeId>,
    normal: Vec3,
}

#[derive(Debug, Clone)]
struct MockSolid {
    part: PartId,
    vertices: Vec<Point3d>,
    edges: Vec<MockEdge>,
    faces: Vec<MockFace>,
}

impl MockSolid {
    fn face_loop(&self, face: &MockFace) -> Vec<Point3d> {
        face.vertices.iter().map(|&i| self.vertices[i]).collect()
    }
}

#[derive(Debug, Clone)]
enum MockBody {
    Solid(MockSolid),
    Occurrence(Occurrence),
}

/// Deterministic geometry kernel for tests.
pub struct MockKernel {
    next_id: u64,
    parts: HashMap<PartId, LengthUnit>,
    bodies: HashMap<BodyId, MockBody>,
    face_owner: HashMap<FaceId, BodyId>,
    edge_owner: HashMap<EdgeId, BodyId>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            parts: HashMap::new(),
            bodies: HashMap::new(),
            face_owner: HashMap::new(),
            edge_owner: HashMap::new(),
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register a part context.
    pub fn add_part(&mut self, unit: LengthUnit) -> PartId {
        let part = PartId(self.alloc_id());
        self.parts.insert(part, unit);
        part
    }

    /// Axis-aligned box body from `min` to `max`.
    pub fn add_box(&mut self, part: PartId, min: Point3d, max: Point3d) -> Result<BodyId, KernelError> {
        let profile = [
            (min.x, min.y),
            (max.x, min.y),
            (max.x, max.y),
            (min.x, max.y),
        ];
        self.add_prism(part, &profile, min.z, max.z - min.z)
    }

    /// Extrude a simple XY polygon from `z0` along +Z by `height`.
    pub fn add_prism(
        &mut self,
        part: PartId,
        profile: &[(f64, f64)],
        z0: f64,
        height: f64,
    ) -> Result<BodyId, KernelError> {
        if profile.len() < 3 || height <= 0.0 {
            return Err(KernelError::DegenerateGeometry {
                reason: format!(
                    "prism needs >= 3 profile points and positive height (got {}, {})",
                    profile.len(),
                    height
                ),
            });
        }
        let signed_area: f64 = (0..profile.len())
            .map(|i| {
                let (x0, y0) = profile[i];
                let (x1, y1) = profile[(i + 1) % profile.len()];
                x0 * y1 - x1 * y0
            })
            .sum();
        let mut ring: Vec<(f64, f64)> = profile.to_vec();
        if signed_area < 0.0 {
            ring.reverse();
        }

        let n = ring.len();
        let mut vertices: Vec<Point3d> = ring.iter().map(|&(x, y)| Point3d::new(x, y, z0)).collect();
        vertices.extend(ring.iter().map(|&(x, y)| Point3d::new(x, y, z0 + height)));

        let mut faces: Vec<Vec<usize>> = Vec::with_capacity(n + 2);
        faces.push((0..n).rev().collect());
        faces.push((n..2 * n).collect());
        for i in 0..n {
            let j = (i + 1) % n;
            faces.push(vec![i, j, n + j, n + i]);
        }
        self.add_polyhedron(part, vertices, faces)
    }

    /// General closed polyhedron. Face loops must be planar and wound
    /// counter-clockwise when seen from outside.
    pub fn add_polyhedron(
        &mut self,
        part: PartId,
        vertices: Vec<Point3d>,
        faces: Vec<Vec<usize>>,
    ) -> Result<BodyId, KernelError> {
        if !self.parts.contains_key(&part) {
            return Err(KernelError::UnknownPart { part });
        }
        let body = BodyId(self.alloc_id());
        let mut edge_index: HashMap<(usize, usize), EdgeId> = HashMap::new();
        let mut edges = Vec::new();
        let mut mock_faces = Vec::with_capacity(faces.len());

        for loop_indices in faces {
            if loop_indices.len() < 3 || loop_indices.iter().any(|&i| i >= vertices.len()) {
                return Err(KernelError::DegenerateGeometry {
                    reason: format!("invalid face loop {:?}", loop_indices),
                });
            }
            let normal = newell_normal(&vertices, &loop_indices).ok_or_else(|| {
                KernelError::DegenerateGeometry {
                    reason: format!("zero-area face loop {:?}", loop_indices),
                }
            })?;
            let mut face_edges = Vec::with_capacity(loop_indices.len());
            for k in 0..loop_indices.len() {
                let a = loop_indices[k];
                let b = loop_indices[(k + 1) % loop_indices.len()];
                let key = (a.min(b), a.max(b));
                let id = match edge_index.get(&key) {
                    Some(id) => *id,
                    None => {
                        let id = EdgeId(self.alloc_id());
                        edge_index.insert(key, id);
                        edges.push(MockEdge { id, start: a, end: b });
                        self.edge_owner.insert(id, body);
                        id
                    }
                };
                face_edges.push(id);
            }
            let face_id = FaceId(self.alloc_id());
            self.face_owner.insert(face_id, body);
            mock_faces.push(MockFace {
                id: face_id,
                vertices: loop_indices,
                edges: face_edges,
                normal,
            });
        }

        debug!(
            ?body,
            vertices = vertices.len(),
            edges = edges.len(),
            faces = mock_faces.len(),
            "mock polyhedron created"
        );
        self.bodies.insert(
            body,
            MockBody::Solid(MockSolid {
                part,
                vertices,
                edges,
                faces: mock_faces,
            }),
        );
        Ok(body)
    }

    /// Place `prototype` into the assembly part `owner`.
    pub fn add_occurrence(
        &mut self,
        owner: PartId,
        prototype: BodyId,
        placement: Transform,
    ) -> Result<BodyId, KernelError> {
        if !self.parts.contains_key(&owner) {
            return Err(KernelError::UnknownPart { part: owner });
        }
        self.solid(prototype)?;
        let body = BodyId(self.alloc_id());
        self.bodies.insert(
            body,
            MockBody::Occurrence(Occurrence {
                prototype,
                owner,
                placement,
            }),
        );
        Ok(body)
    }

    /// The first face whose outward normal points along `direction`.
    pub fn find_face(&self, body: BodyId, direction: Vec3) -> Option<FaceId> {
        let solid = self.solid(body).ok()?;
        solid
            .faces
            .iter()
            .find(|f| f.normal.is_codirectional(&direction, 1e-9))
            .map(|f| f.id)
    }

    /// Resolve a body to the solid that carries its geometry.
    fn solid(&self, body: BodyId) -> Result<&MockSolid, KernelError> {
        let mut current = body;
        // Occurrence chains are short; the bound guards against cycles.
        for _ in 0..16 {
            match self.bodies.get(&current) {
                Some(MockBody::Solid(s)) => return Ok(s),
                Some(MockBody::Occurrence(o)) => current = o.prototype,
                None => break,
            }
        }
        Err(KernelError::EntityNotFound {
            entity: format!("{:?}", body),
        })
    }

    fn face(&self, face: FaceId) -> Result<(&MockSolid, &MockFace), KernelError> {
        let not_found = || KernelError::EntityNotFound {
            entity: format!("{:?}", face),
        };
        let body = self.face_owner.get(&face).ok_or_else(not_found)?;
        let solid = self.solid(*body)?;
        let f = solid.faces.iter().find(|f| f.id == face).ok_or_else(not_found)?;
        Ok((solid, f))
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Newell's method: robust normal of a possibly non-convex planar loop.
fn newell_normal(vertices: &[Point3d], loop_indices: &[usize]) -> Option<Vec3> {
    let mut n = Vec3::ZERO;
    for k in 0..loop_indices.len() {
        let a = vertices[loop_indices[k]];
        let b = vertices[loop_indices[(k + 1) % loop_indices.len()]];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.normalized()
}

impl PartIntrospect for MockKernel {
    fn body_part(&self, body: BodyId) -> Result<PartId, KernelError> {
        Ok(self.solid(body)?.part)
    }

    fn part_unit(&self, part: PartId) -> Result<LengthUnit, KernelError> {
        self.parts
            .get(&part)
            .copied()
            .ok_or(KernelError::UnknownPart { part })
    }

    fn occurrence(&self, body: BodyId) -> Result<Option<Occurrence>, KernelError> {
        match self.bodies.get(&body) {
            Some(MockBody::Occurrence(o)) => Ok(Some(o.clone())),
            Some(MockBody::Solid(_)) => Ok(None),
            None => Err(KernelError::EntityNotFound {
                entity: format!("{:?}", body),
            }),
        }
    }

    fn body_faces(&self, body: BodyId) -> Result<Vec<FaceId>, KernelError> {
        Ok(self.solid(body)?.faces.iter().map(|f| f.id).collect())
    }

    fn body_vertices(&self, body: BodyId) -> Result<Vec<Point3d>, KernelError> {
        Ok(self.solid(body)?.vertices.clone())
    }

    fn body_properties(&self, body: BodyId) -> Result<SolidProperties, KernelError> {
        let solid = self.solid(body)?;
        let loops: Vec<Vec<Point3d>> = solid.faces.iter().map(|f| solid.face_loop(f)).collect();
        polyhedron_properties(&loops).ok_or_else(|| KernelError::DegenerateGeometry {
            reason: format!("{:?} encloses no volume", body),
        })
    }

    fn bounding_box(&self, body: BodyId, frame: &Frame) -> Result<BoundingBox, KernelError> {
        let solid = self.solid(body)?;
        let local: Vec<Point3d> = solid.vertices.iter().map(|p| frame.to_local(p)).collect();
        let bb = BoundingBox::from_points(&local);
        if bb.is_valid() {
            Ok(bb)
        } else {
            Err(KernelError::DegenerateGeometry {
                reason: format!("{:?} has no vertices", body),
            })
        }
    }

    fn face_edges(&self, face: FaceId) -> Result<Vec<EdgeId>, KernelError> {
        Ok(self.face(face)?.1.edges.clone())
    }

    fn edge_endpoints(&self, edge: EdgeId) -> Result<(Point3d, Point3d), KernelError> {
        let not_found = || KernelError::EntityNotFound {
            entity: format!("{:?}", edge),
        };
        let body = self.edge_owner.get(&edge).ok_or_else(not_found)?;
        let solid = self.solid(*body)?;
        let e = solid.edges.iter().find(|e| e.id == edge).ok_or_else(not_found)?;
        Ok((solid.vertices[e.start], solid.vertices[e.end]))
    }

    fn face_plane(&self, face: FaceId) -> Result<Plane, KernelError> {
        let props = self.face_properties(face)?;
        let (_, f) = self.face(face)?;
        Plane::new(props.centroid, f.normal).ok_or(KernelError::NotPlanar { face })
    }

    fn face_properties(&self, face: FaceId) -> Result<PolygonProperties, KernelError> {
        let (solid, f) = self.face(face)?;
        polygon_properties(&solid.face_loop(f), f.normal).ok_or_else(|| {
            KernelError::DegenerateGeometry {
                reason: format!("{:?} has zero area", face),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_box(kernel: &mut MockKernel) -> BodyId {
        let part = kernel.add_part(LengthUnit::Millimeter);
        kernel
            .add_box(part, Point3d::ORIGIN, Point3d::new(10.0, 20.0, 30.0))
            .unwrap()
    }

    #[test]
    fn test_box_topology_counts() {
        let mut kernel = MockKernel::new();
        let body = unit_box(&mut kernel);
        let solid = kernel.solid(body).unwrap();
        assert_eq!(solid.vertices.len(), 8);
        assert_eq!(solid.edges.len(), 12);
        assert_eq!(solid.faces.len(), 6);
        let (v, e, f) = (8i64, 12i64, 6i64);
        assert_eq!(v - e + f, 2, "Euler formula V-E+F=2 must hold for a box");
    }

    #[test]
    fn test_box_faces_point_outward() {
        let mut kernel = MockKernel::new();
        let body = unit_box(&mut kernel);
        let center = Point3d::new(5.0, 10.0, 15.0);
        for face in kernel.body_faces(body).unwrap() {
            let plane = kernel.face_plane(face).unwrap();
            assert!(
                plane.signed_distance(&center) < 0.0,
                "face {:?} normal points inward",
                face
            );
        }
    }

    #[test]
    fn test_box_mass_properties() {
        let mut kernel = MockKernel::new();
        let body = unit_box(&mut kernel);
        let props = kernel.body_properties(body).unwrap();
        assert_abs_diff_eq!(props.volume, 6000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(props.centroid, Point3d::new(5.0, 10.0, 15.0), epsilon = 1e-9);
    }

    #[test]
    fn test_face_properties() {
        let mut kernel = MockKernel::new();
        let body = unit_box(&mut kernel);
        let side = kernel.find_face(body, Vec3::X).unwrap();
        let props = kernel.face_properties(side).unwrap();
        assert_abs_diff_eq!(props.area, 600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(props.centroid, Point3d::new(10.0, 10.0, 15.0), epsilon = 1e-9);
        assert_eq!(kernel.face_points(side).unwrap().len(), 4);
    }

    #[test]
    fn test_clockwise_profile_is_normalized() {
        let mut kernel = MockKernel::new();
        let part = kernel.add_part(LengthUnit::Millimeter);
        let cw = [(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)];
        let body = kernel.add_prism(part, &cw, 0.0, 1.0).unwrap();
        assert!(kernel.find_face(body, Vec3::Z).is_some());
        let props = kernel.body_properties(body).unwrap();
        assert_abs_diff_eq!(props.volume, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_occurrence_resolves_to_prototype() {
        let mut kernel = MockKernel::new();
        let proto = unit_box(&mut kernel);
        let asm = kernel.add_part(LengthUnit::Inch);
        let occ = kernel
            .add_occurrence(asm, proto, Transform::translation(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(kernel.body_faces(occ).unwrap(), kernel.body_faces(proto).unwrap());
        let info = kernel.occurrence(occ).unwrap().unwrap();
        assert_eq!(info.prototype, proto);
        assert!(kernel.occurrence(proto).unwrap().is_none());
        let part = kernel.body_part(occ).unwrap();
        let factor = kernel.length_conversion_factor(asm, part).unwrap();
        assert_abs_diff_eq!(factor, 1.0 / 25.4, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_entities() {
        let mut kernel = MockKernel::new();
        assert!(matches!(
            kernel.body_faces(BodyId(99)),
            Err(KernelError::EntityNotFound { .. })
        ));
        assert!(matches!(
            kernel.add_box(PartId(42), Point3d::ORIGIN, Point3d::new(1.0, 1.0, 1.0)),
            Err(KernelError::UnknownPart { .. })
        ));
        assert!(kernel.face_plane(FaceId(7)).is_err());
    }

    #[test]
    fn test_bounding_box_in_rotated_frame() {
        let mut kernel = MockKernel::new();
        let body = unit_box(&mut kernel);
        let frame = Frame::from_xy(Point3d::ORIGIN, Vec3::Y, -Vec3::X).unwrap();
        let bb = kernel.bounding_box(body, &frame).unwrap();
        assert_abs_diff_eq!(bb.extents()[0], 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.extents()[1], 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.extents()[2], 30.0, epsilon = 1e-9);
    }
}
