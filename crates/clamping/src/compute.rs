use cam_geom::{BoundingBox, Frame, Line, Plane, Point3d, PolygonProperties};
use part_kernel::PartIntrospect;
use setup_types::{global_tolerance, Tolerance};
use tracing::{debug, instrument};

use crate::configuration::{ClampingConfiguration, ClampingScalars};
use crate::error::ClampingError;
use crate::machinability::MachinabilitySplit;
use crate::recenter::center_csys;
use crate::reference::{derive_references, ReferenceContext};
use crate::types::{AnalysisTarget, ClampingFaceRef};

/// Vertices, centroid and box of the analyzed geometry.
struct TargetGeometry {
    vertices: Vec<Point3d>,
    centroid: Point3d,
    bounding_box: BoundingBox,
}

/// Plane, area properties and boundary points of one clamping face.
struct ResolvedFace {
    plane: Plane,
    properties: PolygonProperties,
    points: Vec<Point3d>,
}

/// Derives [`ClampingConfiguration`]s from kernel geometry.
///
/// The kernel is not reentrant; a computer borrows it for one thread.
pub struct FeatureComputer<'k, K: PartIntrospect + ?Sized> {
    kernel: &'k K,
    tolerance: Tolerance,
}

impl<'k, K: PartIntrospect + ?Sized> FeatureComputer<'k, K> {
    pub fn new(kernel: &'k K) -> Self {
        Self {
            kernel,
            tolerance: global_tolerance(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn kernel(&self) -> &'k K {
        self.kernel
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Compute the full configuration for clamping `target` between `first`
    /// and `second`, standing on `bottom`.
    ///
    /// `bottom.normal` points out of the part, into the vise floor.
    #[instrument(skip(self, machinable), fields(fully = machinable.fully.len()))]
    pub fn compute(
        &self,
        target: AnalysisTarget,
        first: ClampingFaceRef,
        second: ClampingFaceRef,
        bottom: Plane,
        machinable: &MachinabilitySplit,
    ) -> Result<ClampingConfiguration, ClampingError> {
        let tol = self.tolerance;
        let geometry = self.target_geometry(&target)?;
        let face_one = self.resolve_face(&first, &geometry.bounding_box)?;
        let face_two = self.resolve_face(&second, &geometry.bounding_box)?;

        if first == second {
            return Err(ClampingError::DegenerateFaces {
                reason: "both clamping faces are the same face".to_string(),
            });
        }
        let n1 = face_one.plane.normal;
        if !n1.is_antiparallel(&face_two.plane.normal, tol.epsilon) {
            return Err(ClampingError::DegenerateFaces {
                reason: format!(
                    "clamping face normals are not opposed (angle {:.6} rad)",
                    n1.angle_to(&face_two.plane.normal)
                ),
            });
        }
        let c1 = face_one.plane.origin;
        let c2 = face_two.plane.origin;
        let clamping_thickness = n1.dot(&(c2 - c1)).abs();
        if tol.is_zero(clamping_thickness) {
            return Err(ClampingError::DegenerateFaces {
                reason: "clamping faces are coplanar".to_string(),
            });
        }

        // Vise-center line: along the jaws, through the projected mid-point
        // of the two faces. The origin is the middle of the vertex extent on it.
        let jaw_direction = bottom
            .normal
            .cross(&n1)
            .normalized()
            .ok_or(ClampingError::ParallelBottomPlane)?;
        let anchor = bottom.project_point(&c1.midpoint(&c2));
        let line = Line::new(anchor, jaw_direction).ok_or(ClampingError::ParallelBottomPlane)?;
        let (t_min, t_max) = geometry
            .vertices
            .iter()
            .map(|v| line.parameter_of(v))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
                (lo.min(t), hi.max(t))
            });
        let origin = line.point_at(0.5 * (t_min + t_max));

        let frame =
            Frame::from_xy(origin, jaw_direction, n1).ok_or(ClampingError::ParallelBottomPlane)?;
        let bottom_plane = Plane {
            origin,
            normal: bottom.normal,
        };

        let clamping_height = contact_height(&frame, &face_one.points, &face_two.points);
        let gravity_center_height =
            bottom.normal.dot(&(origin - geometry.centroid)) + clamping_height;

        let longest_lever_arm = self
            .reachable_points(&target, &geometry, machinable)?
            .iter()
            .map(|p| (*p - c1).reject_from(&n1).length())
            .fold(0.0, f64::max);
        let lever_arm_ratio = if tol.is_zero(longest_lever_arm) {
            f64::INFINITY
        } else {
            face_one.properties.radius_of_gyration()
                / (face_one.properties.area.sqrt() * longest_lever_arm)
        };

        let extents = local_box(self.kernel, &target, &frame)?.extents();
        let raw = ClampingScalars {
            clamping_thickness,
            clamping_height,
            lever_arm_ratio,
            gravity_center_height,
            extents,
        };

        let reference_context = ReferenceContext::resolve(self.kernel, &target)?;
        let (reference_frame, reference) =
            derive_references(reference_context.as_ref(), &frame, &raw)?;

        debug!(
            thickness = clamping_thickness,
            height = clamping_height,
            lever_arm_ratio,
            gravity_center_height,
            occurrence = reference_context.is_some(),
            "clamping configuration computed"
        );

        Ok(ClampingConfiguration {
            target,
            faces: [first, second],
            face_planes: [face_one.plane, face_two.plane],
            bottom_plane,
            bounding_box: geometry.bounding_box,
            machinable: machinable.clone(),
            frame,
            raw,
            reference_context,
            reference_frame,
            reference,
        })
    }

    /// Snap the frame origin to the bounding-box center in the jaw plane.
    pub fn recenter(
        &self,
        config: &ClampingConfiguration,
    ) -> Result<ClampingConfiguration, ClampingError> {
        center_csys(self.kernel, config)
    }

    fn target_geometry(&self, target: &AnalysisTarget) -> Result<TargetGeometry, ClampingError> {
        match target {
            AnalysisTarget::Body(body) => {
                let vertices = self.kernel.body_vertices(*body)?;
                if vertices.is_empty() {
                    return Err(ClampingError::EmptyGeometry {
                        reason: format!("{:?} has no vertices", body),
                    });
                }
                let centroid = self.kernel.body_properties(*body)?.centroid;
                let bounding_box = BoundingBox::from_points(&vertices);
                Ok(TargetGeometry {
                    vertices,
                    centroid,
                    bounding_box,
                })
            }
            AnalysisTarget::BoundingBox(bbox) => {
                if !bbox.is_valid() {
                    return Err(ClampingError::EmptyGeometry {
                        reason: "bounding box is empty".to_string(),
                    });
                }
                Ok(TargetGeometry {
                    vertices: bbox.corners().to_vec(),
                    centroid: bbox.center(),
                    bounding_box: *bbox,
                })
            }
        }
    }

    fn resolve_face(
        &self,
        face: &ClampingFaceRef,
        bbox: &BoundingBox,
    ) -> Result<ResolvedFace, ClampingError> {
        match face {
            ClampingFaceRef::Face(id) => Ok(ResolvedFace {
                plane: self.kernel.face_plane(*id)?,
                properties: self.kernel.face_properties(*id)?,
                points: self.kernel.face_points(*id)?,
            }),
            ClampingFaceRef::BoxSide(side) => Ok(ResolvedFace {
                plane: side.plane(bbox),
                properties: side.properties(bbox),
                points: side.points(bbox),
            }),
        }
    }

    /// Points a tool must reach: edge endpoints of every fully machinable
    /// feature for bodies, the corners for a bare box.
    fn reachable_points(
        &self,
        target: &AnalysisTarget,
        geometry: &TargetGeometry,
        machinable: &MachinabilitySplit,
    ) -> Result<Vec<Point3d>, ClampingError> {
        match target {
            AnalysisTarget::BoundingBox(_) => Ok(geometry.vertices.clone()),
            AnalysisTarget::Body(_) => {
                let mut points = Vec::new();
                for feature in &machinable.fully {
                    for face in &feature.faces {
                        for edge in self.kernel.face_edges(*face)? {
                            let (a, b) = self.kernel.edge_endpoints(edge)?;
                            points.push(a);
                            points.push(b);
                        }
                    }
                }
                Ok(points)
            }
        }
    }
}

/// Box of the target expressed in `frame`-local coordinates.
pub(crate) fn local_box<K: PartIntrospect + ?Sized>(
    kernel: &K,
    target: &AnalysisTarget,
    frame: &Frame,
) -> Result<BoundingBox, ClampingError> {
    match target {
        AnalysisTarget::Body(body) => Ok(kernel.bounding_box(*body, frame)?),
        AnalysisTarget::BoundingBox(bbox) => {
            let local: Vec<Point3d> = bbox.corners().iter().map(|c| frame.to_local(c)).collect();
            Ok(BoundingBox::from_points(&local))
        }
    }
}

/// Overlap of the two faces' height ranges above the frame origin, along Z.
fn contact_height(frame: &Frame, one: &[Point3d], two: &[Point3d]) -> f64 {
    let range = |points: &[Point3d]| {
        points
            .iter()
            .map(|p| frame.to_local(p).z)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
                (lo.min(h), hi.max(h))
            })
    };
    let (lo1, hi1) = range(one);
    let (lo2, hi2) = range(two);
    (hi1.min(hi2) - lo1.max(lo2)).max(0.0)
}
