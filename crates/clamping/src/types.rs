use cam_geom::{BoundingBox, Plane, Point3d, PolygonProperties, Vec3};
use part_kernel::{BodyId, FaceId};
use serde::{Deserialize, Serialize};

/// What a clamping configuration is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnalysisTarget {
    Body(BodyId),
    /// A pure envelope analysis, e.g. of raw stock.
    BoundingBox(BoundingBox),
}

impl AnalysisTarget {
    pub fn body(&self) -> Option<BodyId> {
        match self {
            AnalysisTarget::Body(body) => Some(*body),
            AnalysisTarget::BoundingBox(_) => None,
        }
    }
}

/// One side of an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxSide {
    MinX,
    MaxX,
    MinY,
    MaxY,
    MinZ,
    MaxZ,
}

impl BoxSide {
    pub const ALL: [BoxSide; 6] = [
        BoxSide::MinX,
        BoxSide::MaxX,
        BoxSide::MinY,
        BoxSide::MaxY,
        BoxSide::MinZ,
        BoxSide::MaxZ,
    ];

    pub fn axis(self) -> usize {
        match self {
            BoxSide::MinX | BoxSide::MaxX => 0,
            BoxSide::MinY | BoxSide::MaxY => 1,
            BoxSide::MinZ | BoxSide::MaxZ => 2,
        }
    }

    pub fn is_max(self) -> bool {
        matches!(self, BoxSide::MaxX | BoxSide::MaxY | BoxSide::MaxZ)
    }

    pub fn opposite(self) -> Self {
        match self {
            BoxSide::MinX => BoxSide::MaxX,
            BoxSide::MaxX => BoxSide::MinX,
            BoxSide::MinY => BoxSide::MaxY,
            BoxSide::MaxY => BoxSide::MinY,
            BoxSide::MinZ => BoxSide::MaxZ,
            BoxSide::MaxZ => BoxSide::MinZ,
        }
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vec3 {
        let axis = Vec3::from_array(unit(self.axis()));
        if self.is_max() {
            axis
        } else {
            -axis
        }
    }

    /// The four corners of this side of `bbox`.
    pub fn points(self, bbox: &BoundingBox) -> Vec<Point3d> {
        let axis = self.axis();
        let level = if self.is_max() {
            bbox.max.coord(axis)
        } else {
            bbox.min.coord(axis)
        };
        bbox.corners()
            .into_iter()
            .filter(|c| c.coord(axis) == level)
            .collect()
    }

    /// Supporting plane through the side's center, normal pointing outward.
    pub fn plane(self, bbox: &BoundingBox) -> Plane {
        let center = self.center(bbox);
        Plane {
            origin: center,
            normal: self.normal(),
        }
    }

    /// Area properties of the rectangular side.
    pub fn properties(self, bbox: &BoundingBox) -> PolygonProperties {
        let extents = bbox.extents();
        let axis = self.axis();
        let a = extents[(axis + 1) % 3];
        let b = extents[(axis + 2) % 3];
        let area = a * b;
        PolygonProperties {
            area,
            centroid: self.center(bbox),
            polar_moment: area * (a * a + b * b) / 12.0,
        }
    }

    fn center(self, bbox: &BoundingBox) -> Point3d {
        let mut c = bbox.center().to_array();
        let axis = self.axis();
        c[axis] = if self.is_max() {
            bbox.max.coord(axis)
        } else {
            bbox.min.coord(axis)
        };
        Point3d::from_array(c)
    }
}

fn unit(axis: usize) -> [f64; 3] {
    let mut a = [0.0; 3];
    a[axis] = 1.0;
    a
}

/// A face used as a vise jaw contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClampingFaceRef {
    Face(FaceId),
    BoxSide(BoxSide),
}

/// Identifier of a machinable feature (pocket, hole, face group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub u64);

/// A machining feature and the faces a tool must reach to cut it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachinableFeature {
    pub id: FeatureId,
    pub name: String,
    pub faces: Vec<FaceId>,
}

impl MachinableFeature {
    pub fn new(id: u64, name: impl Into<String>, faces: Vec<FaceId>) -> Self {
        Self {
            id: FeatureId(id),
            name: name.into(),
            faces,
        }
    }
}
