//! Geometric primitives for setup analysis.
//!
//! Points, vectors, planes, lines, coordinate frames, affine transforms and
//! bounding boxes, plus mass properties of planar polygons and closed
//! polyhedra. Everything here is a pure function of immutable inputs.

pub mod frame;
pub mod plane;
pub mod point;
pub mod polygon;
pub mod solid;
pub mod transform;
pub mod vector;

pub use frame::Frame;
pub use plane::{Line, Plane};
pub use point::Point3d;
pub use polygon::{polygon_properties, PolygonProperties};
pub use solid::{polyhedron_properties, SolidProperties};
pub use transform::{BoundingBox, Transform};
pub use vector::Vec3;
