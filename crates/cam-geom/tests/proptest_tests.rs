//! Property-based tests for geometric invariants the clamping analysis relies on.

use proptest::prelude::*;

use cam_geom::{polygon_properties, BoundingBox, Frame, Line, Plane, Point3d, Transform, Vec3};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_point() -> impl Strategy<Value = (f64, f64, f64)> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0, -1000.0f64..1000.0)
}

fn arb_positive_dim() -> impl Strategy<Value = f64> {
    0.1f64..500.0
}

fn arb_angle() -> impl Strategy<Value = f64> {
    -std::f64::consts::PI..std::f64::consts::PI
}

const TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// 1. Plane projection is idempotent and lands on the plane
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn plane_projection_idempotent(
        (px, py, pz) in arb_point(),
        (ox, oy, oz) in arb_point(),
        (nx, ny, nz) in arb_point(),
    ) {
        prop_assume!(Vec3::new(nx, ny, nz).length() > 1e-3);
        let plane = Plane::new(Point3d::new(ox, oy, oz), Vec3::new(nx, ny, nz)).unwrap();
        let q = plane.project_point(&Point3d::new(px, py, pz));
        prop_assert!(plane.signed_distance(&q).abs() < TOL * 100.0,
            "projected point off plane by {}", plane.signed_distance(&q));
        let qq = plane.project_point(&q);
        prop_assert!(q.distance_to(&qq) < TOL * 100.0);
    }
}

// ---------------------------------------------------------------------------
// 2. Line parameters order projected points consistently
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn line_parameter_matches_projection(
        (px, py, pz) in arb_point(),
        (dx, dy, dz) in arb_point(),
    ) {
        prop_assume!(Vec3::new(dx, dy, dz).length() > 1e-3);
        let line = Line::new(Point3d::ORIGIN, Vec3::new(dx, dy, dz)).unwrap();
        let p = Point3d::new(px, py, pz);
        let t = line.parameter_of(&p);
        let q = line.project_point(&p);
        prop_assert!((q.to_vec3().length() - t.abs()).abs() < TOL * 100.0);
        // The residual is orthogonal to the line.
        prop_assert!((p - q).dot(&line.direction).abs() < TOL * 100.0);
    }
}

// ---------------------------------------------------------------------------
// 3. Rigid transforms preserve distance
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rigid_transform_preserves_distance(
        (ax, ay, az) in arb_point(),
        (bx, by, bz) in arb_point(),
        (tx, ty, tz) in arb_point(),
        angle in arb_angle(),
    ) {
        let t = Transform::translation(Vec3::new(tx, ty, tz))
            .compose(&Transform::rotation_axis_angle(Vec3::new(1.0, 2.0, 3.0), angle).unwrap());
        let a = Point3d::new(ax, ay, az);
        let b = Point3d::new(bx, by, bz);
        let d0 = a.distance_to(&b);
        let d1 = t.transform_point(&a).distance_to(&t.transform_point(&b));
        prop_assert!((d0 - d1).abs() < TOL * 10.0, "distance changed: {} -> {}", d0, d1);
    }
}

// ---------------------------------------------------------------------------
// 4. Frame round trip
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn frame_local_world_round_trip(
        (px, py, pz) in arb_point(),
        (ox, oy, oz) in arb_point(),
        angle in arb_angle(),
    ) {
        let rot = Transform::rotation_axis_angle(Vec3::new(0.3, -1.0, 0.5), angle).unwrap();
        let frame = Frame::from_xy(
            Point3d::new(ox, oy, oz),
            rot.transform_vector(&Vec3::X),
            rot.transform_vector(&Vec3::Y),
        ).unwrap();
        let p = Point3d::new(px, py, pz);
        let back = frame.to_world(&frame.to_local(&p));
        prop_assert!(p.distance_to(&back) < TOL);
    }
}

// ---------------------------------------------------------------------------
// 5. Rectangle radius of gyration matches the closed form
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rectangle_radius_of_gyration(
        w in arb_positive_dim(),
        h in arb_positive_dim(),
        (ox, oy, oz) in arb_point(),
    ) {
        let o = Point3d::new(ox, oy, oz);
        let pts = [
            o,
            o + Vec3::new(w, 0.0, 0.0),
            o + Vec3::new(w, 0.0, h),
            o + Vec3::new(0.0, 0.0, h),
        ];
        let props = polygon_properties(&pts, Vec3::Y).unwrap();
        let expected = ((w * w + h * h) / 12.0).sqrt();
        prop_assert!((props.area - w * h).abs() < 1e-6 * w * h);
        prop_assert!((props.radius_of_gyration() - expected).abs() < 1e-6 * expected,
            "rog {} != {}", props.radius_of_gyration(), expected);
    }
}

// ---------------------------------------------------------------------------
// 6. BoundingBox of its own corners is itself
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn bounding_box_corners_round_trip(
        (ox, oy, oz) in arb_point(),
        dx in arb_positive_dim(),
        dy in arb_positive_dim(),
        dz in arb_positive_dim(),
    ) {
        let bb = BoundingBox::new(Point3d::new(ox, oy, oz), Point3d::new(ox + dx, oy + dy, oz + dz));
        prop_assert_eq!(BoundingBox::from_points(&bb.corners()), bb);
    }
}
