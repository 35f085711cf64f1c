//! End-to-end selection over configurations computed with the mock kernel.

use approx::assert_abs_diff_eq;
use cam_geom::{Point3d, Transform, Vec3};
use clamping::{
    enumerate_configurations, AnalysisTarget, ClampingConfiguration, ClampingFaceRef,
    FeatureComputer, MachinabilitySplit, MachinableFeature,
};
use part_kernel::{BodyId, MockKernel, PartIntrospect};
use ranking::{CompileError, ExclusionReason};
use setup_selection::{
    fits, names, violations, SelectionConfig, SelectionError, SetupCandidate, SetupSelector,
};
use setup_types::{LengthUnit, Machine, Resource, Stock, Tolerance};

fn block() -> (MockKernel, BodyId) {
    let mut kernel = MockKernel::new();
    let part = kernel.add_part(LengthUnit::Millimeter);
    let body = kernel
        .add_box(part, Point3d::ORIGIN, Point3d::new(60.0, 40.0, 20.0))
        .unwrap();
    (kernel, body)
}

fn top_feature(kernel: &MockKernel, body: BodyId) -> MachinableFeature {
    MachinableFeature::new(1, "top pocket", vec![kernel.find_face(body, Vec3::Z).unwrap()])
}

fn all_setups(kernel: &MockKernel, body: BodyId) -> Vec<SetupCandidate> {
    let computer = FeatureComputer::new(kernel).with_tolerance(Tolerance::new(1e-6));
    enumerate_configurations(&computer, body, &[top_feature(kernel, body)])
        .unwrap()
        .into_iter()
        .map(SetupCandidate::new)
        .collect()
}

/// Clamped on the faces along `axis`, standing on the bottom face.
fn upright(kernel: &MockKernel, body: BodyId, axis: Vec3) -> ClampingConfiguration {
    let computer = FeatureComputer::new(kernel).with_tolerance(Tolerance::new(1e-6));
    let split = MachinabilitySplit::new(vec![top_feature(kernel, body)], Vec::new());
    computer
        .compute(
            AnalysisTarget::Body(body),
            ClampingFaceRef::Face(kernel.find_face(body, -axis).unwrap()),
            ClampingFaceRef::Face(kernel.find_face(body, axis).unwrap()),
            kernel
                .face_plane(kernel.find_face(body, -Vec3::Z).unwrap())
                .unwrap(),
            &split,
        )
        .unwrap()
}

fn mill(max_vise_opening: f64) -> Machine {
    Machine {
        name: "mill".into(),
        materials: vec!["6061".into()],
        max_part_dimension: 400.0,
        min_part_dimension: 1.0,
        max_vise_opening,
        max_part_weight: 25.0,
    }
}

#[test]
fn default_config_ranks_every_reachable_setup() {
    let (kernel, body) = block();
    let setups = all_setups(&kernel, body);
    assert_eq!(setups.len(), 12);

    let selector = SetupSelector::new(SelectionConfig::default()).unwrap();
    let selection = selector.select(&setups, &[]).unwrap();

    // Standing on the top face leaves the only feature unreachable.
    assert_eq!(selection.ranking.excluded.len(), 2);
    for exclusion in &selection.ranking.excluded {
        assert_eq!(
            exclusion.reason,
            ExclusionReason::NonFiniteFeature {
                feature: names::LEVER_ARM_RATIO.to_string(),
                value: f64::INFINITY,
            }
        );
        let bottom = setups[exclusion.index].configuration.bottom_plane().normal;
        assert!(bottom.is_codirectional(&Vec3::Z, 1e-9));
    }
    assert!(selection.infeasible.is_empty());
    assert_eq!(
        selection.duplicates.len() + selection.ranking.len() + selection.ranking.excluded.len(),
        setups.len()
    );

    let scores = selection.ranking.scores();
    assert!(scores.windows(2).all(|w| w[0] >= w[1] - 1e-6));
}

#[test]
fn tallest_grip_wins_with_thickness_tie_break() {
    let (kernel, body) = block();
    let setups = all_setups(&kernel, body);
    let config = SelectionConfig {
        formula: "ClampingHeight".into(),
        normalize: false,
        tie_breakers: vec![names::CLAMPING_THICKNESS.into()],
        tolerance: Some(1e-6),
    };
    let selector = SetupSelector::new(config).unwrap();
    let selection = selector.select(&setups, &[]).unwrap();

    let best = selection.best().unwrap();
    assert_abs_diff_eq!(best.configuration.clamping_height(), 60.0, epsilon = 1e-9);
    assert_abs_diff_eq!(best.configuration.clamping_thickness(), 40.0, epsilon = 1e-9);
}

#[test]
fn duplicates_and_infeasible_candidates_are_reported() {
    let (kernel, body) = block();
    let on_y = upright(&kernel, body, Vec3::Y);
    let on_x = upright(&kernel, body, Vec3::X);
    let setups = vec![
        SetupCandidate::new(on_y.clone()).with_material("6061"),
        SetupCandidate::new(on_y).with_material("6061"),
        SetupCandidate::new(on_x).with_material("6061"),
    ];

    let selector = SetupSelector::new(SelectionConfig::default()).unwrap();
    let selection = selector
        .select(&setups, &[Resource::Machine(mill(50.0))])
        .unwrap();

    assert_eq!(selection.duplicates, vec![1]);
    assert_eq!(selection.infeasible, vec![2]);
    assert_eq!(selection.ranking.indices(), vec![0]);
}

#[test]
fn stock_of_the_wrong_material_rejects_everything() {
    let (kernel, body) = block();
    let setups = vec![
        SetupCandidate::new(upright(&kernel, body, Vec3::Y))
            .with_material("1018")
            .with_mass_kg(0.38),
    ];
    let stock = Stock {
        name: "plate".into(),
        material: "6061".into(),
        dimensions: [70.0, 50.0, 25.0],
    };

    let selector = SetupSelector::new(SelectionConfig::default()).unwrap();
    let selection = selector
        .select(&setups, &[Resource::Stock(stock), Resource::Machine(mill(150.0))])
        .unwrap();
    assert_eq!(selection.infeasible, vec![0]);
    assert!(selection.best().is_none());
}

#[test]
fn plain_configurations_can_be_selected() {
    let (kernel, body) = block();
    let configs = vec![
        upright(&kernel, body, Vec3::X),
        upright(&kernel, body, Vec3::Y),
    ];
    let selector =
        SetupSelector::<ClampingConfiguration>::from_json(r#"{"formula":"-ClampingThickness"}"#)
            .unwrap();
    let selection = selector.select(&configs, &[]).unwrap();
    assert_eq!(selection.ranking.indices(), vec![1, 0]);
}

#[test]
fn configuration_errors_surface_at_construction() {
    let unknown_feature = SelectionConfig {
        formula: "LeverArm * 2".into(),
        ..SelectionConfig::default()
    };
    assert!(matches!(
        SetupSelector::<SetupCandidate>::new(unknown_feature),
        Err(SelectionError::Compile(CompileError::UnresolvedIdentifier { .. }))
    ));

    let unknown_key = SelectionConfig {
        tie_breakers: vec!["Stiffness".into()],
        ..SelectionConfig::default()
    };
    assert!(matches!(
        SetupSelector::<SetupCandidate>::new(unknown_key),
        Err(SelectionError::Compile(CompileError::UnknownTieBreaker { .. }))
    ));
}

#[test]
fn limits_met_exactly_in_assembly_inches_are_feasible() {
    // 2 x 1 x 0.5 in, modeled in millimeters and placed in an inch assembly.
    let mut kernel = MockKernel::new();
    let part = kernel.add_part(LengthUnit::Millimeter);
    let prototype = kernel
        .add_box(part, Point3d::ORIGIN, Point3d::new(50.8, 25.4, 12.7))
        .unwrap();
    let assembly = kernel.add_part(LengthUnit::Inch);
    let body = kernel
        .add_occurrence(assembly, prototype, Transform::identity())
        .unwrap();

    let setup = SetupCandidate::new(upright(&kernel, body, Vec3::Y));
    let reference = setup.configuration.reference();
    assert_abs_diff_eq!(reference.clamping_thickness, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(reference.extents[0], 2.0, epsilon = 1e-9);

    let machine = Resource::Machine(Machine {
        name: "bench mill".into(),
        materials: Vec::new(),
        max_part_dimension: 2.0,
        min_part_dimension: 0.5,
        max_vise_opening: 1.0,
        max_part_weight: 100.0,
    });
    assert!(
        violations(&setup, &machine, Tolerance::new(1e-6)).is_empty(),
        "{:?}",
        violations(&setup, &machine, Tolerance::new(1e-6))
    );
    assert!(fits(&setup, &machine));

    let selector = SetupSelector::new(SelectionConfig {
        tolerance: Some(1e-6),
        ..SelectionConfig::default()
    })
    .unwrap();
    let setups = [setup];
    let selection = selector.select(&setups, &[machine]).unwrap();
    assert!(selection.infeasible.is_empty());
    assert_eq!(selection.ranking.len(), 1);
}
