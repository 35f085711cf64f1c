//! SetupBench: fluent API for scripting clamping-selection scenarios in tests.
//!
//! Parts, bodies and features are addressed by name. Every step is recorded
//! in a history so failing scenarios can be replayed by reading it.

use std::collections::HashMap;

use cam_geom::{Point3d, Transform, Vec3};
use clamping::{
    classify_machinability, enumerate_configurations, AnalysisTarget, ClampingConfiguration,
    ClampingFaceRef, ClampingScalars, FeatureComputer, FeatureId, MachinableFeature,
};
use part_kernel::{BodyId, MockKernel, PartId, PartIntrospect};
use serde::Serialize;
use setup_selection::{SelectionConfig, SetupCandidate, SetupSelector};
use setup_types::{LengthUnit, Resource, Tolerance};

use crate::helpers::HarnessError;

/// A named-entity workspace over [`MockKernel`].
pub struct SetupBench {
    kernel: MockKernel,
    parts: HashMap<String, PartId>,
    bodies: HashMap<String, BodyId>,
    features: HashMap<String, Vec<MachinableFeature>>,
    next_feature_id: u64,
    tolerance: Tolerance,
    history: Vec<(String, String)>,
}

/// Owned summary of one selection run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub body: String,
    pub candidates: usize,
    pub ranked: Vec<RankedSetup>,
    pub excluded: Vec<usize>,
    pub duplicates: Vec<usize>,
    pub infeasible: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedSetup {
    pub index: usize,
    pub score: f64,
    pub reference: ClampingScalars,
    pub fully_machinable: Vec<FeatureId>,
}

impl BenchReport {
    pub fn best(&self) -> Option<&RankedSetup> {
        self.ranked.first()
    }

    pub fn to_json(&self) -> Result<String, HarnessError> {
        serde_json::to_string_pretty(self).map_err(|e| HarnessError::AssertionFailed {
            detail: format!("report serialization: {e}"),
        })
    }
}

impl Default for SetupBench {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupBench {
    pub fn new() -> Self {
        Self {
            kernel: MockKernel::new(),
            parts: HashMap::new(),
            bodies: HashMap::new(),
            features: HashMap::new(),
            next_feature_id: 1,
            tolerance: Tolerance::new(1e-6),
            history: Vec::new(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    // ── Parts and Bodies ────────────────────────────────────────────────

    pub fn part(&mut self, name: &str, unit: LengthUnit) -> Result<&mut Self, HarnessError> {
        if self.parts.contains_key(name) {
            return Err(HarnessError::DuplicateName {
                name: name.to_string(),
            });
        }
        let id = self.kernel.add_part(unit);
        self.parts.insert(name.to_string(), id);
        self.history.push(("Part".into(), format!("{name} in {unit:?}")));
        Ok(self)
    }

    /// Axis-aligned box body in part `part`.
    pub fn block(
        &mut self,
        name: &str,
        part: &str,
        min: Point3d,
        max: Point3d,
    ) -> Result<&mut Self, HarnessError> {
        self.check_name_available(name)?;
        let part_id = self.part_id(part)?;
        let body = self.kernel.add_box(part_id, min, max)?;
        self.register_body(name, body, format!("box {min:?}..{max:?}"));
        Ok(self)
    }

    /// XY profile extruded along +Z.
    pub fn prism(
        &mut self,
        name: &str,
        part: &str,
        profile: &[(f64, f64)],
        height: f64,
    ) -> Result<&mut Self, HarnessError> {
        self.check_name_available(name)?;
        let part_id = self.part_id(part)?;
        let body = self.kernel.add_prism(part_id, profile, 0.0, height)?;
        self.register_body(name, body, format!("prism of {} points", profile.len()));
        Ok(self)
    }

    /// Place the body `prototype` into the assembly part `owner`.
    pub fn occurrence(
        &mut self,
        name: &str,
        owner: &str,
        prototype: &str,
        placement: Transform,
    ) -> Result<&mut Self, HarnessError> {
        self.check_name_available(name)?;
        let owner_id = self.part_id(owner)?;
        let prototype_id = self.body(prototype)?;
        let body = self.kernel.add_occurrence(owner_id, prototype_id, placement)?;
        self.register_body(name, body, format!("occurrence of {prototype} in {owner}"));
        Ok(self)
    }

    // ── Features ────────────────────────────────────────────────────────

    /// A single-face machinable feature on the face of `body` facing `direction`.
    pub fn feature(
        &mut self,
        body: &str,
        name: &str,
        direction: Vec3,
    ) -> Result<FeatureId, HarnessError> {
        let body_id = self.body(body)?;
        let feature = crate::helpers::face_feature(
            &self.kernel,
            body_id,
            self.next_feature_id,
            name,
            direction,
        )?;
        self.next_feature_id += 1;
        let id = feature.id;
        self.features.entry(body.to_string()).or_default().push(feature);
        self.history.push(("Feature".into(), format!("{name} on {body}")));
        Ok(id)
    }

    pub fn features_of(&self, body: &str) -> &[MachinableFeature] {
        self.features.get(body).map(Vec::as_slice).unwrap_or(&[])
    }

    // ── Computation ─────────────────────────────────────────────────────

    /// Clamp `body` on the faces facing `-jaw` and `+jaw`, standing on the
    /// face facing `bottom`.
    pub fn clamp(
        &mut self,
        body: &str,
        jaw: Vec3,
        bottom: Vec3,
    ) -> Result<ClampingConfiguration, HarnessError> {
        let body_id = self.body(body)?;
        let face = |direction: Vec3| {
            self.kernel
                .find_face(body_id, direction)
                .ok_or_else(|| HarnessError::NotFound {
                    name: format!("face of {body} facing {direction:?}"),
                })
        };
        let first = face(-jaw)?;
        let second = face(jaw)?;
        let bottom_plane = self.kernel.face_plane(face(bottom)?)?;

        let split = classify_machinability(
            &self.kernel,
            self.features_of(body),
            -bottom_plane.normal,
            self.tolerance,
        )?;
        let config = self.computer().compute(
            AnalysisTarget::Body(body_id),
            ClampingFaceRef::Face(first),
            ClampingFaceRef::Face(second),
            bottom_plane,
            &split,
        )?;
        self.history
            .push(("Clamp".into(), format!("{body} jaw {jaw:?} bottom {bottom:?}")));
        Ok(config)
    }

    /// Every opposing-face configuration of `body`.
    pub fn configurations(&mut self, body: &str) -> Result<Vec<ClampingConfiguration>, HarnessError> {
        let body_id = self.body(body)?;
        let configs = enumerate_configurations(&self.computer(), body_id, self.features_of(body))?;
        self.history
            .push(("Enumerate".into(), format!("{body}: {} configurations", configs.len())));
        Ok(configs)
    }

    /// Enumerate, deduplicate, filter and rank the setups of `body`.
    pub fn select(
        &mut self,
        body: &str,
        config: SelectionConfig,
        resources: &[Resource],
    ) -> Result<BenchReport, HarnessError> {
        let candidates: Vec<SetupCandidate> = self
            .configurations(body)?
            .into_iter()
            .map(SetupCandidate::new)
            .collect();
        let selector = SetupSelector::new(config)?;
        let selection = selector.select(&candidates, resources)?;

        let report = BenchReport {
            body: body.to_string(),
            candidates: candidates.len(),
            ranked: selection
                .ranking
                .iter()
                .map(|c| RankedSetup {
                    index: c.index,
                    score: c.score,
                    reference: *c.candidate.configuration.reference(),
                    fully_machinable: c.candidate.configuration.fully_machinable_ids(),
                })
                .collect(),
            excluded: selection.ranking.excluded.iter().map(|e| e.index).collect(),
            duplicates: selection.duplicates.clone(),
            infeasible: selection.infeasible.clone(),
        };
        self.history.push((
            "Select".into(),
            format!("{body}: {} ranked of {}", report.ranked.len(), report.candidates),
        ));
        Ok(report)
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn kernel(&self) -> &MockKernel {
        &self.kernel
    }

    pub fn computer(&self) -> FeatureComputer<'_, MockKernel> {
        FeatureComputer::new(&self.kernel).with_tolerance(self.tolerance)
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn body(&self, name: &str) -> Result<BodyId, HarnessError> {
        self.bodies
            .get(name)
            .copied()
            .ok_or_else(|| HarnessError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn part_id(&self, name: &str) -> Result<PartId, HarnessError> {
        self.parts
            .get(name)
            .copied()
            .ok_or_else(|| HarnessError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    // ── Internal ────────────────────────────────────────────────────────

    fn register_body(&mut self, name: &str, body: BodyId, detail: String) {
        self.bodies.insert(name.to_string(), body);
        self.history.push(("Body".into(), format!("{name}: {detail}")));
    }

    fn check_name_available(&self, name: &str) -> Result<(), HarnessError> {
        if self.bodies.contains_key(name) {
            Err(HarnessError::DuplicateName {
                name: name.to_string(),
            })
        } else {
            Ok(())
        }
    }
}
