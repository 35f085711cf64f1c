//! Geometric feature computation for vise clamping configurations.
//!
//! Given a body (or a bare bounding box), a pair of opposing clamping faces
//! and a bottom plane, [`FeatureComputer`] derives the scalars used to rank
//! setups: clamping thickness and height, lever-arm ratio, gravity-center
//! height and clamping extents, each with a reference variant expressed in
//! the owning assembly when the body is an occurrence.

pub mod candidates;
pub mod compute;
pub mod configuration;
pub mod equivalence;
pub mod error;
pub mod machinability;
pub mod recenter;
pub mod reference;
pub mod types;

pub use candidates::{enumerate_configurations, opposing_face_pairs, FacePairCandidate};
pub use compute::FeatureComputer;
pub use configuration::{ClampingConfiguration, ClampingScalars};
pub use equivalence::{are_equivalent, common_machinable_features, dedup_equivalent};
pub use error::ClampingError;
pub use machinability::{classify_machinability, MachinabilitySplit};
pub use recenter::center_csys;
pub use reference::ReferenceContext;
pub use types::{AnalysisTarget, BoxSide, ClampingFaceRef, FeatureId, MachinableFeature};
