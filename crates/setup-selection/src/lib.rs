//! Picks the best clamping setup: deduplicate equivalent configurations,
//! drop those no machine or stock can take, and rank the rest with a
//! configurable formula over the standard clamping features.

pub mod clamping_features;
pub mod config;
pub mod error;
pub mod feasibility;
pub mod selector;

pub use clamping_features::{clamping_feature_set, names, HasClamping, SetupCandidate};
pub use config::{SelectionConfig, DEFAULT_FORMULA};
pub use error::SelectionError;
pub use feasibility::{fits, fits_with, violations, Violation, Workpiece};
pub use selector::{Selection, SetupSelector};
