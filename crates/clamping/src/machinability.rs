use cam_geom::Vec3;
use part_kernel::PartIntrospect;
use serde::{Deserialize, Serialize};
use setup_types::Tolerance;
use tracing::debug;

use crate::error::ClampingError;
use crate::types::{FeatureId, MachinableFeature};

/// Features reachable from one clamping orientation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachinabilitySplit {
    /// Every face reachable from above.
    pub fully: Vec<MachinableFeature>,
    /// Some, but not all, faces reachable.
    pub partially: Vec<MachinableFeature>,
}

impl MachinabilitySplit {
    pub fn new(fully: Vec<MachinableFeature>, partially: Vec<MachinableFeature>) -> Self {
        Self { fully, partially }
    }

    pub fn fully_ids(&self) -> Vec<FeatureId> {
        self.fully.iter().map(|f| f.id).collect()
    }

    pub fn partially_ids(&self) -> Vec<FeatureId> {
        self.partially.iter().map(|f| f.id).collect()
    }
}

/// Split `features` by how many of their faces a tool coming down along
/// `-up` can reach. A face is reachable when its outward normal has no
/// component pointing down (beyond tolerance).
pub fn classify_machinability<K: PartIntrospect + ?Sized>(
    kernel: &K,
    features: &[MachinableFeature],
    up: Vec3,
    tolerance: Tolerance,
) -> Result<MachinabilitySplit, ClampingError> {
    let up = up.normalized().ok_or_else(|| ClampingError::DegenerateFaces {
        reason: "tool axis has zero length".to_string(),
    })?;

    let mut split = MachinabilitySplit::default();
    for feature in features {
        let mut reachable = 0;
        for face in &feature.faces {
            let plane = kernel.face_plane(*face)?;
            if plane.normal.dot(&up) >= -tolerance.epsilon {
                reachable += 1;
            }
        }
        if reachable == 0 {
            debug!(feature = feature.name.as_str(), "feature not machinable from this side");
        } else if reachable == feature.faces.len() {
            split.fully.push(feature.clone());
        } else {
            split.partially.push(feature.clone());
        }
    }
    Ok(split)
}
