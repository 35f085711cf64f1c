use cam_geom::Point3d;
use part_kernel::PartIntrospect;

use crate::compute::local_box;
use crate::configuration::ClampingConfiguration;
use crate::error::ClampingError;

/// Re-center the clamping frame on the target.
///
/// The target's box is taken in the current frame; the origin moves to the
/// box center along X and Y while its Z (up) coordinate is kept. Returns a
/// new configuration with reference values re-derived; `config` is untouched.
pub fn center_csys<K: PartIntrospect + ?Sized>(
    kernel: &K,
    config: &ClampingConfiguration,
) -> Result<ClampingConfiguration, ClampingError> {
    let frame = config.frame();
    let local = local_box(kernel, config.target(), frame)?;
    let center = local.center();
    let origin = frame.to_world(&Point3d::new(center.x, center.y, 0.0));
    config.with_frame(frame.with_origin(origin), local.extents())
}
