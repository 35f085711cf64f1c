pub mod resources;
pub mod tolerance;
pub mod units;

pub use resources::*;
pub use tolerance::*;
pub use units::*;
