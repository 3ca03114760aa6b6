//! Data types shared by the parser, the engine and the query layer.

pub mod device;
pub mod ids;
pub mod step;

pub use device::*;
pub use ids::EngineId;
pub use step::*;

/// Maximum number of steps a script may populate.
pub const MAX_STEPS: usize = 200;

/// Nominal frames per second the default step spacing is expressed in.
pub const NOMINAL_FPS: u64 = 60;
