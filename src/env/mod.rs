/// Five-minute step clock and episode length.
pub mod clock;
/// Battery parameters and the decimal charge/rate transition.
pub mod battery;
pub mod engine;
pub mod precision;
pub mod reward;
pub mod space;
pub mod summary;
pub mod types;

pub use engine::{BatteryEnv, EnvConfig, Spaces};
pub use types::{Action, EpisodeStatus, Observation, StepInfo, StepOutcome};
