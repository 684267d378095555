//! Game state: physics and pipes ([`GameSimulation`]) driven by the
//! per-frame phase machine ([`PhaseMachine`]).

pub mod obstacles;
pub mod phase;
pub mod simulation;

pub use obstacles::{Obstacle, ObstacleField};
pub use phase::{FrameInput, GamePhase, PhaseMachine, StepEvents};
pub use simulation::{Bird, GameSimulation, TickOutcome};
