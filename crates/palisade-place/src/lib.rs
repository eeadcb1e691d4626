//! Placement session: grid snapping, wall axis locks, debounce timers,
//! validity, and the commit/cancel state machine.
#![forbid(unsafe_code)]

pub mod axis_lock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod host;
pub mod input;
pub mod session;
pub mod snap;
pub mod timers;
pub mod validity;

#[cfg(test)]
mod tests;

pub use axis_lock::AxisLock;
pub use config::{PlacementConfig, PlacementSettings};
pub use error::{ConfigError, PlacementError};
pub use feedback::{Appearance, FeedbackRenderer, RenderHandle};
pub use host::{
    BuildingInstance, CollisionProbe, GroundProjector, HeightProbe, PlacementHost, SpawnService,
};
pub use input::InputSnapshot;
pub use session::{PlacedBuilding, PlacementSession, TickReport};
pub use timers::{DebounceTimer, DebounceTimers};
