//! Collaborators supplied by the host engine.
//!
//! Instances are handles: the host owns the underlying scene object and keeps
//! it alive until [`SpawnService::despawn`] is called. Dropping a handle for a
//! placed building must not remove it from the world.

use palisade_catalog::BuildingTemplate;
use palisade_geom::{GroundPoint, Pose, Ray, Vec3};

use crate::feedback::{FeedbackRenderer, RenderHandle};

/// Overlap test against buildings and obstacles already in the world.
pub trait CollisionProbe {
    fn is_colliding(&self) -> bool;
}

/// Terrain check under the footprint.
pub trait HeightProbe {
    /// Ground under the footprint is even enough to build on.
    fn can_place(&self) -> bool;
    /// Vertical offset the building should sit at.
    fn optimal_height(&self) -> f64;
}

pub trait BuildingInstance {
    fn set_pose(&mut self, pose: Pose);

    /// Every placeable template must expose one; selection fails otherwise.
    fn collision_probe(&self) -> Option<&dyn CollisionProbe>;

    /// Optional: templates without terrain constraints carry none.
    fn height_probe(&self) -> Option<&dyn HeightProbe>;

    /// Renderers whose materials show the allowed/blocked tint.
    fn render_targets(&self) -> Vec<RenderHandle>;

    fn set_probes_enabled(&mut self, enabled: bool);

    /// Flag the instance as a finished, static building.
    fn mark_placed(&mut self);
}

pub trait GroundProjector {
    /// Ground hit under the cursor ray; `None` when the ray misses this tick.
    fn project(&self, ray: &Ray) -> Option<GroundPoint>;
}

pub trait SpawnService {
    type Instance: BuildingInstance;

    /// Translucent candidate that follows the cursor.
    fn spawn_preview(&mut self, template: &BuildingTemplate) -> Self::Instance;

    fn instantiate(
        &mut self,
        template: &BuildingTemplate,
        position: Vec3,
        yaw_deg: f64,
    ) -> Self::Instance;

    fn despawn(&mut self, instance: Self::Instance);
}

/// Everything a session needs from the host for one tick.
pub trait PlacementHost: GroundProjector + SpawnService + FeedbackRenderer {}

impl<T> PlacementHost for T where T: GroundProjector + SpawnService + FeedbackRenderer {}
