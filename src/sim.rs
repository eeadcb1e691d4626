//! Headless world used by the replay driver.
//!
//! Terrain is a base plane plus raised rectangular plateaus. Every spawned
//! building (preview or placed) is a body with a footprint rectangle; the
//! world owns the bodies and instances only hold ids into it.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use palisade_catalog::{BuildingTemplate, TemplateId};
use palisade_geom::{GroundPoint, Pose, Ray, Vec3};
use palisade_place::{
    Appearance, BuildingInstance, CollisionProbe, FeedbackRenderer, GroundProjector, HeightProbe,
    RenderHandle, SpawnService,
};
use serde::Deserialize;

/// Max corner height spread a footprint may straddle and still be buildable.
const LEVEL_TOLERANCE: f64 = 0.05;

/// Axis-aligned rectangle on the ground plane.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Rect {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Rect {
    pub fn centered(center: GroundPoint, half_x: f64, half_z: f64) -> Self {
        Self {
            min: [center.x - half_x, center.z - half_z],
            max: [center.x + half_x, center.z + half_z],
        }
    }

    pub fn contains(&self, p: GroundPoint) -> bool {
        p.x >= self.min[0] && p.x <= self.max[0] && p.z >= self.min[1] && p.z <= self.max[1]
    }

    /// Interiors intersect; shared edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min[0] < other.max[0]
            && other.min[0] < self.max[0]
            && self.min[1] < other.max[1]
            && other.min[1] < self.max[1]
    }

    pub fn corners(&self) -> [GroundPoint; 4] {
        [
            GroundPoint::new(self.min[0], self.min[1]),
            GroundPoint::new(self.max[0], self.min[1]),
            GroundPoint::new(self.min[0], self.max[1]),
            GroundPoint::new(self.max[0], self.max[1]),
        ]
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Plateau {
    #[serde(flatten)]
    pub area: Rect,
    pub height: f64,
}

/// Terrain and static obstacles, as written in a script's `[world]` table.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainDef {
    pub base_height: f64,
    /// Rays longer than this miss the ground.
    pub max_ray: f64,
    pub plateaus: Vec<Plateau>,
    pub obstacles: Vec<Rect>,
}

impl Default for TerrainDef {
    fn default() -> Self {
        Self {
            base_height: 0.0,
            max_ray: 1000.0,
            plateaus: Vec::new(),
            obstacles: Vec::new(),
        }
    }
}

impl TerrainDef {
    /// Surface height at `p`: the highest plateau covering it, else the base.
    pub fn height_at(&self, p: GroundPoint) -> f64 {
        self.plateaus
            .iter()
            .filter(|pl| pl.area.contains(p))
            .map(|pl| pl.height)
            .fold(self.base_height, f64::max)
    }

    /// First surface the ray reaches: plateau tops from highest down, then the base plane.
    pub fn raycast(&self, ray: &Ray) -> Option<GroundPoint> {
        let mut tops: Vec<&Plateau> = self.plateaus.iter().collect();
        tops.sort_by(|a, b| b.height.total_cmp(&a.height));
        for pl in tops {
            if let Some(hit) = ray.intersect_plane_y(pl.height, self.max_ray) {
                if pl.area.contains(hit) {
                    return Some(hit);
                }
            }
        }
        ray.intersect_plane_y(self.base_height, self.max_ray)
    }
}

#[derive(Clone, Debug)]
struct Body {
    template: TemplateId,
    width: f64,
    length: f64,
    pose: Pose,
    probes_enabled: bool,
    placed: bool,
}

impl Body {
    /// Footprint rectangle; quarter turns swap width and length.
    fn rect(&self) -> Rect {
        let quarter = (self.pose.yaw_deg / 90.0).round() as i64;
        let (w, l) = if quarter % 2 == 0 {
            (self.width, self.length)
        } else {
            (self.length, self.width)
        };
        Rect::centered(self.pose.pos.ground(), w * 0.5, l * 0.5)
    }
}

#[derive(Default)]
struct WorldState {
    terrain: TerrainDef,
    bodies: HashMap<u64, Body>,
}

impl WorldState {
    fn body(&self, id: u64) -> Option<&Body> {
        self.bodies.get(&id)
    }

    fn is_colliding(&self, id: u64) -> bool {
        let Some(me) = self.body(id) else {
            return false;
        };
        if !me.probes_enabled {
            return false;
        }
        let r = me.rect();
        self.terrain.obstacles.iter().any(|o| o.overlaps(&r))
            || self
                .bodies
                .iter()
                .any(|(&other, b)| other != id && b.placed && b.rect().overlaps(&r))
    }

    fn corner_heights(&self, id: u64) -> Option<(f64, f64)> {
        let me = self.body(id)?;
        let hs = me.rect().corners().map(|c| self.terrain.height_at(c));
        let lo = hs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = hs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    }
}

/// Handle to a body in a [`SimWorld`].
pub struct SimInstance {
    id: u64,
    has_collision: bool,
    has_height: bool,
    world: Rc<RefCell<WorldState>>,
}

impl SimInstance {
    fn with_body(&self, f: impl FnOnce(&mut Body)) {
        if let Some(b) = self.world.borrow_mut().bodies.get_mut(&self.id) {
            f(b);
        }
    }
}

impl CollisionProbe for SimInstance {
    fn is_colliding(&self) -> bool {
        self.world.borrow().is_colliding(self.id)
    }
}

impl HeightProbe for SimInstance {
    fn can_place(&self) -> bool {
        self.world
            .borrow()
            .corner_heights(self.id)
            .is_some_and(|(lo, hi)| hi - lo <= LEVEL_TOLERANCE)
    }

    fn optimal_height(&self) -> f64 {
        let w = self.world.borrow();
        w.corner_heights(self.id)
            .map_or(w.terrain.base_height, |(_, hi)| hi)
    }
}

impl BuildingInstance for SimInstance {
    fn set_pose(&mut self, pose: Pose) {
        self.with_body(|b| b.pose = pose);
    }

    fn collision_probe(&self) -> Option<&dyn CollisionProbe> {
        if self.has_collision {
            Some(self as &dyn CollisionProbe)
        } else {
            None
        }
    }

    fn height_probe(&self) -> Option<&dyn HeightProbe> {
        if self.has_height {
            Some(self as &dyn HeightProbe)
        } else {
            None
        }
    }

    fn render_targets(&self) -> Vec<RenderHandle> {
        vec![RenderHandle(self.id)]
    }

    fn set_probes_enabled(&mut self, enabled: bool) {
        self.with_body(|b| b.probes_enabled = enabled);
    }

    fn mark_placed(&mut self) {
        self.with_body(|b| b.placed = true);
    }
}

pub struct SimWorld {
    state: Rc<RefCell<WorldState>>,
    next_id: u64,
    appearance: HashMap<RenderHandle, Appearance>,
}

impl SimWorld {
    pub fn new(terrain: TerrainDef) -> Self {
        log::info!(
            target: "sim",
            "world: base={} plateaus={} obstacles={}",
            terrain.base_height,
            terrain.plateaus.len(),
            terrain.obstacles.len()
        );
        Self {
            state: Rc::new(RefCell::new(WorldState {
                terrain,
                bodies: HashMap::new(),
            })),
            next_id: 1,
            appearance: HashMap::new(),
        }
    }

    fn spawn(&mut self, template: &BuildingTemplate, pose: Pose) -> SimInstance {
        let id = self.next_id;
        self.next_id += 1;
        self.state.borrow_mut().bodies.insert(
            id,
            Body {
                template: template.id.clone(),
                width: template.footprint.width,
                length: template.footprint.length,
                pose,
                probes_enabled: false,
                placed: false,
            },
        );
        SimInstance {
            id,
            has_collision: template.footprint.collision_probe,
            has_height: template.footprint.height_probe,
            world: Rc::clone(&self.state),
        }
    }

    /// Placed buildings ordered by spawn.
    pub fn placed(&self) -> Vec<(u64, TemplateId, Pose)> {
        let st = self.state.borrow();
        let mut out: Vec<_> = st
            .bodies
            .iter()
            .filter(|(_, b)| b.placed)
            .map(|(&id, b)| (id, b.template.clone(), b.pose))
            .collect();
        out.sort_by_key(|(id, _, _)| *id);
        out
    }

    /// Bodies that are not placed buildings (live previews).
    pub fn preview_count(&self) -> usize {
        self.state
            .borrow()
            .bodies
            .values()
            .filter(|b| !b.placed)
            .count()
    }

    #[cfg(test)]
    pub fn appearance(&self, handle: RenderHandle) -> Option<Appearance> {
        self.appearance.get(&handle).copied()
    }
}

impl GroundProjector for SimWorld {
    fn project(&self, ray: &Ray) -> Option<GroundPoint> {
        self.state.borrow().terrain.raycast(ray)
    }
}

impl SpawnService for SimWorld {
    type Instance = SimInstance;

    fn spawn_preview(&mut self, template: &BuildingTemplate) -> SimInstance {
        log::debug!(target: "sim", "spawn preview '{}'", template.id);
        self.spawn(template, Pose::default())
    }

    fn instantiate(
        &mut self,
        template: &BuildingTemplate,
        position: Vec3,
        yaw_deg: f64,
    ) -> SimInstance {
        let mut inst = self.spawn(template, Pose::new(position, yaw_deg));
        inst.set_probes_enabled(true);
        inst
    }

    fn despawn(&mut self, instance: SimInstance) {
        self.state.borrow_mut().bodies.remove(&instance.id);
        self.appearance.remove(&RenderHandle(instance.id));
        log::debug!(target: "sim", "despawn body {}", instance.id);
    }
}

impl FeedbackRenderer for SimWorld {
    fn set_appearance(&mut self, target: RenderHandle, appearance: Appearance) -> bool {
        if !self.state.borrow().bodies.contains_key(&target.0) {
            return false;
        }
        self.appearance.insert(target, appearance);
        true
    }
}
