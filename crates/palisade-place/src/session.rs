//! The placement state machine.
//!
//! A session is either idle or previewing exactly one template. Each call to
//! [`PlacementSession::update`] runs one tick to completion:
//!
//! 1. project the cursor and snap the candidate (wall locks applied),
//! 2. resolve the vertical offset from the height probe,
//! 3. step the wall axis lock from the modifier keys,
//! 4. evaluate validity and push the tint to the renderers,
//! 5. commit according to the template category,
//! 6. rotate, then poll cancel,
//! 7. advance every debounce timer.
//!
//! Gates compare against ticks elapsed before the current one, so with a
//! 120-tick placement delay and the button held from the first tick, standard
//! buildings are committed on ticks 120, 240, ...

use std::mem;

use palisade_catalog::{BuildingCatalog, BuildingTemplate, Category, TemplateId};
use palisade_geom::{GroundPoint, Pose, TileSize, Vec3};

use crate::axis_lock::AxisLock;
use crate::config::PlacementSettings;
use crate::error::PlacementError;
use crate::feedback::{self, RenderHandle};
use crate::host::{BuildingInstance, PlacementHost};
use crate::input::InputSnapshot;
use crate::snap::snap_locked;
use crate::timers::DebounceTimers;
use crate::validity;

/// Record of one commit. The spawned object itself belongs to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBuilding {
    pub template: TemplateId,
    pub position: Vec3,
    pub yaw_deg: f64,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Validity of the candidate this tick; false while idle.
    pub valid: bool,
    pub placed: Option<PlacedBuilding>,
    pub rotated: bool,
    pub cancelled: bool,
    /// The session went idle during this tick (cancel or unique commit).
    pub ended: bool,
}

struct ActivePlacement<I> {
    template: BuildingTemplate,
    tile: TileSize,
    preview: I,
    render_targets: Vec<RenderHandle>,
    pose: Pose,
    axis_lock: AxisLock,
    valid: bool,
    timers: DebounceTimers,
    last_chain_commit: Option<GroundPoint>,
}

enum SessionState<I> {
    Idle,
    Active(ActivePlacement<I>),
}

pub struct PlacementSession<I> {
    catalog: BuildingCatalog,
    settings: PlacementSettings,
    state: SessionState<I>,
    tick: u64,
}

impl<I: BuildingInstance> PlacementSession<I> {
    pub fn new(catalog: BuildingCatalog, settings: PlacementSettings) -> Self {
        log::info!(
            target: "placement",
            "placement ready: {} template(s), tile {}",
            catalog.len(),
            settings.tile_size.get()
        );
        Self {
            catalog,
            settings,
            state: SessionState::Idle,
            tick: 0,
        }
    }

    #[inline]
    pub fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    #[inline]
    pub fn settings(&self) -> &PlacementSettings {
        &self.settings
    }

    /// Number of `update` calls so far, across selections.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn has_active_selection(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    fn active(&self) -> Option<&ActivePlacement<I>> {
        match &self.state {
            SessionState::Active(a) => Some(a),
            SessionState::Idle => None,
        }
    }

    pub fn active_template(&self) -> Option<&BuildingTemplate> {
        self.active().map(|a| &a.template)
    }

    pub fn candidate_pose(&self) -> Option<Pose> {
        self.active().map(|a| a.pose)
    }

    /// Current wall lock; always `AxisLock::None` for non-wall templates.
    pub fn axis_lock(&self) -> Option<AxisLock> {
        self.active().map(|a| a.axis_lock)
    }

    pub fn timers(&self) -> Option<&DebounceTimers> {
        self.active().map(|a| &a.timers)
    }

    /// Grid step in effect for the active template.
    pub fn tile_size(&self) -> Option<TileSize> {
        self.active().map(|a| a.tile)
    }

    /// Validity computed on the last tick (false until the first tick runs).
    pub fn is_valid(&self) -> bool {
        self.active().is_some_and(|a| a.valid)
    }

    /// Start previewing `id`, replacing whatever was selected before.
    pub fn select_template<H>(
        &mut self,
        id: &TemplateId,
        host: &mut H,
    ) -> Result<(), PlacementError>
    where
        H: PlacementHost<Instance = I>,
    {
        let template = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| PlacementError::UnknownTemplate(id.clone()))?;
        self.begin(template, host)
    }

    /// Select by catalog position (build menu button order).
    pub fn select_index<H>(&mut self, index: usize, host: &mut H) -> Result<(), PlacementError>
    where
        H: PlacementHost<Instance = I>,
    {
        let template = self
            .catalog
            .get_index(index)
            .cloned()
            .ok_or(PlacementError::UnknownIndex(index))?;
        self.begin(template, host)
    }

    fn begin<H>(&mut self, template: BuildingTemplate, host: &mut H) -> Result<(), PlacementError>
    where
        H: PlacementHost<Instance = I>,
    {
        if self.clear(host) {
            log::debug!(
                target: "placement",
                "[tick {}] previous selection discarded",
                self.tick
            );
        }

        let mut preview = host.spawn_preview(&template);
        if preview.collision_probe().is_none() {
            host.despawn(preview);
            log::warn!(
                target: "placement",
                "[tick {}] '{}' has no collision probe; selection refused",
                self.tick,
                template.id
            );
            return Err(PlacementError::MissingCollisionProbe(template.id));
        }
        preview.set_probes_enabled(true);
        let render_targets = preview.render_targets();
        let tile = template.effective_tile_size(self.settings.tile_size);

        log::info!(
            target: "placement",
            "[tick {}] selected '{}' ({:?}) tile={} targets={} height_probe={}",
            self.tick,
            template.id,
            template.category,
            tile.get(),
            render_targets.len(),
            preview.height_probe().is_some()
        );

        self.state = SessionState::Active(ActivePlacement {
            template,
            tile,
            preview,
            render_targets,
            pose: Pose::default(),
            axis_lock: AxisLock::None,
            valid: false,
            timers: DebounceTimers::from_settings(&self.settings),
            last_chain_commit: None,
        });
        Ok(())
    }

    /// Drop the selection right away. Returns false when already idle.
    pub fn cancel<H>(&mut self, host: &mut H) -> bool
    where
        H: PlacementHost<Instance = I>,
    {
        let had = self.clear(host);
        if had {
            log::info!(target: "placement", "[tick {}] selection cancelled", self.tick);
        }
        had
    }

    fn clear<H>(&mut self, host: &mut H) -> bool
    where
        H: PlacementHost<Instance = I>,
    {
        match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Active(active) => {
                host.despawn(active.preview);
                true
            }
            SessionState::Idle => false,
        }
    }

    /// Run one tick. Idle sessions only count the tick.
    pub fn update<H>(&mut self, input: &InputSnapshot, host: &mut H) -> TickReport
    where
        H: PlacementHost<Instance = I>,
    {
        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);

        let report = match &mut self.state {
            SessionState::Active(active) => active.step(input, host, &self.settings, tick),
            SessionState::Idle => return TickReport::default(),
        };
        if report.ended {
            self.clear(host);
            if report.cancelled {
                log::info!(target: "placement", "[tick {}] selection cancelled", tick);
            }
        }
        report
    }
}

impl<I: BuildingInstance> ActivePlacement<I> {
    fn step<H>(
        &mut self,
        input: &InputSnapshot,
        host: &mut H,
        settings: &PlacementSettings,
        tick: u64,
    ) -> TickReport
    where
        H: PlacementHost<Instance = I>,
    {
        let mut report = TickReport::default();
        let chain = self.template.is_chain_wall();

        if let Some(hit) = host.project(&input.cursor) {
            let lock = if chain { self.axis_lock } else { AxisLock::None };
            let g = snap_locked(hit, self.tile, lock);
            self.pose.pos.x = g.x;
            self.pose.pos.z = g.z;
            self.preview.set_pose(self.pose);
        }
        if let Some(y) = self.preview.height_probe().map(|h| h.optimal_height()) {
            if y != self.pose.pos.y {
                self.pose.pos.y = y;
                self.preview.set_pose(self.pose);
            }
        }

        if chain {
            let next = self
                .axis_lock
                .step(input.lock_x, input.lock_z, self.pose.pos.ground());
            if next != self.axis_lock {
                log::debug!(target: "placement", "[tick {}] axis lock {:?}", tick, next);
                self.axis_lock = next;
            }
        }

        // Selection guarantees a collision probe; a vanished one blocks placement.
        let colliding = self
            .preview
            .collision_probe()
            .is_none_or(|c| c.is_colliding());
        let height_ok = self.preview.height_probe().map(|h| h.can_place());
        self.valid = validity::evaluate(colliding, height_ok);
        report.valid = self.valid;
        feedback::apply(self.valid, &self.render_targets, host);

        if input.primary && self.valid {
            match self.template.category {
                Category::Standard => {
                    if self.timers.placement.ready() {
                        report.placed = Some(self.commit(host, tick));
                        self.timers.placement.reset();
                    }
                }
                Category::Unique => {
                    report.placed = Some(self.commit(host, tick));
                    report.ended = true;
                }
                Category::ChainWall => {
                    if self.chain_spacing_ok(settings) {
                        let placed = self.commit(host, tick);
                        self.last_chain_commit = Some(placed.position.ground());
                        report.placed = Some(placed);
                    }
                }
            }
        }

        if !report.ended
            && (input.rotate_left || input.rotate_right)
            && self.timers.rotation.ready()
        {
            let delta = if input.rotate_left { -90.0 } else { 90.0 };
            self.pose = self.pose.rotated(delta);
            self.preview.set_pose(self.pose);
            self.timers.rotation.reset();
            report.rotated = true;
            log::debug!(target: "placement", "[tick {}] yaw -> {}", tick, self.pose.yaw_deg);
        }

        if !report.ended && input.cancel && self.timers.cancel.ready() {
            self.timers.cancel.reset();
            report.cancelled = true;
            report.ended = true;
        }

        self.timers.advance_all();
        report
    }

    fn chain_spacing_ok(&self, settings: &PlacementSettings) -> bool {
        match (settings.chain_min_spacing, self.last_chain_commit) {
            (Some(min), Some(last)) => {
                self.axis_lock.constrain(self.pose.pos.ground()).distance(last) >= min
            }
            _ => true,
        }
    }

    fn commit<H>(&self, host: &mut H, tick: u64) -> PlacedBuilding
    where
        H: PlacementHost<Instance = I>,
    {
        let ground = if self.template.is_chain_wall() {
            self.axis_lock.constrain(self.pose.pos.ground())
        } else {
            self.pose.pos.ground()
        };
        let y = self
            .preview
            .height_probe()
            .map_or(self.pose.pos.y, |h| h.optimal_height());
        let position = ground.with_height(y);

        let mut instance = host.instantiate(&self.template, position, self.pose.yaw_deg);
        instance.set_probes_enabled(false);
        instance.mark_placed();

        log::info!(
            target: "placement",
            "[tick {}] placed '{}' at ({:.2}, {:.2}, {:.2}) yaw={}",
            tick,
            self.template.id,
            position.x,
            position.y,
            position.z,
            self.pose.yaw_deg
        );
        PlacedBuilding {
            template: self.template.id.clone(),
            position,
            yaw_deg: self.pose.yaw_deg,
        }
    }
}
