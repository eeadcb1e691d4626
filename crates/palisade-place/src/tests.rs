use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use palisade_catalog::{BuildingCatalog, BuildingTemplate, TemplateId};
use palisade_geom::{GroundPoint, Pose, Ray, Vec3};

use crate::*;

const CATALOG: &str = r#"
    [[buildings]]
    id = "house"
    footprint = { asset = "house", width = 2.0, length = 2.0 }

    [[buildings]]
    id = "townhall"
    category = "unique"
    footprint = { asset = "townhall", width = 4.0, length = 4.0 }

    [[buildings]]
    id = "wall"
    category = "chain_wall"
    footprint = { asset = "wood_wall", width = 0.5, length = 1.5, height_probe = false }

    [[buildings]]
    id = "shed"
    footprint = { asset = "shed", collision_probe = false }
"#;

#[derive(Default)]
struct InstanceState {
    pose: Pose,
    probes_enabled: bool,
    placed: bool,
}

#[derive(Default)]
struct Shared {
    colliding: bool,
    blocked_terrain: bool,
    height: f64,
    instances: HashMap<u64, InstanceState>,
}

struct FakeInstance {
    id: u64,
    has_collision: bool,
    has_height: bool,
    shared: Rc<RefCell<Shared>>,
}

impl CollisionProbe for FakeInstance {
    fn is_colliding(&self) -> bool {
        self.shared.borrow().colliding
    }
}

impl HeightProbe for FakeInstance {
    fn can_place(&self) -> bool {
        !self.shared.borrow().blocked_terrain
    }
    fn optimal_height(&self) -> f64 {
        self.shared.borrow().height
    }
}

impl BuildingInstance for FakeInstance {
    fn set_pose(&mut self, pose: Pose) {
        self.shared
            .borrow_mut()
            .instances
            .entry(self.id)
            .or_default()
            .pose = pose;
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
        vec![RenderHandle(self.id * 10), RenderHandle(self.id * 10 + 1)]
    }
    fn set_probes_enabled(&mut self, enabled: bool) {
        self.shared
            .borrow_mut()
            .instances
            .entry(self.id)
            .or_default()
            .probes_enabled = enabled;
    }
    fn mark_placed(&mut self) {
        self.shared
            .borrow_mut()
            .instances
            .entry(self.id)
            .or_default()
            .placed = true;
    }
}

struct FakeHost {
    shared: Rc<RefCell<Shared>>,
    ground: Option<GroundPoint>,
    next_id: u64,
    live_previews: HashSet<u64>,
    placed_ids: Vec<u64>,
    appearance: HashMap<RenderHandle, Appearance>,
}

impl FakeHost {
    fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared::default())),
            ground: Some(GroundPoint::new(1.3, 2.7)),
            next_id: 1,
            live_previews: HashSet::new(),
            placed_ids: Vec::new(),
            appearance: HashMap::new(),
        }
    }

    fn make(&mut self, template: &BuildingTemplate) -> FakeInstance {
        let id = self.next_id;
        self.next_id += 1;
        FakeInstance {
            id,
            has_collision: template.footprint.collision_probe,
            has_height: template.footprint.height_probe,
            shared: Rc::clone(&self.shared),
        }
    }

    fn instance_state<T>(&self, id: u64, f: impl FnOnce(&InstanceState) -> T) -> T {
        f(&self.shared.borrow().instances[&id])
    }
}

impl GroundProjector for FakeHost {
    fn project(&self, _ray: &Ray) -> Option<GroundPoint> {
        self.ground
    }
}

impl SpawnService for FakeHost {
    type Instance = FakeInstance;

    fn spawn_preview(&mut self, template: &BuildingTemplate) -> FakeInstance {
        let inst = self.make(template);
        self.live_previews.insert(inst.id);
        inst
    }

    fn instantiate(
        &mut self,
        template: &BuildingTemplate,
        position: Vec3,
        yaw_deg: f64,
    ) -> FakeInstance {
        let mut inst = self.make(template);
        inst.set_pose(Pose::new(position, yaw_deg));
        inst.set_probes_enabled(true);
        self.placed_ids.push(inst.id);
        inst
    }

    fn despawn(&mut self, instance: FakeInstance) {
        assert!(self.live_previews.remove(&instance.id), "despawned unknown preview");
    }
}

impl FeedbackRenderer for FakeHost {
    fn set_appearance(&mut self, target: RenderHandle, appearance: Appearance) -> bool {
        self.appearance.insert(target, appearance);
        true
    }
}

fn session_with(settings: PlacementSettings) -> PlacementSession<FakeInstance> {
    let catalog = BuildingCatalog::from_toml_str(CATALOG).expect("catalog");
    PlacementSession::new(catalog, settings)
}

fn session() -> PlacementSession<FakeInstance> {
    session_with(PlacementSettings::default())
}

fn cursor() -> Ray {
    // The fake projector ignores the ray.
    Ray::looking_down_at(GroundPoint::default(), 10.0)
}

fn held_primary() -> InputSnapshot {
    InputSnapshot {
        primary: true,
        ..InputSnapshot::idle(cursor())
    }
}

fn run(
    s: &mut PlacementSession<FakeInstance>,
    host: &mut FakeHost,
    ticks: u32,
    input: InputSnapshot,
) -> Vec<(u32, TickReport)> {
    (0..ticks)
        .map(|t| (t, s.update(&input, host)))
        .filter(|(_, r)| r.placed.is_some() || r.cancelled || r.rotated)
        .collect()
}

fn id(s: &str) -> TemplateId {
    TemplateId::from(s)
}

#[test]
fn standard_commits_on_the_placement_cadence() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();

    let events = run(&mut s, &mut host, 241, held_primary());
    let ticks: Vec<u32> = events.iter().map(|(t, _)| *t).collect();
    assert_eq!(ticks, vec![120, 240]);
    assert!(s.has_active_selection());
    assert_eq!(host.placed_ids.len(), 2);
}

#[test]
fn standard_hold_for_121_ticks_commits_once() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();
    let events = run(&mut s, &mut host, 121, held_primary());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, 120);
}

#[test]
fn standard_end_to_end_from_selection() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();

    for _ in 0..5 {
        let r = s.update(&held_primary(), &mut host);
        assert!(r.valid);
        assert!(r.placed.is_none());
    }
    assert_eq!(
        s.candidate_pose().map(|p| p.pos.ground()),
        Some(GroundPoint::new(1.0, 2.5))
    );

    let rest = run(&mut s, &mut host, 116, held_primary());
    assert_eq!(rest.len(), 1);
    let placed = rest[0].1.placed.clone().unwrap();
    // 5 ticks above plus index 115 here is tick 120 overall.
    assert_eq!(rest[0].0, 115);
    assert_eq!(placed.template, id("house"));
    assert_eq!(placed.position, Vec3::new(1.0, 0.0, 2.5));
    assert!(s.has_active_selection());
}

#[test]
fn unique_commits_once_per_selection() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("townhall"), &mut host).unwrap();

    let first = s.update(&held_primary(), &mut host);
    assert!(first.placed.is_some());
    assert!(first.ended);
    assert!(!s.has_active_selection());
    assert!(host.live_previews.is_empty());

    assert!(run(&mut s, &mut host, 300, held_primary()).is_empty());
    assert_eq!(host.placed_ids.len(), 1);

    s.select_template(&id("townhall"), &mut host).unwrap();
    assert!(s.update(&held_primary(), &mut host).placed.is_some());
    assert_eq!(host.placed_ids.len(), 2);
}

#[test]
fn held_cancel_ends_session_once_at_threshold() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();

    let hold_cancel = InputSnapshot {
        cancel: true,
        ..InputSnapshot::idle(cursor())
    };
    let events = run(&mut s, &mut host, 200, hold_cancel);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, 60);
    assert!(events[0].1.ended);
    assert!(!s.has_active_selection());
    assert!(host.live_previews.is_empty());

    // Idle updates do nothing.
    assert_eq!(s.update(&held_primary(), &mut host), TickReport::default());
}

#[test]
fn chain_wall_commits_every_valid_tick_by_default() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("wall"), &mut host).unwrap();
    let events = run(&mut s, &mut host, 5, held_primary());
    assert_eq!(events.len(), 5);
    // Snapped by segment length, not the default tile.
    let placed = events[0].1.placed.clone().unwrap();
    assert_eq!(placed.position.ground(), GroundPoint::new(0.0, 1.5));
}

#[test]
fn chain_spacing_guard_suppresses_stacked_segments() {
    let mut host = FakeHost::new();
    let mut s = session_with(PlacementSettings {
        chain_min_spacing: Some(1.0),
        ..Default::default()
    });
    s.select_template(&id("wall"), &mut host).unwrap();

    assert_eq!(run(&mut s, &mut host, 5, held_primary()).len(), 1);

    // Dragging along X lays one segment per new cell.
    let mut placed = Vec::new();
    for step in 0..12 {
        host.ground = Some(GroundPoint::new(0.5 * f64::from(step), 2.0));
        if let Some(p) = s.update(&held_primary(), &mut host).placed {
            placed.push(p.position.x);
        }
    }
    assert_eq!(placed, vec![1.5, 3.0, 4.5]);
}

#[test]
fn axis_lock_captures_at_engagement() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("wall"), &mut host).unwrap();
    let at = |x: f64, z: f64, lock_x: bool, lock_z: bool| {
        (
            GroundPoint::new(x, z),
            InputSnapshot {
                lock_x,
                lock_z,
                ..InputSnapshot::idle(cursor())
            },
        )
    };
    let mut step =
        |s: &mut PlacementSession<FakeInstance>, (g, input): (GroundPoint, InputSnapshot)| {
            host.ground = Some(g);
            s.update(&input, &mut host);
            (s.axis_lock().unwrap(), s.candidate_pose().unwrap().pos.ground())
        };

    assert_eq!(
        step(&mut s, at(3.2, 1.1, true, false)),
        (AxisLock::LockedOnX(3.0), GroundPoint::new(3.0, 0.0))
    );
    // X stays frozen while Z tracks the cursor.
    assert_eq!(
        step(&mut s, at(7.9, 4.0, true, false)),
        (AxisLock::LockedOnX(3.0), GroundPoint::new(3.0, 3.0))
    );
    assert_eq!(step(&mut s, at(7.9, 4.0, false, false)).0, AxisLock::None);
    assert_eq!(
        step(&mut s, at(7.9, 6.2, false, true)),
        (AxisLock::LockedOnZ(6.0), GroundPoint::new(7.5, 6.0))
    );
    assert_eq!(
        step(&mut s, at(1.0, 10.0, false, true)),
        (AxisLock::LockedOnZ(6.0), GroundPoint::new(0.0, 6.0))
    );
    assert_eq!(
        step(&mut s, at(4.6, 10.0, true, true)),
        (AxisLock::LockedOnX(4.5), GroundPoint::new(4.5, 6.0))
    );
}

#[test]
fn axis_lock_keys_ignored_for_other_categories() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();
    let input = InputSnapshot {
        lock_x: true,
        ..InputSnapshot::idle(cursor())
    };
    s.update(&input, &mut host);
    host.ground = Some(GroundPoint::new(9.1, 9.1));
    s.update(&input, &mut host);
    assert_eq!(s.axis_lock(), Some(AxisLock::None));
    assert_eq!(
        s.candidate_pose().unwrap().pos.ground(),
        GroundPoint::new(9.0, 9.0)
    );
}

#[test]
fn collision_and_terrain_block_commits_and_tint() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("townhall"), &mut host).unwrap();

    host.shared.borrow_mut().colliding = true;
    let r = s.update(&held_primary(), &mut host);
    assert!(!r.valid && r.placed.is_none());
    assert!(host.appearance.values().all(|a| *a == Appearance::Blocked));
    assert_eq!(host.appearance.len(), 2);

    host.shared.borrow_mut().colliding = false;
    host.shared.borrow_mut().blocked_terrain = true;
    assert!(s.update(&held_primary(), &mut host).placed.is_none());
    assert!(!s.is_valid());

    host.shared.borrow_mut().blocked_terrain = false;
    assert!(s.update(&InputSnapshot::idle(cursor()), &mut host).valid);
    assert!(host.appearance.values().all(|a| *a == Appearance::Allowed));
}

#[test]
fn missing_height_probe_does_not_constrain() {
    let mut host = FakeHost::new();
    let mut s = session();
    host.shared.borrow_mut().blocked_terrain = true;
    s.select_template(&id("wall"), &mut host).unwrap();
    assert!(s.update(&held_primary(), &mut host).placed.is_some());
}

#[test]
fn missing_collision_probe_refuses_selection() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();
    let err = s.select_template(&id("shed"), &mut host).unwrap_err();
    assert_eq!(err, PlacementError::MissingCollisionProbe(id("shed")));
    assert!(!s.has_active_selection());
    assert!(host.live_previews.is_empty());
}

#[test]
fn unknown_template_leaves_selection_alone() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();
    assert_eq!(
        s.select_template(&id("castle"), &mut host),
        Err(PlacementError::UnknownTemplate(id("castle")))
    );
    assert_eq!(s.select_index(9, &mut host), Err(PlacementError::UnknownIndex(9)));
    assert_eq!(s.active_template().map(|t| t.id.clone()), Some(id("house")));
}

#[test]
fn reselect_replaces_session_and_resets_timers() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();
    run(&mut s, &mut host, 100, InputSnapshot::idle(cursor()));
    assert_eq!(s.timers().unwrap().placement.elapsed(), 100);

    s.select_index(0, &mut host).unwrap();
    assert_eq!(host.live_previews.len(), 1);
    assert_eq!(s.timers().unwrap().placement.elapsed(), 0);
    // Fresh cooldown: nothing for another 120 ticks.
    let events = run(&mut s, &mut host, 121, held_primary());
    assert_eq!(events.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec![120]);
}

#[test]
fn cancel_is_a_no_op_when_idle() {
    let mut host = FakeHost::new();
    let mut s = session();
    assert!(!s.cancel(&mut host));
    s.select_template(&id("house"), &mut host).unwrap();
    assert!(s.cancel(&mut host));
    assert!(!s.has_active_selection());
    assert!(host.live_previews.is_empty());
    assert!(!s.cancel(&mut host));
}

#[test]
fn lost_ground_hit_keeps_last_pose() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();
    s.update(&InputSnapshot::idle(cursor()), &mut host);
    let before = s.candidate_pose();
    host.ground = None;
    s.update(&InputSnapshot::idle(cursor()), &mut host);
    assert_eq!(s.candidate_pose(), before);
}

#[test]
fn rotation_follows_its_own_cooldown() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();
    let left = InputSnapshot {
        rotate_left: true,
        ..InputSnapshot::idle(cursor())
    };
    let events = run(&mut s, &mut host, 121, left);
    assert_eq!(events.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec![60, 120]);
    assert_eq!(s.candidate_pose().unwrap().yaw_deg, 180.0);

    let both = InputSnapshot {
        rotate_left: true,
        rotate_right: true,
        ..InputSnapshot::idle(cursor())
    };
    run(&mut s, &mut host, 60, both);
    assert_eq!(s.candidate_pose().unwrap().yaw_deg, 90.0);

    let right = InputSnapshot {
        rotate_right: true,
        ..InputSnapshot::idle(cursor())
    };
    run(&mut s, &mut host, 60, right);
    assert_eq!(s.candidate_pose().unwrap().yaw_deg, 180.0);
}

#[test]
fn commit_uses_height_probe_and_finalizes_instance() {
    let mut host = FakeHost::new();
    let mut s = session();
    host.shared.borrow_mut().height = 2.25;
    s.select_template(&id("townhall"), &mut host).unwrap();

    let r = s.update(&held_primary(), &mut host);
    let placed = r.placed.unwrap();
    assert_eq!(placed.position, Vec3::new(1.0, 2.25, 2.5));
    assert_eq!(placed.yaw_deg, 0.0);

    let pid = host.placed_ids[0];
    assert!(host.instance_state(pid, |st| st.placed));
    assert!(!host.instance_state(pid, |st| st.probes_enabled));
    assert_eq!(host.instance_state(pid, |st| st.pose.pos), placed.position);
}

#[test]
fn preview_follows_cursor_with_probes_enabled() {
    let mut host = FakeHost::new();
    let mut s = session();
    s.select_template(&id("house"), &mut host).unwrap();
    host.ground = Some(GroundPoint::new(-0.2, 5.9));
    s.update(&InputSnapshot::idle(cursor()), &mut host);

    let preview = *host.live_previews.iter().next().unwrap();
    assert!(host.instance_state(preview, |st| st.probes_enabled));
    assert!(!host.instance_state(preview, |st| st.placed));
    assert_eq!(
        host.instance_state(preview, |st| st.pose.pos.ground()),
        GroundPoint::new(-0.5, 5.5)
    );
}
