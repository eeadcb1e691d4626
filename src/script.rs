//! Scripted input for the headless driver.
//!
//! ```toml
//! eye_height = 30.0
//!
//! [world]
//! obstacles = [{ min = [4.0, 4.0], max = [6.0, 6.0] }]
//!
//! [[steps]]
//! select = "house"
//!
//! [[steps]]
//! ticks = 121
//! cursor = [1.2, 3.4]
//! keys = ["primary"]
//! ```

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use palisade_geom::{GroundPoint, Ray, Vec3};
use palisade_place::InputSnapshot;
use serde::Deserialize;

use crate::sim::TerrainDef;

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Primary,
    Cancel,
    RotateLeft,
    RotateRight,
    LockX,
    LockZ,
}

/// One `[[steps]]` entry as written. Exactly one of `select`,
/// `select_index`, `cancel` or `ticks` must be given.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StepDef {
    pub select: Option<String>,
    pub select_index: Option<usize>,
    pub cancel: bool,
    pub ticks: Option<u32>,
    pub cursor: Option<[f64; 2]>,
    /// Drag target: the cursor moves linearly from `cursor` to `to`.
    pub to: Option<[f64; 2]>,
    pub keys: Vec<Key>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Select(String),
    SelectIndex(usize),
    Cancel,
    Hold {
        ticks: u32,
        from: GroundPoint,
        to: GroundPoint,
        keys: Vec<Key>,
    },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScriptDef {
    /// Camera height above each cursor point; rays are cast straight down.
    pub eye_height: f64,
    /// Optional fixed camera position; rays go from here through the cursor point.
    pub camera: Option<[f64; 3]>,
    pub world: TerrainDef,
    pub steps: Vec<StepDef>,
}

impl Default for ScriptDef {
    fn default() -> Self {
        Self {
            eye_height: 30.0,
            camera: None,
            world: TerrainDef::default(),
            steps: Vec::new(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ScriptError {
    AmbiguousStep(usize),
    EmptyStep(usize),
    MissingCursor(usize),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::AmbiguousStep(i) => {
                write!(f, "script step {}: give only one of select, select_index, cancel, ticks", i)
            }
            ScriptError::EmptyStep(i) => write!(f, "script step {}: nothing to do", i),
            ScriptError::MissingCursor(i) => write!(f, "script step {}: ticks need a cursor", i),
        }
    }
}

impl Error for ScriptError {}

/// A validated script.
#[derive(Clone, Debug, PartialEq)]
pub struct Script {
    pub eye_height: f64,
    pub camera: Option<Vec3>,
    pub world: TerrainDef,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let def: ScriptDef = toml::from_str(toml_str)?;
        Ok(Self::from_def(def)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_def(def: ScriptDef) -> Result<Self, ScriptError> {
        let steps = def
            .steps
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.resolve(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            eye_height: def.eye_height,
            camera: def.camera.map(|[x, y, z]| Vec3::new(x, y, z)),
            world: def.world,
            steps,
        })
    }

    /// Cursor ray aimed at ground point `p` (at height zero).
    pub fn ray_to(&self, p: GroundPoint) -> Ray {
        match self.camera {
            Some(eye) => Ray::new(eye, p.with_height(0.0) - eye),
            None => Ray::looking_down_at(p, self.eye_height),
        }
    }

    /// Total ticks the script will run.
    pub fn duration(&self) -> u64 {
        self.steps
            .iter()
            .map(|s| match s {
                Step::Hold { ticks, .. } => u64::from(*ticks),
                _ => 0,
            })
            .sum()
    }
}

impl StepDef {
    fn resolve(self, index: usize) -> Result<Step, ScriptError> {
        let actions = usize::from(self.select.is_some())
            + usize::from(self.select_index.is_some())
            + usize::from(self.cancel)
            + usize::from(self.ticks.is_some());
        if actions > 1 {
            return Err(ScriptError::AmbiguousStep(index));
        }
        if let Some(id) = self.select {
            return Ok(Step::Select(id));
        }
        if let Some(i) = self.select_index {
            return Ok(Step::SelectIndex(i));
        }
        if self.cancel {
            return Ok(Step::Cancel);
        }
        let Some(ticks) = self.ticks else {
            return Err(ScriptError::EmptyStep(index));
        };
        let [x, z] = self.cursor.ok_or(ScriptError::MissingCursor(index))?;
        let from = GroundPoint::new(x, z);
        let to = self.to.map_or(from, |[x, z]| GroundPoint::new(x, z));
        Ok(Step::Hold {
            ticks,
            from,
            to,
            keys: self.keys,
        })
    }
}

/// Cursor position on frame `i` of a `ticks`-long hold.
pub fn lerp_cursor(from: GroundPoint, to: GroundPoint, i: u32, ticks: u32) -> GroundPoint {
    if ticks <= 1 {
        return from;
    }
    let (i, n) = (f64::from(i), f64::from(ticks - 1));
    GroundPoint::new(
        from.x + (to.x - from.x) * i / n,
        from.z + (to.z - from.z) * i / n,
    )
}

/// Input for one frame with the given keys held.
pub fn snapshot(cursor: Ray, keys: &[Key]) -> InputSnapshot {
    let mut input = InputSnapshot::idle(cursor);
    for key in keys {
        match key {
            Key::Primary => input.primary = true,
            Key::Cancel => input.cancel = true,
            Key::RotateLeft => input.rotate_left = true,
            Key::RotateRight => input.rotate_right = true,
            Key::LockX => input.lock_x = true,
            Key::LockZ => input.lock_z = true,
        }
    }
    input
}
