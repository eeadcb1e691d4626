//! Straight-line helper for chain walls: holding a modifier pins one axis.

use palisade_geom::GroundPoint;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AxisLock {
    #[default]
    None,
    /// X is pinned to the captured value; Z follows the cursor.
    LockedOnX(f64),
    /// Z is pinned to the captured value; X follows the cursor.
    LockedOnZ(f64),
}

impl AxisLock {
    /// Next lock state from the held modifiers.
    ///
    /// Hold-X is checked first, so holding both keys locks X. A lock that is
    /// already engaged on the requested axis keeps its captured value; the
    /// value comes from `candidate` only at the instant of engagement.
    pub fn step(self, hold_x: bool, hold_z: bool, candidate: GroundPoint) -> AxisLock {
        if hold_x {
            match self {
                AxisLock::LockedOnX(_) => self,
                AxisLock::None | AxisLock::LockedOnZ(_) => AxisLock::LockedOnX(candidate.x),
            }
        } else if hold_z {
            match self {
                AxisLock::LockedOnZ(_) => self,
                AxisLock::None | AxisLock::LockedOnX(_) => AxisLock::LockedOnZ(candidate.z),
            }
        } else {
            AxisLock::None
        }
    }

    #[inline]
    pub fn constrain(self, p: GroundPoint) -> GroundPoint {
        match self {
            AxisLock::None => p,
            AxisLock::LockedOnX(x) => GroundPoint::new(x, p.z),
            AxisLock::LockedOnZ(z) => GroundPoint::new(p.x, z),
        }
    }
}
