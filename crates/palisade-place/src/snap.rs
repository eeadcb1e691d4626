//! Grid snapping on the ground plane.

use palisade_geom::{GroundPoint, TileSize};

use crate::axis_lock::AxisLock;

/// Index of the grid cell holding `v`: the whole `k` with `k*t <= v < (k+1)*t`.
///
/// `v / t` can land a hair below an integer when `t` has no exact binary
/// form (0.3, 0.7, ...), so the quotient is checked against the same
/// products [`snap_axis`] returns. That makes snapped values fixed points.
#[inline]
pub fn cell_index(v: f64, tile: TileSize) -> f64 {
    let t = tile.get();
    let k = (v / t).floor();
    if k * t > v {
        k - 1.0
    } else if (k + 1.0) * t <= v {
        k + 1.0
    } else {
        k
    }
}

/// Floor a single coordinate onto the grid.
#[inline]
pub fn snap_axis(v: f64, tile: TileSize) -> f64 {
    cell_index(v, tile) * tile.get()
}

/// Cell corner containing `p`: `(floor(x/t)*t, floor(z/t)*t)`.
#[inline]
pub fn snap(p: GroundPoint, tile: TileSize) -> GroundPoint {
    GroundPoint::new(snap_axis(p.x, tile), snap_axis(p.z, tile))
}

/// Snap with a wall lock applied: the locked axis keeps its captured value,
/// the free axis follows the grid.
#[inline]
pub fn snap_locked(p: GroundPoint, tile: TileSize, lock: AxisLock) -> GroundPoint {
    lock.constrain(snap(p, tile))
}
