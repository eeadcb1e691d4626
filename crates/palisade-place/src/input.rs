use palisade_geom::Ray;

/// Keys and cursor sampled once per tick by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSnapshot {
    pub cursor: Ray,
    pub primary: bool,
    pub cancel: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub lock_x: bool,
    pub lock_z: bool,
}

impl InputSnapshot {
    /// Cursor only, nothing held.
    pub fn idle(cursor: Ray) -> Self {
        Self {
            cursor,
            primary: false,
            cancel: false,
            rotate_left: false,
            rotate_right: false,
            lock_x: false,
            lock_z: false,
        }
    }
}
