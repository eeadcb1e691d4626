//! Minimal geometry types shared by the placement crates (no engine dependency).
#![forbid(unsafe_code)]

use core::fmt;
use core::ops::{Add, Div, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }

    /// Projection onto the horizontal plane.
    #[inline]
    pub const fn ground(self) -> GroundPoint {
        GroundPoint {
            x: self.x,
            z: self.z,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// A point on the ground plane (world X/Z).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroundPoint {
    pub x: f64,
    pub z: f64,
}

impl GroundPoint {
    #[inline]
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    #[inline]
    pub const fn with_height(self, y: f64) -> Vec3 {
        Vec3::new(self.x, y, self.z)
    }

    #[inline]
    pub fn distance(self, other: GroundPoint) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalized(),
        }
    }

    /// Straight-down ray through a ground point; handy for hosts without a camera.
    #[inline]
    pub fn looking_down_at(p: GroundPoint, eye_height: f64) -> Self {
        Self::new(p.with_height(eye_height), Vec3::new(0.0, -1.0, 0.0))
    }

    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Hit point on the horizontal plane `y = height`, if the ray reaches it within `max_dist`.
    pub fn intersect_plane_y(&self, height: f64, max_dist: f64) -> Option<GroundPoint> {
        if self.dir.y.abs() < 1e-9 {
            return None;
        }
        let t = (height - self.origin.y) / self.dir.y;
        if t < 0.0 || t > max_dist {
            return None;
        }
        Some(self.at(t).ground())
    }
}

/// Position plus rotation about the vertical axis, in degrees within [0, 360).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub pos: Vec3,
    pub yaw_deg: f64,
}

impl Pose {
    #[inline]
    pub fn new(pos: Vec3, yaw_deg: f64) -> Self {
        let mut yaw = yaw_deg.rem_euclid(360.0);
        // rem_euclid can round tiny negatives up to exactly 360.
        if yaw >= 360.0 {
            yaw = 0.0;
        }
        Self { pos, yaw_deg: yaw }
    }

    #[inline]
    pub fn rotated(self, delta_deg: f64) -> Self {
        Self::new(self.pos, self.yaw_deg + delta_deg)
    }
}

/// Grid step on the ground plane. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct TileSize(f64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidTileSize(pub f64);

impl fmt::Display for InvalidTileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile size must be finite and > 0 (got {})", self.0)
    }
}

impl std::error::Error for InvalidTileSize {}

impl TileSize {
    /// Half-unit grid used when nothing else is configured.
    pub const DEFAULT: TileSize = TileSize(0.5);

    pub fn new(size: f64) -> Result<Self, InvalidTileSize> {
        if size.is_finite() && size > 0.0 {
            Ok(Self(size))
        } else {
            Err(InvalidTileSize(size))
        }
    }

    #[inline]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for TileSize {
    type Error = InvalidTileSize;
    fn try_from(v: f64) -> Result<Self, Self::Error> {
        TileSize::new(v)
    }
}
