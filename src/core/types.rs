//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for agents, allocated monotonically by the ecosystem.
///
/// Ids are never reused: a dead agent keeps its id through respawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// 3D position/direction vector (x, y horizontal; z is elevation)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Horizontal (xy-plane) magnitude
    pub fn length_xy(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: &Self) -> f32 {
        (*other - *self).length()
    }

    /// Horizontal distance, ignoring elevation
    pub fn distance_xy(&self, other: &Self) -> f32 {
        (*other - *self).length_xy()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 1.0e-4 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            Self::default()
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

/// Playable area: horizontal rectangle plus elevation range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Bounds {
    /// Center of the horizontal rectangle, at the given elevation
    pub fn center(&self, z: f32) -> Vec3 {
        Vec3::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
            z,
        )
    }

    pub fn contains_xy(&self, p: &Vec3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Clamp a point's horizontal components into the rectangle
    pub fn clamp_xy(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
            p.z,
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        // Default sandbox extents, replaced after calibration
        Self {
            min_x: -0.5,
            max_x: 0.5,
            min_y: -0.4,
            max_y: 0.4,
            min_z: -20.0,
            max_z: 100.0,
        }
    }
}
