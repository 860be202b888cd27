//! Agent data: the per-creature simulation state

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Vec3};
use crate::species::{Action, Species, SpeciesDescriptor};

/// Behavior states. Idle/Wandering/Grazing/Fleeing belong to herbivores,
/// Wandering/Hunting/Attacking (plus the lava-flee override) to predators;
/// Dying/Dead are the shared death tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// Standing still
    Idle,
    /// Moving to a chosen target point
    Wandering,
    /// Herbivore eating (idle animation, zero velocity)
    Grazing,
    /// Running from a threat (predator, hand, or lava)
    Fleeing,
    /// Predator chasing prey
    Hunting,
    /// Predator attacking prey
    Attacking,
    /// Playing the death animation, then fading out
    Dying,
    /// Invisible, counting down to respawn
    Dead,
}

/// 8-sector facing direction matching the sprite atlas rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// Minimum speed that counts as movement for facing updates
pub const FACING_EPSILON: f32 = 1.0e-3;

impl Direction {
    /// All directions in atlas-row order
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Bucket a velocity's planar angle into one of 8 compass sectors of
    /// 45 degrees, centered on the sector boundary. Angle 0 is East,
    /// counter-clockwise positive (+Y is North on the projection).
    ///
    /// Returns `None` below [`FACING_EPSILON`]; callers keep the previous
    /// facing in that case.
    pub fn from_velocity(velocity: &Vec3) -> Option<Direction> {
        if velocity.length_xy() < FACING_EPSILON {
            return None;
        }

        let mut angle = velocity.y.atan2(velocity.x).to_degrees();
        if angle < 0.0 {
            angle += 360.0;
        }
        let sector = (((angle + 22.5) / 45.0) as usize) % 8;

        // Sectors walk counter-clockwise from East
        const BY_ANGLE: [Direction; 8] = [
            Direction::East,
            Direction::NorthEast,
            Direction::North,
            Direction::NorthWest,
            Direction::West,
            Direction::SouthWest,
            Direction::South,
            Direction::SouthEast,
        ];
        Some(BY_ANGLE[sector])
    }

    /// Row index in the sprite atlas (8 rows, one per direction)
    pub fn atlas_row(&self) -> u32 {
        *self as u32
    }
}

/// One simulated creature. Created by `spawn`, mutated in place by the
/// simulator every tick, revived with the same id after death.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub species: Species,

    pub position: Vec3,
    pub velocity: Vec3,
    /// Where the agent is currently trying to go
    pub target_position: Vec3,

    pub action: Action,
    pub direction: Direction,
    pub frame: u32,
    pub animation_timer: f32,
    /// Seconds per animation frame
    pub frame_time: f32,

    pub ai_state: AiState,
    /// Agent being chased or attacked, by id (never a direct reference)
    pub target_agent: Option<AgentId>,
    /// Seconds since entering the current AI state
    pub state_timer: f32,
    /// Countdown to respawn once Dead
    pub respawn_timer: f32,

    pub alive: bool,
    pub visible: bool,
    /// Opacity in [0, 1], driven by the death fade
    pub alpha: f32,
}

impl Agent {
    pub fn descriptor(&self) -> &'static SpeciesDescriptor {
        self.species.descriptor()
    }

    pub fn is_herbivore(&self) -> bool {
        self.species.is_herbivore()
    }

    pub fn is_predator(&self) -> bool {
        self.species.is_predator()
    }

    /// Enter a state, resetting the state timer
    pub fn enter_state(&mut self, state: AiState, action: Action) {
        self.ai_state = state;
        self.action = action;
        self.state_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_east_velocity_buckets_east() {
        let dir = Direction::from_velocity(&Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(dir, Some(Direction::East));
    }

    #[test]
    fn test_north_velocity_buckets_north() {
        let dir = Direction::from_velocity(&Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(dir, Some(Direction::North));
    }

    #[test]
    fn test_zero_velocity_keeps_prior_facing() {
        assert_eq!(Direction::from_velocity(&Vec3::default()), None);
    }

    #[test]
    fn test_sector_boundaries_are_centered() {
        // 22 degrees is still East, 23 degrees tips into NorthEast
        let east = Vec3::new(22.0_f32.to_radians().cos(), 22.0_f32.to_radians().sin(), 0.0);
        let ne = Vec3::new(23.0_f32.to_radians().cos(), 23.0_f32.to_radians().sin(), 0.0);
        assert_eq!(Direction::from_velocity(&east), Some(Direction::East));
        assert_eq!(Direction::from_velocity(&ne), Some(Direction::NorthEast));
    }

    #[test]
    fn test_all_eight_sectors() {
        let cases = [
            (0.0, Direction::East),
            (45.0, Direction::NorthEast),
            (90.0, Direction::North),
            (135.0, Direction::NorthWest),
            (180.0, Direction::West),
            (225.0, Direction::SouthWest),
            (270.0, Direction::South),
            (315.0, Direction::SouthEast),
        ];
        for (deg, expected) in cases {
            let rad = (deg as f32).to_radians();
            let v = Vec3::new(rad.cos(), rad.sin(), 0.0);
            assert_eq!(Direction::from_velocity(&v), Some(expected), "{deg} degrees");
        }
    }

    #[test]
    fn test_atlas_rows_are_distinct() {
        let rows: std::collections::HashSet<u32> = [
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ]
        .iter()
        .map(|d| d.atlas_row())
        .collect();
        assert_eq!(rows.len(), 8);
    }
}
