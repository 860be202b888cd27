//! Local reactive steering: hazard avoidance, wander targets, herding
//!
//! These are read-only helpers over the terrain sampler and population;
//! they return vectors and points, the simulator applies them. There is
//! no pathfinding here, only single-step reactions.

use rand::Rng;

use crate::core::types::{Bounds, Vec3};
use crate::ecosystem::agent::Agent;
use crate::terrain::{TerrainKind, TerrainSample};

/// Distance from a bounds edge at which boundary repulsion kicks in
pub const BOUNDARY_MARGIN: f32 = 0.05;

/// Offset used when probing neighbor cells for hazards
pub const PROBE_DISTANCE: f32 = 0.03;

/// Radius of the bounded random-walk target search
pub const WANDER_RADIUS: f32 = 0.15;

/// Radius within which same-species agents count toward the herd centroid
pub const HERD_RADIUS: f32 = 0.15;

/// Distance at which a wander target counts as reached
pub const TARGET_EPSILON: f32 = 0.02;

/// True if a position is in bounds, not lava, and at most ankle-deep
pub fn is_position_safe<F>(
    position: &Vec3,
    bounds: &Bounds,
    water_avoidance_depth: f32,
    sample: &F,
) -> bool
where
    F: Fn(f32, f32) -> TerrainSample,
{
    if !bounds.contains_xy(position) {
        return false;
    }
    let terrain = sample(position.x, position.y);
    terrain.kind != TerrainKind::Lava && terrain.water_depth <= water_avoidance_depth
}

/// Repulsion vector away from bounds edges, lava, and deep water.
///
/// Probes the 8 neighbor offsets around the agent at [`PROBE_DISTANCE`];
/// lava contributes at double the weight of deep water. The result is
/// normalized when non-zero so the caller controls its strength.
pub fn avoidance_vector<F>(
    position: &Vec3,
    bounds: &Bounds,
    water_avoidance_depth: f32,
    sample: &F,
) -> Vec3
where
    F: Fn(f32, f32) -> TerrainSample,
{
    let mut avoidance = Vec3::default();

    if position.x < bounds.min_x + BOUNDARY_MARGIN {
        avoidance.x += 1.0;
    }
    if position.x > bounds.max_x - BOUNDARY_MARGIN {
        avoidance.x -= 1.0;
    }
    if position.y < bounds.min_y + BOUNDARY_MARGIN {
        avoidance.y += 1.0;
    }
    if position.y > bounds.max_y - BOUNDARY_MARGIN {
        avoidance.y -= 1.0;
    }

    for dx in -1i32..=1 {
        for dy in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let terrain = sample(
                position.x + dx as f32 * PROBE_DISTANCE,
                position.y + dy as f32 * PROBE_DISTANCE,
            );
            if terrain.kind == TerrainKind::Lava {
                avoidance.x -= dx as f32 * 2.0;
                avoidance.y -= dy as f32 * 2.0;
            }
            if terrain.water_depth > water_avoidance_depth {
                avoidance.x -= dx as f32;
                avoidance.y -= dy as f32;
            }
        }
    }

    if avoidance.length() > 1.0e-3 {
        avoidance.normalize()
    } else {
        Vec3::default()
    }
}

/// Pick a wander target within [`WANDER_RADIUS`] of the current position,
/// retrying up to 20 times for a safe spot; falls back to the bounds
/// center at the agent's elevation.
pub fn wander_target<F, R>(
    position: &Vec3,
    bounds: &Bounds,
    water_avoidance_depth: f32,
    sample: &F,
    rng: &mut R,
) -> Vec3
where
    F: Fn(f32, f32) -> TerrainSample,
    R: Rng,
{
    for _ in 0..20 {
        let angle = rng.gen::<f32>() * 2.0 * std::f32::consts::PI;
        let dist = rng.gen::<f32>() * WANDER_RADIUS;
        let target = Vec3::new(
            position.x + angle.cos() * dist,
            position.y + angle.sin() * dist,
            position.z,
        );
        if is_position_safe(&target, bounds, water_avoidance_depth, sample) {
            return target;
        }
    }
    bounds.center(position.z)
}

/// Average position of living same-species agents within [`HERD_RADIUS`].
///
/// With no herd members nearby this returns the agent's own position, so
/// blending toward it is a no-op. Herding emerges from biasing wander
/// targets toward this point; there is no explicit flock structure.
pub fn herd_centroid(agent: &Agent, agents: &[Agent]) -> Vec3 {
    let mut center = Vec3::default();
    let mut count = 0u32;

    for other in agents {
        if !other.alive || other.id == agent.id || other.species != agent.species {
            continue;
        }
        if agent.position.distance(&other.position) < HERD_RADIUS {
            center = center + other.position;
            count += 1;
        }
    }

    if count > 0 {
        center * (1.0 / count as f32)
    } else {
        agent.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_sample(kind: TerrainKind, depth: f32) -> impl Fn(f32, f32) -> TerrainSample {
        move |_, _| TerrainSample {
            terrain_height: 0.0,
            water_surface_height: depth,
            water_depth: depth,
            kind,
            valid: true,
        }
    }

    #[test]
    fn test_safe_position_on_dry_land() {
        let bounds = Bounds::default();
        let sample = flat_sample(TerrainKind::Normal, 0.0);
        assert!(is_position_safe(&Vec3::default(), &bounds, 0.5, &sample));
    }

    #[test]
    fn test_lava_position_unsafe() {
        let bounds = Bounds::default();
        let sample = flat_sample(TerrainKind::Lava, 0.0);
        assert!(!is_position_safe(&Vec3::default(), &bounds, 0.5, &sample));
    }

    #[test]
    fn test_out_of_bounds_unsafe() {
        let bounds = Bounds::default();
        let sample = flat_sample(TerrainKind::Normal, 0.0);
        assert!(!is_position_safe(&Vec3::new(10.0, 0.0, 0.0), &bounds, 0.5, &sample));
    }

    #[test]
    fn test_deep_water_unsafe() {
        let bounds = Bounds::default();
        let sample = flat_sample(TerrainKind::Normal, 0.9);
        assert!(!is_position_safe(&Vec3::default(), &bounds, 0.5, &sample));
    }

    #[test]
    fn test_avoidance_pushes_away_from_edge() {
        let bounds = Bounds::default();
        let sample = flat_sample(TerrainKind::Normal, 0.0);
        let near_left = Vec3::new(bounds.min_x + 0.01, 0.0, 0.0);
        let v = avoidance_vector(&near_left, &bounds, 0.5, &sample);
        assert!(v.x > 0.0);
        assert!((v.length() - 1.0).abs() < 1.0e-4, "normalized when non-zero");
    }

    #[test]
    fn test_avoidance_zero_on_open_ground() {
        let bounds = Bounds::default();
        let sample = flat_sample(TerrainKind::Normal, 0.0);
        let v = avoidance_vector(&Vec3::default(), &bounds, 0.5, &sample);
        assert_eq!(v, Vec3::default());
    }

    #[test]
    fn test_avoidance_flees_lava_on_one_side() {
        let bounds = Bounds::default();
        // Lava everywhere east of x = 0.02
        let sample = |x: f32, _y: f32| TerrainSample {
            terrain_height: 0.0,
            water_surface_height: 0.0,
            water_depth: 0.0,
            kind: if x > 0.02 {
                TerrainKind::Lava
            } else {
                TerrainKind::Normal
            },
            valid: true,
        };
        let v = avoidance_vector(&Vec3::default(), &bounds, 0.5, &sample);
        assert!(v.x < 0.0, "should push west, got {v:?}");
    }

    #[test]
    fn test_wander_target_fallback_is_center() {
        use rand::SeedableRng;
        let bounds = Bounds::default();
        // Nothing is safe, so the search must give up and return the center
        let sample = flat_sample(TerrainKind::Lava, 0.0);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let target = wander_target(&Vec3::new(0.2, 0.2, 3.0), &bounds, 0.5, &sample, &mut rng);
        assert_eq!(target, bounds.center(3.0));
    }

    #[test]
    fn test_wander_target_within_radius() {
        use rand::SeedableRng;
        let bounds = Bounds::default();
        let sample = flat_sample(TerrainKind::Normal, 0.0);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2);
        let origin = Vec3::default();
        for _ in 0..50 {
            let target = wander_target(&origin, &bounds, 0.5, &sample, &mut rng);
            assert!(origin.distance_xy(&target) <= WANDER_RADIUS + 1.0e-5);
        }
    }
}
