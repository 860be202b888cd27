//! Integration tests for terrain wiring through the ecosystem

use sandfauna::core::config::{ElevationBackend, SimulationConfig};
use sandfauna::core::types::Vec3;
use sandfauna::ecosystem::Ecosystem;
use sandfauna::species::Species;
use sandfauna::terrain::{StaticGridSource, TerrainKind};

const GRID_W: usize = 32;
const GRID_H: usize = 24;

/// Terrain at elevation 0 with a deep water basin covering x < -0.1
fn basin_source(bounds: &sandfauna::core::types::Bounds) -> StaticGridSource {
    let mut terrain = Vec::with_capacity(GRID_W * GRID_H);
    let mut water = Vec::with_capacity(GRID_W * GRID_H);
    for _y in 0..GRID_H {
        for x in 0..GRID_W {
            let world_x =
                bounds.min_x + (x as f32 / (GRID_W - 1) as f32) * (bounds.max_x - bounds.min_x);
            terrain.push(0.0);
            water.push(if world_x < -0.1 { 2.0 } else { 0.0 });
        }
    }
    StaticGridSource::new(
        GRID_W,
        GRID_H,
        Vec3::new(bounds.min_x, bounds.min_y, bounds.min_z),
        Vec3::new(bounds.max_x, bounds.max_y, bounds.max_z),
        terrain,
        water,
    )
}

fn basin_ecosystem(seed: u64) -> Ecosystem {
    let mut config = SimulationConfig::default();
    config.refresh_interval = 1;
    let bounds = config.bounds;
    let mut eco = Ecosystem::new(config, seed);
    eco.set_grid_source(Box::new(basin_source(&bounds)));
    // Validate the field before anyone queries it
    eco.update(0.0);
    eco
}

#[test]
fn test_basin_is_classified_as_water() {
    let eco = basin_ecosystem(1);
    let wet = eco.terrain_sample(-0.3, 0.0);
    assert_eq!(wet.kind, TerrainKind::Water);
    assert!(wet.water_depth > 0.5);

    let dry = eco.terrain_sample(0.3, 0.0);
    assert_eq!(dry.kind, TerrainKind::Normal);
    assert_eq!(dry.water_depth, 0.0);
}

#[test]
fn test_random_spawns_avoid_deep_water() {
    let mut eco = basin_ecosystem(2);
    for _ in 0..30 {
        eco.spawn_random(Species::Triceratops);
    }
    for agent in eco.agents() {
        assert!(
            eco.is_position_safe(&agent.position),
            "agent {} spawned unsafely at {:?}",
            agent.id.0,
            agent.position
        );
    }
}

#[test]
fn test_spawn_elevation_comes_from_terrain() {
    let mut config = SimulationConfig::default();
    config.refresh_interval = 1;
    let bounds = config.bounds;
    let mut eco = Ecosystem::new(config, 3);
    eco.set_grid_source(Box::new(StaticGridSource::flat(
        GRID_W,
        GRID_H,
        Vec3::new(bounds.min_x, bounds.min_y, bounds.min_z),
        Vec3::new(bounds.max_x, bounds.max_y, bounds.max_z),
        4.25,
    )));
    eco.update(0.0);

    let id = eco.spawn_random(Species::Gallimimus);
    let agent = eco.agent(id).unwrap();
    assert!((agent.position.z - 4.25).abs() < 1.0e-4);
}

#[test]
fn test_direct_backend_drives_terrain_following() {
    let mut config = SimulationConfig::default();
    config.refresh_interval = 1;
    config.elevation_backend = ElevationBackend::Direct;
    let mut eco = Ecosystem::new(config, 4);
    eco.set_height_source(Box::new(|x: f32, y: f32| 1.0 + x + y));

    let id = eco.spawn(Species::Stegosaurus, Vec3::new(0.2, 0.1, 0.0));
    // Elevation converges exponentially toward the sampled height
    for _ in 0..200 {
        eco.update(1.0 / 30.0);
    }
    let agent = eco.agent(id).unwrap();
    let expected = 1.0 + agent.position.x + agent.position.y;
    assert!(
        (agent.position.z - expected).abs() < 0.05,
        "z = {}, expected about {}",
        agent.position.z,
        expected
    );
}

#[test]
fn test_unrefreshed_field_reports_invalid() {
    let mut config = SimulationConfig::default();
    // Large throttle: the first few updates perform no refresh
    config.refresh_interval = 100;
    let bounds = config.bounds;
    let mut eco = Ecosystem::new(config, 5);
    eco.set_grid_source(Box::new(StaticGridSource::flat(
        GRID_W,
        GRID_H,
        Vec3::new(bounds.min_x, bounds.min_y, bounds.min_z),
        Vec3::new(bounds.max_x, bounds.max_y, bounds.max_z),
        2.0,
    )));

    eco.update(0.0);
    let sample = eco.terrain_sample(0.0, 0.0);
    assert!(!sample.valid);
    // Fallback elevation is the domain z-midpoint
    assert_eq!(sample.terrain_height, (bounds.min_z + bounds.max_z) * 0.5);
}
