//! Integration tests for the ecosystem lifecycle
//!
//! These cover the full tick pipeline over a flat, safe terrain grid:
//! spawning, threat response, predator-prey resolution, the death and
//! respawn tail, and the bounds-containment guarantee.

use sandfauna::core::config::SimulationConfig;
use sandfauna::core::types::Vec3;
use sandfauna::ecosystem::{AiState, Ecosystem};
use sandfauna::species::{Action, Species};
use sandfauna::terrain::StaticGridSource;

/// Flat dry terrain at elevation 0 covering the default bounds, with the
/// refresh throttle disabled so the first update validates the field
fn flat_ecosystem(seed: u64) -> Ecosystem {
    let mut config = SimulationConfig::default();
    config.refresh_interval = 1;
    let bounds = config.bounds;

    let mut eco = Ecosystem::new(config, seed);
    eco.set_grid_source(Box::new(StaticGridSource::flat(
        32,
        24,
        Vec3::new(bounds.min_x, bounds.min_y, bounds.min_z),
        Vec3::new(bounds.max_x, bounds.max_y, bounds.max_z),
        0.0,
    )));
    eco
}

#[test]
fn test_spawned_ids_strictly_increase() {
    let mut eco = flat_ecosystem(1);
    eco.spawn_initial_population();
    let ids: Vec<u32> = eco.agents().iter().map(|a| a.id.0).collect();
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1], "ids must strictly increase: {ids:?}");
    }
}

#[test]
fn test_agents_stay_in_bounds() {
    let mut eco = flat_ecosystem(2);
    eco.spawn_initial_population();

    let bounds = eco.config().bounds;
    for tick in 0..600 {
        eco.update(1.0 / 30.0);
        for agent in eco.agents() {
            assert!(
                bounds.contains_xy(&agent.position),
                "agent {} out of bounds at tick {}: {:?}",
                agent.id.0,
                tick,
                agent.position
            );
        }
    }
}

#[test]
fn test_herbivore_flees_from_hand() {
    let mut eco = flat_ecosystem(3);
    let id = eco.spawn(Species::Triceratops, Vec3::default());
    eco.set_hands(vec![Vec3::new(0.05, 0.0, 0.0)]);

    eco.update(1.0 / 60.0);

    let agent = eco.agent(id).unwrap();
    assert_eq!(agent.ai_state, AiState::Fleeing);
    assert_eq!(agent.action, Action::Run);
    let run_speed = Species::Triceratops.descriptor().run_speed;
    assert!(
        (agent.velocity.length() - run_speed).abs() < 1.0e-4,
        "flee speed should be run speed, got {}",
        agent.velocity.length()
    );
    // Away from the hand, which sits due east
    assert!(agent.velocity.x < 0.0);
}

#[test]
fn test_flee_persistence_then_decay() {
    let mut eco = flat_ecosystem(4);
    let id = eco.spawn(Species::Triceratops, Vec3::default());
    eco.set_hands(vec![Vec3::new(0.05, 0.0, 0.0)]);
    eco.update(0.1);
    assert_eq!(eco.agent(id).unwrap().ai_state, AiState::Fleeing);

    // Threat gone: fleeing persists for a while
    eco.set_hands(Vec::new());
    for _ in 0..15 {
        eco.update(0.1);
    }
    assert_eq!(
        eco.agent(id).unwrap().ai_state,
        AiState::Fleeing,
        "still fleeing 1.5s after the threat disappeared"
    );

    // Well past the persistence window it must have moved on
    for _ in 0..15 {
        eco.update(0.1);
    }
    assert_ne!(eco.agent(id).unwrap().ai_state, AiState::Fleeing);
}

#[test]
fn test_predator_kills_prey_in_range() {
    let mut eco = flat_ecosystem(5);
    let predator = eco.spawn(Species::TRex, Vec3::default());
    let prey = eco.spawn(Species::Triceratops, Vec3::new(0.01, 0.0, 0.0));

    // First tick puts the predator into Attacking; the kill resolves once
    // the attack animation has played out
    for _ in 0..30 {
        eco.update(0.05);
    }

    let prey_agent = eco.agent(prey).unwrap();
    assert!(!prey_agent.alive, "prey should have been caught");
    assert_eq!(prey_agent.ai_state, AiState::Dying);
    assert_eq!(prey_agent.action, Action::Die);
    assert_eq!(prey_agent.velocity, Vec3::default());

    let predator_agent = eco.agent(predator).unwrap();
    assert!(predator_agent.alive);
    assert_ne!(predator_agent.ai_state, AiState::Attacking);
}

#[test]
fn test_attack_misses_fast_prey() {
    let mut eco = flat_ecosystem(6);
    eco.spawn(Species::TRex, Vec3::default());
    // Gallimimus outruns a T-Rex; by resolution time it is beyond twice
    // the attack range and the kill silently no-ops
    let prey = eco.spawn(Species::Gallimimus, Vec3::new(0.02, 0.0, 0.0));

    for _ in 0..60 {
        eco.update(0.05);
    }

    assert!(eco.agent(prey).unwrap().alive, "fast prey should escape");
}

#[test]
fn test_death_fade_and_respawn() {
    let mut eco = flat_ecosystem(7);
    eco.set_respawn_delay(1.0);
    eco.spawn(Species::TRex, Vec3::default());
    let prey = eco.spawn(Species::Triceratops, Vec3::new(0.01, 0.0, 0.0));

    // Run until the prey dies
    let mut waited = 0;
    while eco.agent(prey).unwrap().alive {
        eco.update(0.05);
        waited += 1;
        assert!(waited < 100, "prey never died");
    }

    // While dying, alpha must be non-increasing once the death animation
    // has finished, down to exactly zero
    let die_frames = Species::Triceratops.descriptor().frames(Action::Die);
    let mut last_alpha = eco.agent(prey).unwrap().alpha;
    let mut reached_dead = false;
    let mut respawned = false;
    for _ in 0..300 {
        eco.update(0.05);
        let agent = eco.agent(prey).unwrap();
        match agent.ai_state {
            AiState::Dying => {
                assert!(agent.frame < die_frames);
                if agent.frame == die_frames - 1 {
                    assert!(agent.alpha <= last_alpha, "fade must be monotonic");
                }
                last_alpha = agent.alpha;
            }
            AiState::Dead => {
                assert_eq!(agent.alpha, 0.0);
                assert!(!agent.visible);
                reached_dead = true;
            }
            // Respawn: same id, restored on the tick the countdown expires,
            // before any AI has run, at an independently safe position
            _ => {
                assert!(agent.alive);
                assert_eq!(agent.ai_state, AiState::Idle);
                assert!(agent.visible);
                assert_eq!(agent.alpha, 1.0);
                assert_eq!(agent.velocity, Vec3::default());
                assert!(eco.is_position_safe(&agent.position));
                respawned = true;
                break;
            }
        }
    }
    assert!(reached_dead, "agent never reached Dead");
    assert!(respawned, "agent never respawned");
}

#[test]
fn test_lava_underfoot_forces_fleeing() {
    let mut eco = flat_ecosystem(8);
    let herbivore = eco.spawn(Species::Stegosaurus, Vec3::new(0.1, 0.1, 0.0));
    let predator = eco.spawn(Species::Velociraptor, Vec3::new(-0.2, -0.1, 0.0));

    // Terrain sits at elevation 0; raising the lava threshold above it
    // turns the whole box into lava
    eco.set_lava_threshold(5.0);
    eco.update(1.0 / 60.0);

    assert_eq!(eco.agent(herbivore).unwrap().ai_state, AiState::Fleeing);
    let predator_agent = eco.agent(predator).unwrap();
    assert_eq!(predator_agent.ai_state, AiState::Fleeing);
    assert_eq!(predator_agent.action, Action::Run);
    // The predator override bolts for the bounds center
    assert!(predator_agent.velocity.x > 0.0);
}

#[test]
fn test_dead_agents_do_not_act() {
    let mut eco = flat_ecosystem(9);
    eco.spawn(Species::TRex, Vec3::default());
    let prey = eco.spawn(Species::Triceratops, Vec3::new(0.01, 0.0, 0.0));

    // Default respawn delay is 8s; park the prey in Dead and verify it
    // stays put and invisible
    for _ in 0..100 {
        eco.update(0.05);
    }
    let agent = eco.agent(prey).unwrap();
    assert_eq!(agent.ai_state, AiState::Dead);
    let parked = agent.position;

    eco.update(0.05);
    let agent = eco.agent(prey).unwrap();
    assert_eq!(agent.position, parked);
    assert!(!agent.visible);
}
