//! Population owner and per-tick update pipeline
//!
//! `Ecosystem::update` is called once per frame from a single simulation
//! thread and owns all agent mutation for the duration of the call. Agents
//! live in one contiguous arena and refer to each other only by id.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::{ElevationBackend, SimulationConfig};
use crate::core::types::{AgentId, Bounds, Vec3};
use crate::ecosystem::agent::{Agent, AiState, Direction};
use crate::ecosystem::{ai, steering};
use crate::species::{Action, Species};
use crate::terrain::{HeightSource, TerrainField, TerrainKind, TerrainSample, TerrainSource};

/// Fraction of the remaining elevation gap closed per tick while
/// terrain-following
const ELEVATION_SMOOTHING: f32 = 0.1;

/// Alpha lost per second during the death fade
const DEATH_FADE_RATE: f32 = 0.5;

/// Elevation sampling policy over the wired terrain backends.
///
/// Classification always comes from the grid field when one is present;
/// the direct height function can only override elevation.
struct TerrainView<'a> {
    field: Option<&'a TerrainField>,
    height: Option<&'a dyn HeightSource>,
    backend: ElevationBackend,
    /// Bounds z-midpoint, used when no backend is wired at all
    fallback_elevation: f32,
}

impl TerrainView<'_> {
    fn sample(&self, x: f32, y: f32) -> TerrainSample {
        let mut sample = match self.field {
            Some(field) => field.query(x, y),
            None => TerrainSample {
                terrain_height: self.fallback_elevation,
                water_surface_height: self.fallback_elevation,
                water_depth: 0.0,
                kind: TerrainKind::Normal,
                valid: false,
            },
        };

        let use_direct = match self.backend {
            ElevationBackend::Direct => self.height.is_some(),
            ElevationBackend::Field => self.field.is_none() && self.height.is_some(),
        };
        if use_direct {
            if let Some(height) = self.height {
                sample.terrain_height = height.height_at(x, y);
            }
        }
        sample
    }
}

/// The creature population and everything needed to advance it
pub struct Ecosystem {
    config: SimulationConfig,
    agents: Vec<Agent>,
    next_id: u32,
    hands: Vec<Vec3>,
    rng: ChaCha8Rng,

    terrain: Option<TerrainField>,
    grid_source: Option<Box<dyn TerrainSource>>,
    height_source: Option<Box<dyn HeightSource>>,
}

impl Ecosystem {
    /// Build an ecosystem with an explicit RNG seed for reproducible runs
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self {
            config,
            agents: Vec::new(),
            next_id: 0,
            hands: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            terrain: None,
            grid_source: None,
            height_source: None,
        }
    }

    /// Build an ecosystem seeded from system entropy
    pub fn from_entropy(config: SimulationConfig) -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            ..Self::new(config, 0)
        }
    }

    // === Wiring ===

    /// Attach a grid-backed terrain source. The cached field is rebuilt to
    /// the source's dimensions and refreshed on the throttled cadence
    /// during `update`.
    pub fn set_grid_source(&mut self, source: Box<dyn TerrainSource>) {
        let mut field = TerrainField::new(source.as_ref());
        field.set_lava_threshold(self.config.lava_threshold);
        field.set_water_depth_threshold(self.config.water_depth_threshold);
        field.set_refresh_interval(self.config.refresh_interval);
        self.terrain = Some(field);
        self.grid_source = Some(source);
    }

    /// Attach a direct height function, used as the elevation fallback
    /// (or as the authoritative source under `ElevationBackend::Direct`)
    pub fn set_height_source(&mut self, source: Box<dyn HeightSource>) {
        self.height_source = Some(source);
    }

    // === Configuration surface (effective next tick) ===

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.config.bounds = bounds;
    }

    /// Replace the hazard point list wholesale (e.g. detected hands)
    pub fn set_hands(&mut self, hands: Vec<Vec3>) {
        self.hands = hands;
    }

    pub fn set_lava_threshold(&mut self, threshold: f32) {
        self.config.lava_threshold = threshold;
        if let Some(field) = &mut self.terrain {
            field.set_lava_threshold(threshold);
        }
    }

    pub fn set_water_depth_threshold(&mut self, threshold: f32) {
        self.config.water_depth_threshold = threshold;
        if let Some(field) = &mut self.terrain {
            field.set_water_depth_threshold(threshold);
        }
    }

    pub fn set_water_avoidance_depth(&mut self, depth: f32) {
        self.config.water_avoidance_depth = depth;
    }

    pub fn set_hand_flee_radius(&mut self, radius: f32) {
        self.config.hand_flee_radius = radius;
    }

    pub fn set_flee_persistence(&mut self, seconds: f32) {
        self.config.flee_persistence = seconds;
    }

    pub fn set_respawn_delay(&mut self, seconds: f32) {
        self.config.respawn_delay = seconds;
    }

    /// Animation frame rate for subsequently spawned agents
    pub fn set_animation_speed(&mut self, frames_per_second: f32) {
        self.config.animation_speed = frames_per_second;
    }

    pub fn set_speed_scale(&mut self, scale: f32) {
        self.config.speed_scale = scale;
    }

    pub fn set_refresh_interval(&mut self, interval: u32) {
        self.config.refresh_interval = interval.max(1);
        if let Some(field) = &mut self.terrain {
            field.set_refresh_interval(interval);
        }
    }

    pub fn set_elevation_backend(&mut self, backend: ElevationBackend) {
        self.config.elevation_backend = backend;
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // === Population queries ===

    /// Read-only snapshot of the whole population, for rendering
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn population_len(&self) -> usize {
        self.agents.len()
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    pub fn herbivore_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|a| a.alive && a.is_herbivore())
            .count()
    }

    pub fn predator_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|a| a.alive && a.is_predator())
            .count()
    }

    /// Terrain at world coordinates under the active backend policy
    pub fn terrain_sample(&self, x: f32, y: f32) -> TerrainSample {
        self.view().sample(x, y)
    }

    /// True if a position would be accepted by the spawn safety search
    pub fn is_position_safe(&self, position: &Vec3) -> bool {
        let view = self.view();
        steering::is_position_safe(
            position,
            &self.config.bounds,
            self.config.water_avoidance_depth,
            &|x, y| view.sample(x, y),
        )
    }

    // === Spawning ===

    /// Spawn an agent at an explicit position, returning its id.
    /// Ids increase strictly and are never reused.
    pub fn spawn(&mut self, species: Species, position: Vec3) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        let direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        // Stagger initial behavior so a fresh population doesn't act in
        // lockstep
        let state_timer = self.rng.gen::<f32>() * 2.0;

        self.agents.push(Agent {
            id,
            species,
            position,
            velocity: Vec3::default(),
            target_position: position,
            action: Action::Idle,
            direction,
            frame: 0,
            animation_timer: 0.0,
            frame_time: 1.0 / self.config.animation_speed,
            ai_state: AiState::Idle,
            target_agent: None,
            state_timer,
            respawn_timer: 0.0,
            alive: true,
            visible: true,
            alpha: 1.0,
        });

        tracing::debug!(
            species = species.descriptor().name,
            id = id.0,
            x = position.x,
            y = position.y,
            "spawned agent"
        );
        id
    }

    /// Spawn at a randomly chosen safe position (bounds center if the
    /// bounded search fails)
    pub fn spawn_random(&mut self, species: Species) -> AgentId {
        let position = {
            let view = TerrainView {
                field: self.terrain.as_ref(),
                height: self.height_source.as_deref(),
                backend: self.config.elevation_backend,
                fallback_elevation: (self.config.bounds.min_z + self.config.bounds.max_z) * 0.5,
            };
            find_spawn_position(
                &self.config.bounds,
                self.config.water_avoidance_depth,
                &|x, y| view.sample(x, y),
                &mut self.rng,
            )
        };
        self.spawn(species, position)
    }

    /// Seed the starting mix of herbivores and predators
    pub fn spawn_initial_population(&mut self) {
        for _ in 0..5 {
            self.spawn_random(Species::Triceratops);
        }
        for _ in 0..3 {
            self.spawn_random(Species::Stegosaurus);
        }
        for _ in 0..4 {
            self.spawn_random(Species::Parasaurolophus);
        }
        for _ in 0..3 {
            self.spawn_random(Species::Gallimimus);
        }
        for _ in 0..2 {
            self.spawn_random(Species::TRex);
        }
        for _ in 0..4 {
            self.spawn_random(Species::Velociraptor);
        }
        self.spawn_random(Species::RaptorBlue);
        self.spawn_random(Species::RaptorRed);

        tracing::info!(count = self.agents.len(), "spawned initial population");
    }

    // === Tick pipeline ===

    /// Advance the whole population by `dt` seconds. Not reentrant; the
    /// single caller owns the population for the duration.
    pub fn update(&mut self, dt: f32) {
        // Refresh the cached terrain grids first so queries this tick see
        // data no staler than the throttle allows
        if let (Some(field), Some(source)) = (&mut self.terrain, &mut self.grid_source) {
            field.refresh(source.as_mut());
        }

        let view = TerrainView {
            field: self.terrain.as_ref(),
            height: self.height_source.as_deref(),
            backend: self.config.elevation_backend,
            fallback_elevation: (self.config.bounds.min_z + self.config.bounds.max_z) * 0.5,
        };
        let sample = |x: f32, y: f32| view.sample(x, y);
        let ctx = ai::BehaviorCtx {
            bounds: &self.config.bounds,
            hands: &self.hands,
            hand_flee_radius: self.config.hand_flee_radius,
            flee_persistence: self.config.flee_persistence,
            water_avoidance_depth: self.config.water_avoidance_depth,
        };
        let agents = &mut self.agents;
        let rng = &mut self.rng;

        let mut kills: Vec<AgentId> = Vec::new();

        for idx in 0..agents.len() {
            if agents[idx].alive {
                ai::update_living_agent(agents, idx, &ctx, &sample, rng, dt, &mut kills);
            } else if agents[idx].ai_state == AiState::Dead {
                let agent = &mut agents[idx];
                agent.respawn_timer -= dt;
                if agent.respawn_timer <= 0.0 {
                    let position = find_spawn_position(
                        ctx.bounds,
                        ctx.water_avoidance_depth,
                        &sample,
                        rng,
                    );
                    agent.position = position;
                    agent.target_position = position;
                    agent.velocity = Vec3::default();
                    agent.alive = true;
                    agent.visible = true;
                    agent.alpha = 1.0;
                    agent.target_agent = None;
                    agent.enter_state(AiState::Idle, Action::Idle);
                    tracing::debug!(
                        species = agent.descriptor().name,
                        id = agent.id.0,
                        "agent respawned"
                    );
                }
            }

            step_animation(&mut agents[idx], dt, self.config.respawn_delay);

            if agents[idx].alive {
                step_movement(
                    &mut agents[idx],
                    dt,
                    &self.config.bounds,
                    self.config.speed_scale,
                    &sample,
                );
            }
        }

        // Deferred cross-entity mutation: apply the kills collected during
        // the scan pass
        for prey_id in kills {
            if let Some(prey) = agents.iter_mut().find(|a| a.id == prey_id && a.alive) {
                prey.alive = false;
                prey.enter_state(AiState::Dying, Action::Die);
                prey.frame = 0;
                prey.animation_timer = 0.0;
                prey.velocity = Vec3::default();
                tracing::info!(
                    species = prey.descriptor().name,
                    id = prey.id.0,
                    "prey caught"
                );
            }
        }
    }
}

/// Try up to 100 uniformly random in-bounds positions, accepting the first
/// that is safe (not lava, water no deeper than the avoidance threshold);
/// fall back to the bounds center regardless of safety.
fn find_spawn_position<F, R>(
    bounds: &Bounds,
    water_avoidance_depth: f32,
    sample: &F,
    rng: &mut R,
) -> Vec3
where
    F: Fn(f32, f32) -> TerrainSample,
    R: Rng,
{
    for _ in 0..100 {
        let x = bounds.min_x + rng.gen::<f32>() * (bounds.max_x - bounds.min_x);
        let y = bounds.min_y + rng.gen::<f32>() * (bounds.max_y - bounds.min_y);
        let position = Vec3::new(x, y, sample(x, y).terrain_height);
        if steering::is_position_safe(&position, bounds, water_avoidance_depth, sample) {
            return position;
        }
    }

    let mut center = bounds.center(0.0);
    center.z = sample(center.x, center.y).terrain_height;
    center
}

/// Advance the animation frame timer; Dying freezes on the last death
/// frame and drives the fade instead of looping.
fn step_animation(agent: &mut Agent, dt: f32, respawn_delay: f32) {
    if agent.ai_state == AiState::Dying {
        let die_frames = agent.descriptor().frames(Action::Die);

        agent.animation_timer += dt;
        if agent.frame < die_frames - 1 && agent.animation_timer >= agent.frame_time {
            agent.animation_timer -= agent.frame_time;
            agent.frame += 1;
        }

        if agent.frame >= die_frames - 1 {
            agent.frame = die_frames - 1;
            agent.alpha = (agent.alpha - dt * DEATH_FADE_RATE).max(0.0);
            if agent.alpha <= 0.0 {
                agent.ai_state = AiState::Dead;
                agent.visible = false;
                agent.respawn_timer = respawn_delay;
            }
        }
        return;
    }

    agent.animation_timer += dt;
    if agent.animation_timer >= agent.frame_time {
        agent.animation_timer -= agent.frame_time;
        agent.frame = (agent.frame + 1) % agent.descriptor().frames(agent.action).max(1);
    }

    // Zero velocity keeps the previous facing
    if let Some(direction) = Direction::from_velocity(&agent.velocity) {
        agent.direction = direction;
    }
}

/// Integrate horizontal motion, clamp into bounds, and smooth elevation
/// toward the sampled terrain height
fn step_movement<F>(agent: &mut Agent, dt: f32, bounds: &Bounds, speed_scale: f32, sample: &F)
where
    F: Fn(f32, f32) -> TerrainSample,
{
    agent.position.x += agent.velocity.x * dt * speed_scale;
    agent.position.y += agent.velocity.y * dt * speed_scale;
    agent.position = bounds.clamp_xy(agent.position);

    let target_z = sample(agent.position.x, agent.position.y).terrain_height;
    agent.position.z += (target_z - agent.position.z) * ELEVATION_SMOOTHING;
}

impl Ecosystem {
    fn view(&self) -> TerrainView<'_> {
        TerrainView {
            field: self.terrain.as_ref(),
            height: self.height_source.as_deref(),
            backend: self.config.elevation_backend,
            fallback_elevation: (self.config.bounds.min_z + self.config.bounds.max_z) * 0.5,
        }
    }
}
