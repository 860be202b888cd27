//! Per-agent behavior state machines
//!
//! Each function runs one tick of AI for one living agent. Scans over the
//! population are read-only and complete before the agent itself is
//! mutated; kills are collected into a deferred list and applied by the
//! simulator after the population pass, so no two agents are ever borrowed
//! mutably at once.

use rand::Rng;

use crate::core::types::{AgentId, Bounds, Vec3};
use crate::ecosystem::agent::{Agent, AiState};
use crate::ecosystem::steering;
use crate::species::Action;
use crate::terrain::{TerrainKind, TerrainSample};

/// Seconds the attack animation plays before the kill is resolved
pub const ATTACK_DURATION: f32 = 1.0;

/// A kill lands only while the prey is within this multiple of the
/// engagement range. Looser than the range that starts the attack; the
/// asymmetry is deliberate.
pub const KILL_RANGE_FACTOR: f32 = 2.0;

/// Predators give up on an unreached patrol target after this long
pub const PATROL_TIMEOUT: f32 = 5.0;

/// Bounded jitter applied to the flee direction before renormalizing
const FLEE_JITTER: f32 = 0.3;

/// Effective distance reported for standing on lava; beats any other
/// threat in the nearest-wins comparison
const LAVA_THREAT_DISTANCE: f32 = 0.01;

/// Behavior inputs shared by every agent this tick
pub struct BehaviorCtx<'a> {
    pub bounds: &'a Bounds,
    pub hands: &'a [Vec3],
    pub hand_flee_radius: f32,
    pub flee_persistence: f32,
    pub water_avoidance_depth: f32,
}

/// Run one AI tick for the living agent at `idx`. Dying and Dead agents
/// are handled by the simulator's death tail, not here.
pub fn update_living_agent<F, R>(
    agents: &mut [Agent],
    idx: usize,
    ctx: &BehaviorCtx,
    sample: &F,
    rng: &mut R,
    dt: f32,
    kills: &mut Vec<AgentId>,
) where
    F: Fn(f32, f32) -> TerrainSample,
    R: Rng,
{
    agents[idx].state_timer += dt;

    let skip_steering = if agents[idx].is_herbivore() {
        update_herbivore(agents, idx, ctx, sample, rng);
        false
    } else {
        update_predator(agents, idx, ctx, sample, rng, kills)
    };

    if skip_steering {
        return;
    }

    // Hazard-avoidance steering biases, but never replaces, directed motion
    let agent = &agents[idx];
    let avoidance = steering::avoidance_vector(
        &agent.position,
        ctx.bounds,
        ctx.water_avoidance_depth,
        sample,
    );
    if avoidance.length() > 1.0e-3 {
        let walk_speed = agent.descriptor().walk_speed;
        let agent = &mut agents[idx];
        agent.velocity = agent.velocity + avoidance * (walk_speed * 0.5);
    }
}

/// Nearest threat for a herbivore: living predators in sight range, hands
/// within the flee radius, and lava underfoot (maximal priority via a
/// near-zero distance). Nearest wins.
fn find_nearest_threat<F>(
    agent: &Agent,
    agents: &[Agent],
    ctx: &BehaviorCtx,
    sample: &F,
) -> Option<(Vec3, f32)>
where
    F: Fn(f32, f32) -> TerrainSample,
{
    let mut nearest: Option<(Vec3, f32)> = None;
    let sight_range = agent.descriptor().sight_range;

    for other in agents {
        if !other.alive || other.id == agent.id || !other.is_predator() {
            continue;
        }
        let dist = agent.position.distance(&other.position);
        if dist < sight_range && nearest.map_or(true, |(_, d)| dist < d) {
            nearest = Some((other.position, dist));
        }
    }

    for hand in ctx.hands {
        let dist = agent.position.distance(hand);
        if dist < ctx.hand_flee_radius && nearest.map_or(true, |(_, d)| dist < d) {
            nearest = Some((*hand, dist));
        }
    }

    let terrain = sample(agent.position.x, agent.position.y);
    if terrain.kind == TerrainKind::Lava
        && nearest.map_or(true, |(_, d)| LAVA_THREAT_DISTANCE < d)
    {
        nearest = Some((agent.position, LAVA_THREAT_DISTANCE));
    }

    nearest
}

/// Nearest living herbivore within the predator's sight range
fn find_nearest_prey(predator: &Agent, agents: &[Agent]) -> Option<(AgentId, Vec3, f32)> {
    let sight_range = predator.descriptor().sight_range;
    let mut nearest: Option<(AgentId, Vec3, f32)> = None;

    for other in agents {
        if !other.alive || other.id == predator.id || !other.is_herbivore() {
            continue;
        }
        let dist = predator.position.distance(&other.position);
        if dist < sight_range && nearest.map_or(true, |(_, _, d)| dist < d) {
            nearest = Some((other.id, other.position, dist));
        }
    }

    nearest
}

fn update_herbivore<F, R>(
    agents: &mut [Agent],
    idx: usize,
    ctx: &BehaviorCtx,
    sample: &F,
    rng: &mut R,
) where
    F: Fn(f32, f32) -> TerrainSample,
    R: Rng,
{
    let (threat, herd_center) = {
        let agent = &agents[idx];
        (
            find_nearest_threat(agent, agents, ctx, sample),
            steering::herd_centroid(agent, agents),
        )
    };

    let agent = &mut agents[idx];
    let info = agent.descriptor();

    if let Some((threat_pos, _)) = threat {
        // Any detected threat forces fleeing; timer restarts while the
        // threat persists so persistence counts from the last sighting
        agent.enter_state(AiState::Fleeing, Action::Run);

        let mut flee_dir = (agent.position - threat_pos).normalize();
        flee_dir.x += (rng.gen::<f32>() - 0.5) * FLEE_JITTER;
        flee_dir.y += (rng.gen::<f32>() - 0.5) * FLEE_JITTER;
        flee_dir = flee_dir.normalize();

        agent.velocity = flee_dir * info.run_speed;
        return;
    }

    match agent.ai_state {
        AiState::Fleeing => {
            // Keep running for a bit after the threat disappears
            if agent.state_timer > ctx.flee_persistence {
                let target = steering::wander_target(
                    &agent.position,
                    ctx.bounds,
                    ctx.water_avoidance_depth,
                    sample,
                    rng,
                );
                agent.enter_state(AiState::Wandering, Action::Walk);
                agent.target_position = target;
            }
        }
        AiState::Idle => {
            if agent.state_timer > 1.0 + rng.gen::<f32>() * 3.0 {
                if rng.gen::<f32>() < 0.3 {
                    agent.enter_state(AiState::Grazing, Action::Idle);
                    agent.velocity = Vec3::default();
                } else {
                    let target = steering::wander_target(
                        &agent.position,
                        ctx.bounds,
                        ctx.water_avoidance_depth,
                        sample,
                        rng,
                    );
                    agent.enter_state(AiState::Wandering, Action::Walk);
                    // Bias the target toward the herd to keep the species
                    // loosely grouped
                    agent.target_position = Vec3::new(
                        target.x * 0.6 + herd_center.x * 0.4,
                        target.y * 0.6 + herd_center.y * 0.4,
                        target.z,
                    );
                }
            }
        }
        AiState::Grazing => {
            if agent.state_timer > 2.0 + rng.gen::<f32>() * 4.0 {
                let target = steering::wander_target(
                    &agent.position,
                    ctx.bounds,
                    ctx.water_avoidance_depth,
                    sample,
                    rng,
                );
                agent.enter_state(AiState::Wandering, Action::Walk);
                agent.target_position = target;
            }
        }
        AiState::Wandering => {
            let to_target = agent.target_position - agent.position;
            let dist = to_target.length_xy();
            if dist < steering::TARGET_EPSILON {
                agent.enter_state(AiState::Idle, Action::Idle);
                agent.velocity = Vec3::default();
            } else {
                agent.velocity = to_target.normalize() * info.walk_speed;
            }
        }
        _ => {}
    }
}

/// Returns true when the lava override fired, which skips steering too
fn update_predator<F, R>(
    agents: &mut [Agent],
    idx: usize,
    ctx: &BehaviorCtx,
    sample: &F,
    rng: &mut R,
    kills: &mut Vec<AgentId>,
) -> bool
where
    F: Fn(f32, f32) -> TerrainSample,
    R: Rng,
{
    // Standing on lava overrides everything: bolt for the bounds center
    let own_terrain = {
        let agent = &agents[idx];
        sample(agent.position.x, agent.position.y)
    };
    if own_terrain.kind == TerrainKind::Lava {
        let agent = &mut agents[idx];
        let run_speed = agent.descriptor().run_speed;
        agent.ai_state = AiState::Fleeing;
        agent.action = Action::Run;
        let center = ctx.bounds.center(agent.position.z);
        agent.velocity = (center - agent.position).normalize() * run_speed;
        return true;
    }

    // Resolve an attack in progress before rescanning for prey
    if agents[idx].ai_state == AiState::Attacking {
        if agents[idx].state_timer > ATTACK_DURATION {
            let kill = {
                let agent = &agents[idx];
                let kill_range = agent.descriptor().attack_range * KILL_RANGE_FACTOR;
                agent.target_agent.and_then(|prey_id| {
                    agents
                        .iter()
                        .find(|a| a.id == prey_id && a.alive)
                        .filter(|prey| agent.position.distance(&prey.position) < kill_range)
                        .map(|prey| prey.id)
                })
            };
            if let Some(prey_id) = kill {
                kills.push(prey_id);
            }
            // Back to patrol whether or not the kill landed
            agents[idx].enter_state(AiState::Idle, Action::Idle);
        }
        return false;
    }

    let prey = find_nearest_prey(&agents[idx], agents);

    let agent = &mut agents[idx];
    let info = agent.descriptor();

    if let Some((prey_id, prey_pos, dist)) = prey {
        agent.target_agent = Some(prey_id);
        if dist < info.attack_range {
            agent.enter_state(AiState::Attacking, Action::Attack);
            agent.velocity = Vec3::default();
        } else {
            agent.ai_state = AiState::Hunting;
            agent.action = Action::Run;
            agent.velocity = (prey_pos - agent.position).normalize() * info.run_speed;
        }
        return false;
    }

    // No prey visible: patrol. Retarget when not wandering yet or when
    // stuck past the timeout without reaching the target.
    if agent.ai_state != AiState::Wandering || agent.state_timer > PATROL_TIMEOUT {
        let target = steering::wander_target(
            &agent.position,
            ctx.bounds,
            ctx.water_avoidance_depth,
            sample,
            rng,
        );
        agent.enter_state(AiState::Wandering, Action::Walk);
        agent.target_position = target;
    }

    let agent = &mut agents[idx];
    let to_target = agent.target_position - agent.position;
    let dist = to_target.length_xy();
    if dist > steering::TARGET_EPSILON {
        agent.velocity = to_target.normalize() * info.walk_speed;
    } else {
        agent.velocity = Vec3::default();
    }

    false
}
