//! Sandfauna - headless driver
//!
//! Runs the ecosystem against a procedurally generated static terrain
//! grid and prints a population summary. Useful for tuning behavior
//! parameters and for profiling the per-tick cost without a sandbox
//! attached.

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use sandfauna::core::config::SimulationConfig;
use sandfauna::core::error::Result;
use sandfauna::core::types::Vec3;
use sandfauna::ecosystem::{AiState, Ecosystem};
use sandfauna::terrain::StaticGridSource;

#[derive(Parser, Debug)]
#[command(name = "sandfauna", about = "Headless creature ecosystem simulation")]
struct Args {
    /// RNG seed for the ecosystem and the generated terrain
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 3600)]
    ticks: u32,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    tick_dt: f32,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Sweep a simulated hand through the box to exercise flee behavior
    #[arg(long, default_value_t = false)]
    hand: bool,

    /// Write the final population snapshot to a JSON file
    #[arg(long)]
    snapshot: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sandfauna=info".parse().expect("valid directive")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    config
        .validate()
        .map_err(sandfauna::core::error::FaunaError::ConfigError)?;

    tracing::info!(seed = args.seed, ticks = args.ticks, "starting simulation");

    let bounds = config.bounds;
    let mut ecosystem = Ecosystem::new(config, args.seed);
    ecosystem.set_grid_source(Box::new(generate_terrain(&bounds, args.seed)));
    ecosystem.spawn_initial_population();

    let mut elapsed = 0.0f32;
    for tick in 0..args.ticks {
        if args.hand {
            ecosystem.set_hands(vec![sweep_hand(&bounds, elapsed)]);
        }
        ecosystem.update(args.tick_dt);
        elapsed += args.tick_dt;

        if tick % 600 == 0 {
            tracing::info!(
                tick,
                alive = ecosystem.alive_count(),
                herbivores = ecosystem.herbivore_count(),
                predators = ecosystem.predator_count(),
                "population"
            );
        }
    }

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(ecosystem.agents())?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "wrote population snapshot");
    }

    print_summary(&ecosystem, elapsed);
    Ok(())
}

/// Rolling-hill terrain with a water basin in one corner, sized to the
/// configured bounds
fn generate_terrain(bounds: &sandfauna::core::types::Bounds, seed: u64) -> StaticGridSource {
    const WIDTH: usize = 64;
    const HEIGHT: usize = 48;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let phase_x = rng.gen::<f32>() * std::f32::consts::TAU;
    let phase_y = rng.gen::<f32>() * std::f32::consts::TAU;

    let mut terrain = Vec::with_capacity(WIDTH * HEIGHT);
    let mut water = Vec::with_capacity(WIDTH * HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let nx = x as f32 / (WIDTH - 1) as f32;
            let ny = y as f32 / (HEIGHT - 1) as f32;
            let height = 2.0
                + (nx * 9.0 + phase_x).sin() * 1.5
                + (ny * 7.0 + phase_y).cos() * 1.5
                + rng.gen::<f32>() * 0.2;
            terrain.push(height);
            // Standing water pools in the low corner
            let water_surface = if nx < 0.25 && ny < 0.25 { 3.0 } else { height };
            water.push(water_surface);
        }
    }

    StaticGridSource::new(
        WIDTH,
        HEIGHT,
        Vec3::new(bounds.min_x, bounds.min_y, bounds.min_z),
        Vec3::new(bounds.max_x, bounds.max_y, bounds.max_z),
        terrain,
        water,
    )
}

/// A hand circling the middle of the box
fn sweep_hand(bounds: &sandfauna::core::types::Bounds, elapsed: f32) -> Vec3 {
    let center = bounds.center(0.0);
    let radius = (bounds.max_x - bounds.min_x) * 0.25;
    Vec3::new(
        center.x + (elapsed * 0.5).cos() * radius,
        center.y + (elapsed * 0.5).sin() * radius,
        2.0,
    )
}

fn print_summary(ecosystem: &Ecosystem, elapsed: f32) {
    println!("\n=== SANDFAUNA SUMMARY ===");
    println!("simulated time: {elapsed:.1}s");
    println!(
        "population: {} total, {} alive ({} herbivores, {} predators)",
        ecosystem.population_len(),
        ecosystem.alive_count(),
        ecosystem.herbivore_count(),
        ecosystem.predator_count(),
    );

    let mut by_state: std::collections::BTreeMap<&'static str, usize> = Default::default();
    for agent in ecosystem.agents() {
        let name = match agent.ai_state {
            AiState::Idle => "idle",
            AiState::Wandering => "wandering",
            AiState::Grazing => "grazing",
            AiState::Fleeing => "fleeing",
            AiState::Hunting => "hunting",
            AiState::Attacking => "attacking",
            AiState::Dying => "dying",
            AiState::Dead => "dead",
        };
        *by_state.entry(name).or_default() += 1;
    }
    for (state, count) in by_state {
        println!("  {state:>10}: {count}");
    }
}
