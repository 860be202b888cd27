//! Species catalog: per-species behavior parameters and sprite keys
//!
//! Species differences are pure data keyed by a closed enum; there is no
//! per-species dispatch anywhere. The role tag decides which state machine
//! runs, the numeric fields tune it.

use serde::{Deserialize, Serialize};

/// Species enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Triceratops,
    Stegosaurus,
    Parasaurolophus,
    Gallimimus,
    TRex,
    Velociraptor,
    RaptorBlue,
    RaptorGreen,
    RaptorRed,
}

impl Species {
    pub const ALL: [Species; 9] = [
        Species::Triceratops,
        Species::Stegosaurus,
        Species::Parasaurolophus,
        Species::Gallimimus,
        Species::TRex,
        Species::Velociraptor,
        Species::RaptorBlue,
        Species::RaptorGreen,
        Species::RaptorRed,
    ];

    /// Look up the immutable descriptor for this species
    pub fn descriptor(&self) -> &'static SpeciesDescriptor {
        &CATALOG[*self as usize]
    }

    pub fn role(&self) -> Role {
        self.descriptor().role
    }

    pub fn is_predator(&self) -> bool {
        self.role() == Role::Predator
    }

    pub fn is_herbivore(&self) -> bool {
        self.role() == Role::Herbivore
    }
}

/// Behavioral category determining which AI state machine applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Herbivore,
    Predator,
}

/// Animation action categories, one sprite sheet each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Idle,
    Walk,
    Run,
    Attack,
    Die,
    TakeDamage,
}

pub const ACTION_COUNT: usize = 6;

impl Action {
    /// File stem used in sprite sheet names. Attack maps to "attack1":
    /// the asset packs ship multiple attack animations and the exhibit
    /// uses the first.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Walk => "walk",
            Action::Run => "run",
            Action::Attack => "attack1",
            Action::Die => "die",
            Action::TakeDamage => "takedamage",
        }
    }
}

/// Immutable per-species parameters, shared by reference by all agents
/// of the species
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesDescriptor {
    /// Display name
    pub name: &'static str,
    /// Sprite sheet folder relative to the configured sprite directory
    pub sprite_folder: &'static str,
    pub role: Role,
    /// Normal walking speed (world units/sec)
    pub walk_speed: f32,
    /// Running/fleeing/chasing speed
    pub run_speed: f32,
    /// Distance at which threats or prey are detected
    pub sight_range: f32,
    /// Distance that triggers an attack; 0 for herbivores
    pub attack_range: f32,
    /// Animation frame counts, indexed by [`Action`] discriminant
    pub frames_per_action: [u32; ACTION_COUNT],
}

impl SpeciesDescriptor {
    pub fn frames(&self, action: Action) -> u32 {
        self.frames_per_action[action as usize]
    }
}

/// Build the sprite sheet path for a species/action pair.
///
/// The external renderer prepends its sprite directory and slices the
/// sheet as 8 rows (facing direction) by frames-per-action columns.
pub fn sprite_sheet_path(species: Species, action: Action) -> String {
    format!(
        "{}/{}_Shadowless.png",
        species.descriptor().sprite_folder,
        action.file_stem()
    )
}

/// Species parameter table, ordered to match the `Species` discriminants
static CATALOG: [SpeciesDescriptor; 9] = [
    // Sturdy herbivore, herds together
    SpeciesDescriptor {
        name: "Triceratops",
        sprite_folder: "triceratops",
        role: Role::Herbivore,
        walk_speed: 0.015,
        run_speed: 0.035,
        sight_range: 0.15,
        attack_range: 0.0,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
    // Slow, peaceful grazer
    SpeciesDescriptor {
        name: "Stegosaurus",
        sprite_folder: "stegosaurus",
        role: Role::Herbivore,
        walk_speed: 0.010,
        run_speed: 0.025,
        sight_range: 0.12,
        attack_range: 0.0,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
    // Skittish runner, spots danger early
    SpeciesDescriptor {
        name: "Parasaurolophus",
        sprite_folder: "parasaurolophus",
        role: Role::Herbivore,
        walk_speed: 0.018,
        run_speed: 0.045,
        sight_range: 0.18,
        attack_range: 0.0,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
    // Fastest herbivore, very alert
    SpeciesDescriptor {
        name: "Gallimimus",
        sprite_folder: "gallimimus",
        role: Role::Herbivore,
        walk_speed: 0.022,
        run_speed: 0.055,
        sight_range: 0.20,
        attack_range: 0.0,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
    // Lumbering predator with excellent vision and a big bite radius
    SpeciesDescriptor {
        name: "T-Rex",
        sprite_folder: "t_rex",
        role: Role::Predator,
        walk_speed: 0.012,
        run_speed: 0.030,
        sight_range: 0.25,
        attack_range: 0.025,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
    // Fast pack hunter
    SpeciesDescriptor {
        name: "Velociraptor",
        sprite_folder: "velociraptor",
        role: Role::Predator,
        walk_speed: 0.020,
        run_speed: 0.050,
        sight_range: 0.18,
        attack_range: 0.015,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
    SpeciesDescriptor {
        name: "Blue Raptor",
        sprite_folder: "blue_raptor",
        role: Role::Predator,
        walk_speed: 0.020,
        run_speed: 0.050,
        sight_range: 0.18,
        attack_range: 0.015,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
    SpeciesDescriptor {
        name: "Green Raptor",
        sprite_folder: "green_raptor",
        role: Role::Predator,
        walk_speed: 0.020,
        run_speed: 0.050,
        sight_range: 0.18,
        attack_range: 0.015,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
    SpeciesDescriptor {
        name: "Red Raptor",
        sprite_folder: "red_raptor",
        role: Role::Predator,
        walk_speed: 0.020,
        run_speed: 0.050,
        sight_range: 0.18,
        attack_range: 0.015,
        frames_per_action: [15, 15, 15, 15, 15, 15],
    },
];
