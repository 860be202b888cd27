//! Sandfauna - creature ecosystem simulation for interactive sandbox terrain
//!
//! A population of autonomous creature agents lives on a dynamically
//! sampled terrain surface. Herbivores graze, herd, and flee from
//! predators, hands, and lava; predators patrol, hunt, and attack. The
//! driver supplies elapsed time and hazard points each tick; an external
//! renderer reads the population snapshot and resolves sprites through
//! the species catalog.

pub mod core;
pub mod ecosystem;
pub mod species;
pub mod terrain;
