//! Species catalog and sprite key construction

pub mod catalog;

pub use catalog::{sprite_sheet_path, Action, Role, Species, SpeciesDescriptor, ACTION_COUNT};
