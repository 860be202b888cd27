//! Terrain sampling: cached grid field and direct height fallback

pub mod field;
pub mod source;

pub use field::{TerrainField, TerrainKind, TerrainSample};
pub use source::{HeightSource, StaticGridSource, TerrainSource};
