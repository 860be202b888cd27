//! Terrain data providers
//!
//! Two backends feed elevation data into the simulation. The grid source
//! models the expensive external readback (in the exhibit, GPU textures
//! pulled over the bus); the height source is a degenerate per-point
//! fallback with no water information.

use crate::core::types::Vec3;

/// Provider of full terrain and water-surface grids over a world domain.
///
/// Reads are expensive; the terrain field throttles how often they happen.
/// Both grids must be `grid_size()[0] * grid_size()[1]` cells, row-major,
/// covering the domain uniformly.
pub trait TerrainSource {
    /// Grid dimensions as [width, height]
    fn grid_size(&self) -> [usize; 2];

    /// World-space box covered by the grids, as (min, max) corners
    fn domain(&self) -> (Vec3, Vec3);

    /// Read the terrain elevation grid into `out`
    fn read_terrain(&mut self, out: &mut [f32]);

    /// Read the water-surface elevation grid into `out`
    fn read_water(&mut self, out: &mut [f32]);
}

/// Direct per-point elevation function, used as a fallback when grid data
/// is unavailable. Carries no water information and is never used for
/// hazard classification.
pub trait HeightSource {
    fn height_at(&self, x: f32, y: f32) -> f32;
}

impl<F> HeightSource for F
where
    F: Fn(f32, f32) -> f32,
{
    fn height_at(&self, x: f32, y: f32) -> f32 {
        self(x, y)
    }
}

/// In-memory terrain source backed by owned grids.
///
/// Used by the headless driver and by tests; stands in for the exhibit's
/// texture readback path.
#[derive(Debug, Clone)]
pub struct StaticGridSource {
    width: usize,
    height: usize,
    domain_min: Vec3,
    domain_max: Vec3,
    terrain: Vec<f32>,
    water: Vec<f32>,
}

impl StaticGridSource {
    pub fn new(
        width: usize,
        height: usize,
        domain_min: Vec3,
        domain_max: Vec3,
        terrain: Vec<f32>,
        water: Vec<f32>,
    ) -> Self {
        assert_eq!(terrain.len(), width * height);
        assert_eq!(water.len(), width * height);
        Self {
            width,
            height,
            domain_min,
            domain_max,
            terrain,
            water,
        }
    }

    /// Flat terrain at a constant elevation with no standing water
    pub fn flat(width: usize, height: usize, domain_min: Vec3, domain_max: Vec3, elevation: f32) -> Self {
        let cells = width * height;
        Self::new(
            width,
            height,
            domain_min,
            domain_max,
            vec![elevation; cells],
            vec![elevation; cells],
        )
    }

    pub fn terrain_mut(&mut self) -> &mut [f32] {
        &mut self.terrain
    }

    pub fn water_mut(&mut self) -> &mut [f32] {
        &mut self.water
    }
}

impl TerrainSource for StaticGridSource {
    fn grid_size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    fn domain(&self) -> (Vec3, Vec3) {
        (self.domain_min, self.domain_max)
    }

    fn read_terrain(&mut self, out: &mut [f32]) {
        out.copy_from_slice(&self.terrain);
    }

    fn read_water(&mut self, out: &mut [f32]) {
        out.copy_from_slice(&self.water);
    }
}
