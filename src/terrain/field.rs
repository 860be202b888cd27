//! Cached, interpolated terrain sampler
//!
//! Answers "what is the ground/water situation at (x, y)" cheaply from
//! CPU-side grids refreshed on a throttled cadence from a [`TerrainSource`].
//! Queries are pure: no I/O, no logging, fallback values instead of errors.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::terrain::source::TerrainSource;

/// Terrain classification at a sampled point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Regular terrain above water
    #[default]
    Normal,
    /// Water depth exceeds the underwater threshold
    Water,
    /// Terrain elevation below the lava threshold
    Lava,
}

/// Result of a terrain query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    /// Sand surface elevation
    pub terrain_height: f32,
    /// Water surface elevation (terrain + water column)
    pub water_surface_height: f32,
    /// Water depth, 0 if dry
    pub water_depth: f32,
    pub kind: TerrainKind,
    /// False until the field has completed at least one refresh
    pub valid: bool,
}

/// Cached elevation/water grid with bilinear point queries
#[derive(Debug, Clone)]
pub struct TerrainField {
    grid_width: usize,
    grid_height: usize,
    terrain_grid: Vec<f32>,
    water_grid: Vec<f32>,
    domain_min: Vec3,
    domain_max: Vec3,

    lava_threshold: f32,
    water_depth_threshold: f32,

    valid: bool,
    refresh_counter: u32,
    refresh_interval: u32,
}

impl TerrainField {
    pub fn new(source: &dyn TerrainSource) -> Self {
        let [grid_width, grid_height] = source.grid_size();
        let (domain_min, domain_max) = source.domain();
        Self {
            grid_width,
            grid_height,
            terrain_grid: vec![0.0; grid_width * grid_height],
            water_grid: vec![0.0; grid_width * grid_height],
            domain_min,
            domain_max,
            lava_threshold: -10.0,
            water_depth_threshold: 0.5,
            valid: false,
            refresh_counter: 0,
            refresh_interval: 5,
        }
    }

    /// Pull fresh grids from the source, subject to throttling: only one
    /// call in every `refresh_interval` performs the expensive read.
    ///
    /// After the first completed refresh the field stays valid forever,
    /// serving stale data between refreshes.
    pub fn refresh(&mut self, source: &mut dyn TerrainSource) {
        self.refresh_counter += 1;
        if self.refresh_counter < self.refresh_interval {
            return;
        }
        self.refresh_counter = 0;

        source.read_terrain(&mut self.terrain_grid);
        source.read_water(&mut self.water_grid);
        self.valid = true;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Query terrain at world coordinates.
    ///
    /// Coordinates outside the domain are clamped to the border, never
    /// rejected. Before the first refresh, returns the domain z-midpoint
    /// with zero depth and `valid = false`.
    pub fn query(&self, world_x: f32, world_y: f32) -> TerrainSample {
        if !self.valid {
            let mid = (self.domain_min.z + self.domain_max.z) * 0.5;
            return TerrainSample {
                terrain_height: mid,
                water_surface_height: mid,
                water_depth: 0.0,
                kind: TerrainKind::Normal,
                valid: false,
            };
        }

        // Map world coordinates to normalized [0,1], clamping outside points
        // to the nearest border cell
        let nx = ((world_x - self.domain_min.x) / (self.domain_max.x - self.domain_min.x))
            .clamp(0.0, 1.0);
        let ny = ((world_y - self.domain_min.y) / (self.domain_max.y - self.domain_min.y))
            .clamp(0.0, 1.0);

        let gx = nx * (self.grid_width - 1) as f32;
        let gy = ny * (self.grid_height - 1) as f32;

        let terrain_height = self.sample_bilinear(&self.terrain_grid, gx, gy);
        let water_surface_height = self.sample_bilinear(&self.water_grid, gx, gy);
        let water_depth = (water_surface_height - terrain_height).max(0.0);

        let kind = if terrain_height < self.lava_threshold {
            TerrainKind::Lava
        } else if water_depth > self.water_depth_threshold {
            TerrainKind::Water
        } else {
            TerrainKind::Normal
        };

        TerrainSample {
            terrain_height,
            water_surface_height,
            water_depth,
            kind,
            valid: true,
        }
    }

    /// Bilinear interpolation over the four grid cells enclosing (x, y),
    /// in grid coordinates
    fn sample_bilinear(&self, grid: &[f32], x: f32, y: f32) -> f32 {
        let x = x.clamp(0.0, (self.grid_width - 1) as f32);
        let y = y.clamp(0.0, (self.grid_height - 1) as f32);

        let x0 = x as usize;
        let y0 = y as usize;
        let x1 = (x0 + 1).min(self.grid_width - 1);
        let y1 = (y0 + 1).min(self.grid_height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let v00 = grid[y0 * self.grid_width + x0];
        let v10 = grid[y0 * self.grid_width + x1];
        let v01 = grid[y1 * self.grid_width + x0];
        let v11 = grid[y1 * self.grid_width + x1];

        let v0 = v00 * (1.0 - fx) + v10 * fx;
        let v1 = v01 * (1.0 - fx) + v11 * fx;
        v0 * (1.0 - fy) + v1 * fy
    }

    pub fn set_lava_threshold(&mut self, threshold: f32) {
        self.lava_threshold = threshold;
    }

    pub fn set_water_depth_threshold(&mut self, threshold: f32) {
        self.water_depth_threshold = threshold;
    }

    /// Set the refresh throttle; clamped to at least 1
    pub fn set_refresh_interval(&mut self, interval: u32) {
        self.refresh_interval = interval.max(1);
    }

    pub fn domain(&self) -> (Vec3, Vec3) {
        (self.domain_min, self.domain_max)
    }
}
