use super::generator::{arange, arange_len, linspace, stable_time_step};
use nalgebra::DVector;

/// Space and time grids shared by every field of a sample.
///
/// Both grids are uniform. `dx` and `dt` are fixed for the whole run: the
/// time step comes from the diffusivity at construction and is never
/// recomputed, even when the properties later depend on temperature.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Node positions from the exposed surface (x = 0) to the back face.
    pub space_mesh: DVector<f64>,
    /// Time points `k * dt` covering `[0, time_total)`.
    pub temporal_mesh: DVector<f64>,
    pub dx: f64,
    pub dt: f64,
}

impl Grid {
    pub fn new(depth: f64, x_divisions: usize, time_total: f64, diffusivity: f64) -> Self {
        let space_mesh = linspace(0.0, depth, x_divisions);
        let dx = node_spacing(depth, x_divisions);
        let dt = stable_time_step(dx, diffusivity);
        let temporal_mesh = arange(0.0, time_total, dt);

        Self {
            space_mesh,
            temporal_mesh,
            dx,
            dt,
        }
    }

    /// `(nodes, time points)` that [`Grid::new`] would produce, without
    /// building either mesh.
    pub fn dimensions(
        depth: f64,
        x_divisions: usize,
        time_total: f64,
        diffusivity: f64,
    ) -> (usize, usize) {
        let dt = stable_time_step(node_spacing(depth, x_divisions), diffusivity);
        (x_divisions, arange_len(0.0, time_total, dt))
    }

    /// Number of spatial nodes (rows of every field).
    pub fn num_nodes(&self) -> usize {
        self.space_mesh.len()
    }

    /// Number of time points (columns of every field).
    pub fn num_steps(&self) -> usize {
        self.temporal_mesh.len()
    }
}

fn node_spacing(depth: f64, x_divisions: usize) -> f64 {
    depth / (x_divisions as f64 - 1.0)
}
