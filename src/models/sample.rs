use crate::discretization::mesh::Grid;
use crate::physics::bc::{BackCondition, SurfaceCondition};
use crate::physics::problem::{ConfigError, ProblemDescription, PyrolysisKinetics};
use nalgebra::{DMatrix, DVector};

/// Number of `N x T` fields held by a [`Sample`].
pub const FIELD_COUNT: usize = 8;

/// Discretised state of the solid over the whole run.
///
/// Every time-indexed field is an `N x T` matrix: one row per node of
/// `space_mesh`, one column per point of `temporal_mesh`. Columns are stored
/// contiguously, so a time level is a single slice.
#[derive(Debug, Clone)]
pub struct Sample {
    // geometry
    pub depth: f64,
    pub time_total: f64,
    pub space_mesh: DVector<f64>,
    pub temporal_mesh: DVector<f64>,
    pub dx: f64,
    pub dt: f64,

    // properties at t = 0
    pub diffusivity: f64,
    pub thermal_inertia: f64,

    // thermal environment
    pub temperature_ambient: f64,
    pub surface: SurfaceCondition,
    pub back: BackCondition,
    /// Incident heat flux at every time point, Robin surfaces only.
    pub ihf: Option<DVector<f64>>,
    pub indepth_absorptivity: f64,

    // pyrolysis
    pub kinetics: Option<PyrolysisKinetics>,

    // time-indexed fields
    pub conductivity: DMatrix<f64>,
    pub density: DMatrix<f64>,
    pub heat_capacity: DMatrix<f64>,
    pub fo: DMatrix<f64>,
    pub upsilon: DMatrix<f64>,
    pub temperatures: DMatrix<f64>,
    pub omega_dots: DMatrix<f64>,
    pub g_dots: DMatrix<f64>,
}

impl Sample {
    /// Bytes the time-indexed fields of a sample for `problem` would take,
    /// computed without allocating them. Saturates on overflow.
    pub fn storage_bytes(problem: &ProblemDescription) -> usize {
        let (nodes, steps) = Grid::dimensions(
            problem.geometry.depth,
            problem.geometry.x_divisions,
            problem.geometry.time_total,
            problem.properties.base_diffusivity(),
        );
        [FIELD_COUNT, std::mem::size_of::<f64>(), nodes, steps]
            .into_iter()
            .try_fold(1usize, usize::checked_mul)
            .unwrap_or(usize::MAX)
    }

    /// Builds the grids and writes the first column of the property and
    /// temperature fields.
    pub fn new(problem: &ProblemDescription) -> Result<Self, ConfigError> {
        problem.validate()?;

        let geometry = problem.geometry;
        let [k, rho, c] = problem.properties.laws();
        let diffusivity = problem.properties.base_diffusivity();
        let grid = Grid::new(
            geometry.depth,
            geometry.x_divisions,
            geometry.time_total,
            diffusivity,
        );

        let n = grid.num_nodes();
        let steps = grid.num_steps();
        let field = || DMatrix::<f64>::zeros(n, steps);

        let mut sample = Self {
            depth: geometry.depth,
            time_total: geometry.time_total,
            dx: grid.dx,
            dt: grid.dt,
            diffusivity,
            thermal_inertia: k.base * rho.base * c.base,
            temperature_ambient: problem.temperature_ambient,
            surface: problem.boundcond_surface.clone(),
            back: problem.boundcond_back,
            ihf: match &problem.boundcond_surface {
                SurfaceCondition::Robin { ihf, .. } => {
                    Some(grid.temporal_mesh.map(|t| ihf.at(t)))
                }
                _ => None,
            },
            indepth_absorptivity: problem.indepth_absorptivity,
            kinetics: problem.material_type.kinetics(),
            conductivity: field(),
            density: field(),
            heat_capacity: field(),
            fo: field(),
            upsilon: field(),
            temperatures: field(),
            omega_dots: field(),
            g_dots: field(),
            space_mesh: grid.space_mesh,
            temporal_mesh: grid.temporal_mesh,
        };

        if steps > 0 {
            // temperature dependence only starts at step 1
            sample.conductivity.column_mut(0).fill(k.base);
            sample.density.column_mut(0).fill(rho.base);
            sample.heat_capacity.column_mut(0).fill(c.base);
            let initial = problem.temperature_initial.to_profile(n);
            sample
                .temperatures
                .column_mut(0)
                .copy_from_slice(&initial);
        }

        sample.check_dimensions();
        Ok(sample)
    }

    pub fn num_nodes(&self) -> usize {
        self.space_mesh.len()
    }

    pub fn num_steps(&self) -> usize {
        self.temporal_mesh.len()
    }

    /// Panics if a field does not match the grid. A mismatch can only come
    /// from a construction bug.
    pub fn check_dimensions(&self) {
        let shape = (self.num_nodes(), self.num_steps());
        for (name, field) in [
            ("conductivity", &self.conductivity),
            ("density", &self.density),
            ("heat_capacity", &self.heat_capacity),
            ("fo", &self.fo),
            ("upsilon", &self.upsilon),
            ("temperatures", &self.temperatures),
            ("omega_dots", &self.omega_dots),
            ("g_dots", &self.g_dots),
        ] {
            assert_eq!(
                field.shape(),
                shape,
                "field {name} has shape {:?}, grid is {:?}",
                field.shape(),
                shape
            );
        }
        if let Some(ihf) = &self.ihf {
            assert_eq!(ihf.len(), self.num_steps(), "ihf series does not match the time grid");
        }
    }

    /// Stored heat `sum(w_i rho_i c_i T_i dx)` in J/m2 at time index `t`,
    /// with half weights on the two end nodes.
    pub fn thermal_energy(&self, t: usize) -> f64 {
        let n = self.num_nodes();
        (0..n)
            .map(|i| {
                let weight = if i == 0 || i == n - 1 { 0.5 } else { 1.0 };
                weight
                    * self.density[(i, t)]
                    * self.heat_capacity[(i, t)]
                    * self.temperatures[(i, t)]
                    * self.dx
            })
            .sum()
    }

    /// `dt / (rho c)` at every node for time index `t`.
    pub fn capacity_factor(&self, t: usize) -> DVector<f64> {
        DVector::from_fn(self.num_nodes(), |i, _| {
            self.dt / (self.density[(i, t)] * self.heat_capacity[(i, t)])
        })
    }
}
