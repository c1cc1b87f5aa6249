//! Crank-Nicolson system `A T(t+1) = b` for one time step.
//!
//! Interior rows read `-Fo/2, 1 + Fo, -Fo/2` on the implicit side and
//! `Fo/2, 1 - Fo, Fo/2` on the explicit side. Flux boundaries use a mirror
//! ghost node, which doubles the off-diagonal coupling of the end rows.

use crate::models::sample::Sample;
use crate::numerics::solver::{SolverError, check_finite};
use crate::numerics::timing::{Phase, timed};
use crate::numerics::tridiag::Tridiagonal;
use crate::physics::bc::{FluxLinearization, SurfaceCondition};
use crate::physics::parameters::{absorbed_flux, calc_indepth_source, calc_pyrolysis};
use nalgebra::DVector;

/// `dt / (rho c dx)` at node `i`, the factor applied to a boundary flux.
#[inline]
fn flux_factor(sample: &Sample, i: usize, t: usize) -> f64 {
    sample.dt / (sample.density[(i, t)] * sample.heat_capacity[(i, t)] * sample.dx)
}

/// How the surface row is closed for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceRow {
    /// Fixed surface temperature.
    Fixed(f64),
    /// Flux balance on the half cell at the surface.
    Flux(FluxLinearization),
}

/// Surface closure for step `t -> t + 1`.
pub fn surface_row(sample: &Sample, t: usize) -> SurfaceRow {
    match &sample.surface {
        SurfaceCondition::Dirichlet {
            temperature_surface,
        } => SurfaceRow::Fixed(*temperature_surface),
        SurfaceCondition::Neumann { nhf } => SurfaceRow::Flux(FluxLinearization::fixed(*nhf)),
        SurfaceCondition::Robin { losses, .. } => {
            let next = (t + 1).min(sample.num_steps() - 1);
            // absorbed in depth instead, see calc_indepth_source
            let (q_now, q_next) = if sample.indepth_absorptivity > 0.0 {
                (0.0, 0.0)
            } else {
                (absorbed_flux(sample, t), absorbed_flux(sample, next))
            };
            let t_surface = sample.temperatures[(0, t)];
            SurfaceRow::Flux(FluxLinearization::with_loss(
                q_now,
                q_next,
                losses.loss(t_surface, sample.temperature_ambient),
                losses.loss_slope(t_surface),
                t_surface,
            ))
        }
    }
}

/// Implicit matrix `A` for step `t -> t + 1`.
pub fn assemble_system_matrix(sample: &Sample, t: usize) -> Tridiagonal {
    let n = sample.num_nodes();
    let last = n - 1;
    let mut a = Tridiagonal::zeros(n);

    for i in 1..last {
        let fo = sample.fo[(i, t)];
        a.set_row(i, -0.5 * fo, 1.0 + fo, -0.5 * fo);
    }

    match surface_row(sample, t) {
        SurfaceRow::Fixed(_) => a.set_row(0, 0.0, 1.0, 0.0),
        SurfaceRow::Flux(flux) => {
            let fo = sample.fo[(0, t)];
            a.set_row(0, 0.0, 1.0 + fo + flux_factor(sample, 0, t) * flux.h, -fo);
        }
    }

    let fo = sample.fo[(last, t)];
    let h_back = sample.back.loss_coefficient(sample.dx);
    a.set_row(
        last,
        -fo,
        1.0 + fo + flux_factor(sample, last, t) * h_back,
        0.0,
    );
    a
}

/// Right-hand side `b` for step `t -> t + 1`.
///
/// Runs [`calc_pyrolysis`] for column `t` first, so `omega_dots` and
/// `g_dots` are up to date once this returns.
pub fn assemble_rhs_vector(sample: &mut Sample, t: usize) -> Result<DVector<f64>, SolverError> {
    timed(Phase::Reaction, || calc_pyrolysis(sample, t))?;
    timed(Phase::Assembly, || explicit_side(sample, t))
}

fn explicit_side(sample: &Sample, t: usize) -> Result<DVector<f64>, SolverError> {
    let n = sample.num_nodes();
    let last = n - 1;
    let capacity = sample.capacity_factor(t);
    let temps = sample.temperatures.column(t);
    let fo = sample.fo.column(t);

    // explicit sources, every node
    let mut b = DVector::from_fn(n, |i, _| {
        sample.upsilon[(i, t)] - sample.g_dots[(i, t)] * capacity[i]
    });

    for i in 1..last {
        b[i] += 0.5 * fo[i] * temps[i - 1] + (1.0 - fo[i]) * temps[i] + 0.5 * fo[i] * temps[i + 1];
    }

    if let Some(source) = calc_indepth_source(sample, t) {
        let next = (t + 1).min(sample.num_steps() - 1);
        let source_next = calc_indepth_source(sample, next).unwrap_or_else(|| source.clone());
        for i in 0..n {
            b[i] += 0.5 * (source[i] + source_next[i]) * capacity[i];
        }
    }

    match surface_row(sample, t) {
        SurfaceRow::Fixed(temperature) => b[0] = temperature,
        SurfaceRow::Flux(flux) => {
            b[0] += (1.0 - fo[0]) * temps[0] + fo[0] * temps[1] + flux_factor(sample, 0, t) * flux.q;
        }
    }

    let h_back = sample.back.loss_coefficient(sample.dx);
    b[last] += fo[last] * temps[last - 1]
        + (1.0 - fo[last]) * temps[last]
        + flux_factor(sample, last, t)
            * (2.0 * h_back * sample.temperature_ambient - h_back * temps[last]);

    check_finite("right-hand side", &b, t)?;
    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::bc::{BackCondition, IncidentHeatFlux, SurfaceLosses};
    use crate::physics::parameters::calc_fourier_number;
    use crate::physics::problem::pmma_demo_problem;

    fn prepared(surface: SurfaceCondition, back: BackCondition) -> Sample {
        let mut problem = pmma_demo_problem();
        problem.boundcond_surface = surface;
        problem.boundcond_back = back;
        let mut sample = Sample::new(&problem).unwrap();
        calc_fourier_number(&mut sample, 0);
        sample
    }

    #[test]
    fn interior_rows_are_crank_nicolson() {
        let sample = prepared(SurfaceCondition::Neumann { nhf: 0.0 }, BackCondition::Insulated);
        let a = assemble_system_matrix(&sample, 0);
        let fo = sample.fo[(10, 0)];
        assert_eq!(a.lower[10], -0.5 * fo);
        assert_eq!(a.diag[10], 1.0 + fo);
        assert_eq!(a.upper[10], -0.5 * fo);
    }

    #[test]
    fn dirichlet_row_pins_the_surface() {
        let mut sample = prepared(
            SurfaceCondition::Dirichlet {
                temperature_surface: 800.0,
            },
            BackCondition::Insulated,
        );
        let a = assemble_system_matrix(&sample, 0);
        assert_eq!((a.diag[0], a.upper[0]), (1.0, 0.0));

        let b = assemble_rhs_vector(&mut sample, 0).unwrap();
        assert_eq!(b[0], 800.0);
    }

    #[test]
    fn insulated_rows_use_the_mirror_node() {
        let mut sample = prepared(SurfaceCondition::Neumann { nhf: 0.0 }, BackCondition::Insulated);
        let a = assemble_system_matrix(&sample, 0);
        let n = sample.num_nodes();
        let fo = sample.fo[(n - 1, 0)];
        assert_eq!(a.lower[n - 1], -fo);
        assert_eq!(a.diag[n - 1], 1.0 + fo);
        assert_eq!(a.upper[0], -sample.fo[(0, 0)]);

        // uniform field with no flux stays put
        let b = assemble_rhs_vector(&mut sample, 0).unwrap();
        let next = a.solve(&b).unwrap();
        assert!(next.iter().all(|&t| (t - 288.0).abs() < 1e-9));
    }

    #[test]
    fn neumann_flux_enters_the_surface_row() {
        let nhf = 10_000.0;
        let mut sample = prepared(SurfaceCondition::Neumann { nhf }, BackCondition::Insulated);
        let b = assemble_rhs_vector(&mut sample, 0).unwrap();
        let expected = 288.0 + flux_factor(&sample, 0, 0) * 2.0 * nhf;
        assert!((b[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn robin_losses_vanish_at_ambient() {
        let surface = SurfaceCondition::Robin {
            ihf: IncidentHeatFlux::Constant { value: 0.0 },
            losses: SurfaceLosses::Linear { h_total: 20.0 },
        };
        let mut sample = prepared(surface, BackCondition::Insulated);
        let a = assemble_system_matrix(&sample, 0);
        let b = assemble_rhs_vector(&mut sample, 0).unwrap();
        let gamma = flux_factor(&sample, 0, 0);

        assert!((a.diag[0] - (1.0 + sample.fo[(0, 0)] + gamma * 20.0)).abs() < 1e-12);
        let next = a.solve(&b).unwrap();
        assert!((next[0] - 288.0).abs() < 1e-9);
    }

    #[test]
    fn conductive_back_losses_add_a_sink() {
        let mut sample = prepared(
            SurfaceCondition::Neumann { nhf: 0.0 },
            BackCondition::ConductiveLosses {
                conductivity_subs: 0.5,
            },
        );
        let n = sample.num_nodes();
        sample.temperatures[(n - 1, 0)] = 400.0;
        let a = assemble_system_matrix(&sample, 0);
        let h_back = 0.5 / sample.dx;
        let gamma = flux_factor(&sample, n - 1, 0);
        assert!((a.diag[n - 1] - (1.0 + sample.fo[(n - 1, 0)] + gamma * h_back)).abs() < 1e-12);

        let insulated = {
            let mut s = sample.clone();
            s.back = BackCondition::Insulated;
            assemble_rhs_vector(&mut s, 0).unwrap()
        };
        let b = assemble_rhs_vector(&mut sample, 0).unwrap();
        let shift = gamma * (2.0 * h_back * 288.0 - h_back * 400.0);
        assert!((b[n - 1] - insulated[n - 1] - shift).abs() < 1e-9);
    }

    #[test]
    fn indepth_absorption_moves_flux_off_the_surface() {
        let mut problem = pmma_demo_problem();
        problem.indepth_absorptivity = 500.0;
        let mut sample = Sample::new(&problem).unwrap();
        calc_fourier_number(&mut sample, 0);

        let SurfaceRow::Flux(flux) = surface_row(&sample, 0) else {
            panic!("robin surface must give a flux row");
        };
        // only the linearised losses remain
        assert!((flux.q - flux.h * 288.0).abs() < 1e-9);

        let b = assemble_rhs_vector(&mut sample, 0).unwrap();
        assert!(b[1] > 288.0);
        assert!(b[1] > b[50]);
    }
}
