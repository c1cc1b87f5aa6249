//! Per-step quantities derived from the sample state.
//!
//! Every function reads column `t` of the sample and writes exactly one
//! column: `t` for the step parameters, `t + 1` for the property update.

use crate::models::sample::Sample;
use crate::numerics::solver::{SolverError, check_finite};
use crate::physics::bc::SurfaceCondition;
use crate::physics::problem::{ProblemDescription, ThermalProperties};
use nalgebra::DVector;

/// Universal gas constant in J/(mol K).
pub const GAS_CONSTANT: f64 = 8.314_462_618;

/// Stefan-Boltzmann constant in W/(m2 K4).
pub const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;

/// `Fo_i = k_i dt / (rho_i c_i dx^2)`, written to `fo[:, t]`.
pub fn calc_fourier_number(sample: &mut Sample, t: usize) {
    let scale = sample.dt / (sample.dx * sample.dx);
    for i in 0..sample.num_nodes() {
        sample.fo[(i, t)] = sample.conductivity[(i, t)] * scale
            / (sample.density[(i, t)] * sample.heat_capacity[(i, t)]);
    }
}

/// Explicit correction for the spatial variation of conductivity,
/// `k'(T) (dT/dx)^2 dt / (rho c)`, written to `upsilon[:, t]`.
///
/// With constant properties the column is set to exact zeros; the power law
/// is not evaluated.
pub fn calc_upsilon(problem: &ProblemDescription, sample: &mut Sample, t: usize) {
    let law = match problem.properties {
        ThermalProperties::Constant { .. } => {
            sample.upsilon.column_mut(t).fill(0.0);
            return;
        }
        ThermalProperties::TemperatureDependent { conductivity, .. } => conductivity,
    };

    let gradient = temperature_gradient(sample, t);
    for i in 0..sample.num_nodes() {
        let temperature = sample.temperatures[(i, t)];
        let rho_c = sample.density[(i, t)] * sample.heat_capacity[(i, t)];
        sample.upsilon[(i, t)] =
            law.derivative(temperature) * gradient[i].powi(2) * sample.dt / rho_c;
    }
}

/// `dT/dx` at column `t`: forward difference at the surface, backward at the
/// back face, central in between.
pub fn temperature_gradient(sample: &Sample, t: usize) -> DVector<f64> {
    let n = sample.num_nodes();
    let dx = sample.dx;
    let temps = sample.temperatures.column(t);
    DVector::from_fn(n, |i, _| {
        if i == 0 {
            (temps[1] - temps[0]) / dx
        } else if i == n - 1 {
            (temps[n - 1] - temps[n - 2]) / dx
        } else {
            (temps[i + 1] - temps[i - 1]) / (2.0 * dx)
        }
    })
}

/// Arrhenius reaction rate and heat release, written to `omega_dots[:, t]`
/// and `g_dots[:, t]`.
///
/// `omega_i = rho_i A exp(-E / (R T_i))`, `g_i = omega_i * dH`. Inert
/// samples get zeros.
pub fn calc_pyrolysis(sample: &mut Sample, t: usize) -> Result<(), SolverError> {
    let Some(kinetics) = sample.kinetics else {
        sample.omega_dots.column_mut(t).fill(0.0);
        sample.g_dots.column_mut(t).fill(0.0);
        return Ok(());
    };

    let n = sample.num_nodes();
    let omega = DVector::from_fn(n, |i, _| {
        sample.density[(i, t)]
            * kinetics.pre_exp_factor
            * (-kinetics.activation_energy / (GAS_CONSTANT * sample.temperatures[(i, t)])).exp()
    });
    check_finite("reaction rate", &omega, t)?;

    let g = &omega * kinetics.heat_reaction;
    check_finite("heat release", &g, t)?;

    sample.omega_dots.set_column(t, &omega);
    sample.g_dots.set_column(t, &g);
    Ok(())
}

/// Incident flux taken up by the solid at time index `index`, W/m2.
/// Zero for surfaces without an incident flux history.
pub fn absorbed_flux(sample: &Sample, index: usize) -> f64 {
    match (&sample.surface, &sample.ihf) {
        (SurfaceCondition::Robin { losses, .. }, Some(ihf)) => losses.absorptivity() * ihf[index],
        _ => 0.0,
    }
}

/// Volumetric source `kappa * q_abs * exp(-kappa * x)` in W/m3 when the
/// absorbed flux penetrates the solid, `None` when it stays at the surface.
pub fn calc_indepth_source(sample: &Sample, index: usize) -> Option<DVector<f64>> {
    let kappa = sample.indepth_absorptivity;
    if kappa <= 0.0 || !matches!(sample.surface, SurfaceCondition::Robin { .. }) {
        return None;
    }
    let q_abs = absorbed_flux(sample, index);
    Some(sample.space_mesh.map(|x| kappa * q_abs * (-kappa * x).exp()))
}

/// Properties for column `t + 1`, from the temperatures of column `t`.
///
/// A power law evaluated at a non-physical temperature (zero or negative)
/// is reported as [`SolverError::NonFinite`] for the failing property.
pub fn update_thermal_properties(
    problem: &ProblemDescription,
    sample: &mut Sample,
    t: usize,
) -> Result<(), SolverError> {
    match problem.properties {
        ThermalProperties::Constant { .. } => {
            for field in [
                &mut sample.conductivity,
                &mut sample.density,
                &mut sample.heat_capacity,
            ] {
                let current = field.column(t).clone_owned();
                field.set_column(t + 1, &current);
            }
        }
        ThermalProperties::TemperatureDependent {
            conductivity,
            density,
            heat_capacity,
        } => {
            let temps = sample.temperatures.column(t).clone_owned();
            let k = temps.map(|temp| conductivity.eval(temp));
            let rho = temps.map(|temp| density.eval(temp));
            let c = temps.map(|temp| heat_capacity.eval(temp));
            check_finite("conductivity", &k, t)?;
            check_finite("density", &rho, t)?;
            check_finite("heat capacity", &c, t)?;

            sample.conductivity.set_column(t + 1, &k);
            sample.density.set_column(t + 1, &rho);
            sample.heat_capacity.set_column(t + 1, &c);
        }
    }
    Ok(())
}
