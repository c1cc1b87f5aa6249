//! Closed-form temperatures of a semi-infinite solid with constant
//! properties, initially at a uniform temperature.

use nalgebra::DVector;
use std::f64::consts::PI;

/// Complementary error function, Abramowitz & Stegun 7.1.26
/// (absolute error below 1.5e-7).
pub fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    poly * (-x * x).exp()
}

pub fn erf(x: f64) -> f64 {
    1.0 - erfc(x)
}

/// Surface held at `t_surface` from `t = 0`:
/// `T = T_s + (T_i - T_s) erf(x / (2 sqrt(alpha t)))`.
pub fn dirichlet_temperature(
    x: f64,
    time: f64,
    diffusivity: f64,
    t_initial: f64,
    t_surface: f64,
) -> f64 {
    if time <= 0.0 {
        return if x <= 0.0 { t_surface } else { t_initial };
    }
    let eta = x / (2.0 * (diffusivity * time).sqrt());
    t_surface + (t_initial - t_surface) * erf(eta)
}

/// Constant net flux `q` into the surface from `t = 0`.
pub fn neumann_temperature(
    x: f64,
    time: f64,
    conductivity: f64,
    diffusivity: f64,
    t_initial: f64,
    flux: f64,
) -> f64 {
    if time <= 0.0 {
        return t_initial;
    }
    let spread = (diffusivity * time).sqrt();
    let eta = x / (2.0 * spread);
    t_initial
        + 2.0 * flux / conductivity * spread / PI.sqrt() * (-eta * eta).exp()
        - flux * x / conductivity * erfc(eta)
}

pub fn dirichlet_profile(
    space_mesh: &DVector<f64>,
    time: f64,
    diffusivity: f64,
    t_initial: f64,
    t_surface: f64,
) -> DVector<f64> {
    space_mesh.map(|x| dirichlet_temperature(x, time, diffusivity, t_initial, t_surface))
}

pub fn neumann_profile(
    space_mesh: &DVector<f64>,
    time: f64,
    conductivity: f64,
    diffusivity: f64,
    t_initial: f64,
    flux: f64,
) -> DVector<f64> {
    space_mesh.map(|x| neumann_temperature(x, time, conductivity, diffusivity, t_initial, flux))
}
