use crate::physics::parameters::STEFAN_BOLTZMANN;
use crate::physics::problem::ConfigError;
use serde::{Deserialize, Serialize};

/// Thermal condition at the exposed surface (x = 0).
///
/// Heat fluxes are positive into the solid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceCondition {
    /// Fixed surface temperature in K.
    Dirichlet { temperature_surface: f64 },
    /// Fixed net heat flux in W/m2.
    #[serde(alias = "neunman")]
    Neumann { nhf: f64 },
    /// Incident heat flux balanced by surface losses to the environment.
    Robin {
        ihf: IncidentHeatFlux,
        losses: SurfaceLosses,
    },
}

/// Incident heat flux history in W/m2, `t` in s.
///
/// Besides the named fields, every type also parses from a flat
/// `"coefficients"` list, see [`IncidentHeatFlux::from_coefficients`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "FluxInput")]
pub enum IncidentHeatFlux {
    Constant {
        value: f64,
    },
    /// `sum_i coefficients[i] * t^i`, lowest order first.
    Polynomial {
        coefficients: Vec<f64>,
    },
    /// `amplitude * sin(angular_frequency * t + phase)`.
    Sinusoidal {
        amplitude: f64,
        angular_frequency: f64,
        phase: f64,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FluxInput {
    Tabulated {
        #[serde(rename = "type")]
        kind: String,
        coefficients: Vec<f64>,
    },
    Constant {
        #[serde(rename = "type")]
        kind: String,
        value: f64,
    },
    Sinusoidal {
        #[serde(rename = "type")]
        kind: String,
        amplitude: f64,
        angular_frequency: f64,
        phase: f64,
    },
}

impl TryFrom<FluxInput> for IncidentHeatFlux {
    type Error = ConfigError;

    fn try_from(input: FluxInput) -> Result<Self, Self::Error> {
        match input {
            FluxInput::Tabulated { kind, coefficients } => {
                Self::from_coefficients(&kind, &coefficients)
            }
            FluxInput::Constant { kind, value } => Self::from_coefficients(&kind, &[value]),
            FluxInput::Sinusoidal {
                kind,
                amplitude,
                angular_frequency,
                phase,
            } => Self::from_coefficients(&kind, &[amplitude, angular_frequency, phase]),
        }
    }
}

impl IncidentHeatFlux {
    /// Build a flux from a flat coefficient list, the way flux histories are
    /// usually tabulated: one value for a constant, the polynomial
    /// coefficients, or `(amplitude, angular_frequency, phase)`.
    pub fn from_coefficients(kind: &str, coefficients: &[f64]) -> Result<Self, ConfigError> {
        match kind {
            "constant" => match coefficients {
                [value] => Ok(IncidentHeatFlux::Constant { value: *value }),
                _ => Err(ConfigError::ConstantCoefficients(coefficients.len())),
            },
            "polynomial" => {
                if coefficients.is_empty() {
                    Err(ConfigError::EmptyPolynomial)
                } else {
                    Ok(IncidentHeatFlux::Polynomial {
                        coefficients: coefficients.to_vec(),
                    })
                }
            }
            "sinusoidal" => match coefficients {
                [amplitude, angular_frequency, phase] => Ok(IncidentHeatFlux::Sinusoidal {
                    amplitude: *amplitude,
                    angular_frequency: *angular_frequency,
                    phase: *phase,
                }),
                _ => Err(ConfigError::SinusoidalCoefficients(coefficients.len())),
            },
            other => Err(ConfigError::UnknownFluxType(other.to_string())),
        }
    }

    pub fn at(&self, t: f64) -> f64 {
        match self {
            IncidentHeatFlux::Constant { value } => *value,
            // Horner, highest order first
            IncidentHeatFlux::Polynomial { coefficients } => {
                coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
            }
            IncidentHeatFlux::Sinusoidal {
                amplitude,
                angular_frequency,
                phase,
            } => amplitude * (angular_frequency * t + phase).sin(),
        }
    }
}

/// Heat lost from the exposed surface to the environment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceLosses {
    /// `h_total * (T - T_amb)`; all incident flux is absorbed.
    Linear { h_total: f64 },
    /// `h_convective * (T - T_amb) + emissivity * sigma * (T^4 - T_amb^4)`;
    /// a fraction `absorptivity` of the incident flux is absorbed.
    #[serde(alias = "non-linear")]
    NonLinear {
        h_convective: f64,
        absorptivity: f64,
        emissivity: f64,
    },
}

impl SurfaceLosses {
    /// Fraction of the incident flux taken up by the solid.
    pub fn absorptivity(&self) -> f64 {
        match *self {
            SurfaceLosses::Linear { .. } => 1.0,
            SurfaceLosses::NonLinear { absorptivity, .. } => absorptivity,
        }
    }

    /// Loss flux in W/m2 at surface temperature `t_surface`.
    pub fn loss(&self, t_surface: f64, t_ambient: f64) -> f64 {
        match *self {
            SurfaceLosses::Linear { h_total } => h_total * (t_surface - t_ambient),
            SurfaceLosses::NonLinear {
                h_convective,
                emissivity,
                ..
            } => {
                h_convective * (t_surface - t_ambient)
                    + emissivity * STEFAN_BOLTZMANN * (t_surface.powi(4) - t_ambient.powi(4))
            }
        }
    }

    /// `d(loss)/dT`, the effective heat transfer coefficient at `t_surface`.
    pub fn loss_slope(&self, t_surface: f64) -> f64 {
        match *self {
            SurfaceLosses::Linear { h_total } => h_total,
            SurfaceLosses::NonLinear {
                h_convective,
                emissivity,
                ..
            } => h_convective + 4.0 * emissivity * STEFAN_BOLTZMANN * t_surface.powi(3),
        }
    }
}

/// Thermal condition at the back face (x = depth).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackCondition {
    /// Zero heat flux.
    Insulated,
    /// Conduction into a substrate held at ambient temperature one node
    /// spacing behind the back face. Contact resistance is neglected.
    ConductiveLosses { conductivity_subs: f64 },
}

impl BackCondition {
    /// Linear heat transfer coefficient to the substrate in W/m2K.
    pub fn loss_coefficient(&self, dx: f64) -> f64 {
        match *self {
            BackCondition::Insulated => 0.0,
            BackCondition::ConductiveLosses { conductivity_subs } => conductivity_subs / dx,
        }
    }
}

/// Crank-Nicolson treatment of a flux boundary.
///
/// The time-averaged flux into the boundary node is written as
/// `(q - h * T_next) / 2`, so the implicit diagonal gains `gamma * h` and the
/// right-hand side gains `gamma * q`, with `gamma = dt / (rho c dx)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluxLinearization {
    pub h: f64,
    pub q: f64,
}

impl FluxLinearization {
    /// Prescribed flux, identical at both time levels.
    pub fn fixed(flux: f64) -> Self {
        Self {
            h: 0.0,
            q: 2.0 * flux,
        }
    }

    /// Absorbed flux `q_in` at both time levels minus a loss linearised about
    /// the current node temperature.
    #[inline]
    pub fn with_loss(q_in_now: f64, q_in_next: f64, loss: f64, slope: f64, t_node: f64) -> Self {
        Self {
            h: slope,
            q: q_in_now + q_in_next - 2.0 * loss + slope * t_node,
        }
    }
}
