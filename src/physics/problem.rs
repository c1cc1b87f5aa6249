use crate::physics::bc::{BackCondition, IncidentHeatFlux, SurfaceCondition, SurfaceLosses};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Reference temperature of the property power law `X(T) = X0 (T / 300)^n`.
pub const REFERENCE_TEMPERATURE: f64 = 300.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must lie in [0, 1], got {value}")]
    NotAFraction { field: &'static str, value: f64 },
    #[error("x_divisions must be at least 3, got {0}")]
    TooFewDivisions(usize),
    #[error("temperature_initial has {got} values but x_divisions is {expected}")]
    InitialProfileLength { expected: usize, got: usize },
    #[error("constant incident heat flux needs exactly 1 coefficient, got {0}")]
    ConstantCoefficients(usize),
    #[error("polynomial incident heat flux needs at least one coefficient")]
    EmptyPolynomial,
    #[error("sinusoidal incident heat flux needs exactly 3 coefficients, got {0}")]
    SinusoidalCoefficients(usize),
    #[error("unknown incident heat flux type {0:?}")]
    UnknownFluxType(String),
    #[error("failed to parse problem description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read problem description: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    Direct,
    Inverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Sample depth in m.
    pub depth: f64,
    /// Number of spatial nodes, surface and back face included.
    pub x_divisions: usize,
    /// Simulated time in s.
    pub time_total: f64,
}

/// Temperature-dependent property `X(T) = base * (T / 300)^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyLaw {
    pub base: f64,
    pub exponent: f64,
}

impl PropertyLaw {
    pub fn constant(base: f64) -> Self {
        Self {
            base,
            exponent: 0.0,
        }
    }

    pub fn eval(&self, temperature: f64) -> f64 {
        self.base * (temperature / REFERENCE_TEMPERATURE).powf(self.exponent)
    }

    /// `dX/dT` of the power law.
    pub fn derivative(&self, temperature: f64) -> f64 {
        self.exponent * self.base / REFERENCE_TEMPERATURE
            * (temperature / REFERENCE_TEMPERATURE).powf(self.exponent - 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThermalProperties {
    /// Conductivity in W/mK, density in kg/m3, heat capacity in J/kgK.
    Constant {
        conductivity: f64,
        density: f64,
        heat_capacity: f64,
    },
    TemperatureDependent {
        conductivity: PropertyLaw,
        density: PropertyLaw,
        heat_capacity: PropertyLaw,
    },
}

impl ThermalProperties {
    pub fn is_temperature_dependent(&self) -> bool {
        matches!(self, ThermalProperties::TemperatureDependent { .. })
    }

    /// Laws for (conductivity, density, heat capacity). Constant properties
    /// map to zero exponents.
    pub fn laws(&self) -> [PropertyLaw; 3] {
        match *self {
            ThermalProperties::Constant {
                conductivity,
                density,
                heat_capacity,
            } => [
                PropertyLaw::constant(conductivity),
                PropertyLaw::constant(density),
                PropertyLaw::constant(heat_capacity),
            ],
            ThermalProperties::TemperatureDependent {
                conductivity,
                density,
                heat_capacity,
            } => [conductivity, density, heat_capacity],
        }
    }

    /// Diffusivity `k / (rho c)` from the base values.
    pub fn base_diffusivity(&self) -> f64 {
        let [k, rho, c] = self.laws();
        k.base / (rho.base * c.base)
    }
}

/// Initial temperature, either uniform or one value per node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialTemperature {
    Uniform(f64),
    Profile(Vec<f64>),
}

impl InitialTemperature {
    pub fn to_profile(&self, num_nodes: usize) -> Vec<f64> {
        match self {
            InitialTemperature::Uniform(value) => vec![*value; num_nodes],
            InitialTemperature::Profile(values) => values.clone(),
        }
    }
}

/// Single-step Arrhenius decomposition, first order in the solid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PyrolysisKinetics {
    /// Pre-exponential factor in 1/s.
    pub pre_exp_factor: f64,
    /// Activation energy in J/mol.
    pub activation_energy: f64,
    /// Heat of reaction in J/kg, positive when the reaction absorbs heat.
    pub heat_reaction: f64,
    pub reaction_order: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialType {
    Inert,
    Reactive(PyrolysisKinetics),
}

impl MaterialType {
    pub fn kinetics(&self) -> Option<PyrolysisKinetics> {
        match self {
            MaterialType::Inert => None,
            MaterialType::Reactive(kinetics) => Some(*kinetics),
        }
    }
}

/// Complete description of a heat conduction problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDescription {
    pub problem_type: ProblemType,
    pub geometry: Geometry,
    pub properties: ThermalProperties,
    /// Ambient temperature in K.
    pub temperature_ambient: f64,
    /// Initial temperature in K.
    pub temperature_initial: InitialTemperature,
    pub boundcond_surface: SurfaceCondition,
    pub boundcond_back: BackCondition,
    pub material_type: MaterialType,
    /// Beer-Lambert absorption coefficient in 1/m. Zero absorbs all incident
    /// radiation at the surface.
    #[serde(default)]
    pub indepth_absorptivity: f64,
    /// Material name, used to label output files.
    #[serde(default)]
    pub material: Option<String>,
}

impl ProblemDescription {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let problem: ProblemDescription = serde_json::from_str(json)?;
        problem.validate()?;
        Ok(problem)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every numeric field against the ranges the solver relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        positive("depth", g.depth)?;
        positive("time_total", g.time_total)?;
        if g.x_divisions < 3 {
            return Err(ConfigError::TooFewDivisions(g.x_divisions));
        }

        let names = ["conductivity", "density", "heat_capacity"];
        for (name, law) in names.into_iter().zip(self.properties.laws()) {
            positive(name, law.base)?;
            finite(name, law.exponent)?;
        }

        positive("temperature_ambient", self.temperature_ambient)?;
        match &self.temperature_initial {
            InitialTemperature::Uniform(value) => positive("temperature_initial", *value)?,
            InitialTemperature::Profile(values) => {
                if values.len() != g.x_divisions {
                    return Err(ConfigError::InitialProfileLength {
                        expected: g.x_divisions,
                        got: values.len(),
                    });
                }
                for value in values {
                    positive("temperature_initial", *value)?;
                }
            }
        }

        match &self.boundcond_surface {
            SurfaceCondition::Dirichlet {
                temperature_surface,
            } => positive("temperature_surface", *temperature_surface)?,
            SurfaceCondition::Neumann { nhf } => finite("nhf", *nhf)?,
            SurfaceCondition::Robin { ihf, losses } => {
                validate_ihf(ihf)?;
                match *losses {
                    SurfaceLosses::Linear { h_total } => non_negative("h_total", h_total)?,
                    SurfaceLosses::NonLinear {
                        h_convective,
                        absorptivity,
                        emissivity,
                    } => {
                        non_negative("h_convective", h_convective)?;
                        fraction("absorptivity", absorptivity)?;
                        fraction("emissivity", emissivity)?;
                    }
                }
            }
        }

        if let BackCondition::ConductiveLosses { conductivity_subs } = self.boundcond_back {
            non_negative("conductivity_subs", conductivity_subs)?;
        }

        if let Some(kinetics) = self.material_type.kinetics() {
            non_negative("pre_exp_factor", kinetics.pre_exp_factor)?;
            non_negative("activation_energy", kinetics.activation_energy)?;
            finite("heat_reaction", kinetics.heat_reaction)?;
            finite("reaction_order", kinetics.reaction_order)?;
        }

        non_negative("indepth_absorptivity", self.indepth_absorptivity)
    }
}

fn validate_ihf(ihf: &IncidentHeatFlux) -> Result<(), ConfigError> {
    match ihf {
        IncidentHeatFlux::Constant { value } => finite("ihf_coefficients", *value),
        IncidentHeatFlux::Polynomial { coefficients } => {
            if coefficients.is_empty() {
                return Err(ConfigError::EmptyPolynomial);
            }
            coefficients
                .iter()
                .try_for_each(|c| finite("ihf_coefficients", *c))
        }
        IncidentHeatFlux::Sinusoidal {
            amplitude,
            angular_frequency,
            phase,
        } => {
            finite("amplitude", *amplitude)?;
            finite("angular_frequency", *angular_frequency)?;
            finite("phase", *phase)
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotAFraction { field, value })
    }
}

/// PMMA slab heated by a constant incident flux with non-linear losses,
/// the demo case of the solver.
pub fn pmma_demo_problem() -> ProblemDescription {
    ProblemDescription {
        problem_type: ProblemType::Direct,
        geometry: Geometry {
            depth: 0.025,
            x_divisions: 101,
            time_total: 60.0,
        },
        properties: ThermalProperties::Constant {
            conductivity: 0.2,
            density: 1196.0,
            heat_capacity: 1549.0,
        },
        temperature_ambient: 288.0,
        temperature_initial: InitialTemperature::Uniform(288.0),
        boundcond_surface: SurfaceCondition::Robin {
            ihf: IncidentHeatFlux::Constant { value: 40_000.0 },
            losses: SurfaceLosses::NonLinear {
                h_convective: 12.0,
                absorptivity: 0.9,
                emissivity: 0.9,
            },
        },
        boundcond_back: BackCondition::Insulated,
        material_type: MaterialType::Inert,
        indepth_absorptivity: 0.0,
        material: Some("pmma".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_problem_is_valid() {
        pmma_demo_problem().validate().expect("demo problem should validate");
    }

    #[test]
    fn json_round_trip_keeps_the_problem() {
        let problem = pmma_demo_problem();
        let json = problem.to_json_string().unwrap();
        let parsed = ProblemDescription::from_json_str(&json).unwrap();
        assert_eq!(parsed, problem);
    }

    #[test]
    fn parses_hand_written_json() {
        let json = r#"{
            "problem_type": "direct",
            "geometry": { "depth": 0.01, "x_divisions": 11, "time_total": 5.0 },
            "properties": {
                "type": "temperature_dependent",
                "conductivity": { "base": 0.2, "exponent": 1.0 },
                "density": { "base": 1196.0, "exponent": 0.0 },
                "heat_capacity": { "base": 1549.0, "exponent": 0.5 }
            },
            "temperature_ambient": 288.0,
            "temperature_initial": [288, 288, 288, 288, 288, 288, 288, 288, 288, 288, 288],
            "boundcond_surface": { "type": "neunman", "nhf": 1000.0 },
            "boundcond_back": { "type": "conductive_losses", "conductivity_subs": 0.1 },
            "material_type": {
                "type": "reactive",
                "pre_exp_factor": 1e10,
                "activation_energy": 1.5e5,
                "heat_reaction": 1e6,
                "reaction_order": 1.0
            }
        }"#;

        let problem = ProblemDescription::from_json_str(json).unwrap();
        assert!(problem.properties.is_temperature_dependent());
        assert_eq!(problem.boundcond_surface, SurfaceCondition::Neumann { nhf: 1000.0 });
        assert!(problem.material_type.kinetics().is_some());
        assert_eq!(problem.indepth_absorptivity, 0.0);
        assert!(problem.material.is_none());
    }

    #[test]
    fn rejects_wrong_profile_length() {
        let mut problem = pmma_demo_problem();
        problem.temperature_initial = InitialTemperature::Profile(vec![288.0; 100]);
        assert!(matches!(
            problem.validate(),
            Err(ConfigError::InitialProfileLength {
                expected: 101,
                got: 100
            })
        ));
    }

    #[test]
    fn rejects_non_physical_numbers() {
        let mut problem = pmma_demo_problem();
        problem.geometry.depth = -1.0;
        assert!(matches!(
            problem.validate(),
            Err(ConfigError::NotPositive { field: "depth", .. })
        ));

        let mut problem = pmma_demo_problem();
        problem.geometry.x_divisions = 2;
        assert!(matches!(
            problem.validate(),
            Err(ConfigError::TooFewDivisions(2))
        ));

        let mut problem = pmma_demo_problem();
        problem.boundcond_surface = SurfaceCondition::Robin {
            ihf: IncidentHeatFlux::Constant { value: 1.0 },
            losses: SurfaceLosses::NonLinear {
                h_convective: 10.0,
                absorptivity: 1.2,
                emissivity: 0.9,
            },
        };
        assert!(matches!(
            problem.validate(),
            Err(ConfigError::NotAFraction {
                field: "absorptivity",
                ..
            })
        ));
    }

    #[test]
    fn unknown_surface_tag_is_a_parse_error() {
        let mut value = serde_json::to_value(pmma_demo_problem()).unwrap();
        value["boundcond_surface"] = serde_json::json!({ "type": "convective" });
        let err = ProblemDescription::from_json_str(&value.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn property_law_derivative_matches_finite_difference() {
        let law = PropertyLaw {
            base: 0.2,
            exponent: 1.7,
        };
        let t = 450.0;
        let h = 1e-3;
        let numeric = (law.eval(t + h) - law.eval(t - h)) / (2.0 * h);
        assert!((law.derivative(t) - numeric).abs() < 1e-9);
    }
}
