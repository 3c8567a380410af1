//! Scenario requests: the explicit replacement for widget-held selections
//! and manual-entry values.
//!
//! # TOML Example
//!
//! ```toml
//! [descriptor]
//! method = "sundaresan"
//! topology = "closed"
//! grid = "automatic"
//! controller = { rule = "imc", lambda = 20.0 }
//!
//! [overrides]
//! setpoint = 2.0
//!
//! [sim]
//! samples = 2000
//!
//! [analysis]
//! settling_band = 0.05
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisConfig;
use crate::control::ControllerParameters;
use crate::error::{Error, Result};
use crate::sim::SimConfig;

use super::descriptor::MethodDescriptor;

/// Manual values that replace computed ones. Each plant parameter is
/// overridden independently; controller gains replace the tuning rule as a
/// whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub k: Option<f64>,
    pub tau: Option<f64>,
    pub theta: Option<f64>,
    pub controller: Option<ControllerParameters>,
    /// Step amplitude the identified gain is referred to in controller
    /// scenarios, in place of the mean input. Ignored without a controller.
    pub setpoint: Option<f64>,
}

impl Overrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self) -> Result<()> {
        let values = [self.k, self.tau, self.theta, self.setpoint];
        if values.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::Config("override values must be finite".into()));
        }
        Ok(())
    }
}

/// A complete request as read from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub descriptor: MethodDescriptor,
    #[serde(default)]
    pub overrides: Overrides,
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl ScenarioRequest {
    pub fn new(descriptor: MethodDescriptor) -> Self {
        Self {
            descriptor,
            overrides: Overrides::default(),
            sim: SimConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let request: Self =
            toml::from_str(text).map_err(|e| Error::Config(format!("failed to parse request: {e}")))?;
        request.overrides.validate()?;
        Ok(request)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
