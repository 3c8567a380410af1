use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::control::ControllerRule;
use crate::error::Error;
use crate::ident::IdentificationMethod;

/// Lambda used by the IMC preset.
pub const DEFAULT_IMC_LAMBDA: f64 = 100.0;

/// Whether the identified plant is wrapped in unity feedback before the
/// delay is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopTopology {
    Open,
    Closed,
}

/// Which time grid the model is simulated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrid {
    /// The experiment's own sample times, for overlay and RMSE.
    #[default]
    Recorded,
    /// The simulator's default horizon.
    Automatic,
}

// ---------------------------------------------------------------------------
// Method descriptor
// ---------------------------------------------------------------------------

/// Everything that selects one pipeline variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub method: IdentificationMethod,
    pub topology: LoopTopology,
    #[serde(default)]
    pub controller: Option<ControllerRule>,
    #[serde(default)]
    pub grid: TimeGrid,
}

impl MethodDescriptor {
    /// Identification-only variant on the recorded grid.
    pub fn identification(method: IdentificationMethod, topology: LoopTopology) -> Self {
        Self { method, topology, controller: None, grid: TimeGrid::Recorded }
    }

    /// Whether [`with_lambda`](Self::with_lambda) has any effect.
    pub fn uses_lambda(&self) -> bool {
        matches!(self.controller, Some(ControllerRule::Imc { .. }))
    }

    /// Replace lambda if the controller rule is IMC.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        if let Some(ControllerRule::Imc { .. }) = self.controller {
            self.controller = Some(ControllerRule::Imc { lambda });
        }
        self
    }

    pub fn label(&self) -> String {
        let topology = match self.topology {
            LoopTopology::Open => "open loop",
            LoopTopology::Closed => "closed loop",
        };
        match self.controller {
            Some(rule) => format!("{} PID on {} ({})", rule.name(), self.method, topology),
            None => format!("{} identification ({})", self.method, topology),
        }
    }
}

// ---------------------------------------------------------------------------
// Preset table
// ---------------------------------------------------------------------------

/// Named pipeline variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    SmithOpen,
    SmithClosed,
    SundaresanOpen,
    SundaresanClosed,
    Imc,
    Chr,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::SmithOpen,
        Preset::SmithClosed,
        Preset::SundaresanOpen,
        Preset::SundaresanClosed,
        Preset::Imc,
        Preset::Chr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::SmithOpen => "smith-open",
            Self::SmithClosed => "smith-closed",
            Self::SundaresanOpen => "sundaresan-open",
            Self::SundaresanClosed => "sundaresan-closed",
            Self::Imc => "imc",
            Self::Chr => "chr",
        }
    }

    pub fn descriptor(self) -> MethodDescriptor {
        use IdentificationMethod::{Smith, Sundaresan};
        use LoopTopology::{Closed, Open};
        match self {
            Self::SmithOpen => MethodDescriptor::identification(Smith, Open),
            Self::SmithClosed => MethodDescriptor::identification(Smith, Closed),
            Self::SundaresanOpen => MethodDescriptor::identification(Sundaresan, Open),
            Self::SundaresanClosed => MethodDescriptor::identification(Sundaresan, Closed),
            Self::Imc => MethodDescriptor {
                method: Sundaresan,
                topology: Closed,
                controller: Some(ControllerRule::Imc { lambda: DEFAULT_IMC_LAMBDA }),
                grid: TimeGrid::Automatic,
            },
            Self::Chr => MethodDescriptor {
                method: Sundaresan,
                topology: Open,
                controller: Some(ControllerRule::Chr0),
                grid: TimeGrid::Recorded,
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                Error::Config(format!("unknown preset '{s}' (expected one of {})", names.join(", ")))
            })
    }
}
