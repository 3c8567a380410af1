use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Two-point threshold-crossing identification rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentificationMethod {
    /// 28.3% / 63.2% crossings.
    Smith,
    /// 35.3% / 85.3% crossings.
    Sundaresan,
}

impl IdentificationMethod {
    /// Fractions of the final output value that define (y1, y2).
    pub fn thresholds(self) -> (f64, f64) {
        match self {
            Self::Smith => (0.283, 0.632),
            Self::Sundaresan => (0.353, 0.853),
        }
    }

    /// (tau, theta) from the crossing times t1 < t2.
    pub fn time_constants(self, t1: f64, t2: f64) -> (f64, f64) {
        match self {
            Self::Smith => {
                let tau = 1.5 * (t2 - t1);
                (tau, t2 - tau)
            }
            Self::Sundaresan => ((2.0 / 3.0) * (t2 - t1), 1.3 * t1 - 0.29 * t2),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Smith => "smith",
            Self::Sundaresan => "sundaresan",
        }
    }
}

impl fmt::Display for IdentificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IdentificationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smith" => Ok(Self::Smith),
            "sundaresan" => Ok(Self::Sundaresan),
            other => Err(Error::Config(format!("unknown identification method '{other}'"))),
        }
    }
}
