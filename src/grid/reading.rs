//! Grid stability readings: one validated CSV row per [`GridReading`].

use std::fmt;

use serde::Serialize;

/// Column names every upload must carry, in canonical order.
///
/// The order here is also the order used when reporting missing columns and
/// when exporting a dataset back to CSV.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    "tau1", "tau2", "tau3", "tau4", "p1", "p2", "p3", "p4", "g1", "g2", "g3", "g4", "stab", "stabf",
];

/// Number of simulated grid participants (generators) per reading.
pub const PARTICIPANTS: usize = 4;

/// Categorical stability outcome of a simulated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// The grid settled.
    Stable,
    /// The grid diverged.
    Unstable,
}

impl Stability {
    /// Parses a label token.
    ///
    /// Only the exact lowercase tokens `stable` and `unstable` are accepted;
    /// surrounding whitespace or different casing yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "stable" => Some(Self::Stable),
            "unstable" => Some(Self::Unstable),
            _ => None,
        }
    }

    /// Returns the label token as it appears in CSV input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Unstable => "unstable",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated record of grid-stability simulation inputs and outputs.
///
/// Index `i` of `tau`, `p` and `g` holds the value of column `tau{i+1}`,
/// `p{i+1}` and `g{i+1}` respectively.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridReading {
    /// Reaction times of the four participants.
    pub tau: [f64; PARTICIPANTS],
    /// Signed power balance contributions (producer negative/positive as in the source data).
    pub p: [f64; PARTICIPANTS],
    /// Price-elasticity (reaction-time) coefficients.
    pub g: [f64; PARTICIPANTS],
    /// Continuous stability margin.
    pub stab: f64,
    /// Categorical stability label.
    pub stabf: Stability,
}

impl GridReading {
    /// Returns `true` when the reading is labelled unstable.
    pub fn is_unstable(&self) -> bool {
        self.stabf == Stability::Unstable
    }

    /// Sum of absolute power contributions, `|p1| + |p2| + |p3| + |p4|`.
    pub fn total_abs_power(&self) -> f64 {
        self.p.iter().map(|p| p.abs()).sum()
    }
}
