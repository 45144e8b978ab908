//! Weight units for biomass quantities.

use std::fmt;
use std::str::FromStr;

/// Unit of a weight value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum WeightUnits {
    /// Grams.
    Grams,
    /// Kilograms.
    Kilograms,
    /// Metric tonnes.
    #[default]
    Tonnes,
}

impl WeightUnits {
    fn grams(self) -> f64 {
        match self {
            Self::Grams => 1.0,
            Self::Kilograms => 1_000.0,
            Self::Tonnes => 1_000_000.0,
        }
    }

    /// Multiplier converting a value in `self` into `target` units.
    pub fn factor_to(self, target: WeightUnits) -> f64 {
        self.grams() / target.grams()
    }
}

impl fmt::Display for WeightUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Grams => "grams",
            Self::Kilograms => "kgs",
            Self::Tonnes => "tonnes",
        };
        f.write_str(s)
    }
}

impl FromStr for WeightUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "g" | "grams" => Ok(Self::Grams),
            "kg" | "kgs" | "kilograms" => Ok(Self::Kilograms),
            "t" | "tonnes" => Ok(Self::Tonnes),
            other => Err(format!("unknown weight unit '{other}'")),
        }
    }
}
