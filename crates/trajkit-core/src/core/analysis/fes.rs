use super::error::FesError;
use super::histogram::{histogram_1d, histogram_2d};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Energy unit of a free-energy surface, fixing the Boltzmann constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnergyUnit {
    /// Reduced units, `k_B = 1`.
    #[default]
    #[serde(rename = "kb")]
    Kb,
    /// kJ/mol.
    #[serde(rename = "kJ")]
    KJ,
    /// kcal/mol.
    #[serde(rename = "kcal")]
    Kcal,
}

impl EnergyUnit {
    pub fn boltzmann_constant(&self) -> f64 {
        match self {
            Self::Kb => 1.0,
            Self::KJ => 0.00831446261815324,
            Self::Kcal => 0.00198720425864083,
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kb => "kb",
            Self::KJ => "kJ",
            Self::Kcal => "kcal",
        })
    }
}

impl FromStr for EnergyUnit {
    type Err = FesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kb" => Ok(Self::Kb),
            "kj" | "kj/mol" => Ok(Self::KJ),
            "kcal" | "kcal/mol" => Ok(Self::Kcal),
            _ => Err(FesError::UnknownUnit(s.to_string())),
        }
    }
}

/// Reference the surface is shifted against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ZeroLevel {
    /// The lowest bin is zero.
    #[default]
    Min,
    /// The highest populated bin is zero.
    Max,
    /// The given energy is zero.
    Value(f64),
}

impl FromStr for ZeroLevel {
    type Err = FesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Value)
                .ok_or_else(|| FesError::InvalidZeroLevel(s.to_string())),
        }
    }
}

/// Histogram settings shared by 1D and 2D surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct FesOptions<'a> {
    pub bins: usize,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub weights: Option<&'a [f64]>,
    pub zero: ZeroLevel,
    /// Replace empty bins (infinite energy) with the largest finite energy.
    pub fill_empty: bool,
}

impl<'a> FesOptions<'a> {
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            x_range: None,
            y_range: None,
            weights: None,
            zero: ZeroLevel::Min,
            fill_empty: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fes1d {
    pub energies: Vec<f64>,
    pub edges: Vec<f64>,
}

impl Fes1d {
    pub fn centers(&self) -> Vec<f64> {
        centers(&self.edges)
    }
}

/// A 2D surface, indexed `energies[iy][ix]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fes2d {
    pub energies: Vec<Vec<f64>>,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
}

impl Fes2d {
    pub fn x_centers(&self) -> Vec<f64> {
        centers(&self.x_edges)
    }

    pub fn y_centers(&self) -> Vec<f64> {
        centers(&self.y_edges)
    }
}

fn centers(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}

/// Pseudo free-energy surfaces `F = -k_B T ln p` of sampled data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeEnergy {
    temperature: f64,
    unit: EnergyUnit,
}

impl FreeEnergy {
    pub fn new(temperature: f64, unit: EnergyUnit) -> Result<Self, FesError> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(FesError::InvalidTemperature(temperature));
        }
        Ok(Self { temperature, unit })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn unit(&self) -> EnergyUnit {
        self.unit
    }

    pub fn kbt(&self) -> f64 {
        self.unit.boltzmann_constant() * self.temperature
    }

    pub fn fes_1d(&self, x: &[f64], options: &FesOptions) -> Result<Fes1d, FesError> {
        let hist = histogram_1d(x, options.bins, options.x_range, options.weights)?;
        let mut energies = hist.density;
        self.to_energies(&mut energies, options);
        debug!(
            "Computed 1D FES over {} bins at kT = {:.6} {}",
            options.bins,
            self.kbt(),
            self.unit
        );
        Ok(Fes1d {
            energies,
            edges: hist.edges,
        })
    }

    pub fn fes_2d(&self, x: &[f64], y: &[f64], options: &FesOptions) -> Result<Fes2d, FesError> {
        let hist = histogram_2d(
            x,
            y,
            options.bins,
            (options.x_range, options.y_range),
            options.weights,
        )?;
        let (nx, ny) = (hist.x_edges.len() - 1, hist.y_edges.len() - 1);
        let mut flat: Vec<f64> = (0..ny)
            .flat_map(|iy| (0..nx).map(move |ix| (ix, iy)))
            .map(|(ix, iy)| hist.density[ix][iy])
            .collect();
        self.to_energies(&mut flat, options);
        debug!(
            "Computed 2D FES over {}x{} bins at kT = {:.6} {}",
            nx,
            ny,
            self.kbt(),
            self.unit
        );
        Ok(Fes2d {
            energies: flat.chunks(nx).map(<[f64]>::to_vec).collect(),
            x_edges: hist.x_edges,
            y_edges: hist.y_edges,
        })
    }

    /// Converts densities into shifted energies in place. Empty bins become
    /// `+inf` unless `fill_empty` is set.
    fn to_energies(&self, values: &mut [f64], options: &FesOptions) {
        let kbt = self.kbt();
        for v in values.iter_mut() {
            *v = -kbt * v.ln();
        }

        let finite = values.iter().copied().filter(|v| v.is_finite());
        let shift = match options.zero {
            ZeroLevel::Min => finite.fold(f64::INFINITY, f64::min),
            ZeroLevel::Max => finite.fold(f64::NEG_INFINITY, f64::max),
            ZeroLevel::Value(v) => v,
        };
        for v in values.iter_mut() {
            *v -= shift;
        }

        if options.fill_empty {
            let ceiling = values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(f64::NEG_INFINITY, f64::max);
            for v in values.iter_mut().filter(|v| v.is_infinite()) {
                *v = ceiling;
            }
        }
    }
}
