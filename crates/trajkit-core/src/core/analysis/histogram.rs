use super::error::FesError;

/// A normalized 1D histogram over equal-width bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1d {
    /// Probability density per bin; integrates to one over the range.
    pub density: Vec<f64>,
    /// `bins + 1` edges, ascending.
    pub edges: Vec<f64>,
}

/// A normalized 2D histogram, indexed `density[ix][iy]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2d {
    pub density: Vec<Vec<f64>>,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Binning {
    min: f64,
    max: f64,
    bins: usize,
}

impl Binning {
    fn new(data: &[f64], bins: usize, range: Option<(f64, f64)>) -> Result<Self, FesError> {
        if bins == 0 {
            return Err(FesError::ZeroBins);
        }
        let (mut min, mut max) = match range {
            Some((min, max)) => {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return Err(FesError::InvalidRange { min, max });
                }
                (min, max)
            }
            None => data
                .iter()
                .filter(|v| v.is_finite())
                .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                    None => Some((v, v)),
                })
                .ok_or(FesError::NoPopulatedBins)?,
        };
        if min == max {
            min -= 0.5;
            max += 0.5;
        }
        Ok(Self { min, max, bins })
    }

    fn width(&self) -> f64 {
        (self.max - self.min) / self.bins as f64
    }

    fn edges(&self) -> Vec<f64> {
        let width = self.width();
        (0..=self.bins)
            .map(|i| {
                if i == self.bins {
                    self.max
                } else {
                    self.min + i as f64 * width
                }
            })
            .collect()
    }

    /// Bin of `value`, with the right edge belonging to the last bin.
    fn locate(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.min || value > self.max {
            return None;
        }
        if value == self.max {
            return Some(self.bins - 1);
        }
        let index = ((value - self.min) / (self.max - self.min) * self.bins as f64).floor();
        Some((index as usize).min(self.bins - 1))
    }
}

fn check_inputs(data: &[f64], weights: Option<&[f64]>) -> Result<(), FesError> {
    if data.is_empty() {
        return Err(FesError::EmptyData);
    }
    if let Some(w) = weights {
        if w.len() != data.len() {
            return Err(FesError::LengthMismatch {
                expected: data.len(),
                found: w.len(),
            });
        }
    }
    Ok(())
}

/// Builds a density histogram of `data`.
///
/// The range defaults to the data extent; a zero-width range is widened by
/// 0.5 on each side. Samples outside the range are ignored.
pub fn histogram_1d(
    data: &[f64],
    bins: usize,
    range: Option<(f64, f64)>,
    weights: Option<&[f64]>,
) -> Result<Histogram1d, FesError> {
    check_inputs(data, weights)?;
    let binning = Binning::new(data, bins, range)?;

    let mut counts = vec![0.0; bins];
    for (i, &value) in data.iter().enumerate() {
        if let Some(bin) = binning.locate(value) {
            counts[bin] += weights.map_or(1.0, |w| w[i]);
        }
    }

    let total: f64 = counts.iter().sum();
    if total == 0.0 {
        return Err(FesError::NoPopulatedBins);
    }
    let norm = total * binning.width();

    Ok(Histogram1d {
        density: counts.into_iter().map(|c| c / norm).collect(),
        edges: binning.edges(),
    })
}

/// Builds a joint density histogram of the pairs `(x[i], y[i])`.
///
/// Both axes use `bins` bins. A sample is counted only when it falls inside
/// both ranges.
pub fn histogram_2d(
    x: &[f64],
    y: &[f64],
    bins: usize,
    ranges: (Option<(f64, f64)>, Option<(f64, f64)>),
    weights: Option<&[f64]>,
) -> Result<Histogram2d, FesError> {
    check_inputs(x, weights)?;
    if y.len() != x.len() {
        return Err(FesError::LengthMismatch {
            expected: x.len(),
            found: y.len(),
        });
    }
    let x_binning = Binning::new(x, bins, ranges.0)?;
    let y_binning = Binning::new(y, bins, ranges.1)?;

    let mut counts = vec![vec![0.0; bins]; bins];
    for (i, (&xv, &yv)) in x.iter().zip(y).enumerate() {
        if let (Some(ix), Some(iy)) = (x_binning.locate(xv), y_binning.locate(yv)) {
            counts[ix][iy] += weights.map_or(1.0, |w| w[i]);
        }
    }

    let total: f64 = counts.iter().flatten().sum();
    if total == 0.0 {
        return Err(FesError::NoPopulatedBins);
    }
    let norm = total * x_binning.width() * y_binning.width();

    Ok(Histogram2d {
        density: counts
            .into_iter()
            .map(|row| row.into_iter().map(|c| c / norm).collect())
            .collect(),
        x_edges: x_binning.edges(),
        y_edges: y_binning.edges(),
    })
}
