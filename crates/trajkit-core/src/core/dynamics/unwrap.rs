use super::com::CoarseFrame;
use super::error::DynamicsError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The recurrence used to rebuild continuous coordinates from wrapped ones.
///
/// All three start from `u[0] = w[0]` and work per axis:
///
/// - `Heuristic`: `u[t] = w[t] - round((w[t] - u[t-1]) / L[t]) * L[t]`
/// - `Displacement`: `u[t] = u[t-1] + dw - round(dw / L[t]) * L[t]`, with `dw = w[t] - w[t-1]`
/// - `Hybrid`: `Displacement` minus `round((w[t-1] - u[t-1]) / L[t-1]) * (L[t] - L[t-1])`
///
/// where `round(x)` is `floor(x + 0.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnwrapMethod {
    Heuristic,
    Displacement,
    #[default]
    Hybrid,
}

impl UnwrapMethod {
    pub const ALL: [UnwrapMethod; 3] = [Self::Heuristic, Self::Displacement, Self::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::Displacement => "displacement",
            Self::Hybrid => "hybrid",
        }
    }

    #[inline]
    fn step(
        self,
        previous_unwrapped: f64,
        previous_wrapped: f64,
        wrapped: f64,
        previous_length: f64,
        length: f64,
    ) -> f64 {
        match self {
            Self::Heuristic => {
                wrapped - image_count(wrapped - previous_unwrapped, length) * length
            }
            Self::Displacement => {
                let delta = wrapped - previous_wrapped;
                previous_unwrapped + delta - image_count(delta, length) * length
            }
            Self::Hybrid => {
                let delta = wrapped - previous_wrapped;
                previous_unwrapped + delta
                    - image_count(delta, length) * length
                    - image_count(previous_wrapped - previous_unwrapped, previous_length)
                        * (length - previous_length)
            }
        }
    }
}

impl fmt::Display for UnwrapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnwrapMethod {
    type Err = DynamicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "displacement" => Ok(Self::Displacement),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(DynamicsError::UnknownUnwrapMethod(s.to_string())),
        }
    }
}

#[inline]
fn image_count(delta: f64, length: f64) -> f64 {
    (delta / length + 0.5).floor()
}

/// Unwraps one sequence of positions.
///
/// `boxes[t]` holds the box edge lengths of frame `t`. A sequence of length
/// one is returned unchanged, an empty one yields an empty result.
///
/// # Errors
///
/// - [`DynamicsError::BoxLengthMismatch`] if `boxes` and `wrapped` differ in length.
/// - [`DynamicsError::NonPositiveBox`] if any box length is not positive and finite.
pub fn unwrap(
    wrapped: &[Point3<f64>],
    boxes: &[Vector3<f64>],
    method: UnwrapMethod,
) -> Result<Vec<Point3<f64>>, DynamicsError> {
    if wrapped.len() != boxes.len() {
        return Err(DynamicsError::BoxLengthMismatch {
            coordinates: wrapped.len(),
            boxes: boxes.len(),
        });
    }
    if let Some(frame) = boxes
        .iter()
        .position(|b| !b.iter().all(|l| l.is_finite() && *l > 0.0))
    {
        return Err(DynamicsError::NonPositiveBox { frame });
    }

    let Some(first) = wrapped.first() else {
        return Ok(Vec::new());
    };

    let mut unwrapped = Vec::with_capacity(wrapped.len());
    unwrapped.push(*first);
    for t in 1..wrapped.len() {
        let previous = unwrapped[t - 1];
        let next = Vector3::from_fn(|axis, _| {
            method.step(
                previous[axis],
                wrapped[t - 1][axis],
                wrapped[t][axis],
                boxes[t - 1][axis],
                boxes[t][axis],
            )
        });
        unwrapped.push(Point3::from(next));
    }
    Ok(unwrapped)
}

/// The continuous trajectory of one molecule's center of mass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnwrappedMolecule {
    pub molecule_id: usize,
    pub positions: Vec<Point3<f64>>,
}

/// Unwrapped center-of-mass trajectories grouped by species name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnwrappedTrajectory {
    frame_indices: Vec<usize>,
    species: BTreeMap<String, Vec<UnwrappedMolecule>>,
}

impl UnwrappedTrajectory {
    /// Trajectory index of every frame, in order. Frames without an index
    /// are numbered by their position in the series.
    pub fn frame_indices(&self) -> &[usize] {
        &self.frame_indices
    }

    pub fn frame_count(&self) -> usize {
        self.frame_indices.len()
    }

    pub fn species(&self) -> &BTreeMap<String, Vec<UnwrappedMolecule>> {
        &self.species
    }

    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    pub fn molecules(&self, name: &str) -> Option<&[UnwrappedMolecule]> {
        self.species.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

/// Unwraps the center of mass of every molecule across a coarse trajectory.
///
/// Site `i` of every frame is treated as the same molecule, and its name is
/// taken from the first frame. Molecules are unwrapped in parallel.
///
/// # Errors
///
/// Fails with [`DynamicsError::SiteCountMismatch`] if the frames do not all
/// hold the same number of molecules, or propagates the errors of [`unwrap`].
#[instrument(skip_all, name = "unwrap_series", fields(frames = frames.len()))]
pub fn unwrap_series(
    frames: &[CoarseFrame],
    method: UnwrapMethod,
) -> Result<UnwrappedTrajectory, DynamicsError> {
    let Some(first) = frames.first() else {
        return Ok(UnwrappedTrajectory::default());
    };

    let expected = first.len();
    if let Some((frame, found)) = frames
        .iter()
        .enumerate()
        .map(|(i, f)| (i, f.len()))
        .find(|&(_, found)| found != expected)
    {
        return Err(DynamicsError::SiteCountMismatch {
            frame,
            expected,
            found,
        });
    }

    let boxes: Vec<Vector3<f64>> = frames.iter().map(|f| *f.cell.lengths()).collect();

    #[cfg(not(feature = "parallel"))]
    let sites = 0..expected;

    #[cfg(feature = "parallel")]
    let sites = (0..expected).into_par_iter();

    let molecules = sites
        .map(|site| {
            let positions: Vec<Point3<f64>> =
                frames.iter().map(|f| f.sites[site].position).collect();
            unwrap(&positions, &boxes, method).map(|positions| UnwrappedMolecule {
                molecule_id: first.sites[site].molecule_id,
                positions,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut species: BTreeMap<String, Vec<UnwrappedMolecule>> = BTreeMap::new();
    for (site, molecule) in first.sites.iter().zip(molecules) {
        species.entry(site.name.clone()).or_default().push(molecule);
    }

    debug!(
        "Unwrapped {} molecules of {} species over {} frames with the {} method",
        expected,
        species.len(),
        frames.len(),
        method
    );

    Ok(UnwrappedTrajectory {
        frame_indices: frames
            .iter()
            .enumerate()
            .map(|(position, f)| f.index.unwrap_or(position))
            .collect(),
        species,
    })
}
