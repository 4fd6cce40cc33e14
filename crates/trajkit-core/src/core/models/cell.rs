use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An orthorhombic periodic simulation cell.
///
/// The cell is axis-aligned with independent edge lengths along x, y and z.
/// All lengths are strictly positive and finite; this is enforced on
/// construction and on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct SimulationBox {
    lengths: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("box lengths must be positive and finite, got {0:?}")]
pub struct InvalidBoxLengths(pub [f64; 3]);

impl SimulationBox {
    /// Creates a new box from its three edge lengths.
    ///
    /// # Return
    ///
    /// Returns `None` if any length is not strictly positive and finite.
    pub fn new(lengths: Vector3<f64>) -> Option<Self> {
        lengths
            .iter()
            .all(|l| l.is_finite() && *l > 0.0)
            .then_some(Self { lengths })
    }

    pub fn cubic(length: f64) -> Option<Self> {
        Self::new(Vector3::repeat(length))
    }

    pub fn lengths(&self) -> &Vector3<f64> {
        &self.lengths
    }

    pub fn volume(&self) -> f64 {
        self.lengths.x * self.lengths.y * self.lengths.z
    }

    /// Maps a displacement onto its minimum periodic image.
    ///
    /// Each component is shifted by the integer number of box lengths that
    /// brings it into `[-L/2, L/2)`.
    pub fn minimum_image(&self, delta: &Vector3<f64>) -> Vector3<f64> {
        Vector3::from_fn(|i, _| {
            let length = self.lengths[i];
            delta[i] - (delta[i] / length + 0.5).floor() * length
        })
    }

    /// Minimum-image distance between two points.
    pub fn distance(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.minimum_image(&(b - a)).norm()
    }

    /// Wraps a point back into the primary cell `[0, L)`.
    pub fn wrap(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(Vector3::from_fn(|i, _| {
            point[i].rem_euclid(self.lengths[i])
        }))
    }
}

impl TryFrom<[f64; 3]> for SimulationBox {
    type Error = InvalidBoxLengths;

    fn try_from(value: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(Vector3::from(value)).ok_or(InvalidBoxLengths(value))
    }
}

impl From<SimulationBox> for [f64; 3] {
    fn from(value: SimulationBox) -> Self {
        value.lengths.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn new_rejects_non_positive_or_non_finite_lengths() {
        assert!(SimulationBox::new(Vector3::new(10.0, 0.0, 10.0)).is_none());
        assert!(SimulationBox::new(Vector3::new(10.0, -1.0, 10.0)).is_none());
        assert!(SimulationBox::new(Vector3::new(f64::NAN, 1.0, 1.0)).is_none());
        assert!(SimulationBox::new(Vector3::new(f64::INFINITY, 1.0, 1.0)).is_none());
        assert!(SimulationBox::new(Vector3::new(1.0, 2.0, 3.0)).is_some());
    }

    #[test]
    fn volume_is_product_of_lengths() {
        let cell = SimulationBox::new(Vector3::new(2.0, 3.0, 4.0)).unwrap();
        assert!((cell.volume() - 24.0).abs() < EPS);
    }

    #[test]
    fn minimum_image_folds_long_displacements() {
        let cell = SimulationBox::cubic(10.0).unwrap();
        let folded = cell.minimum_image(&Vector3::new(9.0, -9.0, 4.0));
        assert!((folded - Vector3::new(-1.0, 1.0, 4.0)).norm() < EPS);
    }

    #[test]
    fn distance_uses_minimum_image() {
        let cell = SimulationBox::cubic(10.0).unwrap();
        let a = Point3::new(0.5, 5.0, 5.0);
        let b = Point3::new(9.5, 5.0, 5.0);
        assert!((cell.distance(&a, &b) - 1.0).abs() < EPS);
    }

    #[test]
    fn wrap_maps_points_into_primary_cell() {
        let cell = SimulationBox::new(Vector3::new(10.0, 5.0, 2.0)).unwrap();
        let wrapped = cell.wrap(&Point3::new(-0.5, 12.0, 2.0));
        assert!((wrapped - Point3::new(9.5, 2.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn deserialization_validates_lengths() {
        let ok: SimulationBox = serde_json::from_str("[10.0, 10.0, 12.0]").unwrap();
        assert_eq!(ok.lengths(), &Vector3::new(10.0, 10.0, 12.0));
        assert!(serde_json::from_str::<SimulationBox>("[10.0, 0.0, 12.0]").is_err());
        assert_eq!(
            SimulationBox::try_from([1.0, -2.0, 3.0]).unwrap_err().to_string(),
            "box lengths must be positive and finite, got [1.0, -2.0, 3.0]"
        );
    }
}
