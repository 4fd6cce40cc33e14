use super::element;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Represents a single atom of a trajectory frame.
///
/// Atoms are immutable snapshots: a new frame carries new atoms. Besides the
/// species and coordinates, an atom may carry per-atom scalar and vector
/// attributes that are aggregated per molecule during coarse graining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// The chemical species symbol (e.g., "C", "Li", "F").
    pub symbol: String,
    /// The Cartesian coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The atomic mass in g/mol.
    pub mass: f64,
    /// The partial charge in elementary charge units, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<f64>,
    /// The force acting on the atom, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<Vector3<f64>>,
}

impl Atom {
    /// Creates a new `Atom` with an explicit mass and no optional attributes.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The chemical species symbol.
    /// * `position` - The 3D coordinates of the atom.
    /// * `mass` - The atomic mass in g/mol.
    pub fn new(symbol: &str, position: Point3<f64>, mass: f64) -> Self {
        Self {
            symbol: symbol.trim().to_string(),
            position,
            mass,
            charge: None,
            force: None,
        }
    }

    /// Creates a new `Atom` using the standard atomic weight of its species.
    ///
    /// # Return
    ///
    /// Returns `None` if the species has no tabulated mass.
    pub fn from_element(symbol: &str, position: Point3<f64>) -> Option<Self> {
        let mass = element::atomic_mass(symbol)?;
        Some(Self::new(symbol, position, mass))
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn with_force(mut self, force: Vector3<f64>) -> Self {
        self.force = Some(force);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_no_optional_attributes() {
        let atom = Atom::new("Li", Point3::new(1.0, 2.0, 3.0), 6.94);
        assert_eq!(atom.symbol, "Li");
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.mass, 6.94);
        assert!(atom.charge.is_none());
        assert!(atom.force.is_none());
    }

    #[test]
    fn new_atom_trims_symbol() {
        let atom = Atom::new(" O ", Point3::origin(), 15.999);
        assert_eq!(atom.symbol, "O");
    }

    #[test]
    fn from_element_uses_tabulated_mass() {
        let atom = Atom::from_element("C", Point3::origin()).unwrap();
        assert_eq!(atom.mass, 12.011);
    }

    #[test]
    fn from_element_returns_none_for_unknown_species() {
        assert!(Atom::from_element("Qq", Point3::origin()).is_none());
    }

    #[test]
    fn builder_methods_attach_attributes() {
        let atom = Atom::new("F", Point3::origin(), 18.998)
            .with_charge(-0.5)
            .with_force(Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(atom.charge, Some(-0.5));
        assert_eq!(atom.force, Some(Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn serde_round_trip_omits_missing_attributes() {
        let atom = Atom::new("H", Point3::new(0.5, 0.0, 0.0), 1.008);
        let json = serde_json::to_string(&atom).unwrap();
        assert!(!json.contains("charge"));
        assert!(!json.contains("force"));
        let back: Atom = serde_json::from_str(&json).unwrap();
        assert_eq!(back, atom);
    }
}
