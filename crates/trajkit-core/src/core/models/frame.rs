use super::atom::Atom;
use super::cell::SimulationBox;
use crate::core::topology::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single configuration of a trajectory.
///
/// A frame owns its atoms and its periodic cell and is consumed read-only by
/// the analysis pipeline. The only derived field is the optional per-atom
/// molecule ID array, attached once connectivity has been computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct Frame {
    atoms: Vec<Atom>,
    cell: SimulationBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    molecule_ids: Option<Vec<usize>>,
}

#[derive(Deserialize)]
struct RawFrame {
    atoms: Vec<Atom>,
    cell: SimulationBox,
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    molecule_ids: Option<Vec<usize>>,
}

impl TryFrom<RawFrame> for Frame {
    type Error = TopologyError;

    fn try_from(raw: RawFrame) -> Result<Self, Self::Error> {
        let mut frame = Frame::new(raw.atoms, raw.cell);
        frame.index = raw.index;
        if let Some(ids) = raw.molecule_ids {
            frame.attach_molecule_ids(ids)?;
        }
        Ok(frame)
    }
}

impl Frame {
    pub fn new(atoms: Vec<Atom>, cell: SimulationBox) -> Self {
        Self {
            atoms,
            cell,
            index: None,
            molecule_ids: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn cell(&self) -> &SimulationBox {
        &self.cell
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns the set of distinct species symbols present in the frame.
    pub fn species(&self) -> BTreeSet<&str> {
        self.atoms.iter().map(|a| a.symbol.as_str()).collect()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(|a| a.symbol.as_str())
    }

    pub fn molecule_ids(&self) -> Option<&[usize]> {
        self.molecule_ids.as_deref()
    }

    /// Attaches a molecule ID array to the frame.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MoleculeIdCountMismatch`] and leaves the frame
    /// untouched if the array length does not match the number of atoms.
    pub fn attach_molecule_ids(&mut self, ids: Vec<usize>) -> Result<(), TopologyError> {
        if ids.len() != self.atoms.len() {
            return Err(TopologyError::MoleculeIdCountMismatch {
                atoms: self.atoms.len(),
                ids: ids.len(),
            });
        }
        self.molecule_ids = Some(ids);
        Ok(())
    }

    pub fn clear_molecule_ids(&mut self) {
        self.molecule_ids = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn water_frame() -> Frame {
        let atoms = vec![
            Atom::from_element("O", Point3::new(0.0, 0.0, 0.0)).unwrap(),
            Atom::from_element("H", Point3::new(0.96, 0.0, 0.0)).unwrap(),
            Atom::from_element("H", Point3::new(-0.24, 0.93, 0.0)).unwrap(),
        ];
        Frame::new(atoms, SimulationBox::cubic(10.0).unwrap())
    }

    #[test]
    fn new_frame_has_no_index_or_ids() {
        let frame = water_frame();
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
        assert!(frame.index().is_none());
        assert!(frame.molecule_ids().is_none());
    }

    #[test]
    fn species_are_unique_and_sorted() {
        let frame = water_frame();
        let species: Vec<&str> = frame.species().into_iter().collect();
        assert_eq!(species, vec!["H", "O"]);
    }

    #[test]
    fn attach_molecule_ids_checks_length() {
        let mut frame = water_frame();
        assert_eq!(
            frame.attach_molecule_ids(vec![0, 0]),
            Err(TopologyError::MoleculeIdCountMismatch { atoms: 3, ids: 2 })
        );
        assert!(frame.molecule_ids().is_none());

        assert!(frame.attach_molecule_ids(vec![0, 0, 0]).is_ok());
        assert_eq!(frame.molecule_ids(), Some(&[0, 0, 0][..]));

        frame.clear_molecule_ids();
        assert!(frame.molecule_ids().is_none());
    }

    #[test]
    fn serde_round_trip_preserves_frame() {
        let mut frame = water_frame().with_index(7);
        frame.attach_molecule_ids(vec![0, 0, 0]).unwrap();
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn deserialization_rejects_molecule_ids_of_the_wrong_length() {
        let mut frame = water_frame();
        frame.attach_molecule_ids(vec![0, 0, 0]).unwrap();
        let mut value = serde_json::to_value(&frame).unwrap();
        value["molecule_ids"] = serde_json::json!([0]);
        assert!(serde_json::from_value::<Frame>(value).is_err());
    }

    #[test]
    fn deserialization_accepts_frames_without_ids() {
        let json = serde_json::to_string(&water_frame().with_index(2)).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.index(), Some(2));
        assert!(back.molecule_ids().is_none());
    }
}
