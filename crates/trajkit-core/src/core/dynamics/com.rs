use super::error::DynamicsError;
use crate::core::models::cell::SimulationBox;
use crate::core::models::frame::Frame;
use crate::core::topology::labeler::MoleculeLabels;
use nalgebra::{Point3, Vector3};
use serde::Serialize;

/// One molecule collapsed onto its center of mass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoleculeSite {
    /// The molecule ID within its frame.
    pub molecule_id: usize,
    /// The short name of the molecule's species (e.g., "EC").
    pub name: String,
    /// The Hill-order chemical formula.
    pub formula: String,
    /// The total mass in g/mol.
    pub mass: f64,
    /// The mass-weighted centroid of the molecule's atoms.
    pub position: Point3<f64>,
    /// Net charge, present when every atom of the frame carries a charge.
    pub charge: Option<f64>,
    /// Net force, present when every atom of the frame carries a force.
    pub force: Option<Vector3<f64>>,
    /// Torque about the center of mass, present together with `force`.
    pub torque: Option<Vector3<f64>>,
}

/// A coarse-grained frame holding one site per molecule.
///
/// Sites are ordered by ascending molecule ID, so site `i` of consecutive
/// frames refers to the same molecule as long as the molecule IDs do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoarseFrame {
    pub index: Option<usize>,
    pub cell: SimulationBox,
    pub sites: Vec<MoleculeSite>,
}

impl CoarseFrame {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[derive(Default)]
struct Accumulator {
    mass: f64,
    weighted: Vector3<f64>,
    charge: f64,
    force: Vector3<f64>,
    atoms: Vec<usize>,
}

/// Reduces every molecule of `frame` to its center of mass.
///
/// The frame must carry molecule IDs (see [`Frame::attach_molecule_ids`]) that
/// agree with `labels`. No periodic correction is applied: a molecule whose
/// atoms straddle a box face in this frame gets a centroid between the images.
///
/// # Errors
///
/// - [`DynamicsError::UnpartitionedAtom`] if the frame has no IDs, fewer IDs
///   than atoms, or an atom's ID is outside the labelled molecules.
/// - [`DynamicsError::ZeroMolecularMass`] if a molecule's mass is not positive.
pub fn reduce_frame(frame: &Frame, labels: &MoleculeLabels) -> Result<CoarseFrame, DynamicsError> {
    let ids = frame
        .molecule_ids()
        .ok_or(DynamicsError::UnpartitionedAtom { atom_index: 0 })?;
    if ids.len() < frame.len() {
        return Err(DynamicsError::UnpartitionedAtom {
            atom_index: ids.len(),
        });
    }

    let count = labels.molecule_count();
    let mut accumulators: Vec<Accumulator> = (0..count).map(|_| Accumulator::default()).collect();
    for (atom_index, (atom, &id)) in frame.atoms().iter().zip(ids).enumerate() {
        let acc = accumulators
            .get_mut(id)
            .ok_or(DynamicsError::UnpartitionedAtom { atom_index })?;
        acc.mass += atom.mass;
        acc.weighted += atom.position.coords * atom.mass;
        acc.charge += atom.charge.unwrap_or(0.0);
        acc.force += atom.force.unwrap_or_else(Vector3::zeros);
        acc.atoms.push(atom_index);
    }

    let all_charged = frame.atoms().iter().all(|a| a.charge.is_some());
    let all_forced = frame.atoms().iter().all(|a| a.force.is_some());

    let sites = accumulators
        .into_iter()
        .enumerate()
        .map(|(molecule_id, acc)| {
            if !(acc.mass > 0.0) {
                return Err(DynamicsError::ZeroMolecularMass { molecule_id });
            }
            let position = Point3::from(acc.weighted / acc.mass);
            let torque = all_forced.then(|| {
                acc.atoms
                    .iter()
                    .map(|&i| {
                        let atom = &frame.atoms()[i];
                        let arm = atom.position - position;
                        arm.cross(&atom.force.unwrap_or_else(Vector3::zeros))
                    })
                    .sum::<Vector3<f64>>()
            });
            Ok(MoleculeSite {
                molecule_id,
                name: labels.name(molecule_id).unwrap_or_default().to_string(),
                formula: labels.formula(molecule_id).unwrap_or_default().to_string(),
                mass: acc.mass,
                position,
                charge: all_charged.then_some(acc.charge),
                force: all_forced.then_some(acc.force),
                torque,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CoarseFrame {
        index: frame.index(),
        cell: *frame.cell(),
        sites,
    })
}
