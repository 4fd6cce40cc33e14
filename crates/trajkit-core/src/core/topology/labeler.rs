use super::error::TopologyError;
use super::formula::chemical_formula;
use super::registry::ProjectNames;
use crate::core::models::frame::Frame;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Chemical formulas and names of the molecules of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoleculeLabels {
    formulas: Vec<String>,
    names: Vec<String>,
    species: BTreeMap<String, String>,
}

impl MoleculeLabels {
    pub fn molecule_count(&self) -> usize {
        self.names.len()
    }

    /// Number of distinct molecular species (distinct formulas).
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn name(&self, molecule_id: usize) -> Option<&str> {
        self.names.get(molecule_id).map(String::as_str)
    }

    pub fn formula(&self, molecule_id: usize) -> Option<&str> {
        self.formulas.get(molecule_id).map(String::as_str)
    }

    /// Per-molecule names, indexed by molecule ID.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Per-molecule formulas, indexed by molecule ID.
    pub fn formulas(&self) -> &[String] {
        &self.formulas
    }

    /// Formula -> name mapping of every species found.
    pub fn species(&self) -> &BTreeMap<String, String> {
        &self.species
    }

    /// IDs of the molecules carrying `name`, in ascending order.
    pub fn molecules_named(&self, name: &str) -> Vec<usize> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(id, _)| id)
            .collect()
    }
}

/// Computes the chemical formula of each molecule, indexed by molecule ID.
///
/// # Errors
///
/// Fails with [`TopologyError::UnpartitionedAtom`] if `molecule_ids` does not
/// cover every atom, and [`TopologyError::SparseMoleculeIds`] if some ID below
/// the maximum has no atoms.
pub fn molecule_formulas(
    frame: &Frame,
    molecule_ids: &[usize],
) -> Result<Vec<String>, TopologyError> {
    if molecule_ids.len() != frame.len() {
        return Err(TopologyError::UnpartitionedAtom {
            atom_index: molecule_ids.len().min(frame.len()),
        });
    }
    let count = molecule_ids.iter().max().map_or(0, |max| max + 1);
    let mut members: Vec<Vec<&str>> = vec![Vec::new(); count];
    for (symbol, &id) in frame.symbols().zip(molecule_ids) {
        members[id].push(symbol);
    }
    members
        .into_iter()
        .enumerate()
        .map(|(id, symbols)| {
            if symbols.is_empty() {
                Err(TopologyError::SparseMoleculeIds { missing: id })
            } else {
                Ok(chemical_formula(symbols))
            }
        })
        .collect()
}

/// Names every molecule of a frame.
///
/// Distinct formulas are visited in lexicographic order. For each one the
/// name is taken, in priority order, from `custom_names` (positionally, one
/// entry per distinct formula), from the project's `registry` table, or
/// synthesized as `mol{k}` where `k` is the 1-based position of the formula in
/// the sorted list. The result only depends on the input.
///
/// # Errors
///
/// Fails with [`TopologyError::NameCountMismatch`] when `custom_names` does
/// not hold exactly one name per distinct formula, or propagates the
/// partition errors of [`molecule_formulas`].
pub fn label_molecules(
    frame: &Frame,
    molecule_ids: &[usize],
    registry: Option<&ProjectNames>,
    custom_names: Option<&[String]>,
) -> Result<MoleculeLabels, TopologyError> {
    let formulas = molecule_formulas(frame, molecule_ids)?;
    let unique: BTreeSet<&str> = formulas.iter().map(String::as_str).collect();

    if let Some(custom) = custom_names {
        if custom.len() != unique.len() {
            return Err(TopologyError::NameCountMismatch {
                expected: unique.len(),
                provided: custom.len(),
            });
        }
    }

    let species: BTreeMap<String, String> = unique
        .iter()
        .enumerate()
        .map(|(position, &formula)| {
            let name = custom_names
                .map(|custom| custom[position].clone())
                .or_else(|| registry.and_then(|r| r.get(formula)).cloned())
                .unwrap_or_else(|| format!("mol{}", position + 1));
            (formula.to_string(), name)
        })
        .collect();

    let names = formulas
        .iter()
        .map(|formula| species[formula].clone())
        .collect();

    debug!(
        "Labelled {} molecules of {} distinct species: {:?}",
        formulas.len(),
        species.len(),
        species
    );

    Ok(MoleculeLabels {
        formulas,
        names,
        species,
    })
}
