use super::error::{TopologyError, UNIFORM_CUTOFF};
use crate::core::models::element;
use crate::core::models::frame::Frame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Correction factors applied to the natural (covalent) bonding radii.
///
/// Either a single multiplier shared by every species, or one multiplier per
/// species. A per-species table must cover every species it is applied to;
/// there is no fallback value for missing entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CutoffTable {
    Uniform(f64),
    PerSpecies(BTreeMap<String, f64>),
}

impl Default for CutoffTable {
    fn default() -> Self {
        CutoffTable::Uniform(1.0)
    }
}

impl CutoffTable {
    /// Loads a per-species cutoff table from a TOML file.
    ///
    /// The file is a flat table of `Symbol = multiplier` entries, e.g.
    /// `Li = 0.1`. Multipliers are validated when the table is applied.
    pub fn load(path: &Path) -> Result<Self, CutoffLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| CutoffLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let table: BTreeMap<String, f64> =
            toml::from_str(&content).map_err(|e| CutoffLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        Ok(CutoffTable::PerSpecies(table))
    }

    /// Returns the multiplier configured for `symbol`, if any.
    pub fn multiplier(&self, symbol: &str) -> Option<f64> {
        match self {
            CutoffTable::Uniform(value) => Some(*value),
            CutoffTable::PerSpecies(table) => table.get(symbol).copied(),
        }
    }

    /// Checks that the table can be applied to every species in `species`.
    pub fn validate_for<'a>(
        &self,
        species: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), TopologyError> {
        if let CutoffTable::Uniform(value) = self {
            check_multiplier(UNIFORM_CUTOFF, *value)?;
        }
        for symbol in species {
            let value = self
                .multiplier(symbol)
                .ok_or_else(|| TopologyError::InvalidCutoffKind {
                    species: symbol.to_string(),
                    reason: "species is missing from the per-species cutoff table",
                })?;
            check_multiplier(symbol, value)?;
        }
        Ok(())
    }

    /// Computes the effective bonding radius of every atom in `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidCutoffKind`] if a species is not covered
    /// or a multiplier is not positive, and [`TopologyError::UnknownElement`]
    /// if a species has no tabulated covalent radius.
    pub fn radii(&self, frame: &Frame) -> Result<Vec<f64>, TopologyError> {
        self.validate_for(frame.species())?;
        frame
            .symbols()
            .map(|symbol| {
                let natural = element::covalent_radius(symbol)
                    .ok_or_else(|| TopologyError::UnknownElement(symbol.to_string()))?;
                let multiplier =
                    self.multiplier(symbol)
                        .ok_or_else(|| TopologyError::InvalidCutoffKind {
                            species: symbol.to_string(),
                            reason: "species is missing from the per-species cutoff table",
                        })?;
                Ok(natural * multiplier)
            })
            .collect()
    }
}

fn check_multiplier(species: &str, value: f64) -> Result<(), TopologyError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TopologyError::InvalidCutoffKind {
            species: species.to_string(),
            reason: "cutoff multipliers must be positive and finite",
        })
    }
}

#[derive(Debug, Error)]
pub enum CutoffLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::cell::SimulationBox;
    use nalgebra::Point3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lithium_fluoride_frame() -> Frame {
        let atoms = vec![
            Atom::from_element("Li", Point3::new(0.0, 0.0, 0.0)).unwrap(),
            Atom::from_element("F", Point3::new(1.5, 0.0, 0.0)).unwrap(),
        ];
        Frame::new(atoms, SimulationBox::cubic(10.0).unwrap())
    }

    #[test]
    fn uniform_table_scales_every_radius() {
        let radii = CutoffTable::Uniform(2.0)
            .radii(&lithium_fluoride_frame())
            .unwrap();
        assert_eq!(radii, vec![2.56, 1.14]);
    }

    #[test]
    fn per_species_table_scales_each_species_independently() {
        let table = CutoffTable::PerSpecies(BTreeMap::from([
            ("Li".to_string(), 0.5),
            ("F".to_string(), 1.0),
        ]));
        let radii = table.radii(&lithium_fluoride_frame()).unwrap();
        assert_eq!(radii, vec![0.64, 0.57]);
    }

    #[test]
    fn per_species_table_missing_a_species_fails() {
        let table = CutoffTable::PerSpecies(BTreeMap::from([("Li".to_string(), 0.5)]));
        let err = table.radii(&lithium_fluoride_frame()).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::InvalidCutoffKind { ref species, .. } if species == "F"
        ));
    }

    #[test]
    fn non_positive_multipliers_are_rejected() {
        let err = CutoffTable::Uniform(0.0)
            .validate_for(["Li"])
            .unwrap_err();
        assert!(matches!(
            err,
            TopologyError::InvalidCutoffKind { ref species, .. } if species == UNIFORM_CUTOFF
        ));

        let table = CutoffTable::PerSpecies(BTreeMap::from([("Li".to_string(), -1.0)]));
        assert!(table.validate_for(["Li"]).is_err());

        let table = CutoffTable::PerSpecies(BTreeMap::from([("Li".to_string(), f64::NAN)]));
        assert!(table.validate_for(["Li"]).is_err());
    }

    #[test]
    fn unknown_species_without_radius_fails() {
        let atoms = vec![Atom::new("Xx", Point3::origin(), 1.0)];
        let frame = Frame::new(atoms, SimulationBox::cubic(10.0).unwrap());
        let err = CutoffTable::Uniform(1.0).radii(&frame).unwrap_err();
        assert_eq!(err, TopologyError::UnknownElement("Xx".to_string()));
    }

    #[test]
    fn extra_species_in_table_are_ignored() {
        let table = CutoffTable::PerSpecies(BTreeMap::from([
            ("Li".to_string(), 1.0),
            ("F".to_string(), 1.0),
            ("P".to_string(), 1.0),
        ]));
        assert!(table.radii(&lithium_fluoride_frame()).is_ok());
    }

    #[test]
    fn untagged_deserialization_accepts_scalar_and_table() {
        #[derive(Deserialize)]
        struct Wrapper {
            cutoff: CutoffTable,
        }

        let scalar: Wrapper = toml::from_str("cutoff = 1.2").unwrap();
        assert_eq!(scalar.cutoff, CutoffTable::Uniform(1.2));

        let table: Wrapper = toml::from_str("[cutoff]\nLi = 0.1\nF = 1.0\n").unwrap();
        assert_eq!(table.cutoff.multiplier("Li"), Some(0.1));
        assert_eq!(table.cutoff.multiplier("F"), Some(1.0));
    }

    #[test]
    fn load_reads_per_species_table_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "H = 1.0\nC = 1.0\nO = 1.0\nLi = 0.1").unwrap();
        let table = CutoffTable::load(file.path()).unwrap();
        assert_eq!(table.multiplier("Li"), Some(0.1));
        assert_eq!(table.multiplier("P"), None);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CutoffTable::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CutoffLoadError::Io { .. }));
    }
}
