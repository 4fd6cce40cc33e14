use thiserror::Error;

/// Marker used in [`TopologyError::InvalidCutoffKind`] when the offending
/// value is the uniform multiplier rather than a per-species entry.
pub const UNIFORM_CUTOFF: &str = "*";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("Invalid cutoff specification for species '{species}': {reason}")]
    InvalidCutoffKind {
        species: String,
        reason: &'static str,
    },

    #[error("No tabulated covalent radius for species '{0}'")]
    UnknownElement(String),

    #[error(
        "Expected {expected} molecule names (one per distinct chemical formula), but {provided} were provided"
    )]
    NameCountMismatch { expected: usize, provided: usize },

    #[error("Atom {atom_index} is not assigned to any molecule")]
    UnpartitionedAtom { atom_index: usize },

    #[error("Expected one molecule ID per atom ({atoms} atoms), but {ids} were given")]
    MoleculeIdCountMismatch { atoms: usize, ids: usize },

    #[error("Molecule ID {missing} has no atoms; molecule IDs must be contiguous")]
    SparseMoleculeIds { missing: usize },
}
