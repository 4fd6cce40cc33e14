use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DynamicsError {
    #[error("Box sequence has {boxes} entries but the coordinate sequence has {coordinates}")]
    BoxLengthMismatch { coordinates: usize, boxes: usize },

    #[error("Unknown unwrap method '{0}'. Expected one of: heuristic, displacement, hybrid")]
    UnknownUnwrapMethod(String),

    #[error("Box lengths at frame {frame} must be positive and finite")]
    NonPositiveBox { frame: usize },

    #[error("Atom {atom_index} is not assigned to any molecule")]
    UnpartitionedAtom { atom_index: usize },

    #[error("Molecule {molecule_id} has a non-positive total mass")]
    ZeroMolecularMass { molecule_id: usize },

    #[error(
        "Coarse frame {frame} holds {found} molecules, but the first frame holds {expected}"
    )]
    SiteCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
}
