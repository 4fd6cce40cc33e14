use thiserror::Error;

use super::config::{ConfigError, SelectionError};
use crate::core::dynamics::error::DynamicsError;
use crate::core::topology::error::TopologyError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid frame selection: {source}")]
    Selection {
        #[from]
        source: SelectionError,
    },

    #[error("Topology error: {source}")]
    Topology {
        #[from]
        source: TopologyError,
    },

    #[error("Dynamics error: {source}")]
    Dynamics {
        #[from]
        source: DynamicsError,
    },

    #[error("Failed to read frame {index}: {source}")]
    FrameRead {
        index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("The frame selection is empty")]
    EmptySelection,

    #[error("Frame {frame} has {found} atoms, but the reference frame has {expected}")]
    AtomCountChanged {
        frame: usize,
        expected: usize,
        found: usize,
    },

    #[error("Atom {atom_index} of frame {frame} is '{found}', but it is '{expected}' in the reference frame")]
    AtomOrderChanged {
        frame: usize,
        atom_index: usize,
        expected: String,
        found: String,
    },

    #[error("The molecules of frame {frame} differ from those of the reference frame")]
    TopologyChanged { frame: usize },
}
