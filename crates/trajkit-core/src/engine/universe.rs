use super::config::{AnalysisConfig, IdentityPolicy};
use super::error::EngineError;
use super::progress::ProgressReporter;
use super::tasks;
use crate::core::dynamics::com::CoarseFrame;
use crate::core::dynamics::unwrap::{UnwrapMethod, UnwrappedTrajectory, unwrap_series};
use crate::core::io::traits::FrameSource;
use crate::core::models::frame::Frame;
use crate::core::topology::connectivity::{Connectivity, detect_molecules};
use crate::core::topology::cutoff::CutoffTable;
use crate::core::topology::labeler::{MoleculeLabels, label_molecules, molecule_formulas};
use crate::core::topology::registry::{NameRegistry, ProjectNames};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// The molecular topology of a trajectory, taken from a reference frame.
///
/// Holds the reference connectivity and the molecule labels, and attaches
/// molecule IDs to later frames according to its [`IdentityPolicy`].
#[derive(Debug, Clone)]
pub struct Universe {
    reference: Frame,
    connectivity: Connectivity,
    labels: MoleculeLabels,
    cutoffs: CutoffTable,
    identity: IdentityPolicy,
}

impl Universe {
    /// Detects and labels the molecules of `reference`.
    ///
    /// # Errors
    ///
    /// Propagates cutoff, partition and naming errors from the topology layer.
    #[instrument(skip_all, name = "universe_setup", fields(atoms = reference.len()))]
    pub fn new(
        mut reference: Frame,
        cutoffs: CutoffTable,
        identity: IdentityPolicy,
        names: Option<&ProjectNames>,
        custom_names: Option<&[String]>,
    ) -> Result<Self, EngineError> {
        let connectivity = detect_molecules(&reference, &cutoffs)?;
        let labels = label_molecules(
            &reference,
            connectivity.molecule_ids(),
            names,
            custom_names,
        )?;
        reference.clear_molecule_ids();
        reference.attach_molecule_ids(connectivity.molecule_ids().to_vec())?;

        info!(
            molecules = connectivity.count(),
            species = labels.species_count(),
            "Reference topology built."
        );

        Ok(Self {
            reference,
            connectivity,
            labels,
            cutoffs,
            identity,
        })
    }

    /// Builds the universe described by `config`, naming molecules from the
    /// configured project of `registry` when both are given.
    pub fn from_config(
        reference: Frame,
        config: &AnalysisConfig,
        registry: Option<&NameRegistry>,
    ) -> Result<Self, EngineError> {
        let names = match (&config.project, registry) {
            (Some(project), Some(registry)) => {
                let names = registry.project(project);
                if names.is_none() {
                    warn!(
                        "Project '{}' has no entry in the name registry; placeholder names will be used.",
                        project
                    );
                }
                names
            }
            _ => None,
        };
        Self::new(
            reference,
            config.cutoffs.clone(),
            config.identity,
            names,
            config.custom_names.as_deref(),
        )
    }

    pub fn reference(&self) -> &Frame {
        &self.reference
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn labels(&self) -> &MoleculeLabels {
        &self.labels
    }

    pub fn identity(&self) -> IdentityPolicy {
        self.identity
    }

    pub fn atom_count(&self) -> usize {
        self.reference.len()
    }

    /// Molecule sizes of the reference frame: atoms per molecule -> count.
    pub fn census(&self) -> BTreeMap<usize, usize> {
        self.connectivity.census()
    }

    /// Attaches molecule IDs to `frame`.
    ///
    /// `position` numbers the frame in error reports when it has no index.
    ///
    /// # Errors
    ///
    /// Fails if the frame's atoms do not match the reference atom for atom,
    /// or, under [`IdentityPolicy::PerFrame`], if its molecules differ from
    /// the reference molecules.
    pub fn prepare_frame(&self, mut frame: Frame, position: usize) -> Result<Frame, EngineError> {
        let label = frame.index().unwrap_or(position);
        if frame.len() != self.reference.len() {
            return Err(EngineError::AtomCountChanged {
                frame: label,
                expected: self.reference.len(),
                found: frame.len(),
            });
        }
        if let Some((atom_index, (expected, found))) = self
            .reference
            .symbols()
            .zip(frame.symbols())
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(EngineError::AtomOrderChanged {
                frame: label,
                atom_index,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }

        let ids = match self.identity {
            IdentityPolicy::Reference => self.connectivity.molecule_ids().to_vec(),
            IdentityPolicy::PerFrame => {
                let connectivity = detect_molecules(&frame, &self.cutoffs)?;
                let formulas = molecule_formulas(&frame, connectivity.molecule_ids())?;
                if formulas != self.labels.formulas() {
                    return Err(EngineError::TopologyChanged { frame: label });
                }
                connectivity.into_molecule_ids()
            }
        };

        frame.attach_molecule_ids(ids)?;
        Ok(frame)
    }

    /// Reads and reduces the frames at `indices` to their molecular centers
    /// of mass.
    pub fn coarse_grain<S: FrameSource>(
        &self,
        source: &S,
        indices: &[usize],
        reporter: &ProgressReporter,
    ) -> Result<Vec<CoarseFrame>, EngineError> {
        tasks::coarse_grain::run(self, source, indices, reporter)
    }

    /// Unwraps the center-of-mass trajectory of every molecule.
    pub fn unwrap(
        &self,
        coarse: &[CoarseFrame],
        method: UnwrapMethod,
    ) -> Result<UnwrappedTrajectory, EngineError> {
        Ok(unwrap_series(coarse, method)?)
    }
}
