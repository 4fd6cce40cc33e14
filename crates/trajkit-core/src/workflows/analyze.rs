use crate::core::dynamics::com::CoarseFrame;
use crate::core::dynamics::unwrap::UnwrappedTrajectory;
use crate::core::io::traits::FrameSource;
use crate::core::topology::registry::NameRegistry;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::universe::Universe;
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Trajectory indices of the analyzed frames, in order.
    pub frames: Vec<usize>,
    /// Molecule sizes of the reference frame: atoms per molecule -> count.
    pub census: BTreeMap<usize, usize>,
    /// Formula -> name of every molecular species.
    pub species: BTreeMap<String, String>,
    /// Center-of-mass frames, one per analyzed frame.
    pub coarse: Vec<CoarseFrame>,
    /// Unwrapped center-of-mass trajectories grouped by species name.
    pub unwrapped: UnwrappedTrajectory,
}

/// Runs the full pipeline over the selected frames of `source`.
///
/// The first selected frame is the reference: its molecules are detected and
/// labelled once, then every selected frame is reduced to molecular centers
/// of mass, and each molecule's trajectory is unwrapped.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run<S: FrameSource>(
    source: &S,
    config: &AnalysisConfig,
    registry: Option<&NameRegistry>,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, EngineError> {
    // === Phase 1: Frame selection and reference topology ===
    let (frames, universe) = reporter.phase("Building Topology", || {
        let frames = config.frames.resolve(source.len())?;
        let &first = frames.first().ok_or(EngineError::EmptySelection)?;
        info!(
            "Analyzing {} of {} frames (selection '{}').",
            frames.len(),
            source.len(),
            config.frames
        );

        let reference = source.frame(first).map_err(|e| EngineError::FrameRead {
            index: first,
            source: Box::new(e),
        })?;
        let universe = Universe::from_config(reference, config, registry)?;
        reporter.report(Progress::Message(format!(
            "Found {} molecules of {} species",
            universe.connectivity().count(),
            universe.labels().species_count()
        )));
        Ok::<_, EngineError>((frames, universe))
    })?;

    // === Phase 2: Center-of-mass reduction ===
    let coarse = reporter.phase("Coarse Graining", || {
        universe.coarse_grain(source, &frames, reporter)
    })?;

    // === Phase 3: Unwrapping ===
    let unwrapped = reporter.phase("Unwrapping", || universe.unwrap(&coarse, config.method))?;

    info!(
        "Workflow complete: {} frames, {} molecules, {} species.",
        frames.len(),
        universe.connectivity().count(),
        universe.labels().species_count()
    );

    Ok(AnalysisResult {
        census: universe.census(),
        species: universe.labels().species().clone(),
        frames: coarse
            .iter()
            .zip(&frames)
            .map(|(c, &position)| c.index.unwrap_or(position))
            .collect(),
        coarse,
        unwrapped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dynamics::unwrap::UnwrapMethod;
    use crate::core::io::memory::InMemoryTrajectory;
    use crate::core::models::atom::Atom;
    use crate::core::models::cell::SimulationBox;
    use crate::core::models::frame::Frame;
    use crate::core::topology::cutoff::CutoffTable;
    use crate::engine::config::{AnalysisConfigBuilder, FrameSelection};
    use nalgebra::Point3;
    use std::sync::{Arc, Mutex};

    // Two Li ions and a CO2 molecule drifting along +x.
    fn trajectory(frames: usize) -> InMemoryTrajectory {
        (0..frames)
            .map(|t| {
                let shift = 0.7 * t as f64;
                let wrap = |x: f64| (x + shift).rem_euclid(12.0);
                let atoms = vec![
                    Atom::from_element("Li", Point3::new(wrap(11.0), 2.0, 2.0)).unwrap(),
                    Atom::from_element("C", Point3::new(wrap(5.0), 6.0, 6.0)).unwrap(),
                    Atom::from_element("O", Point3::new(wrap(3.84), 6.0, 6.0)).unwrap(),
                    Atom::from_element("O", Point3::new(wrap(6.16), 6.0, 6.0)).unwrap(),
                    Atom::from_element("Li", Point3::new(wrap(1.0), 9.0, 9.0)).unwrap(),
                ];
                Frame::new(atoms, SimulationBox::cubic(12.0).unwrap())
            })
            .collect()
    }

    fn config(frames: FrameSelection) -> AnalysisConfig {
        AnalysisConfigBuilder::new()
            .cutoffs(CutoffTable::Uniform(1.0))
            .method(UnwrapMethod::Hybrid)
            .frames(frames)
            .build()
            .unwrap()
    }

    #[test]
    fn pipeline_produces_continuous_trajectories() {
        let source = trajectory(10);
        let mut registry = NameRegistry::new();
        registry.set_name("Demo", "CO2", "CO2");
        let mut config = config(FrameSelection::All);
        config.project = Some("Demo".to_string());

        let result = run(&source, &config, Some(&registry), &ProgressReporter::new()).unwrap();

        assert_eq!(result.frames, (0..10).collect::<Vec<_>>());
        assert_eq!(result.census, BTreeMap::from([(1, 2), (3, 1)]));
        assert_eq!(result.species.get("CO2").map(String::as_str), Some("CO2"));
        assert_eq!(result.species.get("Li").map(String::as_str), Some("mol2"));

        let lithium = result.unwrapped.molecules("mol2").unwrap();
        assert_eq!(lithium.len(), 2);
        for molecule in lithium {
            for pair in molecule.positions.windows(2) {
                assert!((pair[1].x - pair[0].x - 0.7).abs() < 1e-9);
            }
        }
        let first_li = &lithium[0].positions;
        assert!((first_li[9].x - (11.0 + 6.3)).abs() < 1e-9);
    }

    #[test]
    fn frame_selection_is_honored() {
        let source = trajectory(10);
        let selection = "2:9:3".parse().unwrap();
        let result = run(&source, &config(selection), None, &ProgressReporter::new()).unwrap();
        assert_eq!(result.frames, vec![2, 5, 8]);
        assert_eq!(result.coarse.len(), 3);
        assert_eq!(result.unwrapped.frame_indices(), &[2, 5, 8]);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let source = trajectory(4);
        let selection = "2:2".parse().unwrap();
        let err = run(&source, &config(selection), None, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::EmptySelection));
    }

    #[test]
    fn phases_are_reported_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::PhaseStart { name } = event {
                sink.lock().unwrap().push(name);
            }
        }));
        run(&trajectory(3), &config(FrameSelection::All), None, &reporter).unwrap();
        assert_eq!(
            *events.lock().unwrap(),
            vec!["Building Topology", "Coarse Graining", "Unwrapping"]
        );
    }
}
