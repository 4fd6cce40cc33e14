use crate::core::dynamics::com::{CoarseFrame, reduce_frame};
use crate::core::io::traits::FrameSource;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::universe::Universe;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[instrument(skip_all, name = "coarse_grain_task", fields(frames = indices.len()))]
pub fn run<S: FrameSource>(
    universe: &Universe,
    source: &S,
    indices: &[usize],
    reporter: &ProgressReporter,
) -> Result<Vec<CoarseFrame>, EngineError> {
    if indices.is_empty() {
        return Ok(Vec::new());
    }

    reporter.report(Progress::TaskStart {
        total_steps: indices.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = indices.iter();

    #[cfg(feature = "parallel")]
    let iterator = indices.par_iter();

    let result = iterator
        .map(|&index| {
            let frame = source.frame(index).map_err(|e| EngineError::FrameRead {
                index,
                source: Box::new(e),
            })?;
            let frame = universe.prepare_frame(frame, index)?;
            let coarse = reduce_frame(&frame, universe.labels())?;
            reporter.report(Progress::TaskIncrement);
            Ok(coarse)
        })
        .collect::<Result<Vec<_>, EngineError>>();

    reporter.report(Progress::TaskFinish);

    let coarse = result?;
    info!(
        frames = coarse.len(),
        molecules = universe.connectivity().count(),
        "Coarse graining complete."
    );
    Ok(coarse)
}
