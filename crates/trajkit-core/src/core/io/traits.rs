use crate::core::models::frame::Frame;
use std::error::Error;

/// Random access to the frames of a trajectory.
///
/// This is the seam between the analysis pipeline and trajectory readers.
/// Implementors own the parsing of their format; the pipeline only ever asks
/// for frame counts and individual frames, possibly from several threads.
pub trait FrameSource: Sync {
    /// The error type for frame access.
    type Error: Error + Send + Sync + 'static;

    /// Number of frames in the trajectory.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the frame at `index`.
    ///
    /// # Return
    ///
    /// The returned frame carries its trajectory index.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or the frame cannot be read.
    fn frame(&self, index: usize) -> Result<Frame, Self::Error>;
}
