use super::traits::FrameSource;
use crate::core::models::frame::Frame;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FrameSourceError {
    #[error("Frame {index} is out of range for a trajectory of {len} frames")]
    OutOfRange { index: usize, len: usize },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// A trajectory held entirely in memory.
///
/// Frames without an index are numbered by their position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryTrajectory {
    frames: Vec<Frame>,
}

impl InMemoryTrajectory {
    pub fn new(frames: Vec<Frame>) -> Self {
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, f)| match f.index() {
                Some(_) => f,
                None => f.with_index(i),
            })
            .collect();
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn push(&mut self, frame: Frame) {
        let position = self.frames.len();
        let frame = match frame.index() {
            Some(_) => frame,
            None => frame.with_index(position),
        };
        self.frames.push(frame);
    }

    /// Loads a JSON array of frames.
    pub fn load_json(path: &Path) -> Result<Self, FrameSourceError> {
        let file = File::open(path).map_err(|e| FrameSourceError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let frames: Vec<Frame> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| FrameSourceError::Json {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        debug!("Loaded {} frames from {:?}", frames.len(), path);
        Ok(Self::new(frames))
    }

    pub fn save_json(&self, path: &Path) -> Result<(), FrameSourceError> {
        let file = File::create(path).map_err(|e| FrameSourceError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        serde_json::to_writer(BufWriter::new(file), &self.frames).map_err(|e| {
            FrameSourceError::Json {
                path: path.to_string_lossy().to_string(),
                source: e,
            }
        })
    }
}

impl FromIterator<Frame> for InMemoryTrajectory {
    fn from_iter<T: IntoIterator<Item = Frame>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FrameSource for InMemoryTrajectory {
    type Error = FrameSourceError;

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, index: usize) -> Result<Frame, Self::Error> {
        self.frames
            .get(index)
            .cloned()
            .ok_or(FrameSourceError::OutOfRange {
                index,
                len: self.frames.len(),
            })
    }
}
