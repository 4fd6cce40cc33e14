use crate::core::dynamics::unwrap::UnwrapMethod;
use crate::core::topology::cutoff::CutoffTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SelectionError {
    #[error("Cannot parse frame selection '{0}'. Expected 'all', an index, or 'begin:end[:stride]'")]
    Parse(String),
    #[error("Frame stride must be at least 1")]
    ZeroStride,
    #[error("Frame range {begin}:{end} is reversed")]
    Reversed { begin: usize, end: usize },
    #[error("Frame {index} is out of range for a trajectory of {len} frames")]
    OutOfRange { index: usize, len: usize },
}

/// Which frames of a trajectory to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameSelection {
    #[default]
    All,
    Index(usize),
    /// Frames `begin, begin + stride, ...` below `end`. An open `end` runs to
    /// the last frame.
    Range {
        begin: usize,
        end: Option<usize>,
        stride: usize,
    },
}

impl FrameSelection {
    /// Resolves the selection into ascending frame indices.
    ///
    /// # Errors
    ///
    /// Fails if an index or range bound lies past the end of the trajectory,
    /// if the stride is zero, or if the range is reversed.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>, SelectionError> {
        match *self {
            Self::All => Ok((0..len).collect()),
            Self::Index(index) => {
                if index >= len {
                    return Err(SelectionError::OutOfRange { index, len });
                }
                Ok(vec![index])
            }
            Self::Range { begin, end, stride } => {
                if stride == 0 {
                    return Err(SelectionError::ZeroStride);
                }
                let end = end.unwrap_or(len);
                if begin > end {
                    return Err(SelectionError::Reversed { begin, end });
                }
                if end > len {
                    return Err(SelectionError::OutOfRange { index: end, len });
                }
                Ok((begin..end).step_by(stride).collect())
            }
        }
    }
}

impl fmt::Display for FrameSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Index(index) => write!(f, "{index}"),
            Self::Range { begin, end, stride } => match end {
                Some(end) => write!(f, "{begin}:{end}:{stride}"),
                None => write!(f, "{begin}::{stride}"),
            },
        }
    }
}

impl FromStr for FrameSelection {
    type Err = SelectionError;

    /// Parses `all`, `7`, `0:10`, `0:10:2` or `0::5`; `,` may replace `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let parse_err = || SelectionError::Parse(s.to_string());
        let number = |part: &str| part.trim().parse::<usize>().map_err(|_| parse_err());

        let parts: Vec<&str> = trimmed.split([':', ',']).collect();
        match parts.as_slice() {
            [index] => Ok(Self::Index(number(index)?)),
            [begin, end] | [begin, end, _] => {
                let stride = match parts.get(2) {
                    Some(stride) => number(stride)?,
                    None => 1,
                };
                let end = if end.trim().is_empty() {
                    None
                } else {
                    Some(number(end)?)
                };
                Ok(Self::Range {
                    begin: number(begin)?,
                    end,
                    stride,
                })
            }
            _ => Err(parse_err()),
        }
    }
}

/// How molecule IDs are assigned to frames after the reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityPolicy {
    /// Reuse the reference frame's molecule IDs for every frame.
    #[default]
    Reference,
    /// Detect molecules again in every frame and fail if they differ from
    /// the reference.
    PerFrame,
}

impl fmt::Display for IdentityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reference => "reference",
            Self::PerFrame => "per-frame",
        })
    }
}

impl FromStr for IdentityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" => Ok(Self::Reference),
            "per-frame" | "per_frame" | "perframe" => Ok(Self::PerFrame),
            other => Err(format!(
                "Unknown identity policy '{other}'. Expected 'reference' or 'per-frame'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub cutoffs: CutoffTable,
    pub frames: FrameSelection,
    pub method: UnwrapMethod,
    pub identity: IdentityPolicy,
    /// Project whose registry names label the molecules.
    pub project: Option<String>,
    /// One name per distinct formula, in lexicographic formula order.
    pub custom_names: Option<Vec<String>>,
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    cutoffs: Option<CutoffTable>,
    frames: Option<FrameSelection>,
    method: Option<UnwrapMethod>,
    identity: Option<IdentityPolicy>,
    project: Option<String>,
    custom_names: Option<Vec<String>>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cutoffs(mut self, cutoffs: CutoffTable) -> Self {
        self.cutoffs = Some(cutoffs);
        self
    }
    pub fn frames(mut self, frames: FrameSelection) -> Self {
        self.frames = Some(frames);
        self
    }
    pub fn method(mut self, method: UnwrapMethod) -> Self {
        self.method = Some(method);
        self
    }
    pub fn identity(mut self, identity: IdentityPolicy) -> Self {
        self.identity = Some(identity);
        self
    }
    pub fn project(mut self, project: Option<String>) -> Self {
        self.project = project;
        self
    }
    pub fn custom_names(mut self, names: Option<Vec<String>>) -> Self {
        self.custom_names = names;
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        Ok(AnalysisConfig {
            cutoffs: self.cutoffs.ok_or(ConfigError::MissingParameter("cutoffs"))?,
            frames: self.frames.unwrap_or_default(),
            method: self.method.ok_or(ConfigError::MissingParameter("method"))?,
            identity: self.identity.unwrap_or_default(),
            project: self.project,
            custom_names: self.custom_names,
        })
    }
}
