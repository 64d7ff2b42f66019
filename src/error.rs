use crate::Scalar;
use std::fmt;

/// Errors produced while parsing or manipulating curves
#[derive(Debug)]
pub enum Error {
    /// Malformed path string, `offset` is the byte offset of the offending input
    ParseError { reason: String, offset: usize },
    /// Geometry operation on coincident points or zero length vectors
    DegenerateGeometry { reason: &'static str },
    /// Projected point lies in the plane of the camera
    ProjectionSingularity { depth: Scalar },
    /// JSON error
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParseError { reason, offset } => {
                write!(f, "failed to parse path at offset {}: {}", offset, reason)
            }
            Error::DegenerateGeometry { reason } => write!(f, "degenerate geometry: {}", reason),
            Error::ProjectionSingularity { depth } => {
                write!(f, "point is coplanar with the camera (depth {:e})", depth)
            }
            #[cfg(feature = "serde")]
            Error::Json(error) => write!(f, "invalid json: {}", error),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        Self::new(std::io::ErrorKind::InvalidData, error)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}
