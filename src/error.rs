use std::path::PathBuf;

/// Defines the error type for all fallible operations in this crate
///
/// All errors are fatal: they propagate to the binaries, which print the
/// message and exit with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum TndmError {
    /// Malformed or unsupported document (PVD, VTU, PVTU, CSV, JSON contents)
    #[error("{}: {message}", .path.display())]
    Format {
        /// The offending file
        path: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// A referenced file does not exist
    #[error("the file {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// A station lies too far outside of the mesh's bounding box
    #[error("station {point:?} lies too far outside of the mesh's bounding box {bounds}")]
    OutOfBounds {
        /// The station coordinates
        point: [f64; 3],
        /// The bounding box as `[xmin, xmax, ymin, ymax, zmin, zmax]`
        bounds: String,
    },

    /// No cell could be found for a station
    #[error("could not find cell for station {point:?} in {}", .path.display())]
    ProbeMiss {
        /// The (clamped) station coordinates
        point: [f64; 3],
        /// The mesh file being probed
        path: PathBuf,
    },

    /// An invalid argument was given to a function
    #[error("{0}")]
    Invalid(&'static str),

    /// I/O failure
    #[error("{}: {source}", .path.display())]
    Io {
        /// The file being read or written
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// Figure generation failure (reported by plotpy)
    #[error("cannot generate figure: {0}")]
    Plot(&'static str),
}

impl TndmError {
    /// Returns a format error for the given path
    pub fn format<P, S>(path: P, message: S) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        TndmError::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns an I/O error for the given path
    pub fn io<P>(path: P, source: std::io::Error) -> Self
    where
        P: Into<PathBuf>,
    {
        TndmError::Io {
            path: path.into(),
            source,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
