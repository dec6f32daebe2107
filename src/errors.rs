use std::path::PathBuf;

use crate::components::Window;

pub type Result<T> = std::result::Result<T, BandioError>;

/// Failure reported by a storage engine, kept as the source of [BandioError]s.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum BandioError {
    #[error("Could not open {path:?}: {reason}")]
    OpenError {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<EngineError>,
    },
    #[error("Could not create {path:?}: {reason}")]
    CreateError {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<EngineError>,
    },
    #[error("Invalid open mode {0:?}, expected one of r, read, w, update, r+")]
    InvalidMode(String),
    #[error("Invalid dimensions {width}x{height} with {bands} bands, all must be at least 1")]
    InvalidDimensions {
        width: usize,
        height: usize,
        bands: usize,
    },
    #[error("Unsupported pixel type {0}")]
    UnsupportedType(String),
    #[error("Band index {index} is out of range 1..={band_count}")]
    InvalidBandIndex { index: usize, band_count: usize },
    #[error("Window {window} is outside of the {width}x{height} pixel grid")]
    WindowOutOfBounds {
        window: Window,
        width: usize,
        height: usize,
    },
    #[error("Buffer holds {actual} elements but {required} are required")]
    BufferTooSmall { required: usize, actual: usize },
    #[error("Expected {expected} elements but got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Dataset was not opened for writing")]
    NotWritable,
    #[error("Dataset is closed")]
    DatasetClosed,
    #[error("Invalid geo transform {0:?}")]
    InvalidTransform([f64; 6]),
    #[error("No EPSG authority code found in crs")]
    CrsNotFound,
    #[error("Authority code {code:?} is not an integer")]
    CrsParseError {
        code: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("I/O failed: {reason}")]
    IoError {
        reason: String,
        #[source]
        source: Option<EngineError>,
    },
}

impl BandioError {
    pub(crate) fn io(reason: impl Into<String>) -> Self {
        BandioError::IoError {
            reason: reason.into(),
            source: None,
        }
    }
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for BandioError {
    fn from(err: gdal::errors::GdalError) -> Self {
        BandioError::IoError {
            reason: "GDAL call failed".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::error::Error;

    #[rstest]
    fn engine_failures_keep_their_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only volume");
        let err = BandioError::CreateError {
            path: PathBuf::from("x.tif"),
            reason: "driver refused".to_string(),
            source: Some(Box::new(io)),
        };
        assert_eq!(err.to_string(), "Could not create \"x.tif\": driver refused");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "read only volume");
        assert!(source.downcast_ref::<std::io::Error>().is_some());
        assert!(BandioError::io("no band 3").source().is_none());
    }
}
