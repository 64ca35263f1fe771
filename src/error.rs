//! Error types for stack conversion

/// Errors that can occur while converting a stack
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    /// Input argument is missing or unusable; raised before any I/O
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The HDF5 layer failed to open, resolve, read or write something
    #[error("HDF5 error while {context}: {source}")]
    StructuralError {
        /// What the converter was doing when the error occurred
        context: String,
        /// Underlying HDF5 error
        #[source]
        source: hdf5::Error,
    },

    /// The primary dataset is not a non-empty 3D stack
    #[error("Dataset {dataset} has shape {shape:?}, expected (frames, rows, cols) with no empty axis")]
    InvalidShape {
        /// Path of the offending dataset
        dataset: String,
        /// Shape found in the source container
        shape: Vec<usize>,
    },

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The requested operation exists in the interface but has no implementation
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// The conversion was stopped through its cancellation flag
    #[error("Conversion cancelled after {frames_written} of {n_frames} frames")]
    Cancelled {
        /// Frames fully written before cancellation was observed
        frames_written: usize,
        /// Frames in the source stack
        n_frames: usize,
    },
}

impl StackError {
    /// Whether this error comes from the layout or content of a container
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            StackError::StructuralError { .. } | StackError::InvalidShape { .. }
        )
    }
}

/// Attach a description of the failed step to an HDF5 result
pub(crate) trait Hdf5ResultExt<T> {
    fn structural<F>(self, context: F) -> Result<T, StackError>
    where
        F: FnOnce() -> String;
}

impl<T> Hdf5ResultExt<T> for hdf5::Result<T> {
    fn structural<F>(self, context: F) -> Result<T, StackError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|source| StackError::StructuralError {
            context: context(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        let shape = StackError::InvalidShape {
            dataset: "TomoNormalized/TomoNormalized".to_string(),
            shape: vec![4, 4],
        };
        assert!(shape.is_structural());
        assert!(!StackError::InvalidArgument("empty".to_string()).is_structural());
        assert!(!StackError::NotImplemented("MRC stack transform").is_structural());
    }

    #[test]
    fn test_cancelled_message() {
        let err = StackError::Cancelled {
            frames_written: 3,
            n_frames: 10,
        };
        assert_eq!(err.to_string(), "Conversion cancelled after 3 of 10 frames");
    }
}
