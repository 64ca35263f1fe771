//! Chunked dataset creation for frame-by-frame streaming
//!
//! Output stacks are laid out with exactly one HDF5 chunk per frame. The
//! converter writes whole frames in index order, so every write lands on one
//! complete chunk and never straddles a chunk boundary.

use hdf5::types::H5Type;
use hdf5::{Dataset, Group};

/// Attribute on the primary dataset recording how many frames it holds
pub const FRAME_COUNT_ATTR: &str = "Number of Frames";

/// Geometry of a 3D frame stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSpec {
    /// Number of frames (first axis)
    pub n_frames: usize,
    /// Rows per frame
    pub n_rows: usize,
    /// Columns per frame
    pub n_cols: usize,
}

impl DatasetSpec {
    /// Build a spec from a source dataset shape.
    ///
    /// Returns `None` unless the shape has exactly three non-zero axes.
    pub fn for_stack(shape: &[usize]) -> Option<Self> {
        match *shape {
            [n_frames, n_rows, n_cols] if n_frames > 0 && n_rows > 0 && n_cols > 0 => Some(Self {
                n_frames,
                n_rows,
                n_cols,
            }),
            _ => None,
        }
    }

    /// Full dataset shape `(frames, rows, cols)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_frames, self.n_rows, self.n_cols)
    }

    /// Chunk shape `(1, rows, cols)`: one chunk per frame
    pub fn chunk(&self) -> (usize, usize, usize) {
        (1, self.n_rows, self.n_cols)
    }

    /// Elements in a single frame
    pub fn frame_len(&self) -> usize {
        self.n_rows * self.n_cols
    }
}

/// Create `name` under `group` with the spec's shape and per-frame chunking
pub fn create_dataset<T: H5Type>(
    group: &Group,
    name: &str,
    spec: &DatasetSpec,
) -> hdf5::Result<Dataset> {
    group
        .new_dataset::<T>()
        .chunk(spec.chunk())
        .shape(spec.shape())
        .create(name)
}

/// Record the frame count as a signed 64-bit scalar attribute on `dataset`
pub fn write_frame_count(dataset: &Dataset, n_frames: usize) -> hdf5::Result<()> {
    let n_frames = i64::try_from(n_frames)
        .map_err(|_| hdf5::Error::from(format!("frame count {} exceeds i64", n_frames)))?;
    dataset
        .new_attr::<i64>()
        .create(FRAME_COUNT_ATTR)?
        .write_scalar(&n_frames)
}
