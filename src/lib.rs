//! # lnstacks - Absorbance Stacks from Normalized Tomography Data
//!
//! `lnstacks` converts a normalized transmission stack stored in HDF5 into an
//! absorbance stack by applying the minus natural logarithm to every frame
//! (Beer-Lambert relation). It is used on synchrotron tomography and
//! spectroscopy data after flat-field normalization, where pixel values lie
//! in `(0, 1]`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lnstacks::transform::StackTransformer;
//!
//! let transformer = StackTransformer::new();
//! let stats = transformer.convert("/data/run01.hdf5")?;
//! println!("{}", stats);
//! // Output written to /data/run01_ln.hdf5
//! # Ok::<(), lnstacks::error::StackError>(())
//! ```
//!
//! ## Output Layout
//!
//! The converted stack is written next to the input as `<stem>_ln.hdf5`:
//!
//! ```text
//! run01_ln.hdf5
//! └── TomoNormalized/                  # same group name as the source
//!     ├── TomoNormalized               # float32 (frames, rows, cols), chunk (1, rows, cols)
//!     │     @ "Number of Frames"
//!     ├── rotation_angle               # copied when present (.h5/.hdf5 sources)
//!     ├── energy                       # copied when present (.h5/.hdf5 sources)
//!     ├── x_pixel_size                 # copied together with y_pixel_size
//!     └── y_pixel_size
//! ```
//!
//! ## Architecture
//!
//! - [`transform`]: conversion driver, configuration and per-pixel kernel
//! - [`chunked`]: per-frame chunked dataset creation
//! - [`metadata`]: best-effort acquisition metadata copy
//! - [`format`]: input format families and output naming
//! - [`error`]: error types
//!
//! ## Features
//!
//! - `parallel`: transform batches of frames on a rayon pool
//! - `colorized_output` (default): styled completion notice in the CLI

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod chunked;
pub mod error;
pub mod format;
pub mod metadata;
pub mod transform;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::chunked::{DatasetSpec, FRAME_COUNT_ATTR};
    pub use crate::error::StackError;
    pub use crate::format::{output_path_for, FormatFamily, InputStack};
    pub use crate::metadata::{copy_metadata, CopyReport, FieldUnavailable, MetadataField};
    pub use crate::transform::{
        transform, StackTransformer, TransformConfig, TransformStats, DEFAULT_DATASET_PATH,
        DEFAULT_TREE_PATH,
    };
}
