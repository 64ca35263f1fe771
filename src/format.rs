//! Input format classification and output naming
//!
//! Formats are recognised by the file extension alone. Matching is exact and
//! case-sensitive: `scan.h5` and `scan.hdf5` belong to the HDF5 family,
//! `scan.H5` does not.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::StackError;

/// Suffix appended to the input file stem to name the converted stack
pub const OUTPUT_SUFFIX: &str = "_ln";

/// Extension of every converted stack
pub const OUTPUT_EXTENSION: &str = "hdf5";

/// Container family an input file belongs to, judged by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFamily {
    /// `.h5` or `.hdf5`
    Hdf5Family,
    /// `.mrc`
    MrcFamily,
    /// Anything else, including a missing extension
    Unknown,
}

impl FormatFamily {
    /// Classify a path by its final extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some("h5") | Some("hdf5") => FormatFamily::Hdf5Family,
            Some("mrc") => FormatFamily::MrcFamily,
            _ => FormatFamily::Unknown,
        }
    }

    /// Whether acquisition metadata should be carried over from this family
    pub fn carries_metadata(&self) -> bool {
        matches!(self, FormatFamily::Hdf5Family)
    }
}

/// A stack file the converter accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputStack {
    /// HDF5 container; also used for unknown extensions, which are opened as HDF5
    Hdf5Stack(PathBuf),
    /// MRC stack; declared but not convertible
    MrcStack(PathBuf),
}

impl InputStack {
    /// Wrap a path in the variant matching its format family
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match FormatFamily::from_path(&path) {
            FormatFamily::MrcFamily => InputStack::MrcStack(path),
            FormatFamily::Hdf5Family | FormatFamily::Unknown => InputStack::Hdf5Stack(path),
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        match self {
            InputStack::Hdf5Stack(path) | InputStack::MrcStack(path) => path,
        }
    }

    /// Format family of the underlying file
    pub fn family(&self) -> FormatFamily {
        FormatFamily::from_path(self.path())
    }
}

/// Derive the converted stack path: `<dir>/<stem>_ln.hdf5`
///
/// The stem is the file name with its final `.`-delimited extension removed,
/// so `/data/run01.hdf5` becomes `/data/run01_ln.hdf5` and `a.tar.gz` becomes
/// `a.tar_ln.hdf5`.
pub fn output_path_for(input: &Path) -> Result<PathBuf, StackError> {
    if input.as_os_str().is_empty() {
        return Err(StackError::InvalidArgument(
            "input stack path cannot be empty".to_string(),
        ));
    }
    let stem = input.file_stem().ok_or_else(|| {
        StackError::InvalidArgument(format!("{} does not name a file", input.display()))
    })?;

    let mut name = stem.to_os_string();
    name.push(OUTPUT_SUFFIX);
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    Ok(input.with_file_name(name))
}
