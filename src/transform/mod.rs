//! Minus-logarithm stack conversion
//!
//! This module drives the whole conversion of one stack: it opens the source
//! container, creates the destination next to it, carries over acquisition
//! metadata, creates the per-frame chunked output dataset and streams every
//! frame through [`minus_ln_frame`].
//!
//! Both containers live only for the duration of a single call. If the
//! conversion fails or is cancelled after the destination was created, the
//! partial output file is removed so that a converted stack on disk is always
//! complete.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hdf5::{Dataset, File, Group};
use log::{debug, info, warn};
use ndarray::Array2;

use crate::chunked::{create_dataset, write_frame_count, DatasetSpec};
use crate::error::{Hdf5ResultExt, StackError};
use crate::format::{output_path_for, FormatFamily, InputStack};
use crate::metadata::{copy_metadata, CopyReport};

mod kernel;
#[cfg(feature = "parallel")]
mod parallel;
mod sequential;


pub use kernel::{minus_ln, minus_ln_frame};

/// Default group holding the normalized stack
pub const DEFAULT_TREE_PATH: &str = "TomoNormalized";

/// Default name of the primary dataset inside the group
pub const DEFAULT_DATASET_PATH: &str = "TomoNormalized";

/// Configuration for a stack conversion
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Group containing the primary dataset; recreated under the same name in the output
    pub tree_path: String,

    /// Primary dataset name inside `tree_path`
    pub dataset_path: String,

    /// Transform frames on a rayon pool (only used with the parallel feature)
    pub parallel: bool,

    /// Frames read and transformed together in parallel mode
    pub batch_frames: usize,

    /// Log progress every this many frames
    pub progress_interval: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            tree_path: DEFAULT_TREE_PATH.to_string(),
            dataset_path: DEFAULT_DATASET_PATH.to_string(),
            parallel: false,
            batch_frames: 16,
            progress_interval: 100,
        }
    }
}

/// Statistics from a completed conversion
#[derive(Debug, Clone)]
pub struct TransformStats {
    /// Source stack
    pub input: PathBuf,
    /// Converted stack
    pub output: PathBuf,
    /// Geometry of both primary datasets
    pub spec: DatasetSpec,
    /// Frames written to the output
    pub frames_written: usize,
    /// Output pixels that came out as infinity or NaN
    pub non_finite_pixels: u64,
    /// Metadata copy outcome; `None` when the source format skips metadata
    pub metadata: Option<CopyReport>,
}

impl fmt::Display for TransformStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} frames of {}x{} pixels into {}",
            self.frames_written,
            self.spec.n_rows,
            self.spec.n_cols,
            self.output.display()
        )?;
        if self.non_finite_pixels > 0 {
            write!(f, " ({} non-finite pixels)", self.non_finite_pixels)?;
        }
        Ok(())
    }
}

/// Observer called after every written frame with `(frames_written, n_frames)`
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Converts transmission stacks into absorbance stacks
#[derive(Clone, Default)]
pub struct StackTransformer {
    config: TransformConfig,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<Arc<ProgressFn>>,
}

impl fmt::Debug for StackTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackTransformer")
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl StackTransformer {
    /// Create a transformer with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transformer with a custom configuration
    pub fn with_config(config: TransformConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Stop the conversion between frames once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Call `observer` on the converting thread after each frame is written.
    ///
    /// In parallel mode frames are still reported one by one in index order,
    /// as each frame of a transformed batch is written.
    pub fn with_progress<F>(mut self, observer: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(observer));
        self
    }

    /// Active configuration
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Convert `input` and return the path of the converted stack
    pub fn transform<P: AsRef<Path>>(&self, input: P) -> Result<PathBuf, StackError> {
        self.convert(input).map(|stats| stats.output)
    }

    /// Convert `input` and return conversion statistics
    pub fn convert<P: AsRef<Path>>(&self, input: P) -> Result<TransformStats, StackError> {
        let input = input.as_ref();
        if input.as_os_str().is_empty() {
            return Err(StackError::InvalidArgument(
                "input stack path cannot be empty".to_string(),
            ));
        }
        self.convert_stack(&InputStack::from_path(input))
    }

    /// Convert an already classified input stack
    pub fn convert_stack(&self, stack: &InputStack) -> Result<TransformStats, StackError> {
        match stack {
            InputStack::Hdf5Stack(path) => self.convert_hdf5(path, stack.family()),
            InputStack::MrcStack(_) => Err(StackError::NotImplemented("MRC stack transform")),
        }
    }

    fn convert_hdf5(
        &self,
        input: &Path,
        family: FormatFamily,
    ) -> Result<TransformStats, StackError> {
        let output = output_path_for(input)?;
        let tree = self.config.tree_path.as_str();
        let name = self.config.dataset_path.as_str();

        info!("Converting {} to {}", input.display(), output.display());

        let source = File::open(input).structural(|| format!("opening {}", input.display()))?;
        let source_group = source
            .group(tree)
            .structural(|| format!("resolving group {} in {}", tree, input.display()))?;
        let source_dataset = source_group
            .dataset(name)
            .structural(|| format!("resolving dataset {}/{} in {}", tree, name, input.display()))?;

        let shape = source_dataset.shape();
        let spec = DatasetSpec::for_stack(&shape).ok_or_else(|| StackError::InvalidShape {
            dataset: format!("{}/{}", tree, name),
            shape: shape.clone(),
        })?;
        info!(
            "Stack shape: {} frames x {} rows x {} cols ({} pixels per frame)",
            spec.n_frames,
            spec.n_rows,
            spec.n_cols,
            spec.frame_len()
        );

        let mut guard = OutputGuard::new(&output);
        let (frames_written, non_finite_pixels, metadata) =
            self.write_output(&source_group, &source_dataset, &spec, family, &output, &mut guard)?;
        guard.commit();

        if non_finite_pixels > 0 {
            warn!(
                "{} pixels of {} produced non-finite absorbance (non-positive or non-finite input)",
                non_finite_pixels,
                input.display()
            );
        }
        info!("Stack {} has been converted", input.display());

        Ok(TransformStats {
            input: input.to_path_buf(),
            output,
            spec,
            frames_written,
            non_finite_pixels,
            metadata,
        })
    }

    fn write_output(
        &self,
        source_group: &Group,
        source_dataset: &Dataset,
        spec: &DatasetSpec,
        family: FormatFamily,
        output: &Path,
        guard: &mut OutputGuard,
    ) -> Result<(usize, u64, Option<CopyReport>), StackError> {
        let tree = self.config.tree_path.as_str();
        let name = self.config.dataset_path.as_str();

        let dest = File::create(output).structural(|| format!("creating {}", output.display()))?;
        guard.arm();

        let (non_finite, metadata) = {
            let dest_group = dest
                .create_group(tree)
                .structural(|| format!("creating group {} in {}", tree, output.display()))?;

            let metadata = if family.carries_metadata() {
                Some(copy_metadata(source_group, &dest_group))
            } else {
                debug!("Skipping metadata copy for {:?} input", family);
                None
            };

            let dest_dataset = create_dataset::<f32>(&dest_group, name, spec)
                .structural(|| format!("creating dataset {}/{}", tree, name))?;
            write_frame_count(&dest_dataset, spec.n_frames)
                .structural(|| format!("writing frame count on {}/{}", tree, name))?;

            let non_finite = self.stream_frames(source_dataset, &dest_dataset, spec)?;
            (non_finite, metadata)
        };

        dest.close()
            .structural(|| format!("closing {}", output.display()))?;
        Ok((spec.n_frames, non_finite, metadata))
    }

    fn stream_frames(
        &self,
        source: &Dataset,
        dest: &Dataset,
        spec: &DatasetSpec,
    ) -> Result<u64, StackError> {
        if self.config.parallel {
            #[cfg(feature = "parallel")]
            {
                return self.stream_parallel(source, dest, spec);
            }
            #[cfg(not(feature = "parallel"))]
            warn!("Parallel transform requested but binary was built without the parallel feature; falling back to sequential transform.");
        }
        self.stream_sequential(source, dest, spec)
    }

    fn check_cancelled(&self, frames_written: usize, n_frames: usize) -> Result<(), StackError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(StackError::Cancelled {
                frames_written,
                n_frames,
            }),
            _ => Ok(()),
        }
    }

    fn report_progress(&self, frames_written: usize, n_frames: usize) {
        if let Some(observer) = &self.progress {
            observer(frames_written, n_frames);
        }
        let interval = self.config.progress_interval;
        if interval > 0 && frames_written % interval == 0 {
            let pct = (frames_written as f64 / n_frames as f64) * 100.0;
            info!("Progress: {}/{} frames ({:.1}%)", frames_written, n_frames, pct);
        }
    }
}

/// Convert `input` with explicit group and dataset names.
///
/// Shorthand for a [`StackTransformer`] whose configuration only overrides
/// the two paths.
pub fn transform<P: AsRef<Path>>(
    input: P,
    tree_path: &str,
    dataset_path: &str,
) -> Result<PathBuf, StackError> {
    let config = TransformConfig {
        tree_path: tree_path.to_string(),
        dataset_path: dataset_path.to_string(),
        ..Default::default()
    };
    StackTransformer::with_config(config).transform(input)
}

/// Read frame `index` in double precision whatever the stored element type
fn read_frame(source: &Dataset, index: usize) -> Result<Array2<f64>, StackError> {
    source
        .read_slice_2d::<f64, _>((index, .., ..))
        .structural(|| format!("reading frame {}", index))
}

fn write_frame(dest: &Dataset, index: usize, frame: &Array2<f32>) -> Result<(), StackError> {
    dest.write_slice(frame, (index, .., ..))
        .structural(|| format!("writing frame {}", index))
}

/// Removes a partially written output file unless the conversion commits
struct OutputGuard {
    path: PathBuf,
    armed: bool,
}

impl OutputGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: false,
        }
    }

    fn arm(&mut self) {
        self.armed = true;
    }

    fn commit(&mut self) {
        self.armed = false;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed incomplete output {}", self.path.display()),
            Err(e) => warn!(
                "Could not remove incomplete output {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
