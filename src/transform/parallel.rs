use hdf5::Dataset;
use log::{debug, info};
use rayon::prelude::*;

use super::kernel::minus_ln_frame;
use super::{read_frame, write_frame, StackTransformer};
use crate::chunked::DatasetSpec;
use crate::error::StackError;

impl StackTransformer {
    /// Transform frames in batches on the rayon pool.
    ///
    /// Reads and writes stay on the calling thread, so the destination keeps a
    /// single writer; only the per-pixel compute of a batch runs in parallel.
    /// Frames are still written in ascending index order.
    pub(super) fn stream_parallel(
        &self,
        source: &Dataset,
        dest: &Dataset,
        spec: &DatasetSpec,
    ) -> Result<u64, StackError> {
        let batch_frames = self.config.batch_frames.max(1);
        info!(
            "Transforming {} frames in parallel (batch_frames={})",
            spec.n_frames, batch_frames
        );

        let mut non_finite = 0u64;
        let mut start = 0;

        while start < spec.n_frames {
            self.check_cancelled(start, spec.n_frames)?;
            let end = (start + batch_frames).min(spec.n_frames);

            let batch = (start..end)
                .map(|index| read_frame(source, index))
                .collect::<Result<Vec<_>, _>>()?;

            let transformed: Vec<_> = batch.par_iter().map(minus_ln_frame).collect();
            non_finite += transformed.iter().map(|(_, count)| count).sum::<u64>();

            for (offset, (frame, _)) in transformed.iter().enumerate() {
                write_frame(dest, start + offset, frame)?;
                self.report_progress(start + offset + 1, spec.n_frames);
            }

            debug!("Frames {}..{} written", start, end);
            start = end;
        }

        Ok(non_finite)
    }
}
