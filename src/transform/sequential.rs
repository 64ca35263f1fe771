use hdf5::Dataset;
use log::debug;

use super::kernel::minus_ln_frame;
use super::{read_frame, write_frame, StackTransformer};
use crate::chunked::DatasetSpec;
use crate::error::StackError;

impl StackTransformer {
    /// Read, transform and write one frame at a time in index order.
    ///
    /// Returns the number of non-finite output pixels.
    pub(super) fn stream_sequential(
        &self,
        source: &Dataset,
        dest: &Dataset,
        spec: &DatasetSpec,
    ) -> Result<u64, StackError> {
        let mut non_finite = 0u64;

        for index in 0..spec.n_frames {
            self.check_cancelled(index, spec.n_frames)?;

            let (frame, count) = minus_ln_frame(&read_frame(source, index)?);
            non_finite += count;
            write_frame(dest, index, &frame)?;

            debug!("Frame {} written", index);
            self.report_progress(index + 1, spec.n_frames);
        }

        Ok(non_finite)
    }
}
