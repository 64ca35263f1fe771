//! Best-effort copy of acquisition metadata between stack groups
//!
//! Tomography stacks carry a handful of sibling datasets next to the image
//! data: per-frame rotation angles, the beam energy and the pixel size. The
//! converted stack keeps whichever of these the source provides. A missing or
//! unreadable field never fails the conversion; it is logged and skipped.
//!
//! The pixel size is handled as a pair: `x_pixel_size` and `y_pixel_size` end
//! up in the output together or not at all.

mod field;


use hdf5::Group;
use log::{debug, warn};

pub use field::{read_field, write_field, FieldUnavailable, FieldValue, MetadataField};

/// Outcome of a metadata copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Fields written to the destination group
    pub copied: Vec<MetadataField>,
    /// Fields left out, with the reason
    pub skipped: Vec<(MetadataField, String)>,
}

impl CopyReport {
    /// Whether `field` made it into the destination
    pub fn contains(&self, field: MetadataField) -> bool {
        self.copied.contains(&field)
    }

    fn skip(&mut self, field: MetadataField, reason: &FieldUnavailable) {
        self.skipped.push((field, reason.to_string()));
    }
}

/// Copy rotation angles, energy and pixel size from `source` to `dest`.
///
/// Never fails: every per-field problem is logged and recorded in the
/// returned report.
pub fn copy_metadata(source: &Group, dest: &Group) -> CopyReport {
    let mut report = CopyReport::default();

    copy_single(source, dest, MetadataField::RotationAngle, "Angles", &mut report);
    copy_single(source, dest, MetadataField::Energy, "Energies", &mut report);
    copy_pixel_size(source, dest, &mut report);

    debug!(
        "Metadata copy finished: {} copied, {} skipped",
        report.copied.len(),
        report.skipped.len()
    );
    report
}

fn copy_single(
    source: &Group,
    dest: &Group,
    field: MetadataField,
    label: &str,
    report: &mut CopyReport,
) {
    let result = read_field(source, field).and_then(|value| write_field(dest, field, &value));
    match result {
        Ok(()) => report.copied.push(field),
        Err(reason) => {
            warn!("{} could not be extracted: {}", label, reason);
            report.skip(field, &reason);
        }
    }
}

fn copy_pixel_size(source: &Group, dest: &Group, report: &mut CopyReport) {
    let x_field = MetadataField::XPixelSize;
    let y_field = MetadataField::YPixelSize;

    let pair = read_field(source, x_field).and_then(|x| Ok((x, read_field(source, y_field)?)));
    let result = pair.and_then(|(x, y)| {
        write_field(dest, x_field, &x)?;
        if let Err(reason) = write_field(dest, y_field, &y) {
            // Keep the pair atomic
            if let Err(e) = dest.unlink(x_field.name()) {
                warn!("Could not remove {} after failed pair write: {}", x_field, e);
            }
            return Err(reason);
        }
        Ok(())
    });

    match result {
        Ok(()) => report.copied.extend([x_field, y_field]),
        Err(reason) => {
            warn!("Pixel size could NOT be extracted: {}", reason);
            report.skip(x_field, &reason);
            report.skip(y_field, &reason);
        }
    }
}
