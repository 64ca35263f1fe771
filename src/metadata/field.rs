use std::fmt;

use hdf5::types::{FloatSize, H5Type, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, Group};
use ndarray::{ArrayD, IxDyn};

/// Acquisition metadata fields carried from the source group to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    /// Sample rotation angle per frame
    RotationAngle,
    /// Beam energy
    Energy,
    /// Pixel size along x
    XPixelSize,
    /// Pixel size along y
    YPixelSize,
}

impl MetadataField {
    /// Every field, in copy order
    pub const ALL: [MetadataField; 4] = [
        MetadataField::RotationAngle,
        MetadataField::Energy,
        MetadataField::XPixelSize,
        MetadataField::YPixelSize,
    ];

    /// Dataset name in both source and destination groups
    pub fn name(&self) -> &'static str {
        match self {
            MetadataField::RotationAngle => "rotation_angle",
            MetadataField::Energy => "energy",
            MetadataField::XPixelSize => "x_pixel_size",
            MetadataField::YPixelSize => "y_pixel_size",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a metadata field could not be carried over
#[derive(Debug, thiserror::Error)]
pub enum FieldUnavailable {
    /// No link of that name in the source group
    #[error("{field} is not present")]
    Missing {
        /// Field that was looked up
        field: MetadataField,
    },

    /// The dataset has an element type that is not copied
    #[error("{field} has unsupported element type {dtype}")]
    UnsupportedType {
        /// Field that was read
        field: MetadataField,
        /// Description of the element type found
        dtype: String,
    },

    /// Opening or reading the source dataset failed
    #[error("{field} could not be read: {source}")]
    Read {
        /// Field that was read
        field: MetadataField,
        /// Underlying HDF5 error
        #[source]
        source: hdf5::Error,
    },

    /// Creating the destination dataset failed
    #[error("{field} could not be written: {source}")]
    Write {
        /// Field that was written
        field: MetadataField,
        /// Underlying HDF5 error
        #[source]
        source: hdf5::Error,
    },
}

macro_rules! field_values {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        /// Owned copy of a metadata dataset, tagged by its element type
        #[derive(Debug, Clone, PartialEq)]
        pub enum FieldValue {
            $(
                #[allow(missing_docs)]
                $variant(ArrayD<$ty>),
            )*
        }

        impl FieldValue {
            /// Shape of the stored values; empty for scalars
            pub fn shape(&self) -> &[usize] {
                match self {
                    $(FieldValue::$variant(data) => data.shape(),)*
                }
            }

            fn write_to(&self, group: &Group, name: &str) -> hdf5::Result<Dataset> {
                match self {
                    $(FieldValue::$variant(data) => write_array(group, name, data),)*
                }
            }
        }
    };
}

field_values! {
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    F32 => f32,
    F64 => f64,
    Bool => bool,
    Ascii => VarLenAscii,
    Unicode => VarLenUnicode,
}

fn read_array<T: H5Type + Clone>(dataset: &Dataset) -> hdf5::Result<ArrayD<T>> {
    if dataset.is_scalar() {
        let value = dataset.read_scalar::<T>()?;
        Ok(ArrayD::from_elem(IxDyn(&[]), value))
    } else {
        dataset.read_dyn::<T>()
    }
}

fn write_array<T: H5Type>(group: &Group, name: &str, data: &ArrayD<T>) -> hdf5::Result<Dataset> {
    if data.ndim() == 0 {
        let dataset = group.new_dataset::<T>().shape(()).create(name)?;
        if let Some(value) = data.first() {
            dataset.write_scalar(value)?;
        }
        Ok(dataset)
    } else {
        group.new_dataset_builder().with_data(data.view()).create(name)
    }
}

/// Read `field` from `group` as its stored element type.
///
/// Numeric, boolean and variable-length string datasets are supported.
/// Fixed-length strings, enums and compound types come back as
/// [`FieldUnavailable::UnsupportedType`]. Absence and read errors are
/// reported the same way; nothing here panics or logs.
pub fn read_field(group: &Group, field: MetadataField) -> Result<FieldValue, FieldUnavailable> {
    let name = field.name();
    if !group.link_exists(name) {
        return Err(FieldUnavailable::Missing { field });
    }

    let read_err = |source| FieldUnavailable::Read { field, source };
    let dataset = group.dataset(name).map_err(read_err)?;
    let descriptor = dataset
        .dtype()
        .and_then(|dtype| dtype.to_descriptor())
        .map_err(read_err)?;

    let value = match descriptor {
        TypeDescriptor::Integer(IntSize::U1) => read_array(&dataset).map(FieldValue::I8),
        TypeDescriptor::Integer(IntSize::U2) => read_array(&dataset).map(FieldValue::I16),
        TypeDescriptor::Integer(IntSize::U4) => read_array(&dataset).map(FieldValue::I32),
        TypeDescriptor::Integer(IntSize::U8) => read_array(&dataset).map(FieldValue::I64),
        TypeDescriptor::Unsigned(IntSize::U1) => read_array(&dataset).map(FieldValue::U8),
        TypeDescriptor::Unsigned(IntSize::U2) => read_array(&dataset).map(FieldValue::U16),
        TypeDescriptor::Unsigned(IntSize::U4) => read_array(&dataset).map(FieldValue::U32),
        TypeDescriptor::Unsigned(IntSize::U8) => read_array(&dataset).map(FieldValue::U64),
        TypeDescriptor::Float(FloatSize::U4) => read_array(&dataset).map(FieldValue::F32),
        TypeDescriptor::Float(FloatSize::U8) => read_array(&dataset).map(FieldValue::F64),
        TypeDescriptor::Boolean => read_array(&dataset).map(FieldValue::Bool),
        TypeDescriptor::VarLenAscii => read_array(&dataset).map(FieldValue::Ascii),
        TypeDescriptor::VarLenUnicode => read_array(&dataset).map(FieldValue::Unicode),
        other => {
            return Err(FieldUnavailable::UnsupportedType {
                field,
                dtype: format!("{:?}", other),
            })
        }
    };
    value.map_err(read_err)
}

/// Write `value` into `group` under the field's name
pub fn write_field(
    group: &Group,
    field: MetadataField,
    value: &FieldValue,
) -> Result<(), FieldUnavailable> {
    value
        .write_to(group, field.name())
        .map(|_| ())
        .map_err(|source| FieldUnavailable::Write { field, source })
}
