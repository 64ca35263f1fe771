//! Shared fixtures for integration tests

#![allow(dead_code)]

use hdf5::File;
use ndarray::{Array1, Array3};
use std::path::Path;

pub const TREE: &str = "TomoNormalized";
pub const DATASET: &str = "TomoNormalized";

/// Write a normalized stack with constant frames, one value per frame
pub fn write_constant_frames(path: &Path, values: &[f32], n_rows: usize, n_cols: usize) {
    let data = Array3::from_shape_fn((values.len(), n_rows, n_cols), |(f, _, _)| values[f]);
    write_stack(path, &data);
}

/// Write `data` as the primary dataset under the default group
pub fn write_stack(path: &Path, data: &Array3<f32>) {
    let file = File::create(path).unwrap();
    let group = file.create_group(TREE).unwrap();
    group
        .new_dataset_builder()
        .with_data(data)
        .create(DATASET)
        .unwrap();
}

/// Add a 1D f64 metadata dataset next to the primary dataset
pub fn add_metadata(path: &Path, name: &str, values: &[f64]) {
    let file = File::open_rw(path).unwrap();
    let group = file.group(TREE).unwrap();
    group
        .new_dataset_builder()
        .with_data(&Array1::from(values.to_vec()))
        .create(name)
        .unwrap();
}

/// Read back the converted primary dataset
pub fn read_converted(path: &Path) -> Array3<f32> {
    let file = File::open(path).unwrap();
    file.group(TREE).unwrap().dataset(DATASET).unwrap().read().unwrap()
}

/// Names present in the converted group
pub fn converted_members(path: &Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    let mut names = file.group(TREE).unwrap().member_names().unwrap();
    names.sort();
    names
}
