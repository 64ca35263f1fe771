//! Integration tests for lnstacks
//!
//! These tests run whole conversions through the public API and inspect the
//! resulting HDF5 files.

mod common;

use common::*;
use lnstacks::prelude::*;
use tempfile::tempdir;

/// Test the complete conversion of a tomography stack with metadata
#[test]
fn test_full_conversion_with_metadata() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tomo_0001.hdf5");

    write_constant_frames(&input, &[1.0, std::f32::consts::E, 0.5], 8, 12);
    add_metadata(&input, "rotation_angle", &[-70.0, 0.0, 70.0]);
    add_metadata(&input, "energy", &[520.0, 520.0, 520.0]);
    add_metadata(&input, "x_pixel_size", &[13.0]);
    add_metadata(&input, "y_pixel_size", &[13.0]);

    let stats = StackTransformer::new().convert(&input).unwrap();

    assert_eq!(stats.output, dir.path().join("tomo_0001_ln.hdf5"));
    assert_eq!(stats.spec.shape(), (3, 8, 12));

    let result = read_converted(&stats.output);
    assert_eq!(result.shape(), &[3, 8, 12]);
    assert!(result.index_axis(ndarray::Axis(0), 0).iter().all(|&v| v == 0.0));
    assert!(result
        .index_axis(ndarray::Axis(0), 1)
        .iter()
        .all(|&v| (v + 1.0).abs() < 1e-6));
    assert!(result
        .index_axis(ndarray::Axis(0), 2)
        .iter()
        .all(|&v| (v - std::f32::consts::LN_2).abs() < 1e-6));

    assert_eq!(
        converted_members(&stats.output),
        vec![
            "TomoNormalized",
            "energy",
            "rotation_angle",
            "x_pixel_size",
            "y_pixel_size"
        ]
    );

    let file = hdf5::File::open(&stats.output).unwrap();
    let angles: Vec<f64> = file
        .group(TREE)
        .unwrap()
        .dataset("rotation_angle")
        .unwrap()
        .read_raw()
        .unwrap();
    assert_eq!(angles, vec![-70.0, 0.0, 70.0]);
}

/// Every converted stack uses one chunk per frame, whatever the frame size
#[test]
fn test_chunk_geometry_for_various_frame_sizes() {
    let dir = tempdir().unwrap();
    for (i, (rows, cols)) in [(1, 1), (3, 17), (64, 5)].into_iter().enumerate() {
        let input = dir.path().join(format!("stack{}.h5", i));
        write_constant_frames(&input, &[0.9, 0.8], rows, cols);

        let output = lnstacks::transform::transform(&input, TREE, DATASET).unwrap();

        let file = hdf5::File::open(&output).unwrap();
        let ds = file.group(TREE).unwrap().dataset(DATASET).unwrap();
        assert_eq!(ds.chunk(), Some(vec![1, rows, cols]));
        let frames: i64 = ds.attr(FRAME_COUNT_ATTR).unwrap().read_scalar().unwrap();
        assert_eq!(frames, 2);
    }
}

/// Missing energy is tolerated; other fields are still carried over
#[test]
fn test_partial_metadata() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("partial.h5");
    write_constant_frames(&input, &[0.5, 0.5], 4, 4);
    add_metadata(&input, "rotation_angle", &[0.0, 90.0]);
    add_metadata(&input, "y_pixel_size", &[10.0]);

    let stats = StackTransformer::new().convert(&input).unwrap();
    let report = stats.metadata.unwrap();

    assert_eq!(report.copied, vec![MetadataField::RotationAngle]);
    assert_eq!(
        converted_members(&stats.output),
        vec!["TomoNormalized", "rotation_angle"]
    );
}

/// Sources outside the h5/hdf5 family convert without metadata
#[test]
fn test_unknown_extension_converts_without_metadata() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scan.nxs");
    write_constant_frames(&input, &[0.25], 2, 2);
    add_metadata(&input, "energy", &[700.0]);

    let output = StackTransformer::new().transform(&input).unwrap();

    assert_eq!(output, dir.path().join("scan_ln.hdf5"));
    assert_eq!(converted_members(&output), vec!["TomoNormalized"]);
}

/// An empty stack is rejected before any output is created
#[test]
fn test_empty_stack_leaves_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.h5");
    {
        let file = hdf5::File::create(&input).unwrap();
        let group = file.create_group(TREE).unwrap();
        let _ = group.new_dataset::<f32>().shape((0, 4, 4)).create(DATASET).unwrap();
    }

    let err = StackTransformer::new().transform(&input).unwrap_err();

    assert!(err.is_structural());
    assert!(!dir.path().join("broken_ln.hdf5").exists());
}

/// Independent stacks can be converted from several threads at once
#[test]
fn test_independent_conversions_on_threads() {
    let dir = tempdir().unwrap();
    let inputs: Vec<_> = (0..4)
        .map(|i| {
            let input = dir.path().join(format!("thread{}.h5", i));
            write_constant_frames(&input, &[0.5; 3], 6, 6);
            input
        })
        .collect();

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| std::thread::spawn(move || StackTransformer::new().transform(&input)))
        .collect();

    for handle in handles {
        let output = handle.join().unwrap().unwrap();
        assert_eq!(read_converted(&output).shape(), &[3, 6, 6]);
    }
}
