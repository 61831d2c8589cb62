#![allow(missing_docs)]

use std::path::PathBuf;

use h5light::{read_grids, Container, DataType, Element, ReadError};
use ndarray::{array, Array3, Axis};
use tempfile::TempDir;

fn scratch_file(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

fn roundtrip<T>(values: &[T])
where
    T: hdf5::H5Type + Element + Clone + PartialEq + std::fmt::Debug,
{
    let (_dir, path) = scratch_file("lane.h5");
    {
        let file = hdf5::File::create(&path).unwrap();
        file.new_dataset_builder()
            .with_data(values)
            .create("data")
            .unwrap();
    }
    let container = Container::open(&path).unwrap();
    let extracted = container.read_dataset("/data").unwrap();
    assert_eq!(extracted.data_type(), T::DATA_TYPE);
    let typed = extracted.into_typed::<T>().unwrap();
    assert_eq!(typed.as_slice().unwrap(), values);
}

#[test]
fn every_supported_lane_roundtrips_bit_identically() {
    roundtrip(&[-1_i16, 0, i16::MAX, i16::MIN]);
    roundtrip(&[-1_i32, 0, i32::MAX, i32::MIN]);
    roundtrip(&[-1_i64, 0, i64::MAX, i64::MIN]);
    roundtrip(&[0_u16, 1, u16::MAX]);
    roundtrip(&[0_u32, 1, u32::MAX]);
    roundtrip(&[0_u64, 1, u64::MAX]);
    roundtrip(&[1.5_f32, -2.25, f32::MIN_POSITIVE, 0.1]);
    roundtrip(&[1.5_f64, -2.25, f64::EPSILON, 0.1]);
}

#[test]
fn float32_matrix_reads_back_exactly() {
    let (_dir, path) = scratch_file("matrix.h5");
    let values = array![[1.0_f32, 2.0], [3.0, 4.0]];
    {
        let file = hdf5::File::create(&path).unwrap();
        file.new_dataset_builder()
            .with_data(&values)
            .create("x")
            .unwrap();
    }
    let container = Container::open(&path).unwrap();
    let extracted = container.read_dataset("/x").unwrap();
    assert_eq!(extracted.data_type(), DataType::Float32);
    assert_eq!(extracted.shape(), &[2, 2]);
    assert_eq!(extracted.into_typed::<f32>().unwrap(), values.into_dyn());
}

#[test]
fn unsupported_native_types_are_refused() {
    let (_dir, path) = scratch_file("unsupported.h5");
    {
        let file = hdf5::File::create(&path).unwrap();
        file.new_dataset_builder()
            .with_data(&[1_i8, 2, 3])
            .create("bytes")
            .unwrap();
    }
    let container = Container::open(&path).unwrap();
    let result = container.read_dataset("/bytes");
    assert!(matches!(result, Err(ReadError::UnsupportedDataType(_))));
}

fn volume_fixture() -> (TempDir, PathBuf, Array3<f64>) {
    let (dir, path) = scratch_file("volume.h5");
    let volume = Array3::from_shape_fn((2, 3, 4), |(i, j, k)| {
        f64::from(u32::try_from(i * 100 + j * 10 + k).unwrap())
    });
    {
        let file = hdf5::File::create(&path).unwrap();
        file.new_dataset_builder()
            .with_data(&volume)
            .create("vol")
            .unwrap();
    }
    (dir, path, volume)
}

#[test]
fn axis_slices_match_cross_sections_for_every_plane() {
    let (_dir, path, volume) = volume_fixture();
    let container = Container::open(&path).unwrap();
    for axis in 0..3 {
        for coord in 0..volume.shape()[axis] {
            let plane = container.read_dataset_slice("/vol", axis, coord).unwrap();
            let expected = volume.index_axis(Axis(axis), coord).to_owned();
            assert_eq!(plane.shape(), expected.shape());
            assert_eq!(plane.into_typed::<f64>().unwrap(), expected.into_dyn());
        }
    }
}

#[test]
fn axis0_slice_of_a_2x3x4_volume_has_shape_3x4() {
    let (_dir, path, volume) = volume_fixture();
    let container = Container::open(&path).unwrap();
    let plane = container.read_dataset_slice("/vol", 0, 1).unwrap();
    assert_eq!(plane.shape(), &[3, 4]);
    assert_eq!(
        plane.into_typed::<f64>().unwrap(),
        volume.index_axis(Axis(0), 1).to_owned().into_dyn()
    );
}

#[test]
fn out_of_range_slice_coords_fail_without_an_array() {
    let (_dir, path, volume) = volume_fixture();
    let container = Container::open(&path).unwrap();
    for axis in 0..3 {
        let result = container.read_dataset_slice("/vol", axis, volume.shape()[axis]);
        assert!(result.is_err());
    }
}

#[test]
fn axis_slices_require_a_rank_3_source() {
    let (_dir, path) = scratch_file("flat.h5");
    {
        let file = hdf5::File::create(&path).unwrap();
        file.new_dataset_builder()
            .with_data(&array![[1.0_f64, 2.0], [3.0, 4.0]])
            .create("flat")
            .unwrap();
    }
    let container = Container::open(&path).unwrap();
    let result = container.read_dataset_slice("/flat", 0, 0);
    assert!(matches!(result, Err(ReadError::Selection(_))));
}

#[test]
fn missing_files_and_junk_files_are_distinguished() {
    let (_dir, path) = scratch_file("absent.h5");
    assert!(matches!(
        Container::open(&path),
        Err(ReadError::MissingFile { .. })
    ));

    std::fs::write(&path, b"not an hdf5 container").unwrap();
    assert!(matches!(
        Container::open(&path),
        Err(ReadError::NotAnHdf5File { .. })
    ));
}

#[test]
fn locating_an_absent_dataset_is_definitive() {
    let (_dir, path) = scratch_file("sparse.h5");
    {
        let file = hdf5::File::create(&path).unwrap();
        file.new_dataset_builder()
            .with_data(&[1.0_f64])
            .create("present")
            .unwrap();
    }
    let container = Container::open(&path).unwrap();
    assert!(matches!(
        container.read_dataset("/absent"),
        Err(ReadError::DatasetNotFound { .. })
    ));
    assert!(matches!(
        container.list_datasets("/no_such_group"),
        Err(ReadError::GroupNotFound { .. })
    ));
}

#[test]
fn dataset_extents_report_rank_and_per_axis_sizes() {
    let (_dir, path, _volume) = volume_fixture();
    let container = Container::open(&path).unwrap();
    let extents = container.dataset_extents("/vol").unwrap();
    assert_eq!(extents.ndim(), 3);
    assert_eq!(extents.shape(), &[2, 3, 4]);
    assert_eq!(extents.max_shape(), &[2, 3, 4]);
    assert_eq!(extents.num_elements(), 24);
}

#[test]
fn listing_returns_every_member_name() {
    let (_dir, path) = scratch_file("listing.h5");
    {
        let file = hdf5::File::create(&path).unwrap();
        let group = file.create_group("fields").unwrap();
        for name in ["c", "a", "b"] {
            group
                .new_dataset_builder()
                .with_data(&[0.0_f64])
                .create(name)
                .unwrap();
        }
    }
    let container = Container::open(&path).unwrap();
    let mut names = container.list_datasets("/fields").unwrap();
    names.sort();
    assert_eq!(names, ["a", "b", "c"]);
}

fn grid_fixture() -> (TempDir, PathBuf) {
    let (dir, path) = scratch_file("grids.h5");
    {
        let file = hdf5::File::create(&path).unwrap();
        let grid1 = file.create_group("Grid00000001").unwrap();
        grid1
            .new_dataset_builder()
            .with_data(&array![[1.0_f64, 2.0], [3.0, 4.0]])
            .create("Density")
            .unwrap();
        grid1
            .new_dataset_builder()
            .with_data(&[10.0_f64, 20.0])
            .create("Temperature")
            .unwrap();
        let grid2 = file.create_group("Grid00000002").unwrap();
        grid2
            .new_dataset_builder()
            .with_data(&[5.0_f64, 6.0])
            .create("Density")
            .unwrap();
    }
    (dir, path)
}

#[test]
fn batch_reads_omit_missing_datasets_per_grid_only() {
    let (_dir, path) = grid_fixture();
    let container = Container::open(&path).unwrap();
    let grids = read_grids(&container, &[1, 2], &["Density", "Temperature"]).unwrap();
    assert_eq!(grids.keys().copied().collect::<Vec<_>>(), [1, 2]);
    assert_eq!(grids[&1].len(), 2);
    assert_eq!(grids[&1]["Density"].shape(), &[2, 2]);
    assert_eq!(grids[&1]["Temperature"].data_type(), DataType::Float64);
    assert_eq!(grids[&2].len(), 1);
    assert!(!grids[&2].contains_key("Temperature"));
}

#[test]
fn a_missing_grid_group_aborts_the_whole_batch() {
    let (_dir, path) = grid_fixture();
    let container = Container::open(&path).unwrap();
    let result = read_grids(&container, &[1, 3], &["Density"]);
    assert!(matches!(result, Err(ReadError::BatchAborted { .. })));
}
