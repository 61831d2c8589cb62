//! Read-only access to HDF5 containers.
//!
//! A [`Container`] wraps one open, read-only file and scopes one top-level
//! operation at a time: locate a dataset, resolve its extents and native
//! type, build a selection, and materialize the output array. All handles
//! are dropped on the call stack that opened them, on every path.

use std::fs;
use std::path::{Path, PathBuf};

use hdf5::{Dataset, File, Group, H5Type};
use ndarray::{s, Array2, ArrayD, IxDyn};

use crate::array::NumericArray;
use crate::data_type::DataType;
use crate::error::ReadError;
use crate::region_ref::RegionSelection;
use crate::selection::{ReadSelection, SelectionError};

/// Rank and per-axis extents of a dataset's dataspace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatasetExtents {
    shape: Vec<usize>,
    max_shape: Vec<usize>,
}

impl DatasetExtents {
    /// The rank.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// The per-axis current extents.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The per-axis maximum extents; equal to [`shape`](Self::shape) for
    /// non-resizable datasets.
    #[must_use]
    pub fn max_shape(&self) -> &[usize] {
        &self.max_shape
    }

    /// The number of elements in the current extent.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Materialize a [`NumericArray`] by running `$body` with `$t` bound to the
/// lane's element type.
macro_rules! lane_dispatch {
    ($data_type:expr, $t:ident => $body:expr) => {
        match $data_type {
            DataType::Int16 => {
                type $t = i16;
                NumericArray::Int16($body)
            }
            DataType::Int32 => {
                type $t = i32;
                NumericArray::Int32($body)
            }
            DataType::Int64 => {
                type $t = i64;
                NumericArray::Int64($body)
            }
            DataType::UInt16 => {
                type $t = u16;
                NumericArray::UInt16($body)
            }
            DataType::UInt32 => {
                type $t = u32;
                NumericArray::UInt32($body)
            }
            DataType::UInt64 => {
                type $t = u64;
                NumericArray::UInt64($body)
            }
            DataType::Float32 => {
                type $t = f32;
                NumericArray::Float32($body)
            }
            DataType::Float64 => {
                type $t = f64;
                NumericArray::Float64($body)
            }
        }
    };
}

/// An open, read-only HDF5 container.
#[derive(Debug)]
pub struct Container {
    file: File,
    path: PathBuf,
}

impl Container {
    /// Open the container at `path` read-only.
    ///
    /// # Errors
    /// Returns [`ReadError::MissingFile`] if `path` does not name a readable
    /// file, and [`ReadError::NotAnHdf5File`] if it does but libhdf5 refuses
    /// it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let readable = fs::metadata(path).map(|metadata| metadata.is_file());
        if !readable.unwrap_or(false) {
            return Err(ReadError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| ReadError::NotAnHdf5File {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// The path this container was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn group(&self, group_path: &str) -> Result<Group, hdf5::Error> {
        self.file.group(group_path)
    }

    /// Locate a dataset by slash-delimited node path.
    ///
    /// The lookup is an exploratory probe: libhdf5 diagnostics are muted for
    /// this single call, since misses are expected during exploration. A
    /// miss is still a definitive [`ReadError::DatasetNotFound`] for the
    /// caller.
    pub(crate) fn locate(&self, node: &str) -> Result<Dataset, ReadError> {
        hdf5::silence_errors(true);
        let probed = self.file.dataset(node);
        hdf5::silence_errors(false);
        probed.map_err(|_| {
            log::debug!("{}: dataset {node} not found", self.path.display());
            ReadError::DatasetNotFound {
                file: self.path.clone(),
                node: node.to_string(),
            }
        })
    }

    pub(crate) fn extents_of(
        &self,
        dataset: &Dataset,
        node: &str,
    ) -> Result<DatasetExtents, ReadError> {
        let space = dataset
            .space()
            .map_err(|source| self.query_failed(node, source))?;
        Ok(DatasetExtents {
            shape: space.shape(),
            max_shape: space.maxdims(),
        })
    }

    pub(crate) fn data_type_of(&self, dataset: &Dataset, node: &str) -> Result<DataType, ReadError> {
        let descriptor = dataset
            .dtype()
            .and_then(|datatype| datatype.to_descriptor())
            .map_err(|source| self.query_failed(node, source))?;
        Ok(DataType::from_descriptor(&descriptor)?)
    }

    /// Read a dataset's full extent in its native type.
    ///
    /// # Errors
    /// Returns a [`ReadError`] if the dataset cannot be located, its native
    /// type has no output lane, or the read fails. No array escapes a failed
    /// call.
    pub fn read_dataset(&self, node: &str) -> Result<NumericArray, ReadError> {
        let dataset = self.locate(node)?;
        let extents = self.extents_of(&dataset, node)?;
        let data_type = self.data_type_of(&dataset, node)?;
        check_allocation(node, extents.shape(), data_type)?;
        Ok(lane_dispatch!(data_type, T => self.read_full::<T>(&dataset, node)?))
    }

    /// Read the rank-2 cross-section of a rank-3 dataset at `coord` on
    /// `axis`.
    ///
    /// The output drops `axis` and keeps the other two extents in their
    /// original relative order. `coord` is not pre-validated: an
    /// out-of-range value fails the read itself.
    ///
    /// # Errors
    /// Returns a [`ReadError`] if the source rank is not 3, the axis is not
    /// in `{0, 1, 2}`, or the selection is rejected by the read.
    pub fn read_dataset_slice(
        &self,
        node: &str,
        axis: usize,
        coord: usize,
    ) -> Result<NumericArray, ReadError> {
        let dataset = self.locate(node)?;
        let extents = self.extents_of(&dataset, node)?;
        let selection = ReadSelection::axis_slice(axis, coord).map_err(SelectionError::from)?;
        let output_shape = selection.output_shape(extents.shape())?;
        let data_type = self.data_type_of(&dataset, node)?;
        check_allocation(node, &output_shape, data_type)?;
        Ok(lane_dispatch!(
            data_type,
            T => self.read_plane::<T>(&dataset, node, axis, coord)?.into_dyn()
        ))
    }

    /// Read the point set designated by a stored region reference.
    ///
    /// `region_node` names a dataset of dataset-region reference records;
    /// its first record is dereferenced to a selection within `node`. The
    /// output is 1-D with one element per selected point.
    ///
    /// # Errors
    /// Returns a [`ReadError`] if either dataset cannot be located, the
    /// reference does not resolve, or the selected read fails.
    pub fn read_dataset_via_region(
        &self,
        node: &str,
        region_node: &str,
    ) -> Result<NumericArray, ReadError> {
        let dataset = self.locate(node)?;
        let reference = self.locate(region_node)?;
        let region = RegionSelection::from_reference(&reference)
            .map_err(|source| self.region_failed(region_node, &source))?;
        let selection = ReadSelection::RegionReference {
            num_points: region.num_points(),
        };
        let extents = self.extents_of(&dataset, node)?;
        let output_shape = selection.output_shape(extents.shape())?;
        let data_type = self.data_type_of(&dataset, node)?;
        check_allocation(node, &output_shape, data_type)?;
        Ok(lane_dispatch!(data_type, T => {
            let values = region
                .read_selected::<T>(&dataset)
                .map_err(|source| self.region_failed(region_node, &source))?;
            ArrayD::from_shape_vec(IxDyn(&output_shape), values)
                .expect("selection length matches the derived shape")
        }))
    }

    /// Rank and per-axis (current, maximum) extents of `node`.
    ///
    /// # Errors
    /// Returns a [`ReadError`] if the dataset cannot be located or its
    /// dataspace cannot be queried.
    pub fn dataset_extents(&self, node: &str) -> Result<DatasetExtents, ReadError> {
        let dataset = self.locate(node)?;
        self.extents_of(&dataset, node)
    }

    /// The ordered member names of `group_path`.
    ///
    /// # Errors
    /// Returns [`ReadError::GroupNotFound`] if the group is absent.
    pub fn list_datasets(&self, group_path: &str) -> Result<Vec<String>, ReadError> {
        let group = self
            .file
            .group(group_path)
            .map_err(|source| ReadError::GroupNotFound {
                file: self.path.clone(),
                group: group_path.to_string(),
                source,
            })?;
        group
            .member_names()
            .map_err(|source| self.query_failed(group_path, source))
    }

    fn read_full<T: H5Type>(&self, dataset: &Dataset, node: &str) -> Result<ArrayD<T>, ReadError> {
        dataset
            .read_dyn::<T>()
            .map_err(|source| self.selection_rejected(node, source))
    }

    fn read_plane<T: H5Type>(
        &self,
        dataset: &Dataset,
        node: &str,
        axis: usize,
        coord: usize,
    ) -> Result<Array2<T>, ReadError> {
        let plane = match axis {
            0 => dataset.read_slice_2d::<T, _>(s![coord, .., ..]),
            1 => dataset.read_slice_2d::<T, _>(s![.., coord, ..]),
            2 => dataset.read_slice_2d::<T, _>(s![.., .., coord]),
            _ => unreachable!("axis validated by ReadSelection::axis_slice"),
        };
        plane.map_err(|source| self.selection_rejected(node, source))
    }

    fn query_failed(&self, node: &str, source: hdf5::Error) -> ReadError {
        ReadError::DatasetQueryFailed {
            file: self.path.clone(),
            node: node.to_string(),
            source,
        }
    }

    fn selection_rejected(&self, node: &str, source: hdf5::Error) -> ReadError {
        ReadError::SelectionRejected {
            file: self.path.clone(),
            node: node.to_string(),
            source,
        }
    }

    fn region_failed(&self, node: &str, source: &crate::region_ref::RegionRefError) -> ReadError {
        log::debug!(
            "{}: region dereference of {node} failed: {source}",
            self.path.display()
        );
        ReadError::RegionDereferenceFailed {
            file: self.path.clone(),
            node: node.to_string(),
        }
    }
}

/// Refuse output shapes whose buffer would exceed addressable memory.
fn check_allocation(node: &str, shape: &[usize], data_type: DataType) -> Result<(), ReadError> {
    let bytes = shape
        .iter()
        .try_fold(data_type.size(), |bytes, &extent| bytes.checked_mul(extent));
    match bytes {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(()),
        _ => Err(ReadError::AllocationFailed {
            node: node.to_string(),
            shape: shape.to_vec(),
        }),
    }
}
