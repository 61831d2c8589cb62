//! Dereferencing stored dataset-region references.
//!
//! The safe bindings expose no `H5R` surface, so resolving stored
//! `H5T_STD_REF_DSETREG` records to a selection goes through `hdf5-sys`
//! here. Every raw id acquired in this module is held by a guard that closes
//! it on drop, on success and failure alike.

use hdf5::{Dataset, Datatype, H5Type};
use hdf5_sys::h5::hsize_t;
use hdf5_sys::h5d::H5Dread;
use hdf5_sys::h5i::hid_t;
use hdf5_sys::h5p::H5P_DEFAULT;
use hdf5_sys::h5r::{hdset_reg_ref_t, H5R_type_t, H5Rget_region};
use hdf5_sys::h5s::{H5Sclose, H5Screate_simple, H5Sget_select_npoints, H5S_ALL};
use thiserror::Error;

/// Failure resolving or reading through a region reference.
#[derive(Debug, Error)]
pub(crate) enum RegionRefError {
    /// The reference dataset holds no records.
    #[error("reference dataset holds no records")]
    EmptyReference,
    /// Reading the stored reference records failed.
    #[error("unable to read stored reference records")]
    ReferenceRead,
    /// The stored record did not resolve to a selection.
    #[error("stored reference did not resolve to a selection")]
    Dereference,
    /// Reading the selected elements of the primary dataset failed.
    #[error("unable to read the referenced selection")]
    SelectionRead,
    /// A bindings-level failure building the memory type.
    #[error(transparent)]
    Hdf5(#[from] hdf5::Error),
}

/// An owned dataspace id, closed on drop.
struct DataspaceId(hid_t);

impl DataspaceId {
    fn simple_1d(len: usize) -> Result<Self, RegionRefError> {
        let dims = [len as hsize_t];
        // SAFETY: `dims` outlives the call and its length matches the rank.
        let id = unsafe { H5Screate_simple(1, dims.as_ptr(), std::ptr::null()) };
        if id < 0 {
            return Err(RegionRefError::SelectionRead);
        }
        Ok(Self(id))
    }
}

impl Drop for DataspaceId {
    fn drop(&mut self) {
        // SAFETY: the id came from a successful H5S call and is closed once.
        unsafe {
            H5Sclose(self.0);
        }
    }
}

/// A dereferenced region: a selection within a primary dataset.
pub(crate) struct RegionSelection {
    space: DataspaceId,
    num_points: usize,
}

impl RegionSelection {
    /// Dereference the first record of `reference`, a dataset of stored
    /// dataset-region reference records.
    pub(crate) fn from_reference(reference: &Dataset) -> Result<Self, RegionRefError> {
        let num_records = reference.size();
        if num_records == 0 {
            return Err(RegionRefError::EmptyReference);
        }
        // SAFETY: reference records are plain byte blobs; zeroed is a valid
        // initial value before H5Dread overwrites them.
        let mut records: Vec<hdset_reg_ref_t> =
            vec![unsafe { std::mem::zeroed::<hdset_reg_ref_t>() }; num_records];
        let record_type = *hdf5::globals::H5T_STD_REF_DSETREG;
        // SAFETY: `records` holds `num_records` fixed-size reference records,
        // matching the dataset's full extent selected by H5S_ALL.
        let status = unsafe {
            H5Dread(
                reference.id(),
                record_type,
                H5S_ALL,
                H5S_ALL,
                H5P_DEFAULT,
                records.as_mut_ptr().cast(),
            )
        };
        if status < 0 {
            return Err(RegionRefError::ReferenceRead);
        }
        // SAFETY: the record buffer stays alive for the call; the returned
        // dataspace id is owned by the guard below.
        let first_record: *const hdset_reg_ref_t = &records[0];
        let space_id = unsafe {
            H5Rget_region(
                reference.id(),
                H5R_type_t::H5R_DATASET_REGION1,
                first_record.cast(),
            )
        };
        if space_id < 0 {
            return Err(RegionRefError::Dereference);
        }
        let space = DataspaceId(space_id);
        // SAFETY: the id is a valid dataspace owned by `space`.
        let num_points = unsafe { H5Sget_select_npoints(space.0) };
        if num_points < 0 {
            return Err(RegionRefError::Dereference);
        }
        Ok(Self {
            space,
            num_points: usize::try_from(num_points).unwrap_or(0),
        })
    }

    /// The number of points in the dereferenced selection.
    pub(crate) fn num_points(&self) -> usize {
        self.num_points
    }

    /// Read the selected elements of `dataset` into a contiguous buffer, in
    /// selection order.
    pub(crate) fn read_selected<T: H5Type>(&self, dataset: &Dataset) -> Result<Vec<T>, RegionRefError> {
        let memory_space = DataspaceId::simple_1d(self.num_points)?;
        let memory_type = Datatype::from_type::<T>()?;
        let mut values: Vec<T> = Vec::with_capacity(self.num_points);
        // SAFETY: `values` has capacity for `num_points` elements of `T`, and
        // both the memory space and the dereferenced file space select exactly
        // `num_points` elements.
        let status = unsafe {
            H5Dread(
                dataset.id(),
                memory_type.id(),
                memory_space.0,
                self.space.0,
                H5P_DEFAULT,
                values.as_mut_ptr().cast(),
            )
        };
        if status < 0 {
            return Err(RegionRefError::SelectionRead);
        }
        // SAFETY: a successful H5Dread initialized all `num_points` elements.
        unsafe {
            values.set_len(self.num_points);
        }
        Ok(values)
    }
}
