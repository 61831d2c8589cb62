//! Error types.
//!
//! Every fallible operation returns a [`ReadError`] carrying enough context
//! to identify the offending file/node pair. Errors are per-call values;
//! there is no shared error state anywhere in the crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::data_type::{DataType, UnsupportedDataTypeError};
use crate::selection::SelectionError;

/// Errors raised by read operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    /// The container file does not exist or is not readable.
    #[error("{}: file does not exist, or no read permissions", path.display())]
    MissingFile {
        /// The probed path.
        path: PathBuf,
    },
    /// The file exists but is not an HDF5 container.
    #[error("{}: not an HDF5 file", path.display())]
    NotAnHdf5File {
        /// The opened path.
        path: PathBuf,
        /// The underlying open failure.
        #[source]
        source: hdf5::Error,
    },
    /// The dataset was not found after the exploratory probe.
    #[error("{}: unable to open dataset {node}", file.display())]
    DatasetNotFound {
        /// The container file.
        file: PathBuf,
        /// The slash-delimited node path.
        node: String,
    },
    /// The group was not found.
    #[error("{}: unable to open group {group}", file.display())]
    GroupNotFound {
        /// The container file.
        file: PathBuf,
        /// The slash-delimited group path.
        group: String,
        /// The underlying open failure.
        #[source]
        source: hdf5::Error,
    },
    /// Querying a located dataset's rank, extents, or stored type failed.
    #[error("{}: problem getting info for dataset {node}", file.display())]
    DatasetQueryFailed {
        /// The container file.
        file: PathBuf,
        /// The slash-delimited node path.
        node: String,
        /// The underlying query failure.
        #[source]
        source: hdf5::Error,
    },
    /// The requested selection shape is invalid for the source dataset.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// The stored native type has no entry in the output type table.
    #[error(transparent)]
    UnsupportedDataType(#[from] UnsupportedDataTypeError),
    /// A stored region reference did not resolve to a readable selection.
    #[error("{}: unable to dereference region {node}", file.display())]
    RegionDereferenceFailed {
        /// The container file.
        file: PathBuf,
        /// The node path of the reference dataset.
        node: String,
    },
    /// The read rejected the built selection, e.g. an out-of-range slice
    /// coordinate.
    #[error("{}: selection rejected reading dataset {node}", file.display())]
    SelectionRejected {
        /// The container file.
        file: PathBuf,
        /// The slash-delimited node path.
        node: String,
        /// The underlying read failure.
        #[source]
        source: hdf5::Error,
    },
    /// The output buffer would exceed addressable memory.
    #[error("dataset {node}: cannot allocate a buffer of shape {shape:?}")]
    AllocationFailed {
        /// The slash-delimited node path.
        node: String,
        /// The requested output shape.
        shape: Vec<usize>,
    },
    /// A grid group was missing during a batch read; the whole batch is
    /// abandoned, unlike a tolerated missing dataset within a present group.
    #[error("{}: grid group {group} missing, batch aborted", file.display())]
    BatchAborted {
        /// The container file.
        file: PathBuf,
        /// The grid group name.
        group: String,
        /// The underlying open failure.
        #[source]
        source: hdf5::Error,
    },
    /// The three coordinate datasets of one grid differ in length.
    #[error("grid {grid_id}: coordinate datasets have mismatched lengths {lengths:?}")]
    CoordinateLengthMismatch {
        /// The grid id.
        grid_id: u64,
        /// The per-axis lengths, x/y/z order.
        lengths: [usize; 3],
    },
    /// A grid's coordinate type differs from the kernel bound by the first
    /// scanned grid of the query.
    #[error("grid {grid_id}: coordinate type {found} does not match the query's bound type {bound}")]
    CoordinateTypeMismatch {
        /// The grid id.
        grid_id: u64,
        /// The type bound from the first scanned grid.
        bound: DataType,
        /// The type found on this grid.
        found: DataType,
    },
    /// Periodic wrap semantics for region queries are not implemented.
    #[error("periodic region semantics are not implemented")]
    PeriodicNotSupported,
}
