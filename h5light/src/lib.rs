//! `h5light` is a Rust library for light-weight, read-only extraction of
//! numeric array datasets from HDF5 hierarchies.
//!
//! The library deliberately covers a narrow slice of HDF5: locating a
//! dataset by node path, mapping its native scalar type to a fixed set of
//! output element types with byte-for-byte value fidelity, and reading it
//! through one of three axis-aligned selections — the full extent, a
//! single-axis slice reducing a rank-3 volume to rank 2, or the point set
//! behind a stored dataset-region reference. On top of the single-dataset
//! path sit two composites:
//! - [`read_grids`](grid::read_grids) reads many named datasets from many
//!   zero-padded grid groups into an ordered two-level mapping, tolerating a
//!   dataset absent from one grid but aborting on a missing grid group, and
//! - [`RegionQuery`](particle::RegionQuery) streams the three
//!   `particle_position_{x,y,z}` coordinate datasets of many grids, across
//!   many files, in fixed-size chunks, classifying each particle against an
//!   axis-aligned box without materializing whole datasets in memory.
//!
//! Every operation is synchronous and single-shot: no caching, no retries,
//! no background work. Handles and buffers are released on the call stack
//! that acquired them, on success and failure alike, and no partial result
//! ever escapes a failed call.
//!
//! Writing, appending, general N-dimensional slicing, foreign-endianness or
//! compound stored types, and periodic particle-region semantics are out of
//! scope.
//!
//! ## Example
//! ```rust,no_run
//! use h5light::{Container, RegionQuery, RegionSpec, GridSource};
//!
//! let container = Container::open("DD0010/data0010.cpu0000")?;
//! let density = container.read_dataset("/Grid00000001/Density")?;
//! println!("{:?} {}", density.shape(), density.data_type());
//!
//! // A single y-plane of a rank-3 volume.
//! let plane = container.read_dataset_slice("/Grid00000001/Density", 1, 16)?;
//!
//! // Count particles inside a box across two grid files.
//! let validation = RegionQuery::new(RegionSpec::AxisAlignedBox {
//!     left_edge: [0.25; 3],
//!     right_edge: [0.75; 3],
//!     periodic: false,
//! })
//! .validate(&[
//!     GridSource::new("DD0010/data0010.cpu0000", 1),
//!     GridSource::new("DD0010/data0010.cpu0001", 2).fully_enclosed(1024),
//! ])?;
//! println!("{} particles inside", validation.total());
//! # Ok::<(), h5light::ReadError>(())
//! ```
//!
//! ## Logging
//! `h5light` logs tolerated irregularities (probe misses, datasets omitted
//! from a batch) using the [`log`] crate. A logging implementation must be
//! enabled to capture logs.
//!
//! ## Licence
//! `h5light` is licensed under either of
//!  - the Apache License, Version 2.0 or
//!  - the MIT license, at your option.

pub mod array;
pub mod container;
pub mod data_type;
pub mod error;
pub mod grid;
pub mod particle;
pub mod selection;

mod region_ref;

pub use crate::array::{Element, NumericArray};
pub use crate::container::{Container, DatasetExtents};
pub use crate::data_type::{DataType, UnsupportedDataTypeError};
pub use crate::error::ReadError;
pub use crate::grid::{read_grids, GridData};
pub use crate::particle::{
    GatheredParticle, GridSource, RegionQuery, RegionSpec, RegionValidation, DEFAULT_STRIDE,
};
pub use crate::selection::ReadSelection;
