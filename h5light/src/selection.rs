//! Axis-aligned read selections.
//!
//! A [`ReadSelection`] describes how much of a source dataset a read covers
//! and derives the exact output shape before any buffer is allocated. The
//! three shapes are mutually exclusive: full extent, a single-axis slice of
//! a rank-3 volume, or the point set behind a stored region reference.

use thiserror::Error;

/// The rank an axis slice requires of its source dataset.
const SLICE_SOURCE_RANK: usize = 3;

/// How much of a source dataset a read selects.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadSelection {
    /// The dataset's full extent; the output shape equals the dataset shape.
    FullExtent,
    /// The plane at `coord` on `axis` of a rank-3 volume; the output drops
    /// `axis` and keeps the remaining two extents in original order.
    ///
    /// `coord` is not validated against the source extent here: an
    /// out-of-range value surfaces as a read failure, not a bounds error.
    AxisSlice {
        /// The sliced axis, in `{0, 1, 2}`.
        axis: usize,
        /// The plane index on `axis`.
        coord: usize,
    },
    /// The point set designated by a stored region reference; the output is
    /// 1-D regardless of the source rank.
    RegionReference {
        /// The number of selected points.
        num_points: usize,
    },
}

impl ReadSelection {
    /// Build an axis-slice selection.
    ///
    /// # Errors
    /// Returns [`InvalidSliceAxisError`] if `axis` is not in `{0, 1, 2}`.
    pub fn axis_slice(axis: usize, coord: usize) -> Result<Self, InvalidSliceAxisError> {
        if axis < SLICE_SOURCE_RANK {
            Ok(Self::AxisSlice { axis, coord })
        } else {
            Err(InvalidSliceAxisError { axis })
        }
    }

    /// Derive the output shape of this selection over `source_shape`.
    ///
    /// # Errors
    /// Returns [`SelectionError`] if an axis slice is applied to a source of
    /// rank other than 3.
    pub fn output_shape(&self, source_shape: &[usize]) -> Result<Vec<usize>, SelectionError> {
        match self {
            Self::FullExtent => Ok(source_shape.to_vec()),
            Self::AxisSlice { axis, coord: _ } => {
                if source_shape.len() != SLICE_SOURCE_RANK {
                    return Err(RankUnsupportedError {
                        rank: source_shape.len(),
                        expected: SLICE_SOURCE_RANK,
                    }
                    .into());
                }
                if *axis >= SLICE_SOURCE_RANK {
                    return Err(InvalidSliceAxisError { axis: *axis }.into());
                }
                Ok(source_shape
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| index != axis)
                    .map(|(_, &extent)| extent)
                    .collect())
            }
            Self::RegionReference { num_points } => Ok(vec![*num_points]),
        }
    }
}

/// An axis slice was requested of a source with an unsupported rank.
#[derive(Copy, Clone, Debug, Error)]
#[error("source dataset has rank {rank}, axis slices require rank {expected}")]
pub struct RankUnsupportedError {
    /// The source dataset's rank.
    pub rank: usize,
    /// The required rank.
    pub expected: usize,
}

/// The slice axis is outside `{0, 1, 2}`.
#[derive(Copy, Clone, Debug, Error)]
#[error("slice axis {axis} is out of range for a rank-3 volume")]
pub struct InvalidSliceAxisError {
    /// The requested axis.
    pub axis: usize,
}

/// Selection shape errors.
#[derive(Clone, Debug, Error)]
pub enum SelectionError {
    /// The source rank does not admit this selection.
    #[error(transparent)]
    RankUnsupported(#[from] RankUnsupportedError),
    /// The slice axis is out of range.
    #[error(transparent)]
    InvalidSliceAxis(#[from] InvalidSliceAxisError),
}
