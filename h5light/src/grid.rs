//! Batch reads across grid groups.
//!
//! Grids live in groups named by a fixed convention: the prefix `Grid`
//! followed by the grid id zero-padded to 8 digits (`/Grid00000042`). A
//! batch read walks the requested grids in order; a missing grid group
//! aborts the whole batch, while a missing dataset inside a present group is
//! tolerated and simply omitted from that grid's map.

use indexmap::IndexMap;

use crate::array::NumericArray;
use crate::container::Container;
use crate::error::ReadError;

/// The fixed prefix of grid group names.
const GRID_GROUP_PREFIX: &str = "Grid";

/// An ordered mapping from dataset name to extracted array, for one grid.
pub type GridData = IndexMap<String, NumericArray>;

/// Format the group name for `grid_id`: the fixed prefix plus the id
/// zero-padded to 8 digits.
pub(crate) fn grid_group_name(grid_id: u64) -> String {
    format!("/{GRID_GROUP_PREFIX}{grid_id:08}")
}

/// Read `dataset_names` from every grid in `grid_ids`, in order.
///
/// A dataset absent from an otherwise-valid grid group is omitted from that
/// grid's map only; a missing grid group aborts the entire batch and nothing
/// partial is returned.
///
/// # Errors
/// Returns [`ReadError::BatchAborted`] if a grid group is missing, or any
/// other [`ReadError`] raised while reading a present dataset.
pub fn read_grids(
    container: &Container,
    grid_ids: &[u64],
    dataset_names: &[&str],
) -> Result<IndexMap<u64, GridData>, ReadError> {
    let mut grids = IndexMap::with_capacity(grid_ids.len());
    for &grid_id in grid_ids {
        let group_name = grid_group_name(grid_id);
        container
            .group(&group_name)
            .map_err(|source| ReadError::BatchAborted {
                file: container.path().to_path_buf(),
                group: group_name.clone(),
                source,
            })?;
        let mut datasets = GridData::with_capacity(dataset_names.len());
        for &name in dataset_names {
            let node = format!("{group_name}/{name}");
            match container.read_dataset(&node) {
                Ok(array) => {
                    datasets.insert(name.to_string(), array);
                }
                Err(ReadError::DatasetNotFound { .. }) => {
                    log::debug!("grid {grid_id}: dataset {name} absent, omitted");
                }
                Err(other) => return Err(other),
            }
        }
        grids.insert(grid_id, datasets);
    }
    Ok(grids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_group_names_are_zero_padded() {
        assert_eq!(grid_group_name(1), "/Grid00000001");
        assert_eq!(grid_group_name(42), "/Grid00000042");
        assert_eq!(grid_group_name(12_345_678), "/Grid12345678");
    }

    #[test]
    fn wide_grid_ids_keep_all_digits() {
        assert_eq!(grid_group_name(123_456_789), "/Grid123456789");
    }
}
