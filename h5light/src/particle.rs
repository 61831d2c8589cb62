//! Streaming particle-region validation across grid files.
//!
//! A [`RegionQuery`] classifies particles against an axis-aligned box across
//! many source files without materializing whole coordinate datasets: each
//! grid's three coordinate datasets are streamed in fixed-size chunks and
//! every particle is tested with strict inequalities on all three axes.
//!
//! The numeric kernel is bound once per query, from the first scanned grid's
//! coordinate type; every later grid must store the same type. Grids hinted
//! as fully enclosed contribute their known count without any file being
//! opened. Any open or read failure on any axis of any grid abandons the
//! whole query; all accumulated state is dropped on every exit path.

use std::path::{Path, PathBuf};

use hdf5::{Dataset, H5Type};
use indexmap::IndexMap;
use itertools::izip;
use ndarray::{s, Array1};
use num::Float;

use crate::container::Container;
use crate::data_type::{DataType, UnsupportedDataTypeError};
use crate::error::ReadError;
use crate::grid::grid_group_name;

/// The default number of particles processed per streaming chunk.
pub const DEFAULT_STRIDE: usize = 65_536;

/// What a region query validates against.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum RegionSpec {
    /// An axis-aligned box; a particle is inside iff every coordinate lies
    /// strictly between the box edges on its axis.
    AxisAlignedBox {
        /// The lower box corner, x/y/z order.
        left_edge: [f64; 3],
        /// The upper box corner, x/y/z order.
        right_edge: [f64; 3],
        /// Periodic wrap semantics; not implemented, `true` fails the query
        /// before any file is opened.
        periodic: bool,
    },
}

/// One grid to validate: the file holding it, its id, and an optional
/// enclosure hint.
#[derive(Clone, Debug)]
pub struct GridSource {
    path: PathBuf,
    grid_id: u64,
    enclosed_count: Option<u64>,
}

impl GridSource {
    /// A grid that must be scanned.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P, grid_id: u64) -> Self {
        Self {
            path: path.into(),
            grid_id,
            enclosed_count: None,
        }
    }

    /// Mark the grid as known a priori to lie entirely inside the region
    /// with `count` particles; its known count is added to the total and its
    /// file is never opened.
    #[must_use]
    pub fn fully_enclosed(mut self, count: u64) -> Self {
        self.enclosed_count = Some(count);
        self
    }

    /// The file holding this grid.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The grid id.
    #[must_use]
    pub fn grid_id(&self) -> u64 {
        self.grid_id
    }
}

/// A matching particle gathered during a scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GatheredParticle {
    /// The grid the particle came from.
    pub grid_id: u64,
    /// The particle position, x/y/z order, widened to `f64`.
    pub position: [f64; 3],
}

/// The outcome of a region query.
#[derive(Clone, Debug)]
pub struct RegionValidation {
    total: u64,
    masks: IndexMap<u64, Vec<bool>>,
    gathered: Option<Vec<GatheredParticle>>,
}

impl RegionValidation {
    /// The number of particles inside the region, across all grids,
    /// including hinted counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Per-grid inclusion masks for every scanned grid, keyed by grid id in
    /// scan order. Hinted grids have no mask.
    #[must_use]
    pub fn masks(&self) -> &IndexMap<u64, Vec<bool>> {
        &self.masks
    }

    /// The inclusion mask of one scanned grid.
    #[must_use]
    pub fn mask(&self, grid_id: u64) -> Option<&[bool]> {
        self.masks.get(&grid_id).map(Vec::as_slice)
    }

    /// The gathered matching particles, present when gathering was enabled.
    #[must_use]
    pub fn gathered(&self) -> Option<&[GatheredParticle]> {
        self.gathered.as_deref()
    }

    /// Consume the validation, returning the gathered particles.
    #[must_use]
    pub fn into_gathered(self) -> Option<Vec<GatheredParticle>> {
        self.gathered
    }
}

/// A configured region query.
///
/// The query owns its accumulator for the duration of one
/// [`validate`](Self::validate) call, which consumes the query: two
/// concurrent runs can never share state.
#[derive(Clone, Debug)]
pub struct RegionQuery {
    spec: RegionSpec,
    stride: usize,
    gather: bool,
}

impl RegionQuery {
    /// A query over `spec` with the default stride and no gathering.
    #[must_use]
    pub fn new(spec: RegionSpec) -> Self {
        Self {
            spec,
            stride: DEFAULT_STRIDE,
            gather: false,
        }
    }

    /// Set the chunk length, in particles, used for the whole query.
    ///
    /// # Panics
    /// Panics if `stride` is zero.
    #[must_use]
    pub fn stride(mut self, stride: usize) -> Self {
        assert!(stride > 0, "stride must be nonzero");
        self.stride = stride;
        self
    }

    /// Also gather each matching particle's coordinates and originating grid
    /// id, in scan order.
    #[must_use]
    pub fn gather(mut self, gather: bool) -> Self {
        self.gather = gather;
        self
    }

    /// Validate every grid in `sources`, in order.
    ///
    /// # Errors
    /// Returns a [`ReadError`] on the first failure; no partial count or
    /// mask set survives a failed query.
    pub fn validate(self, sources: &[GridSource]) -> Result<RegionValidation, ReadError> {
        let RegionSpec::AxisAlignedBox {
            left_edge,
            right_edge,
            periodic,
        } = self.spec;
        if periodic {
            return Err(ReadError::PeriodicNotSupported);
        }

        let mut state = QueryState::new(self.stride, self.gather);
        for source in sources {
            if let Some(count) = source.enclosed_count {
                state.total += count;
                continue;
            }
            state.scan_grid(source, &left_edge, &right_edge)?;
        }
        Ok(state.finish())
    }
}

/// The accumulator owned by one running query.
struct QueryState {
    stride: usize,
    total: u64,
    masks: IndexMap<u64, Vec<bool>>,
    gathered: Option<Vec<GatheredParticle>>,
    /// Coordinate type bound from the first scanned grid.
    bound_type: Option<DataType>,
}

impl QueryState {
    fn new(stride: usize, gather: bool) -> Self {
        Self {
            stride,
            total: 0,
            masks: IndexMap::new(),
            gathered: gather.then(Vec::new),
            bound_type: None,
        }
    }

    fn finish(self) -> RegionValidation {
        RegionValidation {
            total: self.total,
            masks: self.masks,
            gathered: self.gathered,
        }
    }

    fn scan_grid(
        &mut self,
        source: &GridSource,
        left_edge: &[f64; 3],
        right_edge: &[f64; 3],
    ) -> Result<(), ReadError> {
        let container = Container::open(source.path())?;
        let group = grid_group_name(source.grid_id());
        let open_axis = |axis: char| -> Result<(Dataset, String), ReadError> {
            let node = format!("{group}/particle_position_{axis}");
            Ok((container.locate(&node)?, node))
        };
        let coordinates = [open_axis('x')?, open_axis('y')?, open_axis('z')?];

        let lengths = [
            coordinates[0].0.size(),
            coordinates[1].0.size(),
            coordinates[2].0.size(),
        ];
        if lengths[0] != lengths[1] || lengths[1] != lengths[2] {
            return Err(ReadError::CoordinateLengthMismatch {
                grid_id: source.grid_id(),
                lengths,
            });
        }
        let num_particles = lengths[0];

        let coordinate_type = coordinate_data_type(&container, &coordinates[0])?;
        match self.bound_type {
            None => self.bound_type = Some(coordinate_type),
            Some(bound) if bound == coordinate_type => {}
            Some(bound) => {
                return Err(ReadError::CoordinateTypeMismatch {
                    grid_id: source.grid_id(),
                    bound,
                    found: coordinate_type,
                })
            }
        }

        match coordinate_type {
            DataType::Float32 => self.scan_chunks::<f32>(
                &container,
                source.grid_id(),
                &coordinates,
                num_particles,
                left_edge,
                right_edge,
            ),
            DataType::Float64 => self.scan_chunks::<f64>(
                &container,
                source.grid_id(),
                &coordinates,
                num_particles,
                left_edge,
                right_edge,
            ),
            _ => unreachable!("coordinate_data_type admits float lanes only"),
        }
    }

    fn scan_chunks<T: H5Type + Float>(
        &mut self,
        container: &Container,
        grid_id: u64,
        coordinates: &[(Dataset, String); 3],
        num_particles: usize,
        left_edge: &[f64; 3],
        right_edge: &[f64; 3],
    ) -> Result<(), ReadError> {
        let left = convert_edges::<T>(left_edge);
        let right = convert_edges::<T>(right_edge);
        let mut mask = Vec::with_capacity(num_particles);
        let mut offset = 0;
        while offset < num_particles {
            let end = usize::min(offset + self.stride, num_particles);
            let x = read_chunk::<T>(container, &coordinates[0], offset, end)?;
            let y = read_chunk::<T>(container, &coordinates[1], offset, end)?;
            let z = read_chunk::<T>(container, &coordinates[2], offset, end)?;
            for (&x, &y, &z) in izip!(x.iter(), y.iter(), z.iter()) {
                let inside = box_contains(&left, &right, [x, y, z]);
                mask.push(inside);
                if inside {
                    self.total += 1;
                    if let Some(gathered) = self.gathered.as_mut() {
                        gathered.push(GatheredParticle {
                            grid_id,
                            position: widen([x, y, z]),
                        });
                    }
                }
            }
            offset = end;
        }
        self.masks.insert(grid_id, mask);
        Ok(())
    }
}

/// Strict-inequality box test on all three axes.
fn box_contains<T: Float>(left: &[T; 3], right: &[T; 3], position: [T; 3]) -> bool {
    izip!(left, right, position)
        .all(|(left, right, coordinate)| *left < coordinate && coordinate < *right)
}

fn convert_edges<T: Float>(edges: &[f64; 3]) -> [T; 3] {
    edges.map(|edge| T::from(edge).unwrap_or_else(T::nan))
}

fn widen<T: Float>(position: [T; 3]) -> [f64; 3] {
    position.map(|coordinate| coordinate.to_f64().unwrap_or(f64::NAN))
}

/// The coordinate type of one axis dataset; only float lanes have a
/// classification kernel.
fn coordinate_data_type(
    container: &Container,
    (dataset, node): &(Dataset, String),
) -> Result<DataType, ReadError> {
    let data_type = container.data_type_of(dataset, node)?;
    match data_type {
        DataType::Float32 | DataType::Float64 => Ok(data_type),
        other => Err(UnsupportedDataTypeError::no_kernel(other).into()),
    }
}

fn read_chunk<T: H5Type>(
    container: &Container,
    (dataset, node): &(Dataset, String),
    start: usize,
    end: usize,
) -> Result<Array1<T>, ReadError> {
    dataset
        .read_slice_1d::<T, _>(s![start..end])
        .map_err(|source| ReadError::SelectionRejected {
            file: container.path().to_path_buf(),
            node: node.clone(),
            source,
        })
}
