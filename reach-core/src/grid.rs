//! Grid cells and the covering service used as a coarse spatial pre-filter.
//!
//! A covering maps a centre and a radius to every cell that may intersect
//! the search disc. Coverings are supersets: a user inside a covered cell can
//! still be outside the radius, so callers must never treat membership as an
//! exact distance test.

use std::collections::BTreeSet;

use geo::{Coord, Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    ConfigurationError,
    distance::{KM_PER_DEGREE_LATITUDE, KM_PER_DEGREE_LONGITUDE},
};

/// Discrete grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCell {
    /// Row index, growing northwards.
    pub row: i32,
    /// Column index, growing eastwards.
    pub col: i32,
}

impl GridCell {
    /// Construct a cell from its row and column.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Compute the grid cells that may intersect a search disc.
///
/// Implementations must return a superset of the cells touched by the disc
/// of `radius_meters` around `center`. An empty set is valid and selects
/// nobody.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeSet;
/// use geo::Coord;
/// use reach_core::{GridCell, GridCovering};
///
/// struct SingleCell;
///
/// impl GridCovering for SingleCell {
///     fn covering_for(&self, _center: Coord<f64>, _radius_meters: f64) -> BTreeSet<GridCell> {
///         BTreeSet::from([GridCell::new(0, 0)])
///     }
/// }
///
/// let cells = SingleCell.covering_for(Coord { x: 0.0, y: 0.0 }, 1_000.0);
/// assert_eq!(cells.len(), 1);
/// ```
pub trait GridCovering: Send + Sync {
    /// Return every cell that may intersect the disc.
    fn covering_for(&self, center: Coord<f64>, radius_meters: f64) -> BTreeSet<GridCell>;
}

impl<T> GridCovering for &T
where
    T: GridCovering + ?Sized,
{
    fn covering_for(&self, center: Coord<f64>, radius_meters: f64) -> BTreeSet<GridCell> {
        (**self).covering_for(center, radius_meters)
    }
}

/// Square cells of fixed angular size in longitude/latitude space.
///
/// `row = floor(lat / size)` and `col = floor(lon / size)`. The covering
/// enumerates the cells of the disc's bounding box, widening the longitude
/// span with the latitude furthest from the equator. Regions crossing the
/// antimeridian are clamped rather than wrapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformGrid {
    cell_degrees: f64,
}

impl UniformGrid {
    /// Default cell size, roughly eleven kilometres of latitude.
    pub const DEFAULT_CELL_DEGREES: f64 = 0.1;

    /// Smallest accepted cell size, roughly 110 metres of latitude.
    pub const MIN_CELL_DEGREES: f64 = 0.001;

    /// Build a grid with the given cell size in degrees.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::InvalidCellSize`] unless the size is a
    /// finite number no smaller than [`Self::MIN_CELL_DEGREES`].
    pub fn new(cell_degrees: f64) -> Result<Self, ConfigurationError> {
        if cell_degrees.is_finite() && cell_degrees >= Self::MIN_CELL_DEGREES {
            Ok(Self { cell_degrees })
        } else {
            Err(ConfigurationError::InvalidCellSize {
                degrees: cell_degrees,
            })
        }
    }

    /// Size of one cell in degrees.
    #[must_use]
    pub const fn cell_degrees(&self) -> f64 {
        self.cell_degrees
    }

    /// Cell containing `location`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        reason = "cell indices are floored quotients of bounded WGS84 degrees"
    )]
    pub fn cell_for(&self, location: Coord<f64>) -> GridCell {
        GridCell::new(
            (location.y / self.cell_degrees).floor() as i32,
            (location.x / self.cell_degrees).floor() as i32,
        )
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "bounding box spans derive from kilometre-per-degree factors"
    )]
    fn bounding_box(center: Coord<f64>, radius_km: f64) -> Rect<f64> {
        let lat_span = radius_km / KM_PER_DEGREE_LATITUDE;
        let south = (center.y - lat_span).max(-90.0);
        let north = (center.y + lat_span).min(90.0);
        let widest = south.abs().max(north.abs());
        let lon_scale = KM_PER_DEGREE_LONGITUDE * widest.to_radians().cos();
        let lon_span = if lon_scale > f64::EPSILON {
            (radius_km / lon_scale).min(180.0)
        } else {
            180.0
        };
        Rect::new(
            Coord {
                x: (center.x - lon_span).max(-180.0),
                y: south,
            },
            Coord {
                x: (center.x + lon_span).min(180.0),
                y: north,
            },
        )
    }
}

impl Default for UniformGrid {
    fn default() -> Self {
        Self {
            cell_degrees: Self::DEFAULT_CELL_DEGREES,
        }
    }
}

impl GridCovering for UniformGrid {
    /// Enumerate the cells of the disc's bounding box.
    ///
    /// The set holds about `(2 * lat_span / size + 2) * (2 * lon_span / size
    /// + 2)` cells, so its size grows with the disc's area over the cell
    /// area. At [`UniformGrid::MIN_CELL_DEGREES`] a 10 km disc in Paris
    /// covers about 50,000 cells; the default size covers a few dozen.
    #[expect(
        clippy::float_arithmetic,
        reason = "the radius is supplied in metres and spans are computed in kilometres"
    )]
    fn covering_for(&self, center: Coord<f64>, radius_meters: f64) -> BTreeSet<GridCell> {
        if !radius_meters.is_finite() || !center.x.is_finite() || !center.y.is_finite() {
            return BTreeSet::new();
        }
        let bbox = Self::bounding_box(center, radius_meters.max(0.0) / 1000.0);
        let min = self.cell_for(bbox.min());
        let max = self.cell_for(bbox.max());
        (min.row..=max.row)
            .flat_map(|row| (min.col..=max.col).map(move |col| GridCell::new(row, col)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approximate_distance_km;
    use rstest::rstest;

    #[rstest]
    fn assigns_cells_by_flooring() {
        let grid = UniformGrid::default();
        assert_eq!(
            grid.cell_for(Coord { x: 2.35, y: 48.85 }),
            GridCell::new(488, 23)
        );
        assert_eq!(
            grid.cell_for(Coord { x: -0.05, y: -0.05 }),
            GridCell::new(-1, -1)
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(0.00001)]
    #[case(f64::NAN)]
    fn rejects_invalid_cell_size(#[case] degrees: f64) {
        assert!(matches!(
            UniformGrid::new(degrees),
            Err(ConfigurationError::InvalidCellSize { .. })
        ));
    }

    #[rstest]
    fn smallest_cells_keep_a_city_covering_bounded() {
        let grid = UniformGrid::new(UniformGrid::MIN_CELL_DEGREES).expect("valid cell size");
        let cells = grid.covering_for(Coord { x: 2.35, y: 48.85 }, 10_000.0);
        assert!(cells.len() > 40_000);
        assert!(cells.len() < 60_000, "{} cells", cells.len());
    }

    #[rstest]
    fn zero_radius_covers_the_centre_cell_only() {
        let grid = UniformGrid::default();
        let center = Coord { x: 2.35, y: 48.85 };
        let cells = grid.covering_for(center, 0.0);
        assert_eq!(cells, BTreeSet::from([grid.cell_for(center)]));
    }

    #[rstest]
    fn non_finite_radius_covers_nothing() {
        let grid = UniformGrid::default();
        assert!(
            grid.covering_for(Coord { x: 0.0, y: 0.0 }, f64::NAN)
                .is_empty()
        );
    }

    #[rstest]
    #[case(Coord { x: 2.35, y: 48.85 }, 15_000.0)]
    #[case(Coord { x: -70.0, y: -33.4 }, 40_000.0)]
    #[case(Coord { x: 0.0, y: 0.0 }, 5_000.0)]
    fn covering_contains_every_point_inside_the_radius(
        #[case] center: Coord<f64>,
        #[case] radius_meters: f64,
    ) {
        let grid = UniformGrid::new(0.05).expect("valid cell size");
        let cells = grid.covering_for(center, radius_meters);
        let radius_km = radius_meters / 1000.0;
        for step_lat in -20..=20 {
            for step_lon in -20..=20 {
                let probe = Coord {
                    x: center.x + f64::from(step_lon) * 0.03,
                    y: center.y + f64::from(step_lat) * 0.03,
                };
                if approximate_distance_km(probe, center) < radius_km {
                    assert!(
                        cells.contains(&grid.cell_for(probe)),
                        "cell of {probe:?} missing from covering"
                    );
                }
            }
        }
    }
}
