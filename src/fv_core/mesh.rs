use crate::error::{SolverError, SolverResult};
use std::ops::Range;

/// Depth of the ghost halo on every side of the domain.
pub const GHOST: usize = 2;

pub trait Mesh {
    fn get_dx(&self) -> f64;

    fn get_dy(&self) -> f64;

    /// Cell-centre coordinate of the padded index `(x, y)` on the unit square.
    fn get_cell(&self, x: usize, y: usize) -> (f64, f64);

    fn get_length(&self) -> usize;

    fn interior(&self) -> Region;
}

/// Half-open rectangle of padded cell indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: Range<usize>,
    pub y: Range<usize>,
}

impl Region {
    pub fn new(x: Range<usize>, y: Range<usize>) -> Self {
        Region { x, y }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.x.contains(&x) && self.y.contains(&y)
    }

    pub fn num_cells(&self) -> usize {
        self.x.len() * self.y.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.y
            .clone()
            .flat_map(move |y| self.x.clone().map(move |x| (x, y)))
    }
}

/// Uniform `nx` x `ny` mesh on the unit square with a halo of [`GHOST`] cells,
/// stored row-major as `k = (nx + 4) * y + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2d {
    nx: usize,
    ny: usize,
    stride: usize,
    rows: usize,
    len: usize,
    dx: f64,
    dy: f64,
}

impl Grid2d {
    pub fn new(nx: usize, ny: usize) -> SolverResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(SolverError::InvalidGrid { nx, ny });
        }
        let stride = nx.checked_add(2 * GHOST);
        let rows = ny.checked_add(2 * GHOST);
        let len = stride.zip(rows).and_then(|(s, r)| s.checked_mul(r));
        let (Some(stride), Some(rows), Some(len)) = (stride, rows, len) else {
            return Err(SolverError::GridTooLarge { nx, ny });
        };
        Ok(Grid2d {
            nx,
            ny,
            stride,
            rows,
            len,
            dx: 1.0 / nx as f64,
            dy: 1.0 / ny as f64,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        self.stride() * y + x
    }

    pub fn is_ghost(&self, x: usize, y: usize) -> bool {
        !self.interior().contains(x, y)
    }

    pub fn whole(&self) -> Region {
        Region::new(0..self.stride(), 0..self.rows())
    }

    /// Interior plus one ghost layer: slopes are needed one cell into the halo.
    pub fn reconstruction_region(&self) -> Region {
        Region::new(1..self.nx + GHOST + 1, 1..self.ny + GHOST + 1)
    }

    /// `(nx + 1) x (ny + 1)` cells whose east/north faces bound every interior cell.
    pub fn flux_region(&self) -> Region {
        Region::new(GHOST - 1..self.nx + GHOST, GHOST - 1..self.ny + GHOST)
    }
}

impl Mesh for Grid2d {
    fn get_dx(&self) -> f64 {
        self.dx
    }

    fn get_dy(&self) -> f64 {
        self.dy
    }

    fn get_cell(&self, x: usize, y: usize) -> (f64, f64) {
        let i = x as f64 - GHOST as f64;
        let j = y as f64 - GHOST as f64;
        ((i + 0.5) * self.dx, (j + 0.5) * self.dy)
    }

    fn get_length(&self) -> usize {
        self.len
    }

    fn interior(&self) -> Region {
        Region::new(GHOST..self.nx + GHOST, GHOST..self.ny + GHOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_grid() {
        assert!(matches!(
            Grid2d::new(0, 4),
            Err(SolverError::InvalidGrid { nx: 0, ny: 4 })
        ));
        assert!(Grid2d::new(4, 0).is_err());
    }

    #[test]
    fn rejects_overflowing_grid() {
        assert!(matches!(
            Grid2d::new(usize::MAX / 2, 8),
            Err(SolverError::GridTooLarge { ny: 8, .. })
        ));
        assert!(Grid2d::new(usize::MAX - 1, 1).is_err());
        assert!(Grid2d::new(8, usize::MAX).is_err());
    }

    #[test]
    fn padded_layout() {
        let grid = Grid2d::new(4, 3).unwrap();
        assert_eq!(grid.stride(), 8);
        assert_eq!(grid.rows(), 7);
        assert_eq!(grid.get_length(), 56);
        assert_eq!(grid.index(3, 2), 8 * 2 + 3);
        assert_eq!(grid.interior().num_cells(), 12);
        assert!(grid.is_ghost(1, 3));
        assert!(grid.is_ghost(3, 5));
        assert!(!grid.is_ghost(2, 2));
    }

    #[test]
    fn stage_regions() {
        let grid = Grid2d::new(4, 4).unwrap();
        assert_eq!(grid.reconstruction_region(), Region::new(1..7, 1..7));
        assert_eq!(grid.flux_region(), Region::new(1..6, 1..6));
        assert_eq!(grid.flux_region().num_cells(), 25);
    }

    #[test]
    fn cell_centres() {
        let grid = Grid2d::new(4, 2).unwrap();
        let (x, y) = grid.get_cell(2, 2);
        assert!((x - 0.125).abs() < 1e-15);
        assert!((y - 0.25).abs() < 1e-15);
        let (x, _) = grid.get_cell(0, 2);
        assert!((x + 0.375).abs() < 1e-15);
    }
}
