use crate::error::{SolverError, SolverResult};
use crate::fv_core::mesh::{Grid2d, Mesh};
use std::ops::{Index, IndexMut};

/// One value per padded cell, row-major with the mesh stride.
///
/// Buffers are reserved fallibly so that an oversized grid surfaces as
/// [`SolverError::Allocation`] instead of aborting the process.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T> {
    data: Vec<T>,
    stride: usize,
}

impl<T: Copy> Field<T> {
    pub fn new(name: &'static str, mesh: &Grid2d, fill: T) -> SolverResult<Self> {
        let cells = mesh.get_length();
        let mut data = Vec::new();
        data.try_reserve_exact(cells)
            .map_err(|source| SolverError::Allocation {
                field: name,
                cells,
                source,
            })?;
        data.resize(cells, fill);
        Ok(Field {
            data,
            stride: mesh.stride(),
        })
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Overwrites every cell, ghosts included, with `other`.
    pub fn copy_from(&mut self, other: &Field<T>) {
        self.data.copy_from_slice(&other.data);
    }
}

impl<T> Index<(usize, usize)> for Field<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.data[self.stride * y + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Field<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.data[self.stride * y + x]
    }
}
