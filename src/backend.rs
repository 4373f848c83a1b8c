//! Execution strategies for the per-cell stages.
//!
//! Every stage of a step is a pure function from input fields to one output
//! field, evaluated independently for each cell of a [`Region`]. A backend
//! only decides how those cell evaluations are scheduled, so swapping one for
//! another never changes the numbers.

use crate::error::SolverResult;
use crate::fv_core::mesh::Region;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Serial,
    #[default]
    Parallel,
}

impl BackendKind {
    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::Serial => "CPU",
            BackendKind::Parallel => "PAR",
        }
    }
}

pub enum Backend {
    Serial,
    Parallel(ThreadPool),
}

impl Backend {
    pub fn new(kind: BackendKind, threads: Option<usize>) -> SolverResult<Self> {
        match kind {
            BackendKind::Serial => Ok(Backend::Serial),
            BackendKind::Parallel => {
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(n) = threads {
                    builder = builder.num_threads(n);
                }
                Ok(Backend::Parallel(builder.build()?))
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Serial => BackendKind::Serial,
            Backend::Parallel(_) => BackendKind::Parallel,
        }
    }

    /// Writes `f(x, y)` into every cell of `region`. Cells outside the region
    /// are left untouched.
    pub fn map_cells<T, F>(&self, out: &mut [T], stride: usize, region: &Region, f: F)
    where
        T: Send,
        F: Fn(usize, usize) -> T + Sync,
    {
        self.for_each_row(out, stride, region.y.clone(), |y, row| {
            for x in region.x.clone() {
                row[x] = f(x, y);
            }
        });
    }

    /// Runs `f(y, row)` on each full row with index in `rows`.
    pub fn for_each_row<T, F>(&self, out: &mut [T], stride: usize, rows: std::ops::Range<usize>, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        let skip = rows.start;
        let take = rows.len();
        match self {
            Backend::Serial => {
                for (y, row) in out.chunks_mut(stride).enumerate().skip(skip).take(take) {
                    f(y, row);
                }
            }
            Backend::Parallel(pool) => pool.install(|| {
                out.par_chunks_mut(stride)
                    .enumerate()
                    .skip(skip)
                    .take(take)
                    .for_each(|(y, row)| f(y, row));
            }),
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Serial => write!(f, "Serial"),
            Backend::Parallel(pool) => write!(f, "Parallel({} threads)", pool.current_num_threads()),
        }
    }
}
