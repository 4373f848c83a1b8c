//! Files written by a run: the final field as CSV, periodic per-cell JSON
//! dumps and the timing summary.

use crate::error::SolverResult;
use crate::fv_core::field::Field;
use crate::fv_core::mesh::{Grid2d, Mesh};
use crate::fv_core::physics::{ConservationLaw, State};
use crate::simulator::Simulator;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

//STRUCTS
/// Minimum and maximum of one conserved component over the interior.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldRange {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_sim_time: f64,
    pub average_timestep: f64,
    pub max_timestep: f64,
    pub min_timestep: f64,
    #[serde(rename = "N")]
    pub n: u64,
    #[serde(rename = "Nx")]
    pub nx: usize,
    #[serde(rename = "Ny")]
    pub ny: usize,
    pub time: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Derived {
    #[serde(rename = "Sx")]
    pub sx: f64,
    #[serde(rename = "Sy")]
    pub sy: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct FaceFluxes {
    pub n: f64,
    pub s: f64,
    pub e: f64,
    pub w: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CellRecord {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub h: f64,
    pub derived: Derived,
    pub flux: FaceFluxes,
}

/// One diagnostic frame. `cells` runs from the top row of the padded grid
/// down to row 0.
#[derive(Clone, Debug, Serialize)]
pub struct CellDump {
    pub frame: u64,
    pub time: f64,
    pub cells: Vec<Vec<CellRecord>>,
}

//IMPLEMENTATIONS
impl RunSummary {
    /// Folds per-step wall-clock durations (seconds) into a summary.
    pub fn from_wall_times(wall_times: &[f64], nx: usize, ny: usize, time: f64) -> Self {
        let total: f64 = wall_times.iter().sum();
        let n = wall_times.len();
        RunSummary {
            total_sim_time: total,
            average_timestep: if n == 0 { 0.0 } else { total / n as f64 },
            max_timestep: wall_times.iter().copied().fold(0.0, f64::max),
            min_timestep: wall_times
                .iter()
                .copied()
                .reduce(f64::min)
                .unwrap_or(0.0),
            n: n as u64,
            nx,
            ny,
            time,
        }
    }

    pub fn file_name(device: &str, solver: &str, nx: usize, ny: usize) -> String {
        format!("{device}_{solver}_{nx}x{ny}.json")
    }

    pub fn write(&self, path: &Path) -> SolverResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

//HELPER FUNCTIONS
pub fn field_ranges<L, const D: usize>(
    law: &L,
    mesh: &Grid2d,
    q: &Field<State<D>>,
) -> Vec<FieldRange>
where
    L: ConservationLaw<D>,
{
    law.component_names()
        .iter()
        .enumerate()
        .map(|(i, &name)| {
            let (min, max) = mesh
                .interior()
                .cells()
                .map(|(x, y)| q[(x, y)][i])
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            FieldRange { name, min, max }
        })
        .collect()
}

/// Writes the interior as one CSV row per cell: centre coordinates followed
/// by every conserved component.
pub fn write_field_csv<L, const D: usize>(
    path: &Path,
    law: &L,
    mesh: &Grid2d,
    q: &Field<State<D>>,
) -> SolverResult<()>
where
    L: ConservationLaw<D>,
{
    let mut wtr = Writer::from_path(path)?;
    let mut header = vec!["x", "y"];
    header.extend(law.component_names());
    wtr.write_record(&header)?;

    for (x, y) in mesh.interior().cells() {
        let (cx, cy) = mesh.get_cell(x, y);
        let mut record = vec![cx.to_string(), cy.to_string()];
        record.extend(q[(x, y)].iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Snapshot of the first conserved component, its slopes and the four face
/// fluxes around every padded cell. Fluxes on the west and south faces come
/// from the neighbouring cell, clamped at the grid edge.
pub fn cell_dump<L, const D: usize>(sim: &Simulator<L, D>) -> CellDump
where
    L: ConservationLaw<D>,
{
    let mesh = sim.mesh();
    let q = sim.field();
    let (sx, sy) = sim.slopes();
    let (f, g) = sim.fluxes();

    let cells = (0..mesh.rows())
        .rev()
        .map(|y| {
            (0..mesh.stride())
                .map(|x| CellRecord {
                    kind: if mesh.is_ghost(x, y) { "G" } else { "I" },
                    h: q[(x, y)][0],
                    derived: Derived {
                        sx: sx[(x, y)][0],
                        sy: sy[(x, y)][0],
                    },
                    flux: FaceFluxes {
                        n: g[(x, y)][0],
                        s: g[(x, y.saturating_sub(1))][0],
                        e: f[(x, y)][0],
                        w: f[(x.saturating_sub(1), y)][0],
                    },
                })
                .collect()
        })
        .collect();

    CellDump {
        frame: sim.step_count(),
        time: sim.time(),
        cells,
    }
}

pub fn write_cell_dump(path: &Path, dump: &CellDump) -> SolverResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, dump)?;
    Ok(())
}
