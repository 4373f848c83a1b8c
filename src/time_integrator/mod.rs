pub mod fvm_ssp_rk;
pub mod timestep;
