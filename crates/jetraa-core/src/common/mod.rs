pub mod binning;
pub mod config;
pub mod constants;
