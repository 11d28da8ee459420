pub mod classify;
pub mod emit;
pub mod histogram;
pub mod ingest;
pub mod pipeline;
pub mod ratio;
pub mod spectra;
