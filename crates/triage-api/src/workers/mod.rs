//! Background workers

pub mod enrich;

pub use enrich::EnrichmentJob;
