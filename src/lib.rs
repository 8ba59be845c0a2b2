pub mod algorithms;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;

pub use algorithms::*;
pub use config::*;
pub use data::*;
pub use error::*;
pub use pipeline::*;

pub type Result<T> = anyhow::Result<T>;

/// Summary of one stacking run, serializable for the optional JSON report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StackReport {
    pub reference: String,
    pub candidates: usize,
    pub aligned: usize,
    pub rejected: usize,
    pub stacked: usize,
    pub mode: algorithms::stacking::StackMode,
    pub elapsed_ms: u128,
}
