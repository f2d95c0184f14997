//! Pipeline engine
//!
//! Drives the stages for every ticker in a query and assembles the
//! per-ticker [`Report`]s.

pub mod pipeline;
pub mod report;

pub use pipeline::{StockPipeline, StockPipelineBuilder};
pub use report::{AnalysisRun, Report, Section, TickerOutcome};
