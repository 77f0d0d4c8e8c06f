//! Business logic services for the Rubber Carbon Assessment Platform

pub mod batch;
pub mod carbon;
pub mod plot;
pub mod workflow;

pub use batch::BatchSummary;
pub use carbon::CarbonService;
pub use plot::PlotService;
pub use workflow::WorkflowService;
