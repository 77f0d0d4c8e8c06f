//! Batch aggregation over a set of plots
//!
//! Pure reductions used by the confirmation screen and the final save
//! snapshot, plus the edit-recall intent that lets a single plot be pulled
//! back into configuration without the workflow losing its place.

use serde::{Deserialize, Serialize};

use shared::{Plot, PlotId};

use crate::services::workflow::WorkflowStep;

/// Totals over a selection of plots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub count: usize,
    pub total_area_rai: f64,
    pub total_carbon_tons: f64,
}

/// Sum area and carbon over the given plots; plots with no computed carbon
/// contribute zero
pub fn summarize(plots: &[Plot]) -> BatchSummary {
    BatchSummary {
        count: plots.len(),
        total_area_rai: plots.iter().map(|p| p.area_rai).sum(),
        total_carbon_tons: plots.iter().filter_map(|p| p.carbon_tons).sum(),
    }
}

/// Intent to edit one plot while remembering where the user came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecall {
    pub plot_id: PlotId,
    /// The step to return to once the edit completes or is cancelled
    pub origin: WorkflowStep,
}

/// Capture the caller's current step as the origin of an edit.
///
/// Works the same whether invoked from the batch-confirmation list or the
/// plain results list.
pub fn recall_for_edit(plot_id: PlotId, current_step: WorkflowStep) -> EditRecall {
    EditRecall {
        plot_id,
        origin: current_step,
    }
}
