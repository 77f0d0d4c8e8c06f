//! Plot workflow state machine
//!
//! One workflow session exists per server instance. Every user-facing action
//! is an explicit transition on this machine; the only implicit recomputation
//! is the recalculation triggered by a calculation-method change during
//! configuration. Invalid transitions fail with a state-transition error and
//! never touch the plot store.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use shared::{CalculationMethod, Plot, PlotId, RubberVariety};

use crate::error::{AppError, AppResult};
use crate::services::batch::{self, BatchSummary, EditRecall};
use crate::services::carbon::CarbonService;
use crate::services::plot::{DrawnFeature, ImportedFeature, PlotService, UpdatePlotInput};
use crate::store::PlotStore;

/// Steps of the plot workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    /// Landing view listing saved plots
    Start,
    /// Waiting for a polygon from the drawing tool
    Drawing,
    /// Reviewing features decoded from a shapefile
    ImportReview,
    /// Per-plot or per-batch attribute entry
    Configure,
    /// Estimation in progress
    Calculate,
    /// Single-plot or list results
    Review,
    /// Pre-save summary
    ConfirmBatch,
    /// Terminal confirmation after a successful save
    Saved,
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowStep::Start => "start",
            WorkflowStep::Drawing => "drawing",
            WorkflowStep::ImportReview => "import_review",
            WorkflowStep::Configure => "configure",
            WorkflowStep::Calculate => "calculate",
            WorkflowStep::Review => "review",
            WorkflowStep::ConfirmBatch => "confirm_batch",
            WorkflowStep::Saved => "saved",
        };
        write!(f, "{}", name)
    }
}

/// How geometry is being acquired in this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionMode {
    Draw,
    Import,
}

/// Shared attributes applied to a batch of selected plots
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchAttributes {
    pub planting_year_be: Option<i32>,
    pub age_years: Option<u32>,
    pub variety: Option<RubberVariety>,
    pub method: Option<CalculationMethod>,
}

/// Serializable view of the session for clients
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub step: WorkflowStep,
    pub mode: Option<AcquisitionMode>,
    pub active_plot: Option<PlotId>,
    pub selection: Vec<PlotId>,
    pub confirmed: Vec<PlotId>,
    pub origin: Option<WorkflowStep>,
    pub save_in_flight: bool,
    pub last_saved_summary: Option<BatchSummary>,
}

#[derive(Debug)]
struct SessionState {
    step: WorkflowStep,
    mode: Option<AcquisitionMode>,
    /// Draft currently being drawn or edited
    active_plot: Option<PlotId>,
    /// Current selection, insertion-ordered and duplicate-free
    selection: Vec<PlotId>,
    /// Plots that passed the per-batch configuration step
    confirmed: BTreeSet<PlotId>,
    /// Step to return to after an edit recall
    origin: Option<WorkflowStep>,
    save_in_flight: bool,
    last_saved_summary: Option<BatchSummary>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            step: WorkflowStep::Start,
            mode: None,
            active_plot: None,
            selection: Vec::new(),
            confirmed: BTreeSet::new(),
            origin: None,
            save_in_flight: false,
            last_saved_summary: None,
        }
    }
}

/// The session state machine
pub struct WorkflowService {
    state: RwLock<SessionState>,
    store: Arc<PlotStore>,
    plots: PlotService,
    carbon: CarbonService,
}

impl WorkflowService {
    /// Create a new WorkflowService instance
    pub fn new(store: Arc<PlotStore>, plots: PlotService, carbon: CarbonService) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            store,
            plots,
            carbon,
        }
    }

    /// Current session view
    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.state.read().await;
        WorkflowSnapshot {
            step: state.step,
            mode: state.mode,
            active_plot: state.active_plot.clone(),
            selection: state.selection.clone(),
            confirmed: state.confirmed.iter().cloned().collect(),
            origin: state.origin,
            save_in_flight: state.save_in_flight,
            last_saved_summary: state.last_saved_summary.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Geometry acquisition
    // ------------------------------------------------------------------

    /// Enter drawing mode for a new plot.
    ///
    /// Also reachable from Configure and Review so a user can accumulate
    /// several pending plots before calculating.
    pub async fn begin_drawing(&self) -> AppResult<WorkflowSnapshot> {
        {
            let mut state = self.state.write().await;
            require_step(
                &state,
                &[
                    WorkflowStep::Start,
                    WorkflowStep::Saved,
                    WorkflowStep::Configure,
                    WorkflowStep::Review,
                ],
                "begin drawing",
            )?;
            state.step = WorkflowStep::Drawing;
            state.mode.get_or_insert(AcquisitionMode::Draw);
            state.active_plot = None;
        }
        Ok(self.snapshot().await)
    }

    /// Re-enter drawing mode to replace an existing draft's polygon
    pub async fn begin_redraw(&self, plot_id: PlotId) -> AppResult<WorkflowSnapshot> {
        let plot = self.store.get(&plot_id).await?;
        if plot.is_saved {
            return Err(AppError::Validation {
                field: "plot_id".to_string(),
                message: "Saved plots cannot be redrawn".to_string(),
                message_th: "แปลงที่บันทึกแล้วไม่สามารถวาดใหม่ได้".to_string(),
            });
        }

        {
            let mut state = self.state.write().await;
            require_step(
                &state,
                &[
                    WorkflowStep::Configure,
                    WorkflowStep::Review,
                    WorkflowStep::ConfirmBatch,
                ],
                "redraw a plot",
            )?;
            state.step = WorkflowStep::Drawing;
            state.active_plot = Some(plot_id);
        }
        Ok(self.snapshot().await)
    }

    /// A polygon arrived from the drawing tool.
    ///
    /// Creates a draft for a fresh drawing, or mutates the active draft in
    /// place when the session is editing an existing plot; either way the
    /// session moves on to configuration.
    pub async fn capture_geometry(&self, feature: DrawnFeature) -> AppResult<Plot> {
        let editing = {
            let state = self.state.read().await;
            require_step(&state, &[WorkflowStep::Drawing], "capture geometry")?;
            state.active_plot.clone()
        };

        let plot = match editing {
            Some(id) => self.plots.update_geometry(&id, feature).await?,
            None => self.plots.create_from_drawing(feature).await?,
        };

        let mut state = self.state.write().await;
        state.active_plot = Some(plot.id.clone());
        state.step = WorkflowStep::Configure;
        Ok(plot)
    }

    /// Enter shapefile-import mode
    pub async fn begin_import(&self) -> AppResult<WorkflowSnapshot> {
        {
            let mut state = self.state.write().await;
            require_step(
                &state,
                &[WorkflowStep::Start, WorkflowStep::Saved],
                "begin import",
            )?;
            state.step = WorkflowStep::ImportReview;
            state.mode = Some(AcquisitionMode::Import);
        }
        Ok(self.snapshot().await)
    }

    /// Decoded shapefile features arrived from the import collaborator.
    ///
    /// On a decode failure the caller reports `ImportParse` and the session
    /// stays in ImportReview for another attempt.
    pub async fn accept_import(&self, features: Vec<ImportedFeature>) -> AppResult<Vec<Plot>> {
        {
            let state = self.state.read().await;
            require_step(&state, &[WorkflowStep::ImportReview], "accept import")?;
        }

        let plots = self.plots.import_features(features).await?;

        let mut state = self.state.write().await;
        state.step = WorkflowStep::Configure;
        state.selection.clear();
        Ok(plots)
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Replace the current selection, deduplicated in the order given
    pub async fn select_plots(&self, ids: Vec<PlotId>) -> AppResult<WorkflowSnapshot> {
        let mut deduped: Vec<PlotId> = Vec::with_capacity(ids.len());
        for id in ids {
            let plot = self.store.get(&id).await?;
            if plot.is_saved {
                return Err(AppError::Validation {
                    field: "ids".to_string(),
                    message: format!("Plot {} is already saved", id),
                    message_th: "ไม่สามารถเลือกแปลงที่บันทึกแล้วได้".to_string(),
                });
            }
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }

        {
            let mut state = self.state.write().await;
            require_step(&state, &[WorkflowStep::Configure], "select plots")?;
            state.selection = deduped;
        }
        Ok(self.snapshot().await)
    }

    /// Batch apply-and-move: apply shared attributes to every selected plot,
    /// then move the selection into the confirmed set and clear it.
    ///
    /// Attributes are applied to each plot before the move happens. Supplying
    /// a method re-triggers calculation for the affected plots.
    pub async fn apply_to_selection(&self, attrs: BatchAttributes) -> AppResult<Vec<Plot>> {
        let selection = {
            let state = self.state.read().await;
            require_step(&state, &[WorkflowStep::Configure], "apply attributes")?;
            if state.selection.is_empty() {
                return Err(AppError::Validation {
                    field: "selection".to_string(),
                    message: "No plots selected".to_string(),
                    message_th: "กรุณาเลือกแปลงที่ต้องการตั้งค่า".to_string(),
                });
            }
            state.selection.clone()
        };

        let input = UpdatePlotInput {
            planting_year_be: attrs.planting_year_be,
            age_years: attrs.age_years,
            variety: attrs.variety.clone(),
            method: attrs.method,
            ..UpdatePlotInput::default()
        };
        let mut updated = Vec::with_capacity(selection.len());
        for id in &selection {
            updated.push(self.plots.update_attributes(id, input.clone()).await?);
        }

        // Method changes recompute immediately; plots still missing an age
        // keep a null carbon value
        if attrs.method.is_some() {
            updated = self.carbon.bulk_calculate(&selection, None).await?;
        }

        {
            let mut state = self.state.write().await;
            for id in &selection {
                state.confirmed.insert(id.clone());
            }
            state.selection.clear();
        }

        // Confirmation is also recorded on the plots themselves
        for plot in updated.iter_mut() {
            *plot = self
                .store
                .update(&plot.id, |p| p.is_confirmed = true)
                .await?;
        }

        Ok(updated)
    }

    /// Update one plot's attributes during configuration.
    ///
    /// Changing the calculation method recomputes carbon for every pending
    /// plot; this is the workflow's only implicit recomputation point.
    pub async fn update_plot(&self, id: &PlotId, input: UpdatePlotInput) -> AppResult<Plot> {
        {
            let state = self.state.read().await;
            require_step(
                &state,
                &[WorkflowStep::Configure, WorkflowStep::Review],
                "update a plot",
            )?;
        }

        let previous_method = self.store.get(id).await?.method;
        let new_method = input.method;
        let plot = self.plots.update_attributes(id, input).await?;

        if let Some(method) = new_method {
            if previous_method != Some(method) {
                let pending: Vec<PlotId> = self
                    .store
                    .drafts()
                    .await
                    .into_iter()
                    .map(|p| p.id)
                    .collect();
                self.carbon.bulk_calculate(&pending, None).await?;
                return self.store.get(&plot.id).await;
            }
        }

        Ok(plot)
    }

    // ------------------------------------------------------------------
    // Calculation and review
    // ------------------------------------------------------------------

    /// Run the estimator over the batch and move to the results view.
    ///
    /// The batch is the confirmed set when one exists (import flow), or every
    /// pending draft (manual flow). A plot with missing inputs blocks the
    /// transition; nothing is written for it.
    pub async fn calculate(&self) -> AppResult<Vec<Plot>> {
        let ids = {
            let mut state = self.state.write().await;
            require_step(
                &state,
                &[WorkflowStep::Configure, WorkflowStep::Review],
                "calculate",
            )?;
            state.step = WorkflowStep::Calculate;
            self.batch_ids(&state).await
        };

        if ids.is_empty() {
            let mut state = self.state.write().await;
            state.step = WorkflowStep::Configure;
            return Err(AppError::GeometryUnavailable(
                "No pending plots to calculate".to_string(),
            ));
        }

        let mut results = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.carbon.calculate_plot(id).await {
                Ok(plot) => results.push(plot),
                Err(error) => {
                    // Block the transition; the store keeps null carbon for
                    // the failing plot
                    let mut state = self.state.write().await;
                    state.step = WorkflowStep::Configure;
                    return Err(error);
                }
            }
        }

        let mut state = self.state.write().await;
        state.step = WorkflowStep::Review;
        Ok(results)
    }

    /// Move from the results view to the pre-save summary
    pub async fn confirm_batch(&self) -> AppResult<BatchSummary> {
        let ids = {
            let mut state = self.state.write().await;
            require_step(&state, &[WorkflowStep::Review], "confirm batch")?;
            state.step = WorkflowStep::ConfirmBatch;
            self.batch_ids(&state).await
        };

        let mut plots = Vec::with_capacity(ids.len());
        for id in &ids {
            plots.push(self.store.get(id).await?);
        }
        Ok(batch::summarize(&plots))
    }

    /// Pull one plot back into configuration, remembering where to return
    pub async fn recall_for_edit(&self, plot_id: PlotId) -> AppResult<EditRecall> {
        self.store.get(&plot_id).await?;

        let mut state = self.state.write().await;
        require_step(
            &state,
            &[WorkflowStep::ConfirmBatch, WorkflowStep::Review],
            "recall a plot for editing",
        )?;
        let recall = batch::recall_for_edit(plot_id.clone(), state.step);
        state.origin = Some(recall.origin);
        state.active_plot = Some(plot_id);
        state.step = WorkflowStep::Configure;
        Ok(recall)
    }

    /// Finish an edit recall, returning to the recorded origin.
    ///
    /// Save and cancel differ only in whether attributes are applied; both
    /// restore the origin step.
    pub async fn complete_edit(&self, input: Option<UpdatePlotInput>) -> AppResult<WorkflowSnapshot> {
        let (plot_id, origin) = {
            let state = self.state.read().await;
            require_step(&state, &[WorkflowStep::Configure], "complete an edit")?;
            let origin = state.origin.ok_or_else(|| {
                AppError::InvalidStateTransition(
                    "no edit recall is in progress".to_string(),
                )
            })?;
            (state.active_plot.clone(), origin)
        };

        if let (Some(id), Some(input)) = (plot_id, input) {
            self.update_plot(&id, input).await?;
        }

        let mut state = self.state.write().await;
        state.step = origin;
        state.origin = None;
        state.active_plot = None;
        drop(state);
        Ok(self.snapshot().await)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist the batch: totals are snapshotted at the moment of save, draft
    /// ids are re-namespaced and the plots become immutable.
    ///
    /// While a save is in flight a second one is rejected. On failure the
    /// session stays in ConfirmBatch so the user can retry without losing
    /// anything.
    pub async fn save_all(&self) -> AppResult<BatchSummary> {
        let ids = {
            let mut state = self.state.write().await;
            require_step(&state, &[WorkflowStep::ConfirmBatch], "save")?;
            if state.save_in_flight {
                return Err(AppError::SaveInProgress);
            }
            let ids = self.batch_ids(&state).await;
            if ids.is_empty() {
                return Err(AppError::Validation {
                    field: "plots".to_string(),
                    message: "There are no plots to save".to_string(),
                    message_th: "ไม่มีแปลงที่จะบันทึก".to_string(),
                });
            }
            state.save_in_flight = true;
            ids
        };

        let saved = match self.store.mark_saved(&ids).await {
            Ok(saved) => saved,
            Err(error) => {
                let mut state = self.state.write().await;
                state.save_in_flight = false;
                return Err(error);
            }
        };

        let summary = batch::summarize(&saved);
        tracing::info!(
            "Saved {} plots, {:.2} rai, {:.2} tCO2e",
            summary.count,
            summary.total_area_rai,
            summary.total_carbon_tons
        );

        let mut state = self.state.write().await;
        state.save_in_flight = false;
        state.step = WorkflowStep::Saved;
        state.selection.clear();
        state.confirmed.clear();
        state.origin = None;
        state.active_plot = None;
        state.last_saved_summary = Some(summary.clone());
        Ok(summary)
    }

    /// Abort the workflow: discard every unsaved plot, clear all selections
    /// and return to the landing view. Saved plots are untouched.
    pub async fn reset(&self) -> AppResult<WorkflowSnapshot> {
        let discarded = self.store.discard_drafts().await;
        tracing::debug!("Workflow reset discarded {} draft plots", discarded);

        let mut state = self.state.write().await;
        *state = SessionState::default();
        drop(state);
        Ok(self.snapshot().await)
    }

    /// The ids the current batch operates on: the confirmed set when one
    /// exists, otherwise every pending draft
    async fn batch_ids(&self, state: &SessionState) -> Vec<PlotId> {
        if state.confirmed.is_empty() {
            self.store
                .drafts()
                .await
                .into_iter()
                .map(|p| p.id)
                .collect()
        } else {
            state.confirmed.iter().cloned().collect()
        }
    }
}

fn require_step(state: &SessionState, allowed: &[WorkflowStep], action: &str) -> AppResult<()> {
    if allowed.contains(&state.step) {
        Ok(())
    } else {
        Err(AppError::InvalidStateTransition(format!(
            "cannot {} from step {}",
            action, state.step
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{EstimationParams, Geometry};

    fn workflow() -> WorkflowService {
        let store = Arc::new(PlotStore::new());
        let plots = PlotService::new(store.clone());
        let carbon = CarbonService::new(store.clone(), EstimationParams::default());
        WorkflowService::new(store, plots, carbon)
    }

    fn square(area_rai: f64) -> DrawnFeature {
        DrawnFeature {
            name: None,
            geometry: Geometry::Polygon {
                coordinates: vec![vec![
                    [99.0, 8.0],
                    [99.01, 8.0],
                    [99.01, 8.01],
                    [99.0, 8.01],
                    [99.0, 8.0],
                ]],
            },
            area_sqm: area_rai * 1600.0,
        }
    }

    fn imported(count: usize, area_rai: f64) -> Vec<ImportedFeature> {
        (0..count)
            .map(|i| ImportedFeature {
                name: Some(format!("แปลงนำเข้า {}", i + 1)),
                farmer_name: Some("สมหญิง รักษ์ยาง".to_string()),
                geometry: square(area_rai).geometry,
                area_sqm: area_rai * 1600.0,
            })
            .collect()
    }

    fn configured(planting_year_be: i32) -> UpdatePlotInput {
        UpdatePlotInput {
            farmer_name: Some("สมชาย ใจดี".to_string()),
            planting_year_be: Some(planting_year_be),
            variety: Some(RubberVariety::Rrim600),
            method: Some(CalculationMethod::Eq1),
            dbh_cm: Some(20.0),
            ..UpdatePlotInput::default()
        }
    }

    #[tokio::test]
    async fn manual_flow_end_to_end() {
        let wf = workflow();

        wf.begin_drawing().await.unwrap();
        assert_eq!(wf.snapshot().await.step, WorkflowStep::Drawing);

        let plot = wf.capture_geometry(square(10.0)).await.unwrap();
        assert!(plot.id.is_draft());
        assert!((plot.area_rai - 10.0).abs() < 1e-9);
        assert_eq!(wf.snapshot().await.step, WorkflowStep::Configure);

        let plot = wf.update_plot(&plot.id, configured(2560)).await.unwrap();
        // Setting a method recomputes immediately
        let carbon = plot.carbon_tons.expect("carbon computed on method change");
        let expected = 0.118 * 20.0f64.powf(2.53) * 700.0 / 1000.0;
        assert!((carbon - expected).abs() < 1e-9);

        wf.calculate().await.unwrap();
        assert_eq!(wf.snapshot().await.step, WorkflowStep::Review);

        let summary = wf.confirm_batch().await.unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(wf.snapshot().await.step, WorkflowStep::ConfirmBatch);

        let saved_summary = wf.save_all().await.unwrap();
        assert_eq!(saved_summary.count, 1);
        assert!((saved_summary.total_area_rai - 10.0).abs() < 1e-9);
        assert!((saved_summary.total_carbon_tons - carbon).abs() < 1e-9);

        let snapshot = wf.snapshot().await;
        assert_eq!(snapshot.step, WorkflowStep::Saved);
        assert_eq!(snapshot.last_saved_summary, Some(saved_summary));

        let saved = wf.store.saved().await;
        assert_eq!(saved.len(), 1);
        assert!(saved[0].id.is_persisted());
        assert!(saved[0].is_saved);
    }

    #[tokio::test]
    async fn drawing_accumulates_pending_plots() {
        let wf = workflow();

        wf.begin_drawing().await.unwrap();
        let first = wf.capture_geometry(square(2.0)).await.unwrap();

        // Another drawing round before any calculation
        wf.begin_drawing().await.unwrap();
        let second = wf.capture_geometry(square(3.0)).await.unwrap();
        assert_ne!(first.id, second.id);

        wf.update_plot(&first.id, configured(2558)).await.unwrap();
        wf.update_plot(&second.id, configured(2562)).await.unwrap();

        let results = wf.calculate().await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|p| p.carbon_tons.is_some()));
        assert_eq!(wf.snapshot().await.step, WorkflowStep::Review);
    }

    #[tokio::test]
    async fn capture_requires_drawing_step() {
        let wf = workflow();
        let result = wf.capture_geometry(square(1.0)).await;
        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
    }

    #[tokio::test]
    async fn redraw_mutates_draft_in_place() {
        let wf = workflow();
        wf.begin_drawing().await.unwrap();
        let plot = wf.capture_geometry(square(4.0)).await.unwrap();
        wf.update_plot(&plot.id, configured(2560)).await.unwrap();

        wf.begin_redraw(plot.id.clone()).await.unwrap();
        let redrawn = wf.capture_geometry(square(6.0)).await.unwrap();

        assert_eq!(redrawn.id, plot.id);
        assert!((redrawn.area_rai - 6.0).abs() < 1e-9);
        // Stale result cleared until the next calculation
        assert!(redrawn.carbon_tons.is_none());
        assert_eq!(wf.store.drafts().await.len(), 1);
    }

    #[tokio::test]
    async fn import_batch_apply_and_move() {
        let wf = workflow();

        wf.begin_import().await.unwrap();
        assert_eq!(wf.snapshot().await.step, WorkflowStep::ImportReview);

        let plots = wf.accept_import(imported(3, 2.0)).await.unwrap();
        assert_eq!(plots.len(), 3);
        assert_eq!(wf.snapshot().await.step, WorkflowStep::Configure);

        let attrs = BatchAttributes {
            planting_year_be: Some(2560),
            age_years: None,
            variety: Some(RubberVariety::Rrit251),
            method: Some(CalculationMethod::Eq1),
        };

        // First round: two plots move from selection to confirmed
        wf.select_plots(vec![plots[0].id.clone(), plots[1].id.clone()])
            .await
            .unwrap();
        let applied = wf.apply_to_selection(attrs.clone()).await.unwrap();
        assert!(applied.iter().all(|p| p.is_confirmed));
        assert!(applied.iter().all(|p| p.carbon_tons.is_some()));

        let snapshot = wf.snapshot().await;
        assert_eq!(snapshot.confirmed.len(), 2);
        assert!(snapshot.selection.is_empty());

        // Second round adds the remaining plot; the confirmed set is a union
        wf.select_plots(vec![plots[2].id.clone()]).await.unwrap();
        wf.apply_to_selection(attrs).await.unwrap();
        let snapshot = wf.snapshot().await;
        assert_eq!(snapshot.confirmed.len(), 3);
        assert!(snapshot.selection.is_empty());

        wf.calculate().await.unwrap();
        let summary = wf.confirm_batch().await.unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.total_area_rai - 6.0).abs() < 1e-9);

        let saved_summary = wf.save_all().await.unwrap();
        assert_eq!(saved_summary.count, 3);
        assert_eq!(wf.store.saved().await.len(), 3);
    }

    #[tokio::test]
    async fn apply_requires_a_selection() {
        let wf = workflow();
        wf.begin_import().await.unwrap();
        wf.accept_import(imported(1, 1.0)).await.unwrap();

        let result = wf.apply_to_selection(BatchAttributes::default()).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn recall_for_edit_returns_to_confirm_batch() {
        let wf = workflow();
        wf.begin_drawing().await.unwrap();
        let plot = wf.capture_geometry(square(3.0)).await.unwrap();
        wf.update_plot(&plot.id, configured(2560)).await.unwrap();
        wf.calculate().await.unwrap();
        wf.confirm_batch().await.unwrap();

        let recall = wf.recall_for_edit(plot.id.clone()).await.unwrap();
        assert_eq!(recall.origin, WorkflowStep::ConfirmBatch);
        assert_eq!(wf.snapshot().await.step, WorkflowStep::Configure);

        // Saving the edit lands back on the pre-save summary, not Start
        let edit = UpdatePlotInput {
            dbh_cm: Some(25.0),
            ..UpdatePlotInput::default()
        };
        let snapshot = wf.complete_edit(Some(edit)).await.unwrap();
        assert_eq!(snapshot.step, WorkflowStep::ConfirmBatch);
        assert_eq!(snapshot.origin, None);

        // Cancelling behaves the same way
        wf.recall_for_edit(plot.id.clone()).await.unwrap();
        let snapshot = wf.complete_edit(None).await.unwrap();
        assert_eq!(snapshot.step, WorkflowStep::ConfirmBatch);
    }

    #[tokio::test]
    async fn calculate_blocks_on_missing_method() {
        let wf = workflow();
        wf.begin_drawing().await.unwrap();
        let plot = wf.capture_geometry(square(2.0)).await.unwrap();
        let input = UpdatePlotInput {
            farmer_name: Some("สมชาย ใจดี".to_string()),
            planting_year_be: Some(2560),
            ..UpdatePlotInput::default()
        };
        wf.update_plot(&plot.id, input).await.unwrap();

        let result = wf.calculate().await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
        // The transition was blocked and nothing was written
        assert_eq!(wf.snapshot().await.step, WorkflowStep::Configure);
        assert!(wf.store.get(&plot.id).await.unwrap().carbon_tons.is_none());
    }

    #[tokio::test]
    async fn reset_discards_drafts_and_keeps_saved_plots() {
        let wf = workflow();

        // Save one plot first
        wf.begin_drawing().await.unwrap();
        let plot = wf.capture_geometry(square(1.5)).await.unwrap();
        wf.update_plot(&plot.id, configured(2560)).await.unwrap();
        wf.calculate().await.unwrap();
        wf.confirm_batch().await.unwrap();
        wf.save_all().await.unwrap();

        // Begin another round and abort it mid-way
        wf.begin_drawing().await.unwrap();
        wf.capture_geometry(square(2.5)).await.unwrap();

        let snapshot = wf.reset().await.unwrap();
        assert_eq!(snapshot.step, WorkflowStep::Start);
        assert!(snapshot.selection.is_empty());
        assert!(snapshot.confirmed.is_empty());
        assert!(snapshot.last_saved_summary.is_none());

        let remaining = wf.store.list().await;
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].is_saved);
    }

    #[tokio::test]
    async fn failed_save_stays_in_confirm_batch() {
        let wf = workflow();
        wf.begin_import().await.unwrap();
        let plots = wf.accept_import(imported(2, 1.0)).await.unwrap();

        let attrs = BatchAttributes {
            planting_year_be: Some(2560),
            age_years: None,
            variety: None,
            method: Some(CalculationMethod::Eq2),
        };
        wf.select_plots(plots.iter().map(|p| p.id.clone()).collect())
            .await
            .unwrap();
        wf.apply_to_selection(attrs).await.unwrap();
        wf.calculate().await.unwrap();
        wf.confirm_batch().await.unwrap();

        // One confirmed plot vanishes behind the workflow's back
        wf.store.remove(&plots[0].id).await.unwrap();

        let result = wf.save_all().await;
        assert!(matches!(result, Err(AppError::Persistence(_))));

        let snapshot = wf.snapshot().await;
        assert_eq!(snapshot.step, WorkflowStep::ConfirmBatch);
        assert!(!snapshot.save_in_flight);
        // The surviving plot was not partially saved
        assert!(wf.store.saved().await.is_empty());
    }
}
