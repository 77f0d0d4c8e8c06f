//! Carbon estimation service
//!
//! Wraps the pure estimation models with store access: building inputs from a
//! plot's attributes, writing results back, and aggregating saved plots. A
//! failed estimate never writes a value; `carbon_tons` stays null.

use std::sync::Arc;

use serde::Serialize;

use shared::{
    estimate, quick_estimate, CalculationMethod, CarbonEstimate, EstimateInput, EstimationParams,
    Plot, PlotId, QuickEstimate,
};

use crate::error::{AppError, AppResult};
use crate::store::PlotStore;

/// Carbon estimation over stored plots
#[derive(Clone)]
pub struct CarbonService {
    store: Arc<PlotStore>,
    params: EstimationParams,
}

/// Aggregate figures over all saved plots
#[derive(Debug, Serialize)]
pub struct CarbonSummary {
    pub total_plots: usize,
    pub total_area_rai: f64,
    pub total_carbon_tons: f64,
    pub average_carbon_per_rai: f64,
}

impl CarbonService {
    /// Create a new CarbonService instance
    pub fn new(store: Arc<PlotStore>, params: EstimationParams) -> Self {
        Self { store, params }
    }

    /// Build an estimate for a plot without touching the store.
    ///
    /// Fails when the attributes the models require are still missing; the
    /// estimator itself never fails once its inputs exist.
    pub fn estimate_for_plot(&self, plot: &Plot) -> AppResult<CarbonEstimate> {
        let method = plot.method.ok_or_else(|| AppError::Validation {
            field: "method".to_string(),
            message: "No calculation method selected".to_string(),
            message_th: "กรุณาเลือกวิธีคำนวณ".to_string(),
        })?;

        if plot.area_rai <= 0.0 {
            return Err(AppError::GeometryUnavailable(format!(
                "Plot {} has no area to estimate",
                plot.id
            )));
        }

        let age_years = plot.age_years.ok_or_else(|| AppError::Validation {
            field: "age_years".to_string(),
            message: "Stand age is required".to_string(),
            message_th: "กรุณาระบุปีที่ปลูกหรืออายุต้นยาง".to_string(),
        })?;

        let input = EstimateInput {
            method,
            area_rai: plot.area_rai,
            age_years: age_years as i32,
            dbh_cm: plot.dbh_cm,
            height_m: plot.height_m,
            // Imagery readings come from the remote-sensing boundary; absent
            // here, so the estimator substitutes its reference defaults
            ndvi: None,
            tcari: None,
        };

        Ok(estimate(&input, &self.params))
    }

    /// Run the estimator for one plot and write the result back
    pub async fn calculate_plot(&self, id: &PlotId) -> AppResult<Plot> {
        let plot = self.store.get(id).await?;
        let result = self.estimate_for_plot(&plot)?;

        self.store
            .update(id, |plot| {
                plot.carbon_tons = Some(result.carbon_tons);
            })
            .await
    }

    /// Recompute carbon for a batch of plots, optionally forcing a method.
    ///
    /// Plots that are not yet ready (no method or age) are skipped and keep a
    /// null carbon value rather than failing the batch.
    pub async fn bulk_calculate(
        &self,
        ids: &[PlotId],
        method_override: Option<CalculationMethod>,
    ) -> AppResult<Vec<Plot>> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(method) = method_override {
                self.store
                    .update(id, |plot| plot.method = Some(method))
                    .await?;
            }

            let plot = self.store.get(id).await?;
            match self.estimate_for_plot(&plot) {
                Ok(result) => {
                    let updated = self
                        .store
                        .update(id, |plot| plot.carbon_tons = Some(result.carbon_tons))
                        .await?;
                    results.push(updated);
                }
                Err(error) => {
                    tracing::debug!("Skipping plot {} in bulk calculation: {}", id, error);
                    results.push(plot);
                }
            }
        }
        Ok(results)
    }

    /// Trial calculator: age and area alone
    pub fn quick(&self, age_years: i32, area_rai: f64) -> QuickEstimate {
        quick_estimate(age_years, area_rai)
    }

    /// Totals over all saved plots
    pub async fn summary(&self) -> CarbonSummary {
        let saved = self.store.saved().await;
        let total_area_rai: f64 = saved.iter().map(|p| p.area_rai).sum();
        let total_carbon_tons: f64 = saved.iter().filter_map(|p| p.carbon_tons).sum();
        let average_carbon_per_rai = if total_area_rai > 0.0 {
            total_carbon_tons / total_area_rai
        } else {
            0.0
        };

        CarbonSummary {
            total_plots: saved.len(),
            total_area_rai,
            total_carbon_tons,
            average_carbon_per_rai,
        }
    }
}
