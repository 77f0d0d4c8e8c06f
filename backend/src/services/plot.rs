//! Plot management service for parcel registration and attribute entry

use std::sync::Arc;

use serde::Deserialize;

use shared::{
    age_from_planting_year, area_rai_from_sqm, current_buddhist_year, validate_dbh_cm,
    validate_planting_year_be, CalculationMethod, Geometry, Plot, PlotId, PlotSource,
    RubberVariety,
};

use crate::error::{AppError, AppResult};
use crate::store::PlotStore;

/// Plot service for managing drafts and their attributes
#[derive(Clone)]
pub struct PlotService {
    store: Arc<PlotStore>,
}

/// A polygon captured from the interactive drawing tool
#[derive(Debug, Clone, Deserialize)]
pub struct DrawnFeature {
    pub name: Option<String>,
    pub geometry: Geometry,
    /// Raw area computed by the drawing tool, m²
    pub area_sqm: f64,
}

/// A feature decoded from a shapefile by the import collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct ImportedFeature {
    pub name: Option<String>,
    pub farmer_name: Option<String>,
    pub geometry: Geometry,
    pub area_sqm: f64,
}

/// Input for updating a plot's user-supplied attributes.
///
/// Area is deliberately absent: it is always derived from geometry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlotInput {
    pub name: Option<String>,
    pub farmer_name: Option<String>,
    pub planting_year_be: Option<i32>,
    pub age_years: Option<u32>,
    pub variety: Option<RubberVariety>,
    pub method: Option<CalculationMethod>,
    pub dbh_cm: Option<f64>,
    pub height_m: Option<f64>,
}

impl PlotService {
    /// Create a new PlotService instance
    pub fn new(store: Arc<PlotStore>) -> Self {
        Self { store }
    }

    /// Register a draft plot from a hand-drawn polygon
    pub async fn create_from_drawing(&self, feature: DrawnFeature) -> AppResult<Plot> {
        let area_rai = area_rai_from_sqm(feature.area_sqm);
        if area_rai <= 0.0 {
            return Err(AppError::GeometryUnavailable(
                "Drawn polygon has no area".to_string(),
            ));
        }

        let name = match feature.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.next_default_name().await,
        };

        let plot = Plot::draft(name, Some(feature.geometry), area_rai, PlotSource::Manual);
        Ok(self.store.insert(plot).await)
    }

    /// Register a batch of draft plots from decoded shapefile features
    pub async fn import_features(&self, features: Vec<ImportedFeature>) -> AppResult<Vec<Plot>> {
        if features.is_empty() {
            return Err(AppError::ImportParse(
                "Import contained no polygon features".to_string(),
            ));
        }

        let mut plots = Vec::with_capacity(features.len());
        for (index, feature) in features.into_iter().enumerate() {
            if feature.geometry.exterior_ring().is_none() {
                return Err(AppError::ImportParse(format!(
                    "Feature {} has no exterior ring",
                    index + 1
                )));
            }

            let name = feature
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("แปลงที่ {}", index + 1));

            let mut plot = Plot::draft(
                name,
                Some(feature.geometry),
                area_rai_from_sqm(feature.area_sqm),
                PlotSource::Shp,
            );
            if let Some(farmer) = feature.farmer_name.filter(|f| !f.trim().is_empty()) {
                plot.farmer_name = farmer;
            }
            plots.push(self.store.insert(plot).await);
        }

        Ok(plots)
    }

    /// Replace an existing draft's geometry in place.
    ///
    /// The plot keeps its id; area and centroid are re-derived from the new
    /// polygon.
    pub async fn update_geometry(&self, id: &PlotId, feature: DrawnFeature) -> AppResult<Plot> {
        let area_rai = area_rai_from_sqm(feature.area_sqm);
        if area_rai <= 0.0 {
            return Err(AppError::GeometryUnavailable(
                "Drawn polygon has no area".to_string(),
            ));
        }

        self.store
            .update(id, |plot| {
                plot.center = feature.geometry.centroid();
                plot.geometry = Some(feature.geometry);
                plot.area_rai = area_rai;
                // Stale until the next calculation runs
                plot.carbon_tons = None;
            })
            .await
    }

    /// Apply user-supplied attributes to a draft
    pub async fn update_attributes(&self, id: &PlotId, input: UpdatePlotInput) -> AppResult<Plot> {
        self.validate_attributes(&input)?;

        let derived_age = input
            .planting_year_be
            .map(|year| age_from_planting_year(year, current_buddhist_year()));

        self.store
            .update(id, |plot| {
                if let Some(name) = input.name {
                    plot.name = name;
                }
                if let Some(farmer_name) = input.farmer_name {
                    plot.farmer_name = farmer_name;
                }
                if let Some(year) = input.planting_year_be {
                    plot.planting_year_be = Some(year);
                }
                // Planting year wins over an explicit age when both arrive
                if let Some(age) = derived_age.or(input.age_years) {
                    plot.age_years = Some(age);
                }
                if let Some(variety) = input.variety {
                    plot.variety = variety;
                }
                if let Some(method) = input.method {
                    plot.method = Some(method);
                }
                if let Some(dbh) = input.dbh_cm {
                    plot.dbh_cm = Some(dbh);
                }
                if let Some(height) = input.height_m {
                    plot.height_m = Some(height);
                }
            })
            .await
    }

    pub async fn get(&self, id: &PlotId) -> AppResult<Plot> {
        self.store.get(id).await
    }

    pub async fn list(&self) -> Vec<Plot> {
        self.store.list().await
    }

    pub async fn delete(&self, id: &PlotId) -> AppResult<()> {
        self.store.remove(id).await
    }

    fn validate_attributes(&self, input: &UpdatePlotInput) -> AppResult<()> {
        if let Some(ref name) = input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Plot name cannot be empty".to_string(),
                    message_th: "ชื่อแปลงไม่สามารถว่างได้".to_string(),
                });
            }
        }

        if let Some(ref farmer_name) = input.farmer_name {
            if farmer_name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "farmer_name".to_string(),
                    message: "Farmer name cannot be empty".to_string(),
                    message_th: "กรุณาระบุชื่อเกษตรกร".to_string(),
                });
            }
        }

        if let Some(year) = input.planting_year_be {
            if let Err(message) = validate_planting_year_be(year, current_buddhist_year()) {
                return Err(AppError::Validation {
                    field: "planting_year_be".to_string(),
                    message: message.to_string(),
                    message_th: "ปีที่ปลูก (พ.ศ.) ไม่ถูกต้อง".to_string(),
                });
            }
        }

        if let Some(dbh) = input.dbh_cm {
            if let Err(message) = validate_dbh_cm(dbh) {
                return Err(AppError::Validation {
                    field: "dbh_cm".to_string(),
                    message: message.to_string(),
                    message_th: "เส้นผ่านศูนย์กลาง (ซม.) ไม่ถูกต้อง".to_string(),
                });
            }
        }

        Ok(())
    }

    async fn next_default_name(&self) -> String {
        let count = self.store.list().await.len();
        format!("แปลงที่ {}", count + 1)
    }
}
