//! Rubber plot models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CalculationMethod, Geometry};
use crate::types::GpsCoordinates;

/// Identifier for a plot, namespaced by lifecycle stage.
///
/// Drafts carry a `temp-` prefix; the `plot-` prefix is issued only when a
/// batch is saved. The namespaces are disjoint, so a saved plot can never be
/// confused with a draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotId(String);

impl PlotId {
    const DRAFT_PREFIX: &'static str = "temp-";
    const PERSISTED_PREFIX: &'static str = "plot-";

    /// Mint a fresh draft id
    pub fn draft() -> Self {
        Self(format!("{}{}", Self::DRAFT_PREFIX, Uuid::new_v4()))
    }

    /// Mint a fresh persisted id
    pub fn persisted() -> Self {
        Self(format!("{}{}", Self::PERSISTED_PREFIX, Uuid::new_v4()))
    }

    pub fn is_draft(&self) -> bool {
        self.0.starts_with(Self::DRAFT_PREFIX)
    }

    pub fn is_persisted(&self) -> bool {
        self.0.starts_with(Self::PERSISTED_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlotId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// How a plot's geometry entered the system
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlotSource {
    /// Hand-drawn polygon
    Manual,
    /// Imported from a shapefile
    Shp,
}

/// Rubber cultivars commonly planted in Thailand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RubberVariety {
    Rrim600,
    Pb235,
    Rrit251,
    /// Custom cultivar with name
    Custom(String),
    #[default]
    Unspecified,
}

impl std::fmt::Display for RubberVariety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RubberVariety::Rrim600 => write!(f, "RRIM 600"),
            RubberVariety::Pb235 => write!(f, "PB 235"),
            RubberVariety::Rrit251 => write!(f, "RRIT 251"),
            RubberVariety::Custom(name) => write!(f, "{}", name),
            RubberVariety::Unspecified => write!(f, "ไม่ระบุ"),
        }
    }
}

/// A land parcel under carbon assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plot {
    pub id: PlotId,
    pub name: String,
    pub farmer_name: String,
    pub geometry: Option<Geometry>,
    /// Area in rai, derived from geometry at creation time and never edited
    /// independently
    pub area_rai: f64,
    /// Planting year, Buddhist calendar
    pub planting_year_be: Option<i32>,
    /// Stand age in years, derived from the planting year or set explicitly
    pub age_years: Option<u32>,
    pub variety: RubberVariety,
    pub method: Option<CalculationMethod>,
    /// Field measurement of diameter at breast height, cm
    pub dbh_cm: Option<f64>,
    /// Field measurement of tree height, m
    pub height_m: Option<f64>,
    /// Tons CO₂-equivalent; `None` until a calculation has run
    pub carbon_tons: Option<f64>,
    /// Centroid for display
    pub center: Option<GpsCoordinates>,
    pub source: PlotSource,
    pub is_saved: bool,
    /// Batch flows only: the plot passed the per-batch configuration step
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plot {
    /// A new draft plot from a geometry handle and its pre-computed area
    pub fn draft(
        name: String,
        geometry: Option<Geometry>,
        area_rai: f64,
        source: PlotSource,
    ) -> Self {
        let now = Utc::now();
        let center = geometry.as_ref().and_then(Geometry::centroid);
        Self {
            id: PlotId::draft(),
            name,
            farmer_name: String::new(),
            geometry,
            area_rai: area_rai.max(0.0),
            planting_year_be: None,
            age_years: None,
            variety: RubberVariety::Unspecified,
            method: None,
            dbh_cm: None,
            height_m: None,
            carbon_tons: None,
            center,
            source,
            is_saved: false,
            is_confirmed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the attributes required for a carbon calculation are present
    pub fn is_ready_for_estimate(&self) -> bool {
        self.method.is_some() && self.age_years.is_some() && self.area_rai > 0.0
    }
}
