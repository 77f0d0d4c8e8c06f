//! Carbon estimation models for rubber plantations (Hevea brasiliensis)
//!
//! Two estimation paths exist: the model-table estimator used by the plot
//! workflow (allometric field equations and remote-sensing index equations),
//! and the quick per-rai estimator used by the trial calculator.

use serde::{Deserialize, Serialize};

/// Assumed planting density for rubber plantations
pub const TREES_PER_RAI: f64 = 70.0;
/// Fallback diameter at breast height when no field measurement was taken
pub const DEFAULT_DBH_CM: f64 = 20.0;
/// Fallback NDVI reading when no imagery value was supplied
pub const DEFAULT_NDVI: f64 = 0.72;
/// Fallback TCARI reading when no imagery value was supplied
pub const DEFAULT_TCARI: f64 = 0.45;
/// Carbon fraction of dry biomass
pub const CARBON_FRACTION: f64 = 0.47;
/// CO₂-equivalent per ton of carbon
pub const CO2_EQUIVALENT_FACTOR: f64 = 3.67;
/// Baseline sequestration of a mature stand, tons of carbon per rai per year,
/// used by the quick estimator before the age-efficiency curve is applied
pub const BASELINE_CARBON_PER_RAI_TONS: f64 = 2.064;

/// Above-ground-biomass equation selected for a plot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMethod {
    /// Field survey, equation 1: AGB = 0.118 × DBH^2.53
    Eq1,
    /// Field survey, equation 2 (young stands): AGB = 0.062 × DBH^2.23
    Eq2,
    /// Drone/satellite imagery: AGB = 34.2 × NDVI + 5.8
    Ndvi,
    /// Satellite imagery: AGB = 13.57 × TCARI + 7.45
    Tcari,
}

impl CalculationMethod {
    /// Thai display label, as shown on the result screen
    pub fn label_th(&self) -> &'static str {
        match self {
            CalculationMethod::Eq1 => "ภาคสนาม (สมการที่ 1)",
            CalculationMethod::Eq2 => "ภาคสนาม (สมการที่ 2)",
            CalculationMethod::Ndvi => "ดาวเทียม (NDVI)",
            CalculationMethod::Tcari => "ดาวเทียม (TCARI)",
        }
    }

    /// True for the field-survey equations that consume a DBH measurement
    pub fn is_field_method(&self) -> bool {
        matches!(self, CalculationMethod::Eq1 | CalculationMethod::Eq2)
    }
}

impl std::fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            CalculationMethod::Eq1 => "eq1",
            CalculationMethod::Eq2 => "eq2",
            CalculationMethod::Ndvi => "ndvi",
            CalculationMethod::Tcari => "tcari",
        };
        write!(f, "{}", id)
    }
}

/// Institutional method names exposed in the workflow UI, each backed by one
/// of the formula families above
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NamedMethod {
    /// Thailand Greenhouse Gas Management Organization
    Tgo,
    /// Department of Agriculture
    Doa,
    Research,
}

impl NamedMethod {
    pub fn family(&self) -> CalculationMethod {
        match self {
            NamedMethod::Tgo => CalculationMethod::Eq1,
            NamedMethod::Doa => CalculationMethod::Eq2,
            NamedMethod::Research => CalculationMethod::Ndvi,
        }
    }
}

/// Read-only reference data for the estimator, injected by the caller so the
/// estimation functions stay pure and testable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationParams {
    pub trees_per_rai: f64,
    pub default_dbh_cm: f64,
    pub default_ndvi: f64,
    pub default_tcari: f64,
}

impl Default for EstimationParams {
    fn default() -> Self {
        Self {
            trees_per_rai: TREES_PER_RAI,
            default_dbh_cm: DEFAULT_DBH_CM,
            default_ndvi: DEFAULT_NDVI,
            default_tcari: DEFAULT_TCARI,
        }
    }
}

/// Inputs for the model-table estimator
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateInput {
    pub method: CalculationMethod,
    pub area_rai: f64,
    /// Stand age in years; negative values are clamped to zero
    pub age_years: i32,
    pub dbh_cm: Option<f64>,
    pub height_m: Option<f64>,
    pub ndvi: Option<f64>,
    pub tcari: Option<f64>,
}

/// A plot-level carbon estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonEstimate {
    pub method: CalculationMethod,
    /// Above-ground biomass per tree, kg
    pub agb_per_tree_kg: f64,
    pub total_trees: f64,
    /// Plot-level result, tons CO₂-equivalent
    pub carbon_tons: f64,
    /// Set when a default DBH or index reading substituted a missing input
    pub low_confidence: bool,
}

/// Estimate plot-level carbon from the selected equation.
///
/// Never fails: missing geometric inputs fall back to the injected defaults
/// (flagged via `low_confidence`), non-finite or negative areas collapse to
/// zero, and the age input is clamped at zero.
pub fn estimate(input: &EstimateInput, params: &EstimationParams) -> CarbonEstimate {
    let area_rai = if input.area_rai.is_finite() && input.area_rai > 0.0 {
        input.area_rai
    } else {
        0.0
    };
    let (agb_per_tree_kg, low_confidence) = match input.method {
        CalculationMethod::Eq1 => {
            let (dbh, defaulted) = value_or_default(input.dbh_cm, params.default_dbh_cm);
            (0.118 * dbh.powf(2.53), defaulted)
        }
        CalculationMethod::Eq2 => {
            let (dbh, defaulted) = value_or_default(input.dbh_cm, params.default_dbh_cm);
            (0.062 * dbh.powf(2.23), defaulted)
        }
        CalculationMethod::Ndvi => {
            let (ndvi, defaulted) = value_or_default(input.ndvi, params.default_ndvi);
            (34.2 * ndvi + 5.8, defaulted)
        }
        CalculationMethod::Tcari => {
            let (tcari, defaulted) = value_or_default(input.tcari, params.default_tcari);
            (13.57 * tcari + 7.45, defaulted)
        }
    };

    let total_trees = area_rai * params.trees_per_rai;
    let carbon_tons = agb_per_tree_kg * total_trees / 1000.0;

    CarbonEstimate {
        method: input.method,
        agb_per_tree_kg,
        total_trees,
        carbon_tons,
        low_confidence,
    }
}

fn value_or_default(value: Option<f64>, default: f64) -> (f64, bool) {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => (v, false),
        _ => (default, true),
    }
}

/// Sequestration efficiency by stand age.
///
/// Young stands ramp from 0.5 to 1.0 over the first five years, mature stands
/// (5–20 years inclusive) sequester at full efficiency, and older stands
/// decline toward a floor of 0.6.
pub fn age_efficiency_multiplier(age_years: u32) -> f64 {
    let age = age_years as f64;
    if age < 5.0 {
        0.5 + (age / 5.0) * 0.5
    } else if age <= 20.0 {
        1.0
    } else {
        (1.0 - ((age - 20.0) / 30.0) * 0.4).max(0.6)
    }
}

/// Result of the trial calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickEstimate {
    pub age_years: u32,
    pub area_rai: f64,
    pub age_multiplier: f64,
    pub biomass_tons: f64,
    pub carbon_tons: f64,
    pub co2_equivalent_tons: f64,
}

/// Quick per-rai estimate from age and area alone.
///
/// The baseline per-rai factor assumes a mature stand; the age-efficiency
/// curve scales it for young and declining plantations.
pub fn quick_estimate(age_years: i32, area_rai: f64) -> QuickEstimate {
    let age = age_years.max(0) as u32;
    let area = if area_rai.is_finite() && area_rai > 0.0 {
        area_rai
    } else {
        0.0
    };

    let multiplier = age_efficiency_multiplier(age);
    let carbon_tons = BASELINE_CARBON_PER_RAI_TONS * area * multiplier;

    QuickEstimate {
        age_years: age,
        area_rai: area,
        age_multiplier: multiplier,
        biomass_tons: carbon_tons / CARBON_FRACTION,
        carbon_tons,
        co2_equivalent_tons: carbon_tons * CO2_EQUIVALENT_FACTOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EstimationParams {
        EstimationParams::default()
    }

    #[test]
    fn eq1_reference_plot() {
        // DBH 20 cm over 10 rai: AGB = 0.118 × 20^2.53 per tree, 700 trees
        let result = estimate(&EstimateInput {
            method: CalculationMethod::Eq1,
            area_rai: 10.0,
            age_years: 15,
            dbh_cm: Some(20.0),
            height_m: None,
            ndvi: None,
            tcari: None,
        }, &params());
        let expected_agb = 0.118 * 20.0f64.powf(2.53);
        assert!((result.agb_per_tree_kg - expected_agb).abs() < 1e-9);
        assert_eq!(result.total_trees, 700.0);
        assert!((result.carbon_tons - expected_agb * 700.0 / 1000.0).abs() < 1e-9);
        assert!(!result.low_confidence);
    }

    #[test]
    fn missing_dbh_defaults_and_flags() {
        let result = estimate(&EstimateInput {
            method: CalculationMethod::Eq2,
            area_rai: 1.0,
            age_years: 3,
            dbh_cm: None,
            height_m: None,
            ndvi: None,
            tcari: None,
        }, &params());
        assert!(result.low_confidence);
        assert!((result.agb_per_tree_kg - 0.062 * 20.0f64.powf(2.23)).abs() < 1e-9);
    }

    #[test]
    fn index_methods_are_linear_in_index() {
        let result = estimate(&EstimateInput {
            method: CalculationMethod::Ndvi,
            area_rai: 2.0,
            age_years: 10,
            dbh_cm: None,
            height_m: None,
            ndvi: Some(0.5),
            tcari: None,
        }, &params());
        assert!((result.agb_per_tree_kg - (34.2 * 0.5 + 5.8)).abs() < 1e-9);
        assert!(!result.low_confidence);

        let tcari = estimate(&EstimateInput {
            method: CalculationMethod::Tcari,
            area_rai: 2.0,
            age_years: 10,
            dbh_cm: None,
            height_m: None,
            ndvi: None,
            tcari: Some(0.45),
        }, &params());
        assert!((tcari.agb_per_tree_kg - (13.57 * 0.45 + 7.45)).abs() < 1e-9);
    }

    #[test]
    fn zero_area_yields_zero_carbon() {
        let result = estimate(&EstimateInput {
            method: CalculationMethod::Eq1,
            area_rai: -4.0,
            age_years: 10,
            dbh_cm: Some(25.0),
            height_m: None,
            ndvi: None,
            tcari: None,
        }, &params());
        assert_eq!(result.carbon_tons, 0.0);
    }

    #[test]
    fn age_multiplier_boundaries() {
        assert_eq!(age_efficiency_multiplier(0), 0.5);
        assert_eq!(age_efficiency_multiplier(5), 1.0);
        assert_eq!(age_efficiency_multiplier(20), 1.0);
        assert_eq!(age_efficiency_multiplier(50), 0.6);
    }

    #[test]
    fn age_multiplier_ramps_and_declines() {
        // Year 2 of the ramp: 0.5 + (2/5)*0.5 = 0.7
        assert!((age_efficiency_multiplier(2) - 0.7).abs() < 1e-12);
        // Year 35: 1.0 - (15/30)*0.4 = 0.8
        assert!((age_efficiency_multiplier(35) - 0.8).abs() < 1e-12);
        // The floor holds far beyond year 50
        assert_eq!(age_efficiency_multiplier(100), 0.6);
    }

    #[test]
    fn quick_estimate_applies_curve() {
        let mature = quick_estimate(10, 5.0);
        assert!((mature.carbon_tons - BASELINE_CARBON_PER_RAI_TONS * 5.0).abs() < 1e-9);
        assert!((mature.co2_equivalent_tons - mature.carbon_tons * CO2_EQUIVALENT_FACTOR).abs() < 1e-9);

        let young = quick_estimate(0, 5.0);
        assert!((young.carbon_tons - mature.carbon_tons * 0.5).abs() < 1e-9);

        let negative_age = quick_estimate(-7, 5.0);
        assert_eq!(negative_age.age_years, 0);
        assert_eq!(negative_age.carbon_tons, young.carbon_tons);
    }

    #[test]
    fn named_methods_map_to_families() {
        assert_eq!(NamedMethod::Tgo.family(), CalculationMethod::Eq1);
        assert_eq!(NamedMethod::Doa.family(), CalculationMethod::Eq2);
        assert_eq!(NamedMethod::Research.family(), CalculationMethod::Ndvi);
    }
}
