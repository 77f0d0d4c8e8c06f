//! WebAssembly module for the Rubber Carbon Assessment Platform
//!
//! Provides client-side computation for:
//! - Thai land-unit conversion for the drawing HUD
//! - Quick carbon estimates for the trial calculator
//! - Age-efficiency lookups
//! - Offline attribute validation

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Convert a drawn polygon's metric area into the rai-ngan-wah breakdown,
/// returned as JSON for the drawing HUD
#[wasm_bindgen]
pub fn convert_area_to_thai_units(area_sqm: f64) -> Result<String, JsValue> {
    let area = to_thai_units(area_rai_from_sqm(area_sqm));
    serde_json::to_string(&area).map_err(|e| JsValue::from_str(&format!("Serialize error: {}", e)))
}

/// Thai display string for a metric area, e.g. `2-1-20.0 ไร่`
#[wasm_bindgen]
pub fn format_thai_area(area_sqm: f64) -> String {
    to_thai_units(area_rai_from_sqm(area_sqm)).display()
}

/// Quick carbon estimate from stand age and area, returned as JSON
#[wasm_bindgen]
pub fn quick_carbon_estimate(age_years: i32, area_rai: f64) -> Result<String, JsValue> {
    let result = quick_estimate(age_years, area_rai);
    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&format!("Serialize error: {}", e)))
}

/// Sequestration efficiency multiplier for a stand age
#[wasm_bindgen]
pub fn age_multiplier(age_years: u32) -> f64 {
    age_efficiency_multiplier(age_years)
}

/// Derive stand age from a Buddhist-calendar planting year
#[wasm_bindgen]
pub fn stand_age_from_planting_year(planting_year_be: i32, current_year_be: i32) -> u32 {
    age_from_planting_year(planting_year_be, current_year_be)
}

/// Validate a planting year (Buddhist calendar)
#[wasm_bindgen]
pub fn is_valid_planting_year(planting_year_be: i32, current_year_be: i32) -> bool {
    validate_planting_year_be(planting_year_be, current_year_be).is_ok()
}

/// Validate a DBH field measurement (cm)
#[wasm_bindgen]
pub fn is_valid_dbh(dbh_cm: f64) -> bool {
    validate_dbh_cm(dbh_cm).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thai_area() {
        // 3,680 m² = 2 rai, 1 ngan, 20 wah
        assert_eq!(format_thai_area(3680.0), "2-1-20.0 ไร่");
        assert_eq!(format_thai_area(0.0), "0-0-0.0 ไร่");
    }

    #[test]
    fn test_age_multiplier() {
        assert_eq!(age_multiplier(0), 0.5);
        assert_eq!(age_multiplier(12), 1.0);
        assert_eq!(age_multiplier(50), 0.6);
    }

    #[test]
    fn test_stand_age() {
        assert_eq!(stand_age_from_planting_year(2550, 2569), 19);
        assert_eq!(stand_age_from_planting_year(2569, 2569), 1);
    }

    #[test]
    fn test_quick_estimate_json() {
        let json = quick_carbon_estimate(10, 5.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["age_years"], 10);
        assert!(value["carbon_tons"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_planting_year_validation() {
        assert!(is_valid_planting_year(2550, 2569));
        assert!(!is_valid_planting_year(2600, 2569));
    }
}
