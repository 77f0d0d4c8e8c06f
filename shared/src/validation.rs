//! Validation utilities for the Rubber Carbon Assessment Platform
//!
//! Includes Thailand-specific validations for planting records kept in the
//! Buddhist calendar.

// ============================================================================
// Plot Attribute Validations
// ============================================================================

/// Offset between the Buddhist and Gregorian calendars
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Oldest planting year the platform accepts, relative to the current year
pub const MAX_STAND_AGE_YEARS: i32 = 80;

/// Validate a farmer name is present
pub fn validate_farmer_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Farmer name is required");
    }
    Ok(())
}

/// Validate a planting year (Buddhist calendar) against the current year
pub fn validate_planting_year_be(
    planting_year_be: i32,
    current_year_be: i32,
) -> Result<(), &'static str> {
    if planting_year_be > current_year_be {
        return Err("Planting year cannot be in the future");
    }
    if planting_year_be < current_year_be - MAX_STAND_AGE_YEARS {
        return Err("Planting year is too far in the past");
    }
    Ok(())
}

/// Derive a stand age from its planting year.
///
/// The carbon models expect at least one growing season, so a planting year
/// equal to (or, from bad data, after) the current year yields an age of 1.
pub fn age_from_planting_year(planting_year_be: i32, current_year_be: i32) -> u32 {
    let age = current_year_be - planting_year_be;
    if age <= 0 {
        1
    } else {
        age as u32
    }
}

/// Current year in the Buddhist calendar
pub fn current_buddhist_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year() + BUDDHIST_ERA_OFFSET
}

/// Validate a DBH field measurement (cm)
pub fn validate_dbh_cm(dbh_cm: f64) -> Result<(), &'static str> {
    if !dbh_cm.is_finite() || dbh_cm <= 0.0 {
        return Err("DBH must be positive");
    }
    if dbh_cm > 200.0 {
        return Err("DBH exceeds plausible range for rubber trees");
    }
    Ok(())
}

/// Validate a vegetation index reading (NDVI or TCARI)
pub fn validate_vegetation_index(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        return Err("Vegetation index must be a number");
    }
    if !(-1.0..=1.0).contains(&value) {
        return Err("Vegetation index must be between -1 and 1");
    }
    Ok(())
}

// ============================================================================
// Thailand-Specific Validations
// ============================================================================

/// Thai provinces (จังหวัด) - rubber growing regions
pub const THAI_RUBBER_PROVINCES: &[&str] = &[
    "นครศรีธรรมราช",  // Nakhon Si Thammarat
    "สุราษฎร์ธานี",   // Surat Thani
    "สงขลา",          // Songkhla
    "ตรัง",           // Trang
    "พัทลุง",         // Phatthalung
    "กระบี่",         // Krabi
    "พังงา",          // Phang Nga
    "ภูเก็ต",         // Phuket
    "ระนอง",          // Ranong
    "ชุมพร",          // Chumphon
    "สตูล",           // Satun
    "ปัตตานี",        // Pattani
    "ยะลา",           // Yala
    "นราธิวาส",       // Narathiwat
    "ระยอง",          // Rayong
    "จันทบุรี",       // Chanthaburi
    "ตราด",           // Trat
    "บึงกาฬ",         // Bueng Kan
    "หนองคาย",        // Nong Khai
    "เลย",            // Loei
    "อุดรธานี",       // Udon Thani
];

/// Thai provinces in English
pub const THAI_RUBBER_PROVINCES_EN: &[&str] = &[
    "Nakhon Si Thammarat",
    "Surat Thani",
    "Songkhla",
    "Trang",
    "Phatthalung",
    "Krabi",
    "Phang Nga",
    "Phuket",
    "Ranong",
    "Chumphon",
    "Satun",
    "Pattani",
    "Yala",
    "Narathiwat",
    "Rayong",
    "Chanthaburi",
    "Trat",
    "Bueng Kan",
    "Nong Khai",
    "Loei",
    "Udon Thani",
];

/// Validate province is a known Thai rubber-growing region
pub fn validate_thai_province(province: &str) -> Result<(), &'static str> {
    let province_lower = province.to_lowercase();

    // Check Thai names
    if THAI_RUBBER_PROVINCES
        .iter()
        .any(|p| p.to_lowercase() == province_lower)
    {
        return Ok(());
    }

    // Check English names
    if THAI_RUBBER_PROVINCES_EN
        .iter()
        .any(|p| p.to_lowercase() == province_lower)
    {
        return Ok(());
    }

    Err("Province is not a recognized Thai rubber-growing region")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Plot Attribute Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_farmer_name() {
        assert!(validate_farmer_name("สมชาย ใจดี").is_ok());
        assert!(validate_farmer_name("").is_err());
        assert!(validate_farmer_name("   ").is_err());
    }

    #[test]
    fn test_validate_planting_year_valid() {
        assert!(validate_planting_year_be(2550, 2569).is_ok());
        assert!(validate_planting_year_be(2569, 2569).is_ok());
    }

    #[test]
    fn test_validate_planting_year_invalid() {
        // Future year
        assert!(validate_planting_year_be(2570, 2569).is_err());
        // Implausibly old stand
        assert!(validate_planting_year_be(2400, 2569).is_err());
    }

    #[test]
    fn test_age_from_planting_year() {
        assert_eq!(age_from_planting_year(2550, 2569), 19);
        assert_eq!(age_from_planting_year(2568, 2569), 1);
        // Same-year and future plantings floor at one growing season
        assert_eq!(age_from_planting_year(2569, 2569), 1);
        assert_eq!(age_from_planting_year(2572, 2569), 1);
    }

    #[test]
    fn test_validate_dbh() {
        assert!(validate_dbh_cm(20.0).is_ok());
        assert!(validate_dbh_cm(0.0).is_err());
        assert!(validate_dbh_cm(-5.0).is_err());
        assert!(validate_dbh_cm(250.0).is_err());
        assert!(validate_dbh_cm(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_vegetation_index() {
        assert!(validate_vegetation_index(0.72).is_ok());
        assert!(validate_vegetation_index(-0.2).is_ok());
        assert!(validate_vegetation_index(1.5).is_err());
        assert!(validate_vegetation_index(f64::INFINITY).is_err());
    }

    // ========================================================================
    // Thailand-Specific Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_thai_province_valid() {
        // Thai names
        assert!(validate_thai_province("นครศรีธรรมราช").is_ok());
        assert!(validate_thai_province("สุราษฎร์ธานี").is_ok());
        // English names
        assert!(validate_thai_province("Surat Thani").is_ok());
        assert!(validate_thai_province("songkhla").is_ok()); // Case insensitive
    }

    #[test]
    fn test_validate_thai_province_invalid() {
        assert!(validate_thai_province("Bangkok").is_err()); // Not a rubber region
        assert!(validate_thai_province("Unknown").is_err());
    }
}
