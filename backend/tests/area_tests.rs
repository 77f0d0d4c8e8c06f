//! Thai land-unit conversion tests
//!
//! Verifies the round-trip property: rai, ngan and wah recombine to the
//! original metric area within rounding tolerance.

use proptest::prelude::*;
use shared::{area_rai_from_sqm, to_thai_units, ThaiArea, SQM_PER_RAI};

// ============================================================================
// Unit Tests
// ============================================================================

mod conversion {
    use super::*;

    #[test]
    fn zero_and_negative_input_yield_the_zero_record() {
        assert_eq!(to_thai_units(0.0), ThaiArea::ZERO);
        assert_eq!(to_thai_units(-1.0), ThaiArea::ZERO);
        assert_eq!(to_thai_units(f64::NAN), ThaiArea::ZERO);
        assert_eq!(to_thai_units(0.0).display(), "0-0-0.0 ไร่");
    }

    #[test]
    fn one_rai_is_sixteen_hundred_square_meters() {
        let area = to_thai_units(1.0);
        assert_eq!(area.rai, 1);
        assert_eq!(area.ngan, 0);
        assert_eq!(area.wah, 0.0);
        assert_eq!(area.square_meters, SQM_PER_RAI);
    }

    #[test]
    fn quarter_rai_is_one_ngan() {
        let area = to_thai_units(0.25);
        assert_eq!(area.rai, 0);
        assert_eq!(area.ngan, 1);
        assert_eq!(area.wah, 0.0);
    }

    #[test]
    fn conversion_is_idempotent_for_the_same_input() {
        let first = to_thai_units(7.8912);
        let second = to_thai_units(7.8912);
        assert_eq!(first, second);
    }

    #[test]
    fn sqm_to_rai_matches_definition() {
        assert!((area_rai_from_sqm(SQM_PER_RAI) - 1.0).abs() < 1e-12);
        assert!((area_rai_from_sqm(800.0) - 0.5).abs() < 1e-12);
        assert_eq!(area_rai_from_sqm(0.0), 0.0);
    }

    #[test]
    fn display_string_keeps_one_wah_decimal() {
        // 2.3 rai = 2 rai, 1 ngan, 20.0 wah
        assert_eq!(to_thai_units(2.3).display(), "2-1-20.0 ไร่");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// rai×1600 + ngan×400 + wah×4 recombines to the original metric area
    /// within the one-decimal wah rounding tolerance
    #[test]
    fn round_trip_recombines_to_original_area(area_rai in 0.0f64..10_000.0) {
        let area = to_thai_units(area_rai);
        let recombined =
            area.rai as f64 * 1600.0 + area.ngan as f64 * 400.0 + area.wah * 4.0;
        let original = area_rai * 1600.0;
        // Half of one wah decimal (0.05 wah = 0.2 m²) plus float slack
        prop_assert!((recombined - original).abs() < 0.21 + original * 1e-12);
    }

    /// The breakdown never produces out-of-range ngan or wah values
    #[test]
    fn breakdown_units_stay_in_range(area_rai in 0.0f64..10_000.0) {
        let area = to_thai_units(area_rai);
        prop_assert!(area.ngan < 4);
        prop_assert!(area.wah >= 0.0);
        prop_assert!(area.wah <= 100.0);
    }

    /// Converting through m² and back is the identity on positive areas
    #[test]
    fn sqm_round_trip(area_sqm in 1.0f64..1.0e7) {
        let rai = area_rai_from_sqm(area_sqm);
        prop_assert!((rai * 1600.0 - area_sqm).abs() < 1e-6 * area_sqm.max(1.0));
    }
}
