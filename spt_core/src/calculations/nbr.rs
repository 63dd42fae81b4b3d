//! # NBR Calculator
//!
//! Pure numeric functions for SPT soundings: NSPT, water-table correction,
//! bearing-capacity estimates, strength parameters and equipment checks.
//!
//! No function here holds state or performs I/O. The ones with a real division
//! hazard (`bearing_capacity_terzaghi`, `sampler_area_ratio`,
//! `approximate_settlement`) return [`SptResult`] and reject the bad domain
//! instead of producing `inf`/`NaN`.
//!
//! ## Example
//!
//! ```rust
//! use spt_core::calculations::nbr;
//!
//! let n = nbr::nspt(7, 9);
//! assert_eq!(n, 16);
//!
//! // Below the water table the index is scaled up
//! let corrected = nbr::corrected_nspt(n, 6.0, Some(2.0));
//! assert!((corrected - 21.33).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{SptError, SptResult};
use crate::sounding::{Compactness, Consistency, PercussionSystem, Sample};

/// Blow count that characterizes refusal (impenetrable to SPT)
pub const DEFAULT_BLOW_LIMIT: i32 = 50;
/// Penetration below which a blow-limited sample counts as refusal (cm)
pub const REFUSAL_PENETRATION_CM: f64 = 45.0;
/// Empirical factor of the simplified Terzaghi expression
const TERZAGHI_K: f64 = 12.0;
/// Gravity used to convert kgf·cm to energy units
const GRAVITY: f64 = 9.81;
/// Energy efficiency assumed for manual percussion (%)
pub const MANUAL_EFFICIENCY: f64 = 60.0;
/// Energy efficiency assumed for mechanical (automatic trip) percussion (%)
pub const MECHANICAL_EFFICIENCY: f64 = 75.0;

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// NSPT: blows of the second plus third 15 cm sections.
pub fn nspt(golpes_2a: i32, golpes_3a: i32) -> i32 {
    golpes_2a + golpes_3a
}

/// NSPT corrected for submergence.
///
/// Only applies when a water table is known and the sample is below it:
/// `N * (1 + 0.5 * (z - zw) / z)`. Rounded to 2 decimals.
pub fn corrected_nspt(nspt: i32, depth_m: f64, water_table_m: Option<f64>) -> f64 {
    let n = nspt as f64;
    let corrected = match water_table_m {
        Some(water_table) if depth_m > water_table && depth_m > 0.0 => {
            n * (1.0 + 0.5 * (depth_m - water_table) / depth_m)
        }
        _ => n,
    };
    round_to(corrected, 2)
}

/// Simplified Terzaghi bearing capacity (kPa) from NSPT.
///
/// `12 * N * (B + 0.3)² / B²`, scaled by the embedment term
/// `(1 + 0.33 * Df / B)`. Rounded to 2 decimals.
///
/// # Errors
///
/// `InvalidInput` when `base_width_m <= 0`.
pub fn bearing_capacity_terzaghi(
    nspt: i32,
    base_width_m: f64,
    foundation_depth_m: f64,
) -> SptResult<f64> {
    if base_width_m.is_nan() || base_width_m <= 0.0 {
        return Err(SptError::invalid_input(
            "base_width_m",
            base_width_m.to_string(),
            "Base width must be positive",
        ));
    }

    let b2 = base_width_m.powi(2);
    let admissible = TERZAGHI_K * nspt as f64 * (base_width_m + 0.3).powi(2) / b2;
    let embedded = admissible * (1.0 + 0.33 * foundation_depth_m / base_width_m);

    Ok(round_to(embedded, 2))
}

/// Friction angle of sands (degrees): `28 + 0.15 N`, capped at 45.
pub fn friction_angle_sand(nspt: i32) -> f64 {
    let phi = 28.0 + 0.15 * nspt as f64;
    round_to(phi.min(45.0), 1)
}

/// Undrained cohesion of clays (kPa): `10 N`.
pub fn cohesion_clay(nspt: i32) -> f64 {
    round_to(10.0 * nspt as f64, 1)
}

/// Compactness band of a sand from NSPT.
pub fn sand_compactness(nspt: i32) -> Compactness {
    match nspt {
        n if n <= 4 => Compactness::Fofa,
        n if n <= 8 => Compactness::PoucoCompacta,
        n if n <= 18 => Compactness::MedianamenteCompacta,
        n if n <= 40 => Compactness::Compacta,
        _ => Compactness::MuitoCompacta,
    }
}

/// Consistency band of a clay from NSPT.
pub fn clay_consistency(nspt: i32) -> Consistency {
    match nspt {
        n if n <= 2 => Consistency::MuitoMole,
        n if n <= 5 => Consistency::Mole,
        n if n <= 10 => Consistency::Media,
        n if n <= 19 => Consistency::Rija,
        n if n <= 40 => Consistency::MuitoRija,
        _ => Consistency::Dura,
    }
}

/// Sampler area ratio (%): wall area over internal area.
///
/// # Errors
///
/// `InvalidInput` when the internal diameter is not positive.
pub fn sampler_area_ratio(external_mm: f64, internal_mm: f64) -> SptResult<f64> {
    if internal_mm.is_nan() || internal_mm <= 0.0 {
        return Err(SptError::invalid_input(
            "sampler_internal_mm",
            internal_mm.to_string(),
            "Internal diameter must be positive",
        ));
    }

    let area = |d: f64| std::f64::consts::PI * (d / 2.0).powi(2);
    let external_area = area(external_mm);
    let internal_area = area(internal_mm);
    let ratio = (external_area - internal_area) / internal_area;

    Ok(round_to(ratio * 100.0, 2))
}

/// Theoretical free-fall energy of the hammer: `W * H * 9.81`.
pub fn theoretical_energy(hammer_weight_kgf: f64, drop_height_cm: f64) -> f64 {
    round_to(hammer_weight_kgf * drop_height_cm * GRAVITY, 2)
}

/// Energy efficiency (%) of a percussion system.
///
/// Unknown systems fall back to the manual value. This mirrors what the field
/// software has always done; it is logged, not rejected.
pub fn efficiency(percussion_system: &str) -> f64 {
    match PercussionSystem::from_code(percussion_system) {
        Some(PercussionSystem::Manual) => MANUAL_EFFICIENCY,
        Some(PercussionSystem::Mecanico) => MECHANICAL_EFFICIENCY,
        None => {
            warn!(
                system = percussion_system,
                "unknown percussion system, assuming manual efficiency"
            );
            MANUAL_EFFICIENCY
        }
    }
}

/// Normalize NSPT to the 60% reference energy (N60).
pub fn normalize_to_n60(nspt: i32, efficiency_pct: f64) -> i32 {
    (nspt as f64 * efficiency_pct / 60.0).round() as i32
}

/// Rough settlement estimate (cm): `0.02 * Q / (N * A) * 100`.
///
/// # Errors
///
/// `InvalidInput` when the mean NSPT or the area is not positive.
pub fn approximate_settlement(load_kn: f64, mean_nspt: f64, area_m2: f64) -> SptResult<f64> {
    if mean_nspt.is_nan() || mean_nspt <= 0.0 {
        return Err(SptError::invalid_input(
            "mean_nspt",
            mean_nspt.to_string(),
            "Mean NSPT must be positive",
        ));
    }
    if area_m2.is_nan() || area_m2 <= 0.0 {
        return Err(SptError::invalid_input(
            "area_m2",
            area_m2.to_string(),
            "Area must be positive",
        ));
    }

    let settlement = 0.02 * load_kn / (mean_nspt * area_m2);
    Ok(round_to(settlement * 100.0, 2))
}

/// Rule-of-thumb admissible stress (kPa): `N / 5 * 100`.
pub fn simplified_admissible_stress(nspt: i32) -> f64 {
    round_to(nspt as f64 / 5.0 * 100.0, 2)
}

/// Outcome of the refusal (impenetrability) criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusalCheck {
    pub impenetrable: bool,
    /// Human-readable reason, empty when not impenetrable
    pub reason: String,
    pub blows: i32,
    pub penetration_cm: f64,
}

/// Impenetrable to SPT when `blows >= blow_limit` with less than 45 cm penetration.
pub fn refusal_check(blows: i32, penetration_cm: f64, blow_limit: i32) -> RefusalCheck {
    let impenetrable = blows >= blow_limit && penetration_cm < REFUSAL_PENETRATION_CM;
    let reason = if impenetrable {
        format!(
            "Impenetrável ao SPT: {} golpes para {:.1} cm (< 45 cm)",
            blows, penetration_cm
        )
    } else {
        String::new()
    };

    RefusalCheck {
        impenetrable,
        reason,
        blows,
        penetration_cm,
    }
}

/// Mean stored NSPT of samples whose initial depth lies in `[from, to]`.
///
/// Returns 0.0 when no sample falls in the range. Rounded to 1 decimal.
pub fn mean_nspt_in_range(samples: &[Sample], depth_from_m: f64, depth_to_m: f64) -> f64 {
    let values: Vec<i32> = samples
        .iter()
        .filter(|s| s.initial_depth_m >= depth_from_m && s.initial_depth_m <= depth_to_m)
        .map(|s| s.nspt_2a_3a())
        .collect();

    if values.is_empty() {
        return 0.0;
    }

    let sum: i32 = values.iter().sum();
    round_to(sum as f64 / values.len() as f64, 1)
}

/// Linear interpolation of NSPT between two samples at `target_depth_m`.
///
/// Samples at the same depth return the first sample's value.
pub fn interpolate_nspt(target_depth_m: f64, a: &Sample, b: &Sample) -> f64 {
    let (z1, z2) = (a.initial_depth_m, b.initial_depth_m);
    let (n1, n2) = (a.nspt_2a_3a() as f64, b.nspt_2a_3a() as f64);

    if (z2 - z1).abs() < f64::EPSILON {
        return n1;
    }

    let interpolated = n1 + (n2 - n1) * (target_depth_m - z1) / (z2 - z1);
    round_to(interpolated, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_at(number: u32, depth: f64, nspt: i32) -> Sample {
        let mut sample = Sample::new(number, depth, None, 0, 0);
        sample.set_blows(None, nspt / 2, nspt - nspt / 2);
        sample
    }

    #[test]
    fn test_nspt_sum() {
        assert_eq!(nspt(4, 6), 10);
        assert_eq!(nspt(0, 0), 0);
    }

    #[test]
    fn test_corrected_nspt_below_water() {
        // 10 * (1 + 0.5 * (8 - 4) / 8) = 12.5
        assert_eq!(corrected_nspt(10, 8.0, Some(4.0)), 12.5);
    }

    #[test]
    fn test_corrected_nspt_above_or_without_water() {
        assert_eq!(corrected_nspt(10, 3.0, Some(4.0)), 10.0);
        assert_eq!(corrected_nspt(10, 4.0, Some(4.0)), 10.0);
        assert_eq!(corrected_nspt(10, 8.0, None), 10.0);
    }

    #[test]
    fn test_corrected_nspt_zero_water_table_is_a_reading() {
        // Water at the surface is a real observation, not "absent"
        assert_eq!(corrected_nspt(10, 5.0, Some(0.0)), 15.0);
    }

    #[test]
    fn test_bearing_capacity_terzaghi() {
        // 12 * 10 * 1.69 / 1 = 202.8; * (1 + 0.33 * 1.5) = 303.186
        let q = bearing_capacity_terzaghi(10, 1.0, 1.5).unwrap();
        assert!((q - 303.19).abs() < 0.01);
    }

    #[test]
    fn test_bearing_capacity_rejects_zero_width() {
        let err = bearing_capacity_terzaghi(10, 0.0, 1.5).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(bearing_capacity_terzaghi(10, f64::NAN, 1.5).is_err());
    }

    #[test]
    fn test_friction_angle_capped() {
        assert_eq!(friction_angle_sand(10), 29.5);
        assert_eq!(friction_angle_sand(200), 45.0);
    }

    #[test]
    fn test_cohesion_clay() {
        assert_eq!(cohesion_clay(7), 70.0);
    }

    #[rstest]
    #[case(0, Compactness::Fofa)]
    #[case(4, Compactness::Fofa)]
    #[case(5, Compactness::PoucoCompacta)]
    #[case(8, Compactness::PoucoCompacta)]
    #[case(18, Compactness::MedianamenteCompacta)]
    #[case(40, Compactness::Compacta)]
    #[case(41, Compactness::MuitoCompacta)]
    fn test_sand_compactness_bands(#[case] n: i32, #[case] expected: Compactness) {
        assert_eq!(sand_compactness(n), expected);
    }

    #[rstest]
    #[case(2, Consistency::MuitoMole)]
    #[case(3, Consistency::Mole)]
    #[case(5, Consistency::Mole)]
    #[case(10, Consistency::Media)]
    #[case(19, Consistency::Rija)]
    #[case(40, Consistency::MuitoRija)]
    #[case(41, Consistency::Dura)]
    fn test_clay_consistency_bands(#[case] n: i32, #[case] expected: Consistency) {
        assert_eq!(clay_consistency(n), expected);
    }

    #[test]
    fn test_sampler_area_ratio_nominal() {
        let ratio = sampler_area_ratio(50.8, 34.9).unwrap();
        assert!((ratio - 111.75).abs() < 0.5, "ratio was {}", ratio);
        assert!((95.0..=120.0).contains(&ratio));
    }

    #[test]
    fn test_sampler_area_ratio_rejects_zero_internal() {
        assert!(sampler_area_ratio(50.8, 0.0).is_err());
    }

    #[test]
    fn test_theoretical_energy() {
        // 65 * 75 * 9.81
        assert!((theoretical_energy(65.0, 75.0) - 47823.75).abs() < 1e-6);
    }

    #[test]
    fn test_efficiency_lookup_and_fallback() {
        assert_eq!(efficiency("manual"), 60.0);
        assert_eq!(efficiency("mecanico"), 75.0);
        assert_eq!(efficiency("pneumatico"), 60.0);
        assert_eq!(efficiency(""), 60.0);
    }

    #[test]
    fn test_normalize_to_n60() {
        assert_eq!(normalize_to_n60(20, 75.0), 25);
        assert_eq!(normalize_to_n60(20, 60.0), 20);
    }

    #[test]
    fn test_approximate_settlement() {
        // 0.02 * 500 / (10 * 2) * 100 = 50
        assert_eq!(approximate_settlement(500.0, 10.0, 2.0).unwrap(), 50.0);
        assert!(approximate_settlement(500.0, 0.0, 2.0).is_err());
        assert!(approximate_settlement(500.0, 10.0, 0.0).is_err());
    }

    #[test]
    fn test_simplified_admissible_stress() {
        assert_eq!(simplified_admissible_stress(12), 240.0);
    }

    #[test]
    fn test_refusal_check() {
        let refusal = refusal_check(50, 12.0, DEFAULT_BLOW_LIMIT);
        assert!(refusal.impenetrable);
        assert!(refusal.reason.contains("50 golpes"));

        let not_refusal = refusal_check(50, 45.0, DEFAULT_BLOW_LIMIT);
        assert!(!not_refusal.impenetrable);
        assert!(not_refusal.reason.is_empty());

        assert!(!refusal_check(49, 10.0, DEFAULT_BLOW_LIMIT).impenetrable);
        assert!(refusal_check(30, 10.0, 30).impenetrable);
    }

    #[test]
    fn test_mean_nspt_in_range_inclusive() {
        let samples = vec![sample_at(1, 1.0, 4), sample_at(2, 2.0, 8), sample_at(3, 3.0, 30)];
        assert_eq!(mean_nspt_in_range(&samples, 1.0, 2.0), 6.0);
        assert_eq!(mean_nspt_in_range(&samples, 0.0, 10.0), 14.0);
    }

    #[test]
    fn test_mean_nspt_in_range_empty() {
        let samples = vec![sample_at(1, 1.0, 4)];
        assert_eq!(mean_nspt_in_range(&samples, 5.0, 6.0), 0.0);
        assert_eq!(mean_nspt_in_range(&[], 0.0, 6.0), 0.0);
    }

    #[test]
    fn test_interpolate_nspt() {
        let a = sample_at(1, 2.0, 10);
        let b = sample_at(2, 4.0, 20);
        assert_eq!(interpolate_nspt(3.0, &a, &b), 15.0);
    }

    #[test]
    fn test_interpolate_nspt_at_sample_depths() {
        let a = sample_at(1, 2.0, 7);
        let b = sample_at(2, 3.0, 13);
        assert_eq!(interpolate_nspt(2.0, &a, &b), 7.0);
        assert_eq!(interpolate_nspt(3.0, &a, &b), 13.0);
    }

    #[test]
    fn test_interpolate_nspt_same_depth() {
        let a = sample_at(1, 2.0, 7);
        let b = sample_at(2, 2.0, 13);
        assert_eq!(interpolate_nspt(5.0, &a, &b), 7.0);
    }
}
