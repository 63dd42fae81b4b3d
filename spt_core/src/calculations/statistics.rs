//! # SPT Statistics
//!
//! Aggregations over the sample list of one sounding: summary statistics,
//! resistance histogram, refusal and soft-layer detection, a foundation-depth
//! suggestion and the admissible stress at that depth.
//!
//! Everything reads the *stored* `nspt_2a_3a` of each sample; blow counts are
//! never re-derived here. Empty inputs give empty or all-zero results.
//!
//! ## Example
//!
//! ```rust
//! use spt_core::calculations::statistics::summary_statistics;
//! use spt_core::sounding::Sample;
//!
//! let samples = vec![
//!     Sample::new(1, 1.0, None, 2, 3),
//!     Sample::new(2, 2.0, None, 4, 5),
//! ];
//! let stats = summary_statistics(&samples);
//! assert_eq!(stats.count, 2);
//! assert_eq!(stats.median, 7.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::nbr::{self, round_to, REFUSAL_PENETRATION_CM};
use crate::config::AnalysisSettings;
use crate::errors::{SptError, SptResult};
use crate::sounding::Sample;

/// Nominal thickness represented by one sample (the 45 cm of sampler drive)
pub const SAMPLE_THICKNESS_M: f64 = 0.45;
/// Liquefaction screening only looks at the top 20 m
const LIQUEFACTION_MAX_DEPTH_M: f64 = 20.0;
/// Slack for accumulated float thickness comparisons
const THICKNESS_TOLERANCE: f64 = 1e-9;

/// Summary of the NSPT values of one sounding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub min: i32,
    pub max: i32,
    pub mean: f64,
    pub median: f64,
    pub max_depth_m: f64,
}

/// Histogram of samples per resistance band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResistanceProfile {
    /// NSPT <= 4
    pub very_low: usize,
    /// NSPT <= 10
    pub low: usize,
    /// NSPT <= 30
    pub medium: usize,
    /// NSPT <= 50
    pub high: usize,
    /// NSPT > 50
    pub very_high: usize,
}

/// A sample that met the refusal criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpenetrableLayer {
    pub depth_m: f64,
    pub nspt: i32,
    pub penetration_cm: f64,
    pub sample_number: u32,
}

/// A contiguous run of samples satisfying an NSPT condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthRun {
    pub depth_from_m: f64,
    pub depth_to_m: f64,
    pub thickness_m: f64,
    pub mean_nspt: f64,
}

/// Admissible stress estimate at a foundation depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissibleStress {
    pub depth_m: f64,
    pub mean_nspt: f64,
    /// Bearing capacity before the safety factor (kPa)
    pub bearing_capacity_kpa: f64,
    /// Bearing capacity divided by the safety factor (kPa)
    pub admissible_stress_kpa: f64,
    pub safety_factor: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Moderado,
    Alto,
}

/// A submerged sample with low corrected NSPT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquefactionRisk {
    pub depth_m: f64,
    pub nspt: i32,
    pub corrected_nspt: f64,
    pub level: RiskLevel,
}

/// Series for the NSPT-versus-depth plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NsptChart {
    pub labels: Vec<String>,
    pub nspt: Vec<i32>,
    pub depths_m: Vec<f64>,
}

/// A sample meeting the refusal criterion under the configured blow limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRefusal {
    pub sample_number: u32,
    pub depth_m: f64,
    pub reason: String,
}

/// Everything the configured geotechnical analysis produces for one sounding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoundingAnalysis {
    pub soft_layers: Vec<DepthRun>,
    pub foundation: Option<DepthRun>,
    pub admissible_stress: Option<AdmissibleStress>,
    pub liquefaction: Vec<LiquefactionRisk>,
    #[serde(default)]
    pub refusals: Vec<SampleRefusal>,
}

fn sorted_by_depth(samples: &[Sample]) -> Vec<&Sample> {
    let mut sorted: Vec<&Sample> = samples.iter().collect();
    sorted.sort_by(|a, b| a.initial_depth_m.total_cmp(&b.initial_depth_m));
    sorted
}

/// Count, min, max, mean, median and deepest sample.
pub fn summary_statistics(samples: &[Sample]) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics::default();
    }

    let mut values: Vec<i32> = samples.iter().map(|s| s.nspt_2a_3a()).collect();
    values.sort_unstable();

    let count = values.len();
    let median = if count % 2 == 0 {
        (values[count / 2 - 1] + values[count / 2]) as f64 / 2.0
    } else {
        values[count / 2] as f64
    };
    let sum: i32 = values.iter().sum();
    let max_depth_m = samples
        .iter()
        .map(|s| s.initial_depth_m)
        .fold(f64::MIN, f64::max);

    SummaryStatistics {
        count,
        min: values[0],
        max: values[count - 1],
        mean: round_to(sum as f64 / count as f64, 1),
        median: round_to(median, 1),
        max_depth_m,
    }
}

/// Histogram over the five resistance bands.
pub fn resistance_profile(samples: &[Sample]) -> ResistanceProfile {
    let mut profile = ResistanceProfile::default();
    for sample in samples {
        match sample.nspt_2a_3a() {
            n if n <= 4 => profile.very_low += 1,
            n if n <= 10 => profile.low += 1,
            n if n <= 30 => profile.medium += 1,
            n if n <= 50 => profile.high += 1,
            _ => profile.very_high += 1,
        }
    }
    profile
}

/// Samples flagged as blow-limited, or with NSPT > 50 short of full penetration.
pub fn identify_impenetrable_layers(samples: &[Sample]) -> Vec<ImpenetrableLayer> {
    samples
        .iter()
        .filter(|s| {
            s.blow_limit || (s.nspt_2a_3a() > 50 && s.penetration_cm < REFUSAL_PENETRATION_CM)
        })
        .map(|s| ImpenetrableLayer {
            depth_m: s.initial_depth_m,
            nspt: s.nspt_2a_3a(),
            penetration_cm: s.penetration_cm,
            sample_number: s.number,
        })
        .collect()
}

fn close_run(samples: &[Sample], from: f64, to: f64) -> DepthRun {
    DepthRun {
        depth_from_m: from,
        depth_to_m: to,
        thickness_m: round_to(to - from, 2),
        mean_nspt: nbr::mean_nspt_in_range(samples, from, to),
    }
}

/// Contiguous runs with NSPT <= `nspt_max` at least `min_thickness_m` thick.
///
/// Each sample stands for [`SAMPLE_THICKNESS_M`] of soil below its initial depth.
pub fn detect_soft_layers(
    samples: &[Sample],
    nspt_max: i32,
    min_thickness_m: f64,
) -> Vec<DepthRun> {
    let mut runs = Vec::new();
    let mut current: Option<(f64, f64)> = None;

    for sample in sorted_by_depth(samples) {
        if sample.nspt_2a_3a() <= nspt_max {
            let end = sample.initial_depth_m + SAMPLE_THICKNESS_M;
            current = match current {
                Some((start, _)) => Some((start, end)),
                None => Some((sample.initial_depth_m, end)),
            };
        } else if let Some((start, end)) = current.take() {
            if end - start + THICKNESS_TOLERANCE >= min_thickness_m {
                runs.push(close_run(samples, start, end));
            }
        }
    }

    if let Some((start, end)) = current {
        if end - start + THICKNESS_TOLERANCE >= min_thickness_m {
            runs.push(close_run(samples, start, end));
        }
    }

    runs
}

/// First run with NSPT >= `nspt_min` reaching `min_thickness_m`.
pub fn suggest_foundation_depth(
    samples: &[Sample],
    nspt_min: i32,
    min_thickness_m: f64,
) -> Option<DepthRun> {
    let mut start: Option<f64> = None;

    for sample in sorted_by_depth(samples) {
        if sample.nspt_2a_3a() < nspt_min {
            start = None;
            continue;
        }

        let from = *start.get_or_insert(sample.initial_depth_m);
        let to = sample.initial_depth_m + SAMPLE_THICKNESS_M;
        if to - from + THICKNESS_TOLERANCE >= min_thickness_m {
            return Some(close_run(samples, from, to));
        }
    }

    None
}

/// Admissible stress from the samples between `depth - 0.5` and `depth + 1.5` m.
///
/// Returns `Ok(None)` when no sample falls in that band.
///
/// # Errors
///
/// `InvalidInput` for a zero safety factor or a non-positive base width.
pub fn estimate_admissible_stress(
    samples: &[Sample],
    foundation_depth_m: f64,
    base_width_m: f64,
    safety_factor: u32,
) -> SptResult<Option<AdmissibleStress>> {
    if safety_factor == 0 {
        return Err(SptError::invalid_input(
            "safety_factor",
            "0",
            "Safety factor must be at least 1",
        ));
    }

    let from = foundation_depth_m - 0.5;
    let to = foundation_depth_m + 1.5;
    let in_band: Vec<Sample> = samples
        .iter()
        .filter(|s| s.initial_depth_m >= from && s.initial_depth_m <= to)
        .cloned()
        .collect();

    if in_band.is_empty() {
        return Ok(None);
    }

    let mean_nspt = nbr::mean_nspt_in_range(&in_band, from, to);
    // The capacity formula works on whole blow counts
    let capacity =
        nbr::bearing_capacity_terzaghi(mean_nspt as i32, base_width_m, foundation_depth_m)?;

    Ok(Some(AdmissibleStress {
        depth_m: foundation_depth_m,
        mean_nspt,
        bearing_capacity_kpa: capacity,
        admissible_stress_kpa: round_to(capacity / safety_factor as f64, 2),
        safety_factor,
    }))
}

/// Submerged samples in the top 20 m whose corrected NSPT is below 10.
pub fn liquefaction_risk(samples: &[Sample], water_table_m: f64) -> Vec<LiquefactionRisk> {
    samples
        .iter()
        .filter(|s| {
            s.initial_depth_m > water_table_m && s.initial_depth_m < LIQUEFACTION_MAX_DEPTH_M
        })
        .filter_map(|s| {
            let corrected =
                nbr::corrected_nspt(s.nspt_2a_3a(), s.initial_depth_m, Some(water_table_m));
            if corrected >= 10.0 {
                return None;
            }
            Some(LiquefactionRisk {
                depth_m: s.initial_depth_m,
                nspt: s.nspt_2a_3a(),
                corrected_nspt: corrected,
                level: if corrected < 5.0 {
                    RiskLevel::Alto
                } else {
                    RiskLevel::Moderado
                },
            })
        })
        .collect()
}

/// Summary statistics for several soundings, keyed by sounding code.
pub fn compare_soundings<'a>(
    soundings: impl IntoIterator<Item = (&'a str, &'a [Sample])>,
) -> BTreeMap<String, SummaryStatistics> {
    soundings
        .into_iter()
        .map(|(code, samples)| (code.to_string(), summary_statistics(samples)))
        .collect()
}

/// Labels `SP-<n>`, NSPT values and depths in sample order.
pub fn chart_data(samples: &[Sample]) -> NsptChart {
    let mut chart = NsptChart::default();
    for sample in samples {
        chart.labels.push(format!("SP-{}", sample.number));
        chart.nspt.push(sample.nspt_2a_3a());
        chart.depths_m.push(sample.initial_depth_m);
    }
    chart
}

/// Samples whose stored NSPT reaches `blow_limit` short of 45 cm, in depth order.
pub fn refusals(samples: &[Sample], blow_limit: i32) -> Vec<SampleRefusal> {
    sorted_by_depth(samples)
        .into_iter()
        .filter_map(|s| {
            let check = nbr::refusal_check(s.nspt_2a_3a(), s.penetration_cm, blow_limit);
            check.impenetrable.then(|| SampleRefusal {
                sample_number: s.number,
                depth_m: s.initial_depth_m,
                reason: check.reason,
            })
        })
        .collect()
}

/// Run the configured soft-layer, foundation, stress, liquefaction and
/// refusal analyses.
///
/// # Errors
///
/// Propagates invalid `settings` (zero base width or safety factor).
pub fn analyze(
    samples: &[Sample],
    water_table_m: Option<f64>,
    settings: &AnalysisSettings,
) -> SptResult<SoundingAnalysis> {
    let soft_layers = detect_soft_layers(
        samples,
        settings.soft_layer_max_nspt,
        settings.soft_layer_min_thickness_m,
    );
    let foundation = suggest_foundation_depth(
        samples,
        settings.foundation_min_nspt,
        settings.foundation_min_thickness_m,
    );
    let admissible_stress = match &foundation {
        Some(run) => estimate_admissible_stress(
            samples,
            run.depth_from_m,
            settings.base_width_m,
            settings.safety_factor,
        )?,
        None => None,
    };
    let liquefaction = match water_table_m {
        Some(depth) => liquefaction_risk(samples, depth),
        None => Vec::new(),
    };

    Ok(SoundingAnalysis {
        soft_layers,
        foundation,
        admissible_stress,
        liquefaction,
        refusals: refusals(samples, settings.blow_limit),
    })
}
