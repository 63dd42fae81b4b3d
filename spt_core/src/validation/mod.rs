//! # NBR 6484:2020 Validation
//!
//! Compliance checks for a sounding and its samples and layers.
//!
//! Noncompliance is data, never an `Err`: every check lands as a message in the
//! returned result. Errors block compliance; warnings only cost score.
//!
//! - [`validate_sounding`] - weighted 0-100 score over six check phases
//! - [`validate_sample`] / [`validate_layer`] - independent per-item checks
//! - [`review_sounding`] - all of the above in one report
//!
//! ## Example
//!
//! ```rust
//! use spt_core::sounding::Sounding;
//! use spt_core::validation::validate_sounding;
//!
//! let sounding = Sounding::new("SP-01");
//! let result = validate_sounding(&sounding);
//! assert!(!result.conforme);
//! assert!(result.score <= 100);
//! ```

mod items;
mod sounding;

pub use items::{validate_layer, validate_sample};
pub use sounding::validate_sounding;

use serde::{Deserialize, Serialize};

use crate::sounding::{Layer, Sample, Sounding};

/// Outcome of validating a whole sounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    /// True iff there are no errors; warnings do not count
    pub conforme: bool,
    /// 100 minus penalties, clamped to 0..=100
    pub score: u8,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Outcome of validating one sample or layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemValidation {
    pub valido: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ItemValidation {
    pub(crate) fn from_messages(errors: Vec<String>, warnings: Vec<String>) -> Self {
        ItemValidation {
            valido: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validation of one numbered item (sample or layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    pub number: u32,
    #[serde(flatten)]
    pub result: ItemValidation,
}

/// Sounding compliance plus every sample and layer check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundingReview {
    pub compliance: ComplianceResult,
    pub samples: Vec<ItemReport>,
    pub layers: Vec<ItemReport>,
}

impl SoundingReview {
    /// True when the sounding conforms and no sample or layer has an error
    pub fn all_valid(&self) -> bool {
        self.compliance.conforme
            && self.samples.iter().all(|s| s.result.valido)
            && self.layers.iter().all(|l| l.result.valido)
    }

    pub fn error_count(&self) -> usize {
        self.compliance.errors.len()
            + self.samples.iter().map(|s| s.result.errors.len()).sum::<usize>()
            + self.layers.iter().map(|l| l.result.errors.len()).sum::<usize>()
    }

    pub fn warning_count(&self) -> usize {
        self.compliance.warnings.len()
            + self.samples.iter().map(|s| s.result.warnings.len()).sum::<usize>()
            + self.layers.iter().map(|l| l.result.warnings.len()).sum::<usize>()
    }
}

/// Validate a sounding together with its samples and layers.
pub fn review_sounding(
    sounding: &Sounding,
    samples: &[Sample],
    layers: &[Layer],
) -> SoundingReview {
    SoundingReview {
        compliance: validate_sounding(sounding),
        samples: samples
            .iter()
            .map(|s| ItemReport {
                number: s.number,
                result: validate_sample(s),
            })
            .collect(),
        layers: layers
            .iter()
            .map(|l| ItemReport {
                number: l.number,
                result: validate_layer(l),
            })
            .collect(),
    }
}
