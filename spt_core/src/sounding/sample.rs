//! SPT samples (amostras): one blow-count measurement per test depth.
//!
//! The two NSPT pairs are derived values that are also stored, because the data
//! layer persists them. Every write to a blow count goes through a setter that
//! recomputes both pairs, so a freshly built or edited sample is always
//! consistent. Samples read back from storage may not be; that is what
//! [`crate::validation::validate_sample`] checks.

use serde::{Deserialize, Serialize};

use crate::calculations::nbr;

/// Nominal length of one SPT test section (m)
pub const SECTION_LENGTH_M: f64 = 0.15;
/// Full sampler penetration (cm)
pub const FULL_PENETRATION_CM: f64 = 45.0;

/// How the hole was advanced to the sample depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PerforationType {
    /// Wash boring (trépano e lavagem)
    #[serde(rename = "TH")]
    WashBoring,
    /// Percussion (circulação/revestimento)
    #[default]
    #[serde(rename = "CR")]
    Percussion,
    /// Dry drilling (perfuração a seco)
    #[serde(rename = "PD")]
    DryDrill,
}

impl PerforationType {
    pub fn code(&self) -> &'static str {
        match self {
            PerforationType::WashBoring => "TH",
            PerforationType::Percussion => "CR",
            PerforationType::DryDrill => "PD",
        }
    }
}

/// One SPT measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sequence number, unique within the sounding
    pub number: u32,

    #[serde(default)]
    pub perforation: PerforationType,

    /// Depth where the sampler starts penetrating (m)
    pub initial_depth_m: f64,

    /// Depth at the end of the last 30 cm counted section (m), when recorded
    #[serde(default)]
    pub depth_30cm_end_m: Option<f64>,

    // Blow counts and both pairs only change through the setters below
    #[serde(default)]
    golpes_1a: Option<i32>,
    golpes_2a: i32,
    golpes_3a: i32,
    nspt_1a_2a: i32,
    nspt_2a_3a: i32,

    /// Penetration actually achieved (cm)
    pub penetration_cm: f64,

    /// Refusal criterion met (blow limit reached before 45 cm)
    #[serde(default)]
    pub blow_limit: bool,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Sample {
    /// Create a sample with full 45 cm penetration and derived NSPT pairs.
    pub fn new(
        number: u32,
        initial_depth_m: f64,
        golpes_1a: Option<i32>,
        golpes_2a: i32,
        golpes_3a: i32,
    ) -> Self {
        let mut sample = Sample {
            number,
            perforation: PerforationType::default(),
            initial_depth_m,
            depth_30cm_end_m: None,
            golpes_1a,
            golpes_2a,
            golpes_3a,
            nspt_1a_2a: 0,
            nspt_2a_3a: 0,
            penetration_cm: FULL_PENETRATION_CM,
            blow_limit: false,
            notes: None,
        };
        sample.recompute_nspt();
        sample
    }

    /// Set the achieved penetration and refusal flag (builder style).
    pub fn with_penetration(mut self, penetration_cm: f64, blow_limit: bool) -> Self {
        self.penetration_cm = penetration_cm;
        self.blow_limit = blow_limit;
        self
    }

    pub fn with_perforation(mut self, perforation: PerforationType) -> Self {
        self.perforation = perforation;
        self
    }

    /// Overwrite both stored pairs as read from storage, without recomputing.
    ///
    /// For records whose persisted pairs may have drifted from the blow counts;
    /// [`crate::validation::validate_sample`] reports such drift.
    pub fn with_stored_pairs(mut self, nspt_1a_2a: i32, nspt_2a_3a: i32) -> Self {
        self.nspt_1a_2a = nspt_1a_2a;
        self.nspt_2a_3a = nspt_2a_3a;
        self
    }

    /// Blows for the first 15 cm (seating section), not always recorded
    pub fn golpes_1a(&self) -> Option<i32> {
        self.golpes_1a
    }

    /// Blows for the second 15 cm
    pub fn golpes_2a(&self) -> i32 {
        self.golpes_2a
    }

    /// Blows for the third 15 cm
    pub fn golpes_3a(&self) -> i32 {
        self.golpes_3a
    }

    /// Stored first pair: golpes_1a + golpes_2a
    pub fn nspt_1a_2a(&self) -> i32 {
        self.nspt_1a_2a
    }

    /// Stored NSPT: golpes_2a + golpes_3a
    pub fn nspt_2a_3a(&self) -> i32 {
        self.nspt_2a_3a
    }

    /// Replace all three blow counts.
    pub fn set_blows(&mut self, golpes_1a: Option<i32>, golpes_2a: i32, golpes_3a: i32) {
        self.golpes_1a = golpes_1a;
        self.golpes_2a = golpes_2a;
        self.golpes_3a = golpes_3a;
        self.recompute_nspt();
    }

    pub fn set_first(&mut self, golpes_1a: Option<i32>) {
        self.golpes_1a = golpes_1a;
        self.recompute_nspt();
    }

    pub fn set_second(&mut self, golpes_2a: i32) {
        self.golpes_2a = golpes_2a;
        self.recompute_nspt();
    }

    pub fn set_third(&mut self, golpes_3a: i32) {
        self.golpes_3a = golpes_3a;
        self.recompute_nspt();
    }

    /// Bring both stored pairs back in line with the blow counts.
    pub fn recompute_nspt(&mut self) {
        self.nspt_1a_2a = self.computed_first_pair();
        self.nspt_2a_3a = self.computed_nspt();
    }

    /// NSPT recomputed from the blow counts (ignores the stored value)
    pub fn computed_nspt(&self) -> i32 {
        nbr::nspt(self.golpes_2a, self.golpes_3a)
    }

    /// First pair recomputed from the blow counts; a missing first count is zero
    pub fn computed_first_pair(&self) -> i32 {
        self.golpes_1a.unwrap_or(0) + self.golpes_2a
    }

    /// End of the counted 30 cm: the stored depth, or initial + 0.30 m
    pub fn depth_range_end_m(&self) -> f64 {
        self.depth_30cm_end_m
            .unwrap_or(self.initial_depth_m + 2.0 * SECTION_LENGTH_M)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sample_derives_pairs() {
        let sample = Sample::new(1, 1.0, Some(3), 4, 5);
        assert_eq!(sample.nspt_1a_2a(), 7);
        assert_eq!(sample.nspt_2a_3a(), 9);
        assert_eq!(sample.penetration_cm, 45.0);
        assert!(!sample.blow_limit);
    }

    #[test]
    fn test_missing_first_section_counts_as_zero() {
        let sample = Sample::new(1, 1.0, None, 4, 5);
        assert_eq!(sample.nspt_1a_2a(), 4);
        assert_eq!(sample.nspt_2a_3a(), 9);
    }

    #[test]
    fn test_recompute_on_second_section_update() {
        let mut sample = Sample::new(2, 2.0, Some(2), 3, 4);
        sample.set_second(10);
        assert_eq!(sample.nspt_2a_3a(), 14);
        assert_eq!(sample.nspt_1a_2a(), 12);
        assert_eq!(sample.nspt_2a_3a(), sample.golpes_2a() + sample.golpes_3a());
    }

    #[test]
    fn test_recompute_on_third_section_update() {
        let mut sample = Sample::new(3, 3.0, Some(2), 3, 4);
        sample.set_third(20);
        assert_eq!(sample.nspt_2a_3a(), 23);
        assert_eq!(sample.nspt_1a_2a(), 5);
    }

    #[test]
    fn test_recompute_on_first_section_and_bulk_update() {
        let mut sample = Sample::new(4, 4.0, None, 3, 4);
        sample.set_first(Some(6));
        assert_eq!(sample.nspt_1a_2a(), 9);

        sample.set_blows(Some(1), 1, 1);
        assert_eq!(sample.nspt_1a_2a(), 2);
        assert_eq!(sample.nspt_2a_3a(), 2);
    }

    #[test]
    fn test_every_blow_write_keeps_nspt_invariant() {
        let mut sample = Sample::new(1, 1.0, None, 3, 4);
        sample.set_second(10);
        sample.set_third(2);
        sample.set_first(Some(5));
        assert_eq!(sample.nspt_2a_3a(), sample.golpes_2a() + sample.golpes_3a());
        assert_eq!(sample.nspt_2a_3a(), 12);
        assert_eq!(sample.nspt_1a_2a(), 15);
    }

    #[test]
    fn test_stored_pairs_kept_verbatim() {
        let sample = Sample::new(1, 1.0, Some(1), 4, 5).with_stored_pairs(3, 20);
        assert_eq!(sample.nspt_1a_2a(), 3);
        assert_eq!(sample.nspt_2a_3a(), 20);
        assert_eq!(sample.computed_nspt(), 9);
    }

    #[test]
    fn test_inconsistent_stored_pairs_survive_json() {
        let json = r#"{
            "number": 1,
            "initial_depth_m": 1.0,
            "golpes_1a": null,
            "golpes_2a": 4,
            "golpes_3a": 5,
            "nspt_1a_2a": 4,
            "nspt_2a_3a": 12,
            "penetration_cm": 45.0
        }"#;
        let sample: Sample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.golpes_2a(), 4);
        assert_eq!(sample.nspt_2a_3a(), 12);
        assert_eq!(sample.computed_nspt(), 9);
    }

    #[test]
    fn test_depth_range_end() {
        let mut sample = Sample::new(1, 1.0, None, 1, 1);
        assert!((sample.depth_range_end_m() - 1.30).abs() < 1e-9);
        sample.depth_30cm_end_m = Some(1.45);
        assert!((sample.depth_range_end_m() - 1.45).abs() < 1e-9);
    }

    #[test]
    fn test_perforation_serialization() {
        let json = serde_json::to_string(&PerforationType::WashBoring).unwrap();
        assert_eq!(json, "\"TH\"");
        let parsed: PerforationType = serde_json::from_str("\"PD\"").unwrap();
        assert_eq!(parsed, PerforationType::DryDrill);
    }
}
