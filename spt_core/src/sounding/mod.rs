//! # Sounding Entities
//!
//! In-memory value objects for one SPT borehole and everything attached to it.
//! Persistence is someone else's problem: these types are what the data layer
//! hands in and what the validator, statistics and report assembler read.
//!
//! ```text
//! Sounding
//! ├── equipment: SptEquipment (hammer, drop height, sampler, casing, auger)
//! ├── water_table_initial / water_table_final: WaterTableReading
//! ├── status: SoundingStatus (draft -> under_review -> approved | rejected)
//! └── related by id: Sample[], Layer[], Photo[], Work, ResponsibleTechnician
//! ```
//!
//! ## Example
//!
//! ```rust
//! use spt_core::sounding::{Sounding, SoundingStatus};
//!
//! let mut sounding = Sounding::new("SP-01");
//! sounding.final_depth_m = Some(25.0);
//! assert_eq!(sounding.status, SoundingStatus::Draft);
//!
//! sounding.submit_for_review().unwrap();
//! assert_eq!(sounding.status, SoundingStatus::UnderReview);
//! ```

pub mod layer;
pub mod parties;
pub mod photo;
pub mod sample;

pub use layer::{Compactness, Consistency, Layer};
pub use parties::{Company, Project, ResponsibleTechnician, Work, DEFAULT_DATUM};
pub use photo::{Photo, PhotoKind};
pub use sample::{PerforationType, Sample};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SptError, SptResult};
use crate::validation::ComplianceResult;

/// Nominal hammer weight per NBR 6484:2020 (kgf)
pub const NOMINAL_HAMMER_WEIGHT_KGF: f64 = 65.0;
/// Nominal drop height per NBR 6484:2020 (cm)
pub const NOMINAL_DROP_HEIGHT_CM: f64 = 75.0;
/// Nominal sampler external diameter (mm)
pub const NOMINAL_SAMPLER_EXTERNAL_MM: f64 = 50.8;
/// Nominal sampler internal diameter (mm)
pub const NOMINAL_SAMPLER_INTERNAL_MM: f64 = 34.9;
/// Soundings stopped above this depth must justify the stop (m)
pub const MIN_DEPTH_WITHOUT_JUSTIFICATION_M: f64 = 20.0;

/// Lifecycle status of a sounding.
///
/// Allowed moves: draft -> under_review -> approved | rejected, rejected -> draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundingStatus {
    #[default]
    Draft,
    UnderReview,
    Approved,
    Rejected,
}

impl SoundingStatus {
    pub fn code(&self) -> &'static str {
        match self {
            SoundingStatus::Draft => "draft",
            SoundingStatus::UnderReview => "under_review",
            SoundingStatus::Approved => "approved",
            SoundingStatus::Rejected => "rejected",
        }
    }

    /// Label printed on reports
    pub fn display_name(&self) -> &'static str {
        match self {
            SoundingStatus::Draft => "Rascunho",
            SoundingStatus::UnderReview => "Em análise",
            SoundingStatus::Approved => "Aprovado",
            SoundingStatus::Rejected => "Rejeitado",
        }
    }

    pub fn can_transition_to(&self, next: SoundingStatus) -> bool {
        matches!(
            (self, next),
            (SoundingStatus::Draft, SoundingStatus::UnderReview)
                | (SoundingStatus::UnderReview, SoundingStatus::Approved)
                | (SoundingStatus::UnderReview, SoundingStatus::Rejected)
                | (SoundingStatus::Rejected, SoundingStatus::Draft)
        )
    }
}

impl std::fmt::Display for SoundingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Percussion system driving the hammer.
///
/// Stored on the sounding as its raw code so that unrecognized values survive
/// the trip from the data layer; see [`crate::calculations::nbr::efficiency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercussionSystem {
    Manual,
    Mecanico,
}

impl PercussionSystem {
    pub fn code(&self) -> &'static str {
        match self {
            PercussionSystem::Manual => "manual",
            PercussionSystem::Mecanico => "mecanico",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "manual" => Some(PercussionSystem::Manual),
            "mecanico" | "mecânico" => Some(PercussionSystem::Mecanico),
            _ => None,
        }
    }
}

/// Drilling and sampling equipment used on a sounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SptEquipment {
    /// Hammer weight (kgf)
    pub hammer_weight_kgf: f64,
    /// Hammer drop height (cm)
    pub drop_height_cm: f64,
    /// Sampler external diameter (mm)
    pub sampler_external_mm: f64,
    /// Sampler internal diameter (mm)
    pub sampler_internal_mm: f64,
    /// Casing diameter (mm)
    #[serde(default)]
    pub casing_diameter_mm: Option<f64>,
    /// Auger diameter (mm)
    #[serde(default)]
    pub auger_diameter_mm: Option<f64>,
    /// Percussion system code ("manual" or "mecanico")
    pub percussion_system: String,
}

impl Default for SptEquipment {
    fn default() -> Self {
        SptEquipment {
            hammer_weight_kgf: NOMINAL_HAMMER_WEIGHT_KGF,
            drop_height_cm: NOMINAL_DROP_HEIGHT_CM,
            sampler_external_mm: NOMINAL_SAMPLER_EXTERNAL_MM,
            sampler_internal_mm: NOMINAL_SAMPLER_INTERNAL_MM,
            casing_diameter_mm: None,
            auger_diameter_mm: None,
            percussion_system: PercussionSystem::Manual.code().to_string(),
        }
    }
}

/// One water-table observation (initial or final).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterTableReading {
    pub present: bool,
    #[serde(default)]
    pub depth_m: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl WaterTableReading {
    pub fn present_at(depth_m: f64) -> Self {
        WaterTableReading {
            present: true,
            depth_m: Some(depth_m),
            date: None,
        }
    }

    /// Depth of the water table, only when it was actually observed
    pub fn observed_depth(&self) -> Option<f64> {
        if self.present {
            self.depth_m
        } else {
            None
        }
    }
}

/// One SPT borehole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sounding {
    pub id: Uuid,

    /// Work (obra) this sounding belongs to
    #[serde(default)]
    pub work_id: Option<Uuid>,

    /// Technical responsible (engineer of record)
    #[serde(default)]
    pub responsible_id: Option<Uuid>,

    /// Sounding code, e.g. "SP-01"
    #[serde(default)]
    pub code: Option<String>,

    /// Client-side identification of the borehole
    #[serde(default)]
    pub client_reference: Option<String>,

    #[serde(default)]
    pub execution_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,

    /// Driller (sondador) name
    #[serde(default)]
    pub driller: Option<String>,
    /// Drilling crew helpers
    #[serde(default)]
    pub helpers: Option<String>,

    /// UTM easting (m)
    #[serde(default)]
    pub easting_m: Option<f64>,
    /// UTM northing (m)
    #[serde(default)]
    pub northing_m: Option<f64>,
    /// Ground-surface elevation at the borehole mouth (m)
    #[serde(default)]
    pub ground_elevation_m: Option<f64>,

    #[serde(default)]
    pub water_table_initial: WaterTableReading,
    #[serde(default)]
    pub water_table_final: WaterTableReading,

    #[serde(default)]
    pub casing_depth_m: Option<f64>,
    #[serde(default)]
    pub auger_depth_m: Option<f64>,
    #[serde(default)]
    pub final_depth_m: Option<f64>,

    #[serde(default)]
    pub equipment: SptEquipment,

    #[serde(default)]
    pub general_remarks: Option<String>,
    /// Why drilling stopped (required when final depth < 20 m)
    #[serde(default)]
    pub paralysis_remarks: Option<String>,

    /// Revision number, bumped on re-issue
    pub version: u32,
    #[serde(default)]
    pub status: SoundingStatus,
    #[serde(default)]
    pub approved_by: Option<Uuid>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,

    /// Last computed compliance score (0-100), None until validated
    #[serde(default)]
    pub compliance_score: Option<u8>,
    #[serde(default)]
    pub last_compliance_check: Option<DateTime<Utc>>,
}

impl Sounding {
    /// Create a draft sounding with nominal NBR equipment.
    pub fn new(code: impl Into<String>) -> Self {
        Sounding {
            id: Uuid::new_v4(),
            work_id: None,
            responsible_id: None,
            code: Some(code.into()),
            client_reference: None,
            execution_date: None,
            start_time: None,
            end_time: None,
            driller: None,
            helpers: None,
            easting_m: None,
            northing_m: None,
            ground_elevation_m: None,
            water_table_initial: WaterTableReading::default(),
            water_table_final: WaterTableReading::default(),
            casing_depth_m: None,
            auger_depth_m: None,
            final_depth_m: None,
            equipment: SptEquipment::default(),
            general_remarks: None,
            paralysis_remarks: None,
            version: 1,
            status: SoundingStatus::Draft,
            approved_by: None,
            approved_at: None,
            compliance_score: None,
            last_compliance_check: None,
        }
    }

    /// Sounding code, or an empty string when not yet assigned
    pub fn code_str(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }

    /// Depth used for water-dependent corrections: the final reading wins,
    /// falling back to the initial one.
    pub fn water_table_depth(&self) -> Option<f64> {
        self.water_table_final
            .observed_depth()
            .or_else(|| self.water_table_initial.observed_depth())
    }

    /// Whether the stop depth requires a written justification
    pub fn requires_paralysis_justification(&self) -> bool {
        match self.final_depth_m {
            Some(depth) => depth < MIN_DEPTH_WITHOUT_JUSTIFICATION_M,
            None => true,
        }
    }

    fn transition(&mut self, next: SoundingStatus) -> SptResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(SptError::InvalidTransition {
                from: self.status.code().to_string(),
                to: next.code().to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn submit_for_review(&mut self) -> SptResult<()> {
        self.transition(SoundingStatus::UnderReview)
    }

    /// Approve the sounding, recording who approved it and when.
    pub fn approve(&mut self, approver: Uuid, at: DateTime<Utc>) -> SptResult<()> {
        self.transition(SoundingStatus::Approved)?;
        self.approved_by = Some(approver);
        self.approved_at = Some(at);
        Ok(())
    }

    pub fn reject(&mut self) -> SptResult<()> {
        self.transition(SoundingStatus::Rejected)
    }

    /// Send a rejected sounding back to draft for correction.
    pub fn reopen(&mut self) -> SptResult<()> {
        self.transition(SoundingStatus::Draft)
    }

    /// Store the score of a validation pass. Persisting it is up to the caller.
    pub fn record_compliance(&mut self, result: &ComplianceResult, at: DateTime<Utc>) {
        self.compliance_score = Some(result.score);
        self.last_compliance_check = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sounding_defaults() {
        let sounding = Sounding::new("SP-01");
        assert_eq!(sounding.code_str(), "SP-01");
        assert_eq!(sounding.status, SoundingStatus::Draft);
        assert_eq!(sounding.version, 1);
        assert_eq!(sounding.equipment.hammer_weight_kgf, 65.0);
        assert_eq!(sounding.equipment.percussion_system, "manual");
        assert!(sounding.compliance_score.is_none());
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let mut sounding = Sounding::new("SP-01");
        sounding.submit_for_review().unwrap();
        let approver = Uuid::new_v4();
        let now = Utc::now();
        sounding.approve(approver, now).unwrap();
        assert_eq!(sounding.status, SoundingStatus::Approved);
        assert_eq!(sounding.approved_by, Some(approver));
        assert_eq!(sounding.approved_at, Some(now));
    }

    #[test]
    fn test_rejected_goes_back_to_draft() {
        let mut sounding = Sounding::new("SP-02");
        sounding.submit_for_review().unwrap();
        sounding.reject().unwrap();
        sounding.reopen().unwrap();
        assert_eq!(sounding.status, SoundingStatus::Draft);
    }

    #[test]
    fn test_illegal_transitions() {
        let mut sounding = Sounding::new("SP-03");
        assert!(sounding.approve(Uuid::new_v4(), Utc::now()).is_err());
        assert!(sounding.reject().is_err());
        assert!(sounding.reopen().is_err());

        sounding.submit_for_review().unwrap();
        sounding.approve(Uuid::new_v4(), Utc::now()).unwrap();
        let err = sounding.reopen().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(sounding.status, SoundingStatus::Approved);
    }

    #[test]
    fn test_water_table_depth_prefers_final_reading() {
        let mut sounding = Sounding::new("SP-04");
        assert_eq!(sounding.water_table_depth(), None);

        sounding.water_table_initial = WaterTableReading::present_at(3.2);
        assert_eq!(sounding.water_table_depth(), Some(3.2));

        sounding.water_table_final = WaterTableReading::present_at(2.8);
        assert_eq!(sounding.water_table_depth(), Some(2.8));

        // A depth recorded while flagged absent is not an observation
        sounding.water_table_final.present = false;
        assert_eq!(sounding.water_table_depth(), Some(3.2));
    }

    #[test]
    fn test_paralysis_justification_threshold() {
        let mut sounding = Sounding::new("SP-05");
        assert!(sounding.requires_paralysis_justification());
        sounding.final_depth_m = Some(15.0);
        assert!(sounding.requires_paralysis_justification());
        sounding.final_depth_m = Some(20.0);
        assert!(!sounding.requires_paralysis_justification());
    }

    #[test]
    fn test_percussion_system_codes() {
        assert_eq!(PercussionSystem::from_code("Manual"), Some(PercussionSystem::Manual));
        assert_eq!(PercussionSystem::from_code("mecânico"), Some(PercussionSystem::Mecanico));
        assert_eq!(PercussionSystem::from_code("hidraulico"), None);
    }

    #[test]
    fn test_sounding_serialization() {
        let mut sounding = Sounding::new("SP-06");
        sounding.final_depth_m = Some(18.45);
        sounding.status = SoundingStatus::UnderReview;
        let json = serde_json::to_string_pretty(&sounding).unwrap();
        assert!(json.contains("\"under_review\""));
        let roundtrip: Sounding = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, sounding);
    }
}
