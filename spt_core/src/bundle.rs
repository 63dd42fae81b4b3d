//! # Sounding Bundle
//!
//! `SoundingBundle` is the unit the engine reads and writes: one sounding with
//! every record the validator, statistics and report need. Bundles serialize to
//! `.spt.json` files as human-readable JSON (see [`crate::file_io`]).
//!
//! ## Structure
//!
//! ```text
//! SoundingBundle
//! ├── meta: BundleMetadata (schema version, timestamps)
//! ├── sounding: Sounding
//! ├── samples: Vec<Sample>
//! ├── layers: Vec<Layer>
//! ├── photos: Vec<Photo>
//! └── company / responsible / work / project (optional records)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use spt_core::bundle::SoundingBundle;
//! use spt_core::sounding::{Sample, Sounding};
//!
//! let mut bundle = SoundingBundle::new(Sounding::new("SP-01"));
//! bundle.samples.push(Sample::new(1, 1.0, Some(2), 3, 4));
//!
//! let copy = bundle.duplicate("SP-02").unwrap();
//! assert_eq!(copy.sounding.code_str(), "SP-02");
//! assert_eq!(copy.samples.len(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SptError, SptResult};
use crate::sounding::{
    Company, Layer, Photo, Project, ResponsibleTechnician, Sample, Sounding, SoundingStatus, Work,
};

/// Current schema version for bundle files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// File header of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl BundleMetadata {
    fn now() -> Self {
        let now = Utc::now();
        BundleMetadata {
            version: SCHEMA_VERSION.to_string(),
            created: now,
            modified: now,
        }
    }
}

/// One sounding and its related records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundingBundle {
    pub meta: BundleMetadata,
    pub sounding: Sounding,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub company: Option<Company>,
    #[serde(default)]
    pub responsible: Option<ResponsibleTechnician>,
    #[serde(default)]
    pub work: Option<Work>,
    #[serde(default)]
    pub project: Option<Project>,
}

impl SoundingBundle {
    pub fn new(sounding: Sounding) -> Self {
        SoundingBundle {
            meta: BundleMetadata::now(),
            sounding,
            samples: Vec::new(),
            layers: Vec::new(),
            photos: Vec::new(),
            company: None,
            responsible: None,
            work: None,
            project: None,
        }
    }

    /// Attach the technical responsible and link it from the sounding.
    pub fn set_responsible(&mut self, responsible: ResponsibleTechnician) {
        self.sounding.responsible_id = Some(responsible.id);
        self.responsible = Some(responsible);
        self.touch();
    }

    /// Attach the work site and link it from the sounding.
    pub fn set_work(&mut self, work: Work) {
        self.sounding.work_id = Some(work.id);
        self.work = Some(work);
        self.touch();
    }

    /// Samples ordered by initial depth
    pub fn samples_by_depth(&self) -> Vec<&Sample> {
        let mut samples: Vec<&Sample> = self.samples.iter().collect();
        samples.sort_by(|a, b| a.initial_depth_m.total_cmp(&b.initial_depth_m));
        samples
    }

    /// Copy this sounding into a fresh draft under a new code.
    ///
    /// Samples and layers are carried over; photos, approval and the last
    /// compliance score are not.
    ///
    /// # Errors
    ///
    /// `MissingField` when `new_code` is blank.
    pub fn duplicate(&self, new_code: &str) -> SptResult<Self> {
        let new_code = new_code.trim();
        if new_code.is_empty() {
            return Err(SptError::missing_field("code"));
        }

        let mut sounding = self.sounding.clone();
        sounding.id = Uuid::new_v4();
        sounding.code = Some(new_code.to_string());
        sounding.status = SoundingStatus::Draft;
        sounding.version = 1;
        sounding.approved_by = None;
        sounding.approved_at = None;
        sounding.compliance_score = None;
        sounding.last_compliance_check = None;

        Ok(SoundingBundle {
            meta: BundleMetadata::now(),
            sounding,
            samples: self.samples.clone(),
            layers: self.layers.clone(),
            photos: Vec::new(),
            company: self.company.clone(),
            responsible: self.responsible.clone(),
            work: self.work.clone(),
            project: self.project.clone(),
        })
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sounding::PhotoKind;

    fn approved_bundle() -> SoundingBundle {
        let mut bundle = SoundingBundle::new(Sounding::new("SP-01"));
        bundle.samples.push(Sample::new(1, 1.0, Some(2), 3, 4));
        bundle.samples.push(Sample::new(2, 2.0, Some(3), 4, 5));
        bundle.layers.push(Layer::new(1, 0.0, 2.5, "argila"));
        bundle.photos.push(Photo::new(1, PhotoKind::EnsaioSpt, "fotos/sp01-1.jpg"));
        bundle.set_responsible(ResponsibleTechnician::new("Ana Souza", "SP-123456", "Eng. Civil"));

        bundle.sounding.version = 3;
        bundle.sounding.compliance_score = Some(92);
        bundle.sounding.submit_for_review().unwrap();
        bundle.sounding.approve(Uuid::new_v4(), Utc::now()).unwrap();
        bundle
    }

    #[test]
    fn test_new_bundle() {
        let bundle = SoundingBundle::new(Sounding::new("SP-01"));
        assert_eq!(bundle.meta.version, SCHEMA_VERSION);
        assert!(bundle.samples.is_empty());
        assert!(bundle.responsible.is_none());
    }

    #[test]
    fn test_set_responsible_links_sounding() {
        let mut bundle = SoundingBundle::new(Sounding::new("SP-01"));
        let responsible = ResponsibleTechnician::new("Ana Souza", "SP-123456", "Eng. Civil");
        let id = responsible.id;
        bundle.set_responsible(responsible);
        assert_eq!(bundle.sounding.responsible_id, Some(id));
    }

    #[test]
    fn test_duplicate_resets_lifecycle() {
        let original = approved_bundle();
        let copy = original.duplicate("SP-01A").unwrap();

        assert_ne!(copy.sounding.id, original.sounding.id);
        assert_eq!(copy.sounding.code_str(), "SP-01A");
        assert_eq!(copy.sounding.status, SoundingStatus::Draft);
        assert_eq!(copy.sounding.version, 1);
        assert!(copy.sounding.approved_by.is_none());
        assert!(copy.sounding.compliance_score.is_none());

        assert_eq!(copy.samples, original.samples);
        assert_eq!(copy.layers, original.layers);
        assert!(copy.photos.is_empty());
        assert_eq!(copy.responsible, original.responsible);
        // Original untouched
        assert_eq!(original.sounding.status, SoundingStatus::Approved);
    }

    #[test]
    fn test_duplicate_requires_code() {
        let err = approved_bundle().duplicate("  ").unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_samples_by_depth() {
        let mut bundle = SoundingBundle::new(Sounding::new("SP-01"));
        bundle.samples.push(Sample::new(2, 2.0, None, 1, 1));
        bundle.samples.push(Sample::new(1, 1.0, None, 1, 1));
        let ordered: Vec<u32> = bundle.samples_by_depth().iter().map(|s| s.number).collect();
        assert_eq!(ordered, vec![1, 2]);
    }

    #[test]
    fn test_bundle_json_round_trip() {
        let bundle = approved_bundle();
        let json = serde_json::to_string_pretty(&bundle).unwrap();
        let parsed: SoundingBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, bundle);
    }
}
