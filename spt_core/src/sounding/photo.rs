//! Photographic record of a sounding. Consumed by the report, never computed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a photo shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoKind {
    EnsaioSpt,
    Panoramica,
    Equipamento,
    SoloAmostra,
    LocalSondagem,
    #[default]
    Outro,
}

impl PhotoKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            PhotoKind::EnsaioSpt => "Ensaio SPT",
            PhotoKind::Panoramica => "Vista panorâmica",
            PhotoKind::Equipamento => "Equipamento",
            PhotoKind::SoloAmostra => "Amostra de solo",
            PhotoKind::LocalSondagem => "Local da sondagem",
            PhotoKind::Outro => "Outro",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    /// Position in the photographic record
    pub order: u32,
    #[serde(default)]
    pub kind: PhotoKind,
    /// Storage key or path of the image file
    pub file: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude_m: Option<f64>,
    /// Capture time from EXIF, if the camera recorded one
    #[serde(default)]
    pub taken_at: Option<NaiveDateTime>,
}

impl Photo {
    pub fn new(order: u32, kind: PhotoKind, file: impl Into<String>) -> Self {
        Photo {
            id: Uuid::new_v4(),
            order,
            kind,
            file: file.into(),
            original_name: None,
            description: None,
            latitude: None,
            longitude: None,
            altitude_m: None,
            taken_at: None,
        }
    }

    pub fn has_geolocation(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}
