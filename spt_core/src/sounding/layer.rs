//! Stratigraphic layers (camadas) and the NSPT-based state descriptors.

use serde::{Deserialize, Serialize};

/// Consistency of clayey soils, from NSPT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    MuitoMole,
    Mole,
    Media,
    Rija,
    MuitoRija,
    Dura,
}

impl Consistency {
    pub fn code(&self) -> &'static str {
        match self {
            Consistency::MuitoMole => "muito_mole",
            Consistency::Mole => "mole",
            Consistency::Media => "media",
            Consistency::Rija => "rija",
            Consistency::MuitoRija => "muito_rija",
            Consistency::Dura => "dura",
        }
    }

    /// Text used inside layer descriptions
    pub fn display_name(&self) -> &'static str {
        match self {
            Consistency::MuitoMole => "muito mole",
            Consistency::Mole => "mole",
            Consistency::Media => "média",
            Consistency::Rija => "rija",
            Consistency::MuitoRija => "muito rija",
            Consistency::Dura => "dura",
        }
    }
}

/// Compactness of sandy soils, from NSPT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compactness {
    Fofa,
    PoucoCompacta,
    MedianamenteCompacta,
    Compacta,
    MuitoCompacta,
}

impl Compactness {
    pub fn code(&self) -> &'static str {
        match self {
            Compactness::Fofa => "fofa",
            Compactness::PoucoCompacta => "pouco_compacta",
            Compactness::MedianamenteCompacta => "medianamente_compacta",
            Compactness::Compacta => "compacta",
            Compactness::MuitoCompacta => "muito_compacta",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Compactness::Fofa => "fofa",
            Compactness::PoucoCompacta => "pouco compacta",
            Compactness::MedianamenteCompacta => "medianamente compacta",
            Compactness::Compacta => "compacta",
            Compactness::MuitoCompacta => "muito compacta",
        }
    }
}

/// One depth interval of the stratigraphic profile.
///
/// Classification is kept as its raw code: the data layer may hand in codes
/// outside the normative set, and the validator must be able to say so.
/// Use [`crate::soil::SoilClass::from_code`] to get the typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub number: u32,
    pub initial_depth_m: f64,
    pub final_depth_m: f64,

    /// Primary classification code, e.g. "argila_arenosa"
    #[serde(default)]
    pub primary_classification: Option<String>,
    /// Secondary qualifier, free text (e.g. "arenosa")
    #[serde(default)]
    pub secondary_classification: Option<String>,

    /// Soil color as observed in the field
    #[serde(default)]
    pub color: Option<String>,

    /// Clays only
    #[serde(default)]
    pub consistency: Option<Consistency>,
    /// Sands only
    #[serde(default)]
    pub compactness: Option<Compactness>,

    /// Full free-text description (required by NBR 6484:2020 5.2.3)
    #[serde(default)]
    pub description: Option<String>,

    /// Origin code: SR, SA, AT, AO, RO
    #[serde(default)]
    pub origin: Option<String>,
}

impl Layer {
    pub fn new(
        number: u32,
        initial_depth_m: f64,
        final_depth_m: f64,
        classification: impl Into<String>,
    ) -> Self {
        Layer {
            number,
            initial_depth_m,
            final_depth_m,
            primary_classification: Some(classification.into()),
            secondary_classification: None,
            color: None,
            consistency: None,
            compactness: None,
            description: None,
            origin: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn thickness_m(&self) -> f64 {
        self.final_depth_m - self.initial_depth_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_thickness() {
        let layer = Layer::new(1, 1.5, 4.25, "argila");
        assert!((layer.thickness_m() - 2.75).abs() < 1e-9);
    }

    #[test]
    fn test_descriptor_serialization() {
        assert_eq!(serde_json::to_string(&Consistency::MuitoRija).unwrap(), "\"muito_rija\"");
        assert_eq!(
            serde_json::to_string(&Compactness::MedianamenteCompacta).unwrap(),
            "\"medianamente_compacta\""
        );
        assert_eq!(Compactness::PoucoCompacta.display_name(), "pouco compacta");
    }
}
