//! # Soil Classifier
//!
//! Static tables for the soil classes used in SPT profiles (NBR 6502 /
//! NBR 13441): display names, legend colors for the profile drawing, origin
//! descriptions, typical grain-size composition, and a heuristic classification
//! suggestion from NSPT.
//!
//! Layers store their classification as a raw code, so every lookup has a
//! raw-code variant that degrades gracefully for codes outside the table.
//!
//! ## Example
//!
//! ```rust
//! use spt_core::soil::{self, SoilClass};
//!
//! assert_eq!(SoilClass::ArgilaArenosa.legend_color(), "#A0522D");
//! assert_eq!(soil::color_for("argila"), "#8B4513");
//! assert_eq!(soil::color_for("lava"), "#CCCCCC");
//!
//! let hints = soil::suggest_classification(3, None);
//! assert_eq!(hints[0].soil_type, SoilClass::Areia);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sounding::{Compactness, Consistency, Layer};

/// Legend color for codes outside the table
pub const FALLBACK_COLOR: &str = "#CCCCCC";

/// Normative soil classification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilClass {
    Argila,
    Silte,
    Areia,
    Pedregulho,
    ArgilaArenosa,
    ArgilaSiltosa,
    ArgilaSiltoArenosa,
    SilteArenoso,
    SilteArgiloso,
    SilteArgiloArenoso,
    AreiaArgilosa,
    AreiaSiltosa,
    AreiaSiltoArgilosa,
    Aterro,
    Turfa,
    MateriaOrganica,
    Rocha,
    Vegetacao,
    Expurgo,
}

impl SoilClass {
    /// All classes, in legend order
    pub const ALL: [SoilClass; 19] = [
        SoilClass::Argila,
        SoilClass::Silte,
        SoilClass::Areia,
        SoilClass::Pedregulho,
        SoilClass::ArgilaArenosa,
        SoilClass::ArgilaSiltosa,
        SoilClass::ArgilaSiltoArenosa,
        SoilClass::SilteArenoso,
        SoilClass::SilteArgiloso,
        SoilClass::SilteArgiloArenoso,
        SoilClass::AreiaArgilosa,
        SoilClass::AreiaSiltosa,
        SoilClass::AreiaSiltoArgilosa,
        SoilClass::Aterro,
        SoilClass::Turfa,
        SoilClass::MateriaOrganica,
        SoilClass::Rocha,
        SoilClass::Vegetacao,
        SoilClass::Expurgo,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SoilClass::Argila => "argila",
            SoilClass::Silte => "silte",
            SoilClass::Areia => "areia",
            SoilClass::Pedregulho => "pedregulho",
            SoilClass::ArgilaArenosa => "argila_arenosa",
            SoilClass::ArgilaSiltosa => "argila_siltosa",
            SoilClass::ArgilaSiltoArenosa => "argila_silto_arenosa",
            SoilClass::SilteArenoso => "silte_arenoso",
            SoilClass::SilteArgiloso => "silte_argiloso",
            SoilClass::SilteArgiloArenoso => "silte_argilo_arenoso",
            SoilClass::AreiaArgilosa => "areia_argilosa",
            SoilClass::AreiaSiltosa => "areia_siltosa",
            SoilClass::AreiaSiltoArgilosa => "areia_silto_argilosa",
            SoilClass::Aterro => "aterro",
            SoilClass::Turfa => "turfa",
            SoilClass::MateriaOrganica => "materia_organica",
            SoilClass::Rocha => "rocha",
            SoilClass::Vegetacao => "vegetacao",
            SoilClass::Expurgo => "expurgo",
        }
    }

    /// Exact code lookup; `None` for anything outside the table.
    pub fn from_code(code: &str) -> Option<Self> {
        SoilClass::ALL.into_iter().find(|class| class.code() == code)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SoilClass::Argila => "Argila",
            SoilClass::Silte => "Silte",
            SoilClass::Areia => "Areia",
            SoilClass::Pedregulho => "Pedregulho",
            SoilClass::ArgilaArenosa => "Argila Arenosa",
            SoilClass::ArgilaSiltosa => "Argila Siltosa",
            SoilClass::ArgilaSiltoArenosa => "Argila Silto-Arenosa",
            SoilClass::SilteArenoso => "Silte Arenoso",
            SoilClass::SilteArgiloso => "Silte Argiloso",
            SoilClass::SilteArgiloArenoso => "Silte Argilo-Arenoso",
            SoilClass::AreiaArgilosa => "Areia Argilosa",
            SoilClass::AreiaSiltosa => "Areia Siltosa",
            SoilClass::AreiaSiltoArgilosa => "Areia Silto-Argilosa",
            SoilClass::Aterro => "Aterro",
            SoilClass::Turfa => "Turfa",
            SoilClass::MateriaOrganica => "Matéria Orgânica",
            SoilClass::Rocha => "Rocha",
            SoilClass::Vegetacao => "Vegetação",
            SoilClass::Expurgo => "Expurgo",
        }
    }

    /// Hex color used for this class in the profile legend (NBR 13441)
    pub fn legend_color(&self) -> &'static str {
        match self {
            SoilClass::Argila => "#8B4513",
            SoilClass::Silte => "#D2B48C",
            SoilClass::Areia => "#F4A460",
            SoilClass::Pedregulho => "#A9A9A9",
            SoilClass::ArgilaArenosa => "#A0522D",
            SoilClass::ArgilaSiltosa => "#CD853F",
            SoilClass::ArgilaSiltoArenosa => "#B8860B",
            SoilClass::SilteArenoso => "#DEB887",
            SoilClass::SilteArgiloso => "#BC8F8F",
            SoilClass::SilteArgiloArenoso => "#D2691E",
            SoilClass::AreiaArgilosa => "#DAA520",
            SoilClass::AreiaSiltosa => "#F0E68C",
            SoilClass::AreiaSiltoArgilosa => "#EEE8AA",
            SoilClass::Aterro => "#696969",
            SoilClass::Turfa => "#2F4F4F",
            SoilClass::MateriaOrganica => "#3B3B3B",
            SoilClass::Rocha => "#708090",
            SoilClass::Vegetacao => "#228B22",
            SoilClass::Expurgo => "#FFFFFF",
        }
    }

    pub fn group(&self) -> SoilGroup {
        match self {
            SoilClass::Argila
            | SoilClass::Silte
            | SoilClass::ArgilaSiltosa
            | SoilClass::SilteArgiloso => SoilGroup::Finos,
            SoilClass::Areia
            | SoilClass::AreiaSiltosa
            | SoilClass::AreiaArgilosa
            | SoilClass::AreiaSiltoArgilosa => SoilGroup::Arenosos,
            SoilClass::ArgilaArenosa
            | SoilClass::ArgilaSiltoArenosa
            | SoilClass::SilteArenoso
            | SoilClass::SilteArgiloArenoso => SoilGroup::Mistos,
            SoilClass::Pedregulho => SoilGroup::Grossos,
            SoilClass::Aterro
            | SoilClass::Turfa
            | SoilClass::MateriaOrganica
            | SoilClass::Rocha
            | SoilClass::Vegetacao
            | SoilClass::Expurgo => SoilGroup::Especiais,
        }
    }

    /// Typical grain-size split in percent, largest fraction first.
    ///
    /// Empty for classes without a representative composition.
    pub fn grain_size_composition(&self) -> &'static [(&'static str, u8)] {
        match self {
            SoilClass::Argila => &[("argila", 60), ("silte", 30), ("areia", 10)],
            SoilClass::Silte => &[("silte", 60), ("argila", 20), ("areia", 20)],
            SoilClass::Areia => &[("areia", 80), ("silte", 15), ("argila", 5)],
            SoilClass::Pedregulho => &[("pedregulho", 70), ("areia", 25), ("finos", 5)],
            SoilClass::ArgilaArenosa => &[("argila", 50), ("areia", 35), ("silte", 15)],
            SoilClass::ArgilaSiltosa => &[("argila", 50), ("silte", 35), ("areia", 15)],
            SoilClass::SilteArenoso => &[("silte", 50), ("areia", 40), ("argila", 10)],
            SoilClass::AreiaSiltosa => &[("areia", 60), ("silte", 30), ("argila", 10)],
            SoilClass::AreiaArgilosa => &[("areia", 60), ("argila", 25), ("silte", 15)],
            _ => &[],
        }
    }
}

impl fmt::Display for SoilClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Grouping used by the classification pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilGroup {
    Finos,
    Arenosos,
    Mistos,
    Grossos,
    Especiais,
}

impl SoilGroup {
    pub const ALL: [SoilGroup; 5] = [
        SoilGroup::Finos,
        SoilGroup::Arenosos,
        SoilGroup::Mistos,
        SoilGroup::Grossos,
        SoilGroup::Especiais,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SoilGroup::Finos => "Finos",
            SoilGroup::Arenosos => "Arenosos",
            SoilGroup::Mistos => "Mistos",
            SoilGroup::Grossos => "Grossos",
            SoilGroup::Especiais => "Especiais",
        }
    }

    pub fn members(&self) -> Vec<SoilClass> {
        SoilClass::ALL.into_iter().filter(|c| c.group() == *self).collect()
    }
}

/// Geological origin of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilOrigin {
    #[serde(rename = "SR")]
    Residual,
    #[serde(rename = "SA")]
    Alluvial,
    #[serde(rename = "AT")]
    Fill,
    #[serde(rename = "AO")]
    OrganicClay,
    #[serde(rename = "RO")]
    Rock,
}

impl SoilOrigin {
    pub const ALL: [SoilOrigin; 5] = [
        SoilOrigin::Residual,
        SoilOrigin::Alluvial,
        SoilOrigin::Fill,
        SoilOrigin::OrganicClay,
        SoilOrigin::Rock,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SoilOrigin::Residual => "SR",
            SoilOrigin::Alluvial => "SA",
            SoilOrigin::Fill => "AT",
            SoilOrigin::OrganicClay => "AO",
            SoilOrigin::Rock => "RO",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        SoilOrigin::ALL.into_iter().find(|o| o.code() == code)
    }

    pub fn description(&self) -> &'static str {
        match self {
            SoilOrigin::Residual => "Solo Residual",
            SoilOrigin::Alluvial => "Solo Aluvionar",
            SoilOrigin::Fill => "Aterro",
            SoilOrigin::OrganicClay => "Argila Orgânica",
            SoilOrigin::Rock => "Rocha",
        }
    }
}

/// Whether `code` is one of the normative classification codes.
pub fn is_valid_classification(code: &str) -> bool {
    SoilClass::from_code(code).is_some()
}

/// Legend color for a raw code, [`FALLBACK_COLOR`] when unknown.
pub fn color_for(code: &str) -> &'static str {
    SoilClass::from_code(code).map_or(FALLBACK_COLOR, |c| c.legend_color())
}

/// Display name for a raw code; unknown codes are echoed back.
pub fn name_for(code: &str) -> String {
    SoilClass::from_code(code).map_or_else(|| code.to_string(), |c| c.display_name().to_string())
}

/// Origin description for a raw code; unknown codes are echoed back.
pub fn origin_description(code: &str) -> String {
    SoilOrigin::from_code(code).map_or_else(|| code.to_string(), |o| o.description().to_string())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Build the running-text description of a layer from its structured fields.
///
/// `"Argila, com arenosa, vermelha, rija, (Solo Residual)"`
pub fn compose_description(layer: &Layer) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(code) = non_empty(&layer.primary_classification) {
        parts.push(name_for(code));
    }
    if let Some(secondary) = non_empty(&layer.secondary_classification) {
        parts.push(format!("com {}", secondary.to_lowercase()));
    }
    if let Some(color) = non_empty(&layer.color) {
        parts.push(color.to_lowercase());
    }
    if let Some(consistency) = layer.consistency {
        parts.push(consistency.display_name().to_string());
    }
    if let Some(compactness) = layer.compactness {
        parts.push(compactness.display_name().to_string());
    }
    if let Some(origin) = non_empty(&layer.origin) {
        parts.push(format!("({})", origin_description(origin)));
    }

    parts.join(", ")
}

/// State descriptor attached to a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilDescriptor {
    Compactness(Compactness),
    Consistency(Consistency),
}

/// One candidate classification for an NSPT value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSuggestion {
    pub soil_type: SoilClass,
    pub secondary: Option<String>,
    pub descriptor: Option<SoilDescriptor>,
    /// Heuristic confidence (%), not a probability distribution
    pub probability: u8,
}

fn candidate(
    soil_type: SoilClass,
    secondary: Option<&str>,
    descriptor: Option<SoilDescriptor>,
    probability: u8,
) -> ClassificationSuggestion {
    ClassificationSuggestion {
        soil_type,
        secondary: secondary.map(str::to_string),
        descriptor,
        probability,
    }
}

/// Candidate classifications for an NSPT value.
///
/// Four bands (<= 4, <= 10, <= 30, > 30), each with two or three weighted
/// candidates. Candidates whose soil type is named in `visual_hint` come
/// first; otherwise, and among equals, higher weight first.
pub fn suggest_classification(
    nspt: i32,
    visual_hint: Option<&str>,
) -> Vec<ClassificationSuggestion> {
    use SoilDescriptor::{Compactness as Cp, Consistency as Cs};

    let mut candidates = match nspt {
        n if n <= 4 => vec![
            candidate(SoilClass::Areia, None, Some(Cp(Compactness::Fofa)), 60),
            candidate(SoilClass::Argila, None, Some(Cs(Consistency::MuitoMole)), 40),
        ],
        n if n <= 10 => vec![
            candidate(
                SoilClass::Areia,
                Some("siltosa"),
                Some(Cp(Compactness::MedianamenteCompacta)),
                50,
            ),
            candidate(SoilClass::Argila, Some("arenosa"), Some(Cs(Consistency::Media)), 50),
        ],
        n if n <= 30 => vec![
            candidate(SoilClass::Areia, None, Some(Cp(Compactness::Compacta)), 70),
            candidate(SoilClass::Argila, Some("arenosa"), Some(Cs(Consistency::Rija)), 30),
        ],
        _ => vec![
            candidate(
                SoilClass::Areia,
                Some("pedregulhosa"),
                Some(Cp(Compactness::MuitoCompacta)),
                60,
            ),
            candidate(SoilClass::Argila, None, Some(Cs(Consistency::Dura)), 20),
            candidate(SoilClass::Rocha, Some("alterada"), None, 20),
        ],
    };

    let hint = visual_hint
        .map(|h| h.trim().to_lowercase())
        .filter(|h| !h.is_empty());
    let matches_hint = |s: &ClassificationSuggestion| {
        hint.as_deref()
            .is_some_and(|h| h.contains(s.soil_type.code()))
    };

    // Stable sort keeps band order among equal keys
    candidates.sort_by(|a, b| {
        matches_hint(b)
            .cmp(&matches_hint(a))
            .then(b.probability.cmp(&a.probability))
    });

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_all_codes_round_trip() {
        for class in SoilClass::ALL {
            assert_eq!(SoilClass::from_code(class.code()), Some(class));
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class.code()));
        }
        assert_eq!(SoilClass::ALL.len(), 19);
    }

    #[rstest]
    #[case("argila", "#8B4513")]
    #[case("areia_silto_argilosa", "#EEE8AA")]
    #[case("vegetacao", "#228B22")]
    #[case("expurgo", "#FFFFFF")]
    #[case("granito", "#CCCCCC")]
    #[case("", "#CCCCCC")]
    fn test_color_for(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(color_for(code), expected);
    }

    #[test]
    fn test_name_for_falls_back_to_code() {
        assert_eq!(name_for("argila_silto_arenosa"), "Argila Silto-Arenosa");
        assert_eq!(name_for("materia_organica"), "Matéria Orgânica");
        assert_eq!(name_for("granito"), "granito");
    }

    #[test]
    fn test_origin_description() {
        assert_eq!(origin_description("SR"), "Solo Residual");
        assert_eq!(origin_description("AO"), "Argila Orgânica");
        assert_eq!(origin_description("XX"), "XX");
    }

    #[test]
    fn test_groups_partition_all_classes() {
        let total: usize = SoilGroup::ALL.iter().map(|g| g.members().len()).sum();
        assert_eq!(total, SoilClass::ALL.len());
        assert_eq!(SoilGroup::Grossos.members(), vec![SoilClass::Pedregulho]);
        assert_eq!(SoilClass::SilteArgiloArenoso.group(), SoilGroup::Mistos);
        assert_eq!(SoilClass::Turfa.group(), SoilGroup::Especiais);
    }

    #[test]
    fn test_grain_size_composition() {
        let composition = SoilClass::ArgilaArenosa.grain_size_composition();
        assert_eq!(composition, &[("argila", 50), ("areia", 35), ("silte", 15)]);
        let total: u32 = composition.iter().map(|(_, p)| *p as u32).sum();
        assert_eq!(total, 100);
        assert!(SoilClass::Rocha.grain_size_composition().is_empty());
    }

    #[test]
    fn test_compose_description_full() {
        let mut layer = Layer::new(1, 0.0, 2.0, "argila")
            .with_color("Vermelha")
            .with_origin("SR");
        layer.secondary_classification = Some("Arenosa".to_string());
        layer.consistency = Some(Consistency::Rija);

        assert_eq!(
            compose_description(&layer),
            "Argila, com arenosa, vermelha, rija, (Solo Residual)"
        );
    }

    #[test]
    fn test_compose_description_skips_empty_fields() {
        let mut layer = Layer::new(1, 0.0, 2.0, "areia");
        layer.color = Some("  ".to_string());
        layer.compactness = Some(Compactness::PoucoCompacta);
        assert_eq!(compose_description(&layer), "Areia, pouco compacta");
    }

    #[rstest]
    #[case(0, 2)]
    #[case(4, 2)]
    #[case(10, 2)]
    #[case(30, 2)]
    #[case(31, 3)]
    fn test_suggestion_band_sizes(#[case] nspt: i32, #[case] expected: usize) {
        let suggestions = suggest_classification(nspt, None);
        assert_eq!(suggestions.len(), expected);
        let total: u32 = suggestions.iter().map(|s| s.probability as u32).sum();
        assert!(total <= 100);
    }

    #[test]
    fn test_suggestion_order_by_probability() {
        let suggestions = suggest_classification(20, None);
        assert_eq!(suggestions[0].soil_type, SoilClass::Areia);
        assert_eq!(
            suggestions[0].descriptor,
            Some(SoilDescriptor::Compactness(Compactness::Compacta))
        );
        assert_eq!(suggestions[1].soil_type, SoilClass::Argila);
        assert_eq!(suggestions[1].secondary.as_deref(), Some("arenosa"));
    }

    #[test]
    fn test_suggestion_hint_ranks_first() {
        let suggestions = suggest_classification(3, Some("Argila cinza escura"));
        assert_eq!(suggestions[0].soil_type, SoilClass::Argila);
        assert_eq!(
            suggestions[0].descriptor,
            Some(SoilDescriptor::Consistency(Consistency::MuitoMole))
        );

        let rock = suggest_classification(45, Some("rocha alterada"));
        assert_eq!(rock[0].soil_type, SoilClass::Rocha);
        assert_eq!(rock[1].soil_type, SoilClass::Areia);
    }

    #[test]
    fn test_suggestion_unrelated_hint_keeps_order() {
        let suggestions = suggest_classification(45, Some("cascalho"));
        let order: Vec<SoilClass> = suggestions.iter().map(|s| s.soil_type).collect();
        assert_eq!(order, vec![SoilClass::Areia, SoilClass::Argila, SoilClass::Rocha]);
    }
}
