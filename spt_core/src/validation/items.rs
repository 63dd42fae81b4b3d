//! Per-sample and per-layer checks. Stateless, no score.

use crate::calculations::nbr::REFUSAL_PENETRATION_CM;
use crate::soil;
use crate::sounding::{Layer, Sample};

use super::ItemValidation;

/// Plausible blow count for one 15 cm section
const MAX_SECTION_BLOWS: i32 = 60;

fn section_out_of_range(blows: i32) -> bool {
    !(0..=MAX_SECTION_BLOWS).contains(&blows)
}

/// Check a sample's blow counts, stored NSPT pairs and refusal flag.
///
/// A stored pair that disagrees with its blow counts is an error. Out of
/// range counts and short penetration without the refusal flag are warnings.
pub fn validate_sample(sample: &Sample) -> ItemValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if sample.golpes_1a().is_some_and(section_out_of_range) {
        warnings.push("Número de golpes da 1ª seção anormal (0-60 esperado)".to_string());
    }
    if section_out_of_range(sample.golpes_2a()) {
        warnings.push("Número de golpes da 2ª seção anormal (0-60 esperado)".to_string());
    }
    if section_out_of_range(sample.golpes_3a()) {
        warnings.push("Número de golpes da 3ª seção anormal (0-60 esperado)".to_string());
    }

    let computed = sample.computed_nspt();
    if sample.nspt_2a_3a() != computed {
        errors.push(format!(
            "NSPT calculado ({}) difere do informado ({})",
            computed, sample.nspt_2a_3a()
        ));
    }

    if sample.golpes_1a().is_some() {
        let computed_first = sample.computed_first_pair();
        if sample.nspt_1a_2a() != computed_first {
            errors.push(format!(
                "NSPT 1ª+2ª calculado ({}) difere do informado ({})",
                computed_first, sample.nspt_1a_2a()
            ));
        }
    }

    if sample.penetration_cm < REFUSAL_PENETRATION_CM && !sample.blow_limit {
        warnings.push("Penetração menor que 45cm sem indicação de limite de golpes".to_string());
    }

    ItemValidation::from_messages(errors, warnings)
}

/// Check a layer's depth interval, classification, color and description.
pub fn validate_layer(layer: &Layer) -> ItemValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if layer.final_depth_m <= layer.initial_depth_m {
        errors.push("Profundidade final deve ser maior que profundidade inicial".to_string());
    }

    match layer.primary_classification.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("Classificação do solo é obrigatória (NBR 6502:2022)".to_string());
        }
        Some(code) if !soil::is_valid_classification(code) => {
            errors.push("Classificação do solo inválida conforme NBR 6502:2022".to_string());
        }
        Some(_) => {}
    }

    let blank = |value: &Option<String>| value.as_deref().map(str::trim).unwrap_or("").is_empty();
    if blank(&layer.color) {
        warnings.push("Cor do solo não informada (NBR 6484:2020 - 5.2.3)".to_string());
    }
    if blank(&layer.description) {
        errors.push("Descrição completa da camada é obrigatória (NBR 6484:2020 - 5.2.3)".to_string());
    }

    ItemValidation::from_messages(errors, warnings)
}
