//! Sounding-level compliance scoring.
//!
//! One pass starts at 100 and runs six phases in a fixed order: equipment,
//! coordinates, depths, responsible party, basic data, paralysis justification.
//! Each phase receives the pass's accumulator explicitly; nothing survives
//! between calls.

use tracing::debug;

use super::ComplianceResult;
use crate::sounding::{
    Sounding, NOMINAL_DROP_HEIGHT_CM, NOMINAL_HAMMER_WEIGHT_KGF,
};

const HAMMER_TOLERANCE_KGF: f64 = 0.5;
const DROP_HEIGHT_TOLERANCE_CM: f64 = 0.5;
const SAMPLER_EXTERNAL_RANGE_MM: (f64, f64) = (50.60, 51.00);
const SAMPLER_INTERNAL_RANGE_MM: (f64, f64) = (34.70, 35.10);
/// Acceptable (dExt² - dInt²) / dInt²
const AREA_RATIO_RANGE: (f64, f64) = (0.95, 1.20);

/// Score, errors and warnings of a single validation pass.
#[derive(Debug)]
struct ScoreAccumulator {
    score: i32,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ScoreAccumulator {
    fn new() -> Self {
        ScoreAccumulator {
            score: 100,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, message: impl Into<String>, penalty: i32) {
        self.errors.push(message.into());
        self.score -= penalty;
    }

    fn warning(&mut self, message: impl Into<String>, penalty: i32) {
        self.warnings.push(message.into());
        self.score -= penalty;
    }

    fn finish(self) -> ComplianceResult {
        ComplianceResult {
            conforme: self.errors.is_empty(),
            score: self.score.clamp(0, 100) as u8,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

fn within(value: f64, nominal: f64, tolerance: f64) -> bool {
    (value - nominal).abs() <= tolerance
}

fn in_range(value: f64, (low, high): (f64, f64)) -> bool {
    (low..=high).contains(&value)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

fn check_equipment(sounding: &Sounding, acc: &mut ScoreAccumulator) {
    let eq = &sounding.equipment;

    if !within(eq.hammer_weight_kgf, NOMINAL_HAMMER_WEIGHT_KGF, HAMMER_TOLERANCE_KGF) {
        acc.error("Peso do martelo fora da especificação NBR 6484:2020 (65 ± 0,5 kg)", 15);
    }
    if !within(eq.drop_height_cm, NOMINAL_DROP_HEIGHT_CM, DROP_HEIGHT_TOLERANCE_CM) {
        acc.error("Altura de queda fora da especificação NBR 6484:2020 (75 ± 0,5 cm)", 15);
    }

    let d_ext = eq.sampler_external_mm;
    let d_int = eq.sampler_internal_mm;
    if !in_range(d_ext, SAMPLER_EXTERNAL_RANGE_MM) {
        acc.warning("Diâmetro externo do amostrador fora do padrão (50,8 mm ± 0,2 mm)", 5);
    }
    if !in_range(d_int, SAMPLER_INTERNAL_RANGE_MM) {
        acc.warning("Diâmetro interno do amostrador fora do padrão (34,9 mm ± 0,2 mm)", 5);
    }

    if d_int.is_nan() || d_int <= 0.0 {
        acc.error(
            "Razão de área do amostrador não calculável: diâmetro interno inválido (NBR 6484:2020)",
            10,
        );
        return;
    }
    let ratio = (d_ext.powi(2) - d_int.powi(2)) / d_int.powi(2);
    if !in_range(ratio, AREA_RATIO_RANGE) {
        acc.error(
            format!(
                "Razão de área do amostrador ({:.2}) fora dos limites NBR 6484:2020 (95% a 120%)",
                ratio * 100.0
            ),
            10,
        );
    }
}

fn check_coordinates(sounding: &Sounding, acc: &mut ScoreAccumulator) {
    if sounding.easting_m.is_none() || sounding.northing_m.is_none() {
        acc.error("Coordenadas UTM são obrigatórias conforme NBR 6484:2020 (5.2.1)", 10);
    }

    let negative = |c: Option<f64>| c.is_some_and(|v| v < 0.0);
    if negative(sounding.easting_m) || negative(sounding.northing_m) {
        acc.error("Coordenadas UTM inválidas", 10);
    }
}

fn check_depths(sounding: &Sounding, acc: &mut ScoreAccumulator) {
    let final_depth = sounding.final_depth_m.filter(|d| *d > 0.0);
    let Some(final_depth) = final_depth else {
        acc.error("Profundidade final deve ser maior que zero", 15);
        return;
    };

    if sounding.auger_depth_m.is_some_and(|auger| auger > final_depth) {
        acc.error("Profundidade de trado não pode ser maior que profundidade final", 5);
    }
    if sounding.casing_depth_m.is_some_and(|casing| casing > final_depth) {
        acc.warning("Profundidade de revestimento maior que profundidade final", 3);
    }
}

fn check_responsible(sounding: &Sounding, acc: &mut ScoreAccumulator) {
    if sounding.responsible_id.is_none() {
        acc.error("Responsável técnico habilitado é obrigatório (NBR 6484:2020 - 5.1.1)", 20);
    }
    if is_blank(&sounding.driller) {
        acc.warning("Nome do sondador não informado (NBR 6484:2020 - 5.2.1)", 5);
    }
}

fn check_basic_data(sounding: &Sounding, acc: &mut ScoreAccumulator) {
    if sounding.execution_date.is_none() {
        acc.error("Data de execução é obrigatória", 10);
    }
    if is_blank(&sounding.code) {
        acc.error("Código da sondagem é obrigatório", 10);
    }
}

fn check_paralysis(sounding: &Sounding, acc: &mut ScoreAccumulator) {
    if sounding.requires_paralysis_justification() && is_blank(&sounding.paralysis_remarks) {
        acc.error(
            "Sondagens com menos de 20m devem ter justificativa de paralisação (NBR 6484:2020 - 5.2.4.1)",
            15,
        );
    }
}

/// Score a sounding against NBR 6484:2020.
///
/// | Phase | Check | Kind | Penalty |
/// |-------|-------|------|---------|
/// | Equipment | hammer 65 ± 0.5 kgf | error | 15 |
/// | Equipment | drop height 75 ± 0.5 cm | error | 15 |
/// | Equipment | sampler dExt 50.8 ± 0.2 mm | warning | 5 |
/// | Equipment | sampler dInt 34.9 ± 0.2 mm | warning | 5 |
/// | Equipment | area ratio in 95%..120% | error | 10 |
/// | Coordinates | easting and northing present | error | 10 |
/// | Coordinates | non-negative | error | 10 |
/// | Depths | final depth > 0 | error | 15 |
/// | Depths | auger <= final | error | 5 |
/// | Depths | casing <= final | warning | 3 |
/// | Responsible | technical responsible set | error | 20 |
/// | Responsible | driller named | warning | 5 |
/// | Basic data | execution date | error | 10 |
/// | Basic data | sounding code | error | 10 |
/// | Paralysis | remarks when final depth < 20 m | error | 15 |
pub fn validate_sounding(sounding: &Sounding) -> ComplianceResult {
    let mut acc = ScoreAccumulator::new();

    check_equipment(sounding, &mut acc);
    check_coordinates(sounding, &mut acc);
    check_depths(sounding, &mut acc);
    check_responsible(sounding, &mut acc);
    check_basic_data(sounding, &mut acc);
    check_paralysis(sounding, &mut acc);

    let result = acc.finish();
    debug!(
        code = sounding.code_str(),
        score = result.score,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "sounding validated"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use uuid::Uuid;

    fn compliant_sounding() -> Sounding {
        let mut sounding = Sounding::new("SP-01");
        sounding.execution_date = NaiveDate::from_ymd_opt(2024, 3, 15);
        sounding.driller = Some("José da Silva".to_string());
        sounding.responsible_id = Some(Uuid::new_v4());
        sounding.easting_m = Some(333_250.0);
        sounding.northing_m = Some(7_394_100.0);
        sounding.final_depth_m = Some(25.0);
        sounding
    }

    #[test]
    fn test_maximally_compliant_sounding() {
        let result = validate_sounding(&compliant_sounding());
        assert_eq!(
            result,
            ComplianceResult {
                conforme: true,
                score: 100,
                errors: vec![],
                warnings: vec![],
            }
        );
    }

    #[test]
    fn test_missing_responsible_costs_twenty() {
        let baseline = validate_sounding(&compliant_sounding());

        let mut sounding = compliant_sounding();
        sounding.responsible_id = None;
        let result = validate_sounding(&sounding);

        assert_eq!(baseline.score - result.score, 20);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Responsável técnico"));
        assert!(!result.conforme);
    }

    #[test]
    fn test_shallow_sounding_needs_paralysis_remarks() {
        let mut with_remarks = compliant_sounding();
        with_remarks.final_depth_m = Some(15.0);
        with_remarks.paralysis_remarks = Some("Impenetrável ao trépano".to_string());

        let mut without_remarks = with_remarks.clone();
        without_remarks.paralysis_remarks = None;

        let ok = validate_sounding(&with_remarks);
        let missing = validate_sounding(&without_remarks);

        assert!(ok.conforme);
        assert_eq!(ok.score - missing.score, 15);
        assert!(missing.errors.iter().any(|e| e.contains("justificativa de paralisação")));
    }

    #[test]
    fn test_blank_paralysis_remarks_count_as_missing() {
        let mut sounding = compliant_sounding();
        sounding.final_depth_m = Some(12.0);
        sounding.paralysis_remarks = Some("   ".to_string());
        assert_eq!(validate_sounding(&sounding).score, 85);
    }

    #[test]
    fn test_warnings_alone_keep_conformity() {
        let mut sounding = compliant_sounding();
        sounding.driller = None;
        sounding.casing_depth_m = Some(30.0);
        sounding.equipment.sampler_external_mm = 50.55;

        let result = validate_sounding(&sounding);
        assert!(result.conforme);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 3);
        assert_eq!(result.score, 100 - 5 - 3 - 5);
    }

    #[test]
    fn test_score_never_negative() {
        let mut sounding = Sounding::new("");
        sounding.code = None;
        sounding.equipment.hammer_weight_kgf = 60.0;
        sounding.equipment.drop_height_cm = 70.0;
        sounding.equipment.sampler_external_mm = 60.0;
        sounding.equipment.sampler_internal_mm = 30.0;
        sounding.easting_m = Some(-1.0);
        sounding.final_depth_m = Some(-5.0);

        let result = validate_sounding(&sounding);
        assert_eq!(result.score, 0);
        assert!(!result.conforme);
        assert!(result.errors.len() >= 8);
    }

    #[test]
    fn test_phase_order_of_messages() {
        let mut sounding = compliant_sounding();
        sounding.equipment.hammer_weight_kgf = 70.0;
        sounding.code = None;
        let result = validate_sounding(&sounding);
        assert!(result.errors[0].starts_with("Peso do martelo"));
        assert!(result.errors[1].starts_with("Código da sondagem"));
    }

    #[rstest]
    #[case(65.0, true)]
    #[case(65.5, true)]
    #[case(64.5, true)]
    #[case(65.6, false)]
    #[case(64.0, false)]
    fn test_hammer_weight_tolerance(#[case] weight: f64, #[case] ok: bool) {
        let mut sounding = compliant_sounding();
        sounding.equipment.hammer_weight_kgf = weight;
        let result = validate_sounding(&sounding);
        assert_eq!(result.conforme, ok);
        assert_eq!(result.score, if ok { 100 } else { 85 });
    }

    #[test]
    fn test_area_ratio_message_in_percent() {
        let mut sounding = compliant_sounding();
        // Both diameters out of band (two warnings) and ratio ~1.37
        sounding.equipment.sampler_external_mm = 52.0;
        sounding.equipment.sampler_internal_mm = 34.0;
        let result = validate_sounding(&sounding);

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("(133.91)"), "{}", result.errors[0]);
        assert_eq!(result.score, 100 - 5 - 5 - 10);
    }

    #[test]
    fn test_zero_internal_diameter_is_an_error() {
        let mut sounding = compliant_sounding();
        sounding.equipment.sampler_internal_mm = 0.0;
        let result = validate_sounding(&sounding);
        assert!(!result.conforme);
        assert_eq!(result.score, 100 - 5 - 10);
    }

    #[test]
    fn test_coordinates_missing_and_negative() {
        let mut sounding = compliant_sounding();
        sounding.northing_m = None;
        assert_eq!(validate_sounding(&sounding).score, 90);

        sounding.easting_m = Some(-10.0);
        let result = validate_sounding(&sounding);
        assert_eq!(result.score, 80);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_zero_coordinates_are_present() {
        let mut sounding = compliant_sounding();
        sounding.easting_m = Some(0.0);
        assert_eq!(validate_sounding(&sounding).score, 100);
    }

    #[test]
    fn test_depth_checks() {
        let mut sounding = compliant_sounding();
        sounding.auger_depth_m = Some(26.0);
        sounding.casing_depth_m = Some(27.0);
        let result = validate_sounding(&sounding);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.score, 92);
    }

    #[test]
    fn test_missing_final_depth() {
        let mut sounding = compliant_sounding();
        sounding.final_depth_m = None;
        sounding.paralysis_remarks = Some("Impenetrável".to_string());
        let result = validate_sounding(&sounding);
        assert_eq!(result.score, 85);
        assert_eq!(result.errors, vec!["Profundidade final deve ser maior que zero".to_string()]);
    }

    #[test]
    fn test_basic_data_required() {
        let mut sounding = compliant_sounding();
        sounding.execution_date = None;
        sounding.code = Some(String::new());
        let result = validate_sounding(&sounding);
        assert_eq!(result.score, 80);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_validations_do_not_share_state() {
        let mut bad = compliant_sounding();
        bad.responsible_id = None;
        let _ = validate_sounding(&bad);
        assert_eq!(validate_sounding(&compliant_sounding()).score, 100);
    }
}
