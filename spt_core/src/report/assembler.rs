//! Builds a [`ReportDocument`] from a [`SoundingBundle`].
//!
//! Pure formatting and aggregation. Stored values (NSPT pairs, depths, score)
//! are copied as they are; the only derived numbers come from the statistics
//! and the sampler area ratio.

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use super::document::*;
use super::{format_date, format_date_time, report_file_name};
use crate::bundle::SoundingBundle;
use crate::calculations::{nbr, statistics};
use crate::config::SptConfig;
use crate::errors::{SptError, SptResult};
use crate::soil;
use crate::sounding::{
    Company, Layer, PercussionSystem, Photo, Project, ResponsibleTechnician, Sample, Sounding,
    WaterTableReading, Work, DEFAULT_DATUM,
};

const NOT_INFORMED: &str = "-";

/// Normative references printed at the end of every report
pub const NORMATIVE_REFERENCES: [(&str, &str); 4] = [
    (
        "NBR 6484:2020",
        "Solo - Sondagem de simples reconhecimento com SPT - Método de ensaio",
    ),
    ("NBR 6502:2022", "Rochas e solos - Terminologia"),
    ("NBR 13441:2021", "Rochas e solos - Simbologia gráfica"),
    (
        "NBR 15492:2007",
        "Sondagem de reconhecimento para fins de qualidade ambiental - Procedimento",
    ),
];

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2} {}", v, unit),
        None => NOT_INFORMED.to_string(),
    }
}

fn company_header(company: Option<&Company>) -> CompanyHeader {
    let Some(company) = company else {
        return CompanyHeader::default();
    };
    CompanyHeader {
        legal_name: company.legal_name.clone(),
        address: company.address.clone(),
        phone: text(&company.phone),
        email: text(&company.email),
        logo: company.logo_path.clone(),
    }
}

fn responsible_header(responsible: &ResponsibleTechnician) -> ResponsibleHeader {
    ResponsibleHeader {
        name: responsible.name.clone(),
        crea: responsible.crea.clone(),
        role: responsible.role.clone(),
        signature: responsible.signature_path.clone(),
    }
}

fn project_header(project: Option<&Project>) -> ProjectHeader {
    project
        .map(|p| ProjectHeader {
            name: p.name.clone(),
            code: text(&p.code),
            client: p.client.clone(),
        })
        .unwrap_or_default()
}

fn work_header(work: Option<&Work>) -> WorkHeader {
    match work {
        Some(w) => WorkHeader {
            name: w.name.clone(),
            address: w.address.clone(),
            city: w.city.clone(),
            state: w.state.clone(),
            datum: w.datum_or_default().to_string(),
            utm_zone: text(&w.utm_zone),
        },
        None => WorkHeader {
            datum: DEFAULT_DATUM.to_string(),
            ..WorkHeader::default()
        },
    }
}

fn sounding_header(sounding: &Sounding) -> SoundingHeader {
    let coordinates = match (sounding.easting_m, sounding.northing_m) {
        (Some(e), Some(n)) => format!("E: {:.2} m, N: {:.2} m", e, n),
        _ => NOT_INFORMED.to_string(),
    };

    SoundingHeader {
        code: sounding.code_str().to_string(),
        execution_date: sounding.execution_date.map(format_date).unwrap_or_default(),
        driller: text(&sounding.driller),
        coordinates,
        elevation: with_unit(sounding.ground_elevation_m, "m"),
    }
}

fn equipment_block(sounding: &Sounding) -> EquipmentBlock {
    let eq = &sounding.equipment;

    let system = match PercussionSystem::from_code(&eq.percussion_system) {
        Some(PercussionSystem::Manual) => "Manual".to_string(),
        Some(PercussionSystem::Mecanico) => "Mecânico".to_string(),
        None => eq.percussion_system.clone(),
    };
    // Non-positive internal diameter: no ratio to print
    let area_ratio = nbr::sampler_area_ratio(eq.sampler_external_mm, eq.sampler_internal_mm)
        .map(|r| format!("{:.1}%", r))
        .unwrap_or_else(|_| NOT_INFORMED.to_string());

    EquipmentBlock {
        hammer: HammerSpec {
            weight: format!("{:.2} kg", eq.hammer_weight_kgf),
            drop_height: format!("{:.2} cm", eq.drop_height_cm),
            system,
        },
        sampler: SamplerSpec {
            external_diameter: format!("{:.2} mm", eq.sampler_external_mm),
            internal_diameter: format!("{:.2} mm", eq.sampler_internal_mm),
            area_ratio,
        },
        casing: ToolSpec {
            diameter: with_unit(eq.casing_diameter_mm, "mm"),
            depth: with_unit(sounding.casing_depth_m, "m"),
        },
        auger: ToolSpec {
            diameter: with_unit(eq.auger_diameter_mm, "mm"),
            depth: with_unit(sounding.auger_depth_m, "m"),
        },
    }
}

fn water_table_entry(reading: &WaterTableReading) -> WaterTableEntry {
    if !reading.present {
        return WaterTableEntry::default();
    }
    WaterTableEntry {
        present: true,
        depth: reading.depth_m.map(|d| format!("{:.2} m", d)),
        date: reading.date.map(format_date),
    }
}

fn sample_row(sample: &Sample) -> SampleRow {
    SampleRow {
        number: sample.number,
        perforation: sample.perforation.code().to_string(),
        depth_range: format!(
            "{:.2} - {:.2}",
            sample.initial_depth_m,
            sample.depth_range_end_m()
        ),
        blows_1: sample
            .golpes_1a()
            .map_or_else(|| NOT_INFORMED.to_string(), |g| g.to_string()),
        blows_2: sample.golpes_2a(),
        blows_3: sample.golpes_3a(),
        nspt_1_2: sample.nspt_1a_2a(),
        nspt_2_3: sample.nspt_2a_3a(),
        penetration_cm: sample.penetration_cm,
        blow_limit: if sample.blow_limit { "Sim" } else { "Não" }.to_string(),
        notes: text(&sample.notes),
    }
}

fn layer_row(layer: &Layer) -> LayerRow {
    let code = layer.primary_classification.as_deref().unwrap_or("");
    LayerRow {
        number: layer.number,
        depth_range: format!("{:.2} - {:.2}", layer.initial_depth_m, layer.final_depth_m),
        thickness: format!("{:.2}", layer.thickness_m()),
        classification: soil::name_for(code),
        description: text(&layer.description),
        color: text(&layer.color),
        origin: layer
            .origin
            .as_deref()
            .map(soil::origin_description)
            .unwrap_or_default(),
        legend_color: soil::color_for(code).to_string(),
    }
}

fn remarks_block(sounding: &Sounding) -> RemarksBlock {
    let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
    RemarksBlock {
        paralysis: non_blank(&sounding.paralysis_remarks),
        general: non_blank(&sounding.general_remarks),
        depths: format!(
            "Profundidade final: {:.2} m | Trado: {:.2} m",
            sounding.final_depth_m.unwrap_or(0.0),
            sounding.auger_depth_m.unwrap_or(0.0)
        ),
    }
}

fn photo_entry(photo: &Photo) -> PhotoEntry {
    let coordinates = match (photo.latitude, photo.longitude) {
        (Some(lat), Some(lon)) => Some(format!("{:.6}, {:.6}", lat, lon)),
        _ => None,
    };
    PhotoEntry {
        order: photo.order,
        kind: photo.kind.display_name().to_string(),
        file: photo.file.clone(),
        description: text(&photo.description),
        coordinates,
        taken_at: photo.taken_at.map(format_date_time),
    }
}

/// Assemble the report for `bundle`, stamped with the local time.
///
/// # Errors
///
/// * `MissingField` - the bundle has no technical responsible
/// * `InvalidInput` - the analysis settings are out of domain
pub fn assemble_report(bundle: &SoundingBundle, config: &SptConfig) -> SptResult<ReportDocument> {
    assemble_report_at(bundle, config, Local::now().naive_local())
}

/// Same as [`assemble_report`] with an explicit generation time.
pub fn assemble_report_at(
    bundle: &SoundingBundle,
    config: &SptConfig,
    generated_at: NaiveDateTime,
) -> SptResult<ReportDocument> {
    let responsible = bundle
        .responsible
        .as_ref()
        .ok_or_else(|| SptError::missing_field("responsible"))?;
    let sounding = &bundle.sounding;
    let samples: Vec<Sample> = bundle.samples_by_depth().into_iter().cloned().collect();

    let analysis = if config.report.include_analysis {
        Some(statistics::analyze(
            &samples,
            sounding.water_table_depth(),
            &config.analysis,
        )?)
    } else {
        None
    };

    let photos = if config.report.include_photos {
        let mut photos: Vec<&Photo> = bundle.photos.iter().collect();
        photos.sort_by_key(|p| p.order);
        photos.into_iter().map(photo_entry).collect()
    } else {
        Vec::new()
    };

    let document = ReportDocument {
        title: config.report.title.clone(),
        header: ReportHeader {
            company: company_header(bundle.company.as_ref()),
            responsible: responsible_header(responsible),
            project: project_header(bundle.project.as_ref()),
            work: work_header(bundle.work.as_ref()),
            sounding: sounding_header(sounding),
        },
        equipment: equipment_block(sounding),
        water_table: WaterTableBlock {
            initial: water_table_entry(&sounding.water_table_initial),
            final_reading: water_table_entry(&sounding.water_table_final),
        },
        samples: samples.iter().map(sample_row).collect(),
        layers: bundle.layers.iter().map(layer_row).collect(),
        remarks: remarks_block(sounding),
        statistics: StatisticsBlock {
            summary: statistics::summary_statistics(&samples),
            resistance_profile: statistics::resistance_profile(&samples),
            impenetrable: statistics::identify_impenetrable_layers(&samples),
        },
        analysis,
        chart: statistics::chart_data(&samples),
        photos,
        references: NORMATIVE_REFERENCES
            .iter()
            .map(|(code, title)| NormativeReference {
                code: code.to_string(),
                title: title.to_string(),
            })
            .collect(),
        metadata: ReportMetadata {
            generated_at: format_date_time(generated_at),
            version: sounding.version,
            status: sounding.status.display_name().to_string(),
            compliance_score: sounding.compliance_score,
            file_name: report_file_name(sounding.code_str(), generated_at),
        },
    };

    debug!(
        code = sounding.code_str(),
        samples = document.samples.len(),
        layers = document.layers.len(),
        photos = document.photos.len(),
        "report assembled"
    );
    Ok(document)
}
