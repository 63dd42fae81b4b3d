//! # PDF Generation Module
//!
//! Renders a [`ReportDocument`] to PDF with Typst.
//!
//! ## Architecture
//!
//! - The page setup and title block live in an embedded template string
//! - Tables are generated from the document rows and appended to the source
//! - Fonts come from `typst-assets`, nothing is read from disk
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! The renderer does no domain math: every value is already formatted by
//! [`assemble_report`](crate::report::assemble_report).
//!
//! ## Example
//!
//! ```rust,no_run
//! use spt_core::bundle::SoundingBundle;
//! use spt_core::config::SptConfig;
//! use spt_core::pdf::render_report_pdf;
//! use spt_core::report::assemble_report;
//! use spt_core::sounding::{ResponsibleTechnician, Sample, Sounding};
//!
//! let mut bundle = SoundingBundle::new(Sounding::new("SP-01"));
//! bundle.set_responsible(ResponsibleTechnician::new("Ana Souza", "SP-123456", "Engenheira Civil"));
//! bundle.samples.push(Sample::new(1, 1.0, Some(2), 3, 4));
//!
//! let doc = assemble_report(&bundle, &SptConfig::default()).unwrap();
//! let pdf_bytes = render_report_pdf(&doc).unwrap();
//! std::fs::write(&doc.metadata.file_name, pdf_bytes).unwrap();
//! ```

use chrono::{Datelike, Local};
use tracing::debug;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::statistics::{RiskLevel, SoundingAnalysis};
use crate::errors::{SptError, SptResult};
use crate::report::document::{LayerRow, PhotoEntry, ReportDocument, SampleRow, WaterTableEntry};
use crate::soil::FALLBACK_COLOR;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    // Photos and logos are listed by name only, so no file is ever resolved
    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Local::now();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

// ============================================================================
// PDF Template
// ============================================================================

/// Page setup, title block and identification tables
const REPORT_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 1.8cm, right: 1.8cm),
  header: grid(
    columns: (1fr, auto),
    align(left)[#text(size: 8pt, fill: gray)[{{COMPANY}}]],
    align(right)[#text(size: 8pt, fill: gray)[Sondagem {{CODE}}]],
  ),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[{{STATUS}} | v{{VERSION}}]],
      align(center)[#text(size: 8pt)[Página #counter(page).display()]],
      align(right)[#text(size: 8pt)[{{GENERATED_AT}}]],
    )
  ]
)

#set text(lang: "pt", size: 9pt)
#set table(inset: 5pt, stroke: 0.5pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 15pt, weight: "bold")[{{TITLE}}]
    #v(4pt)
    #text(size: 12pt)[Furo {{CODE}}]
  ]
]

#v(10pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 16pt,
  [
    *Empresa*
    #v(2pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      inset: 2pt,
      [Razão social:], [{{COMPANY}}],
      [Endereço:], [{{COMPANY_ADDRESS}}],
      [Contato:], [{{COMPANY_CONTACT}}],
    )
  ],
  [
    *Responsável técnico*
    #v(2pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      inset: 2pt,
      [Nome:], [{{RESPONSIBLE}}],
      [CREA:], [{{CREA}}],
      [Cargo:], [{{ROLE}}],
    )
  ],
  [
    *Projeto e obra*
    #v(2pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      inset: 2pt,
      [Projeto:], [{{PROJECT}}],
      [Cliente:], [{{CLIENT}}],
      [Obra:], [{{WORK}}],
      [Local:], [{{WORK_LOCATION}}],
      [Datum:], [{{DATUM}}],
    )
  ],
  [
    *Sondagem*
    #v(2pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      inset: 2pt,
      [Execução:], [{{EXECUTION_DATE}}],
      [Sondador:], [{{DRILLER}}],
      [Coordenadas:], [{{COORDINATES}}],
      [Cota:], [{{ELEVATION}}],
    )
  ],
)

#v(8pt)
#line(length: 100%, stroke: 0.5pt)

== Equipamento

#table(
  columns: (1fr, 1fr, 1fr, 1fr),
  table.header([*Martelo*], [*Amostrador*], [*Revestimento*], [*Trado*]),
  [Massa: {{HAMMER_WEIGHT}}], [Ø ext.: {{SAMPLER_EXT}}], [Ø: {{CASING_DIAMETER}}], [Ø: {{AUGER_DIAMETER}}],
  [Queda: {{HAMMER_DROP}}], [Ø int.: {{SAMPLER_INT}}], [Prof.: {{CASING_DEPTH}}], [Prof.: {{AUGER_DEPTH}}],
  [Sistema: {{HAMMER_SYSTEM}}], [Razão de área: {{AREA_RATIO}}], [], [],
)

== Nível d'água

#table(
  columns: (1fr, auto, auto),
  table.header([*Leitura*], [*Profundidade*], [*Data*]),
  [Inicial], {{WATER_INITIAL}},
  [Final], {{WATER_FINAL}},
)
"##;

// ============================================================================
// PDF Rendering
// ============================================================================

/// Render an assembled sounding report to PDF.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(SptError::Render)` - Typst compilation or PDF export failed
pub fn render_report_pdf(doc: &ReportDocument) -> SptResult<Vec<u8>> {
    let source = build_source(doc);

    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        SptError::render(format!("Typst compilation failed: {}", error_msgs.join("; ")))
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        SptError::render(format!("PDF rendering failed: {}", error_msgs.join("; ")))
    })?;

    debug!(
        code = %doc.header.sounding.code,
        bytes = pdf_bytes.len(),
        "report rendered"
    );
    Ok(pdf_bytes)
}

/// Full Typst source for a report.
fn build_source(doc: &ReportDocument) -> String {
    let header = &doc.header;
    let equipment = &doc.equipment;

    let company_contact = [header.company.phone.as_str(), header.company.email.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");
    let work_location = [header.work.city.as_str(), header.work.state.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let mut source = REPORT_TEMPLATE
        .replace("{{TITLE}}", &escape_typst(&doc.title))
        .replace("{{CODE}}", &escape_typst(&header.sounding.code))
        .replace("{{STATUS}}", &escape_typst(&doc.metadata.status))
        .replace("{{VERSION}}", &doc.metadata.version.to_string())
        .replace("{{GENERATED_AT}}", &escape_typst(&doc.metadata.generated_at))
        .replace("{{COMPANY}}", &escape_typst(&header.company.legal_name))
        .replace("{{COMPANY_ADDRESS}}", &escape_typst(&header.company.address))
        .replace("{{COMPANY_CONTACT}}", &escape_typst(&company_contact))
        .replace("{{RESPONSIBLE}}", &escape_typst(&header.responsible.name))
        .replace("{{CREA}}", &escape_typst(&header.responsible.crea))
        .replace("{{ROLE}}", &escape_typst(&header.responsible.role))
        .replace("{{PROJECT}}", &escape_typst(&header.project.name))
        .replace("{{CLIENT}}", &escape_typst(&header.project.client))
        .replace("{{WORK}}", &escape_typst(&header.work.name))
        .replace("{{WORK_LOCATION}}", &escape_typst(&work_location))
        .replace("{{DATUM}}", &escape_typst(&header.work.datum))
        .replace("{{EXECUTION_DATE}}", &escape_typst(&header.sounding.execution_date))
        .replace("{{DRILLER}}", &escape_typst(&header.sounding.driller))
        .replace("{{COORDINATES}}", &escape_typst(&header.sounding.coordinates))
        .replace("{{ELEVATION}}", &escape_typst(&header.sounding.elevation))
        .replace("{{HAMMER_WEIGHT}}", &escape_typst(&equipment.hammer.weight))
        .replace("{{HAMMER_DROP}}", &escape_typst(&equipment.hammer.drop_height))
        .replace("{{HAMMER_SYSTEM}}", &escape_typst(&equipment.hammer.system))
        .replace("{{SAMPLER_EXT}}", &escape_typst(&equipment.sampler.external_diameter))
        .replace("{{SAMPLER_INT}}", &escape_typst(&equipment.sampler.internal_diameter))
        .replace("{{AREA_RATIO}}", &escape_typst(&equipment.sampler.area_ratio))
        .replace("{{CASING_DIAMETER}}", &escape_typst(&equipment.casing.diameter))
        .replace("{{CASING_DEPTH}}", &escape_typst(&equipment.casing.depth))
        .replace("{{AUGER_DIAMETER}}", &escape_typst(&equipment.auger.diameter))
        .replace("{{AUGER_DEPTH}}", &escape_typst(&equipment.auger.depth))
        .replace("{{WATER_INITIAL}}", &water_table_cells(&doc.water_table.initial))
        .replace("{{WATER_FINAL}}", &water_table_cells(&doc.water_table.final_reading));

    source.push_str(&samples_section(&doc.samples));
    source.push_str(&chart_section(doc));
    source.push_str(&layers_section(&doc.layers));
    source.push_str(&remarks_section(doc));
    source.push_str(&statistics_section(doc));
    if let Some(analysis) = &doc.analysis {
        source.push_str(&analysis_section(analysis));
    }
    if !doc.photos.is_empty() {
        source.push_str(&photos_section(&doc.photos));
    }
    source.push_str(&references_section(doc));

    source
}

fn water_table_cells(entry: &WaterTableEntry) -> String {
    if !entry.present {
        return format!("[Não observado], {}", cell("-"));
    }
    format!(
        "{}, {}",
        cell(entry.depth.as_deref().unwrap_or("-")),
        cell(entry.date.as_deref().unwrap_or("-"))
    )
}

fn samples_section(samples: &[SampleRow]) -> String {
    let rows: Vec<String> = samples
        .iter()
        .map(|s| {
            format!(
                "  [{}], {}, {}, {}, [{}], [{}], [{}], [{}], [{:.0}], {}, {},",
                s.number,
                cell(&s.perforation),
                cell(&s.depth_range),
                cell(&s.blows_1),
                s.blows_2,
                s.blows_3,
                s.nspt_1_2,
                s.nspt_2_3,
                s.penetration_cm,
                cell(&s.blow_limit),
                cell(&s.notes),
            )
        })
        .collect();

    format!(
        r##"
== Ensaio SPT

#table(
  columns: (auto, auto, auto, auto, auto, auto, auto, auto, auto, auto, 1fr),
  align: (center, center, center, right, right, right, right, right, right, center, left),
  table.header([*Nº*], [*Perf.*], [*Prof. (m)*], [*1ª*], [*2ª*], [*3ª*], [*N1+2*], [*N2+3*], [*Pen. (cm)*], [*Limite*], [*Obs.*]),
{}
)
"##,
        rows.join("\n")
    )
}

/// NSPT against depth as horizontal bars, scaled to 50 blows or the
/// largest value when higher.
fn chart_section(doc: &ReportDocument) -> String {
    let chart = &doc.chart;
    if chart.nspt.is_empty() {
        return String::new();
    }

    let scale = chart.nspt.iter().copied().max().unwrap_or(0).max(50) as f64;
    let rows: Vec<String> = chart
        .labels
        .iter()
        .zip(&chart.nspt)
        .map(|(label, &nspt)| {
            let width = (nspt.max(0) as f64 / scale * 100.0).clamp(0.0, 100.0);
            format!(
                "  {}, [#box(width: {:.1}%, height: 7pt, fill: rgb(\"#4a7bb7\")) {}],",
                cell(label),
                width,
                nspt
            )
        })
        .collect();

    format!(
        r##"
== Perfil NSPT

#grid(
  columns: (auto, 1fr),
  column-gutter: 8pt,
  row-gutter: 3pt,
{}
)
"##,
        rows.join("\n")
    )
}

fn layers_section(layers: &[LayerRow]) -> String {
    if layers.is_empty() {
        return String::new();
    }

    let rows: Vec<String> = layers
        .iter()
        .map(|l| {
            format!(
                "  [#box(width: 8pt, height: 8pt, fill: rgb(\"{}\"))], [{}], {}, {}, {}, {}, {},",
                legend_fill(&l.legend_color),
                l.number,
                cell(&l.depth_range),
                cell(&l.thickness),
                cell(&l.description),
                cell(&l.color),
                cell(&l.origin),
            )
        })
        .collect();

    format!(
        r##"
== Perfil geológico

#table(
  columns: (auto, auto, auto, auto, 1fr, auto, auto),
  table.header([], [*Nº*], [*Prof. (m)*], [*Esp.*], [*Descrição*], [*Cor*], [*Origem*]),
{}
)
"##,
        rows.join("\n")
    )
}

fn remarks_section(doc: &ReportDocument) -> String {
    let remarks = &doc.remarks;
    let mut out = String::from("\n== Observações\n\n");
    out.push_str(&escape_typst(&remarks.depths));
    out.push_str("\n\n");
    if let Some(paralysis) = &remarks.paralysis {
        out.push_str(&format!("*Paralisação:* {}\n\n", escape_typst(paralysis)));
    }
    if let Some(general) = &remarks.general {
        out.push_str(&format!("*Gerais:* {}\n\n", escape_typst(general)));
    }
    out
}

fn statistics_section(doc: &ReportDocument) -> String {
    let stats = &doc.statistics;
    let summary = &stats.summary;
    let profile = &stats.resistance_profile;

    let mut out = format!(
        r##"
== Estatísticas

#table(
  columns: (1fr, auto),
  [Amostras], [{}],
  [NSPT mínimo / máximo], [{} / {}],
  [NSPT médio], [{:.1}],
  [NSPT mediano], [{:.1}],
  [Profundidade máxima], [{:.2} m],
)

#table(
  columns: (1fr, 1fr, 1fr, 1fr, 1fr),
  table.header([*Muito baixa*], [*Baixa*], [*Média*], [*Alta*], [*Muito alta*]),
  [{}], [{}], [{}], [{}], [{}],
)
"##,
        summary.count,
        summary.min,
        summary.max,
        summary.mean,
        summary.median,
        summary.max_depth_m,
        profile.very_low,
        profile.low,
        profile.medium,
        profile.high,
        profile.very_high,
    );

    if !stats.impenetrable.is_empty() {
        out.push_str("\n*Impenetrável:*\n");
        for layer in &stats.impenetrable {
            out.push_str(&format!(
                "- Amostra {} a {:.2} m: NSPT {}, penetração {:.0} cm\n",
                layer.sample_number, layer.depth_m, layer.nspt, layer.penetration_cm
            ));
        }
    }
    out
}

fn analysis_section(analysis: &SoundingAnalysis) -> String {
    let mut out = String::from("\n== Análise geotécnica\n\n");

    if analysis.soft_layers.is_empty() {
        out.push_str("Nenhuma camada mole identificada.\n\n");
    } else {
        out.push_str("*Camadas moles:*\n");
        for run in &analysis.soft_layers {
            out.push_str(&format!(
                "- {:.2} a {:.2} m (espessura {:.2} m, NSPT médio {:.1})\n",
                run.depth_from_m, run.depth_to_m, run.thickness_m, run.mean_nspt
            ));
        }
        out.push('\n');
    }

    match &analysis.foundation {
        Some(run) => out.push_str(&format!(
            "*Cota de apoio sugerida:* {:.2} m (NSPT médio {:.1})\n\n",
            run.depth_from_m, run.mean_nspt
        )),
        None => out.push_str("*Cota de apoio sugerida:* não identificada\n\n"),
    }

    if let Some(stress) = &analysis.admissible_stress {
        out.push_str(&format!(
            "*Tensão admissível:* {:.1} kPa a {:.2} m (NSPT médio {:.0}, capacidade {:.1} kPa, FS {})\n\n",
            stress.admissible_stress_kpa,
            stress.depth_m,
            stress.mean_nspt,
            stress.bearing_capacity_kpa,
            stress.safety_factor
        ));
    }

    if !analysis.liquefaction.is_empty() {
        out.push_str("*Risco de liquefação:*\n");
        for risk in &analysis.liquefaction {
            let level = match risk.level {
                RiskLevel::Alto => "Alto",
                RiskLevel::Moderado => "Moderado",
            };
            out.push_str(&format!(
                "- {:.2} m: NSPT {} (corrigido {:.1}), risco {}\n",
                risk.depth_m, risk.nspt, risk.corrected_nspt, level
            ));
        }
        out.push('\n');
    }

    if !analysis.refusals.is_empty() {
        out.push_str("*Critério de paralisação:*\n");
        for refusal in &analysis.refusals {
            out.push_str(&format!(
                "- Amostra {} a {:.2} m: {}\n",
                refusal.sample_number,
                refusal.depth_m,
                escape_typst(&refusal.reason)
            ));
        }
        out.push('\n');
    }

    out
}

fn photos_section(photos: &[PhotoEntry]) -> String {
    let rows: Vec<String> = photos
        .iter()
        .map(|p| {
            format!(
                "  [{}], {}, {}, {}, {},",
                p.order,
                cell(&p.kind),
                cell(&p.description),
                cell(p.taken_at.as_deref().unwrap_or("-")),
                cell(&p.file),
            )
        })
        .collect();

    format!(
        r##"
== Registro fotográfico

#table(
  columns: (auto, auto, 1fr, auto, auto),
  table.header([*Nº*], [*Tipo*], [*Descrição*], [*Data*], [*Arquivo*]),
{}
)
"##,
        rows.join("\n")
    )
}

fn references_section(doc: &ReportDocument) -> String {
    let mut out = String::from("\n== Referências normativas\n\n");
    for reference in &doc.references {
        out.push_str(&format!(
            "- *{}* {}\n",
            escape_typst(&reference.code),
            escape_typst(&reference.title)
        ));
    }

    out.push_str(&format!(
        r##"
#v(24pt)
#align(center)[
  #line(length: 40%, stroke: 0.5pt)
  {} \
  CREA {} \
  {}
]
"##,
        escape_typst(&doc.header.responsible.name),
        escape_typst(&doc.header.responsible.crea),
        escape_typst(&doc.header.responsible.role),
    ));
    out
}

/// A content block holding escaped text
fn cell(s: &str) -> String {
    format!("[{}]", escape_typst(s))
}

/// `#RRGGBB` as given, the fallback gray otherwise
fn legend_fill(color: &str) -> &str {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        color
    } else {
        FALLBACK_COLOR
    }
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            '{' => "\\{".to_string(),
            '}' => "\\}".to_string(),
            ']' => "\\]".to_string(),
            '/' => "\\/".to_string(),
            '=' => "\\=".to_string(),
            '~' => "\\~".to_string(),
            '-' => "\\-".to_string(),
            '+' => "\\+".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
