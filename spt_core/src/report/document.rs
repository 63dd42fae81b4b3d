//! Document model handed to the report renderer.
//!
//! Everything here is already formatted: strings carry their units and
//! decimal places, so the renderer only lays text out.

use serde::{Deserialize, Serialize};

use crate::calculations::statistics::{
    ImpenetrableLayer, NsptChart, ResistanceProfile, SoundingAnalysis, SummaryStatistics,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    pub header: ReportHeader,
    pub equipment: EquipmentBlock,
    pub water_table: WaterTableBlock,
    pub samples: Vec<SampleRow>,
    pub layers: Vec<LayerRow>,
    pub remarks: RemarksBlock,
    pub statistics: StatisticsBlock,
    /// Present when analysis is enabled in the report settings
    pub analysis: Option<SoundingAnalysis>,
    pub chart: NsptChart,
    pub photos: Vec<PhotoEntry>,
    pub references: Vec<NormativeReference>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub company: CompanyHeader,
    pub responsible: ResponsibleHeader,
    pub project: ProjectHeader,
    pub work: WorkHeader,
    pub sounding: SoundingHeader,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyHeader {
    pub legal_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsibleHeader {
    pub name: String,
    pub crea: String,
    pub role: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectHeader {
    pub name: String,
    pub code: String,
    pub client: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkHeader {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub datum: String,
    pub utm_zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoundingHeader {
    pub code: String,
    /// dd/mm/YYYY, empty when unknown
    pub execution_date: String,
    pub driller: String,
    /// "E: 333250.00 m, N: 7394100.00 m"
    pub coordinates: String,
    /// Ground elevation, "812.40 m"
    pub elevation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentBlock {
    pub hammer: HammerSpec,
    pub sampler: SamplerSpec,
    pub casing: ToolSpec,
    pub auger: ToolSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HammerSpec {
    pub weight: String,
    pub drop_height: String,
    pub system: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerSpec {
    pub external_diameter: String,
    pub internal_diameter: String,
    /// "111.7%", or "-" when it cannot be computed
    pub area_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub diameter: String,
    pub depth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterTableBlock {
    pub initial: WaterTableEntry,
    #[serde(rename = "final")]
    pub final_reading: WaterTableEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterTableEntry {
    pub present: bool,
    pub depth: Option<String>,
    pub date: Option<String>,
}

/// One line of the sample table. Values are copied, never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub number: u32,
    pub perforation: String,
    /// "1.00 - 1.30"
    pub depth_range: String,
    /// "-" when the first section was not counted
    pub blows_1: String,
    pub blows_2: i32,
    pub blows_3: i32,
    pub nspt_1_2: i32,
    pub nspt_2_3: i32,
    pub penetration_cm: f64,
    /// "Sim" or "Não"
    pub blow_limit: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRow {
    pub number: u32,
    pub depth_range: String,
    pub thickness: String,
    pub classification: String,
    pub description: String,
    pub color: String,
    pub origin: String,
    /// Hex legend color for the profile drawing
    pub legend_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemarksBlock {
    pub paralysis: Option<String>,
    pub general: Option<String>,
    /// "Profundidade final: 25.00 m | Trado: 1.20 m"
    pub depths: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBlock {
    pub summary: SummaryStatistics,
    pub resistance_profile: ResistanceProfile,
    pub impenetrable: Vec<ImpenetrableLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEntry {
    pub order: u32,
    pub kind: String,
    pub file: String,
    pub description: String,
    pub coordinates: Option<String>,
    pub taken_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormativeReference {
    pub code: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// dd/mm/YYYY HH:MM
    pub generated_at: String,
    pub version: u32,
    pub status: String,
    pub compliance_score: Option<u8>,
    /// Suggested PDF file name
    pub file_name: String,
}
