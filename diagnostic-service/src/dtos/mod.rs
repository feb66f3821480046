use crate::extract::ExtractedFields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /analyze-job`. Every field is optional; blank values render
/// as a literal "None" line in the generated prompt. The VIN is forwarded
/// as-is, 17 characters or not.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeJobRequest {
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub reg: Option<String>,
    /// Fault codes, listed in the prompt in request order.
    #[serde(default)]
    pub dtcs: Vec<String>,
    /// PID name -> reading value. JSON objects are unordered, so readings
    /// render in key order to keep prompts deterministic.
    #[serde(default)]
    pub pids: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ocr_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeJobResponse {
    pub result: String,
}

/// Body of a successful `POST /analyze-image`. `vin`, `dtcs` and `live_data`
/// are heuristic guesses scraped from the model's reply; `summary` is the
/// reply itself.
#[derive(Debug, Serialize)]
pub struct ImageAnalysisResponse {
    pub vin: Option<String>,
    pub dtcs: Vec<String>,
    pub live_data: BTreeMap<String, String>,
    pub summary: String,
}

impl ImageAnalysisResponse {
    pub fn new(fields: ExtractedFields, summary: String) -> Self {
        Self {
            vin: fields.vin,
            dtcs: fields.dtcs,
            live_data: fields.live_data,
            summary,
        }
    }
}
