//! Prompt construction for the diagnosis endpoints.
//!
//! The prompt is plain string interpolation: blank fields render as a
//! literal "None" line, fault codes keep their request order. Free-text
//! fields are clipped so an oversized notes blob cannot blow up the
//! upstream token bill.

use crate::dtos::AnalyzeJobRequest;
use serde_json::Value;

/// Character budget applied to the free-text sections (notes, OCR dump).
pub const MAX_FREE_TEXT_CHARS: usize = 4000;

/// Build the prompt for the text diagnosis path.
pub fn build_job_prompt(request: &AnalyzeJobRequest) -> String {
    let vin = placeholder(request.vin.as_deref());
    let reg = placeholder(request.reg.as_deref());

    let dtc_block = if request.dtcs.is_empty() {
        "None".to_string()
    } else {
        request
            .dtcs
            .iter()
            .map(|code| format!("- {}", code))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let pid_block = if request.pids.is_empty() {
        "None".to_string()
    } else {
        request
            .pids
            .iter()
            .map(|(name, value)| format!("{}: {}", name, render_value(value)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let notes = clip(placeholder(request.notes.as_deref()));

    let mut prompt = format!(
        "Vehicle Diagnostic Request\n\
         --------------------------\n\
         VIN: {vin}\n\
         REG: {reg}\n\
         \n\
         Fault Codes:\n\
         {dtc_block}\n\
         \n\
         Live Sensor Data:\n\
         {pid_block}\n\
         \n\
         Notes:\n\
         {notes}\n"
    );

    if let Some(ocr) = non_blank(request.ocr_text.as_deref()) {
        prompt.push_str(&format!("\nDashboard OCR Text:\n{}\n", clip(ocr.to_string())));
    }

    prompt.push_str(
        "\n---\n\
         You are an automotive diagnostics assistant. Please provide:\n\
         - Root cause analysis\n\
         - Testing suggestions\n\
         - Common fixes or procedures\n",
    );

    prompt
}

/// Build the prompt for the image extraction path.
pub fn build_image_prompt(registration: Option<&str>, notes: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are an automotive diagnostics assistant. The attached photo shows a \
         vehicle instrument cluster or diagnostic scan tool screen.\n\
         Read everything legible off it and report, one item per line:\n\
         - the VIN if visible (17 characters, on its own line)\n\
         - any fault codes (one per line, e.g. P0420)\n\
         - live sensor readings as NAME: value lines\n\
         Then give a short diagnosis of what the readings suggest.\n",
    );

    if let Some(reg) = non_blank(registration) {
        prompt.push_str(&format!("\nRegistration: {}\n", reg));
    }
    if let Some(notes) = non_blank(notes) {
        prompt.push_str(&format!("\nTechnician notes:\n{}\n", clip(notes.to_string())));
    }

    prompt
}

/// Substitute the literal "None" for absent or blank fields.
fn placeholder(value: Option<&str>) -> String {
    match non_blank(value) {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Render a JSON scalar without the quoting `Value::to_string` adds.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn clip(text: String) -> String {
    if text.chars().count() <= MAX_FREE_TEXT_CHARS {
        return text;
    }
    let mut clipped: String = text.chars().take(MAX_FREE_TEXT_CHARS).collect();
    clipped.push_str("\n[truncated]");
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn empty_request() -> AnalyzeJobRequest {
        AnalyzeJobRequest::default()
    }

    #[test]
    fn empty_sections_render_none_placeholders() {
        let prompt = build_job_prompt(&empty_request());

        assert!(prompt.contains("VIN: None"));
        assert!(prompt.contains("REG: None"));
        assert!(prompt.contains("Fault Codes:\nNone"));
        assert!(prompt.contains("Live Sensor Data:\nNone"));
        assert!(prompt.contains("Notes:\nNone"));
    }

    #[test]
    fn blank_strings_render_none_placeholders() {
        let request = AnalyzeJobRequest {
            vin: Some("   ".to_string()),
            notes: Some("".to_string()),
            ..empty_request()
        };
        let prompt = build_job_prompt(&request);

        assert!(prompt.contains("VIN: None"));
        assert!(prompt.contains("Notes:\nNone"));
    }

    #[test]
    fn fault_codes_keep_order_with_marker_prefix() {
        let request = AnalyzeJobRequest {
            dtcs: vec!["P0420".to_string(), "C1234".to_string(), "P0171".to_string()],
            ..empty_request()
        };
        let prompt = build_job_prompt(&request);

        let p0420 = prompt.find("- P0420").expect("P0420 listed");
        let c1234 = prompt.find("- C1234").expect("C1234 listed");
        let p0171 = prompt.find("- P0171").expect("P0171 listed");
        assert!(p0420 < c1234 && c1234 < p0171);
    }

    #[test]
    fn sensor_readings_render_as_key_value_lines() {
        let mut pids = BTreeMap::new();
        pids.insert("RPM".to_string(), json!(2500));
        pids.insert("Coolant".to_string(), json!("92C"));

        let request = AnalyzeJobRequest {
            pids,
            ..empty_request()
        };
        let prompt = build_job_prompt(&request);

        assert!(prompt.contains("RPM: 2500"));
        // String values render unquoted.
        assert!(prompt.contains("Coolant: 92C"));
    }

    #[test]
    fn ocr_section_only_appears_when_present() {
        let without = build_job_prompt(&empty_request());
        assert!(!without.contains("Dashboard OCR Text:"));

        let request = AnalyzeJobRequest {
            ocr_text: Some("CHECK ENGINE".to_string()),
            ..empty_request()
        };
        let with = build_job_prompt(&request);
        assert!(with.contains("Dashboard OCR Text:\nCHECK ENGINE"));
    }

    #[test]
    fn oversized_notes_are_clipped() {
        let request = AnalyzeJobRequest {
            notes: Some("x".repeat(MAX_FREE_TEXT_CHARS * 2)),
            ..empty_request()
        };
        let prompt = build_job_prompt(&request);

        assert!(prompt.contains("[truncated]"));
        assert!(prompt.len() < MAX_FREE_TEXT_CHARS * 2);
    }

    #[test]
    fn image_prompt_includes_optional_context() {
        let prompt = build_image_prompt(Some("AB12 CDE"), Some("rough idle"));
        assert!(prompt.contains("Registration: AB12 CDE"));
        assert!(prompt.contains("rough idle"));

        let bare = build_image_prompt(None, Some("  "));
        assert!(!bare.contains("Registration:"));
        assert!(!bare.contains("Technician notes:"));
    }
}
