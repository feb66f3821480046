//! Best-effort scraping of structured fields out of the model's free-text
//! reply. There is no grammar for that output, so this stays advisory:
//! false positives and misses are acceptable, and callers must not treat
//! the result as authoritative.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    /// Last line of exactly 17 ASCII alphanumerics, if any. No checksum
    /// validation.
    pub vin: Option<String>,
    /// Lines that look like diagnostic trouble codes. Duplicates kept.
    pub dtcs: Vec<String>,
    /// `key: value` lines; later duplicate keys overwrite earlier ones.
    pub live_data: BTreeMap<String, String>,
}

/// Scan the reply line by line. Each trimmed, non-empty line is classified
/// once: VIN shape first, then DTC shape, then single-colon key/value.
pub fn extract_fields(text: &str) -> ExtractedFields {
    let mut fields = ExtractedFields::default();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line.len() == 17 && line.chars().all(|c| c.is_ascii_alphanumeric()) {
            fields.vin = Some(line.to_string());
        } else if looks_like_dtc(line) {
            fields.dtcs.push(line.to_string());
        } else if line.matches(':').count() == 1 {
            if let Some((key, value)) = line.split_once(':') {
                fields
                    .live_data
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    fields
}

/// DTC families are Powertrain, Body, Chassis and network (U) codes.
fn looks_like_dtc(line: &str) -> bool {
    line.len() >= 5 && matches!(line.as_bytes()[0], b'P' | b'U' | b'C' | b'B')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seventeen_char_alphanumeric_line_is_the_vin_guess() {
        let fields = extract_fields("WVWZZZ1JZ3W386752");
        assert_eq!(fields.vin.as_deref(), Some("WVWZZZ1JZ3W386752"));
    }

    #[test]
    fn wrong_length_lines_are_not_vins() {
        assert_eq!(extract_fields("WVWZZZ1JZ3W38675").vin, None);
        assert_eq!(extract_fields("WVWZZZ1JZ3W3867521").vin, None);
    }

    #[test]
    fn last_vin_shaped_line_wins() {
        let fields = extract_fields("WVWZZZ1JZ3W386752\nsome text\n1HGCM82633A004352");
        assert_eq!(fields.vin.as_deref(), Some("1HGCM82633A004352"));
    }

    #[test]
    fn dtc_shaped_lines_are_collected() {
        let fields = extract_fields("P0420\nU0101\nB1234\nC0035");
        assert_eq!(fields.dtcs, vec!["P0420", "U0101", "B1234", "C0035"]);
    }

    #[test]
    fn invalid_leading_letter_is_not_a_dtc() {
        let fields = extract_fields("X0420");
        assert!(fields.dtcs.is_empty());
    }

    #[test]
    fn short_lines_are_not_dtcs() {
        let fields = extract_fields("P042");
        assert!(fields.dtcs.is_empty());
    }

    #[test]
    fn duplicate_dtcs_are_kept() {
        let fields = extract_fields("P0420\nP0420");
        assert_eq!(fields.dtcs, vec!["P0420", "P0420"]);
    }

    #[test]
    fn single_colon_line_becomes_live_data_entry() {
        let fields = extract_fields("RPM: 2500");
        assert_eq!(fields.live_data.get("RPM").map(String::as_str), Some("2500"));
    }

    #[test]
    fn two_colon_lines_are_skipped() {
        let fields = extract_fields("Time: 12:30");
        assert!(fields.live_data.is_empty());
    }

    #[test]
    fn later_duplicate_keys_overwrite() {
        let fields = extract_fields("RPM: 2500\nRPM: 900");
        assert_eq!(fields.live_data.get("RPM").map(String::as_str), Some("900"));
    }

    #[test]
    fn dtc_prefix_takes_precedence_over_key_value() {
        // Classification is one-shot per line: a C-leading key/value line is
        // collected as a DTC-shaped line, not as live data.
        let fields = extract_fields("Coolant temp: 92");
        assert_eq!(fields.dtcs, vec!["Coolant temp: 92"]);
        assert!(fields.live_data.is_empty());
    }

    #[test]
    fn mixed_reply_is_classified_line_by_line() {
        let reply = "\
            Readings from the cluster:\n\
            1HGCM82633A004352\n\
            P0420\n\
            RPM: 2500\n\
            Throttle: 14\n\
            \n\
            The catalyst efficiency code suggests a failing converter.";
        let fields = extract_fields(reply);

        assert_eq!(fields.vin.as_deref(), Some("1HGCM82633A004352"));
        assert_eq!(fields.dtcs, vec!["P0420"]);
        assert_eq!(
            fields.live_data.get("RPM").map(String::as_str),
            Some("2500")
        );
        assert_eq!(
            fields.live_data.get("Throttle").map(String::as_str),
            Some("14")
        );
    }
}
