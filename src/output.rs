//! Extraction of the engine's trailing JSON payload.
//!
//! The engine is free to print prose and log lines before its structured
//! answer. The payload is defined as starting at the *last* line whose
//! content, trimmed of trailing whitespace, is exactly `{` - scanning
//! backward correctly skips embedded braces inside earlier prose - and
//! running through end of output.

use serde_json::Value;

use crate::error::{HarnessError, Result};

/// Isolate and parse the trailing JSON object from raw engine stdout.
pub fn extract_payload(stdout: &str) -> Result<Value> {
    let mut start = None;
    let mut offset = 0usize;
    let mut line_offsets = Vec::new();
    for line in stdout.split_inclusive('\n') {
        line_offsets.push((offset, line));
        offset += line.len();
    }
    for (line_start, line) in line_offsets.iter().rev() {
        if line.trim_end() == "{" {
            start = Some(*line_start);
            break;
        }
    }
    let Some(start) = start else {
        return Err(HarnessError::OutputParse {
            reason: "no JSON object found in engine output".to_string(),
            raw: stdout.to_string(),
        });
    };
    serde_json::from_str(&stdout[start..]).map_err(|err| HarnessError::OutputParse {
        reason: err.to_string(),
        raw: stdout.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_payload() {
        let payload = extract_payload("{\n  \"Result\": 42\n}\n").unwrap();
        assert_eq!(payload["Result"], 42);
    }

    #[test]
    fn tolerates_leading_prose() {
        let stdout = "Compiling package...\nwarning: unused variable\n{\n  \"Result\": {\n    \"success\": true\n  }\n}\n";
        let payload = extract_payload(stdout).unwrap();
        assert_eq!(payload["Result"]["success"], true);
    }

    #[test]
    fn backward_scan_skips_braces_in_prose() {
        // The brace inside the log line must not be mistaken for the payload.
        let stdout = "note: template is { \"x\": 1 }\nexpanding {\n  nothing\n{\n  \"Result\": null\n}\n";
        let payload = extract_payload(stdout).unwrap();
        assert!(payload["Result"].is_null());
    }

    #[test]
    fn missing_marker_line_is_a_parse_failure() {
        let err = extract_payload("all prose, no payload\n").unwrap_err();
        match err {
            HarnessError::OutputParse { raw, .. } => assert!(raw.contains("all prose")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_candidate_is_a_parse_failure() {
        let err = extract_payload("{\n  \"Result\": oops\n}\n").unwrap_err();
        assert!(matches!(err, HarnessError::OutputParse { .. }));
    }

    #[test]
    fn marker_line_may_carry_trailing_whitespace() {
        let stdout = "{  \t\n  \"Result\": 1\n}\n";
        assert_eq!(extract_payload(stdout).unwrap()["Result"], 1);
    }
}
