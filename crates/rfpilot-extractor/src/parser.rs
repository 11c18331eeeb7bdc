//! Parse remote extraction payloads into extraction records

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::normalize::{normalize_date, parse_amount, DateShape};
use crate::types::{ExtractionResult, RequirementCandidate};
use rfpilot_domain::{Category, Priority};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;

/// Parse a JSON extraction payload with the default requirement bounds
pub fn parse_extraction(payload: &str) -> Result<ExtractionResult, ExtractorError> {
    parse_extraction_with(payload, &ExtractorConfig::default())
}

/// Parse a JSON extraction payload
///
/// Parsing is lenient field by field: a field with the wrong type is dropped
/// rather than failing the whole payload. Only a payload that is not a JSON
/// object at all is rejected. Requirements outside the configured length
/// bounds are dropped, the same as for pattern extraction.
pub fn parse_extraction_with(
    payload: &str,
    config: &ExtractorConfig,
) -> Result<ExtractionResult, ExtractorError> {
    let json_str = extract_json(payload)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::RemoteMalformed(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| ExtractorError::RemoteMalformed("Expected JSON object".to_string()))?;

    Ok(ExtractionResult {
        title: string_field(obj, "title"),
        client_name: string_field(obj, "client_name"),
        deadline: deadline_field(obj),
        budget_min: amount_field(obj, "budget_min"),
        budget_max: amount_field(obj, "budget_max"),
        currency: string_field(obj, "currency").map(|c| c.to_uppercase()),
        description: string_field(obj, "description"),
        required_technologies: string_list(obj, "required_technologies"),
        requirements: requirement_list(obj, config),
    })
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.is_empty() {
        return Err(ExtractorError::RemoteMalformed("Empty payload".to_string()));
    }

    // Check if wrapped in markdown code block
    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::RemoteMalformed("Empty code block".to_string()));
        }

        // Skip first line (```json or ```) and last line (```)
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        return Ok(lines[1..end].join("\n"));
    }

    // Prose around a single object
    if !trimmed.starts_with('{') {
        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if start < end {
                return Ok(trimmed[start..=end].to_string());
            }
        }
    }

    Ok(trimmed.to_string())
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn amount_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }?;

    if value < 0.0 {
        warn!("Dropping negative {} from remote payload: {}", key, value);
        return None;
    }
    Some(value)
}

fn deadline_field(obj: &Map<String, Value>) -> Option<String> {
    let raw = string_field(obj, "deadline")?;
    // Tolerate full timestamps
    let date_part = raw.split('T').next().unwrap_or(&raw);

    let normalized = normalize_date(date_part, DateShape::Numeric)
        .or_else(|| normalize_date(&raw, DateShape::MonthName));
    if normalized.is_none() {
        warn!("Dropping unparseable remote deadline: {}", raw);
    }
    normalized
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn requirement_list(obj: &Map<String, Value>, config: &ExtractorConfig) -> Vec<RequirementCandidate> {
    let Some(items) = obj.get("requirements").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut requirements = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        match parse_requirement(item) {
            Ok(candidate) => {
                let len = candidate.text.chars().count();
                if len < config.min_requirement_len || len > config.max_requirement_len {
                    warn!(
                        "Dropping remote requirement {} with {} characters (allowed {}..={})",
                        idx, len, config.min_requirement_len, config.max_requirement_len
                    );
                    continue;
                }
                if seen.insert(candidate.text.clone()) {
                    requirements.push(candidate);
                }
            }
            Err(e) => warn!("Failed to parse requirement {}: {}", idx, e),
        }
    }

    requirements
}

/// Parse a single requirement from JSON
fn parse_requirement(json: &Value) -> Result<RequirementCandidate, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Requirement is not a JSON object".to_string())?;

    let text = string_field(obj, "requirement_text")
        .or_else(|| string_field(obj, "text"))
        .ok_or_else(|| "Missing or invalid 'requirement_text'".to_string())?;
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let category = obj
        .get("category")
        .and_then(|v| v.as_str())
        .and_then(Category::parse)
        .unwrap_or_default();

    let priority = obj
        .get("priority")
        .and_then(|v| v.as_str())
        .and_then(Priority::parse)
        .unwrap_or(Priority::Medium);

    // Only an explicit false makes a requirement optional
    let is_mandatory = obj
        .get("is_mandatory")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    Ok(RequirementCandidate {
        text,
        category,
        priority,
        is_mandatory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let payload = r#"{
            "title": "Permit Portal Modernization",
            "client_name": "City of Springfield",
            "description": "Replace the permit portal",
            "deadline": "2025-11-15",
            "budget_min": 200000,
            "budget_max": 500000,
            "currency": "usd",
            "required_technologies": ["Rust", "PostgreSQL"],
            "requirements": [
                {
                    "requirement_text": "Vendor must hold ISO 27001",
                    "category": "Compliance",
                    "priority": "high",
                    "is_mandatory": true
                }
            ]
        }"#;

        let result = parse_extraction(payload).unwrap();
        assert_eq!(result.title.as_deref(), Some("Permit Portal Modernization"));
        assert_eq!(result.client_name.as_deref(), Some("City of Springfield"));
        assert_eq!(result.deadline.as_deref(), Some("2025-11-15"));
        assert_eq!(result.budget_min, Some(200_000.0));
        assert_eq!(result.budget_max, Some(500_000.0));
        assert_eq!(result.currency.as_deref(), Some("USD"));
        assert_eq!(result.required_technologies, vec!["Rust", "PostgreSQL"]);
        assert_eq!(result.requirements.len(), 1);
        assert_eq!(result.requirements[0].category, Category::Compliance);
        assert_eq!(result.requirements[0].priority, Priority::High);
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let payload = "```json\n{\"client_name\": \"Acme\"}\n```";
        let result = parse_extraction(payload).unwrap();
        assert_eq!(result.client_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_parse_json_surrounded_by_prose() {
        let payload = "Here is the data: {\"currency\": \"EUR\"} Let me know.";
        let result = parse_extraction(payload).unwrap();
        assert_eq!(result.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_extraction("This is not JSON");
        assert!(matches!(result, Err(ExtractorError::RemoteMalformed(_))));
    }

    #[test]
    fn test_parse_json_not_object() {
        let result = parse_extraction(r#"[{"requirement_text": "x"}]"#);
        assert!(matches!(result, Err(ExtractorError::RemoteMalformed(_))));
    }

    #[test]
    fn test_parse_empty_payload() {
        assert!(matches!(
            parse_extraction("   "),
            Err(ExtractorError::RemoteMalformed(_))
        ));
    }

    #[test]
    fn test_wrong_types_are_dropped() {
        let payload = r#"{
            "client_name": 42,
            "budget_min": "1,500,000",
            "budget_max": -5,
            "deadline": "sometime soon",
            "required_technologies": ["Rust", 7, "  "]
        }"#;

        let result = parse_extraction(payload).unwrap();
        assert_eq!(result.client_name, None);
        assert_eq!(result.budget_min, Some(1_500_000.0));
        assert_eq!(result.budget_max, None);
        assert_eq!(result.deadline, None);
        assert_eq!(result.required_technologies, vec!["Rust"]);
    }

    #[test]
    fn test_deadline_formats() {
        let parse = |d: &str| {
            parse_extraction(&format!(r#"{{"deadline": "{}"}}"#, d))
                .unwrap()
                .deadline
        };

        assert_eq!(parse("2025-11-15T17:00:00Z").as_deref(), Some("2025-11-15"));
        assert_eq!(parse("November 15, 2025").as_deref(), Some("2025-11-15"));
        assert_eq!(parse("15/11/2025").as_deref(), Some("2025-11-15"));
    }

    #[test]
    fn test_requirement_defaults() {
        let payload = r#"{"requirements": [
            {"requirement_text": "Provide on-site training", "category": "business"},
            {"requirement_text": "Optional dark mode", "is_mandatory": false, "priority": "LOW"}
        ]}"#;

        let result = parse_extraction(payload).unwrap();
        assert_eq!(result.requirements.len(), 2);
        assert_eq!(result.requirements[0].category, Category::Technical);
        assert_eq!(result.requirements[0].priority, Priority::Medium);
        assert!(result.requirements[0].is_mandatory);
        assert!(!result.requirements[1].is_mandatory);
        assert_eq!(result.requirements[1].priority, Priority::Low);
    }

    #[test]
    fn test_partial_success() {
        let payload = r#"{"requirements": [
            {"requirement_text": "Data residency in the EU"},
            {"category": "Technical"},
            "not an object",
            {"requirement_text": "Data   residency in the EU"},
            {"requirement_text": "Quarterly business reviews"}
        ]}"#;

        let result = parse_extraction(payload).unwrap();
        let texts: Vec<&str> = result.requirements.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Data residency in the EU", "Quarterly business reviews"]);
    }

    #[test]
    fn test_requirement_length_bounds() {
        let long = "y".repeat(801);
        let payload = format!(
            r#"{{"requirements": [
                {{"requirement_text": "SSO"}},
                {{"requirement_text": "  Single   sign-on  "}},
                {{"requirement_text": "{}"}},
                {{"requirement_text": "Single sign-on via SAML"}}
            ]}}"#,
            long
        );

        let result = parse_extraction(&payload).unwrap();
        let texts: Vec<&str> = result.requirements.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Single sign-on via SAML"]);

        let result = parse_extraction_with(&payload, &ExtractorConfig::compact()).unwrap();
        let texts: Vec<&str> = result.requirements.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Single sign-on", "Single sign-on via SAML"]);

        let lenient = ExtractorConfig {
            min_requirement_len: 3,
            ..ExtractorConfig::default()
        };
        let result = parse_extraction_with(r#"{"requirements": [{"text": "SSO"}]}"#, &lenient).unwrap();
        assert_eq!(result.requirements[0].text, "SSO");
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert!(extract_json(response).unwrap().contains("key"));
    }
}
