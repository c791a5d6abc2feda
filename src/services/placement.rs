use crate::domain::models::Finding;
use crate::frontmatter::Document;
use crate::schema::{FieldRule, TypeSchema};
use regex::Regex;
use serde_yaml::Value;

/// Field placement and ordering checks (invariants over top-level keys and
/// the metadata sub-mapping).
pub fn check_placement(doc: &Document, schema: &TypeSchema) -> Vec<Finding> {
    let path = doc.path_str();
    let mut findings = Vec::new();

    let top_keys: Vec<&str> = doc
        .frontmatter
        .iter()
        .filter_map(|(k, _)| k.as_str())
        .collect();

    let metadata_present = doc.frontmatter.get("metadata").is_some();
    if metadata_present && doc.metadata().is_none() {
        findings.push(Finding::critical(
            &path,
            "metadata must be a mapping if present",
        ));
    }

    // Non-official top-level fields that the schema routes into metadata.
    let mut misplaced: Vec<&str> = top_keys
        .iter()
        .filter(|k| **k != "metadata" && !schema.is_official(k) && schema.is_metadata_field(k))
        .copied()
        .collect();
    misplaced.sort_unstable();
    if !misplaced.is_empty() {
        findings.push(Finding::critical(
            &path,
            format!(
                "Fields should be in metadata section: {}",
                misplaced.join(", ")
            ),
        ));
    }

    if let Some(metadata) = doc.metadata() {
        let mut official_inside: Vec<&str> = schema
            .official_fields()
            .filter(|f| metadata.get(f.as_str()).is_some())
            .map(String::as_str)
            .collect();
        official_inside.sort_unstable();
        if !official_inside.is_empty() {
            findings.push(Finding::critical(
                &path,
                format!(
                    "Official fields should be in top-level, not metadata: {}",
                    official_inside.join(", ")
                ),
            ));
        }
    }

    let mut missing: Vec<&str> = schema
        .required
        .iter()
        .filter(|f| doc.frontmatter.get(f.as_str()).is_none())
        .map(String::as_str)
        .collect();
    missing.sort_unstable();
    if !missing.is_empty() {
        findings.push(Finding::critical(
            &path,
            format!("Missing required field(s): {}", missing.join(", ")),
        ));
    }

    findings.extend(check_key_order(doc, schema));
    findings.extend(check_metadata_sorted(doc));
    findings
}

/// Expected order is required-present ++ optional-present (both in schema
/// order) ++ ["metadata"] when present; actual order is the file's key order
/// restricted to that set. A mismatch is a warning, not critical.
fn check_key_order(doc: &Document, schema: &TypeSchema) -> Vec<Finding> {
    if doc.key_order.is_empty() {
        return Vec::new();
    }

    let mut expected: Vec<&str> = schema
        .official_fields()
        .filter(|f| doc.frontmatter.get(f.as_str()).is_some())
        .map(String::as_str)
        .collect();
    if doc.frontmatter.get("metadata").is_some() {
        expected.push("metadata");
    }

    let actual: Vec<&str> = doc
        .key_order
        .iter()
        .map(String::as_str)
        .filter(|k| expected.contains(k))
        .collect();

    if actual != expected {
        return vec![Finding::warning(
            doc.path_str(),
            format!(
                "Frontmatter key order should be: {}. Found: {}",
                expected.join(", "),
                actual.join(", ")
            ),
        )];
    }
    Vec::new()
}

fn check_metadata_sorted(doc: &Document) -> Vec<Finding> {
    let Some(metadata) = doc.metadata() else {
        return Vec::new();
    };
    let keys: Vec<&str> = metadata.iter().filter_map(|(k, _)| k.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    if keys != sorted {
        return vec![Finding::warning(
            doc.path_str(),
            format!(
                "Metadata keys should be alphabetically sorted. Expected: {}, Found: {}",
                sorted.join(", "),
                keys.join(", ")
            ),
        )];
    }
    Vec::new()
}

/// Schema-driven per-field constraints: regex patterns, length limits,
/// enumerations, recommended substrings, and integer ranges. Applied to the
/// field wherever it lives (top level or metadata).
pub fn check_field_rules(doc: &Document, schema: &TypeSchema) -> Vec<Finding> {
    let path = doc.path_str();
    let mut findings = Vec::new();

    for (field, rule) in &schema.validation_rules {
        let Some(value) = doc.field(field) else {
            continue;
        };
        findings.extend(check_field_rule(&path, field, value, rule));
    }
    findings
}

fn check_field_rule(path: &str, field: &str, value: &Value, rule: &FieldRule) -> Vec<Finding> {
    let mut findings = Vec::new();

    if rule.min.is_some() || rule.max.is_some() {
        match value.as_i64() {
            None => {
                findings.push(Finding::critical(
                    path,
                    format!("{field} must be an integer"),
                ));
            }
            Some(n) => {
                let min = rule.min.unwrap_or(i64::MIN);
                let max = rule.max.unwrap_or(i64::MAX);
                if n < min || n > max {
                    findings.push(Finding::critical(
                        path,
                        format!("{field} must be between {min} and {max}"),
                    ));
                }
            }
        }
        return findings;
    }

    let Some(text) = value.as_str() else {
        if rule.pattern.is_some() || !rule.allowed.is_empty() || rule.max_length.is_some() {
            findings.push(Finding::critical(path, format!("{field} must be a string")));
        }
        return findings;
    };

    if let Some(pattern) = &rule.pattern {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(text) {
                    findings.push(Finding::critical(
                        path,
                        format!("{field} must match pattern: {pattern}"),
                    ));
                }
            }
            Err(_) => {
                findings.push(Finding::warning(
                    path,
                    format!("invalid pattern in schema for {field}: {pattern}"),
                ));
            }
        }
    }

    if let Some(max_length) = rule.max_length {
        if text.chars().count() > max_length {
            findings.push(Finding::warning(
                path,
                format!("{field} exceeds {max_length} character limit"),
            ));
        }
    }

    if !rule.allowed.is_empty() && !rule.allowed.iter().any(|a| a == text) {
        findings.push(Finding::critical(
            path,
            format!("{field} must be one of: {}", rule.allowed.join(", ")),
        ));
    }

    let lower = text.to_lowercase();
    for include in &rule.recommended_includes {
        if !lower.contains(&include.to_lowercase()) {
            findings.push(Finding::warning(
                path,
                format!("{field} should include '{include}' for better discovery"),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{DocumentType, Severity};
    use crate::frontmatter;
    use crate::schema::SchemaRegistry;
    use std::path::PathBuf;

    fn skill_doc(text: &str) -> Document {
        let (fm, order, body) = frontmatter::parse(text).expect("parse");
        Document {
            path: PathBuf::from("skills/commit/SKILL.md"),
            doc_type: DocumentType::Skill,
            frontmatter: fm,
            key_order: order,
            body,
        }
    }

    fn skill_schema() -> TypeSchema {
        SchemaRegistry::load_default()
            .unwrap()
            .for_type(DocumentType::Skill)
            .unwrap()
            .clone()
    }

    const WELL_FORMED: &str = concat!(
        "---\n",
        "name: commit\n",
        "description: Create commits. Use when committing changes.\n",
        "license: MIT\n",
        "metadata:\n",
        "  capability-level: 1\n",
        "  mode: assist\n",
        "---\n",
        "body\n",
    );

    #[test]
    fn well_formed_document_yields_no_findings() {
        let doc = skill_doc(WELL_FORMED);
        let schema = skill_schema();
        assert!(check_placement(&doc, &schema).is_empty());
        assert!(check_field_rules(&doc, &schema).is_empty());
    }

    #[test]
    fn metadata_only_field_at_top_level_is_critical() {
        let doc = skill_doc("---\nname: commit\ndescription: Use when committing.\nmode: assist\n---\n");
        let findings = check_placement(&doc, &skill_schema());
        assert!(findings.iter().any(|f| f.severity == Severity::Critical
            && f.message == "Fields should be in metadata section: mode"));
    }

    #[test]
    fn official_field_inside_metadata_is_critical() {
        let doc = skill_doc(
            "---\nname: commit\ndescription: Use when committing.\nmetadata:\n  license: MIT\n---\n",
        );
        let findings = check_placement(&doc, &skill_schema());
        assert!(findings.iter().any(|f| f.severity == Severity::Critical
            && f.message == "Official fields should be in top-level, not metadata: license"));
    }

    #[test]
    fn missing_required_fields_are_combined_and_sorted() {
        let doc = skill_doc("---\nlicense: MIT\n---\n");
        let findings = check_placement(&doc, &skill_schema());
        assert!(findings.iter().any(|f| f.severity == Severity::Critical
            && f.message == "Missing required field(s): description, name"));
    }

    #[test]
    fn key_order_permutations_warn() {
        // Every permutation other than schema order must produce a warning.
        let perms = [
            ["name", "description", "metadata"],
            ["name", "metadata", "description"],
            ["description", "name", "metadata"],
            ["description", "metadata", "name"],
            ["metadata", "name", "description"],
            ["metadata", "description", "name"],
        ];
        let schema = skill_schema();
        for perm in perms {
            let mut text = String::from("---\n");
            for key in perm {
                text.push_str(match key {
                    "name" => "name: commit\n",
                    "description" => "description: Use when committing.\n",
                    _ => "metadata:\n  mode: assist\n",
                });
            }
            text.push_str("---\n");

            let findings = check_placement(&skill_doc(&text), &schema);
            let order = findings
                .iter()
                .find(|f| f.message.starts_with("Frontmatter key order"));
            if perm == ["name", "description", "metadata"] {
                assert!(order.is_none(), "canonical order warned: {findings:?}");
            } else {
                let warn = order.unwrap_or_else(|| panic!("no warning for {perm:?}"));
                assert_eq!(warn.severity, Severity::Warning);
                assert!(warn.message.contains(&format!("Found: {}", perm.join(", "))));
            }
        }
    }

    #[test]
    fn metadata_after_official_fields_is_accepted() {
        let doc = skill_doc(WELL_FORMED);
        assert!(check_placement(&doc, &skill_schema())
            .iter()
            .all(|f| !f.message.starts_with("Frontmatter key order")));
    }

    #[test]
    fn unsorted_metadata_keys_warn() {
        let doc = skill_doc(
            "---\nname: commit\ndescription: Use when committing.\nmetadata:\n  mode: assist\n  capability-level: 1\n---\n",
        );
        let findings = check_placement(&doc, &skill_schema());
        let warn = findings
            .iter()
            .find(|f| f.message.starts_with("Metadata keys"))
            .expect("alpha warning");
        assert!(warn.message.contains("Expected: capability-level, mode"));
    }

    #[test]
    fn scalar_metadata_is_critical() {
        let doc = skill_doc("---\nname: commit\ndescription: Use when committing.\nmetadata: 3\n---\n");
        let findings = check_placement(&doc, &skill_schema());
        assert!(findings
            .iter()
            .any(|f| f.message == "metadata must be a mapping if present"));
    }

    #[test]
    fn field_rules_flag_pattern_and_range_violations() {
        let doc = skill_doc(
            "---\nname: Bad Name\ndescription: Use when committing.\nmetadata:\n  capability-level: 9\n---\n",
        );
        let findings = check_field_rules(&doc, &skill_schema());
        assert!(findings
            .iter()
            .any(|f| f.message.starts_with("name must match pattern")));
        assert!(findings
            .iter()
            .any(|f| f.message == "capability-level must be between 0 and 4"));
    }

    #[test]
    fn field_rules_flag_missing_recommended_substring() {
        let doc = skill_doc("---\nname: commit\ndescription: Creates commits\n---\n");
        let findings = check_field_rules(&doc, &skill_schema());
        assert!(findings.iter().any(|f| f.severity == Severity::Warning
            && f.message == "description should include 'use when' for better discovery"));
    }

    #[test]
    fn enum_rules_flag_unknown_values() {
        let reg = SchemaRegistry::load_default().unwrap();
        let schema = reg.for_type(DocumentType::RuleBlock).unwrap();
        let (fm, order, body) = frontmatter::parse(
            "---\nname: rule-block:naming\nlayer: cosmic\n---\n",
        )
        .unwrap();
        let doc = Document {
            path: PathBuf::from("governance/rules/naming.md"),
            doc_type: DocumentType::RuleBlock,
            frontmatter: fm,
            key_order: order,
            body,
        };
        let findings = check_field_rules(&doc, schema);
        assert!(findings
            .iter()
            .any(|f| f.message == "layer must be one of: foundation, policy, task"));
    }
}
