use crate::domain::models::{DocumentType, Finding};
use crate::frontmatter::Document;
use crate::schema::{SchemaRegistry, TypeSchema};
use regex::Regex;
use serde_yaml::Value;

const HEDGING_WORDS: [&str; 10] = [
    "typically",
    "usually",
    "generally",
    "often",
    "sometimes",
    "may",
    "might",
    "could",
    "should",
    "would",
];

const IMPERATIVE_OPENERS: [&str; 7] = [
    "Check",
    "Validate",
    "Ensure",
    "Use",
    "Apply",
    "Execute",
    "Implement",
];

const RULE_HEADING_ORDER: [&str; 10] = [
    "scope",
    "absolute-prohibitions",
    "communication-protocol",
    "structural-rules",
    "language-rules",
    "formatting-rules",
    "naming-rules",
    "validation-rules",
    "narrative-detection",
    "depth-compatibility",
];

pub struct CheckContext<'a> {
    pub registry: &'a SchemaRegistry,
    pub schema: Option<&'a TypeSchema>,
}

/// A single content heuristic. Each checker decides its own applicability so
/// new heuristics can be added without touching the traversal.
pub trait ContentCheck {
    fn check(&self, doc: &Document, ctx: &CheckContext) -> Vec<Finding>;
}

pub fn default_checks() -> Vec<Box<dyn ContentCheck>> {
    vec![
        Box::new(NarrativeCheck),
        Box::new(BoldMarkerCheck),
        Box::new(EmojiCheck),
        Box::new(ModalVerbCheck),
        Box::new(CapabilityTierCheck),
        Box::new(StyleLabelCheck),
        Box::new(RuleHeadingCheck),
        Box::new(RuleFormattingCheck),
        Box::new(MemoryHintCheck),
        Box::new(LayerSectionCheck),
    ]
}

pub fn run_checks(doc: &Document, ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for check in default_checks() {
        findings.extend(check.check(doc, ctx));
    }
    findings
}

fn strip_fenced_code(text: &str) -> String {
    Regex::new(r"(?s)```.*?```")
        .expect("static regex")
        .replace_all(text, "")
        .into_owned()
}

fn strip_inline_code(text: &str) -> String {
    Regex::new(r"`[^`]+`")
        .expect("static regex")
        .replace_all(text, "")
        .into_owned()
}

/// Narrative prose heuristic: hedging vocabulary, or multi-sentence lines
/// that do not open with an imperative verb. Headings, list items, blanks
/// and fenced code are skipped.
pub fn has_narrative_content(text: &str) -> bool {
    let mut in_fence = false;
    for raw in text.lines() {
        let line = raw.trim();
        if line.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence
            || line.is_empty()
            || line.starts_with('#')
            || line.starts_with('-')
            || line.starts_with('*')
        {
            continue;
        }
        let lower = line.to_lowercase();
        if HEDGING_WORDS.iter().any(|w| lower.contains(w)) {
            return true;
        }
        let sentences = line
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count();
        if sentences > 1 && !IMPERATIVE_OPENERS.iter().any(|v| line.starts_with(v)) {
            return true;
        }
    }
    false
}

/// Count `**token**` emphasis wrappers outside fenced code.
pub fn count_bold_markers(body: &str) -> usize {
    let clean = strip_fenced_code(body);
    Regex::new(r"\*\*[^*\s]+\*\*")
        .expect("static regex")
        .find_iter(&clean)
        .count()
}

/// Codepoint-range membership over the emoji blocks the corpus bans:
/// emoticons, symbols & pictographs, transport, regional indicators.
pub fn contains_emoji(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(
            u32::from(c),
            0x1F600..=0x1F64F | 0x1F300..=0x1F5FF | 0x1F680..=0x1F6FF | 0x1F1E6..=0x1F1FF
        )
    })
}

struct NarrativeCheck;

impl ContentCheck for NarrativeCheck {
    fn check(&self, doc: &Document, _ctx: &CheckContext) -> Vec<Finding> {
        match doc.doc_type {
            DocumentType::Skill => {
                if has_narrative_content(&doc.body) {
                    return vec![Finding::warning(
                        doc.path_str(),
                        "Content appears to contain narrative text",
                    )];
                }
            }
            DocumentType::Rule => {
                if has_narrative_content(&doc.body) {
                    return vec![Finding::critical(
                        doc.path_str(),
                        "Rule files should not contain narrative content",
                    )];
                }
            }
            _ => {}
        }
        Vec::new()
    }
}

struct BoldMarkerCheck;

impl ContentCheck for BoldMarkerCheck {
    fn check(&self, doc: &Document, _ctx: &CheckContext) -> Vec<Finding> {
        if doc.doc_type != DocumentType::Skill {
            return Vec::new();
        }
        let count = count_bold_markers(&doc.body);
        if count > 0 {
            return vec![Finding::critical(
                doc.path_str(),
                format!("Found {count} bold markers in body content"),
            )];
        }
        Vec::new()
    }
}

struct EmojiCheck;

impl ContentCheck for EmojiCheck {
    fn check(&self, doc: &Document, _ctx: &CheckContext) -> Vec<Finding> {
        if doc.doc_type != DocumentType::Skill {
            return Vec::new();
        }
        if contains_emoji(&doc.body) {
            return vec![Finding::critical(doc.path_str(), "Content contains emojis")];
        }
        Vec::new()
    }
}

struct ModalVerbCheck;

impl ModalVerbCheck {
    fn applies(doc: &Document) -> bool {
        matches!(
            doc.doc_type,
            DocumentType::Skill | DocumentType::Agent | DocumentType::Command | DocumentType::Rule
        ) || (doc.doc_type == DocumentType::Memory
            && doc
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n == "CLAUDE.md" || n == "AGENTS.md")
                .unwrap_or(false))
    }
}

impl ContentCheck for ModalVerbCheck {
    fn check(&self, doc: &Document, _ctx: &CheckContext) -> Vec<Finding> {
        if !Self::applies(doc) {
            return Vec::new();
        }
        let path = doc.path_str();
        let text = strip_inline_code(&strip_fenced_code(&doc.body));
        let modal_re = Regex::new(r"(?i)\b(may|might|could)\b").expect("static regex");

        let mut findings = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('-') || trimmed.starts_with('*') {
                let lower = line.to_lowercase();
                // Normative rule definitions name the modal on purpose.
                if lower.contains("normative") || lower.contains("exception") {
                    continue;
                }
            }
            for m in modal_re.find_iter(line) {
                let line_num = idx + 1;
                findings.push(
                    Finding::warning(
                        &path,
                        format!(
                            "Modal verb '{}' found in line {}. Consider using imperative form instead.",
                            m.as_str(),
                            line_num
                        ),
                    )
                    .at_line(line_num),
                );
            }
        }
        findings
    }
}

struct CapabilityTierCheck;

impl ContentCheck for CapabilityTierCheck {
    fn check(&self, doc: &Document, ctx: &CheckContext) -> Vec<Finding> {
        let Some(schema) = ctx.schema else {
            return Vec::new();
        };
        let Some(level) = doc.field("capability-level").and_then(Value::as_i64) else {
            return Vec::new();
        };
        let path = doc.path_str();

        let mut findings = Vec::new();
        for tier in schema.structural_requirements.values() {
            if level < tier.min_level {
                continue;
            }
            for section in &tier.required_sections {
                if !doc.body.contains(section.as_str()) {
                    findings.push(Finding::warning(
                        &path,
                        format!(
                            "Capability level >= {} but missing {} section",
                            tier.min_level, section
                        ),
                    ));
                }
            }
            for field in &tier.required_fields {
                if doc.field(field).is_none() {
                    findings.push(Finding::critical(
                        &path,
                        format!(
                            "Capability level >= {} requires {} in metadata",
                            tier.min_level, field
                        ),
                    ));
                }
            }
        }
        findings
    }
}

struct StyleLabelCheck;

impl ContentCheck for StyleLabelCheck {
    fn check(&self, doc: &Document, ctx: &CheckContext) -> Vec<Finding> {
        let Some(value) = doc.field("style") else {
            return Vec::new();
        };
        let path = doc.path_str();

        let labels: Vec<&str> = match value {
            Value::String(s) => vec![s.as_str()],
            Value::Sequence(seq) => {
                let mut out = Vec::new();
                for item in seq {
                    match item.as_str() {
                        Some(s) => out.push(s),
                        None => {
                            return vec![Finding::critical(path, "style entries must be strings")]
                        }
                    }
                }
                out
            }
            _ => {
                return vec![Finding::critical(
                    path,
                    "style must be a string or list of strings",
                )]
            }
        };

        let mut findings = Vec::new();
        for label in &labels {
            if !ctx.registry.style_labels().contains(*label) {
                findings.push(Finding::warning(
                    &path,
                    format!("Unknown style label: {label}"),
                ));
            }
        }
        if doc.doc_type == DocumentType::Command && labels.contains(&"reasoning-first") {
            findings.push(Finding::warning(
                &path,
                "reasoning-first style on command manifests may reduce determinism; consider tool-first or minimal-chat",
            ));
        }
        findings
    }
}

struct RuleHeadingCheck;

impl ContentCheck for RuleHeadingCheck {
    fn check(&self, doc: &Document, _ctx: &CheckContext) -> Vec<Finding> {
        if doc.doc_type != DocumentType::Rule {
            return Vec::new();
        }
        let path = doc.path_str();
        let heading_re = Regex::new(r"(?m)^##\s+(.+)$").expect("static regex");
        let headings: Vec<String> = heading_re
            .captures_iter(&doc.body)
            .map(|c| c[1].trim().to_lowercase())
            .collect();

        let indexed: Vec<(usize, &str)> = headings
            .iter()
            .filter_map(|h| {
                RULE_HEADING_ORDER
                    .iter()
                    .position(|e| e == h)
                    .map(|i| (i, h.as_str()))
            })
            .collect();

        let mut findings = Vec::new();
        let mut last = 0usize;
        for (idx, heading) in &indexed {
            if *idx < last {
                findings.push(Finding::warning(
                    &path,
                    format!(
                        "Heading '{}' is out of order. Headings must follow canonical order: {}",
                        heading,
                        RULE_HEADING_ORDER.join(", ")
                    ),
                ));
                break;
            }
            last = *idx;
        }

        let missing: Vec<&str> = RULE_HEADING_ORDER
            .iter()
            .filter(|e| !indexed.iter().any(|(_, h)| h == *e))
            .copied()
            .collect();
        if !missing.is_empty() {
            findings.push(Finding::warning(
                &path,
                format!("Missing recommended headings: {}", missing.join(", ")),
            ));
        }
        findings
    }
}

struct RuleFormattingCheck;

impl ContentCheck for RuleFormattingCheck {
    fn check(&self, doc: &Document, _ctx: &CheckContext) -> Vec<Finding> {
        if doc.doc_type != DocumentType::Rule {
            return Vec::new();
        }
        let body = &doc.body;
        if !body.contains("REQUIRED:") && !body.contains("PROHIBITED:") && !body.contains("OPTIONAL:")
        {
            return vec![Finding::warning(
                doc.path_str(),
                "Consider using REQUIRED/PROHIBITED/OPTIONAL formatting",
            )];
        }
        Vec::new()
    }
}

struct MemoryHintCheck;

impl ContentCheck for MemoryHintCheck {
    fn check(&self, doc: &Document, _ctx: &CheckContext) -> Vec<Finding> {
        if doc.doc_type != DocumentType::Memory {
            return Vec::new();
        }
        let path = doc.path_str();
        let name = doc.path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        let mut findings = Vec::new();
        if name == "CLAUDE.md" && !doc.body.contains("agent:") {
            findings.push(Finding::warning(
                &path,
                "CLAUDE.md should contain agent mappings",
            ));
        }
        if !doc.body.contains("skill:") {
            findings.push(Finding::info(&path, "Consider adding skill references"));
        }
        findings
    }
}

struct LayerSectionCheck;

impl ContentCheck for LayerSectionCheck {
    fn check(&self, doc: &Document, _ctx: &CheckContext) -> Vec<Finding> {
        let label = match doc.doc_type {
            DocumentType::Router => "Router",
            DocumentType::Entrypoint => "Entrypoint",
            _ => return Vec::new(),
        };
        // Frontmatter is optional for these types; the body carries the
        // layer declaration instead.
        if doc.frontmatter.is_empty() && !doc.body.contains("## Layer") {
            return vec![Finding::warning(
                doc.path_str(),
                format!("{label} files should include ## Layer section"),
            )];
        }
        Vec::new()
    }
}
