use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Skill,
    Agent,
    Command,
    Rule,
    Memory,
    RuleBlock,
    Router,
    Entrypoint,
    OutputStyle,
}

impl DocumentType {
    pub fn key(self) -> &'static str {
        match self {
            DocumentType::Skill => "skill",
            DocumentType::Agent => "agent",
            DocumentType::Command => "command",
            DocumentType::Rule => "rule",
            DocumentType::Memory => "memory",
            DocumentType::RuleBlock => "rule-block",
            DocumentType::Router => "router",
            DocumentType::Entrypoint => "entrypoint",
            DocumentType::OutputStyle => "output-style",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "skill" => Some(DocumentType::Skill),
            "agent" => Some(DocumentType::Agent),
            "command" => Some(DocumentType::Command),
            "rule" => Some(DocumentType::Rule),
            "memory" => Some(DocumentType::Memory),
            "rule-block" => Some(DocumentType::RuleBlock),
            "router" => Some(DocumentType::Router),
            "entrypoint" => Some(DocumentType::Entrypoint),
            "output-style" => Some(DocumentType::OutputStyle),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Finding {
    pub fn critical(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Critical,
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }

    pub fn info(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "[{}] {}:{}: {}",
                self.severity, self.path, line, self.message
            ),
            None => write!(f, "[{}] {}: {}", self.severity, self.path, self.message),
        }
    }
}

#[derive(Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub files_with_issues: usize,
}

#[derive(Serialize)]
pub struct GraphNodeView {
    pub path: String,
    pub node_type: DocumentType,
    pub name: Option<String>,
    pub dependencies: Vec<String>,
}

#[derive(Serialize)]
pub struct GraphReport {
    pub nodes: Vec<GraphNodeView>,
    pub findings: Vec<Finding>,
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}
