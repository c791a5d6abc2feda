use crate::domain::models::{DocumentType, Finding, GraphNodeView};
use crate::frontmatter;
use crate::schema::SchemaRegistry;
use crate::services::discovery;
use regex::Regex;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Node types that participate in the dependency graph.
const GRAPH_TYPES: [DocumentType; 5] = [
    DocumentType::Skill,
    DocumentType::Agent,
    DocumentType::Command,
    DocumentType::Rule,
    DocumentType::Memory,
];

/// Valid (source, target) dependency directions: rule-consuming types may
/// depend on rules, skill-consuming types on skills, commands on agents or
/// skills, memory on rules or agents.
const VALID_DIRECTIONS: [(DocumentType, DocumentType); 7] = [
    (DocumentType::Skill, DocumentType::Rule),
    (DocumentType::Agent, DocumentType::Skill),
    (DocumentType::Agent, DocumentType::Rule),
    (DocumentType::Command, DocumentType::Agent),
    (DocumentType::Command, DocumentType::Skill),
    (DocumentType::Memory, DocumentType::Rule),
    (DocumentType::Memory, DocumentType::Agent),
];

#[derive(Debug, Clone)]
pub struct DependencyNode {
    pub path: PathBuf,
    pub node_type: DocumentType,
    pub name: Option<String>,
    pub references: BTreeSet<String>,
    pub dependencies: BTreeSet<PathBuf>,
}

impl DependencyNode {
    pub fn new(path: impl Into<PathBuf>, node_type: DocumentType, name: Option<&str>) -> Self {
        Self {
            path: path.into(),
            node_type,
            name: name.map(str::to_string),
            references: BTreeSet::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_references<I: IntoIterator<Item = S>, S: Into<String>>(mut self, refs: I) -> Self {
        self.references = refs.into_iter().map(Into::into).collect();
        self
    }
}

/// Directed dependency graph over document identities. Ordered maps keep
/// every traversal deterministic, which the report format relies on.
#[derive(Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<PathBuf, DependencyNode>,
}

impl DependencyGraph {
    pub fn insert(&mut self, node: DependencyNode) {
        self.nodes.insert(node.path.clone(), node);
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    /// Discover graph documents under `root` and build one node per file.
    /// Node construction never fails: unreadable or unparsable files yield a
    /// warning and a node with an empty reference set.
    pub fn build(root: &Path, registry: &SchemaRegistry) -> (Self, Vec<Finding>) {
        let mut graph = Self::default();
        let mut findings = Vec::new();

        for (path, doc_type) in discovery::discover(root) {
            if !GRAPH_TYPES.contains(&doc_type) {
                continue;
            }
            let mut node = DependencyNode::new(path.clone(), doc_type, None);
            match extract_node_facts(&path, doc_type, registry) {
                Ok((name, references)) => {
                    node.name = name;
                    node.references = references;
                }
                Err(e) => {
                    findings.push(Finding::warning(
                        path.display().to_string(),
                        format!("Failed to parse {doc_type} file: {e}"),
                    ));
                }
            }
            graph.insert(node);
        }
        (graph, findings)
    }

    /// Resolve every reference token to at most one node. Untyped tokens
    /// resolve against the first matching name in lexicographic path order
    /// (the documented ambiguity policy).
    pub fn resolve(&mut self) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut resolved: BTreeMap<PathBuf, BTreeSet<PathBuf>> = BTreeMap::new();

        for (path, node) in &self.nodes {
            for reference in &node.references {
                match self.find_target(reference) {
                    Some(target) => {
                        resolved.entry(path.clone()).or_default().insert(target);
                    }
                    None => findings.push(Finding::warning(
                        path.display().to_string(),
                        format!("Reference not found: {reference}"),
                    )),
                }
            }
        }

        for (path, deps) in resolved {
            if let Some(node) = self.nodes.get_mut(&path) {
                node.dependencies.extend(deps);
            }
        }
        findings
    }

    fn find_target(&self, reference: &str) -> Option<PathBuf> {
        if let Some((kind, name)) = reference.split_once(':') {
            if let Some(node_type) = DocumentType::from_key(kind) {
                return self
                    .nodes
                    .values()
                    .find(|n| n.node_type == node_type && n.name.as_deref() == Some(name))
                    .map(|n| n.path.clone());
            }
        }
        self.nodes
            .values()
            .find(|n| n.name.as_deref() == Some(reference))
            .map(|n| n.path.clone())
    }

    /// DFS with an explicit recursion stack; reports one cycle per detection
    /// and resumes from other roots (at least one cycle per reachable SCC,
    /// not exhaustive enumeration).
    pub fn check_cycles(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut visited: BTreeSet<&Path> = BTreeSet::new();

        for path in self.nodes.keys() {
            if !visited.contains(path.as_path()) {
                let mut stack: Vec<&Path> = Vec::new();
                self.dfs(path, &mut visited, &mut stack, &mut findings);
            }
        }
        findings
    }

    fn dfs<'a>(
        &'a self,
        path: &'a Path,
        visited: &mut BTreeSet<&'a Path>,
        stack: &mut Vec<&'a Path>,
        findings: &mut Vec<Finding>,
    ) -> bool {
        if let Some(pos) = stack.iter().position(|p| *p == path) {
            let mut cycle: Vec<String> = stack[pos..]
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            cycle.push(path.display().to_string());
            findings.push(Finding::critical(
                cycle[0].clone(),
                format!("Circular dependency: {}", cycle.join(" -> ")),
            ));
            return true;
        }
        if visited.contains(path) {
            return false;
        }
        visited.insert(path);
        stack.push(path);

        let mut found = false;
        if let Some(node) = self.nodes.get(path) {
            for dep in &node.dependencies {
                if self.dfs(dep, visited, stack, findings) {
                    found = true;
                    break;
                }
            }
        }
        stack.pop();
        found
    }

    pub fn check_directions(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (path, node) in &self.nodes {
            for dep in &node.dependencies {
                let Some(target) = self.nodes.get(dep) else {
                    continue;
                };
                if !VALID_DIRECTIONS.contains(&(node.node_type, target.node_type)) {
                    findings.push(Finding::warning(
                        path.display().to_string(),
                        format!(
                            "Invalid dependency direction: {} -> {}",
                            node.node_type, target.node_type
                        ),
                    ));
                }
            }
        }
        findings
    }

    pub fn check_naming(&self) -> Vec<Finding> {
        let mut by_name: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
        for node in self.nodes.values() {
            if let Some(name) = node.name.as_deref() {
                by_name.entry(name).or_default().push(&node.path);
            }
        }

        let mut findings = Vec::new();
        for (name, paths) in by_name {
            if paths.len() > 1 {
                let listed: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                findings.push(Finding::warning(
                    listed[0].clone(),
                    format!(
                        "Duplicate name '{}' used by multiple files: {}",
                        name,
                        listed.join(", ")
                    ),
                ));
            }
        }
        findings
    }

    pub fn check_minimum_dependencies(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (path, node) in &self.nodes {
            match node.node_type {
                DocumentType::Agent => {
                    if node.dependencies.is_empty() {
                        findings.push(Finding::info(
                            path.display().to_string(),
                            "Agent has no skill dependencies",
                        ));
                    }
                }
                DocumentType::Command => {
                    let has_agent_or_skill = node.dependencies.iter().any(|d| {
                        self.nodes.get(d).map(|n| {
                            matches!(n.node_type, DocumentType::Agent | DocumentType::Skill)
                        }) == Some(true)
                    });
                    if !has_agent_or_skill {
                        findings.push(Finding::info(
                            path.display().to_string(),
                            "Command has no agent or skill dependencies",
                        ));
                    }
                }
                _ => {}
            }
        }
        findings
    }

    pub fn views(&self) -> Vec<GraphNodeView> {
        self.nodes
            .values()
            .map(|n| GraphNodeView {
                path: n.path.display().to_string(),
                node_type: n.node_type,
                name: n.name.clone(),
                dependencies: n
                    .dependencies
                    .iter()
                    .map(|d| d.display().to_string())
                    .collect(),
            })
            .collect()
    }
}

/// Run the full graph analysis: build, resolve, then the structural checks.
/// Resolution requires the completed node set, hence the two phases.
pub fn analyze(root: &Path, registry: &SchemaRegistry) -> (DependencyGraph, Vec<Finding>) {
    let (mut graph, mut findings) = DependencyGraph::build(root, registry);
    findings.extend(graph.resolve());
    findings.extend(graph.check_cycles());
    findings.extend(graph.check_directions());
    findings.extend(graph.check_naming());
    findings.extend(graph.check_minimum_dependencies());
    (graph, findings)
}

fn extract_node_facts(
    path: &Path,
    doc_type: DocumentType,
    registry: &SchemaRegistry,
) -> anyhow::Result<(Option<String>, BTreeSet<String>)> {
    let text = std::fs::read_to_string(path)?;
    let mut references = extract_typed_tokens(&text);

    let name_field = registry
        .for_type(doc_type)
        .and_then(|s| s.name_field.as_deref());

    let mut name = None;
    if let Some(field) = name_field {
        let (fm, _, _) = frontmatter::parse(&text)?;
        name = fm.get(field).and_then(Value::as_str).map(str::to_string);
        // Declared references may sit at top level or inside metadata.
        let lookup = |key: &str| {
            fm.get(key).or_else(|| {
                fm.get("metadata")
                    .and_then(Value::as_mapping)
                    .and_then(|m| m.get(key))
            })
        };
        match doc_type {
            DocumentType::Skill => {
                references.extend(string_values(lookup("source")));
            }
            DocumentType::Agent => {
                references.extend(string_values(lookup("default-skills")));
                references.extend(string_values(lookup("optional-skills")));
            }
            _ => {}
        }
    }

    // Rules and memory files carry no identifier field; the path names them.
    if name.is_none() {
        name = match doc_type {
            DocumentType::Rule => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string),
            DocumentType::Memory => path
                .file_name()
                .and_then(|s| s.to_str())
                .map(str::to_string),
            _ => None,
        };
    }

    Ok((name, references))
}

/// Typed reference tokens (`skill:x`, `agent:x`, `rule:x`) wherever they
/// occur in metadata values or body text.
fn extract_typed_tokens(text: &str) -> BTreeSet<String> {
    let re = Regex::new(r"\b(skill|agent|rule):([a-zA-Z0-9-]+)").expect("static regex");
    re.captures_iter(text)
        .map(|c| format!("{}:{}", &c[1], &c[2]))
        .collect()
}

fn string_values(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
