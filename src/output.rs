//! Result serialization (spec.md §6). Renders an `AnalysisResult` into
//! one of the four formats the CLI exposes. Plain text and DOT are
//! hand-written since neither has a structured-serialization crate
//! equivalent in the teacher's stack; CSV reuses the same manual writer
//! for consistency; JSON goes through `serde` the way the teacher
//! serializes its SARIF payloads.

use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

use crate::ir::{AnalysisResult, CallEdge, ClassInfo, MethodInfo, MethodRef};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OutputFormat {
    Text,
    Csv,
    Json,
    Dot,
}

pub(crate) fn write_result(
    writer: &mut dyn Write,
    result: &AnalysisResult,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(writer, result),
        OutputFormat::Csv => write_csv(writer, result),
        OutputFormat::Json => write_json(writer, result, verbose),
        OutputFormat::Dot => write_dot(writer, result),
    }
}

fn write_text(writer: &mut dyn Write, result: &AnalysisResult) -> Result<()> {
    writeln!(writer, "# call graph")?;
    for edge in &result.call_edges {
        writeln!(writer, "{} -> {}", node_label(&edge.source), node_label(&edge.target))?;
    }
    writeln!(writer, "# classes")?;
    for class in &result.classes {
        writeln!(writer, "{}", dotted(&class.fqn))?;
    }
    Ok(())
}

fn write_csv(writer: &mut dyn Write, result: &AnalysisResult) -> Result<()> {
    writeln!(writer, "source_class,source_method,target_class,target_method")?;
    for edge in &result.call_edges {
        writeln!(
            writer,
            "{},{},{},{}",
            csv_field(&dotted(&edge.source.owner_fqn)),
            csv_field(&edge.source.name),
            csv_field(&dotted(&edge.target.owner_fqn)),
            csv_field(&edge.target.name),
        )?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_dot(writer: &mut dyn Write, result: &AnalysisResult) -> Result<()> {
    writeln!(writer, "digraph callgraph {{")?;
    let mut nodes = Vec::new();
    for edge in &result.call_edges {
        push_unique(&mut nodes, node_label(&edge.source));
        push_unique(&mut nodes, node_label(&edge.target));
    }
    for node in &nodes {
        writeln!(writer, "  \"{node}\";")?;
    }
    for edge in &result.call_edges {
        writeln!(writer, "  \"{}\" -> \"{}\";", node_label(&edge.source), node_label(&edge.target))?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}

fn push_unique(nodes: &mut Vec<String>, label: String) {
    if !nodes.contains(&label) {
        nodes.push(label);
    }
}

#[derive(Serialize)]
struct JsonEdge {
    source_class: String,
    source_method: String,
    target_class: String,
    target_method: String,
}

#[derive(Serialize)]
struct JsonClass {
    fqn: String,
    kind: String,
}

#[derive(Serialize)]
struct JsonMethod {
    owner_fqn: String,
    name: String,
    descriptor: String,
    visibility: String,
    is_static: bool,
}

#[derive(Serialize)]
struct JsonResult {
    call_edges: Vec<JsonEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classes: Option<Vec<JsonClass>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    methods: Option<Vec<JsonMethod>>,
}

fn write_json(writer: &mut dyn Write, result: &AnalysisResult, verbose: bool) -> Result<()> {
    let payload = JsonResult {
        call_edges: result.call_edges.iter().map(json_edge).collect(),
        classes: verbose.then(|| result.classes.iter().map(json_class).collect()),
        methods: verbose.then(|| result.methods.iter().map(json_method).collect()),
    };
    serde_json::to_writer_pretty(&mut *writer, &payload)?;
    writeln!(writer)?;
    Ok(())
}

fn json_edge(edge: &CallEdge) -> JsonEdge {
    JsonEdge {
        source_class: dotted(&edge.source.owner_fqn),
        source_method: edge.source.name.clone(),
        target_class: dotted(&edge.target.owner_fqn),
        target_method: edge.target.name.clone(),
    }
}

fn json_class(class: &ClassInfo) -> JsonClass {
    JsonClass {
        fqn: dotted(&class.fqn),
        kind: format!("{:?}", class.kind),
    }
}

fn json_method(method: &MethodInfo) -> JsonMethod {
    JsonMethod {
        owner_fqn: dotted(&method.owner_fqn),
        name: method.name.clone(),
        descriptor: method.descriptor.clone(),
        visibility: format!("{:?}", method.visibility),
        is_static: method.is_static,
    }
}

/// `owner.name` label used by every format except the delimited one
/// (spec.md §6): dotted owner, bare method name, no descriptor — method
/// overloads collapse onto the same node, matching what a reader of the
/// graph would expect to see.
fn node_label(method_ref: &MethodRef) -> String {
    format!("{}.{}", dotted(&method_ref.owner_fqn), method_ref.name)
}

/// Converts an internal slash-form fqn to the dotted presentation form
/// (spec.md §3).
fn dotted(fqn: &str) -> String {
    fqn.replace('/', ".")
}

pub(crate) fn stdout_or_file(path: Option<&std::path::Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) if path == std::path::Path::new("-") => Ok(Box::new(io::stdout())),
        Some(path) => Ok(Box::new(std::fs::File::create(path)?)),
        None => Ok(Box::new(io::stdout())),
    }
}
