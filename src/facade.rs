//! Analysis Facade (spec.md §4.8, component C8). The single entry point
//! the CLI (and any future embedder) calls: wires C1 through C7 together
//! in dependency order and returns the finished result or the one fatal
//! error the pipeline can produce.

use std::path::PathBuf;

use crate::callgraph::{self, Algorithm};
use crate::collect;
use crate::entrypoint;
use crate::error::AnalysisError;
use crate::filter::NameFilter;
use crate::hierarchy::TypeHierarchy;
use crate::ir::AnalysisResult;
use crate::{enumerate, loader};

pub(crate) struct AnalysisConfig {
    pub(crate) inputs: Vec<PathBuf>,
    pub(crate) algorithm: Algorithm,
    pub(crate) entry_point_specs: Vec<String>,
    pub(crate) include_prefixes: Vec<String>,
    pub(crate) exclude_prefixes: Vec<String>,
    pub(crate) exclude_jdk: bool,
}

/// Runs the full pipeline: enumerate inputs, load class bytes, freeze
/// the type hierarchy (checking for cycles), resolve entry points within
/// the Name Filter's scope, construct the call graph, and collect the
/// filtered result.
pub(crate) fn analyze(config: AnalysisConfig) -> Result<AnalysisResult, AnalysisError> {
    let units = enumerate::enumerate(&config.inputs);
    tracing::info!(count = units.len(), "enumerated bytecode units");

    let mut hierarchy = TypeHierarchy::new();
    loader::load_all(&mut hierarchy, units);
    tracing::info!(count = hierarchy.len(), "loaded classes");

    hierarchy.freeze()?;

    let filter = NameFilter::new(config.include_prefixes, config.exclude_prefixes, config.exclude_jdk);

    let entry_points = entrypoint::resolve_entry_points(&hierarchy, &filter, &config.entry_point_specs);
    tracing::info!(count = entry_points.len(), "resolved entry points");

    let graph = callgraph::build(&hierarchy, entry_points, config.algorithm);
    tracing::info!(
        reachable = graph.reachable_methods.len(),
        edges = graph.edges.len(),
        "constructed call graph"
    );

    Ok(collect::collect(&hierarchy, &graph, &filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_with_no_inputs_yields_empty_result_not_an_error() {
        let config = AnalysisConfig {
            inputs: Vec::new(),
            algorithm: Algorithm::Cha,
            entry_point_specs: Vec::new(),
            include_prefixes: Vec::new(),
            exclude_prefixes: Vec::new(),
            exclude_jdk: false,
        };
        let result = analyze(config).expect("empty input is not fatal");
        assert!(result.classes.is_empty());
        assert!(result.methods.is_empty());
        assert!(result.call_edges.is_empty());
    }
}
