//! Result Collector (spec.md §4.7, component C7). Assembles the final
//! `AnalysisResult` from the hierarchy and the constructor's raw
//! reachable-method/edge lists: applies the name filter to classes,
//! methods, and edges, drops synthetic methods, and renders everything
//! in the deterministic order spec.md requires (lexicographic for
//! classes/methods, first-discovery for edges — the collector never
//! re-orders, only filters).

use crate::callgraph::CallGraph;
use crate::filter::NameFilter;
use crate::hierarchy::TypeHierarchy;
use crate::ir::{AnalysisResult, ClassInfo, MethodInfo};

pub(crate) fn collect(hierarchy: &TypeHierarchy, graph: &CallGraph, filter: &NameFilter) -> AnalysisResult {
    let mut admitted: Vec<_> = hierarchy.iter().filter(|class| filter.admits(&class.fqn)).collect();
    admitted.sort_by(|a, b| a.fqn.cmp(&b.fqn));

    let classes: Vec<ClassInfo> = admitted
        .iter()
        .map(|class| ClassInfo {
            fqn: class.fqn.clone(),
            kind: class.kind,
        })
        .collect();

    let mut methods: Vec<MethodInfo> = admitted
        .iter()
        .flat_map(|class| class.methods.iter())
        .filter(|method| !method.is_synthetic)
        .map(|method| MethodInfo {
            owner_fqn: method.owner_fqn.clone(),
            name: method.name.clone(),
            descriptor: method.descriptor.clone(),
            visibility: method.visibility,
            is_static: method.is_static,
        })
        .collect();
    methods.sort_by(|a, b| {
        (&a.owner_fqn, &a.name, &a.descriptor).cmp(&(&b.owner_fqn, &b.name, &b.descriptor))
    });

    let call_edges: Vec<_> = graph
        .edges
        .iter()
        .filter(|edge| filter.admits(&edge.source.owner_fqn) && filter.admits(&edge.target.owner_fqn))
        .cloned()
        .collect();

    if classes.is_empty() && methods.is_empty() && call_edges.is_empty() {
        tracing::info!("name filter admitted nothing, returning an empty result");
    }

    AnalysisResult {
        classes,
        methods,
        call_edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CallEdge, ClassDecl, ClassKind, MethodDecl, MethodRef, Visibility};

    fn method(owner: &str, name: &str, is_synthetic: bool) -> MethodDecl {
        MethodDecl {
            owner_fqn: owner.to_string(),
            name: name.to_string(),
            descriptor: "()V".to_string(),
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_synthetic,
            call_sites: Vec::new(),
        }
    }

    #[test]
    fn synthetic_methods_are_dropped_but_classes_still_listed() {
        let mut hierarchy = TypeHierarchy::new();
        hierarchy.add(ClassDecl {
            fqn: "a/App".to_string(),
            kind: ClassKind::Class,
            super_fqn: None,
            directly_implemented: Vec::new(),
            methods: vec![method("a/App", "run", false), method("a/App", "access$000", true)],
            origin: "test".to_string(),
        });
        hierarchy.freeze().expect("acyclic");

        let graph = CallGraph {
            reachable_methods: Vec::new(),
            edges: Vec::new(),
        };
        let filter = NameFilter::new(Vec::new(), Vec::new(), false);
        let result = collect(&hierarchy, &graph, &filter);

        assert_eq!(result.classes.len(), 1);
        assert_eq!(result.methods.len(), 1);
        assert_eq!(result.methods[0].name, "run");
    }

    #[test]
    fn edges_require_both_endpoints_to_be_admitted() {
        let mut hierarchy = TypeHierarchy::new();
        hierarchy.add(ClassDecl {
            fqn: "a/App".to_string(),
            kind: ClassKind::Class,
            super_fqn: None,
            directly_implemented: Vec::new(),
            methods: Vec::new(),
            origin: "test".to_string(),
        });
        hierarchy.add(ClassDecl {
            fqn: "java/lang/Object".to_string(),
            kind: ClassKind::Class,
            super_fqn: None,
            directly_implemented: Vec::new(),
            methods: Vec::new(),
            origin: "test".to_string(),
        });
        hierarchy.freeze().expect("acyclic");

        let edge = CallEdge {
            source: MethodRef { owner_fqn: "a/App".to_string(), name: "run".to_string(), descriptor: "()V".to_string() },
            target: MethodRef { owner_fqn: "java/lang/Object".to_string(), name: "toString".to_string(), descriptor: "()Ljava/lang/String;".to_string() },
        };
        let graph = CallGraph { reachable_methods: Vec::new(), edges: vec![edge] };
        let filter = NameFilter::new(Vec::new(), Vec::new(), true);
        let result = collect(&hierarchy, &graph, &filter);

        assert!(result.call_edges.is_empty());
    }
}
