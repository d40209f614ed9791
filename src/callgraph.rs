//! Call-Graph Constructor (spec.md §4.6, component C6). Drives a FIFO
//! worklist from the resolved entry points, asking the type hierarchy to
//! resolve each call site's declared target into zero or more concrete
//! methods, and grows the reachable-method set and edge set until the
//! worklist is empty. Grounded on `build_edges`/`resolve_targets` in
//! `callgraph.rs` (the one-shot CHA pass over a flat class list),
//! generalized into a proper fixed-point worklist so method reachability
//! — not just the edge set — is computed, and extended with RTA's
//! instantiated-type tracking (a reachable `<init>` marks its owner
//! instantiated) and pending-site re-resolution, which the grounding
//! source never needed since it only ever ran CHA.

use std::collections::{HashSet, VecDeque};

use crate::hierarchy::TypeHierarchy;
use crate::ir::{CallEdge, CallKind, CallSite, MethodRef};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Algorithm {
    Cha,
    Rta,
}

pub(crate) struct CallGraph {
    /// Methods reachable from the entry points, in first-discovery order.
    pub(crate) reachable_methods: Vec<MethodRef>,
    /// Edges in first-discovery order, deduplicated.
    pub(crate) edges: Vec<CallEdge>,
}

/// Builds the call graph by a breadth-first worklist walk starting from
/// `entry_points`. `algorithm` selects how virtual/interface call sites
/// are resolved: CHA considers every override in the receiver's subtype
/// cone; RTA additionally requires the overriding type to have been
/// observed at a `new` site somewhere already-reachable.
pub(crate) fn build(
    hierarchy: &TypeHierarchy,
    entry_points: Vec<MethodRef>,
    algorithm: Algorithm,
) -> CallGraph {
    let mut reachable_methods = Vec::new();
    let mut processed: HashSet<MethodRef> = HashSet::new();
    let mut enqueued: HashSet<MethodRef> = HashSet::new();
    let mut worklist: VecDeque<MethodRef> = VecDeque::new();
    let mut edge_set: HashSet<CallEdge> = HashSet::new();
    let mut edges = Vec::new();

    // RTA-only bookkeeping; unused, and left empty, under CHA.
    let mut instantiated: HashSet<String> = HashSet::new();
    let mut pending_virtual: Vec<(MethodRef, CallSite)> = Vec::new();

    for entry in entry_points {
        if enqueued.insert(entry.clone()) {
            worklist.push_back(entry);
        }
    }

    while let Some(current) = worklist.pop_front() {
        if !processed.insert(current.clone()) {
            continue;
        }
        reachable_methods.push(current.clone());

        let Some(class) = hierarchy.get(&current.owner_fqn) else {
            continue;
        };
        let Some(method) = class
            .methods
            .iter()
            .find(|m| m.name == current.name && m.descriptor == current.descriptor)
        else {
            continue;
        };

        for call_site in &method.call_sites {
            let targets = match (algorithm, call_site.kind) {
                (_, CallKind::Static) | (_, CallKind::Special) => {
                    hierarchy.resolve(call_site.kind, &call_site.declared_target)
                }
                (Algorithm::Cha, CallKind::Virtual) | (Algorithm::Cha, CallKind::Interface) => {
                    hierarchy.resolve(call_site.kind, &call_site.declared_target)
                }
                (Algorithm::Rta, CallKind::Virtual) | (Algorithm::Rta, CallKind::Interface) => {
                    pending_virtual.push((current.clone(), call_site.clone()));
                    hierarchy.resolve_dynamic_restricted(
                        call_site.kind,
                        &call_site.declared_target,
                        &instantiated,
                    )
                }
            };

            for target in targets {
                record_edge(&mut edge_set, &mut edges, &current, &target);
                enqueue(&mut worklist, &processed, &mut enqueued, &target);
            }
        }

        if algorithm == Algorithm::Rta {
            // observe(m): a reachable constructor means its owner is now a
            // live instantiated type (spec.md §4.6); everything else
            // contributes no instantiation evidence.
            let grew = method.name == "<init>" && instantiated.insert(method.owner_fqn.clone());
            if grew {
                for (source, call_site) in pending_virtual.clone() {
                    let targets = hierarchy.resolve_dynamic_restricted(
                        call_site.kind,
                        &call_site.declared_target,
                        &instantiated,
                    );
                    for target in targets {
                        record_edge(&mut edge_set, &mut edges, &source, &target);
                        enqueue(&mut worklist, &processed, &mut enqueued, &target);
                    }
                }
            }
        }
    }

    CallGraph {
        reachable_methods,
        edges,
    }
}

fn enqueue(
    worklist: &mut VecDeque<MethodRef>,
    processed: &HashSet<MethodRef>,
    enqueued: &mut HashSet<MethodRef>,
    target: &MethodRef,
) {
    if !processed.contains(target) && enqueued.insert(target.clone()) {
        worklist.push_back(target.clone());
    }
}

fn record_edge(
    edge_set: &mut HashSet<CallEdge>,
    edges: &mut Vec<CallEdge>,
    source: &MethodRef,
    target: &MethodRef,
) {
    let edge = CallEdge {
        source: source.clone(),
        target: target.clone(),
    };
    if edge_set.insert(edge.clone()) {
        edges.push(edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ClassDecl, ClassKind, MethodDecl, Visibility};

    fn method(owner: &str, name: &str, call_sites: Vec<CallSite>) -> MethodDecl {
        MethodDecl {
            owner_fqn: owner.to_string(),
            name: name.to_string(),
            descriptor: "()V".to_string(),
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_synthetic: false,
            call_sites,
        }
    }

    fn class(fqn: &str, kind: ClassKind, super_fqn: Option<&str>, methods: Vec<MethodDecl>) -> ClassDecl {
        ClassDecl {
            fqn: fqn.to_string(),
            kind,
            super_fqn: super_fqn.map(str::to_string),
            directly_implemented: Vec::new(),
            methods,
            origin: "test".to_string(),
        }
    }

    fn method_ref(owner: &str, name: &str) -> MethodRef {
        MethodRef {
            owner_fqn: owner.to_string(),
            name: name.to_string(),
            descriptor: "()V".to_string(),
        }
    }

    fn ctor_call_site(owner: &str) -> CallSite {
        CallSite {
            kind: CallKind::Special,
            declared_target: MethodRef { owner_fqn: owner.to_string(), name: "<init>".to_string(), descriptor: "()V".to_string() },
            bytecode_offset: 0,
        }
    }

    fn ctor(owner: &str) -> MethodDecl {
        let mut decl = method(owner, "<init>", Vec::new());
        decl.descriptor = "()V".to_string();
        decl
    }

    #[test]
    fn cha_includes_every_override_regardless_of_instantiation() {
        let base_target = method_ref("a/Base", "greet");
        let caller = method(
            "a/Main",
            "main",
            vec![CallSite { kind: CallKind::Virtual, declared_target: base_target.clone(), bytecode_offset: 0 }],
        );
        let base_method = method("a/Base", "greet", Vec::new());
        let sub_method = method("a/Sub", "greet", Vec::new());

        let mut hierarchy = TypeHierarchy::new();
        hierarchy.add(class("a/Main", ClassKind::Class, None, vec![caller]));
        hierarchy.add(class("a/Base", ClassKind::Class, None, vec![base_method]));
        hierarchy.add(class("a/Sub", ClassKind::Class, Some("a/Base"), vec![sub_method]));
        hierarchy.freeze().expect("acyclic");

        let entry = method_ref("a/Main", "main");
        let graph = build(&hierarchy, vec![entry], Algorithm::Cha);

        let mut targets: Vec<String> = graph.edges.iter().map(|e| e.target.owner_fqn.clone()).collect();
        targets.sort();
        assert_eq!(targets, vec!["a/Base".to_string(), "a/Sub".to_string()]);
    }

    #[test]
    fn rta_excludes_overrides_on_never_instantiated_types() {
        let base_target = method_ref("a/Base", "greet");
        let caller = method(
            "a/Main",
            "main",
            vec![
                ctor_call_site("a/Base"),
                CallSite { kind: CallKind::Virtual, declared_target: base_target.clone(), bytecode_offset: 4 },
            ],
        );
        let base_method = method("a/Base", "greet", Vec::new());
        let sub_method = method("a/Sub", "greet", Vec::new());

        let mut hierarchy = TypeHierarchy::new();
        hierarchy.add(class("a/Main", ClassKind::Class, None, vec![caller]));
        hierarchy.add(class("a/Base", ClassKind::Class, None, vec![base_method, ctor("a/Base")]));
        hierarchy.add(class("a/Sub", ClassKind::Class, Some("a/Base"), vec![sub_method]));
        hierarchy.freeze().expect("acyclic");

        let entry = method_ref("a/Main", "main");
        let graph = build(&hierarchy, vec![entry], Algorithm::Rta);

        let targets: Vec<String> = graph.edges.iter().map(|e| e.target.owner_fqn.clone()).collect();
        assert!(targets.contains(&"a/Base".to_string()));
        assert!(!targets.contains(&"a/Sub".to_string()));
    }

    #[test]
    fn rta_reresolves_pending_sites_once_a_type_is_later_instantiated() {
        let base_target = method_ref("a/Base", "greet");
        let caller = method(
            "a/Main",
            "main",
            vec![
                ctor_call_site("a/Base"),
                CallSite { kind: CallKind::Virtual, declared_target: base_target.clone(), bytecode_offset: 4 },
            ],
        );
        let setup = method("a/Main", "setup", vec![ctor_call_site("a/Sub")]);
        let base_method = method("a/Base", "greet", Vec::new());
        let sub_method = method("a/Sub", "greet", Vec::new());

        let mut hierarchy = TypeHierarchy::new();
        hierarchy.add(class("a/Main", ClassKind::Class, None, vec![caller, setup]));
        hierarchy.add(class("a/Base", ClassKind::Class, None, vec![base_method, ctor("a/Base")]));
        hierarchy.add(class(
            "a/Sub",
            ClassKind::Class,
            Some("a/Base"),
            vec![sub_method, ctor("a/Sub")],
        ));
        hierarchy.freeze().expect("acyclic");

        let entries = vec![method_ref("a/Main", "main"), method_ref("a/Main", "setup")];
        let graph = build(&hierarchy, entries, Algorithm::Rta);

        let greet_targets: Vec<String> = graph
            .edges
            .iter()
            .filter(|e| e.target.name == "greet")
            .map(|e| e.target.owner_fqn.clone())
            .collect();
        assert!(greet_targets.contains(&"a/Base".to_string()));
        assert!(
            greet_targets.contains(&"a/Sub".to_string()),
            "expected a/Sub.greet to be re-resolved once a/Sub was instantiated, got {greet_targets:?}"
        );
    }
}
