//! Type Hierarchy (spec.md §4.3, component C3). Holds every loaded class,
//! answers supertype/subtype/implementor queries, and resolves dispatch
//! targets for the call-graph constructor. Grounded on `build_hierarchy`
//! in `callgraph.rs` (a `BTreeMap<String, Vec<String>>` of super→subtypes
//! built from a flat class list), generalized here into a standalone,
//! memoizing component with virtual/static/special resolution folded in
//! so `callgraph.rs` no longer has to walk the map itself.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::AnalysisError;
use crate::ir::{CallKind, ClassDecl, ClassKind, MethodRef};

pub(crate) struct TypeHierarchy {
    classes: HashMap<String, ClassDecl>,
    frozen: bool,
    /// `fqn -> fqns directly or transitively extending/implementing it`.
    subtypes_cache: RefCell<Option<HashMap<String, Vec<String>>>>,
    /// `fqn -> its transitive supertype closure`, filled in lazily per query.
    supertypes_cache: RefCell<HashMap<String, Vec<String>>>,
}

impl TypeHierarchy {
    pub(crate) fn new() -> Self {
        TypeHierarchy {
            classes: HashMap::new(),
            frozen: false,
            subtypes_cache: RefCell::new(None),
            supertypes_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Registers `class` under its FQN. First-wins: a class already
    /// present keeps its original declaration (spec.md §4.2's duplicate
    /// policy, enforced here since the hierarchy is the single owner of
    /// class identity).
    pub(crate) fn add(&mut self, class: ClassDecl) {
        assert!(!self.frozen, "cannot add classes after freeze()");
        self.classes.entry(class.fqn.clone()).or_insert(class);
    }

    pub(crate) fn contains(&self, fqn: &str) -> bool {
        self.classes.contains_key(fqn)
    }

    pub(crate) fn get(&self, fqn: &str) -> Option<&ClassDecl> {
        self.classes.get(fqn)
    }

    pub(crate) fn len(&self) -> usize {
        self.classes.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }

    /// Disables further mutation and checks the extends/implements graph
    /// for cycles. A cycle is fatal (spec.md §7 `HierarchyCycle`) since
    /// every other query in this module assumes the graph is a DAG.
    pub(crate) fn freeze(&mut self) -> Result<(), AnalysisError> {
        self.frozen = true;
        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<(), AnalysisError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: HashMap<String, Color> = self
            .classes
            .keys()
            .map(|fqn| (fqn.clone(), Color::White))
            .collect();

        let mut order: Vec<String> = self.classes.keys().cloned().collect();
        order.sort_unstable();

        for start in order {
            if color[&start] != Color::White {
                continue;
            }
            // Explicit stack of (node, remaining out-edges) to avoid recursion
            // depth tracking the hierarchy's height.
            let mut stack: Vec<(String, std::vec::IntoIter<String>)> =
                vec![(start.clone(), self.direct_supertypes(&start).into_iter())];
            color.insert(start, Color::Gray);

            while let Some((node, mut edges)) = stack.pop() {
                if let Some(next) = edges.next() {
                    let next_color = color.get(&next).copied().unwrap_or(Color::White);
                    stack.push((node, edges));
                    match next_color {
                        Color::Gray => {
                            return Err(AnalysisError::HierarchyCycle { participant: next });
                        }
                        Color::White => {
                            color.insert(next.clone(), Color::Gray);
                            let next_edges = self.direct_supertypes(&next).into_iter();
                            stack.push((next, next_edges));
                        }
                        Color::Black => {}
                    }
                } else {
                    color.insert(node, Color::Black);
                }
            }
        }
        Ok(())
    }

    /// Supertypes named directly by `extends`/`implements`, not including
    /// `fqn` itself. Unknown supertypes (not in this hierarchy, e.g. JDK
    /// types) are silently omitted — they contribute nothing to dispatch
    /// resolution since only loaded classes carry method declarations.
    pub(crate) fn direct_supertypes(&self, fqn: &str) -> Vec<String> {
        let mut supertypes = Vec::new();
        if let Some(class) = self.classes.get(fqn) {
            if let Some(super_fqn) = &class.super_fqn {
                if self.classes.contains_key(super_fqn) {
                    supertypes.push(super_fqn.clone());
                }
            }
            for interface in &class.directly_implemented {
                if self.classes.contains_key(interface) {
                    supertypes.push(interface.clone());
                }
            }
        }
        supertypes
    }

    /// Transitive closure of `direct_supertypes`, memoized per FQN.
    pub(crate) fn all_supertypes(&self, fqn: &str) -> Vec<String> {
        if let Some(cached) = self.supertypes_cache.borrow().get(fqn) {
            return cached.clone();
        }

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut frontier = self.direct_supertypes(fqn);
        while let Some(next) = frontier.pop() {
            if seen.insert(next.clone()) {
                frontier.extend(self.direct_supertypes(&next));
                result.push(next);
            }
        }
        result.sort();
        self.supertypes_cache
            .borrow_mut()
            .insert(fqn.to_string(), result.clone());
        result
    }

    /// Transitive closure in the reverse direction: every FQN that
    /// extends or implements `fqn`, directly or indirectly. Built lazily
    /// on first call by one full forward sweep of the hierarchy, then
    /// reused for every subsequent query.
    pub(crate) fn subtypes(&self, fqn: &str) -> Vec<String> {
        self.ensure_subtypes_index();
        self.subtypes_cache
            .borrow()
            .as_ref()
            .expect("index populated by ensure_subtypes_index")
            .get(fqn)
            .cloned()
            .unwrap_or_default()
    }

    /// `subtypes(fqn)` restricted to `kind == Class` and not abstract
    /// (spec.md §4.3) — the concrete classes `INTERFACE` dispatch may
    /// actually land on, as opposed to `VIRTUAL`'s full subtype cone.
    pub(crate) fn implementors(&self, fqn: &str) -> Vec<String> {
        match self.classes.get(fqn) {
            Some(class) if class.kind == ClassKind::Interface => self
                .subtypes(fqn)
                .into_iter()
                .filter(|subtype| {
                    self.classes
                        .get(subtype)
                        .is_some_and(|c| c.kind.is_concrete())
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn ensure_subtypes_index(&self) {
        if self.subtypes_cache.borrow().is_some() {
            return;
        }
        let mut index: HashMap<String, Vec<String>> = HashMap::new();
        let mut fqns: Vec<&String> = self.classes.keys().collect();
        fqns.sort();
        for fqn in fqns {
            for supertype in self.all_supertypes(fqn) {
                index.entry(supertype).or_default().push(fqn.clone());
            }
        }
        for subtypes in index.values_mut() {
            subtypes.sort();
            subtypes.dedup();
        }
        *self.subtypes_cache.borrow_mut() = Some(index);
    }

    /// Candidate receivers for a dynamic (`VIRTUAL`/`INTERFACE`) call site
    /// on `owner_fqn`, per spec.md §4.6: `VIRTUAL` considers the declared
    /// owner plus every transitive subtype; `INTERFACE` narrows that down
    /// to concrete implementors only, since an interface itself never
    /// carries a dispatchable instance.
    fn dynamic_receivers(&self, kind: CallKind, owner_fqn: &str) -> Vec<String> {
        match kind {
            CallKind::Interface => self.implementors(owner_fqn),
            _ => {
                let mut receivers = vec![owner_fqn.to_string()];
                receivers.extend(self.subtypes(owner_fqn));
                receivers.sort();
                receivers.dedup();
                receivers
            }
        }
    }

    /// Resolves a dynamic call site by searching each candidate receiver
    /// (per `dynamic_receivers`) for a concrete override of
    /// `(name, descriptor)`. CHA's conservative over-approximation:
    /// anything reachable through the candidate set is a target
    /// regardless of whether it is ever instantiated. Distinct receivers
    /// that inherit the same concrete method without overriding it (e.g.
    /// a leaf subtype walking up to an ancestor another receiver resolves
    /// to directly) resolve to the same `MethodRef`; deduped here so each
    /// target appears once.
    fn resolve_dynamic(&self, kind: CallKind, declared: &MethodRef) -> Vec<MethodRef> {
        let mut targets: Vec<MethodRef> = self
            .dynamic_receivers(kind, &declared.owner_fqn)
            .into_iter()
            .filter_map(|receiver| self.find_concrete_override(&receiver, declared))
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// `VIRTUAL` dispatch: declared owner plus every transitive subtype.
    pub(crate) fn resolve_virtual(&self, declared: &MethodRef) -> Vec<MethodRef> {
        self.resolve_dynamic(CallKind::Virtual, declared)
    }

    /// `INTERFACE` dispatch: concrete implementors only (spec.md §4.6).
    pub(crate) fn resolve_interface(&self, declared: &MethodRef) -> Vec<MethodRef> {
        self.resolve_dynamic(CallKind::Interface, declared)
    }

    /// RTA variant of `resolve_dynamic`: restricts candidate targets to
    /// those whose owner is already in `instantiated`, the set of types
    /// whose constructor has been observed reachable so far.
    pub(crate) fn resolve_dynamic_restricted(
        &self,
        kind: CallKind,
        declared: &MethodRef,
        instantiated: &HashSet<String>,
    ) -> Vec<MethodRef> {
        self.resolve_dynamic(kind, declared)
            .into_iter()
            .filter(|candidate| instantiated.contains(&candidate.owner_fqn))
            .collect()
    }

    /// Walks from `receiver_fqn` up through `super_fqn`, returning the
    /// first declared, non-abstract `(name, descriptor)` match. Falls
    /// back to a breadth-first search over `receiver_fqn`'s implemented
    /// interfaces' default methods when the superclass walk finds
    /// nothing at all (spec.md §4.3).
    fn find_concrete_override(&self, receiver_fqn: &str, declared: &MethodRef) -> Option<MethodRef> {
        let mut fqn = receiver_fqn.to_string();
        loop {
            let Some(class) = self.classes.get(&fqn) else {
                return self.find_default_method(receiver_fqn, declared);
            };
            if let Some(method) = class.methods.iter().find(|m| {
                m.name == declared.name && m.descriptor == declared.descriptor && !m.is_abstract
            }) {
                return Some(method.method_ref());
            }
            match &class.super_fqn {
                Some(super_fqn) => fqn = super_fqn.clone(),
                None => return self.find_default_method(receiver_fqn, declared),
            }
        }
    }

    /// Breadth-first search of `fqn`'s directly and transitively
    /// implemented interfaces for a declared, non-abstract (default)
    /// method matching `declared`.
    fn find_default_method(&self, fqn: &str, declared: &MethodRef) -> Option<MethodRef> {
        let mut queue: std::collections::VecDeque<String> = self
            .classes
            .get(fqn)
            .map(|class| class.directly_implemented.clone())
            .unwrap_or_default()
            .into();
        let mut seen: HashSet<String> = queue.iter().cloned().collect();

        while let Some(candidate) = queue.pop_front() {
            let Some(class) = self.classes.get(&candidate) else {
                continue;
            };
            if let Some(method) = class.methods.iter().find(|m| {
                m.name == declared.name && m.descriptor == declared.descriptor && !m.is_abstract
            }) {
                return Some(method.method_ref());
            }
            for parent in &class.directly_implemented {
                if seen.insert(parent.clone()) {
                    queue.push_back(parent.clone());
                }
            }
        }
        None
    }

    /// Resolves a static (`invokestatic`) call site: exactly the
    /// declared owner, since `invokestatic` never dispatches virtually.
    pub(crate) fn resolve_static(&self, declared: &MethodRef) -> Option<MethodRef> {
        let class = self.classes.get(&declared.owner_fqn)?;
        class
            .methods
            .iter()
            .find(|m| m.name == declared.name && m.descriptor == declared.descriptor)
            .map(|m| m.method_ref())
    }

    /// Resolves a special (`invokespecial`) call site: constructors,
    /// private methods, and super calls all bind to exactly one method —
    /// found by walking from the declared owner up its superclass chain
    /// (never into subtypes, unlike `resolve_virtual`).
    pub(crate) fn resolve_special(&self, declared: &MethodRef) -> Option<MethodRef> {
        self.find_concrete_override(&declared.owner_fqn, declared)
    }

    /// Dispatch entry point used by the call-graph constructor: routes a
    /// call site to the resolution strategy matching its `CallKind`.
    pub(crate) fn resolve(&self, kind: CallKind, declared: &MethodRef) -> Vec<MethodRef> {
        match kind {
            CallKind::Static => self.resolve_static(declared).into_iter().collect(),
            CallKind::Special => self.resolve_special(declared).into_iter().collect(),
            CallKind::Virtual => self.resolve_virtual(declared),
            CallKind::Interface => self.resolve_interface(declared),
        }
    }
}
