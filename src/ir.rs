#![allow(dead_code)]

//! Data model shared by the loader, hierarchy, call-graph constructor, and
//! result collector. FQNs are carried in internal (slash-separated) form
//! throughout; the dotted presentation form is produced only by `output`.

use std::fmt;

/// One loaded type. Identity is `fqn`; immutable once placed in the
/// hierarchy (see `hierarchy::TypeHierarchy::add`).
#[derive(Clone, Debug)]
pub(crate) struct ClassDecl {
    pub(crate) fqn: String,
    pub(crate) kind: ClassKind,
    pub(crate) super_fqn: Option<String>,
    pub(crate) directly_implemented: Vec<String>,
    pub(crate) methods: Vec<MethodDecl>,
    pub(crate) origin: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ClassKind {
    Class,
    AbstractClass,
    Interface,
}

impl ClassKind {
    pub(crate) fn is_concrete(self) -> bool {
        matches!(self, ClassKind::Class)
    }
}

/// One declared method, including constructors (`<init>`) and class
/// initializers (`<clinit>`).
#[derive(Clone, Debug)]
pub(crate) struct MethodDecl {
    pub(crate) owner_fqn: String,
    pub(crate) name: String,
    pub(crate) descriptor: String,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_abstract: bool,
    pub(crate) is_synthetic: bool,
    pub(crate) call_sites: Vec<CallSite>,
}

impl MethodDecl {
    pub(crate) fn method_ref(&self) -> MethodRef {
        MethodRef {
            owner_fqn: self.owner_fqn.clone(),
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub(crate) enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

/// One invocation instruction inside a method body.
#[derive(Clone, Debug)]
pub(crate) struct CallSite {
    pub(crate) kind: CallKind,
    pub(crate) declared_target: MethodRef,
    pub(crate) bytecode_offset: u32,
}

/// The four JVM dispatch flavors; `Special` covers constructors, super
/// calls, and private calls (spec.md §3).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub(crate) enum CallKind {
    Static,
    Virtual,
    Interface,
    Special,
}

/// A symbolic `(owner, name, descriptor)` reference. Not necessarily
/// resolvable to a loaded `MethodDecl`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub(crate) struct MethodRef {
    pub(crate) owner_fqn: String,
    pub(crate) name: String,
    pub(crate) descriptor: String,
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner_fqn, self.name, self.descriptor)
    }
}

/// `(source, target)` — the externally observable unit produced by the
/// constructor and filtered by the collector.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub(crate) struct CallEdge {
    pub(crate) source: MethodRef,
    pub(crate) target: MethodRef,
}

/// Summary of one admitted class, as emitted in `AnalysisResult.classes`
/// (spec.md §3) — deliberately thinner than `ClassDecl`, carrying no
/// supertype or method-body detail a collaborator has no use for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ClassInfo {
    pub(crate) fqn: String,
    pub(crate) kind: ClassKind,
}

/// Summary of one admitted, non-synthetic method, as emitted in
/// `AnalysisResult.methods`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MethodInfo {
    pub(crate) owner_fqn: String,
    pub(crate) name: String,
    pub(crate) descriptor: String,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
}

/// The result of one analysis invocation (spec.md §3): `classes` in
/// lexicographic fqn order, `methods` in lexicographic
/// `(owner_fqn, name, descriptor)` order, `call_edges` in first-seen
/// order from the constructor, all three already filtered by the Name
/// Filter.
#[derive(Clone, Debug)]
pub(crate) struct AnalysisResult {
    pub(crate) classes: Vec<ClassInfo>,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) call_edges: Vec<CallEdge>,
}
