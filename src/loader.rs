//! Bytecode Loader (spec.md §4.2, component C2). Turns the raw bytes
//! `enumerate` produces into `ir::ClassDecl`s and assembles the type
//! hierarchy, applying the first-wins duplicate-type policy. Grounded on
//! `scan.rs`'s per-entry parse loop, adapted to build `TypeHierarchy`
//! directly instead of a flat `Vec<Class>`.

use crate::classfile::{self, RawClass, RawMethod};
use crate::enumerate::Unit;
use crate::hierarchy::TypeHierarchy;
use crate::ir::{ClassDecl, ClassKind, MethodDecl, Visibility};

const ACC_PUBLIC: u16 = classfile::ACC_PUBLIC;
const ACC_PRIVATE: u16 = classfile::ACC_PRIVATE;
const ACC_PROTECTED: u16 = classfile::ACC_PROTECTED;
const ACC_STATIC: u16 = classfile::ACC_STATIC;
const ACC_INTERFACE: u16 = classfile::ACC_INTERFACE;
const ACC_ABSTRACT: u16 = classfile::ACC_ABSTRACT;
const ACC_SYNTHETIC: u16 = classfile::ACC_SYNTHETIC;

/// Parses every enumerated unit and loads it into `hierarchy`. Malformed
/// class bytes are logged and skipped (spec.md §7 `MalformedClassFile`
/// is a warning, never fatal); a duplicate FQN keeps whichever
/// declaration was loaded first, in `units` order.
pub(crate) fn load_all(hierarchy: &mut TypeHierarchy, units: Vec<Unit>) {
    for unit in units {
        match classfile::parse(&unit.bytes) {
            Ok(raw) => {
                if hierarchy.contains(&raw.name) {
                    tracing::info!(fqn = %raw.name, origin = %unit.origin, "duplicate type, keeping first-loaded declaration");
                    continue;
                }
                hierarchy.add(to_class_decl(raw, unit.origin));
            }
            Err(err) => {
                tracing::warn!(origin = %unit.origin, error = %err, "failed to parse class file, skipping");
            }
        }
    }
}

fn to_class_decl(raw: RawClass, origin: String) -> ClassDecl {
    let kind = class_kind(raw.access_flags);
    let super_fqn = if kind == ClassKind::Interface {
        None
    } else {
        raw.super_name
    };

    ClassDecl {
        fqn: raw.name.clone(),
        kind,
        super_fqn,
        directly_implemented: raw.interfaces,
        methods: raw
            .methods
            .into_iter()
            .map(|method| to_method_decl(&raw.name, method))
            .collect(),
        origin,
    }
}

fn class_kind(access_flags: u16) -> ClassKind {
    if access_flags & ACC_INTERFACE != 0 {
        ClassKind::Interface
    } else if access_flags & ACC_ABSTRACT != 0 {
        ClassKind::AbstractClass
    } else {
        ClassKind::Class
    }
}

fn to_method_decl(owner_fqn: &str, raw: RawMethod) -> MethodDecl {
    MethodDecl {
        owner_fqn: owner_fqn.to_string(),
        name: raw.name,
        descriptor: raw.descriptor,
        visibility: visibility(raw.access_flags),
        is_static: raw.access_flags & ACC_STATIC != 0,
        is_abstract: raw.access_flags & ACC_ABSTRACT != 0,
        is_synthetic: raw.access_flags & ACC_SYNTHETIC != 0,
        call_sites: raw.call_sites,
    }
}

fn visibility(access_flags: u16) -> Visibility {
    if access_flags & ACC_PUBLIC != 0 {
        Visibility::Public
    } else if access_flags & ACC_PROTECTED != 0 {
        Visibility::Protected
    } else if access_flags & ACC_PRIVATE != 0 {
        Visibility::Private
    } else {
        Visibility::Package
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_kind_prefers_interface_over_abstract_bit() {
        assert_eq!(class_kind(ACC_INTERFACE | ACC_ABSTRACT), ClassKind::Interface);
        assert_eq!(class_kind(ACC_ABSTRACT), ClassKind::AbstractClass);
        assert_eq!(class_kind(ACC_PUBLIC), ClassKind::Class);
    }

    #[test]
    fn visibility_falls_back_to_package_when_no_bit_is_set() {
        assert_eq!(visibility(0), Visibility::Package);
        assert_eq!(visibility(ACC_PUBLIC), Visibility::Public);
        assert_eq!(visibility(ACC_PROTECTED), Visibility::Protected);
        assert_eq!(visibility(ACC_PRIVATE), Visibility::Private);
    }

    #[test]
    fn load_all_skips_unparseable_bytes() {
        let mut hierarchy = TypeHierarchy::new();
        let units = vec![Unit {
            origin: "bad.class".to_string(),
            bytes: vec![0x00, 0x01, 0x02],
        }];
        load_all(&mut hierarchy, units);
        assert_eq!(hierarchy.len(), 0);
    }
}
