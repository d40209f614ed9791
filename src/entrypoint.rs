//! Entry-Point Resolver (spec.md §4.5, component C5). Produces the set of
//! methods the call-graph constructor starts its worklist from: either
//! the conventional `main` method in default mode, or methods matching
//! user-supplied `--entry-point` specs. Grounded on the `is_entrypoint`
//! heuristic in the BazBOM reachability stub, generalized from
//! single-method detection into the three spec-shaped lookups spec.md
//! requires. Both modes restrict their search to classes the Name
//! Filter admits.

use crate::filter::NameFilter;
use crate::hierarchy::TypeHierarchy;
use crate::ir::MethodRef;

const MAIN_NAME: &str = "main";
const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

/// Resolves entry points. With `specs` empty, discovers every
/// `public static void main(String[])` among the filter-admitted classes
/// (spec.md's default mode). Otherwise resolves each spec independently;
/// a spec that matches nothing is logged and skipped rather than failing
/// the whole run. An empty result is not an error (spec.md §4.5/§7): the
/// caller proceeds with an empty call graph.
pub(crate) fn resolve_entry_points(
    hierarchy: &TypeHierarchy,
    filter: &NameFilter,
    specs: &[String],
) -> Vec<MethodRef> {
    let mut entry_points = if specs.is_empty() {
        discover_main_methods(hierarchy, filter)
    } else {
        let mut resolved = Vec::new();
        for spec in specs {
            let matches = resolve_spec(hierarchy, filter, spec);
            if matches.is_empty() {
                tracing::warn!(spec = %spec, "entry-point spec did not match any loaded method, skipping");
            }
            resolved.extend(matches);
        }
        resolved
    };

    entry_points.sort();
    entry_points.dedup();

    if entry_points.is_empty() {
        tracing::warn!("no entry points resolved, proceeding with an empty call graph");
    }
    entry_points
}

fn discover_main_methods(hierarchy: &TypeHierarchy, filter: &NameFilter) -> Vec<MethodRef> {
    let mut mains = Vec::new();
    for class in hierarchy.iter() {
        if !filter.admits(&class.fqn) {
            continue;
        }
        for method in &class.methods {
            if method.name == MAIN_NAME
                && method.descriptor == MAIN_DESCRIPTOR
                && method.is_static
                && !method.is_abstract
                && method.visibility == crate::ir::Visibility::Public
            {
                mains.push(method.method_ref());
            }
        }
    }
    mains
}

/// Parses one `--entry-point` spec and resolves it against the
/// filter-admitted classes. Three shapes, per spec.md §4.5:
/// - `methodName` — bare name, matches across every admitted class.
/// - `SimpleName.methodName` — matches classes whose simple name (the
///   FQN segment after the last `/`) equals `SimpleName`.
/// - `fully.qualified.Name.methodName` — matches the exact FQN only.
fn resolve_spec(hierarchy: &TypeHierarchy, filter: &NameFilter, spec: &str) -> Vec<MethodRef> {
    let Some(last_dot) = spec.rfind('.') else {
        return methods_named(hierarchy, filter, spec, |_| true);
    };
    let class_part = &spec[..last_dot];
    let method_name = &spec[last_dot + 1..];

    if class_part.contains('.') {
        let owner_fqn = class_part.replace('.', "/");
        return methods_named(hierarchy, filter, method_name, |fqn| fqn == owner_fqn);
    }

    let simple_name = class_part;
    methods_named(hierarchy, filter, method_name, |fqn| {
        fqn.rsplit('/').next().unwrap_or(fqn) == simple_name
    })
}

fn methods_named(
    hierarchy: &TypeHierarchy,
    filter: &NameFilter,
    method_name: &str,
    owner_matches: impl Fn(&str) -> bool,
) -> Vec<MethodRef> {
    let mut matches = Vec::new();
    for class in hierarchy.iter() {
        if !filter.admits(&class.fqn) || !owner_matches(&class.fqn) {
            continue;
        }
        for method in &class.methods {
            if method.name == method_name {
                matches.push(method.method_ref());
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ClassDecl, ClassKind, MethodDecl, Visibility};

    fn no_filter() -> NameFilter {
        NameFilter::new(Vec::new(), Vec::new(), false)
    }

    fn main_method(owner: &str) -> MethodDecl {
        MethodDecl {
            owner_fqn: owner.to_string(),
            name: MAIN_NAME.to_string(),
            descriptor: MAIN_DESCRIPTOR.to_string(),
            visibility: Visibility::Public,
            is_static: true,
            is_abstract: false,
            is_synthetic: false,
            call_sites: Vec::new(),
        }
    }

    fn hierarchy_with(classes: Vec<ClassDecl>) -> TypeHierarchy {
        let mut hierarchy = TypeHierarchy::new();
        for class in classes {
            hierarchy.add(class);
        }
        hierarchy.freeze().expect("acyclic");
        hierarchy
    }

    #[test]
    fn default_mode_discovers_public_static_main() {
        let hierarchy = hierarchy_with(vec![ClassDecl {
            fqn: "app/App".to_string(),
            kind: ClassKind::Class,
            super_fqn: None,
            directly_implemented: Vec::new(),
            methods: vec![main_method("app/App")],
            origin: "test".to_string(),
        }]);

        let entry_points = resolve_entry_points(&hierarchy, &no_filter(), &[]);
        assert_eq!(entry_points.len(), 1);
        assert_eq!(entry_points[0].owner_fqn, "app/App");
    }

    #[test]
    fn default_mode_ignores_non_matching_main_overloads() {
        let mut method = main_method("app/App");
        method.descriptor = "()V".to_string();
        let hierarchy = hierarchy_with(vec![ClassDecl {
            fqn: "app/App".to_string(),
            kind: ClassKind::Class,
            super_fqn: None,
            directly_implemented: Vec::new(),
            methods: vec![method],
            origin: "test".to_string(),
        }]);

        let entry_points = resolve_entry_points(&hierarchy, &no_filter(), &[]);
        assert!(entry_points.is_empty());
    }

    #[test]
    fn default_mode_respects_name_filter() {
        let hierarchy = hierarchy_with(vec![ClassDecl {
            fqn: "java/lang/App".to_string(),
            kind: ClassKind::Class,
            super_fqn: None,
            directly_implemented: Vec::new(),
            methods: vec![main_method("java/lang/App")],
            origin: "test".to_string(),
        }]);

        let filter = NameFilter::new(Vec::new(), Vec::new(), true);
        let entry_points = resolve_entry_points(&hierarchy, &filter, &[]);
        assert!(entry_points.is_empty());
    }

    #[test]
    fn explicit_simple_name_spec_matches_by_last_segment() {
        let hierarchy = hierarchy_with(vec![ClassDecl {
            fqn: "app/pkg/Service".to_string(),
            kind: ClassKind::Class,
            super_fqn: None,
            directly_implemented: Vec::new(),
            methods: vec![MethodDecl {
                owner_fqn: "app/pkg/Service".to_string(),
                name: "run".to_string(),
                descriptor: "()V".to_string(),
                visibility: Visibility::Public,
                is_static: false,
                is_abstract: false,
                is_synthetic: false,
                call_sites: Vec::new(),
            }],
            origin: "test".to_string(),
        }]);

        let entry_points =
            resolve_entry_points(&hierarchy, &no_filter(), &["Service.run".to_string()]);
        assert_eq!(entry_points.len(), 1);
        assert_eq!(entry_points[0].owner_fqn, "app/pkg/Service");
    }

    #[test]
    fn explicit_fully_qualified_spec_requires_exact_owner() {
        let hierarchy = hierarchy_with(vec![
            ClassDecl {
                fqn: "app/pkg/Service".to_string(),
                kind: ClassKind::Class,
                super_fqn: None,
                directly_implemented: Vec::new(),
                methods: vec![MethodDecl {
                    owner_fqn: "app/pkg/Service".to_string(),
                    name: "run".to_string(),
                    descriptor: "()V".to_string(),
                    visibility: Visibility::Public,
                    is_static: false,
                    is_abstract: false,
                    is_synthetic: false,
                    call_sites: Vec::new(),
                }],
                origin: "test".to_string(),
            },
            ClassDecl {
                fqn: "other/Service".to_string(),
                kind: ClassKind::Class,
                super_fqn: None,
                directly_implemented: Vec::new(),
                methods: vec![MethodDecl {
                    owner_fqn: "other/Service".to_string(),
                    name: "run".to_string(),
                    descriptor: "()V".to_string(),
                    visibility: Visibility::Public,
                    is_static: false,
                    is_abstract: false,
                    is_synthetic: false,
                    call_sites: Vec::new(),
                }],
                origin: "test".to_string(),
            },
        ]);

        let entry_points = resolve_entry_points(
            &hierarchy,
            &no_filter(),
            &["app.pkg.Service.run".to_string()],
        );
        assert_eq!(entry_points.len(), 1);
        assert_eq!(entry_points[0].owner_fqn, "app/pkg/Service");
    }

    #[test]
    fn unmatched_spec_among_others_is_skipped_not_fatal() {
        let hierarchy = hierarchy_with(vec![ClassDecl {
            fqn: "app/App".to_string(),
            kind: ClassKind::Class,
            super_fqn: None,
            directly_implemented: Vec::new(),
            methods: vec![main_method("app/App")],
            origin: "test".to_string(),
        }]);

        let entry_points = resolve_entry_points(
            &hierarchy,
            &no_filter(),
            &["missing.Thing.run".to_string(), "App.main".to_string()],
        );
        assert_eq!(entry_points.len(), 1);
    }
}
