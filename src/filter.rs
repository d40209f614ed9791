//! Name Filter (spec.md §4.4, component C4). Decides whether a loaded
//! FQN participates in entry-point resolution, call-graph construction,
//! and the collected result. Grounded on the teacher's package-prefix
//! allow/deny conventions in `rules/mod.rs`, generalized here into the
//! four-step include/exclude/JDK-exclusion precedence spec.md spells
//! out explicitly.

/// Built-in JDK/platform prefixes recognized by `--exclude-jdk`. Internal
/// FQNs are slash-separated, so these are too.
const JDK_PREFIXES: &[&str] = &[
    "java/",
    "javax/",
    "sun/",
    "com/sun/",
    "jdk/",
    "com/oracle/",
    "org/w3c/",
    "org/xml/",
    "org/ietf/",
];

pub(crate) struct NameFilter {
    include_prefixes: Vec<String>,
    exclude_prefixes: Vec<String>,
    exclude_jdk: bool,
}

impl NameFilter {
    pub(crate) fn new(
        include_prefixes: Vec<String>,
        exclude_prefixes: Vec<String>,
        exclude_jdk: bool,
    ) -> Self {
        NameFilter {
            include_prefixes: include_prefixes.into_iter().map(to_internal_form).collect(),
            exclude_prefixes: exclude_prefixes.into_iter().map(to_internal_form).collect(),
            exclude_jdk,
        }
    }

    /// Admission precedence (spec.md §4.4), in order:
    /// 1. `--exclude-jdk` rejects anything under a built-in JDK prefix.
    /// 2. Any `--exclude` prefix that is a literal string prefix of
    ///    `fqn` rejects — a raw prefix test, not boundary-aware.
    /// 3. With no `--include` prefixes, admit.
    /// 4. Otherwise admit iff some `--include` prefix is a prefix of
    ///    `fqn` or of `fqn`'s package portion, on a `/` boundary
    ///    (preserves both "include this exact class" and "include
    ///    everything under this package"). Unlike step 2, this check is
    ///    boundary-aware so `a.b` does not spuriously admit `a.bc.D`.
    pub(crate) fn admits(&self, fqn: &str) -> bool {
        if self.exclude_jdk && is_jdk_type(fqn) {
            return false;
        }
        if self.exclude_prefixes.iter().any(|prefix| fqn.starts_with(prefix.as_str())) {
            return false;
        }
        if self.include_prefixes.is_empty() {
            return true;
        }
        let package = package_of(fqn);
        self.include_prefixes
            .iter()
            .any(|prefix| matches_segment(fqn, prefix) || matches_segment(package, prefix))
    }
}

fn is_jdk_type(fqn: &str) -> bool {
    JDK_PREFIXES.iter().any(|prefix| fqn.starts_with(prefix))
}

/// `true` iff `prefix` names `value` exactly or names a package/type that
/// contains it — i.e. `value` starts with `prefix` on a `/` boundary, not
/// merely as a raw string prefix (so `"a/b"` does not match `"a/bc/D"`).
/// Used for `--include` only; `--exclude` uses a plain literal-prefix test
/// (see `admits`), matching spec.md §4.4's asymmetric wording for the two
/// steps.
fn matches_segment(value: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    value == prefix || value.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Everything before the last `/`; empty string when `fqn` has none.
fn package_of(fqn: &str) -> &str {
    match fqn.rfind('/') {
        Some(index) => &fqn[..index],
        None => "",
    }
}

/// Accepts either dotted (`java.lang.String`) or slash (`java/lang/String`)
/// prefixes from the CLI and normalizes to internal slash form.
fn to_internal_form(prefix: String) -> String {
    prefix.replace('.', "/")
}
