//! Input Enumerator (spec.md §4.1, component C1). Walks the supplied
//! paths, classifying each as a directory, archive, or loose class file,
//! and yields `(origin, bytes)` pairs in input-argument order. Grounded on
//! `scan_path`/`scan_dir`'s directory walk and zip-entry enumeration in
//! `scan.rs`, stripped of the SARIF artifact bookkeeping and the
//! classpath/manifest expansion spec.md has no concept of.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::ZipArchive;

const CLASS_SUFFIX: &str = ".class";

/// One enumerated bytecode unit: where it came from (for warnings and
/// traceability) and its raw bytes.
pub(crate) struct Unit {
    pub(crate) origin: String,
    pub(crate) bytes: Vec<u8>,
}

/// Enumerate every bytecode unit reachable from `paths`, in argument
/// order. Unreadable/missing/unsupported paths are logged and skipped
/// (spec.md §7: `UnreadableInput` is a warning, never fatal).
pub(crate) fn enumerate(paths: &[PathBuf]) -> Vec<Unit> {
    let mut units = Vec::new();
    for path in paths {
        enumerate_path(path, &mut units);
    }
    units
}

fn enumerate_path(path: &Path, units: &mut Vec<Unit>) {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "input path does not exist, skipping");
        return;
    }
    if path.is_dir() {
        enumerate_dir(path, units);
        return;
    }

    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    match extension {
        "class" => match fs::read(path) {
            Ok(bytes) => units.push(Unit {
                origin: path.display().to_string(),
                bytes,
            }),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "failed to read class file, skipping"),
        },
        "jar" => {
            if let Err(err) = enumerate_jar(path, units) {
                tracing::warn!(path = %path.display(), error = %err, "failed to read archive, skipping");
            }
        }
        _ => tracing::warn!(path = %path.display(), "unsupported input path kind, skipping"),
    }
}

fn enumerate_dir(path: &Path, units: &mut Vec<Unit>) {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read directory, skipping");
            return;
        }
    };

    let mut children: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => children.push(entry.path()),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "failed to read directory entry"),
        }
    }
    children.sort();

    for child in children {
        if child.is_dir() {
            enumerate_dir(&child, units);
        } else if child
            .to_str()
            .map(|name| name.ends_with(CLASS_SUFFIX))
            .unwrap_or(false)
        {
            match fs::read(&child) {
                Ok(bytes) => units.push(Unit {
                    origin: child.display().to_string(),
                    bytes,
                }),
                Err(err) => tracing::warn!(path = %child.display(), error = %err, "failed to read class file, skipping"),
            }
        }
    }
}

fn enumerate_jar(path: &Path, units: &mut Vec<Unit>) -> Result<()> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut archive =
        ZipArchive::new(file).with_context(|| format!("failed to read archive {}", path.display()))?;

    let mut entry_names: Vec<String> = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .with_context(|| format!("failed to read entry {index} of {}", path.display()))?;
        if !entry.is_dir() && entry.name().ends_with(CLASS_SUFFIX) {
            entry_names.push(entry.name().to_string());
        }
    }
    entry_names.sort();

    for name in entry_names {
        let mut entry = archive
            .by_name(&name)
            .with_context(|| format!("failed to read {}:{}", path.display(), name))?;
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read {}:{}", path.display(), name))?;
        units.push(Unit {
            origin: format!("jar:{}!/{}", path.display(), name),
            bytes,
        });
    }
    Ok(())
}
