//! Writing output sets to disk and reading them back

use anyhow::{Context, Result};
use polybind_codegen::OutputSet;
use polybind_core::TargetId;
use std::fs;
use std::path::{Path, PathBuf};

/// Write every file of every set under `base`, creating directories.
///
/// Returns the written paths in output order.
pub fn write_outputs(outputs: &[OutputSet], base: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for output in outputs {
        let root = base.join(output.root());
        for file in output.files() {
            let path = root.join(file.path());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(&path, file.contents())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), checksum = file.checksum(), "Wrote file");
            written.push(path);
        }
    }
    Ok(written)
}

/// Read every file under `root` into an output set for `target`.
///
/// Paths are relative to `root` and sorted. A missing root yields an empty set.
pub fn read_output(target: TargetId, root: &Path) -> Result<OutputSet> {
    let mut paths = Vec::new();
    if root.is_dir() {
        collect_files(root, &mut paths)?;
    }
    paths.sort();

    let mut output = OutputSet::new(target).with_root(root);
    for path in paths {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        output.add(relative, contents)?;
    }
    Ok(output)
}

fn collect_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, paths)?;
        } else {
            paths.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "writer/writer_tests.rs"]
mod writer_tests;
