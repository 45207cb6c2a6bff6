//! Emitted files and per-target output sets.

use polybind_core::{GenerationError, GenerationResult, TargetId};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// One emitted file, relative to its output set's root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    path: PathBuf,
    contents: String,
    checksum: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let contents = contents.into();
        Self {
            path: path.into(),
            checksum: compute_sha256(contents.as_bytes()),
            contents,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// SHA-256 of the contents, hex encoded.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

/// All files emitted for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSet {
    target: TargetId,
    root: PathBuf,
    files: Vec<GeneratedFile>,
}

impl OutputSet {
    /// Create an empty set rooted at the target's default output directory.
    pub fn new(target: TargetId) -> Self {
        Self {
            target,
            root: PathBuf::from(target.default_output_root()),
            files: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Add a file. Two files with the same relative path are a naming
    /// collision between derived type names.
    pub fn add(
        &mut self,
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
    ) -> GenerationResult<()> {
        let file = GeneratedFile::new(path, contents);
        if self.file(file.path()).is_some() {
            return Err(GenerationError::NamingCollision {
                target: self.target,
                scope: "output files".to_string(),
                identifier: file.path().display().to_string(),
                reason: "is emitted more than once".to_string(),
            });
        }
        self.files.push(file);
        Ok(())
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files in emission order.
    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all contents in bytes.
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.contents.len()).sum()
    }

    /// SHA-256 over the sorted `(path, checksum)` pairs.
    ///
    /// Equal fingerprints mean byte-identical sets regardless of emission
    /// order.
    pub fn fingerprint(&self) -> String {
        let mut entries: Vec<(String, &str)> = self
            .files
            .iter()
            .map(|f| (f.path.to_string_lossy().replace('\\', "/"), f.checksum.as_str()))
            .collect();
        entries.sort();

        let mut hasher = Sha256::new();
        for (path, checksum) in entries {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(checksum.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// Compute SHA256 hash of data and return as hex string.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn compute_sha256___known_vector() {
        assert_eq!(
            compute_sha256(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn OutputSet___add___rejects_duplicate_paths() {
        let mut set = OutputSet::new(TargetId::Java);
        set.add("a/B.java", "class B {}").unwrap();

        let err = set.add("a/B.java", "class B2 {}").unwrap_err();

        assert!(matches!(err, GenerationError::NamingCollision { .. }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn OutputSet___fingerprint___ignores_insertion_order() {
        let mut first = OutputSet::new(TargetId::Cpp);
        first.add("A.h", "a").unwrap();
        first.add("A.cpp", "b").unwrap();
        let mut second = OutputSet::new(TargetId::Cpp);
        second.add("A.cpp", "b").unwrap();
        second.add("A.h", "a").unwrap();

        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn OutputSet___fingerprint___changes_with_contents() {
        let mut first = OutputSet::new(TargetId::JavaScript);
        first.add("calc.js", "'use strict';\n").unwrap();
        let mut second = OutputSet::new(TargetId::JavaScript);
        second.add("calc.js", "'use strict'; \n").unwrap();

        assert_ne!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn OutputSet___with_root___overrides_default() {
        let set = OutputSet::new(TargetId::Java).with_root("out/java");

        assert_eq!(set.root(), Path::new("out/java"));
        assert_eq!(OutputSet::new(TargetId::Java).root(), Path::new("generated/java"));
    }

    #[test]
    fn GeneratedFile___checksum___matches_contents() {
        let file = GeneratedFile::new("x.js", "abc");

        assert_eq!(file.checksum(), compute_sha256(b"abc"));
        assert_eq!(file.contents(), "abc");
        assert_eq!(file.path(), Path::new("x.js"));
    }
}
